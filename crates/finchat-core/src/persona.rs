//! Persona routing
//!
//! Maps a chatbot tag to a fixed descriptor: the role used in the system
//! message, the response and title prompt templates, the suggestion topic,
//! and which enrichment the request needs.
//!
//! ```text
//! ai-customer-support  -> Support            (semantic context)
//! financial-planning   -> FinancialPlanning
//! stock-market         -> StockMarket        (market context)
//! anything else        -> Default
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed set of chat personas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Persona {
    /// Bank customer support
    Support,
    /// Financial planning
    FinancialPlanning,
    /// Stock market assistant
    StockMarket,
    /// General assistant
    Default,
}

impl Persona {
    /// Every persona
    pub const ALL: [Persona; 4] = [
        Persona::Support,
        Persona::FinancialPlanning,
        Persona::StockMarket,
        Persona::Default,
    ];

    /// Resolve a chatbot tag; unknown tags are [`Persona::Default`]
    #[must_use]
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim() {
            "ai-customer-support" | "support" => Persona::Support,
            "financial-planning" => Persona::FinancialPlanning,
            "stock-market" => Persona::StockMarket,
            _ => Persona::Default,
        }
    }

    /// Canonical tag
    #[must_use]
    pub fn tag(self) -> &'static str {
        self.descriptor().tag
    }

    /// Descriptor for this persona
    #[must_use]
    pub fn descriptor(self) -> &'static PersonaDescriptor {
        match self {
            Persona::Support => &SUPPORT,
            Persona::FinancialPlanning => &FINANCIAL_PLANNING,
            Persona::StockMarket => &STOCK_MARKET,
            Persona::Default => &DEFAULT,
        }
    }
}

impl fmt::Display for Persona {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Look up the descriptor for a chatbot tag. Never fails.
#[must_use]
pub fn describe(tag: &str) -> &'static PersonaDescriptor {
    Persona::from_tag(tag).descriptor()
}

/// Static per-persona prompt material
#[derive(Debug, PartialEq, Eq)]
pub struct PersonaDescriptor {
    /// Persona identity
    pub persona: Persona,
    /// Canonical tag
    pub tag: &'static str,
    /// Role named in the system message
    pub role_text: &'static str,
    /// First line of the response prompt
    pub response_preamble: &'static str,
    /// Closing instruction of the response prompt
    pub response_instruction: &'static str,
    /// Whether the response prompt carries predicted intentions
    pub includes_intentions: bool,
    /// Conversation kind named in the title prompt (empty for none)
    pub title_topic: &'static str,
    /// Phrase describing the kind of suggestions wanted
    pub suggestion_topic: &'static str,
    /// Trailing clause of the suggestion request
    pub suggestion_scope: &'static str,
    /// Support path: embed and search the prompt
    pub requires_semantic_context: bool,
    /// Stock path: fetch quotes and sentiment for mentioned symbols
    pub requires_market_context: bool,
}

static SUPPORT: PersonaDescriptor = PersonaDescriptor {
    persona: Persona::Support,
    tag: "ai-customer-support",
    role_text: "customer support assistant for a bank",
    response_preamble: "You are a helpful banking customer support assistant.",
    response_instruction: "provide a helpful response",
    includes_intentions: true,
    title_topic: "customer support",
    suggestion_topic: "helpful questions or topics",
    suggestion_scope: " regarding customer support",
    requires_semantic_context: true,
    requires_market_context: false,
};

static FINANCIAL_PLANNING: PersonaDescriptor = PersonaDescriptor {
    persona: Persona::FinancialPlanning,
    tag: "financial-planning",
    role_text: "financial planning assistant",
    response_preamble: "You are a financial planning assistant.",
    response_instruction: "provide a comprehensive financial advice response",
    includes_intentions: false,
    title_topic: "financial planning",
    suggestion_topic: "helpful financial planning questions or topics",
    suggestion_scope: "",
    requires_semantic_context: false,
    requires_market_context: false,
};

static STOCK_MARKET: PersonaDescriptor = PersonaDescriptor {
    persona: Persona::StockMarket,
    tag: "stock-market",
    role_text: "stock market assistant",
    response_preamble: "You are a stock market assistant.",
    response_instruction: "provide an insightful stock market analysis or advice",
    includes_intentions: false,
    title_topic: "stock market assistance",
    suggestion_topic: "insightful stock market questions or topics",
    suggestion_scope: "",
    requires_semantic_context: false,
    requires_market_context: true,
};

static DEFAULT: PersonaDescriptor = PersonaDescriptor {
    persona: Persona::Default,
    tag: "default",
    role_text: "helpful assistant",
    response_preamble: "You are a helpful assistant.",
    response_instruction: "provide a helpful response",
    includes_intentions: true,
    title_topic: "",
    suggestion_topic: "helpful questions or topics",
    suggestion_scope: "",
    requires_semantic_context: false,
    requires_market_context: false,
};

impl PersonaDescriptor {
    /// System message for response generation
    #[must_use]
    pub fn system_message(&self) -> String {
        format!("You are a {}.", self.role_text)
    }

    /// Response prompt for the user message
    #[must_use]
    pub fn render_response(&self, prompt: &str, history: &str, intentions: &str) -> String {
        let mut out = format!(
            "{}\nUser asked: \"{}\"\nHistorical context: \"{}\"\n",
            self.response_preamble, prompt, history
        );
        if self.includes_intentions {
            out.push_str(&format!("Predicted intentions: \"{}\"\n", intentions));
        }
        out.push_str(&format!("Based on this, {}.", self.response_instruction));
        out
    }

    /// Title prompt built from the raw user prompt
    #[must_use]
    pub fn render_title(&self, prompt: &str) -> String {
        let conversation = if self.title_topic.is_empty() {
            "conversation".to_string()
        } else {
            format!("{} conversation", self.title_topic)
        };
        format!(
            "Based on the following user query, generate a brief and meaningful title for the {}:\n\
             \"{}\".\n\
             Please make sure the title is engaging and relevant to the user query.\n\
             Please make sure the title is not more than 40 characters long.",
            conversation, prompt
        )
    }

    /// Suggestion request built from the conversation transcript
    #[must_use]
    pub fn render_suggestions(&self, history: &str) -> String {
        format!(
            "Based on the following conversation context, suggest up to 5 {} that the user might be \
             interested in{}. The prompts should be concise, relevant, and formatted as standalone \
             sentences without numbering or quotes.\n\n\
             Conversation Context:\n\"{}\"\n\n\
             Suggested Prompts:",
            self.suggestion_topic, self.suggestion_scope, history
        )
    }
}
