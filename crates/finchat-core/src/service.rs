//! Chat request pipeline
//!
//! enrich -> generate -> prepend any stock blocks to the answer.

use crate::enricher::ContextEnricher;
use crate::error::Result;
use crate::orchestrator::{GenerationOrchestrator, GenerationRequest};
use crate::persona::Persona;
use crate::suggestions::SuggestionGenerator;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

/// One chat turn to answer
#[derive(Debug, Clone)]
pub struct ChatRequest {
    /// User prompt
    pub prompt: String,
    /// Flattened conversation transcript
    pub context: String,
    /// Whether to generate a title
    pub generate_title: bool,
    /// Persona
    pub persona: Persona,
    /// Required interest rate in percent
    pub interest_rate: Option<f64>,
}

/// Answer returned to the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    /// Answer text, with stock blocks first when any were fetched
    pub message: String,
    /// Generated title, or `None`
    pub title: Option<String>,
}

/// Ties enrichment, generation and suggestions together
pub struct ChatService {
    enricher: ContextEnricher,
    orchestrator: GenerationOrchestrator,
    suggestions: SuggestionGenerator,
}

impl ChatService {
    /// Create a service
    #[must_use]
    pub fn new(
        enricher: ContextEnricher,
        orchestrator: GenerationOrchestrator,
        suggestions: SuggestionGenerator,
    ) -> Self {
        Self {
            enricher,
            orchestrator,
            suggestions,
        }
    }

    /// Answer a chat request
    ///
    /// # Errors
    /// Support-path enrichment failures and `BothProvidersFailed`
    #[instrument(skip_all, fields(persona = %request.persona))]
    pub async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse> {
        let enrichment = self
            .enricher
            .enrich(request.persona, &request.prompt, &request.context)
            .await?;

        let generation = self
            .orchestrator
            .generate(GenerationRequest {
                prompt: &request.prompt,
                history: &enrichment.updated_history,
                intentions: enrichment.intentions_text(),
                want_title: request.generate_title,
                persona: request.persona,
                interest_rate: request.interest_rate,
            })
            .await?;

        let message = match enrichment.market_text.as_deref() {
            Some(blocks) if !blocks.is_empty() => {
                format!("{}\n\n{}", blocks, generation.response).trim().to_string()
            }
            _ => generation.response,
        };

        info!(chars = message.len(), titled = generation.title.is_some(), "Chat answered");
        Ok(ChatResponse {
            message,
            title: generation.title,
        })
    }

    /// Follow-up suggestions; empty on failure
    pub async fn suggest(&self, context: &str, persona: Persona) -> Vec<String> {
        self.suggestions.suggest(context, persona).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enricher::EnricherConfig;
    use crate::orchestrator::GenerationConfig;
    use crate::testing::{market_client, FakeMarket, FixedEmbedder, StaticSearch};
    use finchat_llm::MockProvider;
    use std::sync::Arc;

    struct Fixture {
        primary: Arc<MockProvider>,
        market: Arc<FakeMarket>,
        service: ChatService,
    }

    fn fixture() -> Fixture {
        let primary = Arc::new(MockProvider::new("OpenAI"));
        let secondary = Arc::new(MockProvider::new("Gemini"));
        let market = Arc::new(FakeMarket::default());
        let enricher = ContextEnricher::new(
            Arc::new(FixedEmbedder::default()),
            Arc::new(StaticSearch(vec!["lost_or_stolen_card"])),
            market_client(market.clone()),
            EnricherConfig::default(),
        );
        let service = ChatService::new(
            enricher,
            GenerationOrchestrator::new(primary.clone(), secondary, GenerationConfig::default()),
            SuggestionGenerator::new(primary.clone()),
        );
        Fixture {
            primary,
            market,
            service,
        }
    }

    fn request(persona: Persona, prompt: &str, context: &str) -> ChatRequest {
        ChatRequest {
            prompt: prompt.to_string(),
            context: context.to_string(),
            generate_title: false,
            persona,
            interest_rate: None,
        }
    }

    #[tokio::test]
    async fn test_stock_answer_is_prefixed_with_blocks() {
        let f = fixture();
        f.primary.push_reply("AAPL looks steady.");

        let response = f
            .service
            .chat(&request(Persona::StockMarket, "How is AAPL?", "user: hi"))
            .await
            .unwrap();

        assert!(response.message.starts_with("**Real-Time Stock Quote for AAPL:**"));
        assert!(response.message.ends_with("\n\nAAPL looks steady."));
        assert_eq!(response.title, None);

        // The model saw the transcript with the block appended.
        let sent = f.primary.requests()[0].user_text().unwrap().to_string();
        assert!(sent.contains("Historical context: \"user: hi\n**Real-Time Stock Quote for AAPL:**"));
        assert_eq!(f.market.quoted(), vec!["AAPL"]);
    }

    #[tokio::test]
    async fn test_support_answer_carries_intentions_to_the_model() {
        let f = fixture();
        f.primary.push_reply("Please freeze your card.");
        f.primary.push_reply("Lost Card Help");

        let mut req = request(Persona::Support, "I lost my card", "");
        req.generate_title = true;
        let response = f.service.chat(&req).await.unwrap();

        assert_eq!(
            response,
            ChatResponse {
                message: "Please freeze your card.".to_string(),
                title: Some("Lost Card Help".to_string()),
            }
        );
        let sent = f.primary.requests()[0].user_text().unwrap().to_string();
        assert!(sent.contains("Predicted intentions: \"Relevant intentions: lost_or_stolen_card\""));
    }

    #[tokio::test]
    async fn test_history_is_not_mutated() {
        let f = fixture();
        let req = request(Persona::StockMarket, "MSFT?", "user: earlier");
        f.service.chat(&req).await.unwrap();
        assert_eq!(req.context, "user: earlier");
    }

    #[tokio::test]
    async fn test_suggest_delegates() {
        let f = fixture();
        f.primary.push_reply("1. Can I get a new card?");
        assert_eq!(
            f.service.suggest("user: card", Persona::Support).await,
            vec!["Can I get a new card?"]
        );
    }
}
