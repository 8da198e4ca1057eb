//! Integration tests for finchat
//!
//! These tests verify the integration between different crates:
//! - finchat-llm: completion requests and the mock provider
//! - finchat-core: persona routing, retry, history and planning
//! - finchat-market: cache expiry as seen by callers

use finchat_core::enricher::already_shown;
use finchat_core::{
    required_rate, retry_with_backoff, transcript, ConversationTurn, Persona,
    RetryConfig, SavingsPlan, Sender,
};
use finchat_llm::{CompletionRequest, LlmProvider, MockProvider};
use finchat_market::TtlCache;
use std::time::Duration;

// ============================================================================
// Persona routing
// ============================================================================

#[test]
fn test_every_persona_tag_round_trips() {
    for persona in Persona::ALL {
        assert_eq!(Persona::from_tag(persona.tag()), persona);
    }
    assert_eq!(Persona::from_tag("support"), Persona::Support);
    assert_eq!(Persona::from_tag("crypto-bot"), Persona::Default);
}

#[test]
fn test_only_support_prompts_carry_intentions() {
    for persona in Persona::ALL {
        let prompt = persona
            .descriptor()
            .render_response("Where is my card?", "", "card_arrival");
        assert_eq!(
            prompt.contains("Predicted intentions"),
            persona.descriptor().includes_intentions,
            "{persona}"
        );
    }
}

// ============================================================================
// Retry against a provider
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_retry_recovers_after_transient_provider_errors() {
    let provider = MockProvider::new("OpenAI");
    provider.push_error("502 Bad Gateway");
    provider.push_error("502 Bad Gateway");
    provider.push_reply("Recovered");

    let started = tokio::time::Instant::now();
    let request = CompletionRequest::single_prompt("hello");
    let reply = retry_with_backoff(&RetryConfig::default(), || {
        provider.complete(request.clone())
    })
    .await
    .unwrap();

    assert_eq!(reply.content, "Recovered");
    assert_eq!(provider.call_count(), 3);
    assert_eq!(started.elapsed(), Duration::from_secs(3));
}

// ============================================================================
// History
// ============================================================================

#[test]
fn test_shown_quote_is_detected_in_flattened_history() {
    let turns = vec![
        ConversationTurn::new(Sender::User, "How is TSLA doing?"),
        ConversationTurn::new(
            Sender::Assistant,
            "**Real-Time Stock Quote for TSLA:**\n- **Price:** $251.10",
        ),
    ];
    let history = transcript(&turns);

    assert!(already_shown("TSLA", &history));
    assert!(!already_shown("TSL", &history));
    assert!(!already_shown("NVDA", &history));
}

// ============================================================================
// Planning
// ============================================================================

#[test]
fn test_required_rate_with_monthly_contributions() {
    let plan = SavingsPlan {
        initial_investment: 10_000.0,
        periodic_investment: 500.0,
        final_value: 100_000.0,
        number_of_periods: 120,
    };

    let rate = required_rate(&plan).unwrap() / 100.0;
    let growth = (1.0 + rate).powi(120);
    let projected = 10_000.0 * growth + 500.0 * (growth - 1.0) / rate;
    assert!((projected - 100_000.0).abs() < 1.0, "projected = {projected}");
}

// ============================================================================
// Market cache
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_cache_entries_expire_for_callers() {
    let cache: TtlCache<String> = TtlCache::new(Duration::from_secs(3600), 10);
    cache.insert("real_time_quote_AAPL".to_string(), "189.84".to_string());

    tokio::time::advance(Duration::from_secs(3599)).await;
    assert_eq!(cache.get("real_time_quote_AAPL").as_deref(), Some("189.84"));

    tokio::time::advance(Duration::from_secs(1)).await;
    assert!(cache.get("real_time_quote_AAPL").is_none());
}
