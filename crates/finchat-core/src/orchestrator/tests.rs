use super::*;
use finchat_llm::{MessageRole, MockProvider};
use std::sync::Arc;

fn request(persona: Persona) -> GenerationRequest<'static> {
    GenerationRequest {
        prompt: "How much should I save?",
        history: "user: hi",
        intentions: "",
        want_title: false,
        persona,
        interest_rate: None,
    }
}

fn orchestrator(primary: &Arc<MockProvider>, secondary: &Arc<MockProvider>) -> GenerationOrchestrator {
    GenerationOrchestrator::new(primary.clone(), secondary.clone(), GenerationConfig::default())
}

#[tokio::test(start_paused = true)]
async fn test_primary_success_is_trimmed() {
    let primary = Arc::new(MockProvider::new("OpenAI"));
    let secondary = Arc::new(MockProvider::new("Gemini"));
    primary.push_reply("  Save 20% of income.\n");

    let out = orchestrator(&primary, &secondary)
        .generate(request(Persona::FinancialPlanning))
        .await
        .unwrap();

    assert_eq!(out, Generation { response: "Save 20% of income.".to_string(), title: None });
    assert_eq!(primary.call_count(), 1);
    assert_eq!(secondary.call_count(), 0);

    let sent = &primary.requests()[0];
    assert_eq!(sent.messages[0].role, MessageRole::System);
    assert_eq!(sent.messages[0].content, "You are a financial planning assistant.");
    assert_eq!(sent.max_tokens, Some(150));
    assert_eq!(sent.temperature, Some(0.7));
}

#[tokio::test(start_paused = true)]
async fn test_interest_rate_line_only_for_financial_planning() {
    let primary = Arc::new(MockProvider::new("OpenAI"));
    let secondary = Arc::new(MockProvider::new("Gemini"));
    let orch = orchestrator(&primary, &secondary);

    let mut req = request(Persona::FinancialPlanning);
    req.interest_rate = Some(6.4567);
    orch.generate(req).await.unwrap();

    let mut req = request(Persona::Default);
    req.interest_rate = Some(6.4567);
    orch.generate(req).await.unwrap();

    let sent = primary.requests();
    assert!(sent[0]
        .user_text()
        .unwrap()
        .ends_with("\n\nCalculated Required Interest Rate: 6.46%"));
    assert!(!sent[1].user_text().unwrap().contains("Interest Rate"));
}

#[tokio::test(start_paused = true)]
async fn test_transient_primary_failures_are_retried() {
    let primary = Arc::new(MockProvider::new("OpenAI"));
    let secondary = Arc::new(MockProvider::new("Gemini"));
    primary.push_error("overloaded");
    primary.push_error("overloaded");
    primary.push_reply("third time lucky");

    let out = orchestrator(&primary, &secondary)
        .generate(request(Persona::Default))
        .await
        .unwrap();

    assert_eq!(out.response, "third time lucky");
    assert_eq!(primary.call_count(), 3);
    assert_eq!(secondary.call_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_fallback_after_four_primary_failures() {
    let primary = Arc::new(MockProvider::failing("OpenAI"));
    let secondary = Arc::new(MockProvider::new("Gemini"));
    secondary.push_reply("fallback answer");

    let mut req = request(Persona::FinancialPlanning);
    req.want_title = true;
    req.interest_rate = Some(5.0);
    let out = orchestrator(&primary, &secondary).generate(req).await.unwrap();

    assert_eq!(out.response, "fallback answer");
    assert_eq!(out.title, None);
    assert_eq!(primary.call_count(), 4);
    assert_eq!(secondary.call_count(), 1);

    let fallback = &secondary.requests()[0];
    assert_eq!(fallback.messages.len(), 1);
    let expected = Persona::FinancialPlanning.descriptor().render_response(
        "How much should I save?",
        "user: hi",
        "",
    );
    assert_eq!(fallback.user_text(), Some(expected.as_str()));
}

#[tokio::test(start_paused = true)]
async fn test_both_providers_failing() {
    let primary = Arc::new(MockProvider::failing("OpenAI"));
    let secondary = Arc::new(MockProvider::failing("Gemini"));

    let err = orchestrator(&primary, &secondary)
        .generate(request(Persona::StockMarket))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::BothProvidersFailed { .. }));
    assert_eq!(err.to_string(), "Both OpenAI and Gemini APIs failed.");
    assert_eq!(secondary.call_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_title_generated_from_raw_prompt() {
    let primary = Arc::new(MockProvider::new("OpenAI"));
    let secondary = Arc::new(MockProvider::new("Gemini"));
    primary.push_reply("Answer");
    primary.push_reply(" Saving Plan Basics \n");

    let mut req = request(Persona::FinancialPlanning);
    req.want_title = true;
    let out = orchestrator(&primary, &secondary).generate(req).await.unwrap();

    assert_eq!(out.title.as_deref(), Some("Saving Plan Basics"));
    let title_req = &primary.requests()[1];
    assert_eq!(title_req.messages[0].content, TITLE_SYSTEM_PROMPT);
    assert_eq!(title_req.max_tokens, Some(50));
    let text = title_req.user_text().unwrap();
    assert!(text.contains("financial planning conversation"));
    assert!(text.contains("\"How much should I save?\""));
    assert!(!text.contains("Historical context"));
}

#[tokio::test(start_paused = true)]
async fn test_title_failure_falls_back_without_retry() {
    let primary = Arc::new(MockProvider::new("OpenAI"));
    let secondary = Arc::new(MockProvider::new("Gemini"));
    primary.push_reply("Answer");
    primary.push_error("title call failed");

    let mut req = request(Persona::Support);
    req.want_title = true;
    let out = orchestrator(&primary, &secondary).generate(req).await.unwrap();

    assert_eq!(out.response, "Answer");
    assert_eq!(out.title.as_deref(), Some(FALLBACK_TITLE));
    assert_eq!(primary.call_count(), 2);
}

#[test]
fn test_interest_rate_line_format() {
    assert_eq!(interest_rate_line(7.0), "\n\nCalculated Required Interest Rate: 7.00%");
}
