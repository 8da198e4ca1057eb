use super::*;
use crate::middleware::rate_limit::RateLimitSettings;
use crate::server::build_router;
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request};
use finchat_core::{
    ChatService, ContextEnricher, EnricherConfig, GenerationConfig, GenerationOrchestrator,
    SuggestionGenerator,
};
use finchat_llm::MockProvider;
use finchat_market::{
    DailyBar, HistoryRange, MarketConfig, MarketDataClient, MarketDataProvider, NewsItem,
    RealTimeQuote, Sentiment, SentimentScorer, SymbolMatch,
};
use finchat_search::{EmbeddingProvider, SimilaritySearch, EMBEDDING_DIMENSIONS};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

struct Embedder;

#[async_trait]
impl EmbeddingProvider for Embedder {
    async fn embed(&self, _text: &str) -> finchat_search::Result<Vec<f32>> {
        Ok(vec![0.1; EMBEDDING_DIMENSIONS])
    }

    fn dimensions(&self) -> usize {
        EMBEDDING_DIMENSIONS
    }
}

struct Intents;

#[async_trait]
impl SimilaritySearch for Intents {
    async fn search(&self, _vector: &[f32]) -> finchat_search::Result<Vec<String>> {
        Ok(vec!["card_arrival".to_string()])
    }
}

struct NoMarket;

#[async_trait]
impl MarketDataProvider for NoMarket {
    fn name(&self) -> &'static str {
        "none"
    }

    async fn quote(&self, _symbol: &str) -> finchat_market::Result<Option<RealTimeQuote>> {
        Ok(None)
    }

    async fn daily_history(
        &self,
        _symbol: &str,
        _range: &HistoryRange,
    ) -> finchat_market::Result<Vec<DailyBar>> {
        Ok(Vec::new())
    }

    async fn news(&self, _symbol: &str) -> finchat_market::Result<Vec<NewsItem>> {
        Ok(Vec::new())
    }

    async fn search(&self, _keywords: &str) -> finchat_market::Result<Vec<SymbolMatch>> {
        Ok(Vec::new())
    }
}

struct Neutral;

#[async_trait]
impl SentimentScorer for Neutral {
    async fn score(&self, _text: &str) -> Sentiment {
        Sentiment::neutral()
    }
}

struct TestApp {
    router: Router,
    primary: Arc<MockProvider>,
    secondary: Arc<MockProvider>,
}

fn test_app() -> TestApp {
    let primary = Arc::new(MockProvider::new("OpenAI"));
    let secondary = Arc::new(MockProvider::new("Gemini"));
    let market = Arc::new(MarketDataClient::new(
        Arc::new(NoMarket),
        Arc::new(Neutral),
        MarketConfig::default(),
    ));
    let service = ChatService::new(
        ContextEnricher::new(
            Arc::new(Embedder),
            Arc::new(Intents),
            market,
            EnricherConfig::default(),
        ),
        GenerationOrchestrator::new(
            primary.clone(),
            secondary.clone(),
            GenerationConfig::default(),
        ),
        SuggestionGenerator::new(primary.clone()),
    );
    TestApp {
        router: build_router(Arc::new(service), &RateLimitSettings::default()),
        primary,
        secondary,
    }
}

fn post(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn send(router: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

#[tokio::test]
async fn test_root_reports_running() {
    let app = test_app();
    let response = app
        .router
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&bytes[..], b"Chatbot API is running.");
}

#[tokio::test]
async fn test_health_reports_version() {
    let app = test_app();
    let (status, body) = send(
        app.router,
        Request::builder().uri("/health").body(Body::empty()).unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_chat_requires_chatbot() {
    for body in [json!({ "prompt": "hi" }), json!({ "prompt": "hi", "chatbot": "  " })] {
        let app = test_app();
        let (status, response) = send(app.router, post("/api/chat", body)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(response["error"], CHATBOT_REQUIRED);
        assert_eq!(app.primary.call_count(), 0);
    }
}

#[tokio::test]
async fn test_chat_answers_with_title() {
    let app = test_app();
    app.primary.push_reply("Set aside 20% of income.");
    app.primary.push_reply("Saving Basics");

    let (status, body) = send(
        app.router,
        post(
            "/api/chat",
            json!({
                "prompt": "How much should I save?",
                "chatbot": "financial-planning",
                "generateTitle": true,
            }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Set aside 20% of income.");
    assert_eq!(body["title"], "Saving Basics");
}

#[tokio::test]
async fn test_chat_flattens_history_when_context_absent() {
    let app = test_app();
    app.primary.push_reply("You asked about fees.");

    let (status, body) = send(
        app.router,
        post(
            "/api/chat",
            json!({
                "prompt": "What did I ask?",
                "chatbot": "unknown-bot",
                "history": [
                    { "sender": "user", "text": "What are the fees?" },
                    { "sender": "ai", "text": "There are none." }
                ]
            }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "You asked about fees.");
    assert!(body["title"].is_null());

    let sent = app.primary.requests()[0].user_text().unwrap().to_string();
    assert!(sent.contains("user: What are the fees?\nai: There are none."));
}

#[tokio::test(start_paused = true)]
async fn test_chat_reports_both_providers_failed() {
    let app = test_app();
    for _ in 0..4 {
        app.primary.push_error("503 Service Unavailable");
    }
    app.secondary.push_error("quota exhausted");

    let (status, body) = send(
        app.router,
        post("/api/chat", json!({ "prompt": "hello", "chatbot": "support" })),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Both OpenAI and Gemini APIs failed.");
    assert_eq!(app.secondary.call_count(), 1);
}

#[tokio::test]
async fn test_suggested_prompts() {
    let app = test_app();
    app.primary
        .push_reply("1. How do I open an account?\n2. What are the fees?\n3. Can I close it online?");

    let (status, body) = send(
        app.router,
        post(
            "/api/suggested-prompts",
            json!({ "context": "user: hi", "chatbot": "ai-customer-support" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["prompts"],
        json!([
            "How do I open an account?",
            "What are the fees?",
            "Can I close it online?"
        ])
    );
}

#[tokio::test]
async fn test_suggested_prompts_requires_chatbot() {
    let app = test_app();
    let (status, body) = send(
        app.router,
        post("/api/suggested-prompts", json!({ "context": "user: hi" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], CHATBOT_REQUIRED);
}

#[tokio::test]
async fn test_financial_plan_rate() {
    let app = test_app();
    let (status, body) = send(
        app.router,
        post(
            "/api/financial-plan/rate",
            json!({
                "initialInvestment": 1000.0,
                "periodicInvestment": 0.0,
                "finalValue": 2000.0,
                "numberOfPeriods": 10
            }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let rate = body["interestRate"].as_f64().unwrap();
    assert!((rate - 7.177_346).abs() < 1e-3, "rate = {rate}");
}

#[tokio::test]
async fn test_financial_plan_rejects_unreachable_target() {
    let app = test_app();
    let (status, body) = send(
        app.router,
        post(
            "/api/financial-plan/rate",
            json!({
                "initialInvestment": 5000.0,
                "periodicInvestment": 100.0,
                "finalValue": 1000.0,
                "numberOfPeriods": 12
            }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("must be less than"));
}
