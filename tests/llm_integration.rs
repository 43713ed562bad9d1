//! Integration tests for the Anthropic client.
//!
//! These tests make real API calls.
//! Run with: ANTHROPIC_API_KEY=your_key cargo test --test llm_integration -- --ignored

use std::time::Duration;

use news_forge::agents::DEFAULT_WORKER_MODEL;
use news_forge::llm::{AnthropicClient, GenerationRequest, LlmProvider, Message};

fn create_test_client() -> AnthropicClient {
    let key = std::env::var("ANTHROPIC_API_KEY")
        .expect("ANTHROPIC_API_KEY environment variable must be set for integration tests");
    AnthropicClient::new(key, Duration::from_secs(120)).expect("client should build")
}

#[tokio::test]
#[ignore] // Run with: cargo test --test llm_integration -- --ignored
async fn test_simple_generation() {
    let client = create_test_client();

    let request = GenerationRequest::new(
        DEFAULT_WORKER_MODEL,
        vec![Message::user("What is 2 + 2? Reply with just the number.")],
    )
    .with_max_tokens(10)
    .with_temperature(0.0);

    let response = client.generate(request).await;
    assert!(response.is_ok(), "Generation failed: {:?}", response.err());

    let response = response.expect("Should have response");
    assert!(response.text().contains('4'));
    assert!(response.usage.output_tokens > 0);
}

#[tokio::test]
#[ignore]
async fn test_generation_with_web_search() {
    let client = create_test_client();

    let request = GenerationRequest::new(
        DEFAULT_WORKER_MODEL,
        vec![Message::user(
            "Search the web for one headline published today and reply with its title only.",
        )],
    )
    .with_max_tokens(1000)
    .with_web_search(1);

    let response = client.generate(request).await.expect("Should have response");
    assert!(response.has_text());
    assert!(response.search_count() <= 1);
}
