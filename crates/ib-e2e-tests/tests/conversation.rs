//! E2E tests for full conversations against the trained classifier.

mod helpers;

use axum::http::StatusCode;

use helpers::TestHarness;

// ── Rules ────────────────────────────────────────────────────────

#[tokio::test]
async fn e2e_greeting_rule() {
    let h = TestHarness::bundled();
    let (status, json) = h.chat("  HELLO ", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["source"], "rule_greeting");
    assert_eq!(json["response"], "Hello! How can I help you today?");
}

#[tokio::test]
async fn e2e_greeting_with_extra_words_goes_to_classifier() {
    let h = TestHarness::bundled();
    let (_, json) = h.chat("hi there", None).await;
    assert_eq!(json["source"], "classifier");
    assert_eq!(json["tag"], "greeting");
    assert!(json["confidence"].as_f64().unwrap() > 0.7);
}

#[tokio::test]
async fn e2e_arithmetic() {
    let h = TestHarness::bundled();

    let (_, json) = h.chat("what is 2+2", None).await;
    assert_eq!(json["source"], "arithmetic");
    assert_eq!(json["response"], "The result of 2+2 is 4.");

    let (_, json) = h.chat("12 * (3 + 4)", None).await;
    assert_eq!(json["response"], "The result of 12 * (3 + 4) is 84.");

    let (_, json) = h.chat("7/2", None).await;
    assert_eq!(json["response"], "The result of 7/2 is 3.5.");
}

// ── Name memory ──────────────────────────────────────────────────

#[tokio::test]
async fn e2e_name_capture_and_recall() {
    let h = TestHarness::bundled();
    let session = h.start_session().await;

    let (_, json) = h.chat("What is my name", Some(&session)).await;
    assert_eq!(json["tag"], "recall_name");
    assert!(json["response"].as_str().unwrap().starts_with("I don't know your name yet"));

    let (_, json) = h.chat("My name is Grace Hopper.", Some(&session)).await;
    assert_eq!(json["source"], "name_capture");
    assert_eq!(json["response"], "Nice to meet you, Grace Hopper! I'll remember that.");

    let (_, json) = h.chat("What is my name", Some(&session)).await;
    assert_eq!(json["source"], "classifier");
    assert_eq!(json["response"], "Your name is Grace Hopper.");

    let (_, info) = h.get(&format!("/api/v1/sessions/{session}")).await;
    assert_eq!(info["remembered_name"], "Grace Hopper");
    assert_eq!(info["turns"], 3);
}

#[tokio::test]
async fn e2e_names_do_not_leak_between_sessions() {
    let h = TestHarness::bundled();
    let alice = h.start_session().await;
    let bob = h.start_session().await;

    h.chat("call me Alice", Some(&alice)).await;
    h.chat("i am Bob", Some(&bob)).await;

    let (_, json) = h.chat("What is my name", Some(&alice)).await;
    assert_eq!(json["response"], "Your name is Alice.");
    let (_, json) = h.chat("What is my name", Some(&bob)).await;
    assert_eq!(json["response"], "Your name is Bob.");
}

#[tokio::test]
async fn e2e_ended_session_forgets_name() {
    let h = TestHarness::bundled();
    let session = h.start_session().await;
    h.chat("my name is Ada", Some(&session)).await;

    assert_eq!(h.end_session(&session).await, StatusCode::NO_CONTENT);
    let (status, _) = h.chat("What is my name", Some(&session)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// ── Classifier ───────────────────────────────────────────────────

#[tokio::test]
async fn e2e_catalog_pattern_resolves_to_its_intent() {
    let h = TestHarness::bundled();
    let (_, json) = h.chat("How do I make a budget", None).await;
    assert_eq!(json["source"], "classifier");
    assert_eq!(json["tag"], "budget");
    assert!(json["response"].as_str().unwrap().starts_with("Start by listing"));
}

#[tokio::test]
async fn e2e_gibberish_falls_back() {
    let h = TestHarness::bundled();
    let (status, json) = h.chat("qwzx blorf", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["source"], "fallback");
    assert!(json.get("tag").is_none());
}

#[tokio::test]
async fn e2e_same_input_same_answer() {
    let h = TestHarness::bundled();
    let (_, a) = h.chat("Tell me a joke", None).await;
    let (_, b) = h.chat("Tell me a joke", None).await;
    assert_eq!(a["response"], b["response"]);
    assert_eq!(a["confidence"], b["confidence"]);
}

#[tokio::test]
async fn e2e_goodbye_closes_conversation() {
    let h = TestHarness::bundled();
    let (_, json) = h.chat("Goodbye", None).await;
    assert_eq!(json["source"], "rule_goodbye");
    assert_eq!(json["closing"], "Thank you for chatting with me. Have a great day!");
}
