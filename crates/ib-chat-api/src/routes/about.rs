//! Static description of the bot.

use axum::Json;
use axum::extract::State;
use serde_json::{Value, json};

use crate::state::AppState;

/// GET /api/v1/about: what the bot is and what it can do.
pub async fn about(State(state): State<AppState>) -> Json<Value> {
    let pipeline = &state.pipeline;
    Json(json!({
        "name": "IntentBot",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "A conversational assistant that answers by recognizing the intent \
            of each message: fixed phrases and arithmetic are handled by rules, everything \
            else by a TF-IDF and logistic regression classifier trained on the intent catalog.",
        "capabilities": [
            "greetings, farewells and thanks",
            "arithmetic such as 12 * (3 + 4)",
            "remembering your name within a conversation",
            "answers for every intent in the catalog",
        ],
        "confidence_threshold": pipeline.threshold(),
        "intents": pipeline.catalog().tags().collect::<Vec<_>>(),
    }))
}
