//! IntentBot chat server library crate.
//!
//! Re-exports all modules so the binary (`main.rs`) and the end-to-end test
//! crate can reach `AppState`, `build_router` and the resolution pipeline.

pub mod config;
pub mod engine;
pub mod error;
pub mod routes;
pub mod session;
pub mod state;
pub mod transcript;
