//! End-to-end tests for IntentBot live under `tests/`.
//!
//! They train the real classifier on the bundled catalog and drive the chat
//! server through its router, with the transcript and model cache in a
//! scratch directory.
