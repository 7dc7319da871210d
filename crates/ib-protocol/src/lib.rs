pub mod chat;
pub mod intent;
pub mod transcript;

pub use chat::*;
pub use intent::*;
pub use transcript::*;
