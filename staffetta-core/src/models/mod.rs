pub mod user;
pub mod message;
pub mod scope;

// Re-export per comodità
pub use user::User;
pub use message::{Message, MessageWithSender, MAX_BODY_CHARS};
pub use scope::{Pair, Scope};
