//! staffetta-core: tipi condivisi tra client e server (modelli, scope, DTO HTTP, errori).
//! Niente I/O.

pub mod models;
pub mod protocol;
pub mod error;
pub mod utils;

// Re-export utili per ridurre i percorsi nel crate server
pub use error::Error;
pub use models::{Message, MessageWithSender, Pair, Scope, User, MAX_BODY_CHARS};
pub use protocol::http::{
    FetchMessagesQuery, ListMessagesResponse, ListUsersResponse, LoginRequest, LoginResponse,
    RegisterRequest, RegisterResponse, ScopeSelector, SendMessageRequest, SendMessageResponse,
};
pub use utils::{new_session_token, now_timestamp};
