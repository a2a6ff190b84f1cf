pub mod http;

// Re-export comodi
pub use http::{
    FetchMessagesQuery, ListMessagesResponse, ListUsersResponse, LoginRequest, LoginResponse,
    RegisterRequest, RegisterResponse, ScopeSelector, SendMessageRequest, SendMessageResponse,
};
