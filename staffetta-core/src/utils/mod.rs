pub mod ids;
pub mod time;

pub use ids::new_session_token;
pub use time::now_timestamp;
