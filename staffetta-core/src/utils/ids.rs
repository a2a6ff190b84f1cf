use uuid::Uuid;

/// Genera un nuovo token di sessione opaco (UUIDv4, senza trattini).
pub fn new_session_token() -> String {
    Uuid::new_v4().simple().to_string()
}
