use serde::{Deserialize, Serialize};

use super::user::User;

/// Lunghezza massima del corpo, in caratteri (non byte).
pub const MAX_BODY_CHARS: usize = 2000;

/// Messaggio persistito dal server. `receiver_id = None` indica un messaggio globale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: i64,
    pub sender_id: i64,
    pub receiver_id: Option<i64>,
    pub body: String,
    pub created_at: String, // RFC3339 UTC
}

/// Messaggio con l'identità del mittente allegata, per la presentazione.
/// Sul wire i campi del messaggio restano al primo livello, accanto a `sender`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageWithSender {
    #[serde(flatten)]
    pub message: Message,
    pub sender: User,
}
