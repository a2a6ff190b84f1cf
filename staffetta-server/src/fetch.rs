use staffetta_core::{MessageWithSender, Scope};

use crate::error::{AppError, AppResult};
use crate::store::MessageStore;
use crate::users::UserDirectory;

/// Limite fisso per risposta. Una risposta piena significa "potrebbe esserci altro":
/// il client ripete con il cursore avanzato finché non ne riceve meno.
pub const PAGE_LIMIT: i64 = 200;

/// Restituisce i messaggi di `scope` con id maggiore di `after_id`, in ordine crescente,
/// con l'identità del mittente allegata.
///
/// Un cursore non positivo vale 0 (storia completa, comunque limitata). `limit` viene
/// ricondotto nell'intervallo `1..=PAGE_LIMIT`.
pub async fn fetch(
    store: &MessageStore,
    users: &UserDirectory,
    scope: Scope,
    after_id: i64,
    limit: i64,
) -> AppResult<Vec<MessageWithSender>> {
    let after_id = after_id.max(0);
    let limit = limit.clamp(1, PAGE_LIMIT);

    let messages = store.query_after(scope, after_id, limit).await?;

    let mut sender_ids: Vec<i64> = messages.iter().map(|m| m.sender_id).collect();
    sender_ids.sort_unstable();
    sender_ids.dedup();
    let senders = users.display_identities(&sender_ids).await?;

    tracing::debug!(?scope, after = after_id, count = messages.len(), "fetched messages");

    messages
        .into_iter()
        .map(|message| {
            let sender = senders
                .get(&message.sender_id)
                .cloned()
                .ok_or_else(|| AppError::Internal(format!("sender {} missing for message {}", message.sender_id, message.id)))?;
            Ok(MessageWithSender { message, sender })
        })
        .collect()
}
