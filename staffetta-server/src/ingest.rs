use staffetta_core::{MessageWithSender, SendMessageRequest, User};

use crate::error::{AppError, AppResult};
use crate::store::MessageStore;

/// Percorso di creazione dei messaggi: normalizza il corpo, delega ad `append` (che valida), restituisce
/// il messaggio con il mittente già allegato (echo immediato lato client).
///
/// `receiver_id` assente significa messaggio globale.
pub async fn send(store: &MessageStore, sender: &User, request: SendMessageRequest) -> AppResult<MessageWithSender> {
    let body = request
        .body
        .as_deref()
        .map(str::trim)
        .ok_or_else(|| AppError::validation("body", "required"))?;

    let message = store.append(sender.id, request.receiver_id, body).await?;
    tracing::info!(
        sender = sender.id,
        receiver = ?message.receiver_id,
        message_id = message.id,
        "message stored"
    );

    Ok(MessageWithSender { message, sender: sender.clone() })
}
