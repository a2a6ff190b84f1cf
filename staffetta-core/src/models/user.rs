use serde::{Deserialize, Serialize};

/// Identità di visualizzazione di un utente: l'unica parte del record utente che viaggia sul wire.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub name: String,
}
