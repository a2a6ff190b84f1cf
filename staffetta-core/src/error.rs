use serde::{Deserialize, Serialize};

/// Errore condiviso sul wire per tutte le risposte HTTP non riuscite.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Error {
    /// Codice macchina, es. "validation_error"
    pub code: String,

    pub message: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl Error {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self { code: code.into(), message: message.into(), details: None }
    }

    /// Allega il dettaglio per campo: `{"fields": {"<field>": "<reason>"}}`.
    pub fn with_field(mut self, field: &str, reason: &str) -> Self {
        self.details = Some(serde_json::json!({ "fields": { field: reason } }));
        self
    }
}
