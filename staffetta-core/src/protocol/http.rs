use serde::{Deserialize, Deserializer, Serialize};

use crate::models::{MessageWithSender, User};
/*
    dto per le richieste http
*/
// Register
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub name: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub user: User,
    pub token: String,
}

// Login
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub name: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}

// Users listing (tutti tranne il chiamante, ordinati per nome)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListUsersResponse {
    pub users: Vec<User>,
}

/// Selettore di scope costruito al bordo: o il feed globale o una conversazione con `peer`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeSelector {
    Global,
    Peer(i64),
}

/// Parametri di query di GET /api/messages.
///
/// Il parsing è permissivo: `global` vale true solo per `1`, `true`, `on`, `yes`;
/// gli interi mancanti, non validi o non positivi sono trattati come assenti.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchMessagesQuery {
    #[serde(default, deserialize_with = "lenient_flag")]
    pub global: bool,
    #[serde(default, alias = "user_id", alias = "peerUserId", deserialize_with = "lenient_id")]
    pub user_id: Option<i64>,
    #[serde(default, alias = "afterId", deserialize_with = "lenient_id")]
    pub after: Option<i64>,
}

impl FetchMessagesQuery {
    /// `global` ha la precedenza se sono presenti entrambi i selettori.
    pub fn selector(&self) -> Option<ScopeSelector> {
        if self.global {
            Some(ScopeSelector::Global)
        } else {
            self.user_id.map(ScopeSelector::Peer)
        }
    }

    /// Cursore effettivo: 0 (inizio della storia) se assente.
    pub fn cursor(&self) -> i64 {
        self.after.unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListMessagesResponse {
    pub messages: Vec<MessageWithSender>,
}

// Send message. `body` è opzionale qui solo per poter rispondere con un errore di campo.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default, alias = "receiver_id", skip_serializing_if = "Option::is_none")]
    pub receiver_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageResponse {
    pub message: MessageWithSender,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawParam {
    Bool(bool),
    Int(i64),
    Str(String),
}

fn lenient_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<RawParam>::deserialize(deserializer)?;
    Ok(match raw {
        Some(RawParam::Bool(b)) => b,
        Some(RawParam::Int(i)) => i == 1,
        Some(RawParam::Str(s)) => matches!(
            s.trim().to_ascii_lowercase().as_str(),
            "1" | "true" | "on" | "yes"
        ),
        None => false,
    })
}

fn lenient_id<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<RawParam>::deserialize(deserializer)?;
    let id = match raw {
        Some(RawParam::Int(i)) => Some(i),
        Some(RawParam::Str(s)) => s.trim().parse::<i64>().ok(),
        Some(RawParam::Bool(_)) | None => None,
    };
    Ok(id.filter(|id| *id > 0))
}
