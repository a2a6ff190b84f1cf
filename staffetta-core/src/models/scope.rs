use serde::{Deserialize, Serialize};

use super::message::Message;

/// Partizione di visibilità a cui appartiene un messaggio.
///
/// Ogni messaggio sta in esattamente uno scope: `Global` se non ha destinatario,
/// altrimenti la conversazione diretta tra mittente e destinatario.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Scope {
    Global,
    Direct(Pair),
}

/// Coppia non ordinata di partecipanti; `Pair::new(a, b) == Pair::new(b, a)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pair {
    low: i64,
    high: i64,
}

impl Pair {
    pub fn new(a: i64, b: i64) -> Self {
        Self { low: a.min(b), high: a.max(b) }
    }

    pub fn members(&self) -> (i64, i64) {
        (self.low, self.high)
    }
}

impl Scope {
    pub fn direct(a: i64, b: i64) -> Self {
        Scope::Direct(Pair::new(a, b))
    }

    /// Lo scope a cui appartiene `message`.
    pub fn of(message: &Message) -> Self {
        match message.receiver_id {
            None => Scope::Global,
            Some(receiver) => Scope::direct(message.sender_id, receiver),
        }
    }

    pub fn contains(&self, message: &Message) -> bool {
        Scope::of(message) == *self
    }
}
