use staffetta_core::{ScopeSelector, Scope, User};

use crate::error::{AppError, AppResult};

/// Traduce il selettore della richiesta nello scope da interrogare.
///
/// Un peer inesistente non è un errore: produce semplicemente una conversazione vuota.
pub fn resolve(requester: &User, selector: Option<ScopeSelector>) -> AppResult<Scope> {
    match selector {
        Some(ScopeSelector::Global) => Ok(Scope::Global),
        Some(ScopeSelector::Peer(peer)) => Ok(Scope::direct(requester.id, peer)),
        None => Err(AppError::MissingScope),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> User {
        User { id: 1, name: "alice".to_string() }
    }

    #[test]
    fn resolves_global_and_direct() {
        assert_eq!(resolve(&alice(), Some(ScopeSelector::Global)).unwrap(), Scope::Global);
        assert_eq!(
            resolve(&alice(), Some(ScopeSelector::Peer(2))).unwrap(),
            Scope::direct(2, 1)
        );
    }

    #[test]
    fn missing_selector_is_a_client_error() {
        let err = resolve(&alice(), None).unwrap_err();
        assert!(matches!(err, AppError::MissingScope));
        assert_eq!(err.status_code(), axum::http::StatusCode::UNPROCESSABLE_ENTITY);
    }
}
