use std::sync::{Arc, PoisonError, RwLock};

use tracing::debug;

/// In-memory store for the current bearer token.
///
/// The session has exactly two states: anonymous (no token) and
/// authenticated (token present). [`Session::login`] is the only way in,
/// [`Session::logout`] the only way out. There is no expiry and no refresh;
/// a 401 from the server is what ends a session early.
///
/// Clones share the same underlying token cell, so the session handle held
/// by the UI and the one injected into the `ApiClient` always agree.
/// Interleaved writes from concurrent request completions resolve as last
/// write wins.
#[derive(Clone, Default)]
pub struct Session {
    token: Arc<RwLock<Option<String>>>,
}

impl Session {
    /// Create a new anonymous session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the bearer token obtained from a successful login.
    pub fn login(&self, token: String) {
        debug!("Session authenticated");
        *self.write() = Some(token);
    }

    /// Drop the token, returning the session to the anonymous state.
    /// Idempotent; safe to call from any number of in-flight requests.
    pub fn logout(&self) {
        debug!("Session cleared");
        *self.write() = None;
    }

    /// Current bearer token, if authenticated.
    pub fn token(&self) -> Option<String> {
        self.read().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.read().is_some()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Option<String>> {
        self.token.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Option<String>> {
        self.token.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_anonymous() {
        let session = Session::new();
        assert!(!session.is_authenticated());
        assert_eq!(session.token(), None);
    }

    #[test]
    fn test_login_then_logout() {
        let session = Session::new();
        session.login("abc".to_string());
        assert!(session.is_authenticated());
        assert_eq!(session.token().as_deref(), Some("abc"));

        session.logout();
        assert!(!session.is_authenticated());
        assert_eq!(session.token(), None);
    }

    #[test]
    fn test_logout_is_idempotent() {
        let session = Session::new();
        session.logout();
        session.logout();
        assert!(!session.is_authenticated());
    }

    #[test]
    fn test_clones_share_state() {
        let session = Session::new();
        let other = session.clone();

        session.login("abc".to_string());
        assert_eq!(other.token().as_deref(), Some("abc"));

        other.logout();
        assert!(!session.is_authenticated());
    }

    #[test]
    fn test_last_write_wins() {
        let session = Session::new();
        session.login("first".to_string());
        session.login("second".to_string());
        assert_eq!(session.token().as_deref(), Some("second"));
    }
}
