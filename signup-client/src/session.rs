//! Session Manager - token and username held for the logged-in user
//!
//! The session lives in memory and is mirrored into a [`KeyValueStore`] under
//! `authToken` / `currentUsername` so it survives restarts.

use crate::api::SignupApi;
use crate::store::KeyValueStore;
use signup_core::{
    ErrorContext, Session, SignupError, SignupResult, AUTH_TOKEN_KEY, CURRENT_USERNAME_KEY,
};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Shown when the server refuses the credentials
pub const INVALID_CREDENTIALS: &str = "Invalid username or password";
/// Shown when the login request itself failed
pub const LOGIN_FAILED: &str = "Login failed. Please try again.";

pub struct SessionManager {
    store: Arc<dyn KeyValueStore>,
    current: Option<Session>,
}

impl SessionManager {
    /// Create a manager with no session. Call [`SessionManager::load_session`] to restore one.
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            current: None,
        }
    }

    /// Restore the session from the store.
    ///
    /// A store holding only one of the two keys is treated as logged out and the
    /// stray key is removed.
    pub fn load_session(&mut self) -> SignupResult<Option<&Session>> {
        let token = self.store.get(AUTH_TOKEN_KEY)?;
        let username = self.store.get(CURRENT_USERNAME_KEY)?;

        self.current = match (token, username) {
            (Some(token), Some(username)) => {
                debug!(username = %username, "Restored stored session");
                Some(Session::new(token, username))
            }
            (None, None) => None,
            _ => {
                warn!("Stored session is incomplete, clearing it");
                self.clear_store()?;
                None
            }
        };

        Ok(self.current.as_ref())
    }

    pub fn current(&self) -> Option<&Session> {
        self.current.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.current.is_some()
    }

    pub fn token(&self) -> Option<&str> {
        self.current.as_ref().map(|session| session.token.as_str())
    }

    pub fn username(&self) -> Option<&str> {
        self.current.as_ref().map(|session| session.username.as_str())
    }

    /// Log in and persist the session.
    ///
    /// A server rejection becomes [`SignupError::Authentication`] carrying
    /// [`INVALID_CREDENTIALS`]; the stored keys are left untouched on any failure.
    pub async fn login(
        &mut self,
        api: &dyn SignupApi,
        username: &str,
        password: &str,
    ) -> SignupResult<Session> {
        let session = api.login(username, password).await.map_err(|e| match e {
            SignupError::Rejected { status, .. } => SignupError::Authentication {
                message: INVALID_CREDENTIALS.to_string(),
                context: ErrorContext::new("session")
                    .with_operation("login")
                    .with_metadata("status", &status.to_string())
                    .with_metadata("username", username),
            },
            other => other,
        })?;

        if let Err(e) = self.write_pair(&session) {
            self.rollback();
            return Err(e);
        }
        self.current = Some(session.clone());

        info!(username = %session.username, "Logged in");
        Ok(session)
    }

    /// Tell the server (best effort) and drop the local session unconditionally
    pub async fn logout(&mut self, api: &dyn SignupApi) -> SignupResult<()> {
        if let Some(token) = self.token() {
            if let Err(e) = api.logout(token).await {
                warn!(error = %e, "Error logging out");
            }
        }

        self.current = None;
        self.clear_store()?;

        info!("Logged out");
        Ok(())
    }

    fn write_pair(&self, session: &Session) -> SignupResult<()> {
        self.store.set(AUTH_TOKEN_KEY, &session.token)?;
        self.store.set(CURRENT_USERNAME_KEY, &session.username)
    }

    /// Put the store back to the session still held in memory after a failed write.
    /// If that fails too, both keys and the in-memory session are dropped.
    fn rollback(&mut self) {
        let restored = match &self.current {
            Some(previous) => self.write_pair(previous),
            None => self.clear_store(),
        };

        if let Err(e) = restored {
            warn!(error = %e, "Could not restore stored session, clearing it");
            self.current = None;
            if let Err(e) = self.clear_store() {
                warn!(error = %e, "Could not clear stored session");
            }
        }
    }

    fn clear_store(&self) -> SignupResult<()> {
        self.store.remove(AUTH_TOKEN_KEY)?;
        self.store.remove(CURRENT_USERNAME_KEY)
    }
}

/// Text shown in the login modal for a failed login
pub fn login_failure_text(error: &SignupError) -> &'static str {
    match error {
        SignupError::Authentication { .. } | SignupError::Rejected { .. } => INVALID_CREDENTIALS,
        _ => LOGIN_FAILED,
    }
}
