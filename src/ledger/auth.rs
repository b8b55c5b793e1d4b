//! Session credential storage.
//!
//! # Security
//! - The token is loaded from the environment or set by the session layer
//! - It is never logged; `Debug` only reports whether one is present

use arc_swap::ArcSwapOption;
use std::sync::Arc;

/// Default environment variable holding the bearer token.
pub const AUTH_TOKEN_ENV_VAR: &str = "DASHBOARD_AUTH_TOKEN";

/// Holds the bearer credential attached to every ledger call.
///
/// Swapping the token (re-login, refresh) is lock-free and visible to the
/// next outgoing request.
#[derive(Clone, Default)]
pub struct CredentialStore {
    token: Arc<ArcSwapOption<String>>,
}

impl CredentialStore {
    /// Create an empty store (requests go out unauthenticated).
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding the given token.
    pub fn with_token(token: impl Into<String>) -> Self {
        let store = Self::new();
        store.set(token);
        store
    }

    /// Load the token from an environment variable, if set and non-empty.
    pub fn from_env(var: &str) -> Self {
        match std::env::var(var) {
            Ok(token) if !token.trim().is_empty() => Self::with_token(token.trim()),
            _ => {
                tracing::warn!(env_var = var, "No ledger credential found in environment");
                Self::new()
            }
        }
    }

    /// Replace the stored token.
    pub fn set(&self, token: impl Into<String>) {
        self.token.store(Some(Arc::new(token.into())));
    }

    /// Forget the stored token.
    pub fn clear(&self) {
        self.token.store(None);
    }

    /// The `Authorization` header value for the current token.
    pub fn bearer(&self) -> Option<String> {
        self.token
            .load()
            .as_ref()
            .map(|token| format!("Bearer {}", token))
    }

    pub fn is_present(&self) -> bool {
        self.token.load().is_some()
    }
}

impl std::fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialStore")
            .field("present", &self.is_present())
            .finish()
    }
}
