//! In-process token providers.

use async_trait::async_trait;
use parking_lot::RwLock;
use secrecy::SecretString;

use crate::ports::TokenProvider;

/// Always returns the same token (or none).
#[derive(Debug, Clone, Default)]
pub struct StaticTokenProvider {
    token: Option<SecretString>,
}

impl StaticTokenProvider {
    pub fn new(token: Option<SecretString>) -> Self {
        Self { token }
    }

    pub fn signed_out() -> Self {
        Self { token: None }
    }
}

#[async_trait]
impl TokenProvider for StaticTokenProvider {
    async fn current_token(&self) -> Option<SecretString> {
        self.token.clone()
    }
}

/// Holds the token the auth service most recently issued.
#[derive(Debug, Default)]
pub struct SharedTokenProvider {
    token: RwLock<Option<SecretString>>,
}

impl SharedTokenProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a refreshed token; the next `connect()` uses it.
    pub fn set_token(&self, token: SecretString) {
        *self.token.write() = Some(token);
    }

    pub fn sign_out(&self) {
        self.token.write().take();
    }
}

#[async_trait]
impl TokenProvider for SharedTokenProvider {
    async fn current_token(&self) -> Option<SecretString> {
        self.token.read().clone()
    }
}
