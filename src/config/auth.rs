//! Authentication configuration

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

/// Bearer token for the push server and REST API
///
/// Token refresh is handled by the REST auth service; this is only the
/// token the binary starts with.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthConfig {
    pub token: Option<SecretString>,
}

impl AuthConfig {
    /// True when a non-blank token is configured
    pub fn has_token(&self) -> bool {
        self.token
            .as_ref()
            .is_some_and(|t| !t.expose_secret().trim().is_empty())
    }
}
