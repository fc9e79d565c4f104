//! Token provider port for the bearer token used by `connect()`.
//!
//! Token refresh belongs to the REST auth service; the realtime core only
//! asks for whatever token is current right before connecting.

use async_trait::async_trait;
use secrecy::SecretString;

/// Supplies the current bearer token, or `None` when signed out.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn current_token(&self) -> Option<SecretString>;
}
