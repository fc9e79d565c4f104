//! Token provider adapters.
//!
//! - `StaticTokenProvider` - a fixed token, typically from configuration
//! - `SharedTokenProvider` - a token the host app replaces after sign-in or refresh

mod static_token;

pub use static_token::{SharedTokenProvider, StaticTokenProvider};
