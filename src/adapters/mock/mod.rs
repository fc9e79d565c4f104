//! In-memory adapters for headless tests.
//!
//! - `ScriptedTransport` - push server driven by the test
//! - `RecordingToaster`, `RecordingSoundPlayer`, `FakeDesktopNotifier` -
//!   capability fakes that record what the core asked for

mod platform;
mod transport;

pub use platform::{FakeDesktopNotifier, RecordingSoundPlayer, RecordingToaster};
pub use transport::ScriptedTransport;
