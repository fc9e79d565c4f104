//! Headless platform adapters.
//!
//! The core runs outside a browser, so toasts and desktop notifications
//! become structured log lines and sound becomes the terminal bell.

mod desktop;
mod sound;
mod toaster;

pub use desktop::LogDesktopNotifier;
pub use sound::TerminalBellPlayer;
pub use toaster::LogToaster;
