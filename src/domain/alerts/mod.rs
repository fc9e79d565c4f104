//! Alerts module - toast, sound and desktop presentations plus the
//! desktop permission state machine.

mod permission;
mod presentation;

pub use permission::DesktopPermission;
pub use presentation::{DesktopAlert, SoundCue, Toast, ToastSeverity};
