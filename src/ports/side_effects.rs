//! Platform capability ports - toast, sound and desktop notifications.
//!
//! These stand in for browser-only APIs so the core runs headless. Every
//! call is best-effort: the dispatcher logs failures and moves on.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::alerts::{DesktopAlert, DesktopPermission, SoundCue, Toast};

/// Failure of a best-effort side effect.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SideEffectError {
    #[error("Playback blocked: {0}")]
    PlaybackBlocked(String),

    #[error("Permission denied")]
    PermissionDenied,

    #[error("Side effect failed: {0}")]
    Failed(String),
}

/// Shows in-app toasts.
pub trait Toaster: Send + Sync {
    fn show(&self, toast: &Toast);
}

/// Plays short sounds.
pub trait SoundPlayer: Send + Sync {
    fn play(&self, cue: SoundCue) -> Result<(), SideEffectError>;
}

/// Shows OS-level notifications and owns the host permission prompt.
#[async_trait]
pub trait DesktopNotifier: Send + Sync {
    /// Current host permission, without prompting.
    fn permission(&self) -> DesktopPermission;

    /// Prompts the user. Only called while the permission is `Default`.
    async fn request_permission(&self) -> Result<DesktopPermission, SideEffectError>;

    fn notify(&self, alert: &DesktopAlert) -> Result<(), SideEffectError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[allow(dead_code)]
    fn assert_object_safe(_: &dyn Toaster, _: &dyn SoundPlayer, _: &dyn DesktopNotifier) {}

    #[test]
    fn errors_display() {
        assert_eq!(SideEffectError::PermissionDenied.to_string(), "Permission denied");
        assert_eq!(
            SideEffectError::PlaybackBlocked("autoplay".into()).to_string(),
            "Playback blocked: autoplay"
        );
    }
}
