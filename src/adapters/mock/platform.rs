//! Recording fakes for the toast, sound and desktop capability ports.

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::domain::alerts::{DesktopAlert, DesktopPermission, SoundCue, Toast};
use crate::ports::{DesktopNotifier, SideEffectError, SoundPlayer, Toaster};

/// Records every toast shown.
#[derive(Debug, Default)]
pub struct RecordingToaster {
    shown: Mutex<Vec<Toast>>,
}

impl RecordingToaster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shown(&self) -> Vec<Toast> {
        self.shown.lock().clone()
    }
}

impl Toaster for RecordingToaster {
    fn show(&self, toast: &Toast) {
        self.shown.lock().push(toast.clone());
    }
}

/// Records played cues; can simulate an autoplay block.
#[derive(Debug, Default)]
pub struct RecordingSoundPlayer {
    blocked: bool,
    played: Mutex<Vec<SoundCue>>,
}

impl RecordingSoundPlayer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every `play` fails with `PlaybackBlocked`.
    pub fn failing() -> Self {
        Self {
            blocked: true,
            played: Mutex::new(Vec::new()),
        }
    }

    /// Cues that played successfully.
    pub fn played(&self) -> Vec<SoundCue> {
        self.played.lock().clone()
    }
}

impl SoundPlayer for RecordingSoundPlayer {
    fn play(&self, cue: SoundCue) -> Result<(), SideEffectError> {
        if self.blocked {
            return Err(SideEffectError::PlaybackBlocked(
                "autoplay disabled until user interaction".to_string(),
            ));
        }
        self.played.lock().push(cue);
        Ok(())
    }
}

/// Desktop notifier with a scripted prompt answer.
#[derive(Debug)]
pub struct FakeDesktopNotifier {
    permission: Mutex<DesktopPermission>,
    prompt_answer: DesktopPermission,
    prompts: Mutex<usize>,
    alerts: Mutex<Vec<DesktopAlert>>,
}

impl FakeDesktopNotifier {
    /// `initial` is the host state; `prompt_answer` is what the user picks.
    pub fn new(initial: DesktopPermission, prompt_answer: DesktopPermission) -> Self {
        Self {
            permission: Mutex::new(initial),
            prompt_answer,
            prompts: Mutex::new(0),
            alerts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> usize {
        *self.prompts.lock()
    }

    pub fn alerts(&self) -> Vec<DesktopAlert> {
        self.alerts.lock().clone()
    }
}

#[async_trait]
impl DesktopNotifier for FakeDesktopNotifier {
    fn permission(&self) -> DesktopPermission {
        *self.permission.lock()
    }

    async fn request_permission(&self) -> Result<DesktopPermission, SideEffectError> {
        *self.prompts.lock() += 1;
        *self.permission.lock() = self.prompt_answer;
        Ok(self.prompt_answer)
    }

    fn notify(&self, alert: &DesktopAlert) -> Result<(), SideEffectError> {
        if !self.permission.lock().is_granted() {
            return Err(SideEffectError::PermissionDenied);
        }
        self.alerts.lock().push(alert.clone());
        Ok(())
    }
}
