//! Terminal-bell `SoundPlayer` for headless hosts.

use std::io::Write;

use parking_lot::Mutex;

use crate::domain::alerts::SoundCue;
use crate::ports::{SideEffectError, SoundPlayer};

/// Rings the terminal bell on a writer (stderr by default).
pub struct TerminalBellPlayer {
    out: Mutex<Box<dyn Write + Send>>,
}

impl TerminalBellPlayer {
    pub fn stderr() -> Self {
        Self::with_writer(Box::new(std::io::stderr()))
    }

    pub fn with_writer(out: Box<dyn Write + Send>) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }
}

impl Default for TerminalBellPlayer {
    fn default() -> Self {
        Self::stderr()
    }
}

impl SoundPlayer for TerminalBellPlayer {
    fn play(&self, cue: SoundCue) -> Result<(), SideEffectError> {
        // Warnings ring twice.
        let bell: &[u8] = match cue {
            SoundCue::Notification => b"\x07",
            SoundCue::Warning => b"\x07\x07",
        };
        let mut out = self.out.lock();
        out.write_all(bell)
            .and_then(|_| out.flush())
            .map_err(|e| SideEffectError::Failed(e.to_string()))?;
        tracing::trace!(?cue, "Bell rung");
        Ok(())
    }
}
