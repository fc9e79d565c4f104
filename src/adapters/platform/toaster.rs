//! `Toaster` that writes toasts to the log.

use crate::domain::alerts::{Toast, ToastSeverity};
use crate::ports::Toaster;

/// Writes toasts to the log at a level matching their severity.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogToaster;

impl Toaster for LogToaster {
    fn show(&self, toast: &Toast) {
        match toast.severity {
            ToastSeverity::Error => tracing::error!(
                title = %toast.title,
                persistent = toast.persistent,
                "{}",
                toast.message
            ),
            ToastSeverity::Warning => tracing::warn!(title = %toast.title, "{}", toast.message),
            ToastSeverity::Success | ToastSeverity::Info => {
                tracing::info!(title = %toast.title, severity = ?toast.severity, "{}", toast.message)
            }
        }
    }
}
