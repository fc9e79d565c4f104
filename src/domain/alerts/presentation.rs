//! User-facing presentations chosen for push events.

use serde::Serialize;

use crate::domain::connection::{DeadlineReminder, InternshipSummary};
use crate::domain::notification::{Notification, NotificationType};

/// Toast severity, mirrored by the UI's colour scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastSeverity {
    Success,
    Info,
    Warning,
    Error,
}

impl ToastSeverity {
    /// Severity for a notification type.
    pub fn for_notification(notification_type: NotificationType) -> Self {
        match notification_type {
            NotificationType::NewMatch => ToastSeverity::Success,
            NotificationType::DeadlineReminder => ToastSeverity::Warning,
            NotificationType::StatusChange => ToastSeverity::Info,
            _ => ToastSeverity::Info,
        }
    }
}

/// A toast message. `persistent` toasts stay until acknowledged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Toast {
    pub severity: ToastSeverity,
    pub title: String,
    pub message: String,
    pub persistent: bool,
}

impl Toast {
    pub fn new(severity: ToastSeverity, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity,
            title: title.into(),
            message: message.into(),
            persistent: false,
        }
    }

    pub fn persistent(mut self) -> Self {
        self.persistent = true;
        self
    }

    pub fn for_notification(notification: &Notification) -> Self {
        Self::new(
            ToastSeverity::for_notification(notification.notification_type),
            notification.title.clone(),
            notification.message.clone(),
        )
    }

    pub fn for_new_internship(internship: &InternshipSummary) -> Self {
        let message = match &internship.company_name {
            Some(company) => format!("{} at {}", internship.title, company),
            None => internship.title.clone(),
        };
        Self::new(ToastSeverity::Success, "New internship available", message)
    }

    pub fn for_deadline(reminder: &DeadlineReminder) -> Self {
        Self::new(
            ToastSeverity::Warning,
            "Application deadline approaching",
            format!(
                "The deadline for {} at {} is coming up",
                reminder.internship_title, reminder.company_name
            ),
        )
    }
}

/// Sound played alongside a toast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SoundCue {
    Notification,
    Warning,
}

impl SoundCue {
    pub fn for_severity(severity: ToastSeverity) -> Self {
        match severity {
            ToastSeverity::Warning | ToastSeverity::Error => SoundCue::Warning,
            _ => SoundCue::Notification,
        }
    }
}

/// Desktop (OS-level) notification content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DesktopAlert {
    pub title: String,
    pub body: String,
    /// Lets the platform collapse repeats of the same notification.
    pub tag: Option<String>,
}

impl DesktopAlert {
    pub fn from_toast(toast: &Toast, tag: Option<String>) -> Self {
        Self {
            title: toast.title.clone(),
            body: toast.message.clone(),
            tag,
        }
    }
}
