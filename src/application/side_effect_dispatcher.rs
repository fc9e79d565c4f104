//! SideEffectDispatcher - turns push events into toasts, sounds and
//! desktop notifications.
//!
//! Every capability call is best-effort. Failures are logged at `warn`
//! and swallowed; `handle` always returns `Ok` so the router never sees a
//! side-effect failure.

use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use crate::domain::alerts::{DesktopAlert, DesktopPermission, SoundCue, Toast, ToastSeverity};
use crate::domain::connection::{RealtimeEvent, SIDE_EFFECT_EVENT_TYPES};
use crate::domain::foundation::{DomainError, ErrorCode, StateMachine};
use crate::domain::notification::NotificationPreferences;
use crate::ports::{
    DesktopNotifier, EventHandler, EventSubscriber, SideEffectError, SoundPlayer, Toaster,
};

/// Host capabilities the dispatcher drives.
#[derive(Clone)]
pub struct SideEffectPorts {
    pub toaster: Arc<dyn Toaster>,
    pub sound: Arc<dyn SoundPlayer>,
    pub desktop: Arc<dyn DesktopNotifier>,
}

pub struct SideEffectDispatcher {
    ports: SideEffectPorts,
    preferences: RwLock<NotificationPreferences>,
    permission: Mutex<DesktopPermission>,
    prompt_guard: tokio::sync::Mutex<()>,
}

impl SideEffectDispatcher {
    pub fn new(ports: SideEffectPorts, preferences: NotificationPreferences) -> Self {
        let permission = ports.desktop.permission();
        Self {
            ports,
            preferences: RwLock::new(preferences),
            permission: Mutex::new(permission),
            prompt_guard: tokio::sync::Mutex::new(()),
        }
    }

    /// Subscribes this dispatcher to every side-effect event name.
    pub fn register(self: &Arc<Self>, subscriber: &impl EventSubscriber) {
        subscriber.subscribe_all(SIDE_EFFECT_EVENT_TYPES, self.clone());
    }

    pub fn preferences(&self) -> NotificationPreferences {
        self.preferences.read().clone()
    }

    pub fn set_preferences(&self, preferences: NotificationPreferences) {
        *self.preferences.write() = preferences;
    }

    pub fn permission(&self) -> DesktopPermission {
        *self.permission.lock()
    }

    /// Asks the host for desktop permission if it has not been decided.
    ///
    /// `Granted` and `Denied` are final: neither prompts again.
    pub async fn request_desktop_permission(&self) -> DesktopPermission {
        let _prompt = self.prompt_guard.lock().await;

        let current = self.permission();
        if !current.may_prompt() {
            tracing::debug!(permission = ?current, "Desktop permission already decided");
            return current;
        }

        let answer = match self.ports.desktop.request_permission().await {
            Ok(answer) => answer,
            Err(e) => {
                report_failure("desktop_permission", e);
                return current;
            }
        };

        match current.transition_to(answer) {
            Ok(next) => {
                *self.permission.lock() = next;
                tracing::info!(permission = ?next, "Desktop permission decided");
                next
            }
            // Prompt dismissed without a decision.
            Err(_) => current,
        }
    }

    fn present(&self, toast: Toast, tag: Option<String>) {
        let preferences = self.preferences();

        self.ports.toaster.show(&toast);

        if preferences.enable_sound {
            if let Err(e) = self.ports.sound.play(SoundCue::for_severity(toast.severity)) {
                report_failure("sound", e);
            }
        }

        if preferences.enable_desktop && self.permission().is_granted() {
            let alert = DesktopAlert::from_toast(&toast, tag);
            if let Err(e) = self.ports.desktop.notify(&alert) {
                report_failure("desktop", e);
            }
        }
    }
}

/// Logs a swallowed capability failure.
fn report_failure(capability: &'static str, cause: SideEffectError) -> DomainError {
    let error = DomainError::new(ErrorCode::SideEffectFailed, cause.to_string())
        .with_detail("capability", capability);
    tracing::warn!(capability, error = %error, "Side effect failed");
    error
}

impl EventHandler for SideEffectDispatcher {
    fn handle(&self, event: &RealtimeEvent) -> Result<(), DomainError> {
        match event {
            RealtimeEvent::NewNotification(notification) => {
                let enabled = self
                    .preferences
                    .read()
                    .is_enabled(notification.notification_type);
                if !enabled {
                    tracing::debug!(
                        notification_id = %notification.id,
                        kind = notification.notification_type.as_str(),
                        "Notification type muted"
                    );
                    return Ok(());
                }
                self.present(
                    Toast::for_notification(notification),
                    Some(format!("notification-{}", notification.id)),
                );
            }
            RealtimeEvent::NewInternshipAvailable(internship) => {
                let tag = internship.id.map(|id| format!("internship-{id}"));
                self.present(Toast::for_new_internship(internship), tag);
            }
            RealtimeEvent::DeadlineReminder(reminder) => {
                let tag = reminder.internship_id.map(|id| format!("deadline-{id}"));
                self.present(Toast::for_deadline(reminder), tag);
            }
            RealtimeEvent::ServerShutdown { message } => {
                self.ports
                    .toaster
                    .show(&Toast::new(ToastSeverity::Info, "Server maintenance", message.clone()));
            }
            RealtimeEvent::ConnectError { error } => {
                self.ports.toaster.show(&Toast::new(
                    ToastSeverity::Error,
                    "Could not connect",
                    format!("Live updates are unavailable: {error}"),
                ));
            }
            RealtimeEvent::ReconnectError { attempt, .. } if *attempt == 1 => {
                self.ports.toaster.show(&Toast::new(
                    ToastSeverity::Warning,
                    "Connection lost",
                    "Trying to reconnect to live updates",
                ));
            }
            RealtimeEvent::ReconnectFailed { attempts } => {
                self.ports.toaster.show(
                    &Toast::new(
                        ToastSeverity::Error,
                        "Live updates unavailable",
                        format!(
                            "Could not reconnect after {attempts} attempts. Reload to try again."
                        ),
                    )
                    .persistent(),
                );
            }
            _ => {}
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "SideEffectDispatcher"
    }
}
