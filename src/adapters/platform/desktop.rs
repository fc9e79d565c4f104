//! `DesktopNotifier` that logs alerts and answers the permission prompt itself.

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::domain::alerts::{DesktopAlert, DesktopPermission};
use crate::domain::foundation::StateMachine;
use crate::ports::{DesktopNotifier, SideEffectError};

/// Desktop notifier that logs alerts.
///
/// There is no interactive prompt in a headless process, so a permission
/// request resolves to the answer chosen at construction.
#[derive(Debug)]
pub struct LogDesktopNotifier {
    permission: Mutex<DesktopPermission>,
    auto_answer: DesktopPermission,
}

impl LogDesktopNotifier {
    pub fn new(auto_answer: DesktopPermission) -> Self {
        Self {
            permission: Mutex::new(DesktopPermission::Default),
            auto_answer,
        }
    }
}

#[async_trait]
impl DesktopNotifier for LogDesktopNotifier {
    fn permission(&self) -> DesktopPermission {
        *self.permission.lock()
    }

    async fn request_permission(&self) -> Result<DesktopPermission, SideEffectError> {
        let mut permission = self.permission.lock();
        if let Ok(next) = permission.transition_to(self.auto_answer) {
            *permission = next;
        }
        Ok(*permission)
    }

    fn notify(&self, alert: &DesktopAlert) -> Result<(), SideEffectError> {
        if !self.permission().is_granted() {
            return Err(SideEffectError::PermissionDenied);
        }
        tracing::info!(title = %alert.title, tag = ?alert.tag, "Desktop notification: {}", alert.body);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alert() -> DesktopAlert {
        DesktopAlert {
            title: "t".into(),
            body: "b".into(),
            tag: None,
        }
    }

    #[tokio::test]
    async fn notify_requires_granted_permission() {
        let notifier = LogDesktopNotifier::new(DesktopPermission::Granted);
        assert_eq!(notifier.notify(&alert()), Err(SideEffectError::PermissionDenied));

        assert_eq!(notifier.request_permission().await, Ok(DesktopPermission::Granted));
        assert!(notifier.notify(&alert()).is_ok());
    }

    #[tokio::test]
    async fn denial_is_kept() {
        let notifier = LogDesktopNotifier::new(DesktopPermission::Denied);
        notifier.request_permission().await.unwrap();
        assert_eq!(notifier.permission(), DesktopPermission::Denied);
    }
}
