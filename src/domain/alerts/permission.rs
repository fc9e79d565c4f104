//! Desktop-notification permission lifecycle.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::StateMachine;

/// Host permission to show desktop notifications.
///
/// ```text
/// Default --request--> Granted
/// Default --request--> Denied
/// ```
///
/// Both outcomes are terminal; `Denied` in particular must never re-prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DesktopPermission {
    #[default]
    Default,
    Granted,
    Denied,
}

impl DesktopPermission {
    pub fn is_granted(&self) -> bool {
        *self == DesktopPermission::Granted
    }

    /// Only the undecided state may prompt the user.
    pub fn may_prompt(&self) -> bool {
        *self == DesktopPermission::Default
    }
}

impl StateMachine for DesktopPermission {
    fn can_transition_to(&self, target: &Self) -> bool {
        use DesktopPermission::*;
        matches!((self, target), (Default, Granted) | (Default, Denied))
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use DesktopPermission::*;
        match self {
            Default => vec![Granted, Denied],
            Granted | Denied => vec![],
        }
    }
}
