//! State machine trait for status enums.
//!
//! Used by lifecycle enums whose transitions must be checked before they
//! are applied, such as the desktop-notification permission.

use super::ValidationError;

/// Trait for status enums that represent state machines.
///
/// Implementors list their legal edges; `transition_to` and `is_terminal`
/// come for free.
///
/// # Example
///
/// ```ignore
/// impl StateMachine for DesktopPermission {
///     fn can_transition_to(&self, target: &Self) -> bool {
///         matches!((self, target), (Default, Granted) | (Default, Denied))
///     }
///
///     fn valid_transitions(&self) -> Vec<Self> {
///         match self {
///             Default => vec![Granted, Denied],
///             Granted | Denied => vec![],
///         }
///     }
/// }
///
/// let next = DesktopPermission::Default.transition_to(DesktopPermission::Granted)?;
/// ```
pub trait StateMachine: Sized + Copy + PartialEq + std::fmt::Debug {
    /// Returns true if transition from self to target is valid.
    fn can_transition_to(&self, target: &Self) -> bool;

    /// Returns all valid target states from current state.
    fn valid_transitions(&self) -> Vec<Self>;

    /// Performs transition with validation, returning error if invalid.
    fn transition_to(&self, target: Self) -> Result<Self, ValidationError> {
        if self.can_transition_to(&target) {
            Ok(target)
        } else {
            Err(ValidationError::invalid_format(
                "state_transition",
                format!("Cannot transition from {:?} to {:?}", self, target),
            ))
        }
    }

    /// Checks if current state is terminal (no valid outgoing transitions).
    fn is_terminal(&self) -> bool {
        self.valid_transitions().is_empty()
    }
}
