//! Workflow status machines.
//!
//! Each lifecycle-bearing entity carries a closed status enum whose
//! documented order is exposed through [`WorkflowStatus`]. Whether a
//! status-update command may deviate from that order is decided by the
//! injected [`TransitionPolicy`], not baked into the reducers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A status enum with a documented forward sequence.
pub trait WorkflowStatus: Copy + Eq + fmt::Display {
    /// Zero-based position of this status in the documented sequence.
    fn position(self) -> usize;

    /// The immediate successor in the documented sequence, if any.
    fn successor(self) -> Option<Self>;
}

/// Governs how status-update commands are admitted.
///
/// The portal historically accepts any target status regardless of the
/// current one (a medication request may jump straight from `request` to
/// `delivered`). That permissiveness is preserved as the default until
/// product intent is clarified; [`TransitionPolicy::Strict`] is the opt-in
/// guard.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransitionPolicy {
    /// Apply any target status verbatim.
    #[default]
    Permissive,
    /// Accept only the immediate successor in the documented sequence.
    /// Rejects skips and backward moves alike; a rejected transition
    /// leaves the entity untouched and surfaces as a warning notification.
    Strict,
}

impl TransitionPolicy {
    /// Whether a transition from `current` to `target` is admitted.
    pub fn admits<S: WorkflowStatus>(self, current: S, target: S) -> bool {
        match self {
            TransitionPolicy::Permissive => true,
            TransitionPolicy::Strict => current.successor() == Some(target),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::medication::MedicationStatus;

    #[test]
    fn permissive_admits_everything() {
        let policy = TransitionPolicy::Permissive;
        assert!(policy.admits(MedicationStatus::Request, MedicationStatus::Delivered));
        assert!(policy.admits(MedicationStatus::Delivered, MedicationStatus::Request));
    }

    #[test]
    fn strict_admits_only_the_successor() {
        let policy = TransitionPolicy::Strict;
        assert!(policy.admits(MedicationStatus::Request, MedicationStatus::Pending));
        assert!(!policy.admits(MedicationStatus::Request, MedicationStatus::Sent));
        assert!(!policy.admits(MedicationStatus::Pending, MedicationStatus::Request));
        assert!(!policy.admits(MedicationStatus::Delivered, MedicationStatus::Delivered));
    }
}
