//! The portal command set.
//!
//! One closed tagged union over every mutation the portal accepts, nested
//! per partition. The UI layer (and the simulated event source) builds
//! these values and sends them through the store; nothing else mutates
//! state.

use crate::inventory::InventoryAction;
use crate::labs::LabAction;
use crate::medication::MedicationAction;
use crate::notifications::NotificationAction;
use crate::prescriptions::PrescriptionAction;
use serde::{Deserialize, Serialize};

/// A portal command.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PortalAction {
    /// Notification engine commands
    Notification(NotificationAction),
    /// Medication request commands
    Medication(MedicationAction),
    /// Prescription commands
    Prescription(PrescriptionAction),
    /// Lab order commands
    Lab(LabAction),
    /// Inventory commands
    Inventory(InventoryAction),
}

impl From<NotificationAction> for PortalAction {
    fn from(action: NotificationAction) -> Self {
        PortalAction::Notification(action)
    }
}

impl From<MedicationAction> for PortalAction {
    fn from(action: MedicationAction) -> Self {
        PortalAction::Medication(action)
    }
}

impl From<PrescriptionAction> for PortalAction {
    fn from(action: PrescriptionAction) -> Self {
        PortalAction::Prescription(action)
    }
}

impl From<LabAction> for PortalAction {
    fn from(action: LabAction) -> Self {
        PortalAction::Lab(action)
    }
}

impl From<InventoryAction> for PortalAction {
    fn from(action: InventoryAction) -> Self {
        PortalAction::Inventory(action)
    }
}
