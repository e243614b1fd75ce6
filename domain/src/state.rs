//! The portal state container.
//!
//! One explicitly constructed value owning every partition — injected into
//! the store at startup, never reached through an ambient global. Each
//! partition is exclusively owned by its own apply logic; reads go through
//! the partition query methods.

use crate::inventory::InventoryState;
use crate::labs::LabState;
use crate::medication::MedicationState;
use crate::notifications::NotificationState;
use crate::prescriptions::PrescriptionState;
use serde::{Deserialize, Serialize};

/// All portal state, partitioned by domain.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct PortalState {
    /// Notification engine partition
    pub notifications: NotificationState,
    /// Medication request partition
    pub medications: MedicationState,
    /// Prescription partition
    pub prescriptions: PrescriptionState,
    /// Lab order partition
    pub labs: LabState,
    /// Inventory partition (items plus derived alerts)
    pub inventory: InventoryState,
}

impl PortalState {
    /// An empty portal.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}
