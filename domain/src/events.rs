//! Domain facts.
//!
//! Partition apply functions return these facts to describe what a command
//! actually changed. The cross-domain observer consumes them inside the
//! same reduce call; they never re-enter the store and are never persisted.

use crate::inventory::ItemId;
use crate::labs::{LabOrderId, LabPriority, LabStatus};
use crate::medication::{MedicationRequestId, MedicationStatus, Urgency};
use crate::prescriptions::{PrescriptionId, PrescriptionStatus};

/// A fact about an applied command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DomainEvent {
    /// A new medication request was entered
    MedicationRequested {
        /// Assigned request id
        id: MedicationRequestId,
        /// Medication name
        medication: String,
        /// Ward room
        room_number: String,
        /// Clinical urgency
        urgency: Urgency,
    },
    /// A medication request changed status
    MedicationStatusChanged {
        /// Request id
        id: MedicationRequestId,
        /// Status before the command
        from: MedicationStatus,
        /// Status after the command
        to: MedicationStatus,
    },
    /// A new prescription was entered
    PrescriptionCreated {
        /// Assigned prescription id
        id: PrescriptionId,
        /// Medication name
        medication: String,
    },
    /// A prescription changed status
    PrescriptionStatusChanged {
        /// Prescription id
        id: PrescriptionId,
        /// Patient display name (for front-desk messaging)
        patient_name: String,
        /// Status before the command
        from: PrescriptionStatus,
        /// Status after the command
        to: PrescriptionStatus,
    },
    /// A patient flagged a prescription for refill
    RefillRequested {
        /// Prescription id
        id: PrescriptionId,
    },
    /// A new lab order was entered
    LabOrdered {
        /// Assigned order id
        id: LabOrderId,
        /// Test to run
        test_type: String,
        /// Turnaround class
        priority: LabPriority,
    },
    /// A lab order changed status
    LabStatusChanged {
        /// Order id
        id: LabOrderId,
        /// Status before the command
        from: LabStatus,
        /// Status after the command
        to: LabStatus,
    },
    /// An item's stock level was set
    StockLevelChanged {
        /// Item id
        item_id: ItemId,
        /// Item display name
        name: String,
        /// Level before the command
        previous: u32,
        /// Level after the command
        current: u32,
        /// The item's reorder threshold
        min_stock: u32,
    },
    /// An item was restocked
    ItemRestocked {
        /// Item id
        item_id: ItemId,
        /// Item display name
        name: String,
        /// Units received
        quantity: u32,
        /// Level after the command
        current: u32,
    },
    /// A status update was refused by the strict transition policy
    TransitionRejected {
        /// Entity description (e.g. "medication request MR001")
        entity: String,
        /// Status the entity stayed in
        from: String,
        /// Status the command asked for
        to: String,
    },
}
