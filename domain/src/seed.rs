//! Run-initial portal data.
//!
//! The portal has no persistence; every run starts from this dataset so
//! the dashboards have material and the simulated event source finds
//! eligible targets immediately. Entities sit in mixed lifecycle stages
//! on purpose.

use crate::inventory::{AlertId, AlertSeverity, AlertType, InventoryItem, ItemId, StockAlert};
use crate::labs::{LabOrder, LabOrderId, LabPriority, LabStatus};
use crate::medication::{MedicationRequest, MedicationRequestId, MedicationStatus, Urgency};
use crate::prescriptions::{Prescription, PrescriptionId, PrescriptionStatus};
use crate::state::PortalState;
use chrono::{DateTime, Duration, Utc};

/// Build the seeded portal state.
///
/// `now` stamps the dataset; entity timestamps are backdated relative to
/// it so ordering looks natural.
#[must_use]
#[allow(clippy::too_many_lines)] // Fixture data
pub fn seeded(now: DateTime<Utc>) -> PortalState {
    let mut state = PortalState::new();

    // Inventory: MED002 is seeded already below its minimum, with the
    // matching open alert the derivation convention requires.
    for item in [
        InventoryItem {
            id: ItemId::new("MED001"),
            name: "Paracetamol 500mg".to_string(),
            unit: "tablets".to_string(),
            current_stock: 120,
            min_stock: 20,
            max_stock: 500,
            last_restocked: Some(now - Duration::days(12)),
        },
        InventoryItem {
            id: ItemId::new("MED002"),
            name: "Amoxicillin 250mg".to_string(),
            unit: "capsules".to_string(),
            current_stock: 18,
            min_stock: 25,
            max_stock: 400,
            last_restocked: Some(now - Duration::days(30)),
        },
        InventoryItem {
            id: ItemId::new("MED003"),
            name: "Insulin Glargine".to_string(),
            unit: "vials".to_string(),
            current_stock: 42,
            min_stock: 10,
            max_stock: 80,
            last_restocked: Some(now - Duration::days(4)),
        },
        InventoryItem {
            id: ItemId::new("SUP001"),
            name: "Syringes 5ml".to_string(),
            unit: "pieces".to_string(),
            current_stock: 800,
            min_stock: 200,
            max_stock: 2000,
            last_restocked: Some(now - Duration::days(7)),
        },
    ] {
        state.inventory.push_seeded_item(item);
    }
    state.inventory.push_seeded_alert(StockAlert {
        id: AlertId::from_seq(1),
        item_id: ItemId::new("MED002"),
        alert_type: AlertType::LowStock,
        severity: AlertSeverity::High,
        message: "Amoxicillin 250mg is running low: 18 remaining".to_string(),
        created_at: now - Duration::hours(6),
    });

    // Medication requests in mixed stages so pharmacy/nurse simulators
    // have something to move.
    for request in [
        MedicationRequest {
            id: MedicationRequestId::new("MR001".to_string()),
            patient_id: "P001".to_string(),
            patient_name: "John Smith".to_string(),
            room_number: "204".to_string(),
            medication: "Paracetamol 500mg".to_string(),
            dosage: "500mg".to_string(),
            quantity: 20,
            urgency: Urgency::Medium,
            status: MedicationStatus::Sent,
            requested_by: "Nurse Adams".to_string(),
            request_time: now - Duration::hours(3),
            processed_by: Some("Pharmacy Desk".to_string()),
            processed_time: Some(now - Duration::hours(2)),
        },
        MedicationRequest {
            id: MedicationRequestId::new("MR002".to_string()),
            patient_id: "P004".to_string(),
            patient_name: "Elena Ruiz".to_string(),
            room_number: "311".to_string(),
            medication: "Insulin Glargine".to_string(),
            dosage: "10 units".to_string(),
            quantity: 1,
            urgency: Urgency::High,
            status: MedicationStatus::Request,
            requested_by: "Nurse Okafor".to_string(),
            request_time: now - Duration::minutes(25),
            processed_by: None,
            processed_time: None,
        },
    ] {
        state.medications.push_seeded(request);
    }

    // Prescriptions: RX010 pending (front of the pharmacy queue).
    for prescription in [
        Prescription {
            id: PrescriptionId::new("RX010".to_string()),
            patient_id: "P010".to_string(),
            patient_name: "Mary Jones".to_string(),
            medication: "Lisinopril".to_string(),
            dosage: "10mg".to_string(),
            quantity: 30,
            refills_remaining: 2,
            refill_requested: false,
            prescribed_by: "Dr. Chen".to_string(),
            date_prescribed: now - Duration::days(1),
            status: PrescriptionStatus::Pending,
            processed_by: None,
            processed_time: None,
        },
        Prescription {
            id: PrescriptionId::new("RX011".to_string()),
            patient_id: "P011".to_string(),
            patient_name: "Omar Haddad".to_string(),
            medication: "Metformin".to_string(),
            dosage: "850mg".to_string(),
            quantity: 60,
            refills_remaining: 0,
            refill_requested: false,
            prescribed_by: "Dr. Chen".to_string(),
            date_prescribed: now - Duration::days(2),
            status: PrescriptionStatus::Processing,
            processed_by: Some("Pharmacist Lee".to_string()),
            processed_time: Some(now - Duration::hours(1)),
        },
    ] {
        state.prescriptions.push_seeded(prescription);
    }

    // Lab orders: one in the lab, one waiting for collection.
    for order in [
        LabOrder {
            id: LabOrderId::new("LAB001".to_string()),
            patient_id: "P001".to_string(),
            patient_name: "John Smith".to_string(),
            test_type: "CBC".to_string(),
            priority: LabPriority::Routine,
            ordered_by: "Dr. Chen".to_string(),
            order_date: now - Duration::hours(5),
            status: LabStatus::Processing,
            completed_date: None,
            results: None,
        },
        LabOrder {
            id: LabOrderId::new("LAB002".to_string()),
            patient_id: "P004".to_string(),
            patient_name: "Elena Ruiz".to_string(),
            test_type: "Basic Metabolic Panel".to_string(),
            priority: LabPriority::Urgent,
            ordered_by: "Dr. Osei".to_string(),
            order_date: now - Duration::hours(1),
            status: LabStatus::Ordered,
            completed_date: None,
            results: None,
        },
    ] {
        state.labs.push_seeded(order);
    }

    state
}
