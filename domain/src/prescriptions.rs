//! Outpatient prescriptions.
//!
//! Four-step lifecycle from entry to hand-off, plus refill bookkeeping:
//! a patient may flag a prescription for refill while refills remain.

use crate::events::DomainEvent;
use crate::workflow::{TransitionPolicy, WorkflowStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;

/// Unique identifier for a prescription (unique within a run).
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PrescriptionId(String);

impl PrescriptionId {
    /// Creates a `PrescriptionId` from a string
    #[must_use]
    pub const fn new(id: String) -> Self {
        Self(id)
    }

    /// Derive the id for the `n`-th prescription in the collection.
    #[must_use]
    pub fn from_seq(n: usize) -> Self {
        Self(format!("RX{n:03}"))
    }

    /// Returns the inner string value
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PrescriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lifecycle of a prescription.
///
/// Documented order: pending → processing → ready → dispensed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrescriptionStatus {
    /// Entered, not yet picked up by the pharmacy
    Pending,
    /// Being filled
    Processing,
    /// Ready for pickup at the front desk
    Ready,
    /// Handed to the patient
    Dispensed,
}

impl PrescriptionStatus {
    /// The documented forward sequence.
    pub const SEQUENCE: [PrescriptionStatus; 4] = [
        PrescriptionStatus::Pending,
        PrescriptionStatus::Processing,
        PrescriptionStatus::Ready,
        PrescriptionStatus::Dispensed,
    ];

    /// Lowercase wire/display name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            PrescriptionStatus::Pending => "pending",
            PrescriptionStatus::Processing => "processing",
            PrescriptionStatus::Ready => "ready",
            PrescriptionStatus::Dispensed => "dispensed",
        }
    }
}

impl fmt::Display for PrescriptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl WorkflowStatus for PrescriptionStatus {
    fn position(self) -> usize {
        match self {
            PrescriptionStatus::Pending => 0,
            PrescriptionStatus::Processing => 1,
            PrescriptionStatus::Ready => 2,
            PrescriptionStatus::Dispensed => 3,
        }
    }

    fn successor(self) -> Option<Self> {
        Self::SEQUENCE.get(self.position() + 1).copied()
    }
}

/// An outpatient prescription.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prescription {
    /// Run-unique identifier
    pub id: PrescriptionId,
    /// Patient reference
    pub patient_id: String,
    /// Patient display name
    pub patient_name: String,
    /// Medication name
    pub medication: String,
    /// Dosage text
    pub dosage: String,
    /// Units per fill
    pub quantity: u32,
    /// Refills left on the script
    pub refills_remaining: u32,
    /// Whether the patient has flagged this for refill
    pub refill_requested: bool,
    /// Prescribing physician
    pub prescribed_by: String,
    /// When the script was written
    pub date_prescribed: DateTime<Utc>,
    /// Current lifecycle status
    pub status: PrescriptionStatus,
    /// Who last processed it; set only when a status update names one
    pub processed_by: Option<String>,
    /// When it was last processed; set together with `processed_by`
    pub processed_time: Option<DateTime<Utc>>,
}

/// Payload for entering a new prescription.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPrescription {
    /// Patient reference
    pub patient_id: String,
    /// Patient display name
    pub patient_name: String,
    /// Medication name
    pub medication: String,
    /// Dosage text
    pub dosage: String,
    /// Units per fill
    pub quantity: u32,
    /// Refills granted on the script
    pub refills_remaining: u32,
    /// Prescribing physician
    pub prescribed_by: String,
}

/// Commands accepted by the prescription partition.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PrescriptionAction {
    /// Enter a new prescription (status starts at `pending`)
    Add(NewPrescription),
    /// Move a prescription to `status`; `processed_by` recorded only when
    /// supplied
    UpdateStatus {
        /// Prescription to update
        id: PrescriptionId,
        /// Target status
        status: PrescriptionStatus,
        /// Processor identity, when the caller wants it recorded
        processed_by: Option<String>,
    },
    /// Flag a prescription for refill. Granted only while refills remain;
    /// otherwise the command changes nothing.
    RequestRefill {
        /// Prescription to flag
        id: PrescriptionId,
    },
}

/// The prescription partition.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct PrescriptionState {
    prescriptions: Vec<Prescription>,
}

impl PrescriptionState {
    /// All prescriptions, oldest first.
    #[must_use]
    pub fn prescriptions(&self) -> &[Prescription] {
        &self.prescriptions
    }

    /// Look up one prescription.
    #[must_use]
    pub fn get(&self, id: &PrescriptionId) -> Option<&Prescription> {
        self.prescriptions.iter().find(|p| &p.id == id)
    }

    /// Prescriptions currently in `status`, oldest first.
    pub fn in_status(&self, status: PrescriptionStatus) -> impl Iterator<Item = &Prescription> {
        self.prescriptions.iter().filter(move |p| p.status == status)
    }

    /// Seed the partition with an existing prescription (run-initial data).
    pub fn push_seeded(&mut self, prescription: Prescription) {
        self.prescriptions.push(prescription);
    }

    /// Apply one command, returning the facts describing what changed.
    pub fn apply(
        &mut self,
        action: PrescriptionAction,
        policy: TransitionPolicy,
        now: DateTime<Utc>,
    ) -> SmallVec<[DomainEvent; 2]> {
        let mut events = SmallVec::new();
        match action {
            PrescriptionAction::Add(payload) => {
                let id = PrescriptionId::from_seq(self.prescriptions.len() + 1);
                let prescription = Prescription {
                    id: id.clone(),
                    patient_id: payload.patient_id,
                    patient_name: payload.patient_name,
                    medication: payload.medication.clone(),
                    dosage: payload.dosage,
                    quantity: payload.quantity,
                    refills_remaining: payload.refills_remaining,
                    refill_requested: false,
                    prescribed_by: payload.prescribed_by,
                    date_prescribed: now,
                    status: PrescriptionStatus::Pending,
                    processed_by: None,
                    processed_time: None,
                };
                tracing::debug!(id = %prescription.id, "prescription entered");
                self.prescriptions.push(prescription);
                events.push(DomainEvent::PrescriptionCreated {
                    id,
                    medication: payload.medication,
                });
            },
            PrescriptionAction::UpdateStatus {
                id,
                status,
                processed_by,
            } => {
                let Some(prescription) = self.prescriptions.iter_mut().find(|p| p.id == id) else {
                    tracing::warn!(id = %id, "status update for unknown prescription");
                    return events;
                };
                let from = prescription.status;
                if !policy.admits(from, status) {
                    events.push(DomainEvent::TransitionRejected {
                        entity: format!("prescription {id}"),
                        from: from.to_string(),
                        to: status.to_string(),
                    });
                    return events;
                }
                prescription.status = status;
                if let Some(processor) = processed_by {
                    prescription.processed_by = Some(processor);
                    prescription.processed_time = Some(now);
                }
                events.push(DomainEvent::PrescriptionStatusChanged {
                    id,
                    patient_name: prescription.patient_name.clone(),
                    from,
                    to: status,
                });
            },
            PrescriptionAction::RequestRefill { id } => {
                let Some(prescription) = self.prescriptions.iter_mut().find(|p| p.id == id) else {
                    tracing::warn!(id = %id, "refill request for unknown prescription");
                    return events;
                };
                if prescription.refills_remaining == 0 {
                    tracing::warn!(id = %id, "refill requested with no refills remaining");
                    return events;
                }
                prescription.refill_requested = true;
                events.push(DomainEvent::RefillRequested { id });
            },
        }
        events
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)] // Test code
mod tests {
    use super::*;
    use chrono::Utc;

    fn payload(refills: u32) -> NewPrescription {
        NewPrescription {
            patient_id: "P010".to_string(),
            patient_name: "Mary Jones".to_string(),
            medication: "Lisinopril".to_string(),
            dosage: "10mg".to_string(),
            quantity: 30,
            refills_remaining: refills,
            prescribed_by: "Dr. Chen".to_string(),
        }
    }

    #[test]
    fn add_starts_pending_with_sequential_id() {
        let mut state = PrescriptionState::default();
        state.apply(
            PrescriptionAction::Add(payload(2)),
            TransitionPolicy::Permissive,
            Utc::now(),
        );
        let rx = &state.prescriptions()[0];
        assert_eq!(rx.id.as_str(), "RX001");
        assert_eq!(rx.status, PrescriptionStatus::Pending);
        assert!(!rx.refill_requested);
    }

    #[test]
    fn refill_request_granted_while_refills_remain() {
        let mut state = PrescriptionState::default();
        let now = Utc::now();
        state.apply(
            PrescriptionAction::Add(payload(1)),
            TransitionPolicy::Permissive,
            now,
        );
        let id = state.prescriptions()[0].id.clone();

        let events = state.apply(
            PrescriptionAction::RequestRefill { id: id.clone() },
            TransitionPolicy::Permissive,
            now,
        );
        assert!(state.get(&id).unwrap().refill_requested);
        assert!(matches!(
            events.as_slice(),
            [DomainEvent::RefillRequested { .. }]
        ));
    }

    #[test]
    fn refill_request_without_refills_changes_nothing() {
        let mut state = PrescriptionState::default();
        let now = Utc::now();
        state.apply(
            PrescriptionAction::Add(payload(0)),
            TransitionPolicy::Permissive,
            now,
        );
        let id = state.prescriptions()[0].id.clone();

        let events = state.apply(
            PrescriptionAction::RequestRefill { id: id.clone() },
            TransitionPolicy::Permissive,
            now,
        );
        assert!(!state.get(&id).unwrap().refill_requested);
        assert!(events.is_empty());
    }

    #[test]
    fn status_change_emits_fact_with_both_endpoints() {
        let mut state = PrescriptionState::default();
        let now = Utc::now();
        state.apply(
            PrescriptionAction::Add(payload(0)),
            TransitionPolicy::Permissive,
            now,
        );
        let id = state.prescriptions()[0].id.clone();

        let events = state.apply(
            PrescriptionAction::UpdateStatus {
                id,
                status: PrescriptionStatus::Ready,
                processed_by: Some("Pharmacist Lee".to_string()),
            },
            TransitionPolicy::Permissive,
            now,
        );

        match events.as_slice() {
            [DomainEvent::PrescriptionStatusChanged { from, to, .. }] => {
                assert_eq!(*from, PrescriptionStatus::Pending);
                assert_eq!(*to, PrescriptionStatus::Ready);
            },
            other => panic!("unexpected events: {other:?}"),
        }
    }
}
