//! Ward medication requests.
//!
//! A medication request travels a six-step lifecycle from the ward's
//! initial ask to bedside delivery. The processor fields are written only
//! when a status update names who handled it.

use crate::events::DomainEvent;
use crate::workflow::{TransitionPolicy, WorkflowStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;

/// Unique identifier for a medication request (unique within a run).
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MedicationRequestId(String);

impl MedicationRequestId {
    /// Creates a `MedicationRequestId` from a string
    #[must_use]
    pub const fn new(id: String) -> Self {
        Self(id)
    }

    /// Derive the id for the `n`-th request in the collection.
    #[must_use]
    pub fn from_seq(n: usize) -> Self {
        Self(format!("MR{n:03}"))
    }

    /// Returns the inner string value
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MedicationRequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Clinical urgency of a request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    /// Routine restock of a ward supply
    Low,
    /// Standard request
    Medium,
    /// Needed now
    High,
}

/// Lifecycle of a medication request.
///
/// Documented order: request → pending → sent → dispatched → received →
/// delivered. Whether deviations are admitted is the transition policy's
/// call, not this enum's.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MedicationStatus {
    /// Entered by the ward
    Request,
    /// Acknowledged, awaiting pharmacy
    Pending,
    /// Forwarded to the pharmacy system
    Sent,
    /// Pharmacy dispatched the medication
    Dispatched,
    /// Ward received the medication
    Received,
    /// Administered/delivered to the patient
    Delivered,
}

impl MedicationStatus {
    /// The documented forward sequence.
    pub const SEQUENCE: [MedicationStatus; 6] = [
        MedicationStatus::Request,
        MedicationStatus::Pending,
        MedicationStatus::Sent,
        MedicationStatus::Dispatched,
        MedicationStatus::Received,
        MedicationStatus::Delivered,
    ];

    /// Lowercase wire/display name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            MedicationStatus::Request => "request",
            MedicationStatus::Pending => "pending",
            MedicationStatus::Sent => "sent",
            MedicationStatus::Dispatched => "dispatched",
            MedicationStatus::Received => "received",
            MedicationStatus::Delivered => "delivered",
        }
    }
}

impl fmt::Display for MedicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl WorkflowStatus for MedicationStatus {
    fn position(self) -> usize {
        match self {
            MedicationStatus::Request => 0,
            MedicationStatus::Pending => 1,
            MedicationStatus::Sent => 2,
            MedicationStatus::Dispatched => 3,
            MedicationStatus::Received => 4,
            MedicationStatus::Delivered => 5,
        }
    }

    fn successor(self) -> Option<Self> {
        Self::SEQUENCE.get(self.position() + 1).copied()
    }
}

/// A ward medication request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MedicationRequest {
    /// Run-unique identifier
    pub id: MedicationRequestId,
    /// Patient reference
    pub patient_id: String,
    /// Patient display name
    pub patient_name: String,
    /// Ward room
    pub room_number: String,
    /// Medication name
    pub medication: String,
    /// Dosage text (e.g. "500mg")
    pub dosage: String,
    /// Units requested
    pub quantity: u32,
    /// Clinical urgency
    pub urgency: Urgency,
    /// Current lifecycle status
    pub status: MedicationStatus,
    /// Who entered the request
    pub requested_by: String,
    /// When the request was entered
    pub request_time: DateTime<Utc>,
    /// Who last processed it; set only when a status update names one
    pub processed_by: Option<String>,
    /// When it was last processed; set together with `processed_by`
    pub processed_time: Option<DateTime<Utc>>,
}

/// Payload for entering a new medication request.
///
/// The partition assigns `id`, `status` (always `request`), and
/// `request_time`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewMedicationRequest {
    /// Patient reference
    pub patient_id: String,
    /// Patient display name
    pub patient_name: String,
    /// Ward room
    pub room_number: String,
    /// Medication name
    pub medication: String,
    /// Dosage text
    pub dosage: String,
    /// Units requested
    pub quantity: u32,
    /// Clinical urgency
    pub urgency: Urgency,
    /// Who entered the request
    pub requested_by: String,
}

/// Commands accepted by the medication partition.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MedicationAction {
    /// Enter a new request (status starts at `request`)
    Add(NewMedicationRequest),
    /// Move a request to `status`; `processed_by` is recorded only when
    /// supplied
    UpdateStatus {
        /// Request to update
        id: MedicationRequestId,
        /// Target status
        status: MedicationStatus,
        /// Processor identity, when the caller wants it recorded
        processed_by: Option<String>,
    },
}

/// The medication-request partition.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct MedicationState {
    requests: Vec<MedicationRequest>,
}

impl MedicationState {
    /// All requests, oldest first.
    #[must_use]
    pub fn requests(&self) -> &[MedicationRequest] {
        &self.requests
    }

    /// Look up one request.
    #[must_use]
    pub fn get(&self, id: &MedicationRequestId) -> Option<&MedicationRequest> {
        self.requests.iter().find(|r| &r.id == id)
    }

    /// Requests currently in `status`, oldest first.
    pub fn in_status(&self, status: MedicationStatus) -> impl Iterator<Item = &MedicationRequest> {
        self.requests.iter().filter(move |r| r.status == status)
    }

    /// Seed the partition with an existing request (run-initial data).
    pub fn push_seeded(&mut self, request: MedicationRequest) {
        self.requests.push(request);
    }

    /// Apply one command, returning the facts describing what changed.
    pub fn apply(
        &mut self,
        action: MedicationAction,
        policy: TransitionPolicy,
        now: DateTime<Utc>,
    ) -> SmallVec<[DomainEvent; 2]> {
        let mut events = SmallVec::new();
        match action {
            MedicationAction::Add(payload) => {
                let id = MedicationRequestId::from_seq(self.requests.len() + 1);
                let request = MedicationRequest {
                    id: id.clone(),
                    patient_id: payload.patient_id,
                    patient_name: payload.patient_name,
                    room_number: payload.room_number.clone(),
                    medication: payload.medication.clone(),
                    dosage: payload.dosage,
                    quantity: payload.quantity,
                    urgency: payload.urgency,
                    status: MedicationStatus::Request,
                    requested_by: payload.requested_by,
                    request_time: now,
                    processed_by: None,
                    processed_time: None,
                };
                tracing::debug!(id = %request.id, urgency = ?request.urgency, "medication request entered");
                self.requests.push(request);
                events.push(DomainEvent::MedicationRequested {
                    id,
                    medication: payload.medication,
                    room_number: payload.room_number,
                    urgency: payload.urgency,
                });
            },
            MedicationAction::UpdateStatus {
                id,
                status,
                processed_by,
            } => {
                let Some(request) = self.requests.iter_mut().find(|r| r.id == id) else {
                    tracing::warn!(id = %id, "status update for unknown medication request");
                    return events;
                };
                let from = request.status;
                if !policy.admits(from, status) {
                    events.push(DomainEvent::TransitionRejected {
                        entity: format!("medication request {id}"),
                        from: from.to_string(),
                        to: status.to_string(),
                    });
                    return events;
                }
                request.status = status;
                if let Some(processor) = processed_by {
                    request.processed_by = Some(processor);
                    request.processed_time = Some(now);
                }
                events.push(DomainEvent::MedicationStatusChanged {
                    id,
                    from,
                    to: status,
                });
            },
        }
        events
    }
}
