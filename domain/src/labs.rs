//! Laboratory orders.
//!
//! Four-step lifecycle from order to completed results. The `results`
//! field is populated only on the transition into `completed`.

use crate::events::DomainEvent;
use crate::workflow::{TransitionPolicy, WorkflowStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;

/// Unique identifier for a lab order (unique within a run).
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LabOrderId(String);

impl LabOrderId {
    /// Creates a `LabOrderId` from a string
    #[must_use]
    pub const fn new(id: String) -> Self {
        Self(id)
    }

    /// Derive the id for the `n`-th order in the collection.
    #[must_use]
    pub fn from_seq(n: usize) -> Self {
        Self(format!("LAB{n:03}"))
    }

    /// Returns the inner string value
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LabOrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Turnaround class of a lab order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LabPriority {
    /// Normal queue
    Routine,
    /// Expedited
    Urgent,
    /// Immediate processing
    Stat,
}

impl LabPriority {
    /// Label used in notification copy.
    #[must_use]
    pub const fn as_label(self) -> &'static str {
        match self {
            LabPriority::Routine => "routine",
            LabPriority::Urgent => "urgent",
            LabPriority::Stat => "STAT",
        }
    }
}

/// Lifecycle of a lab order.
///
/// Documented order: ordered → collected → processing → completed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LabStatus {
    /// Entered by the ordering physician
    Ordered,
    /// Sample collected
    Collected,
    /// In the lab
    Processing,
    /// Results available
    Completed,
}

impl LabStatus {
    /// The documented forward sequence.
    pub const SEQUENCE: [LabStatus; 4] = [
        LabStatus::Ordered,
        LabStatus::Collected,
        LabStatus::Processing,
        LabStatus::Completed,
    ];

    /// Lowercase wire/display name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            LabStatus::Ordered => "ordered",
            LabStatus::Collected => "collected",
            LabStatus::Processing => "processing",
            LabStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for LabStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl WorkflowStatus for LabStatus {
    fn position(self) -> usize {
        match self {
            LabStatus::Ordered => 0,
            LabStatus::Collected => 1,
            LabStatus::Processing => 2,
            LabStatus::Completed => 3,
        }
    }

    fn successor(self) -> Option<Self> {
        Self::SEQUENCE.get(self.position() + 1).copied()
    }
}

/// A laboratory order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabOrder {
    /// Run-unique identifier
    pub id: LabOrderId,
    /// Patient reference
    pub patient_id: String,
    /// Patient display name
    pub patient_name: String,
    /// What to run (e.g. "CBC", "Basic Metabolic Panel")
    pub test_type: String,
    /// Turnaround class
    pub priority: LabPriority,
    /// Ordering physician
    pub ordered_by: String,
    /// When the order was entered
    pub order_date: DateTime<Utc>,
    /// Current lifecycle status
    pub status: LabStatus,
    /// Set when the order completes
    pub completed_date: Option<DateTime<Utc>>,
    /// Result text; populated only on completion
    pub results: Option<String>,
}

/// Payload for entering a new lab order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewLabOrder {
    /// Patient reference
    pub patient_id: String,
    /// Patient display name
    pub patient_name: String,
    /// What to run
    pub test_type: String,
    /// Turnaround class
    pub priority: LabPriority,
    /// Ordering physician
    pub ordered_by: String,
}

/// Commands accepted by the lab partition.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LabAction {
    /// Enter a new order (status starts at `ordered`)
    Add(NewLabOrder),
    /// Move an order to `status`. `completed_date` and `results` are only
    /// consulted when the target status is `completed`; the completion
    /// date defaults to the command's clock reading.
    UpdateStatus {
        /// Order to update
        id: LabOrderId,
        /// Target status
        status: LabStatus,
        /// Completion date override
        completed_date: Option<DateTime<Utc>>,
        /// Result text recorded on completion
        results: Option<String>,
    },
}

/// The lab-order partition.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct LabState {
    orders: Vec<LabOrder>,
}

impl LabState {
    /// All orders, oldest first.
    #[must_use]
    pub fn orders(&self) -> &[LabOrder] {
        &self.orders
    }

    /// Look up one order.
    #[must_use]
    pub fn get(&self, id: &LabOrderId) -> Option<&LabOrder> {
        self.orders.iter().find(|o| &o.id == id)
    }

    /// Orders currently in `status`, oldest first.
    pub fn in_status(&self, status: LabStatus) -> impl Iterator<Item = &LabOrder> {
        self.orders.iter().filter(move |o| o.status == status)
    }

    /// Seed the partition with an existing order (run-initial data).
    pub fn push_seeded(&mut self, order: LabOrder) {
        self.orders.push(order);
    }

    /// Apply one command, returning the facts describing what changed.
    pub fn apply(
        &mut self,
        action: LabAction,
        policy: TransitionPolicy,
        now: DateTime<Utc>,
    ) -> SmallVec<[DomainEvent; 2]> {
        let mut events = SmallVec::new();
        match action {
            LabAction::Add(payload) => {
                let id = LabOrderId::from_seq(self.orders.len() + 1);
                let order = LabOrder {
                    id: id.clone(),
                    patient_id: payload.patient_id,
                    patient_name: payload.patient_name,
                    test_type: payload.test_type.clone(),
                    priority: payload.priority,
                    ordered_by: payload.ordered_by,
                    order_date: now,
                    status: LabStatus::Ordered,
                    completed_date: None,
                    results: None,
                };
                tracing::debug!(id = %order.id, priority = ?order.priority, "lab order entered");
                self.orders.push(order);
                events.push(DomainEvent::LabOrdered {
                    id,
                    test_type: payload.test_type,
                    priority: payload.priority,
                });
            },
            LabAction::UpdateStatus {
                id,
                status,
                completed_date,
                results,
            } => {
                let Some(order) = self.orders.iter_mut().find(|o| o.id == id) else {
                    tracing::warn!(id = %id, "status update for unknown lab order");
                    return events;
                };
                let from = order.status;
                if !policy.admits(from, status) {
                    events.push(DomainEvent::TransitionRejected {
                        entity: format!("lab order {id}"),
                        from: from.to_string(),
                        to: status.to_string(),
                    });
                    return events;
                }
                order.status = status;
                if status == LabStatus::Completed {
                    order.completed_date = Some(completed_date.unwrap_or(now));
                    order.results = results.or_else(|| Some("Results available".to_string()));
                }
                events.push(DomainEvent::LabStatusChanged { id, from, to: status });
            },
        }
        events
    }
}
