//! The simulated event source.
//!
//! Stands in for the integrations the portal does not have (pharmacy
//! system, lab system, front desk feed). One periodic task per role
//! fabricates plausible commands and issues them through the same
//! `store.send` path real callers use, so the reducers and the observer
//! are exercised identically to genuine usage.
//!
//! The source is owned by an explicit start/stop lifecycle: `spawn` starts
//! the tasks, `stop` tears every one of them down deterministically. No
//! task outlives `stop`; dropping the handle aborts any stragglers as a
//! backstop.

use crate::actions::PortalAction;
use crate::inventory::InventoryAction;
use crate::labs::{LabAction, LabPriority, LabStatus, NewLabOrder};
use crate::medication::{MedicationAction, MedicationStatus};
use crate::notifications::{Category, NewNotification, NotificationAction, NotificationKind};
use crate::prescriptions::{PrescriptionAction, PrescriptionStatus};
use crate::reducer::{PortalEnvironment, PortalReducer};
use crate::roles::Role;
use crate::state::PortalState;
use mediflow_runtime::Store;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// The portal's store type.
pub type PortalStore = Store<PortalState, PortalAction, PortalEnvironment, PortalReducer>;

/// Patients used for fabricated arrivals and orders.
const PATIENTS: [(&str, &str); 4] = [
    ("P001", "John Smith"),
    ("P004", "Elena Ruiz"),
    ("P010", "Mary Jones"),
    ("P011", "Omar Haddad"),
];

/// Lab tests the doctor simulator orders.
const LAB_TESTS: [&str; 4] = ["CBC", "Basic Metabolic Panel", "Lipid Panel", "HbA1c"];

/// Result texts the lab simulator completes orders with.
const LAB_RESULTS: [&str; 3] = [
    "Within normal ranges",
    "Slightly elevated, follow-up advised",
    "Abnormal, physician review required",
];

/// Configuration for the simulated event source.
#[derive(Debug, Clone)]
pub struct SimulatorConfig {
    /// How often each role's timer ticks
    pub tick_interval: Duration,
    /// Probability that a tick fabricates a command (0.0..=1.0)
    pub fire_probability: f64,
    /// Seed for reproducible runs; `None` seeds from entropy
    pub seed: Option<u64>,
}

impl SimulatorConfig {
    /// Set the tick interval
    #[must_use]
    pub const fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = interval;
        self
    }

    /// Set the per-tick fire probability
    #[must_use]
    pub const fn with_fire_probability(mut self, probability: f64) -> Self {
        self.fire_probability = probability;
        self
    }

    /// Seed the source for reproducible runs
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_secs(5),
            fire_probability: 0.35,
            seed: None,
        }
    }
}

/// Handle owning the per-role simulator tasks.
pub struct SimulatedEventSource {
    shutdown_tx: watch::Sender<bool>,
    tasks: Vec<(Role, JoinHandle<()>)>,
}

impl SimulatedEventSource {
    /// Start one simulator task per role.
    #[must_use]
    pub fn spawn(store: PortalStore, config: SimulatorConfig, roles: &[Role]) -> Self {
        let (shutdown_tx, _) = watch::channel(false);

        let tasks = roles
            .iter()
            .enumerate()
            .map(|(index, &role)| {
                let store = store.clone();
                let config = config.clone();
                let shutdown_rx = shutdown_tx.subscribe();
                // Per-role stream: offset the seed so roles diverge.
                let rng = match config.seed {
                    Some(seed) => SmallRng::seed_from_u64(seed.wrapping_add(index as u64)),
                    None => SmallRng::from_entropy(),
                };
                let handle = tokio::spawn(run_role(store, role, config, rng, shutdown_rx));
                (role, handle)
            })
            .collect();

        Self { shutdown_tx, tasks }
    }

    /// Number of running role tasks.
    #[must_use]
    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }

    /// Stop every role task and wait for it to finish.
    ///
    /// After `stop` returns, no simulator task will issue another command.
    pub async fn stop(mut self) {
        let _ = self.shutdown_tx.send(true);

        for (role, handle) in std::mem::take(&mut self.tasks) {
            match tokio::time::timeout(Duration::from_secs(5), handle).await {
                Ok(Ok(())) => tracing::debug!(role = %role, "simulator task stopped"),
                Ok(Err(e)) => tracing::warn!(role = %role, error = %e, "simulator task failed"),
                Err(_) => tracing::warn!(role = %role, "simulator task shutdown timed out"),
            }
        }
    }
}

impl Drop for SimulatedEventSource {
    fn drop(&mut self) {
        // Backstop for handles dropped without stop(): no orphaned timers.
        for (_, handle) in &self.tasks {
            handle.abort();
        }
    }
}

impl std::fmt::Debug for SimulatedEventSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimulatedEventSource")
            .field("tasks", &self.tasks.len())
            .finish_non_exhaustive()
    }
}

/// One role's timer loop.
async fn run_role(
    store: PortalStore,
    role: Role,
    config: SimulatorConfig,
    mut rng: SmallRng,
    mut shutdown: watch::Receiver<bool>,
) {
    let probability = config.fire_probability.clamp(0.0, 1.0);
    let mut ticker = tokio::time::interval(config.tick_interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    // The first tick fires immediately; skip it so spawn-then-stop in the
    // same instant issues nothing.
    ticker.tick().await;

    tracing::debug!(role = %role, interval = ?config.tick_interval, "simulator task started");

    loop {
        tokio::select! {
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow_and_update() {
                    break;
                }
            },
            _ = ticker.tick() => {
                if !rng.gen_bool(probability) {
                    continue;
                }
                let action = store.state(|s| fabricate(s, role, &mut rng)).await;
                if let Some(action) = action {
                    tracing::debug!(role = %role, "simulator issuing command");
                    if store.send(action).await.is_err() {
                        // Store shut down underneath us; nothing left to do.
                        break;
                    }
                }
            },
        }
    }

    tracing::debug!(role = %role, "simulator task exiting");
}

/// Fabricate one plausible command for `role` against current state.
///
/// Returns `None` when nothing is eligible this tick.
fn fabricate(state: &PortalState, role: Role, rng: &mut SmallRng) -> Option<PortalAction> {
    match role {
        Role::Pharmacy => pharmacy_tick(state, rng),
        Role::Nurse => nurse_tick(state),
        Role::Receptionist => Some(receptionist_tick(rng)),
        Role::Admin => admin_tick(state, rng),
        Role::Doctor => Some(doctor_tick(rng)),
        Role::Patient => patient_tick(state),
    }
}

/// Pharmacy system: dispatch a sent medication request, start filling the
/// oldest pending prescription, or dispatch stock to a ward.
fn pharmacy_tick(state: &PortalState, rng: &mut SmallRng) -> Option<PortalAction> {
    if let Some(request) = state.medications.in_status(MedicationStatus::Sent).next() {
        return Some(
            MedicationAction::UpdateStatus {
                id: request.id.clone(),
                status: MedicationStatus::Dispatched,
                processed_by: Some("Pharmacy System".to_string()),
            }
            .into(),
        );
    }
    if let Some(prescription) = state
        .prescriptions
        .in_status(PrescriptionStatus::Pending)
        .next()
    {
        return Some(
            PrescriptionAction::UpdateStatus {
                id: prescription.id.clone(),
                status: PrescriptionStatus::Processing,
                processed_by: Some("Pharmacy System".to_string()),
            }
            .into(),
        );
    }
    // Nothing queued: dispatch a small amount of stock to a ward.
    let stocked: Vec<_> = state
        .inventory
        .items()
        .iter()
        .filter(|i| i.current_stock > 0)
        .collect();
    let item = stocked.choose(rng)?;
    let dispatched = rng.gen_range(1..=item.current_stock.min(10));
    Some(
        InventoryAction::UpdateStock {
            item_id: item.id.clone(),
            new_stock: item.current_stock - dispatched,
            reason: "dispatched to ward".to_string(),
        }
        .into(),
    )
}

/// Ward nurse: receive a dispatched medication.
fn nurse_tick(state: &PortalState) -> Option<PortalAction> {
    let request = state
        .medications
        .in_status(MedicationStatus::Dispatched)
        .next()?;
    Some(
        MedicationAction::UpdateStatus {
            id: request.id.clone(),
            status: MedicationStatus::Received,
            processed_by: Some("Ward Nurse".to_string()),
        }
        .into(),
    )
}

/// Front desk: a patient arrived for their appointment.
fn receptionist_tick(rng: &mut SmallRng) -> PortalAction {
    let (_, name) = PATIENTS
        .choose(rng)
        .copied()
        .unwrap_or(("P000", "Walk-in Patient"));
    NotificationAction::AddForRole {
        role: Role::Doctor,
        notification: NewNotification::new(
            NotificationKind::Info,
            "Patient Arrived",
            format!("{name} has checked in at reception"),
        )
        .with_category(Category::Patient),
    }
    .into()
}

/// Lab system: finish an order in the lab, or collect a waiting sample.
fn admin_tick(state: &PortalState, rng: &mut SmallRng) -> Option<PortalAction> {
    if let Some(order) = state.labs.in_status(LabStatus::Processing).next() {
        let results = LAB_RESULTS
            .choose(rng)
            .copied()
            .unwrap_or("Results available");
        return Some(
            LabAction::UpdateStatus {
                id: order.id.clone(),
                status: LabStatus::Completed,
                completed_date: None,
                results: Some(results.to_string()),
            }
            .into(),
        );
    }
    let order = state.labs.in_status(LabStatus::Ordered).next()?;
    Some(
        LabAction::UpdateStatus {
            id: order.id.clone(),
            status: LabStatus::Collected,
            completed_date: None,
            results: None,
        }
        .into(),
    )
}

/// Physician: order a new lab test.
fn doctor_tick(rng: &mut SmallRng) -> PortalAction {
    let (patient_id, patient_name) = PATIENTS
        .choose(rng)
        .copied()
        .unwrap_or(("P000", "Walk-in Patient"));
    let test_type = LAB_TESTS.choose(rng).copied().unwrap_or("CBC");
    let priority = if rng.gen_bool(0.2) {
        LabPriority::Stat
    } else {
        LabPriority::Routine
    };
    LabAction::Add(NewLabOrder {
        patient_id: patient_id.to_string(),
        patient_name: patient_name.to_string(),
        test_type: test_type.to_string(),
        priority,
        ordered_by: "Dr. Chen".to_string(),
    })
    .into()
}

/// Patient portal: ask for a refill on an eligible prescription.
fn patient_tick(state: &PortalState) -> Option<PortalAction> {
    let prescription = state
        .prescriptions
        .prescriptions()
        .iter()
        .find(|p| !p.refill_requested && p.refills_remaining > 0)?;
    Some(
        PrescriptionAction::RequestRefill {
            id: prescription.id.clone(),
        }
        .into(),
    )
}
