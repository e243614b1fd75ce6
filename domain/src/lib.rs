//! # MediFlow Domain
//!
//! The hospital portal core: domain state partitions with pure apply
//! logic, workflow status machines, the notification engine, the
//! cross-domain observer, and the simulated event source.
//!
//! ## Architecture
//!
//! Every mutation is a [`PortalAction`] — one closed tagged union over the
//! whole command set. The [`PortalReducer`] delegates each command to its
//! partition, collects the resulting domain facts, and runs the
//! [`observer::NotificationObserver`] over them inside the same reduce
//! call. Readers query [`PortalState`] through the store's read access.
//!
//! ```ignore
//! use mediflow_domain::{PortalAction, PortalEnvironment, PortalReducer, seed};
//! use mediflow_core::environment::SystemClock;
//! use mediflow_runtime::Store;
//! use std::sync::Arc;
//!
//! let clock = Arc::new(SystemClock);
//! let env = PortalEnvironment::new(clock.clone());
//! let store = Store::new(seed::seeded(clock.now()), PortalReducer::new(), env);
//! ```

/// The portal command set
pub mod actions;
/// Domain facts consumed by the observer
pub mod events;
/// Inventory items and derived stock alerts
pub mod inventory;
/// Laboratory orders
pub mod labs;
/// Ward medication requests
pub mod medication;
/// The notification engine
pub mod notifications;
/// The cross-domain observer
pub mod observer;
/// Outpatient prescriptions
pub mod prescriptions;
/// The root reducer and its environment
pub mod reducer;
/// Portal roles
pub mod roles;
/// Run-initial data
pub mod seed;
/// The simulated event source
pub mod simulation;
/// The portal state container
pub mod state;
/// Transition policies over status machines
pub mod workflow;

pub use actions::PortalAction;
pub use reducer::{PortalEnvironment, PortalReducer};
pub use roles::Role;
pub use simulation::{PortalStore, SimulatedEventSource, SimulatorConfig};
pub use state::PortalState;
pub use workflow::TransitionPolicy;
