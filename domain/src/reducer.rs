//! The root portal reducer.
//!
//! Delegates each command to its partition's apply logic, then funnels the
//! resulting facts through the cross-domain observer and applies any
//! synthesized notification commands — all inside the same reduce call.
//! By the time `send` resolves, a command's direct state effects and its
//! observer-triggered notifications are both fully applied.

use crate::actions::PortalAction;
use crate::events::DomainEvent;
use crate::observer::NotificationObserver;
use crate::state::PortalState;
use crate::workflow::TransitionPolicy;
use mediflow_core::effect::Effect;
use mediflow_core::environment::Clock;
use mediflow_core::reducer::{Effects, Reducer};
use mediflow_core::smallvec;
use smallvec::SmallVec;
use std::sync::Arc;

/// Dependencies injected into the portal reducer.
#[derive(Clone)]
pub struct PortalEnvironment {
    /// Clock for all timestamps
    pub clock: Arc<dyn Clock>,
    /// How status-update commands are admitted
    pub transitions: TransitionPolicy,
}

impl PortalEnvironment {
    /// Create an environment with the default (permissive) transition
    /// policy.
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            transitions: TransitionPolicy::default(),
        }
    }

    /// Override the transition policy.
    #[must_use]
    pub fn with_transitions(mut self, transitions: TransitionPolicy) -> Self {
        self.transitions = transitions;
        self
    }
}

impl std::fmt::Debug for PortalEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PortalEnvironment")
            .field("transitions", &self.transitions)
            .finish_non_exhaustive()
    }
}

/// The root reducer over [`PortalState`].
#[derive(Clone, Copy, Debug, Default)]
pub struct PortalReducer {
    observer: NotificationObserver,
}

impl PortalReducer {
    /// Create the portal reducer.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            observer: NotificationObserver::new(),
        }
    }
}

impl Reducer for PortalReducer {
    type State = PortalState;
    type Action = PortalAction;
    type Environment = PortalEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> Effects<Self::Action> {
        let now = env.clock.now();

        let events: SmallVec<[DomainEvent; 2]> = match action {
            PortalAction::Notification(action) => {
                state.notifications.apply(action, now);
                SmallVec::new()
            },
            PortalAction::Medication(action) => {
                state.medications.apply(action, env.transitions, now)
            },
            PortalAction::Prescription(action) => {
                state.prescriptions.apply(action, env.transitions, now)
            },
            PortalAction::Lab(action) => state.labs.apply(action, env.transitions, now),
            PortalAction::Inventory(action) => state.inventory.apply(action, now),
        };

        // Cross-domain observer: same atomic step as the command itself.
        for event in &events {
            if let Some(notification) = self.observer.react(event) {
                state.notifications.apply(notification, now);
            }
        }

        // The portal core is a pure state machine; nothing asynchronous.
        smallvec![Effect::None]
    }
}
