//! The cross-domain observer.
//!
//! Watches the facts produced by every applied command and, for a fixed
//! allow-list, synthesizes a role-targeted notification. The root reducer
//! runs it inline, inside the same reduce call that applied the command,
//! so a command's secondary notifications are in place before `send`
//! resolves — no queue, no retry, no backpressure, safe under the store's
//! total ordering.

use crate::events::DomainEvent;
use crate::inventory::CRITICAL_STOCK;
use crate::labs::LabPriority;
use crate::medication::Urgency;
use crate::notifications::{
    Category, NewNotification, NotificationAction, NotificationKind, Priority,
};
use crate::prescriptions::PrescriptionStatus;
use crate::roles::Role;

/// Maps allow-listed domain facts to notification commands.
#[derive(Clone, Copy, Debug, Default)]
pub struct NotificationObserver;

impl NotificationObserver {
    /// Create an observer.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// React to one fact.
    ///
    /// Returns the notification command to apply, or `None` when the fact
    /// is not allow-listed. The allow-list:
    ///
    /// - stock level crossing to at/below the minimum → pharmacy
    /// - new medication request → pharmacy
    /// - prescription reaching `ready` → receptionist
    /// - new lab order → admin
    /// - strict-policy transition rejection → broadcast warning
    #[must_use]
    pub fn react(&self, event: &DomainEvent) -> Option<NotificationAction> {
        match event {
            DomainEvent::StockLevelChanged {
                item_id,
                name,
                previous,
                current,
                min_stock,
            } if *previous > *min_stock && *current <= *min_stock => {
                let (kind, priority, descriptor) = if *current <= CRITICAL_STOCK {
                    (NotificationKind::Error, Priority::Urgent, "critically low")
                } else {
                    (NotificationKind::Warning, Priority::High, "running low")
                };
                Some(NotificationAction::AddForRole {
                    role: Role::Pharmacy,
                    notification: NewNotification::new(
                        kind,
                        "Low Stock Alert",
                        format!("{name} is {descriptor}: {current} remaining"),
                    )
                    .with_priority(priority)
                    .with_category(Category::Inventory)
                    .with_related_id(item_id.as_str()),
                })
            },

            DomainEvent::MedicationRequested {
                id,
                medication,
                room_number,
                urgency,
            } => {
                let priority = if *urgency == Urgency::High {
                    Priority::Urgent
                } else {
                    Priority::Medium
                };
                Some(NotificationAction::AddForRole {
                    role: Role::Pharmacy,
                    notification: NewNotification::new(
                        NotificationKind::Info,
                        "New Medication Request",
                        format!("{medication} requested for room {room_number}"),
                    )
                    .with_priority(priority)
                    .with_category(Category::Medication)
                    .with_related_id(id.as_str()),
                })
            },

            DomainEvent::PrescriptionStatusChanged {
                id,
                patient_name,
                to: PrescriptionStatus::Ready,
                ..
            } => Some(NotificationAction::AddForRole {
                role: Role::Receptionist,
                notification: NewNotification::new(
                    NotificationKind::Success,
                    "Prescription Ready",
                    format!("Prescription {id} for {patient_name} is ready for pickup"),
                )
                .with_category(Category::Medication)
                .with_related_id(id.as_str()),
            }),

            DomainEvent::LabOrdered {
                id,
                test_type,
                priority,
            } => {
                let notify_priority = if *priority == LabPriority::Stat {
                    Priority::Urgent
                } else {
                    Priority::Medium
                };
                Some(NotificationAction::AddForRole {
                    role: Role::Admin,
                    notification: NewNotification::new(
                        NotificationKind::Info,
                        "New Lab Order",
                        format!("{test_type} ordered ({priority_label})", priority_label = priority.as_label()),
                    )
                    .with_priority(notify_priority)
                    .with_category(Category::Lab)
                    .with_related_id(id.as_str()),
                })
            },

            DomainEvent::TransitionRejected { entity, from, to } => {
                Some(NotificationAction::Add(
                    NewNotification::new(
                        NotificationKind::Warning,
                        "Transition Rejected",
                        format!("{entity}: {from} → {to} is not an allowed step"),
                    )
                    .with_category(Category::System),
                ))
            },

            // Not allow-listed: no secondary notification.
            DomainEvent::MedicationStatusChanged { .. }
            | DomainEvent::PrescriptionCreated { .. }
            | DomainEvent::PrescriptionStatusChanged { .. }
            | DomainEvent::RefillRequested { .. }
            | DomainEvent::LabStatusChanged { .. }
            | DomainEvent::StockLevelChanged { .. }
            | DomainEvent::ItemRestocked { .. } => None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)] // Test code
mod tests {
    use super::*;
    use crate::inventory::ItemId;
    use crate::labs::LabOrderId;
    use crate::medication::MedicationRequestId;
    use crate::prescriptions::PrescriptionId;

    fn observer() -> NotificationObserver {
        NotificationObserver::new()
    }

    #[test]
    fn stock_crossing_targets_pharmacy_with_level_based_priority() {
        let event = DomainEvent::StockLevelChanged {
            item_id: ItemId::new("MED001"),
            name: "Paracetamol".to_string(),
            previous: 30,
            current: 5,
            min_stock: 20,
        };
        let Some(NotificationAction::AddForRole { role, notification }) = observer().react(&event)
        else {
            panic!("expected a role notification");
        };
        assert_eq!(role, Role::Pharmacy);
        assert_eq!(notification.priority, Priority::Urgent);
        assert_eq!(notification.kind, NotificationKind::Error);
        assert_eq!(notification.category, Category::Inventory);
        assert!(notification.message.contains("critically low"));
    }

    #[test]
    fn stock_merely_low_gets_high_priority_warning() {
        let event = DomainEvent::StockLevelChanged {
            item_id: ItemId::new("MED001"),
            name: "Paracetamol".to_string(),
            previous: 30,
            current: 15,
            min_stock: 20,
        };
        let Some(NotificationAction::AddForRole { notification, .. }) = observer().react(&event)
        else {
            panic!("expected a role notification");
        };
        assert_eq!(notification.priority, Priority::High);
        assert_eq!(notification.kind, NotificationKind::Warning);
    }

    #[test]
    fn stock_already_below_threshold_is_not_a_crossing() {
        let event = DomainEvent::StockLevelChanged {
            item_id: ItemId::new("MED001"),
            name: "Paracetamol".to_string(),
            previous: 15,
            current: 10,
            min_stock: 20,
        };
        assert!(observer().react(&event).is_none());
    }

    #[test]
    fn high_urgency_medication_request_is_urgent_for_pharmacy() {
        let event = DomainEvent::MedicationRequested {
            id: MedicationRequestId::new("MR001".to_string()),
            medication: "Morphine".to_string(),
            room_number: "301".to_string(),
            urgency: Urgency::High,
        };
        let Some(NotificationAction::AddForRole { role, notification }) = observer().react(&event)
        else {
            panic!("expected a role notification");
        };
        assert_eq!(role, Role::Pharmacy);
        assert_eq!(notification.priority, Priority::Urgent);
        assert_eq!(notification.category, Category::Medication);
    }

    #[test]
    fn medium_urgency_medication_request_is_medium_priority() {
        let event = DomainEvent::MedicationRequested {
            id: MedicationRequestId::new("MR001".to_string()),
            medication: "Saline".to_string(),
            room_number: "120".to_string(),
            urgency: Urgency::Medium,
        };
        let Some(NotificationAction::AddForRole { notification, .. }) = observer().react(&event)
        else {
            panic!("expected a role notification");
        };
        assert_eq!(notification.priority, Priority::Medium);
    }

    #[test]
    fn prescription_ready_is_a_success_for_reception() {
        let event = DomainEvent::PrescriptionStatusChanged {
            id: PrescriptionId::new("RX010".to_string()),
            patient_name: "Mary Jones".to_string(),
            from: PrescriptionStatus::Processing,
            to: PrescriptionStatus::Ready,
        };
        let Some(NotificationAction::AddForRole { role, notification }) = observer().react(&event)
        else {
            panic!("expected a role notification");
        };
        assert_eq!(role, Role::Receptionist);
        assert_eq!(notification.kind, NotificationKind::Success);
    }

    #[test]
    fn other_prescription_transitions_are_ignored() {
        let event = DomainEvent::PrescriptionStatusChanged {
            id: PrescriptionId::new("RX010".to_string()),
            patient_name: "Mary Jones".to_string(),
            from: PrescriptionStatus::Pending,
            to: PrescriptionStatus::Processing,
        };
        assert!(observer().react(&event).is_none());
    }

    #[test]
    fn stat_lab_order_is_urgent_for_admin() {
        let event = DomainEvent::LabOrdered {
            id: LabOrderId::new("LAB001".to_string()),
            test_type: "Troponin".to_string(),
            priority: LabPriority::Stat,
        };
        let Some(NotificationAction::AddForRole { role, notification }) = observer().react(&event)
        else {
            panic!("expected a role notification");
        };
        assert_eq!(role, Role::Admin);
        assert_eq!(notification.priority, Priority::Urgent);
        assert_eq!(notification.category, Category::Lab);
    }

    #[test]
    fn routine_lab_order_is_medium_priority() {
        let event = DomainEvent::LabOrdered {
            id: LabOrderId::new("LAB001".to_string()),
            test_type: "CBC".to_string(),
            priority: LabPriority::Routine,
        };
        let Some(NotificationAction::AddForRole { notification, .. }) = observer().react(&event)
        else {
            panic!("expected a role notification");
        };
        assert_eq!(notification.priority, Priority::Medium);
    }

    #[test]
    fn rejection_becomes_a_broadcast_warning() {
        let event = DomainEvent::TransitionRejected {
            entity: "medication request MR001".to_string(),
            from: "request".to_string(),
            to: "delivered".to_string(),
        };
        let Some(NotificationAction::Add(notification)) = observer().react(&event) else {
            panic!("expected a broadcast notification");
        };
        assert_eq!(notification.kind, NotificationKind::Warning);
        assert_eq!(notification.category, Category::System);
    }

    #[test]
    fn restock_and_refill_are_not_allow_listed() {
        assert!(
            observer()
                .react(&DomainEvent::ItemRestocked {
                    item_id: ItemId::new("MED001"),
                    name: "Paracetamol".to_string(),
                    quantity: 50,
                    current: 55,
                })
                .is_none()
        );
        assert!(
            observer()
                .react(&DomainEvent::RefillRequested {
                    id: PrescriptionId::new("RX010".to_string()),
                })
                .is_none()
        );
    }
}
