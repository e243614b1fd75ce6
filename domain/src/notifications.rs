//! The notification engine.
//!
//! One ordered collection of notification entries plus a maintained unread
//! counter. Entries are inserted most-recent-first; the counter always
//! equals the number of unread entries, and every operation below preserves
//! that invariant.
//!
//! Nothing is evicted implicitly: entries leave the collection only through
//! `Remove` or `Clear`. The collection is unbounded.

use crate::roles::Role;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a notification (unique within a run).
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NotificationId(String);

impl NotificationId {
    /// Creates a `NotificationId` from a string
    #[must_use]
    pub const fn new(id: String) -> Self {
        Self(id)
    }

    /// Derive the id for the `seq`-th notification created in this run.
    #[must_use]
    pub fn from_seq(seq: u64) -> Self {
        Self(format!("NTF{seq:03}"))
    }

    /// Returns the inner string value
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NotificationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Visual/severity class of a notification.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    /// Informational
    Info,
    /// A completed or positive outcome
    Success,
    /// Needs attention
    Warning,
    /// A failure surfaced as data
    Error,
}

/// Delivery priority.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Routine
    Low,
    /// Default
    Medium,
    /// Elevated
    High,
    /// Immediate attention
    Urgent,
}

/// Subject area of a notification.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Medication requests and prescriptions
    Medication,
    /// Scheduling
    Appointment,
    /// Lab orders and results
    Lab,
    /// Patient flow (arrivals, transfers)
    Patient,
    /// Portal-internal messages
    System,
    /// Stock levels and alerts
    Inventory,
}

/// A notification entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    /// Run-unique identifier
    pub id: NotificationId,
    /// Severity class
    pub kind: NotificationKind,
    /// Short headline
    pub title: String,
    /// Body text
    pub message: String,
    /// Creation time (injected clock)
    pub timestamp: DateTime<Utc>,
    /// Whether the entry has been read
    pub read: bool,
    /// Delivery priority
    pub priority: Priority,
    /// Subject area
    pub category: Category,
    /// Targeted role; `None` is a broadcast visible to every role
    pub target_role: Option<Role>,
    /// Back-reference to the originating entity, when there is one
    pub related_id: Option<String>,
}

impl Notification {
    /// Whether this entry appears in `role`'s filtered view.
    ///
    /// Broadcasts (no target role) are visible to every role.
    #[must_use]
    pub fn is_visible_to(&self, role: Role) -> bool {
        self.target_role.is_none_or(|target| target == role)
    }
}

/// Payload for creating a notification.
///
/// The engine assigns `id`, `timestamp`, and `read` on insert; callers
/// provide the rest. Priority defaults to medium and category to system.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewNotification {
    /// Severity class
    pub kind: NotificationKind,
    /// Short headline
    pub title: String,
    /// Body text
    pub message: String,
    /// Delivery priority
    pub priority: Priority,
    /// Subject area
    pub category: Category,
    /// Back-reference to the originating entity
    pub related_id: Option<String>,
}

impl NewNotification {
    /// Create a payload with default priority (medium) and category (system).
    #[must_use]
    pub fn new(
        kind: NotificationKind,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            title: title.into(),
            message: message.into(),
            priority: Priority::Medium,
            category: Category::System,
            related_id: None,
        }
    }

    /// Set the priority
    #[must_use]
    pub const fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Set the category
    #[must_use]
    pub const fn with_category(mut self, category: Category) -> Self {
        self.category = category;
        self
    }

    /// Set the originating-entity back-reference
    #[must_use]
    pub fn with_related_id(mut self, related_id: impl Into<String>) -> Self {
        self.related_id = Some(related_id.into());
        self
    }
}

/// Commands accepted by the notification engine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotificationAction {
    /// Create a broadcast notification
    Add(NewNotification),
    /// Create a role-targeted notification
    AddForRole {
        /// Role whose filtered view should show the entry
        role: Role,
        /// Entry payload
        notification: NewNotification,
    },
    /// Mark one entry read (idempotent)
    MarkRead(NotificationId),
    /// Mark every entry read (idempotent)
    MarkAllRead,
    /// Delete one entry
    Remove(NotificationId),
    /// Delete everything
    Clear,
}

/// Composable read-side filter over the notification collection.
#[derive(Clone, Copy, Debug, Default)]
pub struct NotificationFilter {
    role: Option<Role>,
    category: Option<Category>,
    priority: Option<Priority>,
}

impl NotificationFilter {
    /// An empty filter that matches everything.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            role: None,
            category: None,
            priority: None,
        }
    }

    /// Restrict to entries visible to `role` (targeted plus broadcast).
    #[must_use]
    pub const fn visible_to(mut self, role: Role) -> Self {
        self.role = Some(role);
        self
    }

    /// Restrict to one category.
    #[must_use]
    pub const fn category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    /// Restrict to one priority.
    #[must_use]
    pub const fn priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Whether `entry` passes the filter.
    #[must_use]
    pub fn matches(&self, entry: &Notification) -> bool {
        self.role.is_none_or(|role| entry.is_visible_to(role))
            && self.category.is_none_or(|c| entry.category == c)
            && self.priority.is_none_or(|p| entry.priority == p)
    }
}

/// The notification partition: ordered entries plus the unread counter.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct NotificationState {
    entries: Vec<Notification>,
    unread: usize,
    next_seq: u64,
}

impl NotificationState {
    /// All entries, most recent first.
    #[must_use]
    pub fn entries(&self) -> &[Notification] {
        &self.entries
    }

    /// The maintained unread counter.
    #[must_use]
    pub const fn unread_count(&self) -> usize {
        self.unread
    }

    /// Entries passing `filter`, most recent first.
    pub fn filtered<'a>(
        &'a self,
        filter: NotificationFilter,
    ) -> impl Iterator<Item = &'a Notification> {
        self.entries.iter().filter(move |n| filter.matches(n))
    }

    /// Entries visible to `role` (targeted plus broadcast), most recent first.
    pub fn visible_to(&self, role: Role) -> impl Iterator<Item = &Notification> {
        self.filtered(NotificationFilter::new().visible_to(role))
    }

    /// Look up one entry.
    #[must_use]
    pub fn get(&self, id: &NotificationId) -> Option<&Notification> {
        self.entries.iter().find(|n| &n.id == id)
    }

    /// Apply one command.
    ///
    /// `now` is the injected-clock reading for the enclosing command; every
    /// entry created here is stamped with it.
    pub fn apply(&mut self, action: NotificationAction, now: DateTime<Utc>) {
        match action {
            NotificationAction::Add(payload) => {
                self.insert(payload, None, now);
            },
            NotificationAction::AddForRole { role, notification } => {
                self.insert(notification, Some(role), now);
            },
            NotificationAction::MarkRead(id) => {
                match self.entries.iter_mut().find(|n| n.id == id) {
                    Some(entry) if !entry.read => {
                        entry.read = true;
                        self.unread -= 1;
                    },
                    Some(_) => {}, // already read; counter untouched
                    None => tracing::warn!(id = %id, "mark-read for unknown notification"),
                }
            },
            NotificationAction::MarkAllRead => {
                for entry in &mut self.entries {
                    entry.read = true;
                }
                self.unread = 0;
            },
            NotificationAction::Remove(id) => {
                if let Some(pos) = self.entries.iter().position(|n| n.id == id) {
                    let removed = self.entries.remove(pos);
                    if !removed.read {
                        self.unread -= 1;
                    }
                } else {
                    tracing::warn!(id = %id, "remove for unknown notification");
                }
            },
            NotificationAction::Clear => {
                self.entries.clear();
                self.unread = 0;
            },
        }
    }

    fn insert(&mut self, payload: NewNotification, target_role: Option<Role>, now: DateTime<Utc>) {
        self.next_seq += 1;
        let entry = Notification {
            id: NotificationId::from_seq(self.next_seq),
            kind: payload.kind,
            title: payload.title,
            message: payload.message,
            timestamp: now,
            read: false,
            priority: payload.priority,
            category: payload.category,
            target_role,
            related_id: payload.related_id,
        };
        tracing::debug!(
            id = %entry.id,
            role = ?target_role,
            category = ?entry.category,
            "notification created"
        );
        // Most-recent-first ordering
        self.entries.insert(0, entry);
        self.unread += 1;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)] // Test code
mod tests {
    use super::*;
    use chrono::Utc;

    fn now() -> DateTime<Utc> {
        Utc::now()
    }

    fn info(title: &str) -> NewNotification {
        NewNotification::new(NotificationKind::Info, title, "body")
    }

    fn recount(state: &NotificationState) -> usize {
        state.entries().iter().filter(|n| !n.read).count()
    }

    #[test]
    fn add_inserts_at_head_and_counts_unread() {
        let mut state = NotificationState::default();
        state.apply(NotificationAction::Add(info("first")), now());
        state.apply(NotificationAction::Add(info("second")), now());

        assert_eq!(state.entries()[0].title, "second");
        assert_eq!(state.entries()[1].title, "first");
        assert_eq!(state.unread_count(), 2);
        assert_eq!(state.unread_count(), recount(&state));
    }

    #[test]
    fn mark_read_is_idempotent() {
        let mut state = NotificationState::default();
        state.apply(NotificationAction::Add(info("one")), now());
        let id = state.entries()[0].id.clone();

        state.apply(NotificationAction::MarkRead(id.clone()), now());
        assert_eq!(state.unread_count(), 0);

        state.apply(NotificationAction::MarkRead(id), now());
        assert_eq!(state.unread_count(), 0);
        assert_eq!(state.unread_count(), recount(&state));
    }

    #[test]
    fn mark_all_read_twice_is_stable() {
        let mut state = NotificationState::default();
        state.apply(NotificationAction::Add(info("a")), now());
        state.apply(NotificationAction::Add(info("b")), now());

        state.apply(NotificationAction::MarkAllRead, now());
        let snapshot = state.entries().to_vec();
        state.apply(NotificationAction::MarkAllRead, now());

        assert_eq!(state.unread_count(), 0);
        assert_eq!(state.entries(), snapshot.as_slice());
    }

    #[test]
    fn remove_decrements_only_for_unread() {
        let mut state = NotificationState::default();
        state.apply(NotificationAction::Add(info("a")), now());
        state.apply(NotificationAction::Add(info("b")), now());
        let read_id = state.entries()[0].id.clone();
        state.apply(NotificationAction::MarkRead(read_id.clone()), now());
        assert_eq!(state.unread_count(), 1);

        // Removing a read entry leaves the counter alone
        state.apply(NotificationAction::Remove(read_id), now());
        assert_eq!(state.unread_count(), 1);

        // Removing an unread entry decrements
        let unread_id = state.entries()[0].id.clone();
        state.apply(NotificationAction::Remove(unread_id), now());
        assert_eq!(state.unread_count(), 0);
        assert_eq!(state.entries().len(), 0);
    }

    #[test]
    fn clear_resets_everything() {
        let mut state = NotificationState::default();
        state.apply(NotificationAction::Add(info("a")), now());
        state.apply(NotificationAction::Clear, now());
        assert!(state.entries().is_empty());
        assert_eq!(state.unread_count(), 0);
    }

    #[test]
    fn ids_stay_unique_across_removal() {
        let mut state = NotificationState::default();
        state.apply(NotificationAction::Add(info("a")), now());
        state.apply(NotificationAction::Add(info("b")), now());
        let removed = state.entries()[1].id.clone();
        state.apply(NotificationAction::Remove(removed.clone()), now());
        state.apply(NotificationAction::Add(info("c")), now());

        assert!(state.entries().iter().all(|n| n.id != removed));
        let mut ids: Vec<&str> = state.entries().iter().map(|n| n.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), state.entries().len());
    }

    #[test]
    fn broadcast_is_visible_to_every_role() {
        let mut state = NotificationState::default();
        state.apply(NotificationAction::Add(info("broadcast")), now());
        for role in Role::ALL {
            assert_eq!(state.visible_to(role).count(), 1);
        }
    }

    #[test]
    fn role_targeting_filters_other_roles_out() {
        let mut state = NotificationState::default();
        state.apply(
            NotificationAction::AddForRole {
                role: Role::Pharmacy,
                notification: info("targeted"),
            },
            now(),
        );

        assert_eq!(state.visible_to(Role::Pharmacy).count(), 1);
        assert_eq!(state.visible_to(Role::Doctor).count(), 0);
    }

    #[test]
    fn filter_composes_category_and_priority() {
        let mut state = NotificationState::default();
        state.apply(
            NotificationAction::Add(
                info("lab")
                    .with_category(Category::Lab)
                    .with_priority(Priority::Urgent),
            ),
            now(),
        );
        state.apply(NotificationAction::Add(info("system")), now());

        let filter = NotificationFilter::new()
            .category(Category::Lab)
            .priority(Priority::Urgent);
        let hits: Vec<_> = state.filtered(filter).collect();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title, "lab");
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        #[derive(Clone, Debug)]
        enum Op {
            Add,
            MarkRead(usize),
            MarkAllRead,
            Remove(usize),
            Clear,
        }

        fn op_strategy() -> impl Strategy<Value = Op> {
            prop_oneof![
                3 => Just(Op::Add),
                3 => (0usize..16).prop_map(Op::MarkRead),
                1 => Just(Op::MarkAllRead),
                2 => (0usize..16).prop_map(Op::Remove),
                1 => Just(Op::Clear),
            ]
        }

        proptest! {
            // The unread counter must equal the recount after any op sequence.
            #[test]
            fn unread_counter_matches_recount(ops in prop::collection::vec(op_strategy(), 0..40)) {
                let mut state = NotificationState::default();
                let when = Utc::now();
                for op in ops {
                    match op {
                        Op::Add => state.apply(NotificationAction::Add(info("n")), when),
                        Op::MarkRead(i) => {
                            if let Some(entry) = state.entries().get(i) {
                                let id = entry.id.clone();
                                state.apply(NotificationAction::MarkRead(id), when);
                            }
                        },
                        Op::MarkAllRead => state.apply(NotificationAction::MarkAllRead, when),
                        Op::Remove(i) => {
                            if let Some(entry) = state.entries().get(i) {
                                let id = entry.id.clone();
                                state.apply(NotificationAction::Remove(id), when);
                            }
                        },
                        Op::Clear => state.apply(NotificationAction::Clear, when),
                    }
                    prop_assert_eq!(state.unread_count(), recount(&state));
                }
            }
        }
    }
}
