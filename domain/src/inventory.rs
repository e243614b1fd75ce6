//! Pharmacy inventory and derived stock alerts.
//!
//! Items are seeded at startup; commands only move stock levels. A
//! `low_stock` alert is a derived entity: a stock update to at or below
//! the item's minimum ensures exactly one alert for that item, and the
//! dedicated restock command removes it once stock is lifted back above
//! the threshold. A plain stock update above the threshold does NOT clear
//! an existing alert — only restock does. Consistency is maintained by
//! convention inside these two commands, not recomputed on read.

use crate::events::DomainEvent;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;

/// Stock at or below this count is critically low.
pub const CRITICAL_STOCK: u32 = 5;

/// Unique identifier for an inventory item.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemId(String);

impl ItemId {
    /// Creates an `ItemId` from a string
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the inner string value
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Unique identifier for a stock alert (unique within a run).
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AlertId(String);

impl AlertId {
    /// Derive the id for the `seq`-th alert created in this run.
    #[must_use]
    pub fn from_seq(seq: u64) -> Self {
        Self(format!("ALT{seq:03}"))
    }

    /// Returns the inner string value
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AlertId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What an alert is about.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertType {
    /// Stock at or below the item's minimum
    LowStock,
    /// Batch approaching its expiry date
    Expiring,
}

/// How bad it is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    /// Needs restocking soon
    High,
    /// Needs restocking now
    Critical,
}

/// A stocked item.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryItem {
    /// Stable identifier (seeded, e.g. "MED001")
    pub id: ItemId,
    /// Display name
    pub name: String,
    /// Counting unit (e.g. "tablets", "vials")
    pub unit: String,
    /// Units on hand
    pub current_stock: u32,
    /// Reorder threshold
    pub min_stock: u32,
    /// Shelf capacity
    pub max_stock: u32,
    /// Last restock time
    pub last_restocked: Option<DateTime<Utc>>,
}

/// A derived stock alert.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockAlert {
    /// Run-unique identifier
    pub id: AlertId,
    /// Item the alert is about
    pub item_id: ItemId,
    /// What the alert is about
    pub alert_type: AlertType,
    /// How bad it is
    pub severity: AlertSeverity,
    /// Human-readable description
    pub message: String,
    /// When the alert was raised
    pub created_at: DateTime<Utc>,
}

/// Commands accepted by the inventory partition.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum InventoryAction {
    /// Set an item's stock level (dispatch, spoilage, stocktake)
    UpdateStock {
        /// Item to update
        item_id: ItemId,
        /// New on-hand count
        new_stock: u32,
        /// Why the level changed (free text, e.g. "dispatched to ward 2")
        reason: String,
    },
    /// Add received stock to an item, capped at `max_stock`
    Restock {
        /// Item to restock
        item_id: ItemId,
        /// Units received
        quantity: u32,
        /// Supplier batch, when known
        batch_number: Option<String>,
    },
}

/// The inventory partition: items plus derived alerts.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct InventoryState {
    items: Vec<InventoryItem>,
    alerts: Vec<StockAlert>,
    next_alert_seq: u64,
}

impl InventoryState {
    /// All items.
    #[must_use]
    pub fn items(&self) -> &[InventoryItem] {
        &self.items
    }

    /// All open alerts.
    #[must_use]
    pub fn alerts(&self) -> &[StockAlert] {
        &self.alerts
    }

    /// Look up one item.
    #[must_use]
    pub fn get(&self, id: &ItemId) -> Option<&InventoryItem> {
        self.items.iter().find(|i| &i.id == id)
    }

    /// Open alerts for one item.
    pub fn alerts_for<'a>(&'a self, id: &'a ItemId) -> impl Iterator<Item = &'a StockAlert> {
        self.alerts.iter().filter(move |a| &a.item_id == id)
    }

    /// Seed the partition with an item (run-initial data).
    pub fn push_seeded_item(&mut self, item: InventoryItem) {
        self.items.push(item);
    }

    /// Seed the partition with an open alert (run-initial data).
    ///
    /// Also advances the alert sequence so later alerts stay unique.
    pub fn push_seeded_alert(&mut self, alert: StockAlert) {
        self.next_alert_seq += 1;
        self.alerts.push(alert);
    }

    /// Apply one command, returning the facts describing what changed.
    pub fn apply(
        &mut self,
        action: InventoryAction,
        now: DateTime<Utc>,
    ) -> SmallVec<[DomainEvent; 2]> {
        let mut events = SmallVec::new();
        match action {
            InventoryAction::UpdateStock {
                item_id,
                new_stock,
                reason,
            } => {
                let Some(item) = self.items.iter_mut().find(|i| i.id == item_id) else {
                    tracing::warn!(item = %item_id, "stock update for unknown item");
                    return events;
                };
                let previous = item.current_stock;
                item.current_stock = new_stock;
                tracing::debug!(
                    item = %item_id,
                    previous,
                    current = new_stock,
                    reason = %reason,
                    "stock level updated"
                );

                let (name, min_stock) = (item.name.clone(), item.min_stock);
                if new_stock <= min_stock {
                    self.ensure_low_stock_alert(&item_id, &name, new_stock, now);
                }
                events.push(DomainEvent::StockLevelChanged {
                    item_id,
                    name,
                    previous,
                    current: new_stock,
                    min_stock,
                });
            },
            InventoryAction::Restock {
                item_id,
                quantity,
                batch_number,
            } => {
                let Some(item) = self.items.iter_mut().find(|i| i.id == item_id) else {
                    tracing::warn!(item = %item_id, "restock for unknown item");
                    return events;
                };
                let current = (item.current_stock + quantity).min(item.max_stock);
                item.current_stock = current;
                item.last_restocked = Some(now);
                let (name, min_stock) = (item.name.clone(), item.min_stock);
                tracing::debug!(
                    item = %item_id,
                    quantity,
                    current,
                    batch = ?batch_number,
                    "item restocked"
                );

                // Restocking above the threshold clears this item's
                // low-stock alert; other items and alert types stay put.
                if current > min_stock {
                    self.alerts.retain(|a| {
                        !(a.item_id == item_id && a.alert_type == AlertType::LowStock)
                    });
                }
                events.push(DomainEvent::ItemRestocked {
                    item_id,
                    name,
                    quantity,
                    current,
                });
            },
        }
        events
    }

    /// Ensure exactly one `low_stock` alert for the item, refreshing the
    /// severity and message to match the current level.
    fn ensure_low_stock_alert(
        &mut self,
        item_id: &ItemId,
        name: &str,
        current: u32,
        now: DateTime<Utc>,
    ) {
        let (severity, message) = if current <= CRITICAL_STOCK {
            (
                AlertSeverity::Critical,
                format!("{name} is critically low: {current} remaining"),
            )
        } else {
            (
                AlertSeverity::High,
                format!("{name} is running low: {current} remaining"),
            )
        };

        if let Some(alert) = self
            .alerts
            .iter_mut()
            .find(|a| &a.item_id == item_id && a.alert_type == AlertType::LowStock)
        {
            alert.severity = severity;
            alert.message = message;
        } else {
            self.next_alert_seq += 1;
            self.alerts.push(StockAlert {
                id: AlertId::from_seq(self.next_alert_seq),
                item_id: item_id.clone(),
                alert_type: AlertType::LowStock,
                severity,
                message,
                created_at: now,
            });
        }
    }
}
