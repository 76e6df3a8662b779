//! Order tracking timeline.
//!
//! A timeline is the ordered history of tracking entries for one order.
//! Fetched history and pushed change events are merged into the same list:
//! inserts append, updates replace by id. The latest entry (by `created_at`)
//! is the current status. No transition rules are enforced; any status may
//! follow any other.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{OrderId, OrderStatus, TrackingEntryId};

/// One status update for an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
pub struct TrackingEntry {
    pub id: TrackingEntryId,
    pub order_id: OrderId,
    pub status: OrderStatus,
    pub status_message: Option<String>,
    pub tracking_number: Option<String>,
    pub estimated_delivery: Option<DateTime<Utc>>,
    pub actual_delivery: Option<DateTime<Utc>>,
    pub location: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A row-level change delivered by the change feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", content = "entry", rename_all = "snake_case")]
pub enum TrackingChange {
    Inserted(TrackingEntry),
    Updated(TrackingEntry),
}

impl TrackingChange {
    /// The entry carried by this change.
    #[must_use]
    pub const fn entry(&self) -> &TrackingEntry {
        match self {
            Self::Inserted(entry) | Self::Updated(entry) => entry,
        }
    }

    /// Order the change belongs to.
    #[must_use]
    pub const fn order_id(&self) -> OrderId {
        self.entry().order_id
    }
}

/// Position within the five-step progress sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Progress {
    /// 1-based step number.
    pub step: usize,
    pub total: usize,
    pub percent: u8,
}

/// One step of the progress sequence, for rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Step {
    pub status: OrderStatus,
    pub label: &'static str,
    pub completed: bool,
    pub current: bool,
}

/// Serializable snapshot of a timeline.
#[derive(Debug, Clone, Serialize)]
pub struct TimelineView {
    pub order_id: OrderId,
    pub current_status: Option<OrderStatus>,
    pub current_label: Option<&'static str>,
    pub progress: Option<Progress>,
    pub estimated_delivery: Option<DateTime<Utc>>,
    pub steps: Vec<Step>,
    /// Entries, newest first.
    pub entries: Vec<TrackingEntry>,
}

/// Tracking history for a single order.
#[derive(Debug, Clone)]
pub struct Timeline {
    order_id: OrderId,
    entries: Vec<TrackingEntry>,
}

impl Timeline {
    /// Build a timeline from fetched rows. Rows for other orders are dropped.
    #[must_use]
    pub fn new(order_id: OrderId, entries: Vec<TrackingEntry>) -> Self {
        let mut timeline = Self {
            order_id,
            entries: Vec::with_capacity(entries.len()),
        };
        for entry in entries {
            timeline.upsert(entry);
        }
        timeline
    }

    #[must_use]
    pub const fn order_id(&self) -> OrderId {
        self.order_id
    }

    /// Merge a pushed change. Returns `false` when the change belongs to a
    /// different order.
    pub fn apply(&mut self, change: TrackingChange) -> bool {
        match change {
            TrackingChange::Inserted(entry) | TrackingChange::Updated(entry) => self.upsert(entry),
        }
    }

    fn upsert(&mut self, entry: TrackingEntry) -> bool {
        if entry.order_id != self.order_id {
            return false;
        }
        if let Some(existing) = self.entries.iter_mut().find(|e| e.id == entry.id) {
            *existing = entry;
        } else {
            self.entries.push(entry);
        }
        self.entries
            .sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        true
    }

    /// Entries, oldest first.
    #[must_use]
    pub fn entries(&self) -> &[TrackingEntry] {
        &self.entries
    }

    /// Entries, newest first.
    #[must_use]
    pub fn newest_first(&self) -> Vec<TrackingEntry> {
        self.entries.iter().rev().cloned().collect()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The most recent entry.
    #[must_use]
    pub fn current(&self) -> Option<&TrackingEntry> {
        self.entries.last()
    }

    #[must_use]
    pub fn current_status(&self) -> Option<OrderStatus> {
        self.current().map(|e| e.status)
    }

    /// Where the order sits in the progress sequence. `None` when there is no
    /// history or the order was cancelled.
    #[must_use]
    pub fn progress(&self) -> Option<Progress> {
        let index = self.current_status()?.progress_index()?;
        let total = OrderStatus::PROGRESS.len();
        let step = index + 1;
        let percent = u8::try_from(step * 100 / total).unwrap_or(100);
        Some(Progress {
            step,
            total,
            percent,
        })
    }

    /// Latest known delivery estimate, hidden once the order is delivered.
    #[must_use]
    pub fn estimated_delivery(&self) -> Option<DateTime<Utc>> {
        if self.current_status() == Some(OrderStatus::Delivered) {
            return None;
        }
        self.entries.iter().rev().find_map(|e| e.estimated_delivery)
    }

    /// The five progress steps with completion flags.
    #[must_use]
    pub fn steps(&self) -> Vec<Step> {
        let current = self.current_status().and_then(OrderStatus::progress_index);
        OrderStatus::PROGRESS
            .iter()
            .enumerate()
            .map(|(i, status)| Step {
                status: *status,
                label: status.label(),
                completed: current.is_some_and(|c| i <= c),
                current: current == Some(i),
            })
            .collect()
    }

    #[must_use]
    pub fn view(&self) -> TimelineView {
        let current_status = self.current_status();
        TimelineView {
            order_id: self.order_id,
            current_status,
            current_label: current_status.map(OrderStatus::label),
            progress: self.progress(),
            estimated_delivery: self.estimated_delivery(),
            steps: self.steps(),
            entries: self.newest_first(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;
    use uuid::Uuid;

    use super::*;

    fn order() -> OrderId {
        OrderId::new(Uuid::from_u128(1))
    }

    fn entry(n: u128, status: OrderStatus, minute: u32) -> TrackingEntry {
        let at = Utc.with_ymd_and_hms(2026, 5, 1, 9, minute, 0).unwrap();
        TrackingEntry {
            id: TrackingEntryId::new(Uuid::from_u128(n)),
            order_id: order(),
            status,
            status_message: None,
            tracking_number: None,
            estimated_delivery: None,
            actual_delivery: None,
            location: None,
            created_at: at,
            updated_at: at,
        }
    }

    #[test]
    fn test_new_sorts_by_created_at() {
        let timeline = Timeline::new(
            order(),
            vec![
                entry(2, OrderStatus::Shipped, 30),
                entry(1, OrderStatus::OrderPlaced, 0),
            ],
        );
        assert_eq!(timeline.entries()[0].status, OrderStatus::OrderPlaced);
        assert_eq!(timeline.current_status(), Some(OrderStatus::Shipped));
    }

    #[test]
    fn test_insert_appends_and_update_replaces() {
        let mut timeline = Timeline::new(order(), vec![entry(1, OrderStatus::OrderPlaced, 0)]);

        assert!(timeline.apply(TrackingChange::Inserted(entry(2, OrderStatus::Processing, 5))));
        assert_eq!(timeline.entries().len(), 2);

        let mut edited = entry(2, OrderStatus::Processing, 5);
        edited.location = Some("Nairobi hub".to_owned());
        assert!(timeline.apply(TrackingChange::Updated(edited)));
        assert_eq!(timeline.entries().len(), 2);
        assert_eq!(
            timeline.current().unwrap().location.as_deref(),
            Some("Nairobi hub")
        );
    }

    #[test]
    fn test_duplicate_insert_is_idempotent() {
        let mut timeline = Timeline::new(order(), vec![entry(1, OrderStatus::OrderPlaced, 0)]);
        timeline.apply(TrackingChange::Inserted(entry(1, OrderStatus::OrderPlaced, 0)));
        assert_eq!(timeline.entries().len(), 1);
    }

    #[test]
    fn test_changes_for_other_orders_are_ignored() {
        let mut timeline = Timeline::new(order(), vec![]);
        let mut foreign = entry(9, OrderStatus::Shipped, 1);
        foreign.order_id = OrderId::new(Uuid::from_u128(99));
        assert!(!timeline.apply(TrackingChange::Inserted(foreign)));
        assert!(timeline.is_empty());
    }

    #[test]
    fn test_skipped_statuses_are_accepted() {
        let timeline = Timeline::new(
            order(),
            vec![
                entry(1, OrderStatus::OrderPlaced, 0),
                entry(2, OrderStatus::Delivered, 1),
            ],
        );
        let progress = timeline.progress().unwrap();
        assert_eq!(progress.step, 5);
        assert_eq!(progress.percent, 100);
    }

    #[test]
    fn test_progress_percentages() {
        let timeline = Timeline::new(order(), vec![entry(1, OrderStatus::Processing, 0)]);
        assert_eq!(
            timeline.progress(),
            Some(Progress {
                step: 2,
                total: 5,
                percent: 40
            })
        );
        let steps = timeline.steps();
        assert!(steps[0].completed && steps[1].completed && !steps[2].completed);
        assert!(steps[1].current);
    }

    #[test]
    fn test_cancelled_has_no_progress() {
        let timeline = Timeline::new(
            order(),
            vec![
                entry(1, OrderStatus::OrderPlaced, 0),
                entry(2, OrderStatus::Cancelled, 1),
            ],
        );
        assert_eq!(timeline.progress(), None);
        assert!(timeline.steps().iter().all(|s| !s.completed));
        assert_eq!(Timeline::new(order(), vec![]).progress(), None);
    }

    #[test]
    fn test_estimated_delivery_hidden_after_delivery() {
        let eta = Utc.with_ymd_and_hms(2026, 5, 4, 12, 0, 0).unwrap();
        let mut shipped = entry(2, OrderStatus::Shipped, 10);
        shipped.estimated_delivery = Some(eta);
        let mut timeline = Timeline::new(order(), vec![entry(1, OrderStatus::OrderPlaced, 0), shipped]);
        assert_eq!(timeline.estimated_delivery(), Some(eta));

        timeline.apply(TrackingChange::Inserted(entry(3, OrderStatus::Delivered, 20)));
        assert_eq!(timeline.estimated_delivery(), None);
    }

    #[test]
    fn test_view_lists_newest_first() {
        let timeline = Timeline::new(
            order(),
            vec![
                entry(1, OrderStatus::OrderPlaced, 0),
                entry(2, OrderStatus::Processing, 1),
            ],
        );
        let view = timeline.view();
        assert_eq!(view.entries[0].status, OrderStatus::Processing);
        assert_eq!(view.current_label, Some("Processing"));
    }

    #[test]
    fn test_change_serializes_with_op_tag() {
        let change = TrackingChange::Inserted(entry(1, OrderStatus::OrderPlaced, 0));
        let json = serde_json::to_value(&change).unwrap();
        assert_eq!(json["op"], "inserted");
        assert_eq!(json["entry"]["status"], "order_placed");
    }
}
