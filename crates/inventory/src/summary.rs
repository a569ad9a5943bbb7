//! Aggregates over already-fetched items and movements.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use stockroom_core::ItemId;

use crate::calendar::BusinessCalendar;
use crate::item::InventoryItem;
use crate::movement::Movement;

/// Dashboard/report totals for a set of items.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventorySummary {
    pub total_products: usize,
    pub total_units: i64,
    pub total_used_today: i64,
    /// Sum of available × price, in cents.
    pub total_value: i64,
}

impl InventorySummary {
    pub fn of<'a>(items: impl IntoIterator<Item = &'a InventoryItem>) -> Self {
        items.into_iter().fold(Self::default(), |acc, item| Self {
            total_products: acc.total_products + 1,
            total_units: acc.total_units.saturating_add(item.quantity_available),
            total_used_today: acc.total_used_today.saturating_add(item.quantity_used_today),
            total_value: acc.total_value.saturating_add(item.total_value()),
        })
    }
}

/// Units that left through exits for `item_id` with a business date in
/// `[from, to]` (inclusive).
pub fn usage_in_period<'a>(
    movements: impl IntoIterator<Item = &'a Movement>,
    item_id: ItemId,
    from: NaiveDate,
    to: NaiveDate,
    calendar: &BusinessCalendar,
) -> i64 {
    movements
        .into_iter()
        .filter(|m| m.item_id == item_id)
        .filter(|m| {
            let day = calendar.date_of(m.created_at);
            day >= from && day <= to
        })
        .map(Movement::units_out)
        .sum()
}
