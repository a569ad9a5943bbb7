use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use stockroom_core::{CompanyId, DomainError, DomainResult, ItemId, UserId, WarehouseId};

use crate::calendar::BusinessCalendar;
use crate::movement::MovementKind;
use crate::price::Price;
use crate::required_text;

/// A product stocked in one warehouse, with its daily counters.
///
/// # Invariants
/// - `quantity_available`, `quantity_initial_today` and `quantity_used_today`
///   are never negative.
/// - `code` and `name` are trimmed and non-empty.
///
/// Fields are public so storage layers can rehydrate rows; mutate through the
/// methods below so movements stay consistent with the counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub id: ItemId,
    pub company_id: CompanyId,
    pub warehouse_id: WarehouseId,
    pub code: String,
    pub name: String,
    pub price: Price,
    /// How many units are on hand right now.
    pub quantity_available: i64,
    /// How many units were on hand when the current business day started.
    pub quantity_initial_today: i64,
    /// How many units left through exits since the day started.
    pub quantity_used_today: i64,
    /// When the daily counters were last rebaselined.
    pub day_started_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_by: Option<UserId>,
    /// Row version as last read from storage. Stores only accept a write
    /// whose version still matches, then bump it.
    #[serde(default)]
    pub version: i64,
}

/// Input for creating an item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewItem {
    pub code: String,
    pub name: String,
    pub quantity: i64,
    pub price: Price,
    /// Backdated entry date; the item is recorded as created at local midnight.
    pub entry_date: Option<NaiveDate>,
}

impl NewItem {
    /// Trim and check the input. Returns the normalized copy.
    pub fn validate(self) -> DomainResult<Self> {
        let code = required_text(&self.code, "code")?;
        let name = required_text(&self.name, "name")?;
        ensure_non_negative(self.quantity, "quantity")?;
        Ok(Self { code, name, ..self })
    }
}

/// Partial update of an item's record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemPatch {
    pub code: Option<String>,
    pub name: Option<String>,
    pub price: Option<Price>,
    pub quantity_available: Option<i64>,
}

impl ItemPatch {
    pub fn validate(self) -> DomainResult<Self> {
        let code = self.code.map(|c| required_text(&c, "code")).transpose()?;
        let name = self.name.map(|n| required_text(&n, "name")).transpose()?;
        if let Some(q) = self.quantity_available {
            ensure_non_negative(q, "quantity")?;
        }
        Ok(Self { code, name, ..self })
    }

    /// The new code, if it differs from the item's current one.
    pub fn code_change<'a>(&'a self, item: &InventoryItem) -> Option<&'a str> {
        self.code
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty() && *c != item.code)
    }

    /// The new name, if it differs from the item's current one.
    pub fn name_change<'a>(&'a self, item: &InventoryItem) -> Option<&'a str> {
        self.name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty() && *n != item.name)
    }
}

/// What a mutation did to the available quantity.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockChange {
    pub kind: MovementKind,
    pub quantity_before: i64,
    pub quantity_change: i64,
    pub quantity_after: i64,
}

impl InventoryItem {
    pub fn create(
        company_id: CompanyId,
        warehouse_id: WarehouseId,
        input: NewItem,
        created_by: Option<UserId>,
        calendar: &BusinessCalendar,
        now: DateTime<Utc>,
    ) -> DomainResult<(Self, StockChange)> {
        let input = input.validate()?;
        let created_at = input
            .entry_date
            .map(|d| calendar.start_of(d))
            .unwrap_or(now);

        let item = Self {
            id: ItemId::new(),
            company_id,
            warehouse_id,
            code: input.code,
            name: input.name,
            price: input.price,
            quantity_available: input.quantity,
            quantity_initial_today: input.quantity,
            quantity_used_today: 0,
            day_started_at: now,
            created_at,
            updated_at: now,
            created_by,
            version: 0,
        };

        let change = StockChange {
            kind: MovementKind::Creation,
            quantity_before: 0,
            quantity_change: input.quantity,
            quantity_after: input.quantity,
        };
        Ok((item, change))
    }

    /// Units received into the warehouse.
    pub fn apply_entry(&mut self, quantity: i64, now: DateTime<Utc>) -> DomainResult<StockChange> {
        ensure_positive(quantity)?;
        let before = self.quantity_available;
        let after = before
            .checked_add(quantity)
            .ok_or_else(|| DomainError::invariant("quantity overflow"))?;

        self.quantity_available = after;
        self.updated_at = now;

        Ok(StockChange {
            kind: MovementKind::Entry,
            quantity_before: before,
            quantity_change: quantity,
            quantity_after: after,
        })
    }

    /// Units used or sold. Counts towards today's usage.
    pub fn apply_exit(&mut self, quantity: i64, now: DateTime<Utc>) -> DomainResult<StockChange> {
        ensure_positive(quantity)?;
        let before = self.quantity_available;
        if quantity > before {
            return Err(DomainError::invariant(format!(
                "insufficient stock: requested {quantity}, available {before}"
            )));
        }

        self.quantity_available = before - quantity;
        self.quantity_used_today = self.quantity_used_today.saturating_add(quantity);
        self.updated_at = now;

        Ok(StockChange {
            kind: MovementKind::Exit,
            quantity_before: before,
            quantity_change: -quantity,
            quantity_after: self.quantity_available,
        })
    }

    /// Apply a record edit.
    ///
    /// A new available quantity is an adjustment (a correction, not usage), so
    /// `quantity_used_today` is left alone. Returns `None` when nothing changed.
    pub fn apply_edit(&mut self, patch: ItemPatch, now: DateTime<Utc>) -> DomainResult<Option<StockChange>> {
        let patch = patch.validate()?;
        let before = self.quantity_available;
        let mut details_changed = false;

        if let Some(code) = patch.code {
            details_changed |= code != self.code;
            self.code = code;
        }
        if let Some(name) = patch.name {
            details_changed |= name != self.name;
            self.name = name;
        }
        if let Some(price) = patch.price {
            details_changed |= price != self.price;
            self.price = price;
        }
        if let Some(quantity) = patch.quantity_available {
            self.quantity_available = quantity;
        }

        let after = self.quantity_available;
        let change = if after != before {
            Some(StockChange {
                kind: MovementKind::Adjustment,
                quantity_before: before,
                quantity_change: after - before,
                quantity_after: after,
            })
        } else if details_changed {
            Some(StockChange {
                kind: MovementKind::Edit,
                quantity_before: before,
                quantity_change: 0,
                quantity_after: after,
            })
        } else {
            None
        };

        if change.is_some() {
            self.updated_at = now;
        }
        Ok(change)
    }

    /// True when the daily counters belong to an earlier business day.
    pub fn needs_daily_reset(&self, calendar: &BusinessCalendar, now: DateTime<Utc>) -> bool {
        calendar.is_new_day(self.day_started_at, now)
    }

    /// Rebaseline the daily counters: what is on hand now is today's start.
    pub fn reset_day(&mut self, now: DateTime<Utc>) {
        self.quantity_initial_today = self.quantity_available;
        self.quantity_used_today = 0;
        self.day_started_at = now;
    }

    /// Stock value in cents.
    pub fn total_value(&self) -> i64 {
        self.price.times(self.quantity_available)
    }

    /// Case-insensitive match on code or name (used by search boxes).
    pub fn matches(&self, term: &str) -> bool {
        let term = term.trim().to_lowercase();
        term.is_empty()
            || self.code.to_lowercase().contains(&term)
            || self.name.to_lowercase().contains(&term)
    }
}

/// Name comparison used for uniqueness: trimmed and case-insensitive.
pub fn same_name(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}

/// Code comparison used for uniqueness: trimmed, exact.
pub fn same_code(a: &str, b: &str) -> bool {
    a.trim() == b.trim()
}

fn ensure_positive(quantity: i64) -> DomainResult<()> {
    if quantity <= 0 {
        return Err(DomainError::validation("quantity must be greater than zero"));
    }
    Ok(())
}

fn ensure_non_negative(quantity: i64, field: &str) -> DomainResult<()> {
    if quantity < 0 {
        return Err(DomainError::validation(format!("{field} cannot be negative")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeDelta, TimeZone};

    fn at(h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 5, 4, h, 0, 0).unwrap()
    }

    fn new_item(quantity: i64) -> NewItem {
        NewItem {
            code: " P001 ".into(),
            name: " Laptop Dell XPS 15 ".into(),
            quantity,
            price: Price::parse("1250.50").unwrap(),
            entry_date: None,
        }
    }

    fn item(quantity: i64) -> InventoryItem {
        let (item, _) = InventoryItem::create(
            CompanyId::new(),
            WarehouseId::new(),
            new_item(quantity),
            None,
            &BusinessCalendar::utc(),
            at(8),
        )
        .unwrap();
        item
    }

    #[test]
    fn create_sets_daily_baseline_and_creation_change() {
        let (item, change) = InventoryItem::create(
            CompanyId::new(),
            WarehouseId::new(),
            new_item(10),
            Some(UserId::new()),
            &BusinessCalendar::utc(),
            at(8),
        )
        .unwrap();

        assert_eq!(item.code, "P001");
        assert_eq!(item.name, "Laptop Dell XPS 15");
        assert_eq!(item.quantity_available, 10);
        assert_eq!(item.quantity_initial_today, 10);
        assert_eq!(item.quantity_used_today, 0);
        assert_eq!(change.kind, MovementKind::Creation);
        assert_eq!((change.quantity_before, change.quantity_change, change.quantity_after), (0, 10, 10));
    }

    #[test]
    fn create_with_entry_date_backdates_created_at() {
        let cal = BusinessCalendar::new(-300).unwrap();
        let mut input = new_item(1);
        input.entry_date = Some(NaiveDate::from_ymd_opt(2026, 5, 1).unwrap());
        let (item, _) =
            InventoryItem::create(CompanyId::new(), WarehouseId::new(), input, None, &cal, at(8)).unwrap();
        assert_eq!(item.created_at, Utc.with_ymd_and_hms(2026, 5, 1, 5, 0, 0).unwrap());
        assert_eq!(item.updated_at, at(8));
    }

    #[test]
    fn create_rejects_blank_fields_and_negative_quantity() {
        let cal = BusinessCalendar::utc();
        let mut blank = new_item(1);
        blank.code = "  ".into();
        assert!(InventoryItem::create(CompanyId::new(), WarehouseId::new(), blank, None, &cal, at(8)).is_err());

        assert!(
            InventoryItem::create(CompanyId::new(), WarehouseId::new(), new_item(-1), None, &cal, at(8)).is_err()
        );
    }

    #[test]
    fn entry_increases_available_only() {
        let mut item = item(5);
        let change = item.apply_entry(3, at(9)).unwrap();
        assert_eq!(item.quantity_available, 8);
        assert_eq!(item.quantity_used_today, 0);
        assert_eq!(change.quantity_change, 3);
        assert_eq!(item.updated_at, at(9));
    }

    #[test]
    fn exit_decreases_available_and_counts_usage() {
        let mut item = item(5);
        let change = item.apply_exit(2, at(9)).unwrap();
        assert_eq!(item.quantity_available, 3);
        assert_eq!(item.quantity_used_today, 2);
        assert_eq!((change.quantity_before, change.quantity_change, change.quantity_after), (5, -2, 3));
    }

    #[test]
    fn exit_cannot_exceed_available() {
        let mut item = item(5);
        let err = item.apply_exit(6, at(9)).unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(_)));
        assert_eq!(item.quantity_available, 5);
        assert_eq!(item.quantity_used_today, 0);
    }

    #[test]
    fn movements_require_positive_quantity() {
        let mut item = item(5);
        assert!(item.apply_entry(0, at(9)).is_err());
        assert!(item.apply_exit(-1, at(9)).is_err());
    }

    #[test]
    fn edit_of_quantity_is_an_adjustment() {
        let mut item = item(5);
        item.apply_exit(1, at(9)).unwrap();
        let change = item
            .apply_edit(
                ItemPatch {
                    quantity_available: Some(10),
                    ..ItemPatch::default()
                },
                at(10),
            )
            .unwrap()
            .unwrap();
        assert_eq!(change.kind, MovementKind::Adjustment);
        assert_eq!((change.quantity_before, change.quantity_change, change.quantity_after), (4, 6, 10));
        assert_eq!(item.quantity_used_today, 1);
    }

    #[test]
    fn edit_of_details_is_an_edit_and_noop_is_none() {
        let mut item = item(5);
        let change = item
            .apply_edit(
                ItemPatch {
                    name: Some("Laptop Dell XPS 13".into()),
                    price: Some(Price::parse("999").unwrap()),
                    ..ItemPatch::default()
                },
                at(10),
            )
            .unwrap()
            .unwrap();
        assert_eq!(change.kind, MovementKind::Edit);
        assert_eq!(change.quantity_change, 0);
        assert_eq!(item.name, "Laptop Dell XPS 13");

        let unchanged = item
            .apply_edit(
                ItemPatch {
                    code: Some("P001".into()),
                    ..ItemPatch::default()
                },
                at(11),
            )
            .unwrap();
        assert!(unchanged.is_none());
        assert_eq!(item.updated_at, at(10));
    }

    #[test]
    fn edit_rejects_blank_name_without_mutating() {
        let mut item = item(5);
        let before = item.clone();
        assert!(
            item.apply_edit(
                ItemPatch {
                    name: Some(" ".into()),
                    quantity_available: Some(1),
                    ..ItemPatch::default()
                },
                at(10),
            )
            .is_err()
        );
        assert_eq!(item, before);
    }

    #[test]
    fn patch_reports_only_real_changes() {
        let item = item(5);
        let patch = ItemPatch {
            code: Some(" P001 ".into()),
            name: Some("Otro".into()),
            ..ItemPatch::default()
        };
        assert_eq!(patch.code_change(&item), None);
        assert_eq!(patch.name_change(&item), Some("Otro"));
    }

    #[test]
    fn daily_reset_rebaselines_counters() {
        let cal = BusinessCalendar::utc();
        let mut item = item(10);
        item.apply_exit(4, at(9)).unwrap();
        assert!(!item.needs_daily_reset(&cal, at(23)));

        let tomorrow = at(8) + TimeDelta::days(1);
        assert!(item.needs_daily_reset(&cal, tomorrow));
        item.reset_day(tomorrow);
        assert_eq!(item.quantity_initial_today, 6);
        assert_eq!(item.quantity_used_today, 0);
        assert_eq!(item.quantity_available, 6);
        assert!(!item.needs_daily_reset(&cal, tomorrow));
    }

    #[test]
    fn search_and_uniqueness_helpers() {
        let item = item(1);
        assert!(item.matches("dell"));
        assert!(item.matches("p00"));
        assert!(item.matches(""));
        assert!(!item.matches("mouse"));

        assert!(same_name(" Mouse ", "mouse"));
        assert!(!same_code("p001", "P001"));
        assert!(same_code(" P001", "P001 "));
    }

    #[test]
    fn total_value_is_price_times_available() {
        let item = item(4);
        assert_eq!(item.total_value(), 4 * 125050);
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        #[derive(Debug, Clone)]
        enum Op {
            Entry(i64),
            Exit(i64),
            Set(i64),
            Reset,
        }

        fn op() -> impl Strategy<Value = Op> {
            prop_oneof![
                (1i64..500).prop_map(Op::Entry),
                (1i64..500).prop_map(Op::Exit),
                (0i64..1000).prop_map(Op::Set),
                Just(Op::Reset),
            ]
        }

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 500,
                ..ProptestConfig::default()
            })]

            /// Property: no sequence of operations drives a counter negative, and
            /// every accepted change is arithmetically consistent.
            #[test]
            fn counters_never_go_negative(start in 0i64..1000, ops in prop::collection::vec(op(), 0..40)) {
                let mut item = item(start);
                for op in ops {
                    let result = match op {
                        Op::Entry(q) => item.apply_entry(q, at(9)).map(Some),
                        Op::Exit(q) => item.apply_exit(q, at(9)).map(Some),
                        Op::Set(q) => item.apply_edit(
                            ItemPatch { quantity_available: Some(q), ..ItemPatch::default() },
                            at(9),
                        ),
                        Op::Reset => {
                            item.reset_day(at(9));
                            Ok(None)
                        }
                    };
                    if let Ok(Some(change)) = result {
                        prop_assert_eq!(change.quantity_before + change.quantity_change, change.quantity_after);
                        prop_assert_eq!(change.quantity_after, item.quantity_available);
                    }
                    prop_assert!(item.quantity_available >= 0);
                    prop_assert!(item.quantity_used_today >= 0);
                    prop_assert!(item.quantity_initial_today >= 0);
                }
            }

            /// Property: a rejected exit leaves the item untouched.
            #[test]
            fn rejected_exit_is_side_effect_free(start in 0i64..100, extra in 1i64..100) {
                let mut item = item(start);
                let before = item.clone();
                prop_assert!(item.apply_exit(start + extra, at(9)).is_err());
                prop_assert_eq!(item, before);
            }
        }
    }
}
