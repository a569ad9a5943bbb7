//! Inventory domain module.
//!
//! Business rules for warehouses, stocked items and stock movements,
//! implemented as deterministic domain logic (no IO, no HTTP, no storage).
//! Callers pass `now` explicitly so every rule is reproducible in tests.

pub mod calendar;
pub mod company;
pub mod item;
pub mod movement;
pub mod price;
pub mod scope;
pub mod summary;
pub mod warehouse;

pub use calendar::BusinessCalendar;
pub use company::{Company, CompanyPatch, NewCompany};
pub use item::{InventoryItem, ItemPatch, NewItem, StockChange};
pub use movement::{Movement, MovementKind};
pub use price::Price;
pub use scope::WarehouseScope;
pub use summary::{InventorySummary, usage_in_period};
pub use warehouse::{NewWarehouse, Warehouse, WarehousePatch};

/// Trim a required text field, rejecting blank input.
pub(crate) fn required_text(
    value: &str,
    field: &str,
) -> stockroom_core::DomainResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(stockroom_core::DomainError::validation(format!(
            "{field} cannot be empty"
        )));
    }
    Ok(trimmed.to_string())
}

/// Trim an optional text field; blank becomes `None`.
pub(crate) fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
