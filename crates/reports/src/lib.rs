//! `stockroom-reports`: CSV import heuristics and report rendering.
//!
//! Everything here works on data that was already fetched and already passed
//! through the daily reset; no storage access, no HTTP.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};

use stockroom_core::WarehouseId;
use stockroom_inventory::{BusinessCalendar, InventoryItem, InventorySummary, Movement};

pub mod csv_export;
pub mod csv_import;
pub mod error;
pub mod html;
pub mod pdf;
pub mod xlsx;

pub use csv_import::{ImportReport, ImportRow, ParsedImport, RowError, parse_csv};
pub use error::{ImportError, ReportError};

pub const CSV_CONTENT_TYPE: &str = "text/csv; charset=utf-8";
pub const WORD_CONTENT_TYPE: &str = "application/msword";
pub const PDF_CONTENT_TYPE: &str = "application/pdf";
pub const XLSX_CONTENT_TYPE: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Label used when an item's warehouse is not in the lookup.
pub const NO_WAREHOUSE: &str = "Sin bodega";

/// Data a report is rendered from.
///
/// `movements` are expected newest first; each renderer takes its own prefix.
#[derive(Debug, Clone, Copy)]
pub struct ReportInput<'a> {
    pub items: &'a [InventoryItem],
    pub movements: &'a [Movement],
    pub warehouse_names: &'a HashMap<WarehouseId, String>,
    pub calendar: BusinessCalendar,
    pub generated_at: DateTime<Utc>,
}

impl ReportInput<'_> {
    pub fn summary(&self) -> InventorySummary {
        InventorySummary::of(self.items)
    }

    pub fn warehouse_name(&self, id: WarehouseId) -> &str {
        self.warehouse_names
            .get(&id)
            .map(String::as_str)
            .unwrap_or(NO_WAREHOUSE)
    }

    pub fn generated_on(&self) -> NaiveDate {
        self.calendar.date_of(self.generated_at)
    }
}

/// `inventario_2026-10-19.csv` style download names.
pub fn dated_filename(stem: &str, date: NaiveDate, extension: &str) -> String {
    format!("{stem}_{}.{extension}", date.format("%Y-%m-%d"))
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filenames_carry_the_date() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        assert_eq!(dated_filename("inventario", date, "csv"), "inventario_2026-10-19.csv");
        assert_eq!(
            dated_filename("informe_inventario", date, "doc"),
            "informe_inventario_2026-10-19.doc"
        );
    }

    #[test]
    fn unknown_warehouse_uses_placeholder() {
        let (items, movements, names) = fixtures::sample();
        let input = fixtures::input(&items, &movements, &names);
        assert_eq!(input.warehouse_name(items[0].warehouse_id), "Bodega Central");
        assert_eq!(input.warehouse_name(WarehouseId::new()), NO_WAREHOUSE);
        assert_eq!(input.summary().total_products, 2);
    }
}
