use csv::{QuoteStyle, Terminator, Writer, WriterBuilder};

use stockroom_inventory::InventoryItem;

use crate::ReportInput;
use crate::error::ReportError;

pub const SIMPLE_HEADERS: [&str; 4] = ["Código", "Nombre", "Cantidad", "Precio"];

pub const FULL_HEADERS: [&str; 9] = [
    "Código",
    "Nombre",
    "Bodega",
    "Inicial",
    "Usado Hoy",
    "Disponible",
    "Precio",
    "Valor Total",
    "Fecha Actualización",
];

/// Re-importable export: code, name, available quantity, price.
pub fn simple_csv(items: &[InventoryItem]) -> Result<String, ReportError> {
    let mut writer = quoted_writer();
    for item in items {
        writer.write_record([
            item.code.clone(),
            item.name.clone(),
            item.quantity_available.to_string(),
            item.price.to_string(),
        ])?;
    }
    finish(&SIMPLE_HEADERS, writer)
}

/// Report export with daily counters, warehouse and stock value.
pub fn full_csv(input: &ReportInput<'_>) -> Result<String, ReportError> {
    let mut writer = quoted_writer();
    for item in input.items {
        writer.write_record([
            item.code.clone(),
            item.name.clone(),
            input.warehouse_name(item.warehouse_id).to_string(),
            item.quantity_initial_today.to_string(),
            item.quantity_used_today.to_string(),
            item.quantity_available.to_string(),
            item.price.to_string(),
            stockroom_inventory::price::cents_to_string(item.total_value()),
            input.calendar.format_timestamp(item.updated_at),
        ])?;
    }
    finish(&FULL_HEADERS, writer)
}

// Header line is bare; every data cell is quoted.
fn quoted_writer() -> Writer<Vec<u8>> {
    WriterBuilder::new()
        .has_headers(false)
        .quote_style(QuoteStyle::Always)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new())
}

fn finish(headers: &[&str], writer: Writer<Vec<u8>>) -> Result<String, ReportError> {
    let body = writer
        .into_inner()
        .map_err(|e| ReportError::Flush(e.error().to_string()))?;
    let mut out = headers.join(",");
    out.push('\n');
    out.push_str(&String::from_utf8(body)?);
    Ok(out)
}
