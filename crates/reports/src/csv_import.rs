//! Column-matching heuristics for inventory CSV files.
//!
//! Accepts both the simple export (`Código,Nombre,Cantidad,Precio`) and the
//! wider report layout, matching headers after accent folding.

use csv::{ReaderBuilder, StringRecord, Trim};
use serde::Serialize;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

use stockroom_inventory::Price;

use crate::error::ImportError;

/// A row that passed field-level checks. Uniqueness is checked by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportRow {
    /// 1-based physical line in the file.
    pub line: u64,
    pub code: String,
    pub name: String,
    pub quantity: i64,
    pub price: Price,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowError {
    pub line: u64,
    pub message: String,
}

impl RowError {
    pub fn new(line: u64, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }
}

impl core::fmt::Display for RowError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedImport {
    pub rows: Vec<ImportRow>,
    pub errors: Vec<RowError>,
}

/// Outcome of an import into a warehouse.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    pub imported: usize,
    pub errors: Vec<RowError>,
}

impl ImportReport {
    pub fn success(&self) -> bool {
        self.imported > 0
    }
}

/// Lowercase and strip diacritics (`Código` → `codigo`).
pub fn normalize_header(text: &str) -> String {
    text.trim()
        .to_lowercase()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect()
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct Columns {
    code: Option<usize>,
    name: Option<usize>,
    quantity: Option<usize>,
    price: Option<usize>,
}

impl Columns {
    fn locate(headers: &[String]) -> Self {
        Self {
            code: position(headers, |h| h.contains("codigo") || h.contains("code")),
            name: position(headers, |h| h.contains("nombre") || h.contains("name")),
            quantity: position(headers, |h| {
                ["cantidad", "quantity", "disponible", "available"]
                    .iter()
                    .any(|k| h.contains(k))
            }),
            price: position(headers, |h| {
                (h.contains("precio") || h.contains("price")) && !h.contains("total") && !h.contains("valor")
            }),
        }
    }
}

fn position(headers: &[String], pred: impl Fn(&str) -> bool) -> Option<usize> {
    headers.iter().position(|h| pred(h.as_str()))
}

fn has_required_columns(joined: &str) -> bool {
    let any = |keys: &[&str]| keys.iter().any(|k| joined.contains(k));
    any(&["codigo", "code"])
        && any(&["nombre"])
        && any(&["cantidad", "quantity", "disponible"])
        && any(&["precio", "price"])
}

/// Parse CSV text into candidate rows and per-line errors.
///
/// Fails only for file-level problems (empty input, missing header columns,
/// broken CSV framing). Rows with blank code/name or unparsable numbers are
/// reported and skipped.
pub fn parse_csv(text: &str) -> Result<ParsedImport, ImportError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(text.as_bytes());

    let mut records = reader.records().filter(|r| match r {
        Ok(record) => !is_blank(record),
        Err(_) => true,
    });

    let header = match records.next() {
        Some(record) => record?,
        None => return Err(ImportError::Empty),
    };
    let headers: Vec<String> = header.iter().map(normalize_header).collect();
    if !has_required_columns(&headers.join(",")) {
        return Err(ImportError::MissingColumns);
    }
    let columns = Columns::locate(&headers);

    let mut parsed = ParsedImport::default();
    for record in records {
        let record = record?;
        let line = record.position().map(|p| p.line()).unwrap_or_default();
        match parse_row(&record, headers.len(), columns) {
            Ok((code, name, quantity, price)) => parsed.rows.push(ImportRow {
                line,
                code,
                name,
                quantity,
                price,
            }),
            Err(message) => parsed.errors.push(RowError::new(line, message)),
        }
    }

    tracing::debug!(
        rows = parsed.rows.len(),
        errors = parsed.errors.len(),
        "parsed inventory csv"
    );
    Ok(parsed)
}

fn is_blank(record: &StringRecord) -> bool {
    record.iter().all(str::is_empty)
}

fn parse_row(
    record: &StringRecord,
    header_len: usize,
    columns: Columns,
) -> Result<(String, String, i64, Price), String> {
    let value = |idx: usize| record.get(idx).unwrap_or("").to_string();

    let mut code = value(0);
    let mut name = value(1);
    let mut quantity_raw = String::new();
    let mut price_raw = String::new();

    if record.len() == 4 && header_len == 4 {
        quantity_raw = value(2);
        price_raw = value(3);
    } else {
        if let Some(idx) = columns.code {
            code = value(idx);
        }
        if let Some(idx) = columns.name {
            name = value(idx);
        }
        if let Some(idx) = columns.quantity {
            quantity_raw = value(idx);
        }
        if let Some(idx) = columns.price {
            price_raw = value(idx);
        }
        if quantity_raw.is_empty() && record.len() >= 3 {
            quantity_raw = value(2);
        }
        if price_raw.is_empty() && record.len() >= 4 {
            price_raw = value(3);
        }
    }

    if code.is_empty() || name.is_empty() {
        return Err("empty code or name".to_string());
    }

    let invalid = || format!("invalid quantity or price ({quantity_raw}, {price_raw})");
    let quantity = parse_quantity(&quantity_raw).ok_or_else(invalid)?;
    let price = Price::parse(&price_raw).map_err(|_| invalid())?;

    Ok((code, name, quantity, price))
}

/// Non-negative number, floored to whole units.
fn parse_quantity(raw: &str) -> Option<i64> {
    let value: f64 = raw.trim().replace(',', ".").parse().ok()?;
    if !value.is_finite() || value < 0.0 || value > i64::MAX as f64 {
        return None;
    }
    Some(value.floor() as i64)
}
