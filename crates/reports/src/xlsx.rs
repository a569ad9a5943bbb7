use rust_xlsxwriter::{Format, Workbook, Worksheet};

use crate::ReportInput;
use crate::error::ReportError;

const HEADERS: [&str; 6] = ["Código", "Nombre", "Bodega", "Cantidad", "Precio", "Valor Total"];

/// Spreadsheet export: the simple columns plus warehouse and stock value.
pub fn render(input: &ReportInput<'_>) -> Result<Vec<u8>, ReportError> {
    let mut workbook = Workbook::new();
    let mut worksheet = Worksheet::new();
    worksheet.set_name("Inventario")?;

    let bold = Format::new().set_bold();
    for (col, header) in HEADERS.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, *header, &bold)?;
    }

    for (idx, item) in input.items.iter().enumerate() {
        let row = (idx + 1) as u32;
        worksheet.write_string(row, 0, item.code.as_str())?;
        worksheet.write_string(row, 1, item.name.as_str())?;
        worksheet.write_string(row, 2, input.warehouse_name(item.warehouse_id))?;
        worksheet.write_number(row, 3, item.quantity_available as f64)?;
        worksheet.write_number(row, 4, item.price.as_decimal())?;
        worksheet.write_number(row, 5, item.total_value() as f64 / 100.0)?;
    }

    workbook.push_worksheet(worksheet);
    Ok(workbook.save_to_buffer()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;

    #[test]
    fn produces_a_zip_container() {
        let (items, movements, names) = fixtures::sample();
        let bytes = render(&fixtures::input(&items, &movements, &names)).unwrap();
        assert!(bytes.starts_with(b"PK"));
    }
}
