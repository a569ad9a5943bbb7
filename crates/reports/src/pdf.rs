//! A4 PDF report built with the builtin Helvetica faces.

use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference};

use stockroom_inventory::price::cents_to_string;

use crate::ReportInput;
use crate::error::ReportError;

pub const RECENT_MOVEMENTS: usize = 15;

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN: f32 = 14.0;
const ROW_HEIGHT: f32 = 7.0;
const LAYER: &str = "Contenido";

const ITEM_COLUMNS: [(&str, f32); 6] = [
    ("Código", 14.0),
    ("Nombre", 40.0),
    ("Inicial", 110.0),
    ("Usado", 130.0),
    ("Disponible", 150.0),
    ("Precio", 175.0),
];

const MOVEMENT_COLUMNS: [(&str, f32); 5] = [
    ("Fecha", 14.0),
    ("Producto", 50.0),
    ("Tipo", 115.0),
    ("Cant. Ant.", 145.0),
    ("Cant. Nueva", 172.0),
];

/// Writes lines top to bottom, opening a new page when the current one fills.
struct PageCursor {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    y: f32,
}

impl PageCursor {
    fn new(title: &str) -> Result<Self, ReportError> {
        let (doc, page, layer) = PdfDocument::new(title, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), LAYER);
        let regular = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| ReportError::Pdf(e.to_string()))?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| ReportError::Pdf(e.to_string()))?;
        let layer = doc.get_page(page).get_layer(layer);
        Ok(Self {
            doc,
            layer,
            regular,
            bold,
            y: PAGE_HEIGHT - 20.0,
        })
    }

    fn text(&self, text: &str, size: f32, x: f32, bold: bool) {
        let font = if bold { &self.bold } else { &self.regular };
        self.layer.use_text(text, size, Mm(x), Mm(self.y), font);
    }

    /// Move down by `dy`, starting a new page if that crosses the margin.
    fn advance(&mut self, dy: f32) {
        self.y -= dy;
        if self.y < MARGIN + ROW_HEIGHT {
            let (page, layer) = self.doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), LAYER);
            self.layer = self.doc.get_page(page).get_layer(layer);
            self.y = PAGE_HEIGHT - MARGIN - ROW_HEIGHT;
        }
    }

    fn row(&mut self, columns: &[(&str, f32)], cells: &[String], bold: bool) {
        for ((_, x), cell) in columns.iter().zip(cells) {
            self.text(cell, 9.0, *x, bold);
        }
        self.advance(ROW_HEIGHT);
    }

    fn header(&mut self, columns: &[(&str, f32)]) {
        let cells: Vec<String> = columns.iter().map(|(h, _)| h.to_string()).collect();
        self.row(columns, &cells, true);
    }

    fn finish(self) -> Result<Vec<u8>, ReportError> {
        self.doc
            .save_to_bytes()
            .map_err(|e| ReportError::Pdf(e.to_string()))
    }
}

fn clip(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max.saturating_sub(3)).collect();
    out.push_str("...");
    out
}

pub fn render(input: &ReportInput<'_>) -> Result<Vec<u8>, ReportError> {
    let summary = input.summary();
    let mut page = PageCursor::new("Informe de Inventario")?;

    page.text("Informe de Inventario", 20.0, MARGIN, true);
    page.advance(10.0);
    page.text(
        &format!(
            "Fecha de generación: {}",
            input.calendar.format_timestamp(input.generated_at)
        ),
        10.0,
        MARGIN,
        false,
    );
    page.advance(15.0);

    page.text("Resumen General", 14.0, MARGIN, true);
    page.advance(10.0);
    for line in [
        format!("Total de productos: {}", summary.total_products),
        format!("Total de unidades disponibles: {}", summary.total_units),
        format!("Total usado hoy: {}", summary.total_used_today),
        format!("Valor total del inventario: ${}", cents_to_string(summary.total_value)),
    ] {
        page.text(&line, 10.0, MARGIN, false);
        page.advance(ROW_HEIGHT);
    }
    page.advance(ROW_HEIGHT);

    page.header(&ITEM_COLUMNS);
    for item in input.items {
        page.row(
            &ITEM_COLUMNS,
            &[
                clip(&item.code, 14),
                clip(&item.name, 38),
                item.quantity_initial_today.to_string(),
                item.quantity_used_today.to_string(),
                item.quantity_available.to_string(),
                format!("${}", item.price),
            ],
            false,
        );
    }

    page.advance(ROW_HEIGHT);
    page.text("Últimos Movimientos", 14.0, MARGIN, true);
    page.advance(10.0);
    page.header(&MOVEMENT_COLUMNS);
    for movement in input.movements.iter().take(RECENT_MOVEMENTS) {
        page.row(
            &MOVEMENT_COLUMNS,
            &[
                input.calendar.format_short(movement.created_at),
                clip(&movement.item_name, 36),
                movement.kind.to_string(),
                movement.quantity_before.to_string(),
                movement.quantity_after.to_string(),
            ],
            false,
        );
    }

    page.finish()
}
