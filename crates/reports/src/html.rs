//! "Word" report: a self-contained HTML document that word processors open
//! when served as `application/msword`.

use stockroom_inventory::price::cents_to_string;

use crate::ReportInput;

pub const RECENT_MOVEMENTS: usize = 20;

const STYLE: &str = "\
body { font-family: Arial, sans-serif; padding: 40px; }
h1 { color: #333; border-bottom: 3px solid #4a90e2; padding-bottom: 10px; }
.summary { background: #f5f5f5; padding: 20px; margin: 20px 0; border-radius: 8px; }
.summary-item { margin: 10px 0; font-size: 16px; }
table { width: 100%; border-collapse: collapse; margin-top: 20px; }
th, td { border: 1px solid #ddd; padding: 12px; text-align: left; }
th { background-color: #4a90e2; color: white; }
tr:nth-child(even) { background-color: #f9f9f9; }
.footer { margin-top: 40px; text-align: center; color: #666; font-size: 12px; }";

/// Escape text for HTML element content and attribute values.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

pub fn render(input: &ReportInput<'_>) -> String {
    let summary = input.summary();
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"UTF-8\">\n");
    html.push_str("<title>Informe de Inventario</title>\n<style>\n");
    html.push_str(STYLE);
    html.push_str("\n</style>\n</head>\n<body>\n<h1>Informe de Inventario</h1>\n");
    html.push_str(&format!(
        "<p><strong>Fecha de generación:</strong> {}</p>\n",
        escape(&input.calendar.format_timestamp(input.generated_at))
    ));

    html.push_str("<div class=\"summary\">\n<h2>Resumen General</h2>\n");
    for (label, value) in [
        ("Total de productos", summary.total_products.to_string()),
        ("Total de unidades disponibles", summary.total_units.to_string()),
        ("Total usado hoy", summary.total_used_today.to_string()),
        ("Valor total del inventario", format!("${}", cents_to_string(summary.total_value))),
    ] {
        html.push_str(&format!(
            "<div class=\"summary-item\"><strong>{label}:</strong> {}</div>\n",
            escape(&value)
        ));
    }
    html.push_str("</div>\n");

    html.push_str("<h2>Detalle de Productos</h2>\n");
    table_head(
        &mut html,
        &[
            "Código",
            "Nombre",
            "Bodega",
            "Inicial",
            "Usado Hoy",
            "Disponible",
            "Precio",
            "Valor Total",
            "Última Actualización",
        ],
    );
    for item in input.items {
        table_row(
            &mut html,
            &[
                item.code.clone(),
                item.name.clone(),
                input.warehouse_name(item.warehouse_id).to_string(),
                item.quantity_initial_today.to_string(),
                item.quantity_used_today.to_string(),
                item.quantity_available.to_string(),
                format!("${}", item.price),
                format!("${}", cents_to_string(item.total_value())),
                input.calendar.format_timestamp(item.updated_at),
            ],
        );
    }
    html.push_str("</tbody>\n</table>\n");

    html.push_str("<h2>Últimos Movimientos</h2>\n");
    table_head(
        &mut html,
        &[
            "Fecha",
            "Producto",
            "Tipo",
            "Cantidad Anterior",
            "Cantidad Nueva",
            "Descripción",
        ],
    );
    for movement in input.movements.iter().take(RECENT_MOVEMENTS) {
        table_row(
            &mut html,
            &[
                input.calendar.format_timestamp(movement.created_at),
                movement.item_name.clone(),
                movement.kind.to_string(),
                movement.quantity_before.to_string(),
                movement.quantity_after.to_string(),
                movement.description.clone(),
            ],
        );
    }
    html.push_str("</tbody>\n</table>\n");

    html.push_str(
        "<div class=\"footer\">\n<p>Informe generado automáticamente por Sistema de Inventario</p>\n</div>\n",
    );
    html.push_str("</body>\n</html>\n");
    html
}

fn table_head(html: &mut String, headers: &[&str]) {
    html.push_str("<table>\n<thead>\n<tr>");
    for header in headers {
        html.push_str(&format!("<th>{header}</th>"));
    }
    html.push_str("</tr>\n</thead>\n<tbody>\n");
}

fn table_row(html: &mut String, cells: &[String]) {
    html.push_str("<tr>");
    for cell in cells {
        html.push_str(&format!("<td>{}</td>", escape(cell)));
    }
    html.push_str("</tr>\n");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use stockroom_inventory::Movement;

    #[test]
    fn escapes_markup() {
        assert_eq!(escape("<b>\"A&B\"</b>"), "&lt;b&gt;&quot;A&amp;B&quot;&lt;/b&gt;");
    }

    #[test]
    fn report_contains_summary_items_and_movements() {
        let (items, movements, names) = fixtures::sample();
        let html = render(&fixtures::input(&items, &movements, &names));

        assert!(html.contains("<title>Informe de Inventario</title>"));
        assert!(html.contains("<strong>Total de productos:</strong> 2"));
        assert!(html.contains("<strong>Total usado hoy:</strong> 2"));
        assert!(html.contains("<td>Mouse &lt;MX&gt;</td>"));
        assert!(html.contains("<td>Bodega Central</td>"));
        assert!(html.contains("<td>salida</td>"));
        assert!(html.contains("<td>Salida de 2 unidades</td>"));
        assert!(!html.contains("<MX>"));
    }

    #[test]
    fn only_recent_movements_are_listed() {
        let (mut items, _, names) = fixtures::sample();
        let mut movements = Vec::new();
        for _ in 0..25 {
            let change = items[1].apply_entry(1, fixtures::at(11)).unwrap();
            movements.push(Movement::record(&items[1], change, None, fixtures::at(11), None));
        }
        let html = render(&fixtures::input(&items, &movements, &names));
        assert_eq!(html.matches("Entrada de 1 unidades").count(), RECENT_MOVEMENTS);
    }
}
