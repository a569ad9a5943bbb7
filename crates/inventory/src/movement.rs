use core::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockroom_core::{CompanyId, DomainError, ItemId, MovementId, UserId, WarehouseId};

use crate::item::{InventoryItem, StockChange};

/// Kind of recorded change.
///
/// Wire names are the ones stored by the existing database and exports.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MovementKind {
    #[serde(rename = "entrada")]
    Entry,
    #[serde(rename = "salida")]
    Exit,
    #[serde(rename = "creacion")]
    Creation,
    #[serde(rename = "edicion")]
    Edit,
    #[serde(rename = "ajuste")]
    Adjustment,
}

impl MovementKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MovementKind::Entry => "entrada",
            MovementKind::Exit => "salida",
            MovementKind::Creation => "creacion",
            MovementKind::Edit => "edicion",
            MovementKind::Adjustment => "ajuste",
        }
    }
}

impl core::fmt::Display for MovementKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MovementKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "entrada" | "entry" => Ok(MovementKind::Entry),
            "salida" | "exit" => Ok(MovementKind::Exit),
            "creacion" | "creation" => Ok(MovementKind::Creation),
            "edicion" | "edit" => Ok(MovementKind::Edit),
            "ajuste" | "adjustment" => Ok(MovementKind::Adjustment),
            other => Err(DomainError::validation(format!("unknown movement kind: {other}"))),
        }
    }
}

/// An immutable record of a change to an item.
///
/// Code and name are copied at recording time so history survives renames.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movement {
    pub id: MovementId,
    pub company_id: CompanyId,
    pub warehouse_id: WarehouseId,
    pub item_id: ItemId,
    pub item_code: String,
    pub item_name: String,
    pub kind: MovementKind,
    pub quantity_before: i64,
    pub quantity_change: i64,
    pub quantity_after: i64,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub created_by: Option<UserId>,
}

impl Movement {
    /// Record `change` against `item` (the item state *after* the change).
    ///
    /// A blank `description` falls back to the default text for the kind.
    pub fn record(
        item: &InventoryItem,
        change: StockChange,
        description: Option<String>,
        created_at: DateTime<Utc>,
        created_by: Option<UserId>,
    ) -> Self {
        let description = description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty())
            .unwrap_or_else(|| default_description(item, &change));

        Self {
            id: MovementId::new(),
            company_id: item.company_id,
            warehouse_id: item.warehouse_id,
            item_id: item.id,
            item_code: item.code.clone(),
            item_name: item.name.clone(),
            kind: change.kind,
            quantity_before: change.quantity_before,
            quantity_change: change.quantity_change,
            quantity_after: change.quantity_after,
            description,
            created_at,
            created_by,
        }
    }

    /// Arithmetic consistency of the recorded quantities.
    pub fn is_consistent(&self) -> bool {
        match self.kind {
            MovementKind::Edit => self.quantity_change == 0 && self.quantity_before == self.quantity_after,
            _ => self.quantity_before + self.quantity_change == self.quantity_after,
        }
    }

    /// Units that left the warehouse with this movement (exits only).
    pub fn units_out(&self) -> i64 {
        match self.kind {
            MovementKind::Exit => (self.quantity_before - self.quantity_after).max(0),
            _ => 0,
        }
    }
}

fn default_description(item: &InventoryItem, change: &StockChange) -> String {
    let units = change.quantity_change.abs();
    match change.kind {
        MovementKind::Creation => format!("Producto creado: {}", item.name),
        MovementKind::Entry => format!("Entrada de {units} unidades"),
        MovementKind::Exit => format!("Salida de {units} unidades"),
        MovementKind::Edit => "Producto editado".to_string(),
        MovementKind::Adjustment => format!(
            "Ajuste de {} a {} unidades",
            change.quantity_before, change.quantity_after
        ),
    }
}

/// Newest first; ties broken by id (UUIDv7, so insertion order).
pub fn sort_newest_first(movements: &mut [Movement]) {
    movements.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.id.as_uuid().cmp(a.id.as_uuid()))
    });
}
