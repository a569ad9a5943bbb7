use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use stockroom_auth::{NewUser, UserAccount};
use stockroom_core::{DomainError, DomainResult};
use stockroom_infra::{ItemUsage, MovementDirection, MovementRequest};
use stockroom_inventory::calendar::parse_date;
use stockroom_inventory::{
    InventoryItem, InventorySummary, ItemPatch, Movement, MovementKind, NewCompany, NewItem, Price, WarehouseScope,
};

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct SetupRequest {
    pub company: NewCompany,
    pub admin: NewUser,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Email or username.
    #[serde(alias = "email", alias = "username")]
    pub login: String,
    pub password: String,
}

/// Prices arrive as JSON numbers from forms and as text from pasted values.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PriceInput {
    Number(f64),
    Text(String),
}

impl PriceInput {
    pub fn into_price(self) -> DomainResult<Price> {
        match self {
            PriceInput::Number(n) => Price::from_decimal(n),
            PriceInput::Text(s) => Price::parse(&s),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateItemRequest {
    pub code: String,
    pub name: String,
    pub quantity: i64,
    pub price: PriceInput,
    /// `YYYY-MM-DD`
    #[serde(default)]
    pub entry_date: Option<String>,
}

impl CreateItemRequest {
    pub fn into_new_item(self) -> DomainResult<NewItem> {
        Ok(NewItem {
            code: self.code,
            name: self.name,
            quantity: self.quantity,
            price: self.price.into_price()?,
            entry_date: optional_date(self.entry_date.as_deref())?,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateItemRequest {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub price: Option<PriceInput>,
    #[serde(default)]
    pub quantity_available: Option<i64>,
}

impl UpdateItemRequest {
    pub fn into_patch(self) -> DomainResult<ItemPatch> {
        Ok(ItemPatch {
            code: self.code,
            name: self.name,
            price: self.price.map(PriceInput::into_price).transpose()?,
            quantity_available: self.quantity_available,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct MovementBody {
    /// `entrada` or `salida`.
    pub movement_type: String,
    pub quantity: i64,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl MovementBody {
    pub fn into_request(self) -> DomainResult<MovementRequest> {
        let direction = match self.movement_type.parse::<MovementKind>()? {
            MovementKind::Entry => MovementDirection::Entry,
            MovementKind::Exit => MovementDirection::Exit,
            other => {
                return Err(DomainError::validation(format!(
                    "movement_type must be entrada or salida, got {other}"
                )));
            }
        };
        Ok(MovementRequest {
            direction,
            quantity: self.quantity,
            date: optional_date(self.date.as_deref())?,
            description: self.description,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct SelectWarehouseRequest {
    pub warehouse_id: String,
}

/// Query string shared by the scoped read endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct ScopeQuery {
    /// `all` or a warehouse id; absent means the caller's selection.
    #[serde(default)]
    pub warehouse: Option<String>,
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub to: Option<String>,
    #[serde(default)]
    pub limit: Option<usize>,
}

impl ScopeQuery {
    pub fn scope(&self) -> DomainResult<Option<WarehouseScope>> {
        match self.warehouse.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(raw) => raw.parse().map(Some),
        }
    }
}

pub fn optional_date(raw: Option<&str>) -> DomainResult<Option<chrono::NaiveDate>> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => parse_date(s).map(Some),
    }
}

// -------------------------
// Response mapping
// -------------------------

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub expires_at: chrono::DateTime<chrono::Utc>,
    pub user: UserAccount,
}

fn decimal(cents: i64) -> f64 {
    cents as f64 / 100.0
}

pub fn item_to_json(item: &InventoryItem) -> Value {
    json!({
        "id": item.id.to_string(),
        "warehouse_id": item.warehouse_id.to_string(),
        "code": item.code,
        "name": item.name,
        "price": item.price.as_decimal(),
        "quantity_available": item.quantity_available,
        "quantity_initial_today": item.quantity_initial_today,
        "quantity_used_today": item.quantity_used_today,
        "total_value": decimal(item.total_value()),
        "day_started_at": item.day_started_at,
        "created_at": item.created_at,
        "updated_at": item.updated_at,
    })
}

pub fn items_to_json(items: &[InventoryItem]) -> Value {
    Value::Array(items.iter().map(item_to_json).collect())
}

pub fn movement_to_json(m: &Movement) -> Value {
    json!({
        "id": m.id.to_string(),
        "item_id": m.item_id.to_string(),
        "warehouse_id": m.warehouse_id.to_string(),
        "item_code": m.item_code,
        "item_name": m.item_name,
        "movement_type": m.kind,
        "quantity_before": m.quantity_before,
        "quantity_change": m.quantity_change,
        "quantity_after": m.quantity_after,
        "description": m.description,
        "created_at": m.created_at,
        "created_by": m.created_by.map(|u| u.to_string()),
    })
}

pub fn movements_to_json(movements: &[Movement]) -> Value {
    Value::Array(movements.iter().map(movement_to_json).collect())
}

pub fn summary_to_json(summary: &InventorySummary) -> Value {
    json!({
        "total_products": summary.total_products,
        "total_units": summary.total_units,
        "total_used_today": summary.total_used_today,
        "total_value": decimal(summary.total_value),
    })
}

pub fn usage_to_json(usage: &[ItemUsage]) -> Value {
    Value::Array(
        usage
            .iter()
            .map(|u| {
                json!({
                    "item_id": u.item_id.to_string(),
                    "code": u.code,
                    "name": u.name,
                    "used": u.used,
                })
            })
            .collect(),
    )
}
