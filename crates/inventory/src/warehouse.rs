use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockroom_core::{CompanyId, DomainResult, WarehouseId};

use crate::{optional_text, required_text};

/// A named, location-scoped partition of a company's inventory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Warehouse {
    pub id: WarehouseId,
    pub company_id: CompanyId,
    pub name: String,
    pub location: Option<String>,
    pub manager: Option<String>,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewWarehouse {
    pub name: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub manager: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

impl Warehouse {
    pub fn create(company_id: CompanyId, input: NewWarehouse, now: DateTime<Utc>) -> DomainResult<Self> {
        Ok(Self {
            id: WarehouseId::new(),
            company_id,
            name: required_text(&input.name, "warehouse name")?,
            location: optional_text(input.location),
            manager: optional_text(input.manager),
            phone: optional_text(input.phone),
            created_at: now,
        })
    }

    pub fn apply(&mut self, patch: WarehousePatch) -> DomainResult<()> {
        if let Some(name) = patch.name {
            self.name = required_text(&name, "warehouse name")?;
        }
        if patch.location.is_some() {
            self.location = optional_text(patch.location);
        }
        if patch.manager.is_some() {
            self.manager = optional_text(patch.manager);
        }
        if patch.phone.is_some() {
            self.phone = optional_text(patch.phone);
        }
        Ok(())
    }
}

/// Partial update. For optional fields an empty string clears the value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WarehousePatch {
    pub name: Option<String>,
    pub location: Option<String>,
    pub manager: Option<String>,
    pub phone: Option<String>,
}
