use std::borrow::Cow;

use serde::{Deserialize, Serialize};

pub const WILDCARD: &str = "*";

pub const ITEMS_READ: &str = "inventory.items.read";
pub const ITEMS_WRITE: &str = "inventory.items.write";
pub const MOVEMENTS_READ: &str = "inventory.movements.read";
pub const MOVEMENTS_WRITE: &str = "inventory.movements.write";
pub const IMPORT: &str = "inventory.import";
pub const DAILY_RESET: &str = "inventory.daily_reset";
pub const REPORTS_READ: &str = "reports.read";
pub const WAREHOUSES_READ: &str = "warehouses.read";
pub const WAREHOUSES_SELECT: &str = "warehouses.select";
pub const WAREHOUSES_WRITE: &str = "warehouses.write";
pub const COMPANY_READ: &str = "company.read";
pub const COMPANY_WRITE: &str = "company.write";
pub const USERS_MANAGE: &str = "users.manage";

/// Permission identifier.
///
/// Permissions are opaque strings (e.g. `"inventory.items.write"`). The
/// wildcard `"*"` grants everything.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Permission(Cow<'static, str>);

impl Permission {
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_wildcard(&self) -> bool {
        self.as_str() == WILDCARD
    }
}

impl core::fmt::Display for Permission {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}
