use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::Permission;
use crate::permissions;

/// Role identifier used for RBAC.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Role(Cow<'static, str>);

impl Role {
    pub const ADMIN: &'static str = "admin";
    pub const OPERATOR: &'static str = "operator";

    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn admin() -> Self {
        Self::new(Self::ADMIN)
    }

    pub fn operator() -> Self {
        Self::new(Self::OPERATOR)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_admin(&self) -> bool {
        self.as_str() == Self::ADMIN
    }

    /// Role set for an account flag (`is_admin`).
    pub fn for_account(is_admin: bool) -> Vec<Role> {
        if is_admin {
            vec![Role::admin()]
        } else {
            vec![Role::operator()]
        }
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Static role → permission policy.
///
/// `admin` holds the wildcard. `operator` runs day-to-day stock work but
/// cannot manage users or the warehouse list. Unknown roles grant nothing.
pub fn permissions_for(role: &Role) -> Vec<Permission> {
    match role.as_str() {
        Role::ADMIN => vec![Permission::new(permissions::WILDCARD)],
        Role::OPERATOR => [
            permissions::ITEMS_READ,
            permissions::ITEMS_WRITE,
            permissions::MOVEMENTS_READ,
            permissions::MOVEMENTS_WRITE,
            permissions::WAREHOUSES_READ,
            permissions::WAREHOUSES_SELECT,
            permissions::IMPORT,
            permissions::REPORTS_READ,
            permissions::DAILY_RESET,
            permissions::COMPANY_READ,
        ]
        .into_iter()
        .map(Permission::new)
        .collect(),
        _ => Vec::new(),
    }
}
