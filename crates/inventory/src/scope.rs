use core::str::FromStr;

use serde::{Deserialize, Serialize};

use stockroom_core::{DomainError, DomainResult, WarehouseId};

/// Which warehouses a read covers.
///
/// Reads may span every warehouse of the company; writes never do.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarehouseScope {
    All,
    One(WarehouseId),
}

impl WarehouseScope {
    /// The specific warehouse targeted by a write.
    pub fn require_specific(self) -> DomainResult<WarehouseId> {
        match self {
            WarehouseScope::One(id) => Ok(id),
            WarehouseScope::All => Err(DomainError::validation(
                "select a specific warehouse; writes cannot target all warehouses",
            )),
        }
    }

    pub fn includes(self, warehouse_id: WarehouseId) -> bool {
        match self {
            WarehouseScope::All => true,
            WarehouseScope::One(id) => id == warehouse_id,
        }
    }
}

impl FromStr for WarehouseScope {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("all") {
            return Ok(WarehouseScope::All);
        }
        Ok(WarehouseScope::One(s.parse()?))
    }
}

impl core::fmt::Display for WarehouseScope {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            WarehouseScope::All => f.write_str("all"),
            WarehouseScope::One(id) => core::fmt::Display::fmt(id, f),
        }
    }
}
