//! `stockroom-core`: identifiers and the domain error model shared by every
//! stockroom crate.
//!
//! Nothing in here performs IO.

pub mod error;
pub mod id;

pub use error::{DomainError, DomainResult};
pub use id::{CompanyId, ItemId, MovementId, UserId, WarehouseId};
