//! Persistence boundary for companies, users, warehouses, items and movements.
//!
//! Every read and write is scoped by [`CompanyId`]; a record belonging to
//! another company behaves exactly like a missing one.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use stockroom_auth::UserAccount;
use stockroom_core::{CompanyId, ItemId, UserId, WarehouseId};
use stockroom_inventory::{Company, InventoryItem, Movement, Warehouse, WarehouseScope};

pub mod in_memory;
pub mod postgres;

pub use in_memory::InMemoryInventoryStore;
pub use postgres::PostgresInventoryStore;

pub type StoreResult<T> = Result<T, StoreError>;

/// Storage operation error.
///
/// Infrastructure failures only; business rule violations are checked by the
/// service before anything reaches the store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A uniqueness constraint fired (lost race against a concurrent write).
    #[error("conflict: {0}")]
    Conflict(String),

    /// The row changed since it was read (stale `version`) or is gone.
    #[error("concurrent modification: {0}")]
    Concurrency(String),

    #[error("stored data could not be decoded: {0}")]
    Decode(String),

    #[error("storage backend error: {0}")]
    Backend(String),
}

/// A user row together with its password hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredUser {
    pub account: UserAccount,
    pub password_hash: String,
}

#[async_trait]
pub trait InventoryStore: Send + Sync {
    /// Total users across all companies (setup is only open while zero).
    async fn count_users(&self) -> StoreResult<u64>;

    /// Insert the first company together with its administrator, atomically
    /// with the "no users yet" check. `Conflict` once any user exists.
    async fn insert_first_admin(&self, company: &Company, admin: &UserAccount, password_hash: &str) -> StoreResult<()>;
    async fn get_company(&self, company_id: CompanyId) -> StoreResult<Option<Company>>;
    async fn update_company(&self, company: &Company) -> StoreResult<()>;

    async fn insert_user(&self, user: &UserAccount, password_hash: &str) -> StoreResult<()>;
    /// Look a user up by email (case-insensitive) or exact username.
    async fn find_user_by_login(&self, login: &str) -> StoreResult<Option<StoredUser>>;
    async fn get_user(&self, company_id: CompanyId, user_id: UserId) -> StoreResult<Option<UserAccount>>;
    async fn list_users(&self, company_id: CompanyId) -> StoreResult<Vec<UserAccount>>;
    async fn delete_user(&self, company_id: CompanyId, user_id: UserId) -> StoreResult<bool>;

    async fn selected_warehouse(&self, company_id: CompanyId, user_id: UserId) -> StoreResult<Option<WarehouseId>>;
    async fn set_selected_warehouse(
        &self,
        company_id: CompanyId,
        user_id: UserId,
        warehouse_id: Option<WarehouseId>,
    ) -> StoreResult<()>;

    async fn insert_warehouse(&self, warehouse: &Warehouse) -> StoreResult<()>;
    async fn get_warehouse(&self, company_id: CompanyId, warehouse_id: WarehouseId) -> StoreResult<Option<Warehouse>>;
    /// Ordered by name.
    async fn list_warehouses(&self, company_id: CompanyId) -> StoreResult<Vec<Warehouse>>;
    async fn update_warehouse(&self, warehouse: &Warehouse) -> StoreResult<()>;
    /// Deletes the warehouse with its items and movements, and clears user
    /// selections pointing at it.
    async fn delete_warehouse(&self, company_id: CompanyId, warehouse_id: WarehouseId) -> StoreResult<bool>;

    /// Insert a new item together with its creation movement.
    async fn insert_item(&self, item: &InventoryItem, movement: &Movement) -> StoreResult<()>;
    async fn get_item(&self, company_id: CompanyId, item_id: ItemId) -> StoreResult<Option<InventoryItem>>;
    /// Ordered by name.
    async fn list_items(&self, company_id: CompanyId, scope: WarehouseScope) -> StoreResult<Vec<InventoryItem>>;
    /// Persist item state and, atomically, the movement that explains it.
    ///
    /// `item.version` must be the version that was read; the write is refused
    /// with `Concurrency` if the stored row has moved on (or was deleted), and
    /// the stored version is bumped on success.
    async fn update_item(&self, item: &InventoryItem, movement: Option<&Movement>) -> StoreResult<()>;
    /// Deletes the item and its movements.
    async fn delete_item(&self, company_id: CompanyId, item_id: ItemId) -> StoreResult<bool>;
    async fn find_item_by_code(
        &self,
        company_id: CompanyId,
        warehouse_id: WarehouseId,
        code: &str,
    ) -> StoreResult<Option<InventoryItem>>;
    /// Case-insensitive on the trimmed name.
    async fn find_item_by_name(
        &self,
        company_id: CompanyId,
        warehouse_id: WarehouseId,
        name: &str,
    ) -> StoreResult<Option<InventoryItem>>;

    /// Newest first, at most `limit` rows.
    async fn list_movements(
        &self,
        company_id: CompanyId,
        scope: WarehouseScope,
        limit: usize,
    ) -> StoreResult<Vec<Movement>>;
    /// Newest first.
    async fn list_item_movements(&self, company_id: CompanyId, item_id: ItemId) -> StoreResult<Vec<Movement>>;
}

#[async_trait]
impl<S> InventoryStore for Arc<S>
where
    S: InventoryStore + ?Sized,
{
    async fn count_users(&self) -> StoreResult<u64> {
        (**self).count_users().await
    }

    async fn insert_first_admin(&self, company: &Company, admin: &UserAccount, password_hash: &str) -> StoreResult<()> {
        (**self).insert_first_admin(company, admin, password_hash).await
    }

    async fn get_company(&self, company_id: CompanyId) -> StoreResult<Option<Company>> {
        (**self).get_company(company_id).await
    }

    async fn update_company(&self, company: &Company) -> StoreResult<()> {
        (**self).update_company(company).await
    }

    async fn insert_user(&self, user: &UserAccount, password_hash: &str) -> StoreResult<()> {
        (**self).insert_user(user, password_hash).await
    }

    async fn find_user_by_login(&self, login: &str) -> StoreResult<Option<StoredUser>> {
        (**self).find_user_by_login(login).await
    }

    async fn get_user(&self, company_id: CompanyId, user_id: UserId) -> StoreResult<Option<UserAccount>> {
        (**self).get_user(company_id, user_id).await
    }

    async fn list_users(&self, company_id: CompanyId) -> StoreResult<Vec<UserAccount>> {
        (**self).list_users(company_id).await
    }

    async fn delete_user(&self, company_id: CompanyId, user_id: UserId) -> StoreResult<bool> {
        (**self).delete_user(company_id, user_id).await
    }

    async fn selected_warehouse(&self, company_id: CompanyId, user_id: UserId) -> StoreResult<Option<WarehouseId>> {
        (**self).selected_warehouse(company_id, user_id).await
    }

    async fn set_selected_warehouse(
        &self,
        company_id: CompanyId,
        user_id: UserId,
        warehouse_id: Option<WarehouseId>,
    ) -> StoreResult<()> {
        (**self).set_selected_warehouse(company_id, user_id, warehouse_id).await
    }

    async fn insert_warehouse(&self, warehouse: &Warehouse) -> StoreResult<()> {
        (**self).insert_warehouse(warehouse).await
    }

    async fn get_warehouse(&self, company_id: CompanyId, warehouse_id: WarehouseId) -> StoreResult<Option<Warehouse>> {
        (**self).get_warehouse(company_id, warehouse_id).await
    }

    async fn list_warehouses(&self, company_id: CompanyId) -> StoreResult<Vec<Warehouse>> {
        (**self).list_warehouses(company_id).await
    }

    async fn update_warehouse(&self, warehouse: &Warehouse) -> StoreResult<()> {
        (**self).update_warehouse(warehouse).await
    }

    async fn delete_warehouse(&self, company_id: CompanyId, warehouse_id: WarehouseId) -> StoreResult<bool> {
        (**self).delete_warehouse(company_id, warehouse_id).await
    }

    async fn insert_item(&self, item: &InventoryItem, movement: &Movement) -> StoreResult<()> {
        (**self).insert_item(item, movement).await
    }

    async fn get_item(&self, company_id: CompanyId, item_id: ItemId) -> StoreResult<Option<InventoryItem>> {
        (**self).get_item(company_id, item_id).await
    }

    async fn list_items(&self, company_id: CompanyId, scope: WarehouseScope) -> StoreResult<Vec<InventoryItem>> {
        (**self).list_items(company_id, scope).await
    }

    async fn update_item(&self, item: &InventoryItem, movement: Option<&Movement>) -> StoreResult<()> {
        (**self).update_item(item, movement).await
    }

    async fn delete_item(&self, company_id: CompanyId, item_id: ItemId) -> StoreResult<bool> {
        (**self).delete_item(company_id, item_id).await
    }

    async fn find_item_by_code(
        &self,
        company_id: CompanyId,
        warehouse_id: WarehouseId,
        code: &str,
    ) -> StoreResult<Option<InventoryItem>> {
        (**self).find_item_by_code(company_id, warehouse_id, code).await
    }

    async fn find_item_by_name(
        &self,
        company_id: CompanyId,
        warehouse_id: WarehouseId,
        name: &str,
    ) -> StoreResult<Option<InventoryItem>> {
        (**self).find_item_by_name(company_id, warehouse_id, name).await
    }

    async fn list_movements(
        &self,
        company_id: CompanyId,
        scope: WarehouseScope,
        limit: usize,
    ) -> StoreResult<Vec<Movement>> {
        (**self).list_movements(company_id, scope, limit).await
    }

    async fn list_item_movements(&self, company_id: CompanyId, item_id: ItemId) -> StoreResult<Vec<Movement>> {
        (**self).list_item_movements(company_id, item_id).await
    }
}
