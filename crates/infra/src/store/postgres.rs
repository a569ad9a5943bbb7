//! Postgres-backed store.
//!
//! ## Error Mapping
//!
//! | SQLx error | PostgreSQL code | StoreError |
//! |------------|-----------------|------------|
//! | Database (unique violation) | `23505` | `Conflict` |
//! | Versioned update touching no row | n/a | `Concurrency` |
//! | Database (other) | any | `Backend` |
//! | Column decode / domain rehydration | n/a | `Decode` |
//! | Pool closed, IO, TLS, ... | n/a | `Backend` |

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgConnection, PgPool, Row};
use tracing::instrument;
use uuid::Uuid;

use stockroom_auth::UserAccount;
use stockroom_core::{CompanyId, ItemId, MovementId, UserId, WarehouseId};
use stockroom_inventory::{Company, InventoryItem, Movement, MovementKind, Price, Warehouse, WarehouseScope};

use super::{InventoryStore, StoreError, StoreResult, StoredUser};

const SCHEMA: &str = include_str!("../../migrations/0001_init.sql");

const ITEM_COLUMNS: &str = "id, company_id, warehouse_id, code, name, price_cents, quantity_available, \
     quantity_initial_today, quantity_used_today, day_started_at, created_at, updated_at, created_by, version";

const MOVEMENT_COLUMNS: &str = "id, company_id, warehouse_id, item_id, item_code, item_name, movement_type, \
     quantity_before, quantity_change, quantity_after, description, created_at, created_by";

const USER_COLUMNS: &str = "id, company_id, email, username, full_name, is_admin, created_at, password_hash";

/// Postgres store. Cheap to clone; clones share the pool.
#[derive(Debug, Clone)]
pub struct PostgresInventoryStore {
    pool: Arc<PgPool>,
}

impl PostgresInventoryStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool: Arc::new(pool) }
    }

    /// Open a pool against `url`.
    pub async fn connect(url: &str, max_connections: u32) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections.max(1))
            .acquire_timeout(Duration::from_secs(10))
            .connect(url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        Ok(Self::new(pool))
    }

    /// Apply the schema (idempotent: every statement is `IF NOT EXISTS`).
    pub async fn migrate(&self) -> StoreResult<()> {
        sqlx::raw_sql(SCHEMA)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("migrate", e))?;
        tracing::info!("database schema applied");
        Ok(())
    }
}

fn scope_filter(scope: WarehouseScope) -> Option<Uuid> {
    match scope {
        WarehouseScope::All => None,
        WarehouseScope::One(id) => Some(*id.as_uuid()),
    }
}

#[async_trait]
impl InventoryStore for PostgresInventoryStore {
    async fn count_users(&self) -> StoreResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("count_users", e))?;
        Ok(count.max(0) as u64)
    }

    #[instrument(skip(self, company, admin, password_hash), fields(company_id = %company.id), err)]
    async fn insert_first_admin(&self, company: &Company, admin: &UserAccount, password_hash: &str) -> StoreResult<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        // Self-conflicting lock: concurrent setups queue here and see each other's user.
        sqlx::query("LOCK TABLE users IN SHARE ROW EXCLUSIVE MODE")
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("lock_users", e))?;

        let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("count_users", e))?;
        if existing > 0 {
            tx.rollback()
                .await
                .map_err(|e| map_sqlx_error("rollback", e))?;
            return Err(StoreError::Conflict("setup has already been completed".into()));
        }

        sqlx::query(
            r#"
            INSERT INTO companies (id, name, tax_id, address, phone, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(company.id.as_uuid())
        .bind(&company.name)
        .bind(&company.tax_id)
        .bind(&company.address)
        .bind(&company.phone)
        .bind(company.created_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("insert_company", e))?;

        insert_user_row(&mut *tx, admin, password_hash).await?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))?;
        Ok(())
    }

    async fn get_company(&self, company_id: CompanyId) -> StoreResult<Option<Company>> {
        let row = sqlx::query("SELECT id, name, tax_id, address, phone, created_at FROM companies WHERE id = $1")
            .bind(company_id.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_company", e))?;
        row.as_ref().map(company_from_row).transpose()
    }

    async fn update_company(&self, company: &Company) -> StoreResult<()> {
        sqlx::query("UPDATE companies SET name = $2, tax_id = $3, address = $4, phone = $5 WHERE id = $1")
            .bind(company.id.as_uuid())
            .bind(&company.name)
            .bind(&company.tax_id)
            .bind(&company.address)
            .bind(&company.phone)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("update_company", e))?;
        Ok(())
    }

    async fn insert_user(&self, user: &UserAccount, password_hash: &str) -> StoreResult<()> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| map_sqlx_error("acquire", e))?;
        insert_user_row(&mut *conn, user, password_hash).await
    }

    async fn find_user_by_login(&self, login: &str) -> StoreResult<Option<StoredUser>> {
        let row = sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE lower(email) = lower($1) OR username = $1 LIMIT 1"
        ))
        .bind(login.trim())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("find_user_by_login", e))?;

        row.as_ref()
            .map(|r| {
                Ok(StoredUser {
                    account: user_from_row(r)?,
                    password_hash: r.try_get("password_hash").map_err(decode_error)?,
                })
            })
            .transpose()
    }

    async fn get_user(&self, company_id: CompanyId, user_id: UserId) -> StoreResult<Option<UserAccount>> {
        let row = sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE company_id = $1 AND id = $2"
        ))
        .bind(company_id.as_uuid())
        .bind(user_id.as_uuid())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("get_user", e))?;
        row.as_ref().map(user_from_row).transpose()
    }

    async fn list_users(&self, company_id: CompanyId) -> StoreResult<Vec<UserAccount>> {
        let rows = sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE company_id = $1 ORDER BY created_at"
        ))
        .bind(company_id.as_uuid())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_users", e))?;
        rows.iter().map(user_from_row).collect()
    }

    async fn delete_user(&self, company_id: CompanyId, user_id: UserId) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM users WHERE company_id = $1 AND id = $2")
            .bind(company_id.as_uuid())
            .bind(user_id.as_uuid())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_user", e))?;
        Ok(result.rows_affected() > 0)
    }

    async fn selected_warehouse(&self, company_id: CompanyId, user_id: UserId) -> StoreResult<Option<WarehouseId>> {
        let selected: Option<Option<Uuid>> = sqlx::query_scalar(
            "SELECT selected_warehouse_id FROM user_preferences WHERE company_id = $1 AND user_id = $2",
        )
        .bind(company_id.as_uuid())
        .bind(user_id.as_uuid())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("selected_warehouse", e))?;
        Ok(selected.flatten().map(WarehouseId::from_uuid))
    }

    async fn set_selected_warehouse(
        &self,
        company_id: CompanyId,
        user_id: UserId,
        warehouse_id: Option<WarehouseId>,
    ) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO user_preferences (user_id, company_id, selected_warehouse_id)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id)
            DO UPDATE SET selected_warehouse_id = EXCLUDED.selected_warehouse_id
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(company_id.as_uuid())
        .bind(warehouse_id.map(|w| *w.as_uuid()))
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("set_selected_warehouse", e))?;
        Ok(())
    }

    async fn insert_warehouse(&self, warehouse: &Warehouse) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO warehouses (id, company_id, name, location, manager, phone, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(warehouse.id.as_uuid())
        .bind(warehouse.company_id.as_uuid())
        .bind(&warehouse.name)
        .bind(&warehouse.location)
        .bind(&warehouse.manager)
        .bind(&warehouse.phone)
        .bind(warehouse.created_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_warehouse", e))?;
        Ok(())
    }

    async fn get_warehouse(&self, company_id: CompanyId, warehouse_id: WarehouseId) -> StoreResult<Option<Warehouse>> {
        let row = sqlx::query(
            "SELECT id, company_id, name, location, manager, phone, created_at \
             FROM warehouses WHERE company_id = $1 AND id = $2",
        )
        .bind(company_id.as_uuid())
        .bind(warehouse_id.as_uuid())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("get_warehouse", e))?;
        row.as_ref().map(warehouse_from_row).transpose()
    }

    async fn list_warehouses(&self, company_id: CompanyId) -> StoreResult<Vec<Warehouse>> {
        let rows = sqlx::query(
            "SELECT id, company_id, name, location, manager, phone, created_at \
             FROM warehouses WHERE company_id = $1 ORDER BY lower(name)",
        )
        .bind(company_id.as_uuid())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_warehouses", e))?;
        rows.iter().map(warehouse_from_row).collect()
    }

    async fn update_warehouse(&self, warehouse: &Warehouse) -> StoreResult<()> {
        sqlx::query(
            "UPDATE warehouses SET name = $3, location = $4, manager = $5, phone = $6 \
             WHERE company_id = $1 AND id = $2",
        )
        .bind(warehouse.company_id.as_uuid())
        .bind(warehouse.id.as_uuid())
        .bind(&warehouse.name)
        .bind(&warehouse.location)
        .bind(&warehouse.manager)
        .bind(&warehouse.phone)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_warehouse", e))?;
        Ok(())
    }

    // Items, movements and selections go with it through ON DELETE CASCADE / SET NULL.
    #[instrument(skip(self), fields(company_id = %company_id, warehouse_id = %warehouse_id), err)]
    async fn delete_warehouse(&self, company_id: CompanyId, warehouse_id: WarehouseId) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM warehouses WHERE company_id = $1 AND id = $2")
            .bind(company_id.as_uuid())
            .bind(warehouse_id.as_uuid())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_warehouse", e))?;
        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, item, movement), fields(item_id = %item.id), err)]
    async fn insert_item(&self, item: &InventoryItem, movement: &Movement) -> StoreResult<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        sqlx::query(&format!(
            "INSERT INTO inventory_items ({ITEM_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)"
        ))
        .bind(item.id.as_uuid())
        .bind(item.company_id.as_uuid())
        .bind(item.warehouse_id.as_uuid())
        .bind(&item.code)
        .bind(&item.name)
        .bind(item.price.cents())
        .bind(item.quantity_available)
        .bind(item.quantity_initial_today)
        .bind(item.quantity_used_today)
        .bind(item.day_started_at)
        .bind(item.created_at)
        .bind(item.updated_at)
        .bind(item.created_by.map(|u| *u.as_uuid()))
        .bind(item.version)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("insert_item", e))?;

        insert_movement(&mut tx, movement).await?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))?;
        Ok(())
    }

    async fn get_item(&self, company_id: CompanyId, item_id: ItemId) -> StoreResult<Option<InventoryItem>> {
        let row = sqlx::query(&format!(
            "SELECT {ITEM_COLUMNS} FROM inventory_items WHERE company_id = $1 AND id = $2"
        ))
        .bind(company_id.as_uuid())
        .bind(item_id.as_uuid())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("get_item", e))?;
        row.as_ref().map(item_from_row).transpose()
    }

    async fn list_items(&self, company_id: CompanyId, scope: WarehouseScope) -> StoreResult<Vec<InventoryItem>> {
        let rows = sqlx::query(&format!(
            "SELECT {ITEM_COLUMNS} FROM inventory_items \
             WHERE company_id = $1 AND ($2::uuid IS NULL OR warehouse_id = $2) \
             ORDER BY lower(name)"
        ))
        .bind(company_id.as_uuid())
        .bind(scope_filter(scope))
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_items", e))?;
        rows.iter().map(item_from_row).collect()
    }

    #[instrument(skip(self, item, movement), fields(item_id = %item.id), err)]
    async fn update_item(&self, item: &InventoryItem, movement: Option<&Movement>) -> StoreResult<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        let result = sqlx::query(
            r#"
            UPDATE inventory_items SET
                code = $3,
                name = $4,
                price_cents = $5,
                quantity_available = $6,
                quantity_initial_today = $7,
                quantity_used_today = $8,
                day_started_at = $9,
                updated_at = $10,
                version = version + 1
            WHERE company_id = $1 AND id = $2 AND version = $11
            "#,
        )
        .bind(item.company_id.as_uuid())
        .bind(item.id.as_uuid())
        .bind(&item.code)
        .bind(&item.name)
        .bind(item.price.cents())
        .bind(item.quantity_available)
        .bind(item.quantity_initial_today)
        .bind(item.quantity_used_today)
        .bind(item.day_started_at)
        .bind(item.updated_at)
        .bind(item.version)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("update_item", e))?;

        if result.rows_affected() == 0 {
            tx.rollback()
                .await
                .map_err(|e| map_sqlx_error("rollback", e))?;
            return Err(StoreError::Concurrency(format!(
                "item {} changed or was deleted since version {}",
                item.id, item.version
            )));
        }

        if let Some(movement) = movement {
            insert_movement(&mut tx, movement).await?;
        }

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))?;
        Ok(())
    }

    async fn delete_item(&self, company_id: CompanyId, item_id: ItemId) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM inventory_items WHERE company_id = $1 AND id = $2")
            .bind(company_id.as_uuid())
            .bind(item_id.as_uuid())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_item", e))?;
        Ok(result.rows_affected() > 0)
    }

    async fn find_item_by_code(
        &self,
        company_id: CompanyId,
        warehouse_id: WarehouseId,
        code: &str,
    ) -> StoreResult<Option<InventoryItem>> {
        let row = sqlx::query(&format!(
            "SELECT {ITEM_COLUMNS} FROM inventory_items \
             WHERE company_id = $1 AND warehouse_id = $2 AND code = $3 LIMIT 1"
        ))
        .bind(company_id.as_uuid())
        .bind(warehouse_id.as_uuid())
        .bind(code.trim())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("find_item_by_code", e))?;
        row.as_ref().map(item_from_row).transpose()
    }

    async fn find_item_by_name(
        &self,
        company_id: CompanyId,
        warehouse_id: WarehouseId,
        name: &str,
    ) -> StoreResult<Option<InventoryItem>> {
        let row = sqlx::query(&format!(
            "SELECT {ITEM_COLUMNS} FROM inventory_items \
             WHERE company_id = $1 AND warehouse_id = $2 AND lower(name) = lower($3) LIMIT 1"
        ))
        .bind(company_id.as_uuid())
        .bind(warehouse_id.as_uuid())
        .bind(name.trim())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("find_item_by_name", e))?;
        row.as_ref().map(item_from_row).transpose()
    }

    async fn list_movements(
        &self,
        company_id: CompanyId,
        scope: WarehouseScope,
        limit: usize,
    ) -> StoreResult<Vec<Movement>> {
        let rows = sqlx::query(&format!(
            "SELECT {MOVEMENT_COLUMNS} FROM inventory_movements \
             WHERE company_id = $1 AND ($2::uuid IS NULL OR warehouse_id = $2) \
             ORDER BY created_at DESC, id DESC LIMIT $3"
        ))
        .bind(company_id.as_uuid())
        .bind(scope_filter(scope))
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_movements", e))?;
        rows.iter().map(movement_from_row).collect()
    }

    async fn list_item_movements(&self, company_id: CompanyId, item_id: ItemId) -> StoreResult<Vec<Movement>> {
        let rows = sqlx::query(&format!(
            "SELECT {MOVEMENT_COLUMNS} FROM inventory_movements \
             WHERE company_id = $1 AND item_id = $2 \
             ORDER BY created_at DESC, id DESC"
        ))
        .bind(company_id.as_uuid())
        .bind(item_id.as_uuid())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_item_movements", e))?;
        rows.iter().map(movement_from_row).collect()
    }
}

async fn insert_user_row(conn: &mut PgConnection, user: &UserAccount, password_hash: &str) -> StoreResult<()> {
    sqlx::query(
        r#"
        INSERT INTO users (id, company_id, email, username, full_name, is_admin, password_hash, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        "#,
    )
    .bind(user.id.as_uuid())
    .bind(user.company_id.as_uuid())
    .bind(&user.email)
    .bind(&user.username)
    .bind(&user.full_name)
    .bind(user.is_admin)
    .bind(password_hash)
    .bind(user.created_at)
    .execute(&mut *conn)
    .await
    .map_err(|e| map_sqlx_error("insert_user", e))?;
    Ok(())
}

async fn insert_movement(tx: &mut sqlx::Transaction<'_, sqlx::Postgres>, movement: &Movement) -> StoreResult<()> {
    sqlx::query(&format!(
        "INSERT INTO inventory_movements ({MOVEMENT_COLUMNS}) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)"
    ))
    .bind(movement.id.as_uuid())
    .bind(movement.company_id.as_uuid())
    .bind(movement.warehouse_id.as_uuid())
    .bind(movement.item_id.as_uuid())
    .bind(&movement.item_code)
    .bind(&movement.item_name)
    .bind(movement.kind.as_str())
    .bind(movement.quantity_before)
    .bind(movement.quantity_change)
    .bind(movement.quantity_after)
    .bind(&movement.description)
    .bind(movement.created_at)
    .bind(movement.created_by.map(|u| *u.as_uuid()))
    .execute(&mut **tx)
    .await
    .map_err(|e| map_sqlx_error("insert_movement", e))?;
    Ok(())
}

// -------------------------
// Row decoding
// -------------------------

fn decode_error(err: sqlx::Error) -> StoreError {
    StoreError::Decode(err.to_string())
}

fn company_from_row(row: &PgRow) -> StoreResult<Company> {
    Ok(Company {
        id: CompanyId::from_uuid(row.try_get("id").map_err(decode_error)?),
        name: row.try_get("name").map_err(decode_error)?,
        tax_id: row.try_get("tax_id").map_err(decode_error)?,
        address: row.try_get("address").map_err(decode_error)?,
        phone: row.try_get("phone").map_err(decode_error)?,
        created_at: row.try_get("created_at").map_err(decode_error)?,
    })
}

fn user_from_row(row: &PgRow) -> StoreResult<UserAccount> {
    Ok(UserAccount {
        id: UserId::from_uuid(row.try_get("id").map_err(decode_error)?),
        company_id: CompanyId::from_uuid(row.try_get("company_id").map_err(decode_error)?),
        email: row.try_get("email").map_err(decode_error)?,
        username: row.try_get("username").map_err(decode_error)?,
        full_name: row.try_get("full_name").map_err(decode_error)?,
        is_admin: row.try_get("is_admin").map_err(decode_error)?,
        created_at: row.try_get("created_at").map_err(decode_error)?,
    })
}

fn warehouse_from_row(row: &PgRow) -> StoreResult<Warehouse> {
    Ok(Warehouse {
        id: WarehouseId::from_uuid(row.try_get("id").map_err(decode_error)?),
        company_id: CompanyId::from_uuid(row.try_get("company_id").map_err(decode_error)?),
        name: row.try_get("name").map_err(decode_error)?,
        location: row.try_get("location").map_err(decode_error)?,
        manager: row.try_get("manager").map_err(decode_error)?,
        phone: row.try_get("phone").map_err(decode_error)?,
        created_at: row.try_get("created_at").map_err(decode_error)?,
    })
}

fn item_from_row(row: &PgRow) -> StoreResult<InventoryItem> {
    let cents: i64 = row.try_get("price_cents").map_err(decode_error)?;
    let created_by: Option<Uuid> = row.try_get("created_by").map_err(decode_error)?;
    Ok(InventoryItem {
        id: ItemId::from_uuid(row.try_get("id").map_err(decode_error)?),
        company_id: CompanyId::from_uuid(row.try_get("company_id").map_err(decode_error)?),
        warehouse_id: WarehouseId::from_uuid(row.try_get("warehouse_id").map_err(decode_error)?),
        code: row.try_get("code").map_err(decode_error)?,
        name: row.try_get("name").map_err(decode_error)?,
        price: Price::from_cents(cents).map_err(|e| StoreError::Decode(e.to_string()))?,
        quantity_available: row.try_get("quantity_available").map_err(decode_error)?,
        quantity_initial_today: row.try_get("quantity_initial_today").map_err(decode_error)?,
        quantity_used_today: row.try_get("quantity_used_today").map_err(decode_error)?,
        day_started_at: row.try_get("day_started_at").map_err(decode_error)?,
        created_at: row.try_get("created_at").map_err(decode_error)?,
        updated_at: row.try_get("updated_at").map_err(decode_error)?,
        created_by: created_by.map(UserId::from_uuid),
        version: row.try_get("version").map_err(decode_error)?,
    })
}

fn movement_from_row(row: &PgRow) -> StoreResult<Movement> {
    let kind: String = row.try_get("movement_type").map_err(decode_error)?;
    let created_by: Option<Uuid> = row.try_get("created_by").map_err(decode_error)?;
    Ok(Movement {
        id: MovementId::from_uuid(row.try_get("id").map_err(decode_error)?),
        company_id: CompanyId::from_uuid(row.try_get("company_id").map_err(decode_error)?),
        warehouse_id: WarehouseId::from_uuid(row.try_get("warehouse_id").map_err(decode_error)?),
        item_id: ItemId::from_uuid(row.try_get("item_id").map_err(decode_error)?),
        item_code: row.try_get("item_code").map_err(decode_error)?,
        item_name: row.try_get("item_name").map_err(decode_error)?,
        kind: kind
            .parse::<MovementKind>()
            .map_err(|e| StoreError::Decode(e.to_string()))?,
        quantity_before: row.try_get("quantity_before").map_err(decode_error)?,
        quantity_change: row.try_get("quantity_change").map_err(decode_error)?,
        quantity_after: row.try_get("quantity_after").map_err(decode_error)?,
        description: row.try_get("description").map_err(decode_error)?,
        created_at: row.try_get("created_at").map_err(decode_error)?,
        created_by: created_by.map(UserId::from_uuid),
    })
}

/// Map SQLx errors to StoreError.
fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());
            match db_err.code().as_deref() {
                Some("23505") => StoreError::Conflict(msg),
                _ => StoreError::Backend(msg),
            }
        }
        sqlx::Error::PoolClosed => StoreError::Backend(format!("connection pool closed in {operation}")),
        sqlx::Error::ColumnDecode { .. } | sqlx::Error::ColumnNotFound(_) => {
            StoreError::Decode(format!("{operation}: {err}"))
        }
        _ => StoreError::Backend(format!("sqlx error in {operation}: {err}")),
    }
}
