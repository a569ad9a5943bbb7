//! Application services: the use cases behind every API endpoint.
//!
//! `InventoryService` composes an [`InventoryStore`] with the pure domain rules
//! from `stockroom-inventory`, `stockroom-auth` and `stockroom-reports`. It owns
//! the checks that need storage (duplicate codes/names, "only warehouse",
//! "setup already done") and the daily reset that runs before stock is read.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use stockroom_auth::{NewUser, Principal, UserAccount, hash_password, verify_password};
use stockroom_core::{CompanyId, ItemId, UserId, WarehouseId};
use stockroom_inventory::{
    BusinessCalendar, Company, CompanyPatch, InventoryItem, InventorySummary, ItemPatch, Movement,
    NewCompany, NewItem, NewWarehouse, Warehouse, WarehousePatch, WarehouseScope, usage_in_period,
};
use stockroom_reports::{
    CSV_CONTENT_TYPE, ImportReport, PDF_CONTENT_TYPE, ReportInput, RowError, WORD_CONTENT_TYPE, XLSX_CONTENT_TYPE,
    csv_export, dated_filename, html, parse_csv, pdf, xlsx,
};

use crate::store::{InventoryStore, StoreError};

mod error;

pub use error::ServiceError;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Upper bound for movement listings, whatever the caller asks for.
pub const MAX_MOVEMENT_LIMIT: usize = 1000;

/// How many times an item write is re-read and re-applied after losing a
/// race before giving up with `Conflict`.
const MAX_WRITE_ATTEMPTS: u32 = 8;

/// Source of "now". Swapped for a fixed clock in tests.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ServiceConfig {
    pub calendar: BusinessCalendar,
    /// Default page size for movement listings.
    pub movement_list_limit: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            calendar: BusinessCalendar::utc(),
            movement_list_limit: 100,
        }
    }
}

/// Direction of a user-registered stock movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MovementDirection {
    Entry,
    Exit,
}

#[derive(Debug, Clone)]
pub struct MovementRequest {
    pub direction: MovementDirection,
    pub quantity: i64,
    /// Backdated business date; recorded at local midnight.
    pub date: Option<NaiveDate>,
    pub description: Option<String>,
}

/// Exits per item over a date range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemUsage {
    pub item_id: ItemId,
    pub code: String,
    pub name: String,
    pub used: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    /// Re-importable `Código,Nombre,Cantidad,Precio`.
    SimpleCsv,
    /// Full CSV with counters and warehouse.
    Csv,
    Doc,
    Pdf,
    Xlsx,
}

/// A rendered download.
#[derive(Debug, Clone)]
pub struct ReportFile {
    pub filename: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

/// What an item mutation wants persisted.
enum ItemWrite {
    Skip,
    /// Counters only (daily reset).
    State,
    /// Item state plus the movement that explains it.
    Movement(Movement),
}

/// Runs Argon2 on the blocking pool.
async fn hash_off_runtime(password: String) -> ServiceResult<String> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| ServiceError::Internal(format!("password hashing task failed: {e}")))?
        .map_err(ServiceError::from)
}

async fn verify_off_runtime(password: String, hash: String) -> ServiceResult<bool> {
    tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map_err(|e| ServiceError::Internal(format!("password check task failed: {e}")))?
        .map_err(ServiceError::from)
}

/// Items, movements and warehouse names assembled for a report.
#[derive(Debug, Clone)]
pub struct ReportData {
    pub items: Vec<InventoryItem>,
    pub movements: Vec<Movement>,
    pub warehouse_names: HashMap<WarehouseId, String>,
    pub generated_at: DateTime<Utc>,
}

pub struct InventoryService {
    store: Arc<dyn InventoryStore>,
    clock: Arc<dyn Clock>,
    config: ServiceConfig,
}

impl InventoryService {
    pub fn new(store: Arc<dyn InventoryStore>, config: ServiceConfig) -> Self {
        Self::with_clock(store, config, Arc::new(SystemClock))
    }

    pub fn with_clock(store: Arc<dyn InventoryStore>, config: ServiceConfig, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock, config }
    }

    pub fn calendar(&self) -> &BusinessCalendar {
        &self.config.calendar
    }

    fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    // -------------------------
    // Setup & login
    // -------------------------

    /// Create the first company and its administrator.
    ///
    /// Only allowed while no user exists at all.
    pub async fn setup(&self, company: NewCompany, admin: NewUser) -> ServiceResult<(Company, UserAccount)> {
        if self.store.count_users().await? > 0 {
            tracing::warn!("setup rejected: users already exist");
            return Err(ServiceError::Conflict("setup has already been completed".into()));
        }

        let now = self.now();
        let company = Company::create(company, now)?;
        let admin = NewUser { is_admin: true, ..admin }.validate()?;
        let hash = hash_off_runtime(admin.password.clone()).await?;
        let account = admin.into_account(company.id, now);

        // Fast path above; the store re-checks under its own lock.
        self.store
            .insert_first_admin(&company, &account, &hash)
            .await
            .inspect_err(|e| tracing::warn!(error = %e, "setup rejected at commit"))?;

        tracing::info!(company_id = %company.id, user_id = %account.id, "initial setup completed");
        Ok((company, account))
    }

    /// Check credentials; the caller mints the token.
    pub async fn login(&self, login: &str, password: &str) -> ServiceResult<UserAccount> {
        let Some(stored) = self.store.find_user_by_login(login).await? else {
            tracing::warn!("login failed: unknown user");
            return Err(ServiceError::InvalidCredentials);
        };
        if !verify_off_runtime(password.to_string(), stored.password_hash).await? {
            tracing::warn!(user_id = %stored.account.id, "login failed: wrong password");
            return Err(ServiceError::InvalidCredentials);
        }
        tracing::info!(user_id = %stored.account.id, "user logged in");
        Ok(stored.account)
    }

    // -------------------------
    // Users
    // -------------------------

    pub async fn current_user(&self, principal: &Principal) -> ServiceResult<UserAccount> {
        self.store
            .get_user(principal.company_id, principal.user_id)
            .await?
            .ok_or(ServiceError::NotFound)
    }

    pub async fn list_users(&self, principal: &Principal) -> ServiceResult<Vec<UserAccount>> {
        Ok(self.store.list_users(principal.company_id).await?)
    }

    pub async fn create_user(&self, principal: &Principal, input: NewUser) -> ServiceResult<UserAccount> {
        let input = input.validate()?;
        let hash = hash_off_runtime(input.password.clone()).await?;
        let account = input.into_account(principal.company_id, self.now());

        self.store.insert_user(&account, &hash).await?;
        tracing::info!(
            company_id = %principal.company_id,
            user_id = %account.id,
            is_admin = account.is_admin,
            "user created"
        );
        Ok(account)
    }

    pub async fn delete_user(&self, principal: &Principal, user_id: UserId) -> ServiceResult<()> {
        if user_id == principal.user_id {
            return Err(ServiceError::Validation("you cannot delete your own account".into()));
        }
        if !self.store.delete_user(principal.company_id, user_id).await? {
            return Err(ServiceError::NotFound);
        }
        tracing::info!(company_id = %principal.company_id, %user_id, "user deleted");
        Ok(())
    }

    // -------------------------
    // Company
    // -------------------------

    pub async fn company(&self, principal: &Principal) -> ServiceResult<Company> {
        self.store
            .get_company(principal.company_id)
            .await?
            .ok_or(ServiceError::NotFound)
    }

    pub async fn update_company(&self, principal: &Principal, patch: CompanyPatch) -> ServiceResult<Company> {
        let mut company = self.company(principal).await?;
        company.apply(patch)?;
        self.store.update_company(&company).await?;
        tracing::info!(company_id = %company.id, "company updated");
        Ok(company)
    }

    // -------------------------
    // Warehouses
    // -------------------------

    pub async fn list_warehouses(&self, principal: &Principal) -> ServiceResult<Vec<Warehouse>> {
        Ok(self.store.list_warehouses(principal.company_id).await?)
    }

    pub async fn warehouse(&self, principal: &Principal, warehouse_id: WarehouseId) -> ServiceResult<Warehouse> {
        self.store
            .get_warehouse(principal.company_id, warehouse_id)
            .await?
            .ok_or(ServiceError::NotFound)
    }

    /// Create a warehouse. It becomes the creator's selection if they had none.
    pub async fn create_warehouse(&self, principal: &Principal, input: NewWarehouse) -> ServiceResult<Warehouse> {
        let warehouse = Warehouse::create(principal.company_id, input, self.now())?;
        self.store.insert_warehouse(&warehouse).await?;

        let selected = self
            .store
            .selected_warehouse(principal.company_id, principal.user_id)
            .await?;
        if selected.is_none() {
            self.store
                .set_selected_warehouse(principal.company_id, principal.user_id, Some(warehouse.id))
                .await?;
        }

        tracing::info!(company_id = %principal.company_id, warehouse_id = %warehouse.id, "warehouse created");
        Ok(warehouse)
    }

    pub async fn update_warehouse(
        &self,
        principal: &Principal,
        warehouse_id: WarehouseId,
        patch: WarehousePatch,
    ) -> ServiceResult<Warehouse> {
        let mut warehouse = self.warehouse(principal, warehouse_id).await?;
        warehouse.apply(patch)?;
        self.store.update_warehouse(&warehouse).await?;
        tracing::info!(company_id = %principal.company_id, %warehouse_id, "warehouse updated");
        Ok(warehouse)
    }

    /// Delete a warehouse with all its stock. The last warehouse cannot go.
    pub async fn delete_warehouse(&self, principal: &Principal, warehouse_id: WarehouseId) -> ServiceResult<()> {
        let warehouses = self.store.list_warehouses(principal.company_id).await?;
        if !warehouses.iter().any(|w| w.id == warehouse_id) {
            return Err(ServiceError::NotFound);
        }
        if warehouses.len() <= 1 {
            tracing::warn!(company_id = %principal.company_id, %warehouse_id, "refused to delete the only warehouse");
            return Err(ServiceError::Validation("cannot delete the only warehouse".into()));
        }

        self.store.delete_warehouse(principal.company_id, warehouse_id).await?;
        tracing::info!(company_id = %principal.company_id, %warehouse_id, "warehouse deleted");
        Ok(())
    }

    pub async fn select_warehouse(&self, principal: &Principal, warehouse_id: WarehouseId) -> ServiceResult<Warehouse> {
        let warehouse = self.warehouse(principal, warehouse_id).await?;
        self.store
            .set_selected_warehouse(principal.company_id, principal.user_id, Some(warehouse_id))
            .await?;
        tracing::debug!(user_id = %principal.user_id, %warehouse_id, "warehouse selected");
        Ok(warehouse)
    }

    /// The caller's selected warehouse, falling back to the first one by name.
    pub async fn selected_warehouse(&self, principal: &Principal) -> ServiceResult<Option<Warehouse>> {
        let selected = self
            .store
            .selected_warehouse(principal.company_id, principal.user_id)
            .await?;
        if let Some(id) = selected {
            if let Some(warehouse) = self.store.get_warehouse(principal.company_id, id).await? {
                return Ok(Some(warehouse));
            }
        }
        Ok(self
            .store
            .list_warehouses(principal.company_id)
            .await?
            .into_iter()
            .next())
    }

    /// Resolve an optional request scope: explicit scopes are checked against
    /// the company, a missing one means the caller's selected warehouse.
    pub async fn resolve_scope(
        &self,
        principal: &Principal,
        requested: Option<WarehouseScope>,
    ) -> ServiceResult<WarehouseScope> {
        match requested {
            Some(WarehouseScope::All) => Ok(WarehouseScope::All),
            Some(WarehouseScope::One(id)) => {
                self.warehouse(principal, id).await?;
                Ok(WarehouseScope::One(id))
            }
            None => match self.selected_warehouse(principal).await? {
                Some(w) => Ok(WarehouseScope::One(w.id)),
                None => Err(ServiceError::Validation("create a warehouse first".into())),
            },
        }
    }

    // -------------------------
    // Items
    // -------------------------

    /// Load `item_id`, let `mutate` change it, and persist the result.
    ///
    /// The write only lands if nobody else wrote the item since it was read;
    /// otherwise the item is re-read and `mutate` runs again on fresh state.
    /// An item whose business day is over is rebaselined before `mutate`
    /// sees it.
    async fn write_item<F>(
        &self,
        company_id: CompanyId,
        item_id: ItemId,
        mut mutate: F,
    ) -> ServiceResult<(InventoryItem, Option<Movement>)>
    where
        F: FnMut(&mut InventoryItem, DateTime<Utc>) -> ServiceResult<ItemWrite>,
    {
        let calendar = &self.config.calendar;
        let mut attempt = 0;
        loop {
            attempt += 1;
            let mut item = self
                .store
                .get_item(company_id, item_id)
                .await?
                .ok_or(ServiceError::NotFound)?;
            let now = self.now();

            let reset = item.needs_daily_reset(calendar, now);
            if reset {
                item.reset_day(now);
            }
            let movement = match mutate(&mut item, now)? {
                ItemWrite::Skip if !reset => return Ok((item, None)),
                ItemWrite::Skip | ItemWrite::State => None,
                ItemWrite::Movement(m) => Some(m),
            };

            match self.store.update_item(&item, movement.as_ref()).await {
                Ok(()) => {
                    item.version += 1;
                    if reset {
                        tracing::debug!(%item_id, "daily counters reset");
                    }
                    return Ok((item, movement));
                }
                Err(StoreError::Concurrency(msg)) if attempt < MAX_WRITE_ATTEMPTS => {
                    tracing::debug!(%item_id, attempt, %msg, "item changed underneath, retrying");
                }
                Err(StoreError::Concurrency(msg)) => {
                    tracing::warn!(%item_id, attempt, %msg, "item write kept losing races");
                    return Err(ServiceError::Conflict(
                        "the item is being modified by someone else, try again".into(),
                    ));
                }
                Err(other) => return Err(other.into()),
            }
        }
    }

    /// Rebaseline the daily counters of `item` if its day is over.
    async fn refresh(&self, item: InventoryItem, now: DateTime<Utc>) -> ServiceResult<InventoryItem> {
        if !item.needs_daily_reset(&self.config.calendar, now) {
            return Ok(item);
        }
        let (item, _) = self
            .write_item(item.company_id, item.id, |_, _| Ok(ItemWrite::Skip))
            .await?;
        Ok(item)
    }

    /// Items in scope ordered by name, with the daily reset applied first.
    pub async fn list_items(
        &self,
        principal: &Principal,
        scope: WarehouseScope,
        search: Option<&str>,
    ) -> ServiceResult<Vec<InventoryItem>> {
        let now = self.now();
        let items = self.store.list_items(principal.company_id, scope).await?;

        let mut refreshed = Vec::with_capacity(items.len());
        for item in items {
            refreshed.push(self.refresh(item, now).await?);
        }

        if let Some(term) = search.map(str::trim).filter(|t| !t.is_empty()) {
            refreshed.retain(|item| item.matches(term));
        }
        Ok(refreshed)
    }

    pub async fn item(&self, principal: &Principal, item_id: ItemId) -> ServiceResult<InventoryItem> {
        let item = self
            .store
            .get_item(principal.company_id, item_id)
            .await?
            .ok_or(ServiceError::NotFound)?;
        self.refresh(item, self.now()).await
    }

    async fn ensure_code_free(
        &self,
        principal: &Principal,
        warehouse_id: WarehouseId,
        code: &str,
        except: Option<ItemId>,
    ) -> ServiceResult<()> {
        let existing = self
            .store
            .find_item_by_code(principal.company_id, warehouse_id, code)
            .await?;
        match existing {
            Some(other) if Some(other.id) != except => Err(ServiceError::Conflict(format!(
                "code \"{}\" already exists in this warehouse",
                code.trim()
            ))),
            _ => Ok(()),
        }
    }

    async fn ensure_name_free(
        &self,
        principal: &Principal,
        warehouse_id: WarehouseId,
        name: &str,
        except: Option<ItemId>,
    ) -> ServiceResult<()> {
        let existing = self
            .store
            .find_item_by_name(principal.company_id, warehouse_id, name)
            .await?;
        match existing {
            Some(other) if Some(other.id) != except => Err(ServiceError::Conflict(format!(
                "name \"{}\" already exists in this warehouse",
                name.trim()
            ))),
            _ => Ok(()),
        }
    }

    async fn insert_new_item(
        &self,
        principal: &Principal,
        warehouse_id: WarehouseId,
        input: NewItem,
        description: Option<String>,
    ) -> ServiceResult<(InventoryItem, Movement)> {
        let input = input.validate()?;
        self.ensure_code_free(principal, warehouse_id, &input.code, None).await?;
        self.ensure_name_free(principal, warehouse_id, &input.name, None).await?;

        let now = self.now();
        let (item, change) = InventoryItem::create(
            principal.company_id,
            warehouse_id,
            input,
            Some(principal.user_id),
            &self.config.calendar,
            now,
        )?;
        let movement = Movement::record(&item, change, description, item.created_at, Some(principal.user_id));
        self.store.insert_item(&item, &movement).await?;
        Ok((item, movement))
    }

    pub async fn create_item(
        &self,
        principal: &Principal,
        scope: WarehouseScope,
        input: NewItem,
    ) -> ServiceResult<InventoryItem> {
        let warehouse_id = scope.require_specific()?;
        self.warehouse(principal, warehouse_id).await?;

        let (item, _) = self.insert_new_item(principal, warehouse_id, input, None).await?;
        tracing::info!(
            company_id = %principal.company_id,
            %warehouse_id,
            item_id = %item.id,
            code = %item.code,
            "item created"
        );
        Ok(item)
    }

    /// Edit an item. A quantity change is recorded as an adjustment; a
    /// details-only change as an edit; a no-op records nothing.
    pub async fn update_item(
        &self,
        principal: &Principal,
        item_id: ItemId,
        patch: ItemPatch,
    ) -> ServiceResult<InventoryItem> {
        let item = self.item(principal, item_id).await?;
        let patch = patch.validate()?;

        if let Some(code) = patch.code_change(&item) {
            self.ensure_code_free(principal, item.warehouse_id, code, Some(item.id)).await?;
        }
        if let Some(name) = patch.name_change(&item) {
            self.ensure_name_free(principal, item.warehouse_id, name, Some(item.id)).await?;
        }

        let user_id = principal.user_id;
        let (item, movement) = self
            .write_item(principal.company_id, item.id, |item, now| {
                Ok(match item.apply_edit(patch.clone(), now)? {
                    Some(change) => ItemWrite::Movement(Movement::record(item, change, None, now, Some(user_id))),
                    None => ItemWrite::Skip,
                })
            })
            .await?;

        if let Some(movement) = movement {
            tracing::info!(item_id = %item.id, kind = %movement.kind, "item updated");
        }
        Ok(item)
    }

    pub async fn delete_item(&self, principal: &Principal, item_id: ItemId) -> ServiceResult<()> {
        if !self.store.delete_item(principal.company_id, item_id).await? {
            return Err(ServiceError::NotFound);
        }
        tracing::info!(company_id = %principal.company_id, %item_id, "item deleted");
        Ok(())
    }

    // -------------------------
    // Movements
    // -------------------------

    pub async fn register_movement(
        &self,
        principal: &Principal,
        item_id: ItemId,
        request: MovementRequest,
    ) -> ServiceResult<(InventoryItem, Movement)> {
        let calendar = self.config.calendar;
        let user_id = principal.user_id;
        let (item, movement) = self
            .write_item(principal.company_id, item_id, |item, now| {
                let change = match request.direction {
                    MovementDirection::Entry => item.apply_entry(request.quantity, now),
                    MovementDirection::Exit => item.apply_exit(request.quantity, now),
                };
                let change = change.inspect_err(|e| {
                    tracing::warn!(%item_id, quantity = request.quantity, error = %e, "movement rejected");
                })?;
                let recorded_at = request.date.map(|d| calendar.start_of(d)).unwrap_or(now);
                Ok(ItemWrite::Movement(Movement::record(
                    item,
                    change,
                    request.description.clone(),
                    recorded_at,
                    Some(user_id),
                )))
            })
            .await?;
        let movement = movement.ok_or_else(|| ServiceError::Internal("movement was not recorded".into()))?;

        tracing::info!(
            %item_id,
            kind = %movement.kind,
            before = movement.quantity_before,
            after = movement.quantity_after,
            "movement registered"
        );
        Ok((item, movement))
    }

    /// Newest first. `limit` defaults to the configured page size and is
    /// capped at [`MAX_MOVEMENT_LIMIT`].
    pub async fn list_movements(
        &self,
        principal: &Principal,
        scope: WarehouseScope,
        limit: Option<usize>,
    ) -> ServiceResult<Vec<Movement>> {
        let limit = limit
            .unwrap_or(self.config.movement_list_limit)
            .clamp(1, MAX_MOVEMENT_LIMIT);
        Ok(self.store.list_movements(principal.company_id, scope, limit).await?)
    }

    pub async fn item_movements(&self, principal: &Principal, item_id: ItemId) -> ServiceResult<Vec<Movement>> {
        if self.store.get_item(principal.company_id, item_id).await?.is_none() {
            return Err(ServiceError::NotFound);
        }
        Ok(self.store.list_item_movements(principal.company_id, item_id).await?)
    }

    /// Exits per item between `from` and `to` (business dates, inclusive).
    /// Defaults to the current month so far.
    pub async fn usage(
        &self,
        principal: &Principal,
        scope: WarehouseScope,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> ServiceResult<Vec<ItemUsage>> {
        let now = self.now();
        let calendar = &self.config.calendar;
        let from = from.unwrap_or_else(|| calendar.month_start(now));
        let to = to.unwrap_or_else(|| calendar.date_of(now));
        if from > to {
            return Err(ServiceError::Validation("period start is after its end".into()));
        }

        let items = self.store.list_items(principal.company_id, scope).await?;
        let movements = self
            .store
            .list_movements(principal.company_id, scope, usize::MAX)
            .await?;

        Ok(items
            .into_iter()
            .map(|item| ItemUsage {
                used: usage_in_period(&movements, item.id, from, to, calendar),
                item_id: item.id,
                code: item.code,
                name: item.name,
            })
            .collect())
    }

    pub async fn summary(&self, principal: &Principal, scope: WarehouseScope) -> ServiceResult<InventorySummary> {
        let items = self.list_items(principal, scope, None).await?;
        Ok(InventorySummary::of(&items))
    }

    /// Rebaseline every item of the company now, whatever day it last started.
    pub async fn daily_reset(&self, principal: &Principal) -> ServiceResult<usize> {
        let now = self.now();
        let items = self
            .store
            .list_items(principal.company_id, WarehouseScope::All)
            .await?;
        let mut count = 0;
        for item in items {
            let forced = self
                .write_item(principal.company_id, item.id, |item, _| {
                    item.reset_day(now);
                    Ok(ItemWrite::State)
                })
                .await;
            match forced {
                Ok(_) => count += 1,
                // Deleted since the listing.
                Err(ServiceError::NotFound) => {}
                Err(e) => return Err(e),
            }
        }
        tracing::info!(company_id = %principal.company_id, items = count, "daily counters reset");
        Ok(count)
    }

    // -------------------------
    // Import & reports
    // -------------------------

    /// Import CSV rows into one warehouse. Rows clashing with existing items
    /// (or with earlier rows of the same file) are reported, not imported.
    pub async fn import_csv(
        &self,
        principal: &Principal,
        scope: WarehouseScope,
        text: &str,
    ) -> ServiceResult<ImportReport> {
        let warehouse_id = scope.require_specific()?;
        self.warehouse(principal, warehouse_id).await?;

        let parsed = parse_csv(text)?;
        let mut report = ImportReport {
            imported: 0,
            errors: parsed.errors,
        };

        for row in parsed.rows {
            let description = Some(format!("Producto importado: {}", row.name));
            let input = NewItem {
                code: row.code,
                name: row.name,
                quantity: row.quantity,
                price: row.price,
                entry_date: None,
            };
            match self.insert_new_item(principal, warehouse_id, input, description).await {
                Ok(_) => report.imported += 1,
                Err(
                    ServiceError::Conflict(msg) | ServiceError::Validation(msg) | ServiceError::InvariantViolation(msg),
                ) => report.errors.push(RowError::new(row.line, msg)),
                Err(other) => return Err(other),
            }
        }
        report.errors.sort_by_key(|e| e.line);

        tracing::info!(
            company_id = %principal.company_id,
            %warehouse_id,
            imported = report.imported,
            errors = report.errors.len(),
            "csv import finished"
        );
        Ok(report)
    }

    pub async fn report_data(&self, principal: &Principal, scope: WarehouseScope) -> ServiceResult<ReportData> {
        let items = self.list_items(principal, scope, None).await?;
        let movements = self
            .list_movements(principal, scope, Some(self.config.movement_list_limit))
            .await?;
        let warehouse_names = self
            .store
            .list_warehouses(principal.company_id)
            .await?
            .into_iter()
            .map(|w| (w.id, w.name))
            .collect();
        Ok(ReportData {
            items,
            movements,
            warehouse_names,
            generated_at: self.now(),
        })
    }

    pub async fn render_report(
        &self,
        principal: &Principal,
        scope: WarehouseScope,
        format: ReportFormat,
    ) -> ServiceResult<ReportFile> {
        let data = self.report_data(principal, scope).await?;
        let input = ReportInput {
            items: &data.items,
            movements: &data.movements,
            warehouse_names: &data.warehouse_names,
            calendar: self.config.calendar,
            generated_at: data.generated_at,
        };
        let today = input.generated_on();

        let file = match format {
            ReportFormat::SimpleCsv => ReportFile {
                filename: dated_filename("inventario", today, "csv"),
                content_type: CSV_CONTENT_TYPE,
                bytes: csv_export::simple_csv(input.items)?.into_bytes(),
            },
            ReportFormat::Csv => ReportFile {
                filename: dated_filename("inventario", today, "csv"),
                content_type: CSV_CONTENT_TYPE,
                bytes: csv_export::full_csv(&input)?.into_bytes(),
            },
            ReportFormat::Doc => ReportFile {
                filename: dated_filename("informe_inventario", today, "doc"),
                content_type: WORD_CONTENT_TYPE,
                bytes: html::render(&input).into_bytes(),
            },
            ReportFormat::Pdf => ReportFile {
                filename: dated_filename("informe_inventario", today, "pdf"),
                content_type: PDF_CONTENT_TYPE,
                bytes: pdf::render(&input)?,
            },
            ReportFormat::Xlsx => ReportFile {
                filename: dated_filename("inventario", today, "xlsx"),
                content_type: XLSX_CONTENT_TYPE,
                bytes: xlsx::render(&input)?,
            },
        };

        tracing::info!(
            company_id = %principal.company_id,
            filename = %file.filename,
            bytes = file.bytes.len(),
            "report rendered"
        );
        Ok(file)
    }
}

#[cfg(test)]
mod tests;
