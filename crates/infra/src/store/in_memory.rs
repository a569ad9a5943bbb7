use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use stockroom_auth::UserAccount;
use stockroom_core::{CompanyId, ItemId, UserId, WarehouseId};
use stockroom_inventory::item::{same_code, same_name};
use stockroom_inventory::movement::sort_newest_first;
use stockroom_inventory::{Company, InventoryItem, Movement, Warehouse, WarehouseScope};

use super::{InventoryStore, StoreError, StoreResult, StoredUser};

#[derive(Debug, Default)]
struct State {
    companies: HashMap<CompanyId, Company>,
    users: HashMap<UserId, StoredUser>,
    selections: HashMap<UserId, WarehouseId>,
    warehouses: HashMap<WarehouseId, Warehouse>,
    items: HashMap<ItemId, InventoryItem>,
    movements: Vec<Movement>,
}

impl State {
    fn check_item_unique(&self, item: &InventoryItem) -> StoreResult<()> {
        let clash = self.items.values().find(|other| {
            other.id != item.id
                && other.warehouse_id == item.warehouse_id
                && (same_code(&other.code, &item.code) || same_name(&other.name, &item.name))
        });
        match clash {
            Some(other) => Err(StoreError::Conflict(format!(
                "item {} / {} already exists in warehouse",
                other.code, other.name
            ))),
            None => Ok(()),
        }
    }
}

/// In-memory store for tests/dev.
///
/// Mirrors the constraints of the SQL schema (unique logins, unique item
/// code/name per warehouse, cascading deletes).
#[derive(Debug, Default)]
pub struct InMemoryInventoryStore {
    inner: RwLock<State>,
}

impl InMemoryInventoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, State>> {
        self.inner
            .read()
            .map_err(|_| StoreError::Backend("in-memory store lock poisoned".into()))
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, State>> {
        self.inner
            .write()
            .map_err(|_| StoreError::Backend("in-memory store lock poisoned".into()))
    }
}

#[async_trait]
impl InventoryStore for InMemoryInventoryStore {
    async fn count_users(&self) -> StoreResult<u64> {
        Ok(self.read()?.users.len() as u64)
    }

    async fn insert_first_admin(&self, company: &Company, admin: &UserAccount, password_hash: &str) -> StoreResult<()> {
        let mut state = self.write()?;
        if !state.users.is_empty() {
            return Err(StoreError::Conflict("setup has already been completed".into()));
        }
        state.companies.insert(company.id, company.clone());
        state.users.insert(
            admin.id,
            StoredUser {
                account: admin.clone(),
                password_hash: password_hash.to_string(),
            },
        );
        Ok(())
    }

    async fn get_company(&self, company_id: CompanyId) -> StoreResult<Option<Company>> {
        Ok(self.read()?.companies.get(&company_id).cloned())
    }

    async fn update_company(&self, company: &Company) -> StoreResult<()> {
        let mut state = self.write()?;
        if let Some(slot) = state.companies.get_mut(&company.id) {
            *slot = company.clone();
        }
        Ok(())
    }

    async fn insert_user(&self, user: &UserAccount, password_hash: &str) -> StoreResult<()> {
        let mut state = self.write()?;
        let taken = state.users.values().any(|u| {
            u.account.email.eq_ignore_ascii_case(&user.email) || u.account.username == user.username
        });
        if taken {
            return Err(StoreError::Conflict("email or username already registered".into()));
        }
        state.users.insert(
            user.id,
            StoredUser {
                account: user.clone(),
                password_hash: password_hash.to_string(),
            },
        );
        Ok(())
    }

    async fn find_user_by_login(&self, login: &str) -> StoreResult<Option<StoredUser>> {
        let state = self.read()?;
        Ok(state
            .users
            .values()
            .find(|u| u.account.matches_login(login))
            .cloned())
    }

    async fn get_user(&self, company_id: CompanyId, user_id: UserId) -> StoreResult<Option<UserAccount>> {
        let state = self.read()?;
        Ok(state
            .users
            .get(&user_id)
            .filter(|u| u.account.company_id == company_id)
            .map(|u| u.account.clone()))
    }

    async fn list_users(&self, company_id: CompanyId) -> StoreResult<Vec<UserAccount>> {
        let state = self.read()?;
        let mut users: Vec<UserAccount> = state
            .users
            .values()
            .filter(|u| u.account.company_id == company_id)
            .map(|u| u.account.clone())
            .collect();
        users.sort_by_key(|u| u.created_at);
        Ok(users)
    }

    async fn delete_user(&self, company_id: CompanyId, user_id: UserId) -> StoreResult<bool> {
        let mut state = self.write()?;
        let owned = state
            .users
            .get(&user_id)
            .is_some_and(|u| u.account.company_id == company_id);
        if owned {
            state.users.remove(&user_id);
            state.selections.remove(&user_id);
        }
        Ok(owned)
    }

    async fn selected_warehouse(&self, company_id: CompanyId, user_id: UserId) -> StoreResult<Option<WarehouseId>> {
        let state = self.read()?;
        Ok(state
            .selections
            .get(&user_id)
            .copied()
            .filter(|w| state.warehouses.get(w).is_some_and(|w| w.company_id == company_id)))
    }

    async fn set_selected_warehouse(
        &self,
        _company_id: CompanyId,
        user_id: UserId,
        warehouse_id: Option<WarehouseId>,
    ) -> StoreResult<()> {
        let mut state = self.write()?;
        match warehouse_id {
            Some(w) => state.selections.insert(user_id, w),
            None => state.selections.remove(&user_id),
        };
        Ok(())
    }

    async fn insert_warehouse(&self, warehouse: &Warehouse) -> StoreResult<()> {
        self.write()?.warehouses.insert(warehouse.id, warehouse.clone());
        Ok(())
    }

    async fn get_warehouse(&self, company_id: CompanyId, warehouse_id: WarehouseId) -> StoreResult<Option<Warehouse>> {
        let state = self.read()?;
        Ok(state
            .warehouses
            .get(&warehouse_id)
            .filter(|w| w.company_id == company_id)
            .cloned())
    }

    async fn list_warehouses(&self, company_id: CompanyId) -> StoreResult<Vec<Warehouse>> {
        let state = self.read()?;
        let mut rows: Vec<Warehouse> = state
            .warehouses
            .values()
            .filter(|w| w.company_id == company_id)
            .cloned()
            .collect();
        rows.sort_by_key(|w| w.name.to_lowercase());
        Ok(rows)
    }

    async fn update_warehouse(&self, warehouse: &Warehouse) -> StoreResult<()> {
        let mut state = self.write()?;
        if let Some(slot) = state
            .warehouses
            .get_mut(&warehouse.id)
            .filter(|w| w.company_id == warehouse.company_id)
        {
            *slot = warehouse.clone();
        }
        Ok(())
    }

    async fn delete_warehouse(&self, company_id: CompanyId, warehouse_id: WarehouseId) -> StoreResult<bool> {
        let mut state = self.write()?;
        let owned = state
            .warehouses
            .get(&warehouse_id)
            .is_some_and(|w| w.company_id == company_id);
        if !owned {
            return Ok(false);
        }
        state.warehouses.remove(&warehouse_id);
        state.items.retain(|_, i| i.warehouse_id != warehouse_id);
        state.movements.retain(|m| m.warehouse_id != warehouse_id);
        state.selections.retain(|_, w| *w != warehouse_id);
        Ok(true)
    }

    async fn insert_item(&self, item: &InventoryItem, movement: &Movement) -> StoreResult<()> {
        let mut state = self.write()?;
        state.check_item_unique(item)?;
        state.items.insert(item.id, item.clone());
        state.movements.push(movement.clone());
        Ok(())
    }

    async fn get_item(&self, company_id: CompanyId, item_id: ItemId) -> StoreResult<Option<InventoryItem>> {
        let state = self.read()?;
        Ok(state
            .items
            .get(&item_id)
            .filter(|i| i.company_id == company_id)
            .cloned())
    }

    async fn list_items(&self, company_id: CompanyId, scope: WarehouseScope) -> StoreResult<Vec<InventoryItem>> {
        let state = self.read()?;
        let mut rows: Vec<InventoryItem> = state
            .items
            .values()
            .filter(|i| i.company_id == company_id && scope.includes(i.warehouse_id))
            .cloned()
            .collect();
        rows.sort_by_key(|i| i.name.to_lowercase());
        Ok(rows)
    }

    async fn update_item(&self, item: &InventoryItem, movement: Option<&Movement>) -> StoreResult<()> {
        let mut state = self.write()?;
        let current = state
            .items
            .get(&item.id)
            .filter(|i| i.company_id == item.company_id)
            .map(|i| i.version);
        match current {
            None => return Err(StoreError::Concurrency(format!("item {} no longer exists", item.id))),
            Some(version) if version != item.version => {
                return Err(StoreError::Concurrency(format!(
                    "item {} is at version {version}, write was based on {}",
                    item.id, item.version
                )));
            }
            Some(_) => {}
        }
        state.check_item_unique(item)?;
        state.items.insert(
            item.id,
            InventoryItem {
                version: item.version + 1,
                ..item.clone()
            },
        );
        if let Some(movement) = movement {
            state.movements.push(movement.clone());
        }
        Ok(())
    }

    async fn delete_item(&self, company_id: CompanyId, item_id: ItemId) -> StoreResult<bool> {
        let mut state = self.write()?;
        let owned = state
            .items
            .get(&item_id)
            .is_some_and(|i| i.company_id == company_id);
        if owned {
            state.items.remove(&item_id);
            state.movements.retain(|m| m.item_id != item_id);
        }
        Ok(owned)
    }

    async fn find_item_by_code(
        &self,
        company_id: CompanyId,
        warehouse_id: WarehouseId,
        code: &str,
    ) -> StoreResult<Option<InventoryItem>> {
        let state = self.read()?;
        Ok(state
            .items
            .values()
            .find(|i| i.company_id == company_id && i.warehouse_id == warehouse_id && same_code(&i.code, code))
            .cloned())
    }

    async fn find_item_by_name(
        &self,
        company_id: CompanyId,
        warehouse_id: WarehouseId,
        name: &str,
    ) -> StoreResult<Option<InventoryItem>> {
        let state = self.read()?;
        Ok(state
            .items
            .values()
            .find(|i| i.company_id == company_id && i.warehouse_id == warehouse_id && same_name(&i.name, name))
            .cloned())
    }

    async fn list_movements(
        &self,
        company_id: CompanyId,
        scope: WarehouseScope,
        limit: usize,
    ) -> StoreResult<Vec<Movement>> {
        let state = self.read()?;
        let mut rows: Vec<Movement> = state
            .movements
            .iter()
            .filter(|m| m.company_id == company_id && scope.includes(m.warehouse_id))
            .cloned()
            .collect();
        sort_newest_first(&mut rows);
        rows.truncate(limit);
        Ok(rows)
    }

    async fn list_item_movements(&self, company_id: CompanyId, item_id: ItemId) -> StoreResult<Vec<Movement>> {
        let state = self.read()?;
        let mut rows: Vec<Movement> = state
            .movements
            .iter()
            .filter(|m| m.company_id == company_id && m.item_id == item_id)
            .cloned()
            .collect();
        sort_newest_first(&mut rows);
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use stockroom_inventory::{BusinessCalendar, NewItem, NewWarehouse, Price};

    use super::*;

    fn warehouse(company_id: CompanyId, name: &str) -> Warehouse {
        let input = NewWarehouse {
            name: name.into(),
            ..NewWarehouse::default()
        };
        Warehouse::create(company_id, input, Utc::now()).unwrap()
    }

    fn item(warehouse: &Warehouse, code: &str, name: &str) -> (InventoryItem, Movement) {
        let input = NewItem {
            code: code.into(),
            name: name.into(),
            quantity: 5,
            price: Price::from_cents(100).unwrap(),
            entry_date: None,
        };
        let now = Utc::now();
        let (item, change) = InventoryItem::create(
            warehouse.company_id,
            warehouse.id,
            input,
            None,
            &BusinessCalendar::utc(),
            now,
        )
        .unwrap();
        let movement = Movement::record(&item, change, None, now, None);
        (item, movement)
    }

    #[tokio::test]
    async fn deleting_a_warehouse_cascades() {
        let store = InMemoryInventoryStore::new();
        let company = CompanyId::new();
        let user = UserId::new();
        let doomed = warehouse(company, "Norte");
        let kept = warehouse(company, "Sur");
        store.insert_warehouse(&doomed).await.unwrap();
        store.insert_warehouse(&kept).await.unwrap();

        let (a, ma) = item(&doomed, "A1", "Alicate");
        let (b, mb) = item(&kept, "B1", "Brocha");
        store.insert_item(&a, &ma).await.unwrap();
        store.insert_item(&b, &mb).await.unwrap();
        store.set_selected_warehouse(company, user, Some(doomed.id)).await.unwrap();

        assert!(store.delete_warehouse(company, doomed.id).await.unwrap());

        assert!(store.get_item(company, a.id).await.unwrap().is_none());
        assert!(store.get_item(company, b.id).await.unwrap().is_some());
        let movements = store.list_movements(company, WarehouseScope::All, 100).await.unwrap();
        assert_eq!(movements.len(), 1);
        assert_eq!(movements[0].item_id, b.id);
        assert_eq!(store.selected_warehouse(company, user).await.unwrap(), None);
    }

    #[tokio::test]
    async fn other_companies_rows_are_invisible() {
        let store = InMemoryInventoryStore::new();
        let owner = CompanyId::new();
        let stranger = CompanyId::new();
        let w = warehouse(owner, "Central");
        store.insert_warehouse(&w).await.unwrap();
        let (i, m) = item(&w, "X1", "Taladro");
        store.insert_item(&i, &m).await.unwrap();

        assert!(store.get_warehouse(stranger, w.id).await.unwrap().is_none());
        assert!(store.get_item(stranger, i.id).await.unwrap().is_none());
        assert!(!store.delete_item(stranger, i.id).await.unwrap());
        assert!(store.list_items(stranger, WarehouseScope::All).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn duplicate_item_names_conflict_within_a_warehouse() {
        let store = InMemoryInventoryStore::new();
        let company = CompanyId::new();
        let w = warehouse(company, "Central");
        let other = warehouse(company, "Anexo");
        store.insert_warehouse(&w).await.unwrap();
        store.insert_warehouse(&other).await.unwrap();

        let (first, m1) = item(&w, "C1", "Cinta");
        store.insert_item(&first, &m1).await.unwrap();

        let (dup, m2) = item(&w, "C2", " cinta ");
        let err = store.insert_item(&dup, &m2).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));

        let (elsewhere, m3) = item(&other, "C1", "Cinta");
        store.insert_item(&elsewhere, &m3).await.unwrap();
    }

    #[tokio::test]
    async fn stale_item_writes_are_refused() {
        let store = InMemoryInventoryStore::new();
        let company = CompanyId::new();
        let w = warehouse(company, "Central");
        store.insert_warehouse(&w).await.unwrap();
        let (original, m) = item(&w, "T1", "Tornillo");
        store.insert_item(&original, &m).await.unwrap();

        let mut first = store.get_item(company, original.id).await.unwrap().unwrap();
        let mut second = first.clone();

        first.quantity_available = 7;
        store.update_item(&first, None).await.unwrap();

        second.quantity_available = 9;
        let err = store.update_item(&second, None).await.unwrap_err();
        assert!(matches!(err, StoreError::Concurrency(_)));

        let stored = store.get_item(company, original.id).await.unwrap().unwrap();
        assert_eq!(stored.quantity_available, 7);
        assert_eq!(stored.version, first.version + 1);

        store.delete_item(company, original.id).await.unwrap();
        let err = store.update_item(&stored, None).await.unwrap_err();
        assert!(matches!(err, StoreError::Concurrency(_)));
    }

    #[tokio::test]
    async fn first_admin_only_once() {
        let store = InMemoryInventoryStore::new();
        let now = Utc::now();
        let company = |name: &str| {
            Company::create(
                stockroom_inventory::NewCompany {
                    name: name.into(),
                    tax_id: None,
                    address: None,
                    phone: None,
                },
                now,
            )
            .unwrap()
        };
        let admin = |company: &Company, username: &str| {
            stockroom_auth::NewUser {
                email: format!("{username}@x.test"),
                username: username.into(),
                full_name: "Admin".into(),
                password: "secreto123".into(),
                is_admin: true,
            }
            .validate()
            .unwrap()
            .into_account(company.id, now)
        };

        let first = company("Primera");
        store.insert_first_admin(&first, &admin(&first, "uno"), "hash").await.unwrap();

        let second = company("Segunda");
        let err = store
            .insert_first_admin(&second, &admin(&second, "dos"), "hash")
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
        assert!(store.get_company(second.id).await.unwrap().is_none());
        assert_eq!(store.count_users().await.unwrap(), 1);
    }
}
