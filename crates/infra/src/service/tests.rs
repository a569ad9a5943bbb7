use std::sync::{Arc, Mutex};

use chrono::{DateTime, NaiveDate, TimeDelta, TimeZone, Utc};

use stockroom_auth::{NewUser, Principal, Role};
use stockroom_core::{CompanyId, ItemId, UserId};
use stockroom_inventory::{
    BusinessCalendar, InventoryItem, ItemPatch, MovementKind, NewCompany, NewItem, NewWarehouse, Price,
    WarehouseScope,
};

use super::*;
use crate::store::InMemoryInventoryStore;

/// Ticks one second per reading so records made in sequence never share a
/// timestamp.
struct TestClock(Mutex<DateTime<Utc>>);

impl TestClock {
    fn at(now: DateTime<Utc>) -> Arc<Self> {
        Arc::new(Self(Mutex::new(now)))
    }

    fn advance(&self, by: TimeDelta) {
        let mut now = self.0.lock().unwrap();
        *now += by;
    }
}

impl Clock for TestClock {
    fn now(&self) -> DateTime<Utc> {
        let mut now = self.0.lock().unwrap();
        *now += TimeDelta::seconds(1);
        *now
    }
}

fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 19, 15, 0, 0).unwrap()
}

fn service() -> (InventoryService, Arc<TestClock>) {
    let clock = TestClock::at(start());
    let config = ServiceConfig {
        calendar: BusinessCalendar::new(-300).unwrap(),
        movement_list_limit: 50,
    };
    let service = InventoryService::with_clock(Arc::new(InMemoryInventoryStore::new()), config, clock.clone());
    (service, clock)
}

fn admin_input() -> NewUser {
    NewUser {
        email: "Admin@Stockroom.test".into(),
        username: "admin".into(),
        full_name: "Ana Admin".into(),
        password: "secreto123".into(),
        is_admin: false,
    }
}

/// Setup done, one warehouse created and selected; returns the admin principal.
async fn ready(service: &InventoryService) -> (Principal, WarehouseId) {
    let (company, admin) = service
        .setup(
            NewCompany {
                name: "Ferretería El Tornillo".into(),
                tax_id: None,
                address: None,
                phone: None,
            },
            admin_input(),
        )
        .await
        .unwrap();
    let principal = Principal::new(admin.id, company.id, admin.roles());
    let warehouse = service
        .create_warehouse(&principal, new_warehouse("Bodega Central"))
        .await
        .unwrap();
    (principal, warehouse.id)
}

fn new_warehouse(name: &str) -> NewWarehouse {
    NewWarehouse {
        name: name.into(),
        location: None,
        manager: None,
        phone: None,
    }
}

fn new_item(code: &str, name: &str, quantity: i64) -> NewItem {
    NewItem {
        code: code.into(),
        name: name.into(),
        quantity,
        price: Price::parse("10.50").unwrap(),
        entry_date: None,
    }
}

async fn add_item(service: &InventoryService, principal: &Principal, warehouse: WarehouseId) -> InventoryItem {
    service
        .create_item(principal, WarehouseScope::One(warehouse), new_item("P001", "Martillo", 10))
        .await
        .unwrap()
}

fn exit(quantity: i64) -> MovementRequest {
    MovementRequest {
        direction: MovementDirection::Exit,
        quantity,
        date: None,
        description: None,
    }
}

#[tokio::test]
async fn setup_runs_once_and_forces_admin() {
    let (service, _) = service();
    let (principal, _) = ready(&service).await;
    assert!(principal.is_admin());

    let again = service
        .setup(
            NewCompany {
                name: "Otra".into(),
                tax_id: None,
                address: None,
                phone: None,
            },
            NewUser {
                email: "otro@x.test".into(),
                username: "otro".into(),
                ..admin_input()
            },
        )
        .await;
    assert!(matches!(again, Err(ServiceError::Conflict(_))));
}

#[tokio::test]
async fn login_accepts_email_or_username() {
    let (service, _) = service();
    ready(&service).await;

    let by_email = service.login("admin@stockroom.test", "secreto123").await.unwrap();
    let by_username = service.login("admin", "secreto123").await.unwrap();
    assert_eq!(by_email.id, by_username.id);

    assert!(matches!(
        service.login("admin", "wrong-password").await,
        Err(ServiceError::InvalidCredentials)
    ));
    assert!(matches!(
        service.login("nobody", "secreto123").await,
        Err(ServiceError::InvalidCredentials)
    ));
}

#[tokio::test]
async fn users_cannot_delete_themselves() {
    let (service, _) = service();
    let (principal, _) = ready(&service).await;

    let operator = service
        .create_user(
            &principal,
            NewUser {
                email: "op@stockroom.test".into(),
                username: "operador".into(),
                full_name: "Oscar Operador".into(),
                password: "clave123".into(),
                is_admin: false,
            },
        )
        .await
        .unwrap();
    assert!(!operator.is_admin);
    assert_eq!(service.list_users(&principal).await.unwrap().len(), 2);

    assert!(matches!(
        service.delete_user(&principal, principal.user_id).await,
        Err(ServiceError::Validation(_))
    ));
    service.delete_user(&principal, operator.id).await.unwrap();
    assert!(matches!(
        service.delete_user(&principal, operator.id).await,
        Err(ServiceError::NotFound)
    ));
}

#[tokio::test]
async fn first_warehouse_becomes_selection_and_cannot_be_deleted_alone() {
    let (service, _) = service();
    let (principal, central) = ready(&service).await;

    assert_eq!(
        service.resolve_scope(&principal, None).await.unwrap(),
        WarehouseScope::One(central)
    );

    assert!(matches!(
        service.delete_warehouse(&principal, central).await,
        Err(ServiceError::Validation(_))
    ));

    let norte = service
        .create_warehouse(&principal, new_warehouse("Bodega Norte"))
        .await
        .unwrap();
    assert_eq!(
        service.selected_warehouse(&principal).await.unwrap().map(|w| w.id),
        Some(central)
    );

    service.select_warehouse(&principal, norte.id).await.unwrap();
    service.delete_warehouse(&principal, norte.id).await.unwrap();

    // Selection falls back to the remaining warehouse.
    assert_eq!(
        service.resolve_scope(&principal, None).await.unwrap(),
        WarehouseScope::One(central)
    );
}

#[tokio::test]
async fn item_codes_and_names_are_unique_per_warehouse() {
    let (service, _) = service();
    let (principal, central) = ready(&service).await;
    add_item(&service, &principal, central).await;

    let scope = WarehouseScope::One(central);
    assert!(matches!(
        service.create_item(&principal, scope, new_item("P001", "Otro", 1)).await,
        Err(ServiceError::Conflict(_))
    ));
    assert!(matches!(
        service.create_item(&principal, scope, new_item("P002", " MARTILLO ", 1)).await,
        Err(ServiceError::Conflict(_))
    ));
    // Codes compare exactly.
    service
        .create_item(&principal, scope, new_item("p001", "Destornillador", 1))
        .await
        .unwrap();

    let norte = service
        .create_warehouse(&principal, new_warehouse("Bodega Norte"))
        .await
        .unwrap();
    service
        .create_item(&principal, WarehouseScope::One(norte.id), new_item("P001", "Martillo", 3))
        .await
        .unwrap();

    assert!(matches!(
        service.create_item(&principal, WarehouseScope::All, new_item("P009", "Sierra", 1)).await,
        Err(ServiceError::Validation(_))
    ));
}

#[tokio::test]
async fn exits_cannot_exceed_stock() {
    let (service, _) = service();
    let (principal, central) = ready(&service).await;
    let item = add_item(&service, &principal, central).await;

    let err = service
        .register_movement(&principal, item.id, exit(11))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::InvariantViolation(_)));

    let (after, movement) = service
        .register_movement(&principal, item.id, exit(4))
        .await
        .unwrap();
    assert_eq!(after.quantity_available, 6);
    assert_eq!(after.quantity_used_today, 4);
    assert_eq!(movement.kind, MovementKind::Exit);

    let history = service.item_movements(&principal, item.id).await.unwrap();
    let kinds: Vec<_> = history.iter().map(|m| m.kind).collect();
    assert_eq!(kinds, vec![MovementKind::Exit, MovementKind::Creation]);
}

#[tokio::test]
async fn listing_applies_daily_reset_after_midnight() {
    let (service, clock) = service();
    let (principal, central) = ready(&service).await;
    let item = add_item(&service, &principal, central).await;
    service
        .register_movement(&principal, item.id, exit(3))
        .await
        .unwrap();

    let scope = WarehouseScope::One(central);
    let listed = service.list_items(&principal, scope, None).await.unwrap();
    assert_eq!(listed[0].quantity_used_today, 3);
    assert_eq!(listed[0].quantity_initial_today, 10);

    // 15:00 UTC is 10:00 at UTC-5; fourteen hours later is the next local day.
    clock.advance(TimeDelta::hours(14));
    let listed = service.list_items(&principal, scope, None).await.unwrap();
    assert_eq!(listed[0].quantity_used_today, 0);
    assert_eq!(listed[0].quantity_initial_today, 7);
    assert_eq!(listed[0].quantity_available, 7);

    let summary = service.summary(&principal, scope).await.unwrap();
    assert_eq!(summary.total_units, 7);
    assert_eq!(summary.total_used_today, 0);
}

#[tokio::test]
async fn forced_daily_reset_covers_every_warehouse() {
    let (service, _) = service();
    let (principal, central) = ready(&service).await;
    let item = add_item(&service, &principal, central).await;
    service
        .register_movement(&principal, item.id, exit(2))
        .await
        .unwrap();

    assert_eq!(service.daily_reset(&principal).await.unwrap(), 1);
    let item = service.item(&principal, item.id).await.unwrap();
    assert_eq!(item.quantity_used_today, 0);
    assert_eq!(item.quantity_initial_today, 8);
}

#[tokio::test]
async fn quantity_edit_is_an_adjustment_not_usage() {
    let (service, _) = service();
    let (principal, central) = ready(&service).await;
    let item = add_item(&service, &principal, central).await;
    service
        .create_item(&principal, WarehouseScope::One(central), new_item("P002", "Alicate", 1))
        .await
        .unwrap();

    let updated = service
        .update_item(
            &principal,
            item.id,
            ItemPatch {
                quantity_available: Some(4),
                ..ItemPatch::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.quantity_available, 4);
    assert_eq!(updated.quantity_used_today, 0);

    // Renaming onto another item's name clashes; re-casing its own does not.
    assert!(matches!(
        service
            .update_item(
                &principal,
                item.id,
                ItemPatch {
                    name: Some("alicate".into()),
                    ..ItemPatch::default()
                },
            )
            .await,
        Err(ServiceError::Conflict(_))
    ));
    service
        .update_item(
            &principal,
            item.id,
            ItemPatch {
                name: Some("MARTILLO".into()),
                ..ItemPatch::default()
            },
        )
        .await
        .unwrap();

    let kinds: Vec<_> = service
        .item_movements(&principal, item.id)
        .await
        .unwrap()
        .iter()
        .map(|m| m.kind)
        .collect();
    assert_eq!(
        kinds,
        vec![MovementKind::Edit, MovementKind::Adjustment, MovementKind::Creation]
    );
}

#[tokio::test]
async fn usage_counts_backdated_exits_in_range() {
    let (service, _) = service();
    let (principal, central) = ready(&service).await;
    let item = add_item(&service, &principal, central).await;

    let earlier = NaiveDate::from_ymd_opt(2026, 10, 2).unwrap();
    service
        .register_movement(
            &principal,
            item.id,
            MovementRequest {
                date: Some(earlier),
                ..exit(2)
            },
        )
        .await
        .unwrap();
    service
        .register_movement(&principal, item.id, exit(1))
        .await
        .unwrap();

    let scope = WarehouseScope::One(central);
    let month = service.usage(&principal, scope, None, None).await.unwrap();
    assert_eq!(month[0].used, 3);

    let first_week = service
        .usage(
            &principal,
            scope,
            Some(NaiveDate::from_ymd_opt(2026, 10, 1).unwrap()),
            Some(NaiveDate::from_ymd_opt(2026, 10, 7).unwrap()),
        )
        .await
        .unwrap();
    assert_eq!(first_week[0].used, 2);

    assert!(matches!(
        service
            .usage(&principal, scope, Some(NaiveDate::from_ymd_opt(2026, 10, 9).unwrap()), Some(earlier))
            .await,
        Err(ServiceError::Validation(_))
    ));
}

#[tokio::test]
async fn movement_listing_is_clamped() {
    let (service, _) = service();
    let (principal, central) = ready(&service).await;
    let item = add_item(&service, &principal, central).await;
    for _ in 0..3 {
        service
            .register_movement(&principal, item.id, exit(1))
            .await
            .unwrap();
    }

    let scope = WarehouseScope::All;
    assert_eq!(service.list_movements(&principal, scope, Some(2)).await.unwrap().len(), 2);
    assert_eq!(service.list_movements(&principal, scope, Some(0)).await.unwrap().len(), 1);
    assert_eq!(service.list_movements(&principal, scope, None).await.unwrap().len(), 4);
}

#[tokio::test]
async fn csv_import_reports_duplicates_per_row() {
    let (service, _) = service();
    let (principal, central) = ready(&service).await;
    add_item(&service, &principal, central).await;

    let csv = "Código,Nombre,Cantidad,Precio\n\
               P001,Martillo,5,10\n\
               P002,Taladro,3,\"120,50\"\n\
               P003,taladro,1,5\n\
               ,Sin código,1,1\n";
    let report = service
        .import_csv(&principal, WarehouseScope::One(central), csv)
        .await
        .unwrap();

    assert_eq!(report.imported, 1);
    let lines: Vec<u64> = report.errors.iter().map(|e| e.line).collect();
    assert_eq!(lines, vec![2, 4, 5]);

    let items = service
        .list_items(&principal, WarehouseScope::One(central), Some("tala"))
        .await
        .unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].price.cents(), 12050);

    let history = service.item_movements(&principal, items[0].id).await.unwrap();
    assert_eq!(history[0].description, "Producto importado: Taladro");

    assert!(matches!(
        service.import_csv(&principal, WarehouseScope::All, csv).await,
        Err(ServiceError::Validation(_))
    ));
    assert!(matches!(
        service
            .import_csv(&principal, WarehouseScope::One(central), "foo,bar\n1,2\n")
            .await,
        Err(ServiceError::Validation(_))
    ));
}

#[tokio::test]
async fn reports_are_named_by_business_date() {
    let (service, _) = service();
    let (principal, central) = ready(&service).await;
    add_item(&service, &principal, central).await;

    let scope = WarehouseScope::All;
    let csv = service
        .render_report(&principal, scope, ReportFormat::SimpleCsv)
        .await
        .unwrap();
    assert_eq!(csv.filename, "inventario_2026-10-19.csv");
    assert!(String::from_utf8(csv.bytes).unwrap().contains("\"P001\""));

    let doc = service
        .render_report(&principal, scope, ReportFormat::Doc)
        .await
        .unwrap();
    assert_eq!(doc.filename, "informe_inventario_2026-10-19.doc");
    assert_eq!(doc.content_type, WORD_CONTENT_TYPE);

    let pdf = service
        .render_report(&principal, scope, ReportFormat::Pdf)
        .await
        .unwrap();
    assert!(pdf.bytes.starts_with(b"%PDF"));
}

#[tokio::test]
async fn other_companies_see_nothing() {
    let (service, _) = service();
    let (principal, central) = ready(&service).await;
    let item = add_item(&service, &principal, central).await;

    let stranger = Principal::new(UserId::new(), CompanyId::new(), vec![Role::admin()]);
    assert!(matches!(
        service.item(&stranger, item.id).await,
        Err(ServiceError::NotFound)
    ));
    assert!(matches!(
        service.resolve_scope(&stranger, Some(WarehouseScope::One(central))).await,
        Err(ServiceError::NotFound)
    ));
    assert!(matches!(
        service.delete_item(&stranger, ItemId::new()).await,
        Err(ServiceError::NotFound)
    ));
    assert!(service.list_warehouses(&stranger).await.unwrap().is_empty());
}

/// Interleaved requests. The store pauses after every read so two requests
/// started together both read before either writes.
mod races {
    use std::time::Duration;

    use async_trait::async_trait;

    use stockroom_auth::UserAccount;
    use stockroom_inventory::{Company, Movement, Warehouse};

    use super::*;
    use crate::store::{InventoryStore, StoreResult, StoredUser};

    struct PausingStore {
        inner: InMemoryInventoryStore,
    }

    async fn pause() {
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    #[async_trait]
    impl InventoryStore for PausingStore {
        async fn count_users(&self) -> StoreResult<u64> {
            let n = self.inner.count_users().await;
            pause().await;
            n
        }

        async fn insert_first_admin(&self, company: &Company, admin: &UserAccount, password_hash: &str) -> StoreResult<()> {
            self.inner.insert_first_admin(company, admin, password_hash).await
        }

        async fn get_company(&self, company_id: CompanyId) -> StoreResult<Option<Company>> {
            self.inner.get_company(company_id).await
        }

        async fn update_company(&self, company: &Company) -> StoreResult<()> {
            self.inner.update_company(company).await
        }

        async fn insert_user(&self, user: &UserAccount, password_hash: &str) -> StoreResult<()> {
            self.inner.insert_user(user, password_hash).await
        }

        async fn find_user_by_login(&self, login: &str) -> StoreResult<Option<StoredUser>> {
            self.inner.find_user_by_login(login).await
        }

        async fn get_user(&self, company_id: CompanyId, user_id: UserId) -> StoreResult<Option<UserAccount>> {
            self.inner.get_user(company_id, user_id).await
        }

        async fn list_users(&self, company_id: CompanyId) -> StoreResult<Vec<UserAccount>> {
            self.inner.list_users(company_id).await
        }

        async fn delete_user(&self, company_id: CompanyId, user_id: UserId) -> StoreResult<bool> {
            self.inner.delete_user(company_id, user_id).await
        }

        async fn selected_warehouse(&self, company_id: CompanyId, user_id: UserId) -> StoreResult<Option<WarehouseId>> {
            self.inner.selected_warehouse(company_id, user_id).await
        }

        async fn set_selected_warehouse(
            &self,
            company_id: CompanyId,
            user_id: UserId,
            warehouse_id: Option<WarehouseId>,
        ) -> StoreResult<()> {
            self.inner.set_selected_warehouse(company_id, user_id, warehouse_id).await
        }

        async fn insert_warehouse(&self, warehouse: &Warehouse) -> StoreResult<()> {
            self.inner.insert_warehouse(warehouse).await
        }

        async fn get_warehouse(&self, company_id: CompanyId, warehouse_id: WarehouseId) -> StoreResult<Option<Warehouse>> {
            self.inner.get_warehouse(company_id, warehouse_id).await
        }

        async fn list_warehouses(&self, company_id: CompanyId) -> StoreResult<Vec<Warehouse>> {
            self.inner.list_warehouses(company_id).await
        }

        async fn update_warehouse(&self, warehouse: &Warehouse) -> StoreResult<()> {
            self.inner.update_warehouse(warehouse).await
        }

        async fn delete_warehouse(&self, company_id: CompanyId, warehouse_id: WarehouseId) -> StoreResult<bool> {
            self.inner.delete_warehouse(company_id, warehouse_id).await
        }

        async fn insert_item(&self, item: &InventoryItem, movement: &Movement) -> StoreResult<()> {
            self.inner.insert_item(item, movement).await
        }

        async fn get_item(&self, company_id: CompanyId, item_id: ItemId) -> StoreResult<Option<InventoryItem>> {
            let item = self.inner.get_item(company_id, item_id).await;
            pause().await;
            item
        }

        async fn list_items(&self, company_id: CompanyId, scope: WarehouseScope) -> StoreResult<Vec<InventoryItem>> {
            let items = self.inner.list_items(company_id, scope).await;
            pause().await;
            items
        }

        async fn update_item(&self, item: &InventoryItem, movement: Option<&Movement>) -> StoreResult<()> {
            self.inner.update_item(item, movement).await
        }

        async fn delete_item(&self, company_id: CompanyId, item_id: ItemId) -> StoreResult<bool> {
            self.inner.delete_item(company_id, item_id).await
        }

        async fn find_item_by_code(
            &self,
            company_id: CompanyId,
            warehouse_id: WarehouseId,
            code: &str,
        ) -> StoreResult<Option<InventoryItem>> {
            self.inner.find_item_by_code(company_id, warehouse_id, code).await
        }

        async fn find_item_by_name(
            &self,
            company_id: CompanyId,
            warehouse_id: WarehouseId,
            name: &str,
        ) -> StoreResult<Option<InventoryItem>> {
            self.inner.find_item_by_name(company_id, warehouse_id, name).await
        }

        async fn list_movements(
            &self,
            company_id: CompanyId,
            scope: WarehouseScope,
            limit: usize,
        ) -> StoreResult<Vec<Movement>> {
            self.inner.list_movements(company_id, scope, limit).await
        }

        async fn list_item_movements(&self, company_id: CompanyId, item_id: ItemId) -> StoreResult<Vec<Movement>> {
            self.inner.list_item_movements(company_id, item_id).await
        }
    }

    fn pausing_service() -> (InventoryService, Arc<TestClock>) {
        let clock = TestClock::at(start());
        let config = ServiceConfig {
            calendar: BusinessCalendar::new(-300).unwrap(),
            movement_list_limit: 50,
        };
        let store = PausingStore {
            inner: InMemoryInventoryStore::new(),
        };
        let service = InventoryService::with_clock(Arc::new(store), config, clock.clone());
        (service, clock)
    }

    fn entry(quantity: i64) -> MovementRequest {
        MovementRequest {
            direction: MovementDirection::Entry,
            ..exit(quantity)
        }
    }

    /// Stock equals the sum of recorded changes, and each movement starts
    /// where the previous one ended.
    async fn assert_history_matches_stock(service: &InventoryService, principal: &Principal, item_id: ItemId) {
        let item = service.item(principal, item_id).await.unwrap();
        let mut history = service.item_movements(principal, item_id).await.unwrap();
        history.reverse();

        let net: i64 = history.iter().map(|m| m.quantity_change).sum();
        assert_eq!(net, item.quantity_available);
        assert!(history.iter().all(Movement::is_consistent));
        for pair in history.windows(2) {
            assert_eq!(pair[1].quantity_before, pair[0].quantity_after);
        }
        assert_eq!(history.last().unwrap().quantity_after, item.quantity_available);
    }

    #[tokio::test]
    async fn concurrent_exits_never_oversell() {
        let (service, _) = pausing_service();
        let (principal, warehouse) = ready(&service).await;
        let item = add_item(&service, &principal, warehouse).await;

        let (a, b) = tokio::join!(
            service.register_movement(&principal, item.id, exit(6)),
            service.register_movement(&principal, item.id, exit(6)),
        );
        let rejected = [&a, &b]
            .iter()
            .filter(|r| matches!(r, Err(ServiceError::InvariantViolation(_))))
            .count();
        assert!(a.is_ok() != b.is_ok());
        assert_eq!(rejected, 1);

        let item = service.item(&principal, item.id).await.unwrap();
        assert_eq!(item.quantity_available, 4);
        assert_eq!(item.quantity_used_today, 6);
        assert_history_matches_stock(&service, &principal, item.id).await;
    }

    #[tokio::test]
    async fn concurrent_entries_are_all_kept() {
        let (service, _) = pausing_service();
        let (principal, warehouse) = ready(&service).await;
        let item = add_item(&service, &principal, warehouse).await;

        let (a, b, c) = tokio::join!(
            service.register_movement(&principal, item.id, entry(3)),
            service.register_movement(&principal, item.id, entry(3)),
            service.register_movement(&principal, item.id, exit(2)),
        );
        assert!(a.is_ok() && b.is_ok() && c.is_ok());

        let item = service.item(&principal, item.id).await.unwrap();
        assert_eq!(item.quantity_available, 14);
        assert_eq!(item.quantity_used_today, 2);
        assert_history_matches_stock(&service, &principal, item.id).await;
    }

    #[tokio::test]
    async fn daily_reset_on_read_does_not_undo_a_movement() {
        let (service, clock) = pausing_service();
        let (principal, warehouse) = ready(&service).await;
        let item = add_item(&service, &principal, warehouse).await;
        service.register_movement(&principal, item.id, exit(3)).await.unwrap();

        // Next business day: both the listing and the exit want to reset.
        clock.advance(TimeDelta::days(1));
        let (listed, moved) = tokio::join!(
            service.list_items(&principal, WarehouseScope::One(warehouse), None),
            service.register_movement(&principal, item.id, exit(2)),
        );
        listed.unwrap();
        moved.unwrap();

        let item = service.item(&principal, item.id).await.unwrap();
        assert_eq!(item.quantity_available, 5);
        assert_eq!(item.quantity_initial_today, 7);
        assert_eq!(item.quantity_used_today, 2);
        assert_history_matches_stock(&service, &principal, item.id).await;
    }

    #[tokio::test]
    async fn concurrent_edit_and_exit_both_land() {
        let (service, _) = pausing_service();
        let (principal, warehouse) = ready(&service).await;
        let item = add_item(&service, &principal, warehouse).await;

        let rename = ItemPatch {
            name: Some("Martillo de bola".into()),
            ..ItemPatch::default()
        };
        let (edited, moved) = tokio::join!(
            service.update_item(&principal, item.id, rename),
            service.register_movement(&principal, item.id, exit(4)),
        );
        edited.unwrap();
        moved.unwrap();

        let item = service.item(&principal, item.id).await.unwrap();
        assert_eq!(item.name, "Martillo de bola");
        assert_eq!(item.quantity_available, 6);
        assert_history_matches_stock(&service, &principal, item.id).await;
    }

    #[tokio::test]
    async fn concurrent_setups_create_one_company() {
        let (service, _) = pausing_service();
        let company = |name: &str| NewCompany {
            name: name.into(),
            tax_id: None,
            address: None,
            phone: None,
        };
        let second_admin = NewUser {
            email: "segundo@x.test".into(),
            username: "segundo".into(),
            ..admin_input()
        };

        let (a, b) = tokio::join!(
            service.setup(company("Primera"), admin_input()),
            service.setup(company("Segunda"), second_admin),
        );
        assert!(a.is_ok() != b.is_ok());
        let loser = if a.is_ok() { b } else { a };
        assert!(matches!(loser, Err(ServiceError::Conflict(_))));
    }
}
