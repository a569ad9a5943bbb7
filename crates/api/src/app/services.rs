//! Service wiring: picks the store backend and builds the application
//! services from settings.

use std::sync::Arc;

use thiserror::Error;

use stockroom_auth::{Hs256Jwt, JwtError};
use stockroom_core::DomainError;
use stockroom_infra::{
    InMemoryInventoryStore, InventoryService, InventoryStore, PostgresInventoryStore, ServiceConfig, StoreError,
};
use stockroom_inventory::BusinessCalendar;

use crate::settings::Settings;

/// Everything handlers need, shared behind an `Arc`.
pub struct AppServices {
    pub inventory: InventoryService,
    pub jwt: Hs256Jwt,
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("auth configuration: {0}")]
    Jwt(#[from] JwtError),
    #[error("inventory configuration: {0}")]
    Calendar(#[from] DomainError),
    #[error("database: {0}")]
    Store(#[from] StoreError),
}

pub async fn build_services(settings: &Settings) -> Result<AppServices, StartupError> {
    let jwt = Hs256Jwt::new(&settings.auth.jwt_secret, settings.auth.token_ttl_minutes)?;
    let config = ServiceConfig {
        calendar: BusinessCalendar::new(settings.inventory.business_utc_offset_minutes)?,
        movement_list_limit: settings.inventory.movement_list_limit,
    };

    let store: Arc<dyn InventoryStore> = match settings.database.url.as_deref() {
        Some(url) => {
            let store = PostgresInventoryStore::connect(url, settings.database.max_connections).await?;
            store.migrate().await?;
            tracing::info!("using postgres inventory store");
            Arc::new(store)
        }
        None => {
            tracing::warn!("database.url not set; using in-memory store (data is lost on restart)");
            Arc::new(InMemoryInventoryStore::new())
        }
    };

    Ok(AppServices {
        inventory: InventoryService::new(store, config),
        jwt,
    })
}
