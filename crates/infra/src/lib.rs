//! Infrastructure layer: persistence adapters and the application services
//! built on top of them.

pub mod service;
pub mod store;

pub use service::{
    Clock, InventoryService, ItemUsage, MovementDirection, MovementRequest, ReportFile, ReportFormat, ServiceConfig,
    ServiceError, ServiceResult, SystemClock,
};
pub use store::{InMemoryInventoryStore, InventoryStore, PostgresInventoryStore, StoreError, StoreResult};
