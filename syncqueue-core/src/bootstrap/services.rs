//! Service initialization and dependency injection

use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use crate::{
    bootstrap::init_database,
    repository::{postgres::MIGRATOR, MemoryRoomStore, PgRoomStore, RoomStore},
    service::RoomService,
    Config,
};

/// Container for the initialized room services
#[derive(Clone)]
pub struct Services {
    /// Selected room store
    pub store: Arc<dyn RoomStore>,
    /// Room façade over the store
    pub room_service: RoomService,
    /// Which store backs the services, for logs and diagnostics
    pub store_kind: &'static str,
}

impl std::fmt::Debug for Services {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Services")
            .field("store_kind", &self.store_kind)
            .finish()
    }
}

/// Build the room store and services from configuration.
///
/// With a database URL the Postgres store is used (running migrations when
/// `run_migrations` is set); otherwise rooms live in memory.
pub async fn init_services(config: &Config, run_migrations: bool) -> Result<Services> {
    let (store, store_kind): (Arc<dyn RoomStore>, &'static str) = if config.uses_database() {
        let pool = init_database(config).await?;
        if run_migrations {
            info!("Running database migrations...");
            MIGRATOR.run(&pool).await?;
            info!("Migrations completed");
        }
        (Arc::new(PgRoomStore::new(pool)), "postgres")
    } else {
        info!("No database configured, rooms are kept in memory");
        (Arc::new(MemoryRoomStore::new()), "memory")
    };

    let room_service = RoomService::new(store.clone(), config.rooms.clone());
    info!(store = store_kind, "Room services initialized");

    Ok(Services {
        store,
        room_service,
        store_kind,
    })
}
