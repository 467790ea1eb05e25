use mongodb::{bson::doc, Database};
use parking_lot::Mutex;
use redis::aio::ConnectionManager;
use runtime::DataConfig;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::bus::{connect_bus, Bus};
use crate::cache::{self, connect_cache};
use crate::document::connect_document;
use crate::error::DataError;
use crate::hook::ShutdownHook;
use crate::relational::{connect_relational, DbHandle};

/// A handle plus the hook that releases it. The hook is taken on first use.
struct Slot<T> {
    handle: T,
    hook: Mutex<Option<ShutdownHook>>,
}

impl<T> Slot<T> {
    fn new(handle: T, hook: ShutdownHook) -> Self {
        Self {
            handle,
            hook: Mutex::new(Some(hook)),
        }
    }

    async fn shutdown(&self, kind: &'static str) {
        let hook = self.hook.lock().take();
        match hook {
            Some(hook) => {
                hook().await;
                info!(store = kind, "store closed");
            }
            None => debug!(store = kind, "store already closed"),
        }
    }
}

/// Owns every live store handle of the process.
///
/// Built once at startup and passed explicitly to whoever needs a handle.
/// Each accessor returns `None` for a store that is not configured.
#[derive(Default)]
pub struct Data {
    relational: Option<Slot<DbHandle>>,
    document: Option<Slot<Database>>,
    cache: Option<Slot<ConnectionManager>>,
    bus: Option<Slot<Bus>>,
}

impl Data {
    /// Connect every configured store. A configured store that fails is fatal;
    /// stores opened before the failure are closed again.
    pub async fn connect(cfg: &DataConfig, home_dir: &Path) -> Result<Self, DataError> {
        let mut data = Data::default();
        if let Err(e) = data.connect_all(cfg, home_dir).await {
            data.shutdown().await;
            return Err(e);
        }
        Ok(data)
    }

    async fn connect_all(&mut self, cfg: &DataConfig, home_dir: &Path) -> Result<(), DataError> {
        match &cfg.relational {
            Some(c) => {
                let (handle, hook) = connect_relational(c, home_dir).await?;
                self.relational = Some(Slot::new(handle, hook));
            }
            None => warn!("no relational store configured"),
        }
        match &cfg.document {
            Some(c) => {
                let (handle, hook) = connect_document(c).await?;
                self.document = Some(Slot::new(handle, hook));
            }
            None => warn!("no document store configured"),
        }
        match &cfg.cache {
            Some(c) => {
                let (handle, hook) = connect_cache(c).await?;
                self.cache = Some(Slot::new(handle, hook));
            }
            None => warn!("no cache configured"),
        }
        match &cfg.bus {
            Some(c) => {
                let (handle, hook) = connect_bus(c).await?;
                self.bus = Some(Slot::new(handle, hook));
            }
            None => warn!("no message bus configured"),
        }
        Ok(())
    }

    pub fn builder() -> DataBuilder {
        DataBuilder::default()
    }

    pub fn relational(&self) -> Option<&DbHandle> {
        self.relational.as_ref().map(|s| &s.handle)
    }

    pub fn document(&self) -> Option<&Database> {
        self.document.as_ref().map(|s| &s.handle)
    }

    pub fn cache(&self) -> Option<&ConnectionManager> {
        self.cache.as_ref().map(|s| &s.handle)
    }

    pub fn bus(&self) -> Option<&Bus> {
        self.bus.as_ref().map(|s| &s.handle)
    }

    pub fn jetstream(&self) -> Option<&async_nats::jetstream::Context> {
        self.bus().and_then(Bus::jetstream)
    }

    pub async fn shutdown_relational(&self) {
        if let Some(slot) = &self.relational {
            slot.shutdown("relational").await;
        }
    }

    pub async fn shutdown_document(&self) {
        if let Some(slot) = &self.document {
            slot.shutdown("document").await;
        }
    }

    /// Marks the cache closed. Its connection is released when `Data` is dropped.
    pub async fn shutdown_cache(&self) {
        if let Some(slot) = &self.cache {
            slot.shutdown("cache").await;
        }
    }

    pub async fn shutdown_bus(&self) {
        if let Some(slot) = &self.bus {
            slot.shutdown("bus").await;
        }
    }

    /// Close every store, most recently opened first.
    pub async fn shutdown(&self) {
        self.shutdown_bus().await;
        self.shutdown_cache().await;
        self.shutdown_document().await;
        self.shutdown_relational().await;
    }

    /// Probe every configured store concurrently.
    pub async fn health(&self) -> HealthReport {
        let (relational, document, cache, bus) = tokio::join!(
            async {
                match self.relational() {
                    Some(db) => StoreHealth::from_result(db.sea().ping().await),
                    None => StoreHealth::Absent,
                }
            },
            async {
                match self.document() {
                    Some(db) => StoreHealth::from_result(
                        db.client()
                            .database("admin")
                            .run_command(doc! { "ping": 1 })
                            .await,
                    ),
                    None => StoreHealth::Absent,
                }
            },
            async {
                match self.cache() {
                    Some(manager) => StoreHealth::from_result(cache::ping(manager).await),
                    None => StoreHealth::Absent,
                }
            },
            async {
                match self.bus() {
                    Some(bus) if bus.is_connected() => StoreHealth::Up,
                    Some(_) => StoreHealth::Down {
                        error: "not connected".to_string(),
                    },
                    None => StoreHealth::Absent,
                }
            },
        );

        HealthReport {
            stores: BTreeMap::from([
                ("relational", relational),
                ("document", document),
                ("cache", cache),
                ("bus", bus),
            ]),
        }
    }
}

/// Assemble a [`Data`] from handles opened elsewhere.
#[derive(Default)]
pub struct DataBuilder {
    data: Data,
}

impl DataBuilder {
    pub fn relational(mut self, handle: DbHandle, hook: ShutdownHook) -> Self {
        self.data.relational = Some(Slot::new(handle, hook));
        self
    }

    pub fn document(mut self, handle: Database, hook: ShutdownHook) -> Self {
        self.data.document = Some(Slot::new(handle, hook));
        self
    }

    pub fn cache(mut self, handle: ConnectionManager, hook: ShutdownHook) -> Self {
        self.data.cache = Some(Slot::new(handle, hook));
        self
    }

    pub fn bus(mut self, handle: Bus, hook: ShutdownHook) -> Self {
        self.data.bus = Some(Slot::new(handle, hook));
        self
    }

    pub fn build(self) -> Data {
        self.data
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum StoreHealth {
    Up,
    Down { error: String },
    Absent,
}

impl StoreHealth {
    fn from_result<T, E: std::fmt::Display>(r: Result<T, E>) -> Self {
        match r {
            Ok(_) => Self::Up,
            Err(e) => Self::Down {
                error: e.to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub stores: BTreeMap<&'static str, StoreHealth>,
}

impl HealthReport {
    /// True unless a configured store is down.
    pub fn is_healthy(&self) -> bool {
        !self
            .stores
            .values()
            .any(|s| matches!(s, StoreHealth::Down { .. }))
    }
}
