//! # Travel Store
//!
//! The data store seam. Every backend implements [`TravelStore`] over three
//! independent collections: hotels, cities and countries. The query service
//! only ever reads through it; [`TravelStore::seed`] is the one write path
//! and runs once at startup.

pub mod memory;
pub mod mongo;

use crate::config::{Backend, Config};
use anyhow::Context;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use wp_core::{City, Country, Hotel, HotelId, SeedData, SeedSummary};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("mongodb: {0}")]
    Mongo(#[from] mongodb::error::Error),
    #[error("store query timed out after {0:?}")]
    Timeout(Duration),
    #[error("duplicate hotel id {0}")]
    DuplicateId(HotelId),
    #[cfg(test)]
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait::async_trait]
pub trait TravelStore: Send + Sync {
    /// Short backend name for logs.
    fn kind(&self) -> &'static str;

    /// Hotels whose name, country or city contains `query`, ignoring case.
    async fn search_hotels(&self, query: &str) -> StoreResult<Vec<Hotel>>;

    /// Cities whose name contains `query`, ignoring case.
    async fn search_cities(&self, query: &str) -> StoreResult<Vec<City>>;

    /// Countries whose full name contains `query`, ignoring case.
    async fn search_countries(&self, query: &str) -> StoreResult<Vec<Country>>;

    async fn hotel_by_id(&self, id: &HotelId) -> StoreResult<Option<Hotel>>;

    /// First city whose name equals `name` exactly.
    async fn city_by_name(&self, name: &str) -> StoreResult<Option<City>>;

    /// First country whose name or ISO code equals `value` exactly.
    async fn country_by_name_or_code(&self, value: &str) -> StoreResult<Option<Country>>;

    /// True when all three collections hold no records.
    async fn is_empty(&self) -> StoreResult<bool>;

    /// Bulk insert. Hotels without an id get a fresh one.
    async fn seed(&self, data: SeedData) -> StoreResult<SeedSummary>;
}

/// Open the backend selected by `config`.
pub async fn open(config: &Config) -> anyhow::Result<Arc<dyn TravelStore>> {
    let store: Arc<dyn TravelStore> = match config.backend()? {
        Backend::Mongo { url } => Arc::new(
            mongo::MongoStore::connect(&url)
                .await
                .context("connecting to MongoDB")?,
        ),
        Backend::Memory => {
            tracing::warn!("No database URL configured, using the in-memory store");
            Arc::new(memory::MemoryStore::new())
        }
    };
    Ok(store)
}

/// Seed `store` unless it already holds data, so restarting against a
/// persistent database does not insert the same records again. Returns
/// `None` when seeding was skipped.
pub async fn seed_if_empty(
    store: &dyn TravelStore,
    data: SeedData,
) -> StoreResult<Option<SeedSummary>> {
    if !store.is_empty().await? {
        return Ok(None);
    }
    store.seed(data).await.map(Some)
}

/// Parse a JSON seed file (`{"hotels": [...], "cities": [...], "countries": [...]}`).
pub fn load_seed_file(path: &Path) -> anyhow::Result<SeedData> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading seed file {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("parsing seed file {}", path.display()))
}
