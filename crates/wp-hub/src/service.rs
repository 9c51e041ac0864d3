//! # Query Service
//!
//! Turns search and detail requests into store queries. Search fans out to
//! the three collections concurrently and joins them; any failed sub-query
//! fails the whole search. Every store call is bounded by the configured
//! query timeout.

use crate::store::{StoreError, StoreResult, TravelStore};
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use wp_core::{City, Country, Hotel, HotelId, HotelIdError, SearchResults};

/// Entity kind named in a not-found outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Hotel,
    City,
    Country,
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hotel => write!(f, "Hotel"),
            Self::City => write!(f, "City"),
            Self::Country => write!(f, "Country"),
        }
    }
}

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("search query is missing")]
    MissingQuery,
    #[error("invalid hotel id: {0}")]
    InvalidHotelId(HotelIdError),
    #[error("{0} not found")]
    NotFound(Entity),
    #[error(transparent)]
    Store(#[from] StoreError),
}

pub struct QueryService {
    store: Arc<dyn TravelStore>,
    timeout: Duration,
}

impl QueryService {
    pub fn new(store: Arc<dyn TravelStore>, timeout: Duration) -> Self {
        Self { store, timeout }
    }

    /// Case-insensitive substring search over all three collections.
    pub async fn search(&self, query: &str) -> Result<SearchResults, QueryError> {
        let (hotels, cities, countries) = tokio::try_join!(
            self.bounded(self.store.search_hotels(query)),
            self.bounded(self.store.search_cities(query)),
            self.bounded(self.store.search_countries(query)),
        )?;
        tracing::debug!(
            query,
            hotels = hotels.len(),
            cities = cities.len(),
            countries = countries.len(),
            "search complete"
        );
        Ok(SearchResults {
            hotels,
            cities,
            countries,
        })
    }

    /// The id is validated before the store is consulted.
    pub async fn hotel_by_id(&self, raw_id: &str) -> Result<Hotel, QueryError> {
        let id: HotelId = raw_id.parse().map_err(QueryError::InvalidHotelId)?;
        self.bounded(self.store.hotel_by_id(&id))
            .await?
            .ok_or(QueryError::NotFound(Entity::Hotel))
    }

    pub async fn city_by_name(&self, name: &str) -> Result<City, QueryError> {
        self.bounded(self.store.city_by_name(name))
            .await?
            .ok_or(QueryError::NotFound(Entity::City))
    }

    /// Accepts either the full country name or its ISO code.
    pub async fn country_by_identifier(&self, value: &str) -> Result<Country, QueryError> {
        self.bounded(self.store.country_by_name_or_code(value))
            .await?
            .ok_or(QueryError::NotFound(Entity::Country))
    }

    async fn bounded<T>(&self, query: impl Future<Output = StoreResult<T>>) -> StoreResult<T> {
        tokio::time::timeout(self.timeout, query)
            .await
            .map_err(|_| StoreError::Timeout(self.timeout))?
    }
}
