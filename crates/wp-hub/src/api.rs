//! # API Handlers
//!
//! Axum handlers for the read-only lookup API. Successful responses are
//! JSON; every failure is a plain-text body with a fixed message.

use crate::service::QueryError;
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use wp_core::{City, Country, Hotel, SearchResults};

pub const MISSING_QUERY: &str = "Query parameter \"q\" is required";
pub const INVALID_HOTEL_ID: &str = "Invalid hotel id";
pub const STORE_FAILURE: &str = "Error while querying the data store";

impl IntoResponse for QueryError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            QueryError::MissingQuery => (StatusCode::BAD_REQUEST, MISSING_QUERY.to_string()),
            QueryError::InvalidHotelId(e) => {
                tracing::debug!("Rejected hotel id: {}", e);
                (StatusCode::BAD_REQUEST, INVALID_HOTEL_ID.to_string())
            }
            QueryError::NotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
            QueryError::Store(e) => {
                tracing::error!("Store query failed: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, STORE_FAILURE.to_string())
            }
        };
        (status, body).into_response()
    }
}

/// The value of `name` if it occurs exactly once among the query pairs.
fn single_param<'a>(pairs: &'a [(String, String)], name: &str) -> Option<&'a str> {
    let mut values = pairs.iter().filter(|(k, _)| k == name).map(|(_, v)| v.as_str());
    match (values.next(), values.next()) {
        (Some(value), None) => Some(value),
        _ => None,
    }
}

pub async fn search(
    State(state): State<Arc<AppState>>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<SearchResults>, QueryError> {
    let query = single_param(&pairs, "q").ok_or(QueryError::MissingQuery)?;
    let results = state.service.search(query).await?;
    Ok(Json(results))
}

pub async fn get_hotel(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Hotel>, QueryError> {
    let hotel = state.service.hotel_by_id(&id).await?;
    Ok(Json(hotel))
}

pub async fn get_city(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Json<City>, QueryError> {
    let city = state.service.city_by_name(&name).await?;
    Ok(Json(city))
}

pub async fn get_country(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Json<Country>, QueryError> {
    let country = state.service.country_by_identifier(&name).await?;
    Ok(Json(country))
}
