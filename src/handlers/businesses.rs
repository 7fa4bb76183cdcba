use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};
use serde::Deserialize;

use crate::entities::Business;
use crate::error::{AppError, AppResult};
use crate::services::businesses::{BusinessQuery, INVALID_CITY};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct BusinessParams {
    pub city: Option<String>,
    #[serde(rename = "type")]
    pub business_type: Option<String>,
}

/// List businesses in a city, optionally of one type
pub async fn list_businesses(
    State(state): State<AppState>,
    params: Result<Query<BusinessParams>, QueryRejection>,
) -> AppResult<Json<Vec<Business>>> {
    // Undecodable query strings (repeated keys, bad escapes) count as a bad city
    let Query(params) = params.map_err(|rejection| {
        tracing::debug!(error = %rejection, "Rejected business query string");
        AppError::BadRequest(INVALID_CITY.to_string())
    })?;
    let query = BusinessQuery::parse(params.city.as_deref(), params.business_type.as_deref())?;

    let (businesses, source) = state.businesses.search(&query).await;
    tracing::debug!(
        city = %query.city,
        business_type = ?query.business_type,
        count = businesses.len(),
        source = ?source,
        "Businesses listed"
    );

    Ok(Json(businesses))
}
