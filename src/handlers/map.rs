use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::client::controller::{marker_color, DEFAULT_MARKER_COLOR};
use crate::config::MapConfig;
use crate::entities::BusinessType;
use crate::error::{AppError, AppResult};
use crate::services::geocoding::UNKNOWN_CITY;
use crate::utils::cities::{self, Coordinate, DEFAULT_CITY, KNOWN_CITIES};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct CityInfo {
    pub name: &'static str,
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Serialize)]
pub struct BusinessTypeInfo {
    pub value: BusinessType,
    pub label: String,
    pub color: &'static str,
}

#[derive(Debug, Serialize)]
pub struct MapConfigResponse {
    pub app_name: String,
    pub map: MapConfig,
    pub default_city: &'static str,
    pub default_center: Coordinate,
    pub cities: Vec<CityInfo>,
    pub business_types: Vec<BusinessTypeInfo>,
    pub default_marker_color: &'static str,
}

/// Map defaults, known cities and marker palette for the client
pub async fn map_config(State(state): State<AppState>) -> Json<MapConfigResponse> {
    let known = KNOWN_CITIES
        .iter()
        .map(|&(name, coordinate)| CityInfo {
            name,
            lat: coordinate.lat,
            lng: coordinate.lng,
        })
        .collect();

    let business_types = BusinessType::ALL
        .into_iter()
        .map(|t| BusinessTypeInfo {
            value: t,
            label: t.label(),
            color: marker_color(t.as_str()),
        })
        .collect();

    Json(MapConfigResponse {
        app_name: state.config.app.name.clone(),
        map: state.config.map.clone(),
        default_city: DEFAULT_CITY,
        default_center: cities::DEFAULT_COORDINATE,
        cities: known,
        business_types,
        default_marker_color: DEFAULT_MARKER_COLOR,
    })
}

#[derive(Debug, Deserialize)]
pub struct LocateParams {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct LocateResponse {
    pub city: String,
    pub latitude: f64,
    pub longitude: f64,
    pub resolved: bool,
}

/// Resolve device coordinates to a city name
pub async fn locate(
    State(state): State<AppState>,
    params: Result<Query<LocateParams>, QueryRejection>,
) -> AppResult<Json<LocateResponse>> {
    let invalid = || AppError::BadRequest("Invalid coordinates".to_string());
    let Query(params) = params.map_err(|_| invalid())?;

    let position = match (params.lat, params.lng) {
        (Some(lat), Some(lng))
            if (-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lng) =>
        {
            Coordinate::new(lat, lng)
        }
        _ => return Err(invalid()),
    };

    let (city, resolved) = match state.resolver.resolve(position).await {
        Ok(city) => (city, true),
        Err(e) => {
            tracing::warn!(error = %e, lat = position.lat, lng = position.lng, "Reverse geocoding failed");
            (UNKNOWN_CITY.to_string(), false)
        }
    };

    Ok(Json(LocateResponse {
        city,
        latitude: position.lat,
        longitude: position.lng,
        resolved,
    }))
}
