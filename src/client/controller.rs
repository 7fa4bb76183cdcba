use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;

use crate::client::source::{BusinessSource, SourceError};
use crate::config::MapConfig;
use crate::entities::{Business, BusinessType};
use crate::services::geocoding::{CityResolver, UNKNOWN_CITY};
use crate::services::sample;
use crate::utils::cities::{self, Coordinate, DEFAULT_CITY};

pub const DEFAULT_MARKER_COLOR: &str = "#007bff";

/// Zoom used after locating the device.
const LOCATED_ZOOM: u8 = 15;
/// Zoom used when a business is picked from the list.
const SELECTED_ZOOM: u8 = 16;

/// Marker colour for a raw type name; unrecognized names get the default.
pub fn marker_color(business_type: &str) -> &'static str {
    match business_type.parse::<BusinessType>() {
        Ok(BusinessType::Restaurant) => "#28a745",
        Ok(BusinessType::FastFood) => "#ffc107",
        Ok(BusinessType::Tourism) => "#dc3545",
        Err(_) => DEFAULT_MARKER_COLOR,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Viewport {
    pub center: Coordinate,
    pub zoom: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Popup {
    pub title: String,
    pub category: String,
    pub address: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub position: Coordinate,
    pub color: &'static str,
    pub popup: Popup,
    pub business: Business,
}

impl From<Business> for Marker {
    fn from(business: Business) -> Self {
        Self {
            position: Coordinate::new(business.latitude, business.longitude),
            color: marker_color(business.business_type.as_str()),
            popup: Popup {
                title: business.name.clone(),
                category: business.business_type.label(),
                address: business.address.clone(),
            },
            business,
        }
    }
}

/// Why the device position could not be read.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LocationError {
    #[error("Geolocation is not supported")]
    Unsupported,
    #[error("Location permission denied")]
    PermissionDenied,
    #[error("Location unavailable")]
    Unavailable,
    #[error("Timed out waiting for location")]
    Timeout,
}

/// A refresh in flight. Results are applied only if no newer refresh has
/// started since.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshTicket {
    sequence: u64,
    city: String,
    business_type: Option<BusinessType>,
}

impl RefreshTicket {
    pub fn city(&self) -> &str {
        &self.city
    }

    pub fn business_type(&self) -> Option<BusinessType> {
        self.business_type
    }
}

/// Map state behind the browser UI: selected city and filter, the marker set
/// and the viewport.
pub struct MapController<S> {
    source: S,
    map: MapConfig,
    city: String,
    type_filter: Option<BusinessType>,
    viewport: Viewport,
    markers: Vec<Marker>,
    user_position: Option<Coordinate>,
    last_error: Option<String>,
    sequence: u64,
    rng: StdRng,
}

impl<S: BusinessSource> MapController<S> {
    /// A controller centred on Bulawayo with no markers yet.
    pub fn new(source: S, map: &MapConfig) -> Self {
        Self {
            source,
            map: map.clone(),
            city: DEFAULT_CITY.to_string(),
            type_filter: None,
            viewport: Viewport {
                center: cities::DEFAULT_COORDINATE,
                zoom: map.default_zoom,
            },
            markers: Vec::new(),
            user_position: None,
            last_error: None,
            sequence: 0,
            rng: StdRng::from_entropy(),
        }
    }

    /// Seed the generator used for client-side sample data.
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    pub fn city(&self) -> &str {
        &self.city
    }

    pub fn type_filter(&self) -> Option<BusinessType> {
        self.type_filter
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub fn user_position(&self) -> Option<Coordinate> {
        self.user_position
    }

    /// The most recent user-visible error, if any.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn dismiss_error(&mut self) {
        self.last_error = None;
    }

    /// Load businesses for the starting city.
    pub async fn init(&mut self) {
        self.refresh().await;
    }

    pub fn begin_refresh(&mut self) -> RefreshTicket {
        self.sequence += 1;
        RefreshTicket {
            sequence: self.sequence,
            city: self.city.clone(),
            business_type: self.type_filter,
        }
    }

    /// Replace the markers with `result`. A failed fetch shows an error and
    /// falls back to locally generated sample data. Returns `false` when the
    /// ticket is stale and nothing was applied.
    pub fn complete_refresh(
        &mut self,
        ticket: RefreshTicket,
        result: Result<Vec<Business>, SourceError>,
    ) -> bool {
        if ticket.sequence != self.sequence {
            tracing::debug!(
                stale = ticket.sequence,
                current = self.sequence,
                "Dropping stale business response"
            );
            return false;
        }

        let businesses = match result {
            Ok(businesses) => {
                self.last_error = None;
                businesses
            }
            Err(e) => {
                tracing::warn!(error = %e, city = %ticket.city, "Failed to load businesses");
                self.last_error = Some(format!("Could not load businesses: {}", e));
                sample::generate(&ticket.city, ticket.business_type, &mut self.rng)
            }
        };

        self.markers = businesses.into_iter().map(Marker::from).collect();
        true
    }

    pub async fn refresh(&mut self) {
        let ticket = self.begin_refresh();
        let result = self
            .source
            .fetch(&ticket.city, ticket.business_type)
            .await;
        self.complete_refresh(ticket, result);
    }

    /// Switch to `city`. Blank input is ignored. Known cities recentre the map;
    /// the type filter is cleared.
    pub async fn set_city(&mut self, city: &str) -> bool {
        let city = city.trim();
        if city.is_empty() {
            return false;
        }

        self.city = city.to_string();
        if let Some(center) = cities::find(city) {
            self.viewport = Viewport {
                center,
                zoom: self.map.default_zoom,
            };
        }
        self.type_filter = None;
        self.markers.clear();
        self.refresh().await;
        true
    }

    pub async fn reset_to_default(&mut self) {
        self.set_city(DEFAULT_CITY).await;
    }

    pub async fn set_type_filter(&mut self, business_type: Option<BusinessType>) {
        self.type_filter = business_type;
        self.refresh().await;
    }

    /// Move to the device position, name the city via `resolver` and reload
    /// without a type filter.
    ///
    /// A position error leaves the map untouched; a resolver error falls back to
    /// "Unknown City". Both are reported through [`last_error`](Self::last_error).
    pub async fn locate(
        &mut self,
        position: Result<Coordinate, LocationError>,
        resolver: &dyn CityResolver,
    ) {
        let position = match position {
            Ok(position) => position,
            Err(e) => {
                tracing::warn!(error = %e, "Could not get device location");
                self.last_error = Some(format!("Could not get your location: {}", e));
                return;
            }
        };

        self.user_position = Some(position);
        self.viewport = Viewport {
            center: position,
            zoom: LOCATED_ZOOM.min(self.map.max_zoom),
        };

        let mut geocode_error = None;
        self.city = match resolver.resolve(position).await {
            Ok(city) => city,
            Err(e) => {
                tracing::warn!(error = %e, "Reverse geocoding failed");
                geocode_error = Some(format!("Could not determine your city: {}", e));
                UNKNOWN_CITY.to_string()
            }
        };
        self.type_filter = None;

        self.refresh().await;
        // Reported after the reload, which clears errors on success
        if geocode_error.is_some() {
            self.last_error = geocode_error;
        }
    }

    /// Centre the map on the marker at `index`.
    pub fn select(&mut self, index: usize) -> Option<&Marker> {
        let marker = self.markers.get(index)?;
        self.viewport = Viewport {
            center: marker.position,
            zoom: SELECTED_ZOOM.min(self.map.max_zoom),
        };
        Some(marker)
    }

    /// E.g. `5 businesses found in fast food`.
    pub fn counter_text(&self) -> String {
        let count = self.markers.len();
        let mut text = format!(
            "{} business{} found",
            count,
            if count == 1 { "" } else { "es" }
        );
        if let Some(business_type) = self.type_filter {
            text.push_str(&format!(" in {}", business_type.label()));
        }
        text
    }
}
