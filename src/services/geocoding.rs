use async_trait::async_trait;
use serde::Deserialize;

use crate::config::GeocodingConfig;
use crate::error::GeocodeError;
use crate::utils::cities::Coordinate;

pub const UNKNOWN_CITY: &str = "Unknown City";

/// Resolves device coordinates to a city name.
#[async_trait]
pub trait CityResolver: Send + Sync {
    async fn resolve(&self, position: Coordinate) -> Result<String, GeocodeError>;
}

#[derive(Debug, Default, Deserialize)]
pub struct ReverseResponse {
    pub address: Option<Address>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Address {
    pub city: Option<String>,
    pub town: Option<String>,
    pub village: Option<String>,
    pub county: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
}

/// Approximate bounds that override the geocoder's answer inside Zimbabwe:
/// (city, lat range, lng range).
const CITY_BOUNDS: [(&str, (f64, f64), (f64, f64)); 2] = [
    ("Bulawayo", (-20.2, -20.1), (28.5, 28.7)),
    ("Harare", (-17.9, -17.7), (31.0, 31.2)),
];

/// Pick a city name out of a reverse-geocoding address.
pub fn extract_city_name(address: &Address, position: Coordinate) -> String {
    let mut name = [
        &address.city,
        &address.town,
        &address.village,
        &address.county,
        &address.state,
    ]
    .into_iter()
    .flatten()
    .find(|n| !n.is_empty())
    .cloned()
    .unwrap_or_else(|| UNKNOWN_CITY.to_string());

    if address.country.as_deref() == Some("Zimbabwe") {
        let within = |(min, max): (f64, f64), v: f64| v >= min && v <= max;
        if let Some((city, _, _)) = CITY_BOUNDS
            .iter()
            .find(|(_, lat, lng)| within(*lat, position.lat) && within(*lng, position.lng))
        {
            name = city.to_string();
        }
    }

    name
}

/// Reverse geocoding against a Nominatim-compatible endpoint.
pub struct NominatimResolver {
    client: reqwest::Client,
    url: String,
}

impl NominatimResolver {
    pub fn new(config: &GeocodingConfig) -> Result<Self, GeocodeError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self {
            client,
            url: config.nominatim_url.clone(),
        })
    }
}

#[async_trait]
impl CityResolver for NominatimResolver {
    async fn resolve(&self, position: Coordinate) -> Result<String, GeocodeError> {
        let response = self
            .client
            .get(&self.url)
            .query(&[
                ("format", "json".to_string()),
                ("lat", position.lat.to_string()),
                ("lon", position.lng.to_string()),
                ("zoom", "10".to_string()),
                ("addressdetails", "1".to_string()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(GeocodeError::Status(response.status()));
        }

        let body: ReverseResponse = response.json().await?;
        let address = body.address.ok_or(GeocodeError::NoAddress)?;

        Ok(extract_city_name(&address, position))
    }
}
