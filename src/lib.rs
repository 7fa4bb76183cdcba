pub mod client;
pub mod config;
pub mod db;
pub mod entities;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod utils;

use std::sync::Arc;

use sea_orm::DatabaseConnection;

use services::businesses::BusinessService;
use services::geocoding::{CityResolver, NominatimResolver};

pub use config::Config;
pub use error::{AppError, AppResult};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub businesses: BusinessService,
    pub resolver: Arc<dyn CityResolver>,
}

impl AppState {
    /// `db` is `None` when storage is not configured.
    pub fn new(config: Config, db: Option<DatabaseConnection>) -> AppResult<Self> {
        let resolver = NominatimResolver::new(&config.geocoding)
            .map_err(|e| AppError::Config(format!("Failed to build geocoding client: {}", e)))?;

        Ok(Self::with_resolver(config, db, Arc::new(resolver)))
    }

    pub fn with_resolver(
        config: Config,
        db: Option<DatabaseConnection>,
        resolver: Arc<dyn CityResolver>,
    ) -> Self {
        Self {
            businesses: BusinessService::new(db, &config),
            config: Arc::new(config),
            resolver,
        }
    }
}
