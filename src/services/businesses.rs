use std::sync::Arc;
use std::time::Duration;

use sea_orm::DatabaseConnection;

use crate::config::Config;
use crate::db;
use crate::entities::{Business, BusinessType};
use crate::error::{AppError, AppResult, StorageError};
use crate::services::sample;

pub const INVALID_CITY: &str = "City parameter is required and must be valid";
pub const INVALID_TYPE: &str = "Invalid business type";

const MAX_CITY_CHARS: usize = 100;

/// A validated business lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusinessQuery {
    pub city: String,
    pub business_type: Option<BusinessType>,
}

impl BusinessQuery {
    /// Validate raw request parameters. The city is checked before the type, and
    /// an empty type means no filter.
    pub fn parse(city: Option<&str>, business_type: Option<&str>) -> AppResult<Self> {
        let city = city.unwrap_or_default();
        if city.is_empty() || city.chars().count() > MAX_CITY_CHARS {
            return Err(AppError::BadRequest(INVALID_CITY.to_string()));
        }

        let business_type = match business_type.unwrap_or_default() {
            "" => None,
            raw => Some(
                raw.parse()
                    .map_err(|_| AppError::BadRequest(INVALID_TYPE.to_string()))?,
            ),
        };

        Ok(Self {
            city: city.to_string(),
            business_type,
        })
    }
}

/// Where a result set came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Storage,
    Sample,
}

#[derive(Clone)]
pub struct BusinessService {
    db: Option<Arc<DatabaseConnection>>,
    max_results: u64,
    query_timeout: Duration,
}

impl BusinessService {
    pub fn new(db: Option<DatabaseConnection>, config: &Config) -> Self {
        Self {
            db: db.map(Arc::new),
            max_results: config.api.max_results,
            query_timeout: config
                .database
                .as_ref()
                .map(|d| d.timeout)
                .unwrap_or(Duration::from_secs(5)),
        }
    }

    pub fn storage(&self) -> Option<&DatabaseConnection> {
        self.db.as_deref()
    }

    pub fn query_timeout(&self) -> Duration {
        self.query_timeout
    }

    /// Look up businesses, falling back to sample data whenever storage cannot
    /// answer. Never fails.
    pub async fn search(&self, query: &BusinessQuery) -> (Vec<Business>, Source) {
        settle(query, self.from_storage(query).await)
    }

    async fn from_storage(&self, query: &BusinessQuery) -> Result<Vec<Business>, StorageError> {
        let db = self.db.as_deref().ok_or(StorageError::NotConfigured)?;

        db::find_businesses(
            db,
            &query.city,
            query.business_type,
            self.max_results,
            self.query_timeout,
        )
        .await
    }
}

fn settle(
    query: &BusinessQuery,
    stored: Result<Vec<Business>, StorageError>,
) -> (Vec<Business>, Source) {
    match stored {
        Ok(businesses) => (businesses, Source::Storage),
        Err(e) => {
            match &e {
                StorageError::NotConfigured => {
                    tracing::debug!(city = %query.city, "Storage not configured, serving sample data")
                }
                _ => {
                    tracing::warn!(error = %e, city = %query.city, "Storage lookup failed, serving sample data")
                }
            }
            (sample_businesses(query), Source::Sample)
        }
    }
}

fn sample_businesses(query: &BusinessQuery) -> Vec<Business> {
    sample::generate(&query.city, query.business_type, &mut rand::thread_rng())
}

#[cfg(test)]
mod tests {
    use sea_orm::{DatabaseBackend, DbErr, MockDatabase};

    use super::*;

    fn config() -> Config {
        Config::from_lookup(|_| None).unwrap()
    }

    fn stored(id: i32, name: &str, business_type: BusinessType) -> Business {
        Business {
            id,
            name: name.to_string(),
            latitude: -20.15,
            longitude: 28.58,
            business_type,
            city: "Bulawayo".to_string(),
            address: "Main Street".to_string(),
        }
    }

    #[test]
    fn test_parse_valid_query() {
        let query = BusinessQuery::parse(Some("Harare"), Some("tourism")).unwrap();
        assert_eq!(query.city, "Harare");
        assert_eq!(query.business_type, Some(BusinessType::Tourism));

        let query = BusinessQuery::parse(Some("Harare"), Some("")).unwrap();
        assert_eq!(query.business_type, None);

        let query = BusinessQuery::parse(Some("Harare"), None).unwrap();
        assert_eq!(query.business_type, None);
    }

    #[test]
    fn test_parse_rejects_bad_city() {
        let too_long = "x".repeat(101);
        for city in [None, Some(""), Some(too_long.as_str())] {
            match BusinessQuery::parse(city, None) {
                Err(AppError::BadRequest(msg)) => assert_eq!(msg, INVALID_CITY),
                other => panic!("expected bad request, got {:?}", other),
            }
        }

        let longest = "é".repeat(100);
        assert!(BusinessQuery::parse(Some(&longest), None).is_ok());
    }

    #[test]
    fn test_parse_rejects_bad_type() {
        match BusinessQuery::parse(Some("Bulawayo"), Some("invalid_type")) {
            Err(AppError::BadRequest(msg)) => assert_eq!(msg, INVALID_TYPE),
            other => panic!("expected bad request, got {:?}", other),
        }
    }

    #[test]
    fn test_city_is_checked_before_type() {
        match BusinessQuery::parse(Some(""), Some("invalid_type")) {
            Err(AppError::BadRequest(msg)) => assert_eq!(msg, INVALID_CITY),
            other => panic!("expected bad request, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_search_without_storage_uses_sample_data() {
        let service = BusinessService::new(None, &config());
        let query = BusinessQuery::parse(Some("Bulawayo"), Some("fast_food")).unwrap();

        let (businesses, source) = service.search(&query).await;

        assert_eq!(source, Source::Sample);
        assert_eq!(businesses.len(), 5);
        assert!(businesses.iter().all(|b| b.city == "Bulawayo"));
        assert!(businesses.iter().all(|b| b.business_type == BusinessType::FastFood));
    }

    #[tokio::test]
    async fn test_search_returns_stored_rows() {
        let rows = vec![
            stored(3, "Chicken Inn", BusinessType::FastFood),
            stored(9, "Pizza Inn", BusinessType::FastFood),
        ];
        let db = MockDatabase::new(DatabaseBackend::MySql)
            .append_query_results([rows.clone()])
            .into_connection();
        let service = BusinessService::new(Some(db), &config());
        let query = BusinessQuery::parse(Some("Bulawayo"), Some("fast_food")).unwrap();

        let (businesses, source) = service.search(&query).await;

        assert_eq!(source, Source::Storage);
        assert_eq!(businesses, rows);
    }

    #[tokio::test]
    async fn test_search_empty_storage_is_not_an_error() {
        let db = MockDatabase::new(DatabaseBackend::MySql)
            .append_query_results([Vec::<Business>::new()])
            .into_connection();
        let service = BusinessService::new(Some(db), &config());
        let query = BusinessQuery::parse(Some("Nowhere"), None).unwrap();

        let (businesses, source) = service.search(&query).await;

        assert_eq!(source, Source::Storage);
        assert!(businesses.is_empty());
    }

    #[tokio::test]
    async fn test_search_falls_back_on_query_error() {
        let db = MockDatabase::new(DatabaseBackend::MySql)
            .append_query_errors([DbErr::Custom("connection refused".to_string())])
            .into_connection();
        let service = BusinessService::new(Some(db), &config());
        let query = BusinessQuery::parse(Some("Harare"), Some("restaurant")).unwrap();

        let (businesses, source) = service.search(&query).await;

        assert_eq!(source, Source::Sample);
        assert_eq!(businesses.len(), 5);
        assert!(businesses.iter().all(|b| b.city == "Harare"));
    }

    #[test]
    fn test_timed_out_lookup_falls_back() {
        let query = BusinessQuery::parse(Some("Gweru"), Some("tourism")).unwrap();

        let (businesses, source) = settle(
            &query,
            Err(StorageError::Timeout(Duration::from_millis(50))),
        );

        assert_eq!(source, Source::Sample);
        assert_eq!(businesses.len(), 5);
        assert!(businesses.iter().all(|b| b.city == "Gweru"));
        assert!(businesses.iter().all(|b| b.business_type == BusinessType::Tourism));
    }

    #[tokio::test]
    async fn test_search_falls_back_when_storage_does_not_answer() {
        // Non-routable address: the lazy pool never gets a connection in time
        let config = Config::from_lookup(|key| match key {
            "DB_HOST" => Some("10.255.255.1".to_string()),
            _ => None,
        })
        .unwrap();
        let db = db::connect(config.database.as_ref().unwrap()).await.unwrap();
        let mut service = BusinessService::new(Some(db), &config);
        service.query_timeout = Duration::from_millis(50);
        let query = BusinessQuery::parse(Some("Mutare"), None).unwrap();

        let (businesses, source) = service.search(&query).await;

        assert_eq!(source, Source::Sample);
        assert_eq!(businesses.len(), 15);
    }
}
