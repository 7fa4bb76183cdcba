use std::future::Future;
use std::time::Duration;

use sea_orm::{
    ColumnTrait, ConnectOptions, Database, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect,
};

use crate::config::DatabaseConfig;
use crate::entities::{business, Business, BusinessType};
use crate::error::{AppResult, StorageError};

/// Build a lazily connected pool. No connection is attempted until the first
/// query, so an unreachable server surfaces per request.
pub async fn connect(config: &DatabaseConfig) -> AppResult<DatabaseConnection> {
    let mut options = ConnectOptions::new(config.connection_url()?);
    options
        .connect_lazy(true)
        .connect_timeout(config.timeout)
        .acquire_timeout(config.timeout)
        .sqlx_logging(false);

    Ok(Database::connect(options).await?)
}

/// Run a storage call, giving up after `timeout`.
async fn bounded<T>(
    timeout: Duration,
    call: impl Future<Output = Result<T, DbErr>>,
) -> Result<T, StorageError> {
    tokio::time::timeout(timeout, call)
        .await
        .map_err(|_| StorageError::Timeout(timeout))?
        .map_err(StorageError::from)
}

/// Businesses in `city`, optionally of one type, in ascending id order.
pub async fn find_businesses(
    db: &DatabaseConnection,
    city: &str,
    business_type: Option<BusinessType>,
    limit: u64,
    timeout: Duration,
) -> Result<Vec<Business>, StorageError> {
    let mut query = business::Entity::find().filter(business::Column::City.eq(city));
    if let Some(business_type) = business_type {
        query = query.filter(business::Column::BusinessType.eq(business_type));
    }

    bounded(
        timeout,
        query
            .order_by_asc(business::Column::Id)
            .limit(limit)
            .all(db),
    )
    .await
}

pub async fn count_businesses(
    db: &DatabaseConnection,
    timeout: Duration,
) -> Result<u64, StorageError> {
    bounded(timeout, business::Entity::find().count(db)).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[tokio::test]
    async fn test_bounded_times_out() {
        let result = bounded(
            Duration::from_millis(20),
            std::future::pending::<Result<u64, DbErr>>(),
        )
        .await;

        assert!(matches!(result, Err(StorageError::Timeout(t)) if t == Duration::from_millis(20)));
    }

    #[tokio::test]
    async fn test_bounded_passes_through_errors() {
        let result = bounded(Duration::from_secs(1), async {
            Err::<u64, _>(DbErr::Custom("Access denied".to_string()))
        })
        .await;

        assert!(matches!(result, Err(StorageError::Query(_))));
    }

    #[tokio::test]
    async fn test_connect_is_lazy() {
        // Nothing listens on this address; a lazy pool must still be built
        let config = Config::from_lookup(|key| match key {
            "DATABASE_URL" => Some("mysql://root@127.0.0.1:1/businesses".to_string()),
            _ => None,
        })
        .unwrap();

        assert!(connect(config.database.as_ref().unwrap()).await.is_ok());
    }
}
