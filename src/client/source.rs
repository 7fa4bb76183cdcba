use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;

use crate::entities::{Business, BusinessType};
use crate::services::businesses::{BusinessQuery, BusinessService};

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("server rejected request ({status}): {message}")]
    Rejected { status: StatusCode, message: String },
    #[error("invalid request: {0}")]
    Invalid(String),
}

/// Anything that can answer a business lookup for the map.
#[async_trait]
pub trait BusinessSource: Send + Sync {
    async fn fetch(
        &self,
        city: &str,
        business_type: Option<BusinessType>,
    ) -> Result<Vec<Business>, SourceError>;
}

/// Calls the query service in-process.
#[async_trait]
impl BusinessSource for BusinessService {
    async fn fetch(
        &self,
        city: &str,
        business_type: Option<BusinessType>,
    ) -> Result<Vec<Business>, SourceError> {
        let business_type = business_type.as_ref().map(BusinessType::as_str);
        let query = BusinessQuery::parse(Some(city), business_type)
            .map_err(|e| SourceError::Invalid(e.to_string()))?;
        let (businesses, _) = self.search(&query).await;
        Ok(businesses)
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// Calls `GET /api/businesses` on a running server.
pub struct HttpBusinessSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpBusinessSource {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl BusinessSource for HttpBusinessSource {
    async fn fetch(
        &self,
        city: &str,
        business_type: Option<BusinessType>,
    ) -> Result<Vec<Business>, SourceError> {
        let mut params = vec![("city", city)];
        if let Some(business_type) = business_type {
            params.push(("type", business_type.as_str()));
        }

        let response = self
            .client
            .get(format!("{}/api/businesses", self.base_url))
            .query(&params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<ErrorBody>()
                .await
                .map(|body| body.error)
                .unwrap_or_else(|_| status.to_string());
            return Err(SourceError::Rejected { status, message });
        }

        Ok(response.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::services::businesses::INVALID_CITY;

    fn service() -> BusinessService {
        BusinessService::new(None, &Config::from_lookup(|_| None).unwrap())
    }

    #[tokio::test]
    async fn test_service_source_validates_city() {
        let too_long = "a".repeat(101);
        for city in ["", too_long.as_str()] {
            match service().fetch(city, None).await {
                Err(SourceError::Invalid(msg)) => assert_eq!(msg, INVALID_CITY),
                other => panic!("expected invalid request, got {:?}", other),
            }
        }
    }

    #[tokio::test]
    async fn test_service_source_answers_valid_city() {
        let businesses = service()
            .fetch("Harare", Some(BusinessType::Restaurant))
            .await
            .unwrap();

        assert_eq!(businesses.len(), 5);
        assert!(businesses.iter().all(|b| b.business_type == BusinessType::Restaurant));
    }
}
