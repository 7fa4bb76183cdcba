use axum::http::{header, HeaderValue, Method};
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::error::{AppError, AppResult};

/// CORS for the public API: configured origin (`*` for any), `GET, POST,
/// OPTIONS`, and the `Content-Type` and `Authorization` headers.
pub fn cors_layer(origin: &str) -> AppResult<CorsLayer> {
    let allow_origin = if origin.trim() == "*" {
        AllowOrigin::any()
    } else {
        let value = HeaderValue::from_str(origin.trim())
            .map_err(|_| AppError::Config(format!("invalid CORS origin: {:?}", origin)))?;
        AllowOrigin::exact(value)
    };

    Ok(CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cors_origin() {
        assert!(cors_layer("*").is_ok());
        assert!(cors_layer("https://maps.example.co.zw").is_ok());
        assert!(cors_layer("bad\norigin").is_err());
    }
}
