use std::net::SocketAddr;

use axum::middleware;
use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use city_business_map::{
    config::{Config, DatabaseConfig},
    db,
    middleware::rate_limit::{create_public_governor, log_request},
    routes, AppState,
};

#[tokio::main]
async fn main() {
    // Load configuration
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };

    // Initialize tracing
    let default_filter = if config.app.debug {
        "city_business_map=debug,tower_http=debug"
    } else {
        "city_business_map=info,tower_http=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        name = %config.app.name,
        version = %config.app.version,
        timezone = %config.app.timezone,
        "Starting server at {}",
        config.server_addr()
    );

    // Connect to database, if configured
    let db = match &config.database {
        Some(database) => open_storage(database).await,
        None => {
            tracing::info!("No database configured, serving sample data");
            None
        }
    };

    // Create app state
    let state = AppState::new(config.clone(), db).expect("Failed to build application state");

    let governor = create_public_governor(config.api.rate_limit_burst)
        .expect("Failed to configure rate limiting");

    // Create router with middleware
    let app = routes::create_router(state)
        .expect("Failed to build router")
        .layer(governor)
        .layer(middleware::from_fn(log_request))
        .layer(TraceLayer::new_for_http());

    // Start server with socket address for rate limiting
    let addr: SocketAddr = config.server_addr().parse().expect("Invalid address");
    let listener = TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Server listening on {}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .expect("Failed to start server");
}

/// Open the storage pool and run migrations. Any failure is logged and the
/// pool is still returned, so requests retry storage and fall back per query.
async fn open_storage(config: &DatabaseConfig) -> Option<DatabaseConnection> {
    let db = match db::connect(config).await {
        Ok(db) => db,
        Err(e) => {
            tracing::warn!(error = %e, "Storage disabled, serving sample data");
            return None;
        }
    };

    if config.run_migrations {
        match migration::Migrator::up(&db, None).await {
            Ok(()) => tracing::info!("Migrations complete"),
            Err(e) => tracing::warn!(error = %e, "Migrations failed, storage may be unavailable"),
        }
    }

    Some(db)
}
