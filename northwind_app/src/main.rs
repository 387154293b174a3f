use std::sync::Arc;

use northwind_suppliers::http::AppState;
use northwind_suppliers::infra::PostgresSupplierStore;
use northwind_suppliers::service::{DefaultSupplierService, SupplierService};

#[tokio::main]
async fn main() {
    let config = northwind::config::AppConfig::new(
        northwind::util::workspace_dir().join("configs"),
    )
    .expect("Failed to load config");

    northwind::trace::init(&config.trace)
        .expect("Failed to initialize tracing");

    tracing::info!("app config: {:?}", config);

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect(&config.database.url)
        .await
        .expect("Failed to connect to database");

    let service: Arc<dyn SupplierService> = Arc::new(
        DefaultSupplierService::new(pool, Arc::new(PostgresSupplierStore)),
    );

    let router = northwind_suppliers::http::router(AppState { service })
        .layer(axum::middleware::from_fn(
            northwind::http::middleware::response_mapper_layer,
        ))
        .layer(axum::middleware::from_fn(
            northwind::http::middleware::trace_layer,
        ));

    northwind::http::run(router, &config.server)
        .await
        .expect("http server failed");
}
