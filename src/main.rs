use carelink::api::build_router;
use carelink::config::CONFIG;
use carelink::core::services::CareLinkService;
use carelink::infrastructure::storage::sqlite::SqliteStorage;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&CONFIG.log_level).unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    info!("Starting with {:?}", *CONFIG);

    let storage = SqliteStorage::connect(&CONFIG.database_url).await?;
    let service = Arc::new(
        CareLinkService::new(Arc::new(storage), CONFIG.jwt_secret.clone(), CONFIG.jwt_expiry_hours)
            .with_password_cost(CONFIG.bcrypt_cost),
    );
    let app = build_router(service);

    // Start server
    let addr = SocketAddr::from(([127, 0, 0, 1], CONFIG.port));
    info!("Server running at http://{}", addr);
    info!("Swagger UI at http://{}/swagger-ui", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
