use product_api::app::{self, product::handler::AppState};
use product_api::infrastructure::config::{AppConfig, ConfigError, StorageBackend};
use product_api::infrastructure::logger::Logger;
use product_api::{MemoryGateway, ProductGateway};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    Logger::init(&config.logging);

    let gateway = build_gateway(&config).await.map_err(|e| {
        error!("Failed to initialize storage: {}", e);
        e
    })?;
    info!(backend = gateway.backend(), "storage ready");

    let app = app::router(AppState::new(gateway), &config.server);

    let listener = TcpListener::bind(config.server.address()).await?;
    info!("Server running on http://{}", listener.local_addr()?);
    info!("   GET    /api/v1/products");
    info!("   GET    /api/v1/products/:id");
    info!("   POST   /api/v1/products");
    info!("   PUT    /api/v1/products/:id");
    info!("   DELETE /api/v1/products/:id");

    axum::serve(listener, app).await?;

    Ok(())
}

async fn build_gateway(
    config: &AppConfig,
) -> Result<Arc<dyn ProductGateway>, Box<dyn std::error::Error>> {
    match config.resolved_backend()? {
        StorageBackend::Postgres => connect_postgres(config).await,
        _ => {
            let gateway = if config.storage.seed_demo_data {
                MemoryGateway::with_demo_data()
            } else {
                MemoryGateway::new()
            };
            Ok(Arc::new(gateway))
        }
    }
}

#[cfg(feature = "database")]
async fn connect_postgres(
    config: &AppConfig,
) -> Result<Arc<dyn ProductGateway>, Box<dyn std::error::Error>> {
    use product_api::infrastructure::database::DatabaseManager;
    use product_api::RelationalGateway;

    let url = config
        .database
        .url
        .as_deref()
        .ok_or_else(|| ConfigError::Validation("postgres backend requires database.url".into()))?;

    info!("Connecting to database: {}", redact(url));
    let manager = DatabaseManager::new(url, &config.database).await?;
    Ok(Arc::new(RelationalGateway::new(Arc::new(manager.driver()))))
}

#[cfg(not(feature = "database"))]
async fn connect_postgres(
    _config: &AppConfig,
) -> Result<Arc<dyn ProductGateway>, Box<dyn std::error::Error>> {
    Err(ConfigError::Validation("built without the `database` feature".into()).into())
}

/// 隐藏连接串中的密码
#[cfg_attr(not(feature = "database"), allow(dead_code))]
fn redact(url: &str) -> String {
    match (url.find("://"), url.rfind('@')) {
        (Some(scheme), Some(at)) if at > scheme => {
            let credentials = &url[scheme + 3..at];
            match credentials.find(':') {
                Some(colon) => format!("{}:***{}", &url[..scheme + 3 + colon], &url[at..]),
                None => url.to_string(),
            }
        }
        _ => url.to_string(),
    }
}
