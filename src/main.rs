use anyhow::Context;
use gcash_payments::{
    api::{self, AppState},
    claims::JsonFileStore,
    config::{Config, ConfigProvider, JsonConfigProvider},
    payments::{providers::UispClientConfig, BillingApi, UispClient},
    session::{InMemorySessionStore, SessionStore},
    workflow::{ClaimWorkflow, Clock, ReviewWorkflow, SystemClock},
};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var("LOG_FORMAT")
        .map(|format| format.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[cfg(feature = "cache")]
async fn session_store(config: &Config) -> anyhow::Result<Arc<dyn SessionStore>> {
    use gcash_payments::session::{RedisSessionConfig, RedisSessionStore};

    let Some(redis_url) = &config.session.redis_url else {
        return Ok(Arc::new(InMemorySessionStore::new(config.session.ttl)));
    };

    let store = RedisSessionStore::connect(RedisSessionConfig {
        redis_url: redis_url.clone(),
        ttl: config.session.ttl,
        ..Default::default()
    })
    .await
    .context("Failed to connect Redis session store")?;
    Ok(Arc::new(store))
}

#[cfg(not(feature = "cache"))]
async fn session_store(config: &Config) -> anyhow::Result<Arc<dyn SessionStore>> {
    if config.session.redis_url.is_some() {
        tracing::warn!("REDIS_URL is set but the cache feature is disabled; using in-memory sessions");
    }
    Ok(Arc::new(InMemorySessionStore::new(config.session.ttl)))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    init_logging();

    let config = Config::from_env()?;

    tracing::info!("Starting GCash payments service");
    tracing::info!("Environment: {}", config.server.environment);
    tracing::info!("UISP API: {}", config.uisp.api_url);
    tracing::info!("Data directory: {}", config.storage.data_dir.display());

    let repository = Arc::new(JsonFileStore::in_dir(&config.storage.data_dir));
    let billing: Arc<dyn BillingApi> = Arc::new(
        UispClient::new(UispClientConfig::from(&config.uisp))
            .context("Failed to create UISP client")?,
    );
    let plugin_config: Arc<dyn ConfigProvider> =
        Arc::new(JsonConfigProvider::new(&config.storage.plugin_config_path));
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let sessions = session_store(&config).await?;

    let state = AppState {
        claims: Arc::new(ClaimWorkflow::new(
            repository.clone(),
            billing.clone(),
            sessions,
            plugin_config.clone(),
            clock.clone(),
        )),
        reviews: Arc::new(ReviewWorkflow::new(
            repository,
            billing,
            plugin_config.clone(),
            clock,
        )),
        plugin_config,
        environment: config.server.environment.clone(),
        billing_api_url: config.uisp.api_url.clone(),
    };

    let app = api::router(state);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("HOST and PORT must form a socket address")?;
    tracing::info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
