use std::net::{IpAddr, SocketAddr};
use std::path::Path;
use std::sync::Arc;

use portfolio_api::{
    AppState,
    cache::{KvStore, MemoryStore, RedisStore},
    config::Config,
    database::{CounterStore, MemoryCounterStore, PgCounterStore},
    infrastructure::Upstreams,
    models::WorksCatalog,
    router::build_router,
};
use sqlx::Executor;
use sqlx::postgres::PgPoolOptions;
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

async fn counter_store(config: &Config) -> Arc<dyn CounterStore> {
    let Some(database_url) = &config.database_url else {
        tracing::warn!("DATABASE_URL not set, counters are kept in memory");
        return Arc::new(MemoryCounterStore::new());
    };

    // 设置数据库连接池
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .after_connect(|conn, _meta| {
            Box::pin(async move {
                conn.execute("SET application_name = 'portfolio_api';")
                    .await?;
                Ok(())
            })
        })
        .connect(database_url)
        .await
        .expect("Failed to connect to Postgres");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run database migrations");

    Arc::new(PgCounterStore::new(pool))
}

fn kv_store(config: &Config) -> Arc<dyn KvStore> {
    match &config.redis_url {
        Some(url) => {
            let client = redis::Client::open(url.as_str()).expect("Failed to create Redis client");
            Arc::new(RedisStore::new(client))
        }
        None => {
            tracing::warn!("REDIS_URL not set, rate limits and caches are kept in memory");
            Arc::new(MemoryStore::new())
        }
    }
}

fn works_catalog(config: &Config) -> WorksCatalog {
    let Some(path) = &config.works_catalog_path else {
        return WorksCatalog::builtin();
    };
    match WorksCatalog::load(Path::new(path)) {
        Ok(catalog) => {
            tracing::info!("Loaded {} works from {}", catalog.all().len(), path);
            catalog
        }
        Err(e) => {
            tracing::error!("Failed to load works catalog {}: {}, using built-in catalog", path, e);
            WorksCatalog::builtin()
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("Shutdown signal received");
}

#[tokio::main]
async fn main() {
    // 初始化日志
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 加载配置
    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!("Running in {} mode", config.environment.as_str());

    let counters = counter_store(&config).await;
    let kv = kv_store(&config);
    let works = works_catalog(&config);
    let upstreams = Upstreams::from_config(&config, reqwest::Client::new());

    let addr = SocketAddr::new(
        config.server_host.parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid server_host, falling back to dual-stack default");
            IpAddr::V6(std::net::Ipv6Addr::UNSPECIFIED)
        }),
        config.server_port,
    );

    let state = AppState::new(config, kv, counters, upstreams, works);
    let app = build_router(state);

    // 启动服务器
    tracing::info!("Server listening on {}", addr);
    axum::serve(
        tokio::net::TcpListener::bind(&addr)
            .await
            .expect("Failed to bind"),
        app,
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .expect("Failed to start server");
}
