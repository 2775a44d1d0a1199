use std::sync::Arc;

use cache::{KvStore, ResponseCache};
use config::Config;
use database::CounterStore;
use engagement::Engagement;
use infrastructure::Upstreams;
use models::WorksCatalog;

pub mod cache;
pub mod config;
pub mod database;
pub mod engagement;
pub mod error;
pub mod infrastructure;
pub mod middleware;
pub mod models;
pub mod router;
pub mod routes;
pub mod utils;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub kv: Arc<dyn KvStore>,
    pub cache: ResponseCache,
    pub counters: Arc<dyn CounterStore>,
    pub engagement: Engagement,
    pub upstreams: Upstreams,
    pub works: Arc<WorksCatalog>,
}

impl AppState {
    pub fn new(
        config: Config,
        kv: Arc<dyn KvStore>,
        counters: Arc<dyn CounterStore>,
        upstreams: Upstreams,
        works: WorksCatalog,
    ) -> Self {
        Self {
            engagement: Engagement::new(kv.clone(), counters.clone(), config.cache.clone()),
            config: Arc::new(config),
            cache: ResponseCache::new(kv.clone()),
            kv,
            counters,
            upstreams,
            works: Arc::new(works),
        }
    }
}
