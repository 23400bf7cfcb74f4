mod config;
mod front;
mod ledger;
mod migration;
mod models;
mod store;

use std::sync::Arc;

use env_logger::Env;
use sqlx::postgres::PgPoolOptions;

use crate::store::{MemoryStore, PgStore, Store};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::try_init_from_env(Env::default().default_filter_or("stratasphere=info"))?;

    let config = config::AppConfig::load()?;

    let store: Arc<dyn Store> = match &config.database.url {
        Some(url) => {
            let pool = PgPoolOptions::new()
                .max_connections(config.database.max_connections)
                .connect(url)
                .await?;
            migration::migrate(&pool, &config.paths.migrations).await?;
            Arc::new(PgStore::new(pool))
        }
        None => {
            log::warn!("no database url configured, serving the seeded in-memory ledger");
            Arc::new(MemoryStore::seeded())
        }
    };

    front::start_web_server(store, &config).await
}
