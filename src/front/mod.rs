pub mod community;
pub mod financial;
pub mod format;
pub mod maintenance;
pub mod message;
pub mod template;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use anyhow::Context;
use axum::{response::Redirect, routing::get, Router};
use tower_http::services::ServeDir;

use crate::{config::AppConfig, store::Store};

/// Per-request handles. Nothing here holds page data; every handler
/// reads what it shows from the store.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub t: template::Template,
}

pub fn new_router(state: AppState, public_dir: &str) -> Router {
    Router::new()
        .route("/", get(|| async { Redirect::to("/financial") }))
        .merge(financial::new_router())
        .merge(maintenance::new_router())
        .merge(community::new_router())
        .nest_service("/public", ServeDir::new(public_dir))
        .with_state(state)
}

pub async fn start_web_server(store: Arc<dyn Store>, config: &AppConfig) -> anyhow::Result<()> {
    log::info!("loading templates from {}", config.paths.templates);
    let t = template::Template::new(&config.paths.templates, config.server.dev_templates)?;

    let app = new_router(AppState { store, t }, &config.paths.public);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {}", addr))?;
    log::info!("open website at http://{}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}
