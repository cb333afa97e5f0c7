use std::path::Path;

use crate::config::Fetch;
use crate::error::AppResult;
use crate::model::{DbConnection, PgStore};
use crate::service::CourseService;

pub mod config;
pub use config::{Config, ConfigError, ConfigResult};

pub mod auth;
pub mod error;
pub mod model;
pub mod progress;
pub mod service;
pub mod utils;

static APPLICATION_NAME: &str = "pywhiz";

/// Connects to the store and brings its schema up to date.
pub async fn connect_store(database_uri: &str) -> AppResult<PgStore> {
    let db = DbConnection::connect(database_uri)?;
    db.migrate(Path::new("./migrations")).await?;
    Ok(PgStore::new(db))
}

pub fn build_service_with_store(store: PgStore, fetch: Fetch) -> CourseService<PgStore> {
    CourseService::new(store, fetch)
}

#[tracing::instrument]
pub async fn build_service() -> AppResult<CourseService<PgStore>> {
    let use_local = cfg!(debug_assertions);
    let config = Config::get_or_init(use_local).await;

    let store = connect_store(config.store().database_uri()).await?;
    Ok(build_service_with_store(store, config.fetch().clone()))
}

pub fn setup_trace() {
    use tracing_error::ErrorLayer;
    use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

    // load .env file for RUST_LOG etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .with(ErrorLayer::default())
        .init();

    tracing::debug!("tracing initialized.");
}
