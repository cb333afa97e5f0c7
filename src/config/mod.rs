use std::time::Duration;

use serde::Deserialize;

static CONFIG: OnceCell<Config> = OnceCell::const_new();

mod config_dir;
pub use config_dir::{find_config_file, find_config_file_in, read_config, read_config_at};

mod error;
pub use error::{ConfigError, ConfigResult};
use tokio::sync::OnceCell;

#[derive(Debug, Deserialize)]
pub struct Config {
    store: Store,
    auth: Auth,
    #[serde(default)]
    fetch: Fetch,
}

#[derive(Debug, Deserialize)]
pub struct Store {
    database_uri: String,
}

#[derive(Debug, Deserialize)]
pub struct Auth {
    jwt: String,
}

/// How catalog-wide progress is fetched from the store.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Fetch {
    max_concurrency: usize,
    retry_attempts: u32,
    retry_base_delay_ms: u64,
}

impl Default for Fetch {
    fn default() -> Self {
        Self {
            max_concurrency: 4,
            retry_attempts: 3,
            retry_base_delay_ms: 200,
        }
    }
}

impl Config {
    #[tracing::instrument]
    pub async fn get_or_init(use_local: bool) -> &'static Config {
        CONFIG
            .get_or_init(|| async {
                match Self::load(use_local) {
                    Ok(c) => c,
                    Err(e) => {
                        if !matches!(e, ConfigError::ConfigNotFound) {
                            crate::error::log_error(&e);
                        }
                        tracing::error!("Config not found.");
                        std::process::exit(1);
                    }
                }
            })
            .await
    }

    pub fn load(use_local: bool) -> ConfigResult<Self> {
        let bytes = read_config(use_local)?;
        Self::from_slice(&bytes)
    }

    pub fn from_slice(bytes: &[u8]) -> ConfigResult<Self> {
        let config: Self = toml::from_slice(bytes)?;
        Ok(config)
    }

    #[inline]
    pub fn store(&self) -> &Store {
        &self.store
    }

    #[inline]
    pub fn auth(&self) -> &Auth {
        &self.auth
    }

    #[inline]
    pub fn fetch(&self) -> &Fetch {
        &self.fetch
    }
}

impl Store {
    #[inline]
    pub fn database_uri(&self) -> &str {
        &self.database_uri
    }
}

impl Auth {
    #[inline]
    pub fn jwt(&self) -> &str {
        &self.jwt
    }
}

impl Fetch {
    pub fn new(max_concurrency: usize, retry_attempts: u32, retry_base_delay: Duration) -> Self {
        Self {
            max_concurrency,
            retry_attempts,
            retry_base_delay_ms: u64::try_from(retry_base_delay.as_millis()).unwrap_or(u64::MAX),
        }
    }

    /// Requests in flight at once, at least one.
    #[inline]
    pub fn max_concurrency(&self) -> usize {
        self.max_concurrency.max(1)
    }

    /// Tries per read, at least one.
    #[inline]
    pub fn retry_attempts(&self) -> u32 {
        self.retry_attempts.max(1)
    }

    #[inline]
    pub fn retry_base_delay(&self) -> Duration {
        Duration::from_millis(self.retry_base_delay_ms)
    }
}
