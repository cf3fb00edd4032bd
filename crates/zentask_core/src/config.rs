//! Process configuration read once at startup.
//!
//! # Responsibility
//! - Resolve backend selection and credentials from the environment.
//! - Construct store and advisor instances from explicit configuration,
//!   never from ambient globals at call sites.
//!
//! # Invariants
//! - The remote backend requires both URL and API key; a partial remote
//!   configuration is rejected before any store is built.
//! - A missing advisor credential short-circuits to the unconfigured
//!   advisor; no network client is created.

use crate::advisor::gemini::GeminiModel;
use crate::advisor::TaskAdvisor;
use crate::store::local::LocalJsonStore;
use crate::store::remote::RemoteTableStore;
use crate::store::TaskStore;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::sync::Arc;

const ENV_BACKEND: &str = "ZENTASK_BACKEND";
const ENV_DATA_DIR: &str = "ZENTASK_DATA_DIR";
const ENV_REMOTE_URL: &str = "ZENTASK_REMOTE_URL";
const ENV_REMOTE_API_KEY: &str = "ZENTASK_REMOTE_API_KEY";
const ENV_GEMINI_API_KEY: &str = "GEMINI_API_KEY";
const ENV_LOG_LEVEL: &str = "ZENTASK_LOG_LEVEL";
const ENV_LOG_DIR: &str = "ZENTASK_LOG_DIR";

const DEFAULT_DATA_DIR_NAME: &str = ".zentask";

/// Which store backend the process runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Local,
    Remote,
}

/// Startup configuration failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidBackend(String),
    MissingRemoteUrl,
    MissingRemoteApiKey,
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidBackend(value) => write!(
                f,
                "unsupported {ENV_BACKEND} value `{value}`; expected local|remote"
            ),
            Self::MissingRemoteUrl => {
                write!(f, "{ENV_REMOTE_URL} is required when backend is remote")
            }
            Self::MissingRemoteApiKey => {
                write!(f, "{ENV_REMOTE_API_KEY} is required when backend is remote")
            }
        }
    }
}

impl Error for ConfigError {}

/// Resolved process configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub backend: BackendKind,
    pub data_dir: PathBuf,
    pub remote_url: Option<String>,
    pub remote_api_key: Option<String>,
    pub gemini_api_key: Option<String>,
    pub log_level: Option<String>,
    pub log_dir: Option<PathBuf>,
}

fn env_non_empty(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

impl AppConfig {
    /// Reads configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let backend = match env_non_empty(ENV_BACKEND) {
            None => BackendKind::Local,
            Some(value) => match value.to_ascii_lowercase().as_str() {
                "local" => BackendKind::Local,
                "remote" => BackendKind::Remote,
                _ => return Err(ConfigError::InvalidBackend(value)),
            },
        };

        let remote_url = env_non_empty(ENV_REMOTE_URL);
        let remote_api_key = env_non_empty(ENV_REMOTE_API_KEY);
        if backend == BackendKind::Remote {
            if remote_url.is_none() {
                return Err(ConfigError::MissingRemoteUrl);
            }
            if remote_api_key.is_none() {
                return Err(ConfigError::MissingRemoteApiKey);
            }
        }

        let data_dir = env_non_empty(ENV_DATA_DIR).map(PathBuf::from).unwrap_or_else(|| {
            env_non_empty("HOME")
                .map(|home| PathBuf::from(home).join(DEFAULT_DATA_DIR_NAME))
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR_NAME))
        });

        Ok(Self {
            backend,
            data_dir,
            remote_url,
            remote_api_key,
            gemini_api_key: env_non_empty(ENV_GEMINI_API_KEY),
            log_level: env_non_empty(ENV_LOG_LEVEL),
            log_dir: env_non_empty(ENV_LOG_DIR).map(PathBuf::from),
        })
    }

    /// Builds the configured store backend.
    ///
    /// # Contract
    /// - Remote credentials were validated in `from_env`; calling this on a
    ///   hand-built partial remote config falls back to the local store.
    pub fn build_store(&self) -> Arc<dyn TaskStore> {
        match (self.backend, &self.remote_url, &self.remote_api_key) {
            (BackendKind::Remote, Some(url), Some(api_key)) => {
                Arc::new(RemoteTableStore::new(url.clone(), api_key.clone()))
            }
            _ => Arc::new(LocalJsonStore::new(&self.data_dir)),
        }
    }

    /// Builds the advisor; absent credential yields the unconfigured one.
    pub fn build_advisor(&self) -> TaskAdvisor {
        match &self.gemini_api_key {
            Some(api_key) => TaskAdvisor::new(Some(Arc::new(GeminiModel::new(api_key.clone())))),
            None => TaskAdvisor::unconfigured(),
        }
    }
}
