use {
    std::{env, sync::Arc},
    once_cell::sync::OnceCell,
    crate::{
        store::{BoxedStore, MemoryStore, SqliteStore},
        error::TallyError,
    },
};

pub const ENV_STORAGE: &str = "TALLY_STORAGE";

/// The single connection-string-shaped configuration value. Supported
/// forms: `memory` and `sqlite:<path>`.
pub struct StoreConfig {
    connection_string: Option<String>,
}

impl StoreConfig {
    pub fn from_env() -> Self {
        Self { connection_string: env::var(ENV_STORAGE).ok() }
    }

    pub fn with_connection_string(connection_string: impl Into<String>) -> Self {
        Self { connection_string: Some(connection_string.into()) }
    }

    pub fn empty() -> Self {
        Self { connection_string: None }
    }

    pub fn connect(&self) -> Result<BoxedStore, TallyError> {
        let connection_string = match self.connection_string.as_ref() {
            Some(v) => v,
            None => return Err(TallyError::ConfigurationError { reason: format!("missing {ENV_STORAGE} environment variable") }),
        };

        if connection_string == "memory" {
            return Ok(BoxedStore::new(MemoryStore::new()));
        }

        match connection_string.split_once(':') {
            Some(("sqlite", path)) => Ok(BoxedStore::new(
                SqliteStore::new(path)
                    .map_err(|err| TallyError::ConfigurationError { reason: format!("failed to open sqlite store: {err:?}") })?
            )),
            _ => Err(TallyError::ConfigurationError { reason: format!("unknown storage driver in {ENV_STORAGE}: {connection_string:?}") }),
        }
    }
}

/// Lazily-initialized store handle shared by all requests. Initialization
/// failure is returned to the caller and retried on the next request; only
/// a successfully connected handle is cached.
#[derive(Clone)]
pub struct StoreProvider {
    config: Arc<StoreConfig>,
    store: Arc<OnceCell<BoxedStore>>,
}

impl StoreProvider {
    pub fn new(config: StoreConfig) -> Self {
        Self {
            config: Arc::new(config),
            store: Arc::new(OnceCell::new()),
        }
    }

    pub fn from_env() -> Self {
        Self::new(StoreConfig::from_env())
    }

    pub fn with_store(store: BoxedStore) -> Self {
        Self {
            config: Arc::new(StoreConfig::empty()),
            store: Arc::new(OnceCell::with_value(store)),
        }
    }

    pub fn get(&self) -> Result<BoxedStore, TallyError> {
        self.store.get_or_try_init(|| self.config.connect()).map(|store| store.clone())
    }
}
