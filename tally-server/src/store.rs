use {
    std::{collections::HashMap, sync::{Arc, Mutex}},
    thiserror::Error,
    rusqlite::Connection,
    tally_core::CounterRow,
};

/// Capability set the increment handler consumes. Implementations are a
/// pass-through to the backing table: no retries, batching or caching here.
pub trait TableStore {
    fn fetch(&self, partition_key: &str, row_key: &str) -> Result<CounterRow, StoreError>;
    fn create(&self, row: &CounterRow) -> Result<(), StoreError>;
    fn update(&self, row: &CounterRow) -> Result<(), StoreError>;
}

#[derive(Error, Debug, Eq, PartialEq)]
pub enum StoreError {
    /// No row matches the requested key pair. On update this means the row
    /// vanished between fetch and update.
    #[error("counter row not found")]
    NotFound,

    /// A row with the same key pair already exists. Callers must not use
    /// this as a concurrency-control primitive.
    #[error("counter row already exists")]
    AlreadyExists,

    /// Transport, auth or internal failure in the storage backend
    /// (similar to a 503 response in http).
    #[error("store unavailable: {reason}")]
    Unavailable { reason: String },
}

#[derive(Clone)]
pub struct SqliteStore {
    connection: Arc<Mutex<Connection>>,
}

#[derive(Error, Debug)]
pub enum SqliteStoreOpenError {
    #[error("failed to open connection: {0:?}")]
    ConnectionOpen(rusqlite::Error),

    #[error("failed to init counter table: {0:?}")]
    TableInit(rusqlite::Error),
}

impl SqliteStore {
    pub fn new(path: impl AsRef<std::path::Path>) -> Result<Self, SqliteStoreOpenError> {
        Self::from_connection(
            Connection::open(path)
                .map_err(|err| SqliteStoreOpenError::ConnectionOpen(err))?
        )
    }

    pub fn in_memory() -> Result<Self, SqliteStoreOpenError> {
        Self::from_connection(
            Connection::open_in_memory()
                .map_err(|err| SqliteStoreOpenError::ConnectionOpen(err))?
        )
    }

    fn from_connection(connection: Connection) -> Result<Self, SqliteStoreOpenError> {
        connection.execute("create table if not exists counter (partition_key text not null, row_key text not null, count integer not null, primary key (partition_key, row_key))", ())
            .map_err(|err| SqliteStoreOpenError::TableInit(err))?;
        Ok(Self { connection: Arc::new(Mutex::new(connection)) })
    }

    fn lock_connection(&self) -> Result<std::sync::MutexGuard<'_, Connection>, StoreError> {
        self.connection.lock()
            .map_err(|err| StoreError::Unavailable { reason: format!("failed to acquire sqlite connection: {err:?}") })
    }
}

impl TableStore for SqliteStore {
    fn fetch(&self, partition_key: &str, row_key: &str) -> Result<CounterRow, StoreError> {
        let connection = self.lock_connection()?;
        let mut stmt = connection.prepare("select count from counter where partition_key = ?1 and row_key = ?2")
            .map_err(|err| StoreError::Unavailable { reason: format!("failed to prepare sqlite query: {err:?}") })?;
        let mut rows = stmt.query((partition_key, row_key))
            .map_err(|err| StoreError::Unavailable { reason: format!("failed to run sqlite query: {err:?}") })?;

        let row = rows.next()
            .map_err(|err| StoreError::Unavailable { reason: format!("failed to read row from sqlite result: {err:?}") })?;
        match row {
            Some(row) => {
                let count: i64 = row.get(0)
                    .map_err(|err| StoreError::Unavailable { reason: format!("failed to decode sqlite result: {err:?}") })?;
                Ok(CounterRow::new(partition_key, row_key, count as u64))
            },
            None => Err(StoreError::NotFound),
        }
    }

    fn create(&self, row: &CounterRow) -> Result<(), StoreError> {
        let connection = self.lock_connection()?;
        let result = connection.execute(
            "insert into counter (partition_key, row_key, count) values (?1, ?2, ?3)",
            (&row.partition_key, &row.row_key, row.count as i64),
        );
        match result {
            Ok(_) => Ok(()),
            Err(rusqlite::Error::SqliteFailure(err, _)) if err.code == rusqlite::ErrorCode::ConstraintViolation => Err(StoreError::AlreadyExists),
            Err(err) => Err(StoreError::Unavailable { reason: format!("failed to execute sqlite insert: {err:?}") }),
        }
    }

    fn update(&self, row: &CounterRow) -> Result<(), StoreError> {
        let connection = self.lock_connection()?;
        let updated = connection.execute(
            "update counter set count = ?3 where partition_key = ?1 and row_key = ?2",
            (&row.partition_key, &row.row_key, row.count as i64),
        )
            .map_err(|err| StoreError::Unavailable { reason: format!("failed to execute sqlite update: {err:?}") })?;

        if updated == 0 {
            Err(StoreError::NotFound)
        } else {
            Ok(())
        }
    }
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    rows: Arc<Mutex<HashMap<(String, String), u64>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock_rows(&self) -> Result<std::sync::MutexGuard<'_, HashMap<(String, String), u64>>, StoreError> {
        self.rows.lock()
            .map_err(|err| StoreError::Unavailable { reason: format!("failed to lock rows: {err:?}") })
    }
}

impl TableStore for MemoryStore {
    fn fetch(&self, partition_key: &str, row_key: &str) -> Result<CounterRow, StoreError> {
        let rows = self.lock_rows()?;
        match rows.get(&(partition_key.to_owned(), row_key.to_owned())) {
            Some(count) => Ok(CounterRow::new(partition_key, row_key, *count)),
            None => Err(StoreError::NotFound),
        }
    }

    fn create(&self, row: &CounterRow) -> Result<(), StoreError> {
        let mut rows = self.lock_rows()?;
        let key = (row.partition_key.clone(), row.row_key.clone());
        if rows.contains_key(&key) {
            return Err(StoreError::AlreadyExists);
        }
        rows.insert(key, row.count);
        Ok(())
    }

    fn update(&self, row: &CounterRow) -> Result<(), StoreError> {
        let mut rows = self.lock_rows()?;
        match rows.get_mut(&(row.partition_key.clone(), row.row_key.clone())) {
            Some(count) => {
                *count = row.count;
                Ok(())
            },
            None => Err(StoreError::NotFound),
        }
    }
}

#[derive(Clone)]
pub struct BoxedStore {
    inner: Arc<Box<dyn TableStore + Send + Sync>>,
}

impl BoxedStore {
    pub fn new<T: TableStore + Send + Sync + 'static>(inner: T) -> Self {
        Self {
            inner: Arc::new(Box::new(inner)),
        }
    }
}

impl TableStore for BoxedStore {
    fn fetch(&self, partition_key: &str, row_key: &str) -> Result<CounterRow, StoreError> {
        self.inner.fetch(partition_key, row_key)
    }

    fn create(&self, row: &CounterRow) -> Result<(), StoreError> {
        self.inner.create(row)
    }

    fn update(&self, row: &CounterRow) -> Result<(), StoreError> {
        self.inner.update(row)
    }
}
