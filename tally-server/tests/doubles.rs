use {
    std::sync::{Arc, Mutex, atomic::{AtomicUsize, Ordering}},
    tally_core::CounterRow,
    tally_server::store::{TableStore, StoreError, BoxedStore},
};

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Call {
    Fetch,
    Create(CounterRow),
    Update(CounterRow),
}

/// Records every store operation while delegating to the wrapped store.
#[derive(Clone)]
pub struct RecordingStore {
    inner: BoxedStore,
    calls: Arc<Mutex<Vec<Call>>>,
}

impl RecordingStore {
    pub fn new(inner: BoxedStore) -> Self {
        Self {
            inner,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }
}

impl TableStore for RecordingStore {
    fn fetch(&self, partition_key: &str, row_key: &str) -> Result<CounterRow, StoreError> {
        self.calls.lock().unwrap().push(Call::Fetch);
        self.inner.fetch(partition_key, row_key)
    }

    fn create(&self, row: &CounterRow) -> Result<(), StoreError> {
        self.calls.lock().unwrap().push(Call::Create(row.clone()));
        self.inner.create(row)
    }

    fn update(&self, row: &CounterRow) -> Result<(), StoreError> {
        self.calls.lock().unwrap().push(Call::Update(row.clone()));
        self.inner.update(row)
    }
}

pub struct FailingStore;

impl TableStore for FailingStore {
    fn fetch(&self, _partition_key: &str, _row_key: &str) -> Result<CounterRow, StoreError> {
        Err(StoreError::Unavailable { reason: "injected transport failure".to_owned() })
    }

    fn create(&self, _row: &CounterRow) -> Result<(), StoreError> {
        Err(StoreError::Unavailable { reason: "injected transport failure".to_owned() })
    }

    fn update(&self, _row: &CounterRow) -> Result<(), StoreError> {
        Err(StoreError::Unavailable { reason: "injected transport failure".to_owned() })
    }
}

/// Simulates losing the first-visit create race: the first fetch reports
/// the row as missing even though a concurrent request has already created
/// it in the wrapped store, so the following create reports a conflict.
pub struct RacingStore {
    inner: BoxedStore,
    fetches: AtomicUsize,
}

impl RacingStore {
    pub fn new(inner: BoxedStore) -> Self {
        Self {
            inner,
            fetches: AtomicUsize::new(0),
        }
    }
}

impl TableStore for RacingStore {
    fn fetch(&self, partition_key: &str, row_key: &str) -> Result<CounterRow, StoreError> {
        if self.fetches.fetch_add(1, Ordering::SeqCst) == 0 {
            Err(StoreError::NotFound)
        } else {
            self.inner.fetch(partition_key, row_key)
        }
    }

    fn create(&self, _row: &CounterRow) -> Result<(), StoreError> {
        Err(StoreError::AlreadyExists)
    }

    fn update(&self, row: &CounterRow) -> Result<(), StoreError> {
        self.inner.update(row)
    }
}
