use {
    tally_core::CounterRow,
    crate::store::{BoxedStore, TableStore, StoreError},
};

pub const COUNTER_PARTITION_KEY: &str = "counter";
pub const COUNTER_ROW_KEY: &str = "1";

/// Read-modify-write without a concurrency token: two concurrent calls can
/// observe the same count and one increment is lost. The store only
/// guarantees last-writer-wins on update.
pub fn increment(store: &BoxedStore) -> Result<u64, StoreError> {
    match store.fetch(COUNTER_PARTITION_KEY, COUNTER_ROW_KEY) {
        Ok(row) => {
            let new_count = row.count + 1;
            store.update(&row.with_count(new_count))?;
            Ok(new_count)
        },
        Err(StoreError::NotFound) => create_first_row(store),
        Err(err) => Err(err),
    }
}

fn create_first_row(store: &BoxedStore) -> Result<u64, StoreError> {
    match store.create(&CounterRow::new(COUNTER_PARTITION_KEY, COUNTER_ROW_KEY, 1)) {
        Ok(()) => Ok(1),
        Err(StoreError::AlreadyExists) => {
            // another request created the row between our fetch and create;
            // retry once as a plain increment of the winning row
            let row = store.fetch(COUNTER_PARTITION_KEY, COUNTER_ROW_KEY)?;
            let new_count = row.count + 1;
            store.update(&row.with_count(new_count))?;
            Ok(new_count)
        },
        Err(err) => Err(err),
    }
}
