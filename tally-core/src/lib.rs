use serde::{Serialize, Deserialize};

/// A single keyed record in the counter table. The two-part key follows the
/// partition key / row key scheme of the backing store; at most one row
/// exists per key pair.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct CounterRow {
    pub partition_key: String,
    pub row_key: String,
    pub count: u64,
}

impl CounterRow {
    pub fn new(partition_key: impl Into<String>, row_key: impl Into<String>, count: u64) -> Self {
        Self {
            partition_key: partition_key.into(),
            row_key: row_key.into(),
            count,
        }
    }

    pub fn with_count(mut self, count: u64) -> Self {
        self.count = count;
        self
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CountResponse {
    pub count: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
