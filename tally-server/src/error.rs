use {
    thiserror::Error,
    crate::store::StoreError,
};

#[derive(Error, Debug, Eq, PartialEq)]
pub enum TallyError {
    #[error("configuration error: {reason}")]
    ConfigurationError { reason: String },

    #[error("storage error: {error:?}")]
    StorageError { error: StoreError },
}
