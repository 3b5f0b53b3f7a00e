use thiserror::Error;

/// Result type for catalog and content operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// The asset store has no entry under the requested filename.
    #[error("asset '{0}' is not present in the data store")]
    AssetMissing(String),

    /// A catalog document exists but is not valid JSON for its schema.
    #[error("malformed catalog document '{file}': {source}")]
    Parse {
        file: &'static str,
        source: serde_json::Error,
    },

    /// A queried license info does not exactly match any catalog entry.
    #[error("no catalog entry matches the given license info")]
    NotFound,

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
