//! Error types for the tree and its store seam.

/// Errors surfaced by tree construction and by record stores.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A record key that cannot be placed in the tree.
    #[error("invalid key: {message}")]
    InvalidKey { message: String },

    /// The store failed to list records (transport failure, timeout, bad
    /// response). Passed through untouched; nothing here retries.
    #[error("fetch failed: {0}")]
    Fetch(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The store failed to apply a put or delete.
    #[error("store update failed: {0}")]
    Store(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// A store client was configured with unusable settings.
    #[error("invalid configuration: {message}")]
    Config { message: String },
}

impl Error {
    /// Shorthand for an `InvalidKey` error.
    pub fn invalid_key(message: impl Into<String>) -> Self {
        Error::InvalidKey {
            message: message.into(),
        }
    }

    /// Wrap a store's listing failure.
    pub fn fetch(source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Error::Fetch(source.into())
    }

    /// Wrap a store's mutation failure.
    pub fn store(source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Error::Store(source.into())
    }

    /// Shorthand for a `Config` error.
    pub fn config(message: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
        }
    }
}
