use thiserror::Error;

/// Errors produced by the connection core.
#[derive(Error, Debug)]
pub enum ClientError {
    /// Storage failure on a required path.
    #[error("Store error: {0}")]
    Store(#[from] ircx_store::StoreError),

    /// Connection layer failure.
    #[error("{0}")]
    Net(#[from] ircx_net::NetError),

    /// A `/server` command that cannot be resolved to a dialable target.
    #[error("{0}")]
    Command(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ClientError>;
