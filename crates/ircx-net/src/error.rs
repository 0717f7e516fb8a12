use thiserror::Error;

/// Errors produced by the connection layer.
#[derive(Error, Debug)]
pub enum NetError {
    /// The dial itself failed (DNS, refused, unreachable).
    #[error("Connection failed: {0}")]
    Connect(String),

    /// Generic I/O error on an established session.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The session never reached the registered state in time.
    #[error("Timed out waiting for registration")]
    RegistrationTimeout,

    /// The session task has terminated; its command channel is gone.
    #[error("Session closed")]
    SessionClosed,
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, NetError>;
