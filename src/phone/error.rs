use thiserror::Error;

/// Failures from the device communication layer.
#[derive(Debug, Error)]
pub enum PhoneError {
    #[error("no device connected")]
    NotConnected,

    #[error("device refused the connection password")]
    AuthRefused,

    #[error("device i/o: {0}")]
    Io(#[from] std::io::Error),

    #[error("connection info: {0}")]
    ConnInfo(#[from] synce_conninfo::ConnInfoError),

    /// The device answered, but not in a shape we understand.
    #[error("malformed device reply: {0}")]
    Protocol(String),

    /// The device executed the call and reported failure.
    #[error("device call failed (HRESULT {0:#010x})")]
    Remote(u32),

    #[error("install failed: {0}")]
    Install(String),
}
