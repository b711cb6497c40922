use thiserror::Error;

#[derive(Debug, Error)]
pub enum DispatchError {
    /// The HTTP client could not be built.
    #[error("webhook client setup failed: {0}")]
    Client(#[source] reqwest::Error),

    /// Connect, TLS, timeout or body errors.
    #[error("webhook request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("webhook endpoint answered {0}")]
    Status(u16),
}
