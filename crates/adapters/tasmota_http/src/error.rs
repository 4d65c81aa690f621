//! Tasmota driver error type.

/// Errors raised while talking to Tasmota devices.
#[derive(Debug, thiserror::Error)]
pub enum TasmotaError {
    /// The request could not be sent or its body read.
    #[error("HTTP request failed")]
    Http(#[from] reqwest::Error),

    /// The device answered with a non-success status.
    #[error("device returned HTTP {0}")]
    Status(u16),

    /// The device answered with an unexpected payload.
    #[error("unexpected response `{0}`")]
    UnexpectedResponse(String),

    /// No configured host answered during discovery.
    #[error("none of the {0} configured host(s) answered")]
    NoHostAnswered(usize),
}
