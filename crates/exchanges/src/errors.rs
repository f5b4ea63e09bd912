//! Error types for the Kuna client
//!
//! Every failure is returned to the immediate caller. Transport failures
//! and payload failures stay distinct variants so callers can tell a dead
//! connection from a server that answered with something unusable.

use thiserror::Error;

/// Result type for exchange operations
pub type Result<T> = std::result::Result<T, ExchangeError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExchangeError {
    /// Signing requested while the public or secret key is unset or empty
    #[error("Missing credentials: {0}")]
    MissingCredentials(String),

    /// HTTP method other than GET or POST
    #[error("Invalid method - '{0}'")]
    InvalidMethod(String),

    /// Order side other than buy or sell
    #[error("Invalid order side - '{0}'")]
    InvalidSide(String),

    /// Connection, TLS or IO failure while talking to the server
    #[error("Transport error{}: {message}, url: {url}", .code.map(|c| format!(" ({c})")).unwrap_or_default())]
    Transport {
        /// OS error code, when the failure came from the OS
        code: Option<i32>,
        message: String,
        url: String,
    },

    /// The configured per-call timeout elapsed
    #[error("Timeout after {secs}s, url: {url}")]
    Timeout { secs: u64, url: String },

    /// Transport succeeded but the body was empty
    #[error("Content is empty, url: {url}")]
    EmptyResponse { url: String },

    /// Body present but not the expected JSON
    #[error("JSON decode failed: {message}, content: {body}")]
    DecodeError { message: String, body: String },

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Signing error: {0}")]
    SigningError(String),

    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("Fixed point error: {0}")]
    FixedPointError(String),
}

impl ExchangeError {
    /// Build a transport error from an IO error, keeping the OS code
    pub fn transport(err: &std::io::Error, context: &str, url: &str) -> Self {
        Self::Transport {
            code: err.raw_os_error(),
            message: format!("{context}: {err}"),
            url: url.to_string(),
        }
    }

    /// Transport-level failure (connection, TLS, IO or timeout)
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. } | Self::Timeout { .. })
    }

    /// Failure raised before any network traffic
    pub fn is_request_error(&self) -> bool {
        matches!(
            self,
            Self::MissingCredentials(_)
                | Self::InvalidMethod(_)
                | Self::InvalidSide(_)
                | Self::InvalidUrl(_)
                | Self::SigningError(_)
                | Self::ConfigurationError(_)
                | Self::FixedPointError(_)
        )
    }
}

impl From<kuna_core::FixedError> for ExchangeError {
    fn from(err: kuna_core::FixedError) -> Self {
        Self::FixedPointError(err.to_string())
    }
}

impl From<url::ParseError> for ExchangeError {
    fn from(err: url::ParseError) -> Self {
        Self::InvalidUrl(err.to_string())
    }
}
