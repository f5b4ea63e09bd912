//! # Kuna Exchange Client
//!
//! Client for the Kuna cryptocurrency exchange REST API v2.
//!
//! ## Architecture
//!
//! - **monoio-based HTTP client** - single-threaded async, rustls for TLS
//! - **Request signing** - HMAC-SHA256 over `METHOD|/api/v2/path|query`
//! - **Fixed-point arithmetic** - order volumes and prices keep their exact text
//! - **Pluggable transport** - the REST client talks to an [`HttpTransport`]

pub mod errors;
pub mod http;
pub mod kuna;
pub mod traits;
pub mod types;

// Re-export main types
pub use errors::{ExchangeError, Result};
pub use http::{HttpRequest, HttpResponse, MonoioHttpsClient};
pub use kuna::{KunaConfig, KunaEndpoints, KunaRestClient, KunaSigner};
pub use traits::HttpTransport;
pub use types::*;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::errors::{ExchangeError, Result};
    pub use crate::http::{HttpRequest, HttpResponse, MonoioHttpsClient};
    pub use crate::kuna::{ApiRequest, KunaConfig, KunaCredentials, KunaEndpoints, KunaRestClient, KunaSigner, MARKET_BTCUAH};
    pub use crate::params;
    pub use crate::traits::HttpTransport;
    pub use crate::types::*;
    pub use kuna_core::prelude::*;
}
