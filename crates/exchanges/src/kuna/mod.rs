//! Kuna exchange integration
//!
//! REST API v2 client: public market data plus signed account and order
//! endpoints. Runs on monoio; callers without a runtime can drive calls
//! through `kuna_core::KunaRuntime::block_on`.

pub mod auth;
pub mod endpoints;
pub mod rest;

pub use auth::{build_query_string, normalize_path, KunaCredentials, KunaSigner, SignedRequest};
pub use endpoints::{ApiRequest, KunaEndpoints, MARKET_BTCUAH};
pub use rest::{KunaConfig, KunaRestClient};
