//! Kuna authentication and request signing
//!
//! A private call is signed as follows:
//! - merge the caller's parameters with `tonce` (current ms timestamp) and
//!   `access_key` (public key); the generated values win on collision
//! - sort every key in ascending byte order
//! - form-urlencode the sorted pairs into `k=v&k2=v2`
//! - sign `METHOD|/api/v2/<path>|<query>` with HMAC-SHA256 keyed by the
//!   secret key, hex encoded
//! - send the sorted pairs followed by `signature`

use crate::errors::{ExchangeError, Result};
use crate::types::{HttpMethod, RequestParams};
use kuna_core::prelude::*;

use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::fmt;
use tracing::debug;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

type HmacSha256 = Hmac<Sha256>;

/// API base path every signed path is prefixed with
pub const DEFAULT_BASE_PATH: &str = "api/v2";

pub const TONCE_KEY: &str = "tonce";
pub const ACCESS_KEY: &str = "access_key";
pub const SIGNATURE_KEY: &str = "signature";

pub const PUBLIC_KEY_ENV: &str = "KUNA_PUBLIC_KEY";
pub const SECRET_KEY_ENV: &str = "KUNA_SECRET_KEY";

/// Kuna API key pair
#[derive(Clone, PartialEq, Eq)]
pub struct KunaCredentials {
    pub public_key: String,
    pub secret_key: String,
}

impl KunaCredentials {
    pub fn new(public_key: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            public_key: public_key.into(),
            secret_key: secret_key.into(),
        }
    }

    /// Load credentials from `KUNA_PUBLIC_KEY` / `KUNA_SECRET_KEY`
    pub fn from_env() -> Result<Self> {
        let public_key = std::env::var(PUBLIC_KEY_ENV)
            .map_err(|_| ExchangeError::MissingCredentials(PUBLIC_KEY_ENV.to_string()))?;
        let secret_key = std::env::var(SECRET_KEY_ENV)
            .map_err(|_| ExchangeError::MissingCredentials(SECRET_KEY_ENV.to_string()))?;

        let credentials = Self::new(public_key, secret_key);
        credentials.ensure_valid()?;
        Ok(credentials)
    }

    /// Both keys present and non-empty
    pub fn is_valid(&self) -> bool {
        !self.public_key.is_empty() && !self.secret_key.is_empty()
    }

    pub fn ensure_valid(&self) -> Result<()> {
        if self.public_key.is_empty() {
            return Err(ExchangeError::MissingCredentials("Public key not set".to_string()));
        }
        if self.secret_key.is_empty() {
            return Err(ExchangeError::MissingCredentials("Secret key not set".to_string()));
        }
        Ok(())
    }
}

impl fmt::Debug for KunaCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KunaCredentials")
            .field("public_key", &self.public_key)
            .field("secret_key", &"<redacted>")
            .finish()
    }
}

/// Kuna request signer.
///
/// Holds only immutable credentials; every call computes its own tonce and
/// signature, so one signer can serve any number of calls.
#[derive(Debug, Clone)]
pub struct KunaSigner {
    credentials: KunaCredentials,
    base_path: String,
}

impl KunaSigner {
    /// Fails with `MissingCredentials` when either key is empty
    pub fn new(credentials: KunaCredentials) -> Result<Self> {
        credentials.ensure_valid()?;

        Ok(Self {
            credentials,
            base_path: DEFAULT_BASE_PATH.to_string(),
        })
    }

    pub fn with_base_path(mut self, base_path: impl AsRef<str>) -> Self {
        self.base_path = base_path.as_ref().trim_matches('/').to_string();
        self
    }

    pub fn public_key(&self) -> &str {
        &self.credentials.public_key
    }

    /// Absolute path that goes into the sign string, e.g. `/api/v2/orders`
    pub fn full_path(&self, path: &str) -> String {
        let path = normalize_path(path);
        if self.base_path.is_empty() {
            format!("/{path}")
        } else {
            format!("/{}/{path}", self.base_path)
        }
    }

    /// Sign a request with a tonce read from the wall clock
    pub fn sign_request(
        &self,
        method: HttpMethod,
        path: &str,
        params: &RequestParams,
    ) -> Result<SignedRequest> {
        self.sign_request_at(method, path, params, millis())
    }

    /// Sign a request with an explicit tonce
    pub fn sign_request_at(
        &self,
        method: HttpMethod,
        path: &str,
        params: &RequestParams,
        tonce: u64,
    ) -> Result<SignedRequest> {
        let _timer = PerfTimer::start("kuna_sign_request");

        let mut signed_params: Vec<(String, String)> = params
            .iter()
            .filter(|(k, _)| !matches!(k.as_str(), TONCE_KEY | ACCESS_KEY | SIGNATURE_KEY))
            .map(|(k, v)| (k.clone(), v.to_string()))
            .collect();
        signed_params.push((TONCE_KEY.to_string(), tonce.to_string()));
        signed_params.push((ACCESS_KEY.to_string(), self.credentials.public_key.clone()));
        signed_params.sort_by(|(a, _), (b, _)| a.as_bytes().cmp(b.as_bytes()));

        let full_path = self.full_path(path);
        let query_string = build_query_string(&signed_params);
        let sign_string = format!("{}|{}|{}", method.as_str(), full_path, query_string);

        let signature = self.create_signature(&sign_string)?;
        signed_params.push((SIGNATURE_KEY.to_string(), signature.clone()));

        debug!("🔐 Signed request: {} {} (tonce {})", method, full_path, tonce);

        Ok(SignedRequest {
            method,
            path: full_path,
            tonce,
            sign_string,
            signature,
            params: signed_params,
        })
    }

    /// HMAC-SHA256 of `payload`, lowercase hex
    pub fn create_signature(&self, payload: &str) -> Result<String> {
        let mut mac = HmacSha256::new_from_slice(self.credentials.secret_key.as_bytes())
            .map_err(|e| ExchangeError::SigningError(format!("HMAC setup failed: {e}")))?;

        mac.update(payload.as_bytes());
        Ok(hex::encode(mac.finalize().into_bytes()))
    }

    pub fn validate_signature(&self, payload: &str, signature: &str) -> bool {
        let Ok(bytes) = hex::decode(signature) else {
            return false;
        };
        let Ok(mut mac) = HmacSha256::new_from_slice(self.credentials.secret_key.as_bytes()) else {
            return false;
        };
        mac.update(payload.as_bytes());
        mac.verify_slice(&bytes).is_ok()
    }
}

/// Signed parameter set ready for transmission
#[derive(Debug, Clone, PartialEq)]
pub struct SignedRequest {
    pub method: HttpMethod,
    /// Absolute path including the API base path
    pub path: String,
    pub tonce: u64,
    pub sign_string: String,
    pub signature: String,
    params: Vec<(String, String)>,
}

impl SignedRequest {
    /// Sorted parameters, `signature` last
    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }

    pub fn keys(&self) -> Vec<&str> {
        self.params.iter().map(|(k, _)| k.as_str()).collect()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Encoded form of every parameter, for the GET query or POST body
    pub fn to_query_string(&self) -> String {
        build_query_string(&self.params)
    }

    /// Milliseconds since the tonce was taken
    pub fn age_ms(&self) -> u64 {
        millis().saturating_sub(self.tonce)
    }
}

/// Lower-case a path and strip surrounding slashes: `/Orders/` -> `orders`
pub fn normalize_path(path: &str) -> String {
    path.trim_matches('/').to_lowercase()
}

/// Bytes left as-is in keys and values: ASCII alphanumerics and `-_.`
const QUERY_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'.');

/// Percent-encode one key or value; space becomes `+`
fn encode_component(component: &str) -> String {
    // A literal "%20" in the input is itself escaped to "%2520"
    utf8_percent_encode(component, QUERY_COMPONENT)
        .to_string()
        .replace("%20", "+")
}

/// Form-encoded `k=v&k=v` serialization, order preserved.
///
/// Everything except ASCII alphanumerics and `-_.` is percent-encoded
/// (so `*` and `~` are escaped) and space becomes `+`.
pub fn build_query_string<K, V>(pairs: &[(K, V)]) -> String
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    pairs
        .iter()
        .map(|(key, value)| format!("{}={}", encode_component(key.as_ref()), encode_component(value.as_ref())))
        .collect::<Vec<_>>()
        .join("&")
}
