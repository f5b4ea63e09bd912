//! Kuna REST API client
//!
//! - Single-threaded async with monoio; every call is one request/response
//! - Private endpoints are signed per call with a fresh tonce
//! - Responses are returned as decoded JSON, unchanged

use crate::errors::{ExchangeError, Result};
use crate::http::{HttpRequest, HttpResponse, MonoioHttpsClient};
use crate::kuna::auth::{
    build_query_string, normalize_path, KunaCredentials, KunaSigner, DEFAULT_BASE_PATH, PUBLIC_KEY_ENV,
    SECRET_KEY_ENV,
};
use crate::kuna::endpoints::{ApiRequest, KunaEndpoints};
use crate::traits::HttpTransport;
use crate::types::{HttpMethod, OrderSide, RequestParams};
use kuna_core::prelude::*;

use serde_json::Value;
use std::fmt;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

pub const DEFAULT_HOST: &str = "https://kuna.io";
pub const DEFAULT_TIMEOUT_SECS: u64 = crate::http::DEFAULT_TIMEOUT_SECS;
pub const CLIENT_NAME: &str = "Kuna API Client";
pub const REPOSITORY_URL: &str = env!("CARGO_PKG_REPOSITORY");

/// Kuna client configuration
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KunaConfig {
    pub public_key: Option<String>,
    #[serde(skip_serializing)]
    pub secret_key: Option<String>,
    pub base_url: String,
    pub base_path: String,
    pub timeout_secs: u64,
    /// Agent name; the repository URL is always appended
    pub user_agent: Option<String>,
    /// Reject decoded payloads that are empty (`{}`, `[]`, `0`, `false`, `""`)
    pub strict_empty_payloads: bool,
}

impl Default for KunaConfig {
    fn default() -> Self {
        Self {
            public_key: None,
            secret_key: None,
            base_url: DEFAULT_HOST.to_string(),
            base_path: DEFAULT_BASE_PATH.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: None,
            strict_empty_payloads: false,
        }
    }
}

impl fmt::Debug for KunaConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KunaConfig")
            .field("public_key", &self.public_key)
            .field("secret_key", &self.secret_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("base_path", &self.base_path)
            .field("timeout_secs", &self.timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("strict_empty_payloads", &self.strict_empty_payloads)
            .finish()
    }
}

impl KunaConfig {
    pub fn with_credentials(mut self, public_key: impl Into<String>, secret_key: impl Into<String>) -> Self {
        self.public_key = Some(public_key.into());
        self.secret_key = Some(secret_key.into());
        self
    }

    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_strict_empty_payloads(mut self, strict: bool) -> Self {
        self.strict_empty_payloads = strict;
        self
    }

    /// Read `KUNA_PUBLIC_KEY` / `KUNA_SECRET_KEY`
    pub fn with_env_credentials(self) -> Result<Self> {
        let credentials = KunaCredentials::from_env()?;
        Ok(self.with_credentials(credentials.public_key, credentials.secret_key))
    }

    /// User agent sent on every request
    pub fn effective_user_agent(&self) -> String {
        let name = self
            .user_agent
            .clone()
            .unwrap_or_else(|| format!("{CLIENT_NAME}/{}", env!("CARGO_PKG_VERSION")));
        format!("{name} ( {REPOSITORY_URL} )")
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn credentials(&self) -> KunaCredentials {
        KunaCredentials::new(
            self.public_key.clone().unwrap_or_default(),
            self.secret_key.clone().unwrap_or_default(),
        )
    }

    pub fn validate(&self) -> Result<()> {
        if self.timeout_secs == 0 {
            return Err(ExchangeError::ConfigurationError("timeout_secs must be positive".to_string()));
        }
        let url = Url::parse(&self.base_url)?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ExchangeError::InvalidUrl(format!("Unsupported scheme: {}", self.base_url)));
        }
        Ok(())
    }
}

/// Kuna REST client over any [`HttpTransport`]
pub struct KunaRestClient<T = MonoioHttpsClient> {
    config: KunaConfig,
    base_url: String,
    signer: Option<KunaSigner>,
    transport: T,
}

impl KunaRestClient<MonoioHttpsClient> {
    /// Client over the monoio HTTPS transport
    pub fn new(config: KunaConfig) -> Result<Self> {
        let transport = MonoioHttpsClient::new(config.effective_user_agent(), config.timeout());
        Self::with_transport(config, transport)
    }
}

impl<T: HttpTransport> KunaRestClient<T> {
    pub fn with_transport(config: KunaConfig, transport: T) -> Result<Self> {
        config.validate()?;

        let signer = KunaSigner::new(config.credentials())
            .ok()
            .map(|signer| signer.with_base_path(&config.base_path));

        let mut base_url = config.base_url.trim_end_matches('/').to_string();
        let base_path = config.base_path.trim_matches('/');
        if !base_path.is_empty() {
            base_url.push('/');
            base_url.push_str(base_path);
        }

        info!("🔗 Kuna REST client created");
        info!("   Base URL: {}", base_url);
        info!("   Signing: {}", if signer.is_some() { "enabled" } else { "disabled" });

        Ok(Self {
            config,
            base_url,
            signer,
            transport,
        })
    }

    pub fn config(&self) -> &KunaConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn has_credentials(&self) -> bool {
        self.signer.is_some()
    }

    /// Ticker for a market
    pub async fn tickers(&self, market: &str) -> Result<Value> {
        self.execute(KunaEndpoints::tickers(market)).await
    }

    pub async fn order_book(&self, market: &str) -> Result<Value> {
        self.execute(KunaEndpoints::order_book(market)).await
    }

    /// Recent public trades for a market
    pub async fn trades(&self, market: &str) -> Result<Value> {
        self.execute(KunaEndpoints::trades(market)).await
    }

    /// Account information (signed)
    pub async fn me(&self) -> Result<Value> {
        self.execute(KunaEndpoints::me()).await
    }

    /// Place a limit order (signed). `side` must be `buy` or `sell`.
    pub async fn create_order(&self, volume: Fixed, price: Fixed, market: &str, side: &str) -> Result<Value> {
        let request = KunaEndpoints::create_order(volume, price, market, side)?;
        kuna_core::log_order!("PLACE", side, market, volume, price);
        self.execute(request).await
    }

    pub async fn create_order_buy(&self, volume: Fixed, price: Fixed, market: &str) -> Result<Value> {
        self.create_order(volume, price, market, OrderSide::Buy.as_str()).await
    }

    pub async fn create_order_sell(&self, volume: Fixed, price: Fixed, market: &str) -> Result<Value> {
        self.create_order(volume, price, market, OrderSide::Sell.as_str()).await
    }

    /// Cancel an order by id (signed)
    pub async fn delete_order(&self, order_id: u64) -> Result<Value> {
        info!("🗑️  Cancelling order {}", order_id);
        self.execute(KunaEndpoints::delete_order(order_id)).await
    }

    /// Active orders of the account (signed)
    pub async fn my_order_list(&self, market: &str) -> Result<Value> {
        self.execute(KunaEndpoints::my_order_list(market)).await
    }

    /// Trade history of the account (signed)
    pub async fn my_trades_list(&self, market: &str) -> Result<Value> {
        self.execute(KunaEndpoints::my_trades_list(market)).await
    }

    /// Call any endpoint. `method` is case-insensitive and must be GET or POST.
    pub async fn request(&self, path: &str, params: RequestParams, signed: bool, method: &str) -> Result<Value> {
        let method: HttpMethod = method.parse()?;
        self.execute(ApiRequest {
            path: path.to_string(),
            method,
            params,
            signed,
        })
        .await
    }

    /// Send a prepared API request and decode the reply
    pub async fn execute(&self, request: ApiRequest) -> Result<Value> {
        let _timer = PerfTimer::start(format!("kuna_{}_{}", request.method, normalize_path(&request.path)));

        let http_request = self.prepare_request(&request)?;
        debug!("📡 {} {}{}", http_request.method, http_request.url, if request.signed { " (signed)" } else { "" });

        let response = self.transport.send(&http_request).await?;
        self.decode_response(&http_request.url, response)
    }

    /// Build the HTTP request for an API call, signing it when required.
    ///
    /// GET parameters go into the query string, POST parameters into a
    /// form-encoded body. Fails before any network traffic on missing
    /// credentials.
    pub fn prepare_request(&self, request: &ApiRequest) -> Result<HttpRequest> {
        let path = normalize_path(&request.path);

        let pairs: Vec<(String, String)> = if request.signed {
            let signer = self.signer()?;
            signer.sign_request(request.method, &path, &request.params)?.params().to_vec()
        } else {
            request
                .params
                .iter()
                .map(|(k, v)| (k.clone(), v.to_string()))
                .collect()
        };

        let url = format!("{}/{}", self.base_url, path);
        let encoded = build_query_string(&pairs);

        Ok(match request.method {
            HttpMethod::Get if encoded.is_empty() => HttpRequest::get(url),
            HttpMethod::Get => HttpRequest::get(format!("{url}?{encoded}")),
            HttpMethod::Post => HttpRequest::post_form(url, encoded),
        })
    }

    fn signer(&self) -> Result<&KunaSigner> {
        match &self.signer {
            Some(signer) => Ok(signer),
            None => {
                // Report which key is absent
                self.config.credentials().ensure_valid()?;
                Err(ExchangeError::MissingCredentials(format!(
                    "{PUBLIC_KEY_ENV}/{SECRET_KEY_ENV}"
                )))
            }
        }
    }

    fn decode_response(&self, url: &str, response: HttpResponse) -> Result<Value> {
        if !response.is_success() {
            warn!("⚠️  Kuna answered HTTP {} for {}", response.status, url);
        }

        if response.body.trim().is_empty() {
            return Err(ExchangeError::EmptyResponse { url: url.to_string() });
        }

        let value: Value = serde_json::from_str(&response.body).map_err(|e| ExchangeError::DecodeError {
            message: e.to_string(),
            body: response.body.clone(),
        })?;

        if value.is_null() || (self.config.strict_empty_payloads && is_empty_payload(&value)) {
            return Err(ExchangeError::DecodeError {
                message: "decoded payload is empty".to_string(),
                body: response.body,
            });
        }

        Ok(value)
    }
}

/// `{}`, `[]`, `0`, `false`, `""` and `"0"`
fn is_empty_payload(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty() || s == "0",
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}
