//! Shared request types
//!
//! Request parameters are scalar values keyed by name. They live in a
//! `BTreeMap`, so iteration is always in ascending byte order of the key,
//! which is the order the signature is computed over.

use crate::errors::{ExchangeError, Result};
use kuna_core::Fixed;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Parameters of a single request, built fresh per call
pub type RequestParams = BTreeMap<String, ParamValue>;

/// Scalar request parameter value
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Str(String),
    Int(i64),
    Decimal(Fixed),
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Str(s) => f.write_str(s),
            ParamValue::Int(i) => write!(f, "{i}"),
            ParamValue::Decimal(d) => write!(f, "{d}"),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Str(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Str(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        ParamValue::Int(value)
    }
}

impl From<u64> for ParamValue {
    fn from(value: u64) -> Self {
        match i64::try_from(value) {
            Ok(v) => ParamValue::Int(v),
            Err(_) => ParamValue::Str(value.to_string()),
        }
    }
}

impl From<Fixed> for ParamValue {
    fn from(value: Fixed) -> Self {
        ParamValue::Decimal(value)
    }
}

impl From<OrderSide> for ParamValue {
    fn from(value: OrderSide) -> Self {
        ParamValue::Str(value.as_str().to_string())
    }
}

/// Build a [`RequestParams`] map from `key => value` pairs
#[macro_export]
macro_rules! params {
    () => {
        $crate::types::RequestParams::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut params = $crate::types::RequestParams::new();
        $(params.insert($key.to_string(), $crate::types::ParamValue::from($value));)+
        params
    }};
}

/// HTTP methods accepted by the Kuna API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = ExchangeError;

    /// Case-insensitive; anything but GET or POST is rejected
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "GET" => Ok(HttpMethod::Get),
            "POST" => Ok(HttpMethod::Post),
            _ => Err(ExchangeError::InvalidMethod(s.to_string())),
        }
    }
}

/// Order side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderSide::Buy => "buy",
            OrderSide::Sell => "sell",
        }
    }
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderSide {
    type Err = ExchangeError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "buy" => Ok(OrderSide::Buy),
            "sell" => Ok(OrderSide::Sell),
            _ => Err(ExchangeError::InvalidSide(s.to_string())),
        }
    }
}
