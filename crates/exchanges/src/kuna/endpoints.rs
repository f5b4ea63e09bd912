//! Fixed mapping from API operations to wire requests

use crate::errors::Result;
use crate::params;
use crate::types::{HttpMethod, OrderSide, RequestParams};
use kuna_core::Fixed;

/// Default market for the demos
pub const MARKET_BTCUAH: &str = "btcuah";

/// One API call before signing: path relative to the base path
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub path: String,
    pub method: HttpMethod,
    pub params: RequestParams,
    pub signed: bool,
}

impl ApiRequest {
    fn public(path: impl Into<String>, params: RequestParams) -> Self {
        Self {
            path: path.into(),
            method: HttpMethod::Get,
            params,
            signed: false,
        }
    }

    fn private(path: impl Into<String>, method: HttpMethod, params: RequestParams) -> Self {
        Self {
            path: path.into(),
            method,
            params,
            signed: true,
        }
    }
}

/// Request builders for every Kuna v2 endpoint the client exposes
pub struct KunaEndpoints;

impl KunaEndpoints {
    /// Ticker for one market
    pub fn tickers(market: &str) -> ApiRequest {
        ApiRequest::public(format!("/tickers/{}", urlencoding::encode(market)), params!())
    }

    pub fn order_book(market: &str) -> ApiRequest {
        ApiRequest::public("/order_book", params! { "market" => market })
    }

    /// Recent public trades
    pub fn trades(market: &str) -> ApiRequest {
        ApiRequest::public("/trades", params! { "market" => market })
    }

    /// Account information
    pub fn me() -> ApiRequest {
        ApiRequest::private("/members/me", HttpMethod::Get, params!())
    }

    /// Place a limit order. `side` must be `buy` or `sell`.
    pub fn create_order(volume: Fixed, price: Fixed, market: &str, side: &str) -> Result<ApiRequest> {
        let side: OrderSide = side.parse()?;
        Ok(Self::create_order_with_side(volume, price, market, side))
    }

    pub fn create_order_with_side(volume: Fixed, price: Fixed, market: &str, side: OrderSide) -> ApiRequest {
        ApiRequest::private(
            "/orders",
            HttpMethod::Post,
            params! {
                "volume" => volume,
                "price" => price,
                "market" => market,
                "side" => side,
            },
        )
    }

    pub fn delete_order(order_id: u64) -> ApiRequest {
        ApiRequest::private("/order/delete", HttpMethod::Post, params! { "id" => order_id })
    }

    /// Active orders of the account
    pub fn my_order_list(market: &str) -> ApiRequest {
        ApiRequest::private("/orders", HttpMethod::Get, params! { "market" => market })
    }

    /// Trade history of the account
    pub fn my_trades_list(market: &str) -> ApiRequest {
        ApiRequest::private("/trades/my", HttpMethod::Get, params! { "market" => market })
    }
}
