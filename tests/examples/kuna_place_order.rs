//! Place and cancel a limit order on Kuna
//!
//! Needs `KUNA_PUBLIC_KEY` and `KUNA_SECRET_KEY` in the environment or `.env`.
//! The bid price comes from `KUNA_DEMO_PRICE` (default 100000 UAH) and must
//! sit below the market; the order is cancelled right away.

use kuna_core::prelude::*;
use kuna_exchanges::kuna::{KunaConfig, KunaRestClient, MARKET_BTCUAH};
use tracing::{info, warn};

#[monoio::main(timer_enabled = true)]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();
    init_logging();

    info!("🚀 Kuna order placement example");

    let config = KunaConfig::default().with_env_credentials()?;
    let client = KunaRestClient::new(config)?;

    let account = client.me().await?;
    info!("👤 Account: {}", account["email"]);

    let ticker = client.tickers(MARKET_BTCUAH).await?;
    let last = ticker["ticker"]["last"]
        .as_str()
        .ok_or("ticker has no last price")?;
    let last = Fixed::from_str_exact(last)?;

    let price = std::env::var("KUNA_DEMO_PRICE").unwrap_or_else(|_| "100000".to_string());
    let price = Fixed::from_str_exact(&price)?;
    if price >= last {
        warn!("⚠️  Bid {} would cross the market at {}, aborting", price, last);
        return Ok(());
    }
    let volume = Fixed::from_str_exact("0.0001")?;
    info!("💰 Last price {}, bidding {} for {}", last, price, volume);

    let order = client.create_order_buy(volume, price, MARKET_BTCUAH).await?;
    let Some(order_id) = order["id"].as_u64() else {
        warn!("⚠️  Order was not accepted: {}", order);
        return Ok(());
    };
    info!("✅ Order placed: id {} state {}", order_id, order["state"]);

    let open = client.my_order_list(MARKET_BTCUAH).await?;
    info!("📋 Open orders: {}", open.as_array().map(|o| o.len()).unwrap_or(0));

    let cancelled = client.delete_order(order_id).await?;
    info!("🗑️  Cancelled: state {}", cancelled["state"]);

    let fills = client.my_trades_list(MARKET_BTCUAH).await?;
    info!("📜 My trades: {}", fills.as_array().map(|t| t.len()).unwrap_or(0));

    Ok(())
}
