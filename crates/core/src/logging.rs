//! Unified logging
//!
//! Everything in the workspace logs through `tracing`. By default events go
//! to a `tracing-subscriber` fmt layer filtered by `RUST_LOG` (falling back
//! to `info`). With the `ftlog` feature the events are bridged through the
//! `log` facade into ftlog's background writer instead.

use std::sync::Once;

static INIT: Once = Once::new();

/// Initialize logging once per process; later calls are no-ops.
pub fn init_logging() {
    INIT.call_once(|| {
        #[cfg(feature = "ftlog")]
        {
            init_ftlog();
        }

        #[cfg(not(feature = "ftlog"))]
        {
            init_tracing();
        }
    });
}

#[cfg(feature = "ftlog")]
fn init_ftlog() {
    match ftlog::builder()
        .max_log_level(ftlog::LevelFilter::Debug)
        .bounded(100_000, false)
        .utc()
        .try_init()
    {
        Ok(guard) => {
            // The guard flushes and stops the writer when dropped
            std::mem::forget(guard);
            tracing::info!("📝 Initialized ftlog logging");
        }
        Err(e) => eprintln!("ftlog initialisation failed: {e}"),
    }
}

#[cfg(not(feature = "ftlog"))]
fn init_tracing() {
    use tracing_subscriber::{EnvFilter, FmtSubscriber};

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_file(true)
        .with_line_number(true)
        .finish();

    // A test harness or host application may already own the global subscriber
    if tracing::subscriber::set_global_default(subscriber).is_ok() {
        tracing::info!("📝 Initialized tracing logging");
    }
}

/// Log a failed operation in the workspace's format
#[macro_export]
macro_rules! log_error {
    ($operation:expr, $error:expr) => {
        tracing::error!("❌ {} failed: {}", $operation, $error);
    };
}

/// Log an order action
#[macro_export]
macro_rules! log_order {
    ($action:expr, $side:expr, $market:expr, $volume:expr, $price:expr) => {
        tracing::info!("📋 ORDER {}: {} {} {} @ {}", $action, $side, $market, $volume, $price);
    };
}
