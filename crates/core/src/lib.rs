//! # Kuna Core
//!
//! Runtime and support types shared by the Kuna API client.
//!
//! ## Contents
//!
//! 1. **Single-threaded async with monoio** - every API call is a plain await
//! 2. **Wall-clock timing** - millisecond tonces and `PerfTimer` latency logs
//! 3. **Fixed-point arithmetic** - order volumes and prices keep their exact scale
//! 4. **Unified logging** - tracing subscriber, or ftlog behind a feature

pub mod runtime;
pub mod timing;
pub mod fixed;
pub mod logging;

// Re-export commonly used items
pub use runtime::KunaRuntime;
pub use timing::{nanos, millis, PerfTimer, Timestamp};
pub use fixed::{Fixed, FixedError};
pub use logging::init_logging;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::runtime::{KunaRuntime, RuntimeConfig};
    pub use crate::timing::{nanos, millis, PerfTimer, Timestamp};
    pub use crate::fixed::{Fixed, FixedError};
    pub use crate::logging::init_logging;

    // Common external types
    pub use monoio;
    pub use serde::{Deserialize, Serialize};
    pub use chrono::{DateTime, Utc};
}
