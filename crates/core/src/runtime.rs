//! Blocking entry point over a monoio runtime
//!
//! The API client is async, but every call is a single request/response
//! with nothing running in the background. `KunaRuntime` lets synchronous
//! callers drive one call (or a sequence of calls) to completion.

use monoio::{FusionDriver, RuntimeBuilder};
use tracing::{debug, info};

/// Runtime configuration
#[derive(Debug, Clone, Default)]
pub struct RuntimeConfig {
    /// io_uring submission queue size, where io_uring is available
    pub entries: Option<u32>,
}

/// Single-threaded runtime for the Kuna client
pub struct KunaRuntime {
    config: RuntimeConfig,
}

impl KunaRuntime {
    pub fn new() -> Self {
        Self::with_config(RuntimeConfig::default())
    }

    pub fn with_config(config: RuntimeConfig) -> Self {
        debug!("Runtime configured: entries={:?}", config.entries);
        Self { config }
    }

    /// Run a future to completion on a fresh runtime.
    ///
    /// io_uring is used where the kernel offers it, epoll/kqueue otherwise.
    /// The timer driver is always enabled; request timeouts depend on it.
    pub fn block_on<F>(&self, future: F) -> std::io::Result<F::Output>
    where
        F: std::future::Future,
    {
        let mut builder = RuntimeBuilder::<FusionDriver>::new();
        if let Some(entries) = self.config.entries {
            builder = builder.with_entries(entries);
        }

        let mut runtime = builder.enable_timer().build()?;
        Ok(runtime.block_on(future))
    }

    /// Start the runtime and run until `f` completes
    pub fn start<F, Fut>(self, f: F) -> std::io::Result<Fut::Output>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future,
    {
        info!("▶️  Starting Kuna runtime");
        let result = self.block_on(f());
        info!("⏹️  Kuna runtime stopped");
        result
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }
}

impl Default for KunaRuntime {
    fn default() -> Self {
        Self::new()
    }
}
