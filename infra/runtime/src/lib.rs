//! # Runtime
//!
//! Tokio runtime profiles shared by the `DocFill` binaries.
//!
//! ## Profiles
//! * **Server**: every core busy, large stacks for the blocking pool that renders documents.
//! * **Compact**: two workers, used by the command line tool where a batch runs once and exits.
//!
//! ## Example
//!
//! ```rust,ignore
//! #[docfill_runtime::main(server)]
//! async fn main() -> anyhow::Result<()> {
//!     Ok(())
//! }
//! ```

pub use anyhow::Result;
pub use docfill_derive::main;

use anyhow::anyhow;
use std::{sync::OnceLock, thread::available_parallelism, time::Duration};
use tokio::runtime::{Builder, Runtime};
use tracing::debug;

const DEFAULT_WORKER_THREADS: usize = 4;
const MAX_WORKER_THREADS: usize = 512;
/// Stack size for worker and blocking threads (3 `MiB`).
const DEFAULT_STACK_SIZE: usize = 3 * 1024 * 1024;
const MIN_STACK_SIZE: usize = 1024 * 1024;
const MAX_STACK_SIZE: usize = 16 * 1024 * 1024;
/// Upper bound on concurrent document renders queued through `spawn_blocking`.
const DEFAULT_MAX_BLOCKING_THREADS: usize = 64;
const THREAD_KEEP_ALIVE: Duration = Duration::from_secs(60);
const DEFAULT_THREAD_NAME: &str = "docfill-worker";

static WORKER_THREADS: OnceLock<usize> = OnceLock::new();

/// Worker threads from `TOKIO_WORKER_THREADS`, falling back to the core count.
fn detected_worker_threads() -> usize {
    *WORKER_THREADS.get_or_init(|| {
        std::env::var("TOKIO_WORKER_THREADS")
            .ok()
            .and_then(|s| s.parse::<usize>().ok())
            .filter(|&n| n > 0 && n <= MAX_WORKER_THREADS)
            .unwrap_or_else(|| {
                available_parallelism()
                    .map(std::num::NonZero::get)
                    .unwrap_or(DEFAULT_WORKER_THREADS)
            })
    })
}

/// Configuration for the Tokio runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    pub worker_threads: usize,
    pub max_blocking_threads: usize,
    pub stack_size: usize,
    pub thread_name: String,
    pub thread_keep_alive: Duration,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            worker_threads: detected_worker_threads(),
            max_blocking_threads: DEFAULT_MAX_BLOCKING_THREADS,
            stack_size: DEFAULT_STACK_SIZE,
            thread_name: DEFAULT_THREAD_NAME.to_owned(),
            thread_keep_alive: THREAD_KEEP_ALIVE,
        }
    }
}

impl RuntimeConfig {
    /// Preset for the HTTP server.
    #[must_use]
    pub fn server() -> Self {
        Self {
            worker_threads: detected_worker_threads(),
            max_blocking_threads: DEFAULT_MAX_BLOCKING_THREADS,
            stack_size: 4 * 1024 * 1024,
            thread_name: "docfill-http".to_owned(),
            thread_keep_alive: Duration::from_secs(300),
        }
    }

    /// Preset for one-shot command line runs.
    #[must_use]
    pub fn compact() -> Self {
        Self {
            worker_threads: detected_worker_threads().min(2),
            max_blocking_threads: 4,
            stack_size: 2 * 1024 * 1024,
            thread_name: "docfill-cli".to_owned(),
            thread_keep_alive: Duration::from_secs(10),
        }
    }

    /// Clamps every field into the range tokio accepts.
    fn normalized(&self) -> Self {
        let thread_name = if self.thread_name.trim().is_empty() {
            DEFAULT_THREAD_NAME.to_owned()
        } else {
            self.thread_name.clone()
        };
        Self {
            worker_threads: self.worker_threads.clamp(1, MAX_WORKER_THREADS),
            max_blocking_threads: self.max_blocking_threads.max(1),
            stack_size: self.stack_size.clamp(MIN_STACK_SIZE, MAX_STACK_SIZE),
            thread_name,
            thread_keep_alive: self.thread_keep_alive,
        }
    }
}

/// Builds a multithreaded runtime with I/O and timers enabled.
///
/// # Errors
///
/// Returns an error if the OS refuses to spawn the worker threads.
///
/// # Examples
///
/// ```rust,ignore
/// use docfill_runtime::{build_runtime_with_config, RuntimeConfig};
///
/// let runtime = build_runtime_with_config(&RuntimeConfig::compact())?;
/// runtime.block_on(async {});
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn build_runtime_with_config(config: &RuntimeConfig) -> Result<Runtime> {
    let config = config.normalized();
    debug!(config = ?config, "Building tokio runtime");

    let mut builder = Builder::new_multi_thread();
    builder
        .worker_threads(config.worker_threads)
        .max_blocking_threads(config.max_blocking_threads)
        .thread_name(&config.thread_name)
        .thread_stack_size(config.stack_size)
        .thread_keep_alive(config.thread_keep_alive)
        .enable_all();

    builder.build().map_err(|e| anyhow!("Failed to initialize runtime: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_range_values_are_clamped() {
        let config = RuntimeConfig {
            worker_threads: 2000,
            stack_size: 100 * 1024 * 1024,
            ..RuntimeConfig::server()
        }
        .normalized();
        assert_eq!(config.worker_threads, MAX_WORKER_THREADS);
        assert_eq!(config.stack_size, MAX_STACK_SIZE);
    }

    #[test]
    fn test_compact_profile_is_small() {
        let config = RuntimeConfig::compact();
        assert!(config.worker_threads <= 2);
        assert!(config.max_blocking_threads < RuntimeConfig::server().max_blocking_threads);
    }

    #[test]
    fn test_normalized_clamps_hand_built_config() {
        let raw = RuntimeConfig {
            worker_threads: 0,
            max_blocking_threads: 0,
            stack_size: 1,
            thread_name: "  ".to_owned(),
            thread_keep_alive: Duration::from_secs(1),
        };
        let config = raw.normalized();
        assert_eq!(config.worker_threads, 1);
        assert_eq!(config.max_blocking_threads, 1);
        assert_eq!(config.stack_size, MIN_STACK_SIZE);
        assert_eq!(config.thread_name, DEFAULT_THREAD_NAME);
    }

    #[test]
    fn test_runtime_builds_and_runs() {
        let config = RuntimeConfig { worker_threads: 1, ..RuntimeConfig::compact() };
        let runtime = build_runtime_with_config(&config).expect("runtime should build");
        let value = runtime.block_on(async { 21 * 2 });
        assert_eq!(value, 42);
    }
}
