//! Facade crate for docfill features and shared modules.
//! Re-exports domain/kernel primitives and aggregates feature initialization.
//! Keep this crate thin: it should compose other crates, not implement business logic.
//!
//! ## Usage
//! - Add `docfill` with the `server` feature for the HTTP routes.
//! - Call `docfill::init` to register feature slices; extend as new slices appear.

pub use docfill_domain as domain;
use docfill_domain::config::ApiConfig;
pub use docfill_kernel as kernel;

#[cfg(feature = "server")]
pub mod server {
    pub mod router {
        pub use docfill_batch::http::router as batch_router;
        pub use docfill_kernel::server::router::system_router;
    }
}

/// Feature registry for runtime introspection.
pub mod features {
    pub use docfill_batch as batch;

    /// Build-time enabled features (by Cargo feature).
    pub const ENABLED: &[&str] = &[
        #[cfg(feature = "server")]
        "server",
        "batch",
    ];

    #[must_use]
    pub fn is_enabled(name: &str) -> bool {
        ENABLED.contains(&name)
    }
}

/// Initialize all enabled features.
///
/// # Errors
/// Returns an error if any feature initialization fails.
pub fn init(
    config: &ApiConfig,
) -> Result<Vec<domain::registry::InitializedSlice>, Box<dyn std::error::Error>> {
    let mut slices = Vec::new();

    // Batch generation
    slices.push(features::batch::init(&config.batch)?);

    tracing::debug!(count = slices.len(), "Feature slices initialized");
    Ok(slices)
}
