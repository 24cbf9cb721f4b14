//! Shared HTTP plumbing: application state, error bodies and system routes.

mod error;
mod health;
pub mod router;
mod state;

pub use error::ErrorBody;
pub use state::{ApiState, ApiStateBuilder, ApiStateError, ApiStateInner};
