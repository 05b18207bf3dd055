//! # Axum Helpers
//!
//! Shared HTTP plumbing for the service binaries.
//!
//! - **[`server`]**: router assembly (OpenAPI UI, tracing, fallback) and
//!   serving with graceful shutdown
//! - **[`errors`]**: uniform JSON error body and fallback handlers
//! - **[`extractors`]**: `ValidatedJson`
//!
//! ```ignore
//! use axum_helpers::server::{create_app, create_router};
//! use core_config::server::ServerConfig;
//!
//! let router = create_router::<ApiDoc>(api_routes);
//! create_app(router, &ServerConfig::default()).await?;
//! ```

pub mod errors;
pub mod extractors;
pub mod server;
pub mod shutdown;

pub use errors::ErrorResponse;
pub use extractors::{ValidatedJson, ValidationRejection};
pub use server::{create_app, create_app_with_shutdown, create_router};
pub use shutdown::shutdown_signal;
