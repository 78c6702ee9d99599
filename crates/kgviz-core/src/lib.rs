//! kgviz Core
//!
//! Ties the reactive pipeline and the Sankey model together: environment
//! configuration, status-tracked graph loading, and the `kgviz` binary.
//!
//! # Example
//!
//! ```rust,no_run
//! use kgviz_core::{EnvironmentConfig, GraphLoader};
//!
//! # async fn demo() -> kgviz_core::Result<()> {
//! let config = EnvironmentConfig::load(None)?;
//! let loader = GraphLoader::new();
//! let graph = loader.load("pathway.json").await?;
//! println!("{} nodes against {}", graph.node_count(), config.api_base_url);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod cli;
mod config;
mod error;
mod loader;
pub mod telemetry;

// Re-exports
pub use config::{
    ConfigBuilder, ConfigError, EnvironmentConfig, ENV_API_BASE_URL, ENV_OAUTH_CLIENT_ID,
    ENV_OAUTH_ENABLED, ENV_OAUTH_ISSUER, ENV_PRODUCTION,
};
pub use error::{KgvizError, Result};
pub use loader::{DocumentSource, FileSource, GraphLoader, GraphStatus, DEFAULT_LOAD_TIMEOUT};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
