//! Harbor API - collaboration backend service.
//!
//! This crate provides the HTTP backend for the Harbor collaboration
//! platform:
//!
//! - **Entity store**: one record schema persisted polymorphically across
//!   sixteen entity kinds, each in its own namespace, scoped by channel
//!   and user with store-assigned ordering timestamps
//! - **Library catalog**: globally unique shareable items with atomic
//!   popularity counters
//! - **Speech relay**: live text-to-speech byte streams proxied from an
//!   upstream synthesis provider
//!
//! # Architecture
//!
//! - [`config`]: Configuration management and environment loading
//! - [`store`]: Entity store and library catalog behind repository traits
//! - [`synthesis`]: Upstream synthesis driver abstraction
//! - [`api`]: HTTP API endpoints
//! - [`error`]: Request-boundary error taxonomy
//!
//! # Example
//!
//! ```rust,ignore
//! use harbor_api::{config::AppConfig, server::create_app};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = AppConfig::load()?;
//!     let app = create_app(config).await?;
//!
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```

#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

pub mod api;
pub mod config;
pub mod error;
pub mod logging;
pub mod server;
pub mod store;
pub mod synthesis;

use std::sync::Arc;

use config::AppConfig;
use store::{EntityStore, LibraryCatalog};
use synthesis::SynthesisDriver;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// Per-kind entity repositories.
    pub store: Arc<EntityStore>,
    /// Shareable library catalog.
    pub catalog: Arc<LibraryCatalog>,
    /// Upstream synthesis driver, reused across concurrent requests.
    pub synthesizer: Arc<dyn SynthesisDriver>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &"AppConfig")
            .field("store", &self.store)
            .field("catalog", &self.catalog)
            .field("synthesizer", &"SynthesisDriver")
            .finish()
    }
}
