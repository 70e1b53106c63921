//! HTTP server setup and middleware.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::api;
use crate::config::AppConfig;
use crate::logging::OpTimer;
use crate::store::{EntityKind, EntityStore, LibraryCatalog};
use crate::synthesis::providers::ElevenLabsDriver;
use crate::synthesis::{SynthesisDriver, SynthesisSettings};
use crate::{log_banner, log_init_step, log_init_warning, log_success, AppState};

/// Harbor API version (from Cargo.toml).
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Create the application with all routes and middleware.
pub async fn create_app(config: AppConfig) -> anyhow::Result<Router> {
    let overall_timer = OpTimer::new("server", "create_app");

    log_banner!(
        format!("Harbor API v{}", VERSION),
        format!("Synthesis: {}", config.synthesis.base_url)
    );

    // [1/4] Synthesis driver
    let step_timer = OpTimer::new("server", "synthesis_driver");
    let settings = SynthesisSettings::from(&config.synthesis);
    let credential_info = if settings.api_key.is_some() {
        "credential configured"
    } else {
        "no credential"
    };
    log_init_step!(
        1,
        4,
        "Synthesis Driver",
        format!(
            "{} / {} ({})",
            settings.default_voice_id, settings.model_id, credential_info
        )
    );
    if settings.api_key.is_none() {
        log_init_warning!("No synthesis API key configured. Speech requests will return 401.");
    }
    let synthesizer: Arc<dyn SynthesisDriver> = Arc::new(ElevenLabsDriver::new(settings)?);
    step_timer.finish();

    // [2/4] Entity store
    let step_timer = OpTimer::new("server", "entity_store");
    let store = Arc::new(EntityStore::in_memory());
    log_init_step!(
        2,
        4,
        "Entity Store",
        format!("{} kind namespaces", EntityKind::ALL.len())
    );
    step_timer.finish();

    // [3/4] Library catalog
    let step_timer = OpTimer::new("server", "library_catalog");
    let catalog = Arc::new(LibraryCatalog::in_memory());
    log_init_step!(3, 4, "Library Catalog", "ready");
    step_timer.finish();

    let state = AppState {
        config: Arc::new(config.clone()),
        store,
        catalog,
        synthesizer,
    };

    // [4/4] Build router with middleware
    let step_timer = OpTimer::new("server", "router");
    let app = api::create_router()
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TimeoutLayer::with_status_code(
            axum::http::StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(config.server.timeout_secs),
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state);
    log_init_step!(4, 4, "Router", "Routes + middleware configured");
    step_timer.finish();

    overall_timer.finish();
    log_success!("Harbor API server created successfully");

    Ok(app)
}
