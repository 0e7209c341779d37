use axum::http::{header, HeaderName, Method};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};

use crate::config::PlaygroundConfig;
use crate::discovery::Discovery;
use crate::error::Result;
use crate::registry::ServiceRegistry;
use crate::rest_router_builder::RestRouterBuilder;
use crate::ui::ui_router;

/// Mounts the discovery endpoint into `registry` and returns the full
/// application: UI routes, then every registered service, then CORS.
pub async fn playground(registry: ServiceRegistry, config: PlaygroundConfig) -> Result<Router> {
    let config = config.validate()?;
    Discovery::from_config(registry.clone(), &config)?.install().await?;

    let rest = rest_router(registry)?;
    let mut app = ui_router(&config).merge(rest);
    if config.cors {
        app = app.layer(default_cors_layer());
    }
    Ok(app)
}

/// Serves every registered service, without the discovery endpoint or UI.
pub fn rest_router(registry: ServiceRegistry) -> Result<Router> {
    RestRouterBuilder::new().registry(registry).build()
}

/// Any origin, the verbs of the REST surface, and the usual request headers.
pub fn default_cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::ORIGIN,
            HeaderName::from_static("x-requested-with"),
            header::CONTENT_TYPE,
            header::ACCEPT,
            header::AUTHORIZATION,
        ])
}
