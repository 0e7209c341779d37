//! Demo playground with a `users` and a `messages` service, both kept in memory.

use axum::Router;
use chrono::{DateTime, Utc};

use playground_kit::{playground, PlaygroundConfig, ServiceRegistry};

pub mod messages;
pub mod store;
pub mod users;

use store::MemoryStore;

/// A registry with freshly seeded `/users` and `/messages` services.
pub async fn registry() -> playground_kit::Result<ServiceRegistry> {
    let registry = ServiceRegistry::new();
    registry
        .register(
            "/users",
            users::handler(MemoryStore::new(users::seed())),
            users::metadata(),
        )
        .await?;
    registry
        .register(
            "/messages",
            messages::handler(MemoryStore::new(messages::seed())),
            messages::metadata(),
        )
        .await?;
    Ok(registry)
}

/// The demo application: both services plus discovery, UI and CORS.
pub async fn app(config: PlaygroundConfig) -> playground_kit::Result<Router> {
    playground(registry().await?, config).await
}

pub(crate) fn timestamp(rfc3339: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(rfc3339)
        .map(|t| t.with_timezone(&Utc))
        .unwrap_or_default()
}
