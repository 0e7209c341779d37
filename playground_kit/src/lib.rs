//! # Playground Kit - Service Discovery and API Exploration for Rust Services
//!
//! `playground_kit` turns a set of CRUD-style services into an explorable API.
//! Services are registered at runtime; the kit describes them, serves them over
//! a generic REST surface and ships a small web explorer to call them.
//!
//! ## Core Features:
//!
//! - **`ServiceHandler`**: A service built from up to five operations (`find`,
//!   `get`, `create`, `patch`, `remove`). The operations given to its builder
//!   are exactly the ones it supports.
//!
//! - **`ServiceRegistry`**: The shared, insertion-ordered set of mounted
//!   services. Services can be added and removed while the server runs.
//!
//! - **`Discovery`**: Lists every service with its supported operations,
//!   schema and description, leaving out the discovery endpoint itself.
//!
//! - **`playground()`**: Assembles discovery, the REST router, the landing page,
//!   the embedded explorer and CORS into one `axum::Router`.
//!
//! - **`#[service_dto]`**: Derives `serde` and `utoipa::ToSchema` for request
//!   and response types, so their schema can be attached with
//!   `JsonSchema::of::<T>()`.
//!
//! - **`playground-cli`** (feature `api-cli`): an interactive client driven by
//!   the discovery endpoint.
//!
//! ```ignore
//! let registry = ServiceRegistry::new();
//! registry
//!     .register("/messages", messages::handler(store), messages::metadata())
//!     .await?;
//! let app = playground(registry, PlaygroundConfig::from_env()?).await?;
//! axum::serve(listener, app).await?;
//! ```

pub mod bootstrap;
pub mod config;
pub mod discovery;
pub mod error;
pub mod handler;
pub mod registry;
pub mod rest_router_builder;
pub mod schema;
pub mod ui;

#[cfg(feature = "api-cli")]
pub mod api_cli;

pub use bootstrap::{default_cors_layer, playground, rest_router};
pub use config::{AuthenticationConfig, PlaygroundConfig};
pub use discovery::Discovery;
pub use error::{Error, Result, ServiceError, ServiceResult};
pub use handler::{Params, ServiceBuilder, ServiceHandler};
pub use registry::{RegisteredService, ServiceMetadata, ServiceRegistry, WeakServiceRegistry};
pub use schema::{schema_of, JsonSchemaExt};

pub use playground_core;
pub use playground_core::{
    Dispatcher, JsonSchema, NormalizedError, NormalizedResponse, OperationKind,
    ServiceDescriptor,
};

#[cfg(feature = "macros")]
pub use playground_macros::service_dto;
