use std::sync::{Arc, Weak};

use indexmap::IndexMap;
use tokio::sync::RwLock;
use tracing::info;

use crate::error::{Error, Result};
use crate::handler::ServiceHandler;
use playground_core::JsonSchema;

/// Metadata passed alongside a handler at registration time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ServiceMetadata {
    pub schema: Option<JsonSchema>,
    pub description: Option<String>,
}

impl ServiceMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schema(mut self, schema: JsonSchema) -> Self {
        self.schema = Some(schema);
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

#[derive(Debug, Clone)]
pub struct RegisteredService {
    pub path: String,
    pub handler: Arc<ServiceHandler>,
    pub metadata: ServiceMetadata,
}

/// The set of services mounted on the application, in registration order.
///
/// Cloning is cheap and every clone sees the same services, so services can be
/// added or removed while the server is running.
#[derive(Debug, Clone, Default)]
pub struct ServiceRegistry {
    services: Arc<RwLock<IndexMap<String, RegisteredService>>>,
}

impl ServiceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mounts `handler` at `path`.
    ///
    /// The path is normalized to a single leading `/` without a trailing one.
    /// Registering an existing path replaces the service but keeps its position.
    ///
    /// # Errors
    ///
    /// Fails when the path is empty or contains an empty segment.
    pub async fn register(
        &self,
        path: &str,
        handler: ServiceHandler,
        metadata: ServiceMetadata,
    ) -> Result<()> {
        let path = normalize_path(path)?;
        info!(%path, operations = ?handler.operations(), "registered service");
        let service = RegisteredService {
            path: path.clone(),
            handler: Arc::new(handler),
            metadata,
        };
        self.services.write().await.insert(path, service);
        Ok(())
    }

    /// Unmounts the service at `path`, returning it if it existed.
    pub async fn remove(&self, path: &str) -> Option<RegisteredService> {
        let path = normalize_path(path).ok()?;
        let removed = self.services.write().await.shift_remove(&path);
        if removed.is_some() {
            info!(%path, "removed service");
        }
        removed
    }

    pub async fn get(&self, path: &str) -> Option<RegisteredService> {
        let path = normalize_path(path).ok()?;
        self.services.read().await.get(&path).cloned()
    }

    /// A snapshot of all services in registration order.
    pub async fn snapshot(&self) -> Vec<RegisteredService> {
        self.services.read().await.values().cloned().collect()
    }

    pub async fn paths(&self) -> Vec<String> {
        self.services.read().await.keys().cloned().collect()
    }

    pub async fn len(&self) -> usize {
        self.services.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.services.read().await.is_empty()
    }

    /// A handle that does not keep the registry alive.
    pub fn downgrade(&self) -> WeakServiceRegistry {
        WeakServiceRegistry {
            services: Arc::downgrade(&self.services),
        }
    }
}

/// Non-owning [`ServiceRegistry`] handle, for services stored in the registry
/// they read from.
#[derive(Debug, Clone, Default)]
pub struct WeakServiceRegistry {
    services: Weak<RwLock<IndexMap<String, RegisteredService>>>,
}

impl WeakServiceRegistry {
    pub fn upgrade(&self) -> Option<ServiceRegistry> {
        self.services
            .upgrade()
            .map(|services| ServiceRegistry { services })
    }
}

/// `users`, `/users` and `/users/` all become `/users`.
pub fn normalize_path(path: &str) -> Result<String> {
    let trimmed = path.trim().trim_matches('/');
    if trimmed.is_empty() {
        return Err(Error::InvalidPath(path.to_string(), "path is empty"));
    }
    if trimmed.split('/').any(str::is_empty) {
        return Err(Error::InvalidPath(path.to_string(), "path contains an empty segment"));
    }
    Ok(format!("/{trimmed}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn handler() -> ServiceHandler {
        ServiceHandler::builder(())
            .find(|_, _| async { Ok(json!([])) })
            .build()
    }

    #[test]
    fn paths_are_normalized() {
        assert_eq!(normalize_path("users").unwrap(), "/users");
        assert_eq!(normalize_path("/users/").unwrap(), "/users");
        assert_eq!(normalize_path("/api/v1/users").unwrap(), "/api/v1/users");
        assert!(normalize_path("/").is_err());
        assert!(normalize_path("/api//users").is_err());
    }

    #[tokio::test]
    async fn keeps_registration_order() {
        let registry = ServiceRegistry::new();
        for path in ["/users", "messages", "/audit"] {
            registry.register(path, handler(), ServiceMetadata::new()).await.unwrap();
        }
        assert_eq!(registry.paths().await, ["/users", "/messages", "/audit"]);

        registry
            .register("/messages", handler(), ServiceMetadata::new().description("again"))
            .await
            .unwrap();
        assert_eq!(registry.paths().await, ["/users", "/messages", "/audit"]);
        let messages = registry.get("messages").await.unwrap();
        assert_eq!(messages.metadata.description.as_deref(), Some("again"));
    }

    #[tokio::test]
    async fn weak_handles_follow_the_registry() {
        let registry = ServiceRegistry::new();
        let weak = registry.downgrade();
        registry.register("/users", handler(), ServiceMetadata::new()).await.unwrap();

        let upgraded = weak.upgrade().unwrap();
        assert_eq!(upgraded.paths().await, ["/users"]);

        drop(upgraded);
        drop(registry);
        assert!(weak.upgrade().is_none());
        assert!(WeakServiceRegistry::default().upgrade().is_none());
    }

    #[tokio::test]
    async fn services_can_be_removed_at_runtime() {
        let registry = ServiceRegistry::new();
        let clone = registry.clone();
        registry.register("/users", handler(), ServiceMetadata::new()).await.unwrap();
        registry.register("/messages", handler(), ServiceMetadata::new()).await.unwrap();

        assert!(clone.remove("/users").await.is_some());
        assert!(clone.remove("/users").await.is_none());
        assert_eq!(registry.paths().await, ["/messages"]);
        assert_eq!(registry.len().await, 1);
        assert!(!registry.is_empty().await);
    }
}
