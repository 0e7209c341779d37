//! Service discovery: describes every registered service on demand.

use tracing::debug;

use crate::config::PlaygroundConfig;
use crate::error::{Error, Result};
use crate::handler::ServiceHandler;
use crate::registry::{normalize_path, RegisteredService, ServiceMetadata, ServiceRegistry};
use playground_core::{service_name, ServiceDescriptor};

/// Renders [`ServiceDescriptor`]s from a [`ServiceRegistry`].
///
/// Nothing is cached: every call reads the registry as it is at that moment.
#[derive(Debug, Clone)]
pub struct Discovery {
    registry: ServiceRegistry,
    mount_path: String,
    expose_schemas: bool,
}

impl Discovery {
    /// # Errors
    ///
    /// Fails when `mount_path` is not a valid service path.
    pub fn new(registry: ServiceRegistry, mount_path: &str, expose_schemas: bool) -> Result<Self> {
        Ok(Self {
            registry,
            mount_path: normalize_path(mount_path)?,
            expose_schemas,
        })
    }

    pub fn from_config(registry: ServiceRegistry, config: &PlaygroundConfig) -> Result<Self> {
        Self::new(registry, &config.mount_path, config.expose_schemas)
    }

    pub fn mount_path(&self) -> &str {
        &self.mount_path
    }

    /// Describes every service except the discovery endpoint itself, in
    /// registration order.
    pub async fn list_services(&self) -> Vec<ServiceDescriptor> {
        let services: Vec<ServiceDescriptor> = self
            .registry
            .snapshot()
            .await
            .iter()
            .filter(|service| service.path != self.mount_path)
            .map(|service| self.describe(service))
            .collect();
        debug!(count = services.len(), "listed services");
        services
    }

    fn describe(&self, service: &RegisteredService) -> ServiceDescriptor {
        let ServiceMetadata {
            schema,
            description,
        } = &service.metadata;
        ServiceDescriptor {
            name: service_name(&service.path).to_string(),
            path: service.path.clone(),
            methods: service.handler.operations(),
            schema: if self.expose_schemas { schema.clone() } else { None },
            description: description.clone(),
        }
    }

    /// The discovery endpoint as a `find`-only service.
    ///
    /// The handler holds the registry weakly, since once installed it is owned
    /// by that registry. Without a live registry it lists nothing.
    pub fn into_handler(self) -> ServiceHandler {
        let Self {
            registry,
            mount_path,
            expose_schemas,
        } = self;
        ServiceHandler::builder(registry.downgrade())
            .find(move |registry, _params| {
                let mount_path = mount_path.clone();
                async move {
                    let services = match registry.upgrade() {
                        Some(registry) => {
                            let discovery = Discovery {
                                registry,
                                mount_path,
                                expose_schemas,
                            };
                            discovery.list_services().await
                        }
                        None => Vec::new(),
                    };
                    Ok(services)
                }
            })
            .build()
    }

    /// Mounts the discovery endpoint into its own registry.
    ///
    /// # Errors
    ///
    /// Propagates registration failures.
    pub async fn install(self) -> Result<()> {
        let registry = self.registry.clone();
        let path = self.mount_path.clone();
        if let Some(existing) = registry.get(&path).await {
            if existing.handler.operations() != [playground_core::OperationKind::Find] {
                return Err(Error::Config(format!(
                    "`{path}` is already taken by another service"
                )));
            }
        }
        let metadata = ServiceMetadata::new().description("Service discovery endpoint");
        registry.register(&path, self.into_handler(), metadata).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::Params;
    use playground_core::{JsonSchema, OperationKind};
    use serde_json::json;

    fn crud() -> ServiceHandler {
        ServiceHandler::builder(())
            .find(|_, _| async { Ok(json!([])) })
            .get(|_, id, _| async move { Ok(json!({ "id": id })) })
            .create(|_, data, _| async move { Ok(data) })
            .patch(|_, _, data, _| async move { Ok(data) })
            .remove(|_, id, _| async move { Ok(json!({ "id": id })) })
            .build()
    }

    async fn registry() -> ServiceRegistry {
        let registry = ServiceRegistry::new();
        registry
            .register(
                "/users",
                crud(),
                ServiceMetadata::new()
                    .schema(JsonSchema::object().property("name", JsonSchema::string()))
                    .description("User management service"),
            )
            .await
            .unwrap();
        registry
            .register(
                "/messages",
                ServiceHandler::builder(())
                    .remove(|_, id, _| async move { Ok(json!({ "id": id })) })
                    .find(|_, _| async { Ok(json!([])) })
                    .create(|_, data, _| async move { Ok(data) })
                    .build(),
                ServiceMetadata::new(),
            )
            .await
            .unwrap();
        registry
    }

    #[tokio::test]
    async fn describes_services_in_registration_order() {
        let discovery = Discovery::new(registry().await, "/services", true).unwrap();
        let services = discovery.list_services().await;

        let names: Vec<&str> = services.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["users", "messages"]);
        assert_eq!(services[0].path, "/users");
        assert_eq!(services[0].methods, OperationKind::ALL);
        assert_eq!(services[0].description.as_deref(), Some("User management service"));
        assert!(services[0].schema.is_some());
        assert_eq!(
            services[1].methods,
            [OperationKind::Find, OperationKind::Create, OperationKind::Remove]
        );
        assert_eq!(services[1].schema, None);
        assert_eq!(services[1].description, None);
    }

    #[tokio::test]
    async fn never_lists_itself() {
        let registry = registry().await;
        Discovery::new(registry.clone(), "/services", true)
            .unwrap()
            .install()
            .await
            .unwrap();
        assert_eq!(registry.len().await, 3);

        let discovery = Discovery::new(registry, "services/", true).unwrap();
        let services = discovery.list_services().await;
        assert!(services.iter().all(|s| s.path != "/services"));
        assert_eq!(services.len(), 2);
    }

    #[tokio::test]
    async fn schemas_can_be_withheld() {
        let discovery = Discovery::new(registry().await, "/services", false).unwrap();
        let services = discovery.list_services().await;
        assert!(services.iter().all(|s| s.schema.is_none()));
        assert_eq!(services[0].description.as_deref(), Some("User management service"));

        let json = serde_json::to_value(&services).unwrap();
        assert!(json[0].get("schema").is_none());
    }

    #[tokio::test]
    async fn reflects_runtime_changes() {
        let registry = registry().await;
        let discovery = Discovery::new(registry.clone(), "/services", true).unwrap();
        assert_eq!(discovery.list_services().await.len(), 2);

        registry.remove("/users").await;
        registry.register("/audit", crud(), ServiceMetadata::new()).await.unwrap();
        let names: Vec<String> = discovery
            .list_services()
            .await
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(names, ["messages", "audit"]);
    }

    #[tokio::test]
    async fn handler_serves_the_listing() {
        let registry = registry().await;
        let handler = Discovery::new(registry.clone(), "/services", true)
            .unwrap()
            .into_handler();
        assert_eq!(handler.operations(), [OperationKind::Find]);

        let listing = handler.find(Params::default()).await.unwrap();
        assert_eq!(listing[0]["name"], "users");
        assert_eq!(listing[1]["methods"], json!(["find", "create", "remove"]));
    }

    #[tokio::test]
    async fn installed_endpoint_does_not_keep_the_registry_alive() {
        let registry = registry().await;
        Discovery::new(registry.clone(), "/services", true)
            .unwrap()
            .install()
            .await
            .unwrap();
        let installed = registry.get("/services").await.unwrap();
        let weak = registry.downgrade();

        let listing = installed.handler.find(Params::default()).await.unwrap();
        assert_eq!(listing.as_array().map(Vec::len), Some(2));

        drop(registry);
        assert!(weak.upgrade().is_none());
        let listing = installed.handler.find(Params::default()).await.unwrap();
        assert_eq!(listing, json!([]));
    }

    #[tokio::test]
    async fn refuses_to_shadow_a_real_service() {
        let registry = registry().await;
        let err = Discovery::new(registry, "/users", true).unwrap().install().await;
        assert!(matches!(err, Err(Error::Config(_))));
    }
}
