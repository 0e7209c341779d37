use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{ServiceError, ServiceResult};
use playground_core::OperationKind;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A type-erased service operation taking its input by value.
pub type Operation<A> = Arc<dyn Fn(A) -> BoxFuture<'static, ServiceResult<Value>> + Send + Sync>;

/// Call context handed to every operation.
#[derive(Debug, Clone, Default)]
pub struct Params {
    /// Query parameters, with best-effort typing applied by the router.
    pub query: Map<String, Value>,
    /// Request headers, names lowercased.
    pub headers: HashMap<String, String>,
    /// Transport the call came in through, e.g. `rest`.
    pub provider: Option<&'static str>,
}

impl Params {
    pub fn with_query(query: Map<String, Value>) -> Self {
        Self {
            query,
            ..Self::default()
        }
    }
}

/// A service: up to five operations, each of which may be absent.
///
/// Which operations a service supports is exactly which ones were given to its
/// [`ServiceBuilder`]; there is nothing to probe at runtime.
#[derive(Clone, Default)]
pub struct ServiceHandler {
    find: Option<Operation<Params>>,
    get: Option<Operation<(String, Params)>>,
    create: Option<Operation<(Value, Params)>>,
    patch: Option<Operation<(String, Value, Params)>>,
    remove: Option<Operation<(String, Params)>>,
}

impl ServiceHandler {
    /// Starts a service whose operations share `state`.
    pub fn builder<S>(state: S) -> ServiceBuilder<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        ServiceBuilder {
            state,
            handler: ServiceHandler::default(),
        }
    }

    pub fn supports(&self, operation: OperationKind) -> bool {
        match operation {
            OperationKind::Find => self.find.is_some(),
            OperationKind::Get => self.get.is_some(),
            OperationKind::Create => self.create.is_some(),
            OperationKind::Patch => self.patch.is_some(),
            OperationKind::Remove => self.remove.is_some(),
        }
    }

    /// Supported operations in canonical order.
    pub fn operations(&self) -> Vec<OperationKind> {
        OperationKind::ALL
            .into_iter()
            .filter(|op| self.supports(*op))
            .collect()
    }

    pub async fn find(&self, params: Params) -> ServiceResult<Value> {
        let op = self.find.as_ref().ok_or_else(|| not_allowed(OperationKind::Find))?;
        op(params).await
    }

    pub async fn get(&self, id: String, params: Params) -> ServiceResult<Value> {
        let op = self.get.as_ref().ok_or_else(|| not_allowed(OperationKind::Get))?;
        op((id, params)).await
    }

    pub async fn create(&self, data: Value, params: Params) -> ServiceResult<Value> {
        let op = self.create.as_ref().ok_or_else(|| not_allowed(OperationKind::Create))?;
        op((data, params)).await
    }

    pub async fn patch(&self, id: String, data: Value, params: Params) -> ServiceResult<Value> {
        let op = self.patch.as_ref().ok_or_else(|| not_allowed(OperationKind::Patch))?;
        op((id, data, params)).await
    }

    pub async fn remove(&self, id: String, params: Params) -> ServiceResult<Value> {
        let op = self.remove.as_ref().ok_or_else(|| not_allowed(OperationKind::Remove))?;
        op((id, params)).await
    }
}

impl std::fmt::Debug for ServiceHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceHandler")
            .field("operations", &self.operations())
            .finish()
    }
}

fn not_allowed(operation: OperationKind) -> ServiceError {
    ServiceError::MethodNotAllowed(format!("Method `{operation}` is not supported by this endpoint."))
}

/// Builds a [`ServiceHandler`]; every operation receives a clone of the shared state.
pub struct ServiceBuilder<S> {
    state: S,
    handler: ServiceHandler,
}

impl<S> ServiceBuilder<S>
where
    S: Clone + Send + Sync + 'static,
{
    pub fn find<F, Fut, T>(mut self, f: F) -> Self
    where
        F: Fn(S, Params) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ServiceResult<T>> + Send + 'static,
        T: Serialize + Send + 'static,
    {
        let state = self.state.clone();
        self.handler.find = Some(Arc::new(move |params: Params| {
            erase(f(state.clone(), params))
        }));
        self
    }

    pub fn get<F, Fut, T>(mut self, f: F) -> Self
    where
        F: Fn(S, String, Params) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ServiceResult<T>> + Send + 'static,
        T: Serialize + Send + 'static,
    {
        let state = self.state.clone();
        self.handler.get = Some(Arc::new(move |(id, params): (String, Params)| {
            erase(f(state.clone(), id, params))
        }));
        self
    }

    pub fn create<F, Fut, T>(mut self, f: F) -> Self
    where
        F: Fn(S, Value, Params) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ServiceResult<T>> + Send + 'static,
        T: Serialize + Send + 'static,
    {
        let state = self.state.clone();
        self.handler.create = Some(Arc::new(move |(data, params): (Value, Params)| {
            erase(f(state.clone(), data, params))
        }));
        self
    }

    pub fn patch<F, Fut, T>(mut self, f: F) -> Self
    where
        F: Fn(S, String, Value, Params) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ServiceResult<T>> + Send + 'static,
        T: Serialize + Send + 'static,
    {
        let state = self.state.clone();
        self.handler.patch = Some(Arc::new(move |(id, data, params): (String, Value, Params)| {
            erase(f(state.clone(), id, data, params))
        }));
        self
    }

    pub fn remove<F, Fut, T>(mut self, f: F) -> Self
    where
        F: Fn(S, String, Params) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ServiceResult<T>> + Send + 'static,
        T: Serialize + Send + 'static,
    {
        let state = self.state.clone();
        self.handler.remove = Some(Arc::new(move |(id, params): (String, Params)| {
            erase(f(state.clone(), id, params))
        }));
        self
    }

    pub fn build(self) -> ServiceHandler {
        self.handler
    }
}

fn erase<Fut, T>(fut: Fut) -> BoxFuture<'static, ServiceResult<Value>>
where
    Fut: Future<Output = ServiceResult<T>> + Send + 'static,
    T: Serialize + Send + 'static,
{
    Box::pin(async move {
        let value = fut.await?;
        Ok(serde_json::to_value(value)?)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn remove_find_create() -> ServiceHandler {
        ServiceHandler::builder(())
            .remove(|_, id, _| async move { Ok(json!({ "removed": id })) })
            .find(|_, _| async { Ok(json!([])) })
            .create(|_, data, _| async move { Ok(data) })
            .build()
    }

    #[test]
    fn operations_are_listed_in_canonical_order() {
        let handler = remove_find_create();
        assert_eq!(
            handler.operations(),
            vec![OperationKind::Find, OperationKind::Create, OperationKind::Remove]
        );
        assert!(!handler.supports(OperationKind::Get));
        assert!(!handler.supports(OperationKind::Patch));
    }

    #[tokio::test]
    async fn operations_receive_state_and_arguments() {
        let handler = ServiceHandler::builder(String::from("users"))
            .get(|state, id, _| async move { Ok(format!("{state}/{id}")) })
            .build();
        let value = handler.get("7".into(), Params::default()).await.unwrap();
        assert_eq!(value, json!("users/7"));
    }

    #[tokio::test]
    async fn missing_operation_is_method_not_allowed() {
        let handler = remove_find_create();
        let err = handler
            .patch("1".into(), json!({}), Params::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::MethodNotAllowed(_)));
        assert_eq!(err.status(), axum::http::StatusCode::METHOD_NOT_ALLOWED);
    }

    #[test]
    fn debug_lists_operations() {
        let debug = format!("{:?}", remove_find_create());
        assert_eq!(debug, "ServiceHandler { operations: [Find, Create, Remove] }");
    }
}
