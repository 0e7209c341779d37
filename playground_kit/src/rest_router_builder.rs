use std::collections::HashMap;

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    response::{IntoResponse, Response},
    Json, Router,
};
use percent_encoding::percent_decode_str;
use serde_json::{json, Map, Value};
use tracing::{debug, warn};

use crate::error::{Error, Result, ServiceError, ServiceResult};
use crate::handler::{Params, ServiceHandler};
use crate::registry::ServiceRegistry;
use playground_core::OperationKind;

/// Largest request body the router will buffer.
const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Builds a router serving every service of a [`ServiceRegistry`].
///
/// Routes are resolved per request against the registry, so services added or
/// removed after the router is built are picked up immediately.
#[derive(Default, Clone)]
pub struct RestRouterBuilder {
    registry: Option<ServiceRegistry>,
}

impl RestRouterBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn registry(mut self, registry: ServiceRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn build(self) -> Result<Router> {
        let registry = self
            .registry
            .ok_or_else(|| Error::Config("service registry not provided".to_string()))?;
        let route_handler = move |req: Request<Body>| {
            let registry = registry.clone();
            async move {
                match serve(&registry, req).await {
                    Ok(value) => value,
                    Err(e) => e.into_response(),
                }
            }
        };
        Ok(Router::new().fallback(route_handler))
    }
}

/// The service a request targets and the id, if the URL names one.
struct Target {
    path: String,
    handler: std::sync::Arc<ServiceHandler>,
    id: Option<String>,
}

async fn resolve(registry: &ServiceRegistry, uri_path: &str) -> ServiceResult<Target> {
    let trimmed = uri_path.trim_end_matches('/');
    if let Some(service) = registry.get(trimmed).await {
        return Ok(Target {
            path: service.path,
            handler: service.handler,
            id: None,
        });
    }
    if let Some((collection, raw_id)) = trimmed.rsplit_once('/') {
        if let Some(service) = registry.get(collection).await {
            let id = percent_decode_str(raw_id).decode_utf8_lossy().into_owned();
            return Ok(Target {
                path: service.path,
                handler: service.handler,
                id: Some(id),
            });
        }
    }
    Err(ServiceError::not_found(format!("Page not found: {uri_path}"))
        .with_data(json!({ "path": uri_path })))
}

fn operation_for(method: &Method, has_id: bool) -> Option<OperationKind> {
    match (method, has_id) {
        (&Method::GET, false) => Some(OperationKind::Find),
        (&Method::GET, true) => Some(OperationKind::Get),
        (&Method::POST, false) => Some(OperationKind::Create),
        (&Method::PATCH, true) => Some(OperationKind::Patch),
        (&Method::DELETE, true) => Some(OperationKind::Remove),
        _ => None,
    }
}

async fn serve(registry: &ServiceRegistry, req: Request<Body>) -> ServiceResult<Response> {
    let (parts, body) = req.into_parts();
    let target = resolve(registry, parts.uri.path()).await?;
    let operation = operation_for(&parts.method, target.id.is_some()).ok_or_else(|| {
        ServiceError::MethodNotAllowed(format!(
            "Method `{}` is not supported on `{}`.",
            parts.method,
            parts.uri.path()
        ))
    })?;
    debug!(service = %target.path, %operation, id = ?target.id, "routing request");

    let params = Params {
        query: parse_query(parts.uri.query().unwrap_or_default()),
        headers: parts
            .headers
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_ascii_lowercase(), v.to_string()))
            })
            .collect::<HashMap<_, _>>(),
        provider: Some("rest"),
    };

    let handler = &target.handler;
    let id = target.id.unwrap_or_default();
    let result = match operation {
        OperationKind::Find => handler.find(params).await,
        OperationKind::Get => handler.get(id, params).await,
        OperationKind::Create => {
            let data = read_json(body).await?;
            handler.create(data, params).await
        }
        OperationKind::Patch => {
            let data = read_json(body).await?;
            handler.patch(id, data, params).await
        }
        OperationKind::Remove => handler.remove(id, params).await,
    };

    match result {
        Ok(value) => {
            let status = if operation == OperationKind::Create {
                StatusCode::CREATED
            } else {
                StatusCode::OK
            };
            Ok((status, Json(value)).into_response())
        }
        Err(e) => {
            warn!(service = %target.path, %operation, error = %e, "service call failed");
            Err(e)
        }
    }
}

/// Parses a query string, typing values on a best-effort basis: integers,
/// floats, booleans and JSON objects/arrays are decoded, the rest stays text.
pub fn parse_query(query: &str) -> Map<String, Value> {
    let mut merged = Map::new();
    if let Ok(pairs) = serde_urlencoded::from_str::<Vec<(String, String)>>(query) {
        for (k, v) in pairs {
            merged.insert(k, type_value(v));
        }
    }
    merged
}

fn type_value(v: String) -> Value {
    if let Ok(n) = v.parse::<i64>() {
        return json!(n);
    }
    if let Ok(n) = v.parse::<f64>() {
        if n.is_finite() {
            return json!(n);
        }
    }
    if v.eq_ignore_ascii_case("true") || v.eq_ignore_ascii_case("false") {
        return Value::Bool(v.eq_ignore_ascii_case("true"));
    }
    if v.starts_with('{') || v.starts_with('[') {
        if let Ok(value) = serde_json::from_str::<Value>(&v) {
            return value;
        }
    }
    Value::String(v)
}

async fn read_json(body: Body) -> ServiceResult<Value> {
    let bytes = axum::body::to_bytes(body, MAX_BODY_BYTES)
        .await
        .map_err(|e| ServiceError::bad_request(format!("Failed to read request body: {e}")))?;
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Object(Map::new()));
    }
    serde_json::from_slice(&bytes)
        .map_err(|e| ServiceError::bad_request(format!("Invalid JSON body: {e}")))
}
