use std::fmt;

use indexmap::IndexMap;
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::NormalizedError;
use crate::operation::OperationKind;

/// Characters escaped inside a single path segment.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Identifier of a single resource; either a string or an integer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResourceId {
    Number(i64),
    Text(String),
}

impl ResourceId {
    fn is_empty(&self) -> bool {
        matches!(self, ResourceId::Text(text) if text.is_empty())
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceId::Number(n) => write!(f, "{n}"),
            ResourceId::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for ResourceId {
    fn from(value: i64) -> Self {
        ResourceId::Number(value)
    }
}

impl From<i32> for ResourceId {
    fn from(value: i32) -> Self {
        ResourceId::Number(i64::from(value))
    }
}

impl From<u32> for ResourceId {
    fn from(value: u32) -> Self {
        ResourceId::Number(i64::from(value))
    }
}

impl From<&str> for ResourceId {
    fn from(value: &str) -> Self {
        ResourceId::Text(value.to_string())
    }
}

impl From<String> for ResourceId {
    fn from(value: String) -> Self {
        ResourceId::Text(value)
    }
}

/// The request data supplied by the caller.
///
/// Text typed by a user that is not valid JSON is kept as [`Payload::Raw`] and
/// sent verbatim instead of being rejected.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Json(Value),
    Raw(String),
}

impl Payload {
    /// Parses `text` as JSON, falling back to the raw text.
    pub fn parse_lenient(text: &str) -> Self {
        match serde_json::from_str(text) {
            Ok(value) => Payload::Json(value),
            Err(_) => Payload::Raw(text.to_string()),
        }
    }

    fn to_body(&self) -> String {
        match self {
            Payload::Json(value) => value.to_string(),
            Payload::Raw(text) => text.clone(),
        }
    }
}

impl From<Value> for Payload {
    fn from(value: Value) -> Self {
        Payload::Json(value)
    }
}

/// A transport-independent description of one call against a service.
#[derive(Debug, Clone, PartialEq)]
pub struct AbstractRequest {
    pub method: OperationKind,
    pub service_path: String,
    pub query: IndexMap<String, Value>,
    pub data: Option<Payload>,
    pub headers: IndexMap<String, String>,
    pub id: Option<ResourceId>,
}

impl AbstractRequest {
    pub fn new(method: OperationKind, service_path: impl Into<String>) -> Self {
        Self {
            method,
            service_path: service_path.into(),
            query: IndexMap::new(),
            data: None,
            headers: IndexMap::new(),
            id: None,
        }
    }

    pub fn find(service_path: impl Into<String>) -> Self {
        Self::new(OperationKind::Find, service_path)
    }

    pub fn get(service_path: impl Into<String>, id: impl Into<ResourceId>) -> Self {
        Self::new(OperationKind::Get, service_path).with_id(id)
    }

    pub fn create(service_path: impl Into<String>, data: impl Into<Payload>) -> Self {
        Self::new(OperationKind::Create, service_path).with_data(data)
    }

    pub fn patch(
        service_path: impl Into<String>,
        id: impl Into<ResourceId>,
        data: impl Into<Payload>,
    ) -> Self {
        Self::new(OperationKind::Patch, service_path)
            .with_id(id)
            .with_data(data)
    }

    pub fn remove(service_path: impl Into<String>, id: impl Into<ResourceId>) -> Self {
        Self::new(OperationKind::Remove, service_path).with_id(id)
    }

    pub fn with_id(mut self, id: impl Into<ResourceId>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_data(mut self, data: impl Into<Payload>) -> Self {
        self.data = Some(data.into());
        self
    }

    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.query.insert(name.into(), value.into());
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Builds the concrete HTTP request against `base_url`.
    ///
    /// # Errors
    ///
    /// Fails when a caller supplied header name or value is not valid HTTP.
    pub fn prepare(&self, base_url: &str) -> Result<PreparedRequest, NormalizedError> {
        let mut url = join_url(base_url, &self.service_path, self.resource_id());
        let query = encode_query(&self.query);
        if !query.is_empty() {
            url.push('?');
            url.push_str(&query);
        }

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        for (name, value) in &self.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|err| NormalizedError::invalid_request(format!("header `{name}`: {err}")))?;
            let value = HeaderValue::from_str(value)
                .map_err(|err| NormalizedError::invalid_request(format!("header `{name}`: {err}")))?;
            headers.insert(name, value);
        }

        let body = if self.method.carries_body() {
            self.data.as_ref().map(Payload::to_body)
        } else {
            None
        };

        Ok(PreparedRequest {
            method: self.method.http_method(),
            url,
            headers,
            body,
        })
    }

    fn resource_id(&self) -> Option<&ResourceId> {
        if !self.method.addresses_resource() {
            return None;
        }
        self.id.as_ref().filter(|id| !id.is_empty())
    }
}

/// The wire-level shape of an [`AbstractRequest`].
#[derive(Debug, Clone)]
pub struct PreparedRequest {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    pub body: Option<String>,
}

fn join_url(base_url: &str, service_path: &str, id: Option<&ResourceId>) -> String {
    let base = base_url.trim_end_matches('/');
    let path = service_path.trim_start_matches('/');
    let mut url = format!("{base}/{path}");
    if let Some(id) = id {
        let trimmed = url.trim_end_matches('/').len();
        url.truncate(trimmed);
        url.push('/');
        url.extend(utf8_percent_encode(&id.to_string(), PATH_SEGMENT));
    }
    url
}

/// Serializes the query map, dropping `null` and empty-string values.
pub fn encode_query(query: &IndexMap<String, Value>) -> String {
    let pairs: Vec<(&str, String)> = query
        .iter()
        .filter_map(|(name, value)| stringify_query_value(value).map(|v| (name.as_str(), v)))
        .collect();
    if pairs.is_empty() {
        return String::new();
    }
    serde_urlencoded::to_string(pairs).unwrap_or_default()
}

fn stringify_query_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
