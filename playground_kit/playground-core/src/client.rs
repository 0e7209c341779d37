use std::env;

use reqwest::Client;
use tracing::{debug, warn};

use crate::descriptor::ServiceDescriptor;
use crate::error::{DispatchError, NormalizedError, Result};
use crate::request::{AbstractRequest, PreparedRequest};
use crate::response::{NormalizedResponse, Outcome};

/// Environment variable holding the default target of a [`Dispatcher`].
pub const API_URL_ENV: &str = "PLAYGROUND_API_URL";
pub const DEFAULT_API_URL: &str = "http://localhost:3030";
pub const DEFAULT_SERVICES_PATH: &str = "/services";

/// Turns [`AbstractRequest`]s into HTTP calls and normalizes what comes back.
///
/// A dispatcher only holds its base URL and a connection pool; every call is a
/// single attempt with no retry, timeout or caching.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    base_url: String,
    client: Client,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::from_env()
    }
}

impl Dispatcher {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        Self {
            base_url: base_url.into(),
            client,
        }
    }

    /// Uses `PLAYGROUND_API_URL`, or `http://localhost:3030` when unset.
    pub fn from_env() -> Self {
        let base_url = env::var(API_URL_ENV)
            .ok()
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        Self::new(base_url)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Lists the services exposed by the discovery endpoint at `services_path`.
    pub async fn services(&self, services_path: &str) -> Result<Vec<ServiceDescriptor>> {
        let response = self.dispatch(&AbstractRequest::find(services_path)).await?;
        let services = serde_json::from_value(response.data)?;
        Ok(services)
    }

    /// Sends the request and returns the response for 2xx statuses.
    ///
    /// # Errors
    ///
    /// [`crate::DispatchError::Http`] for non-2xx responses (the response is
    /// embedded), [`crate::DispatchError::Network`] when nothing came back and
    /// [`crate::DispatchError::InvalidRequest`] when the request could not be
    /// built.
    pub async fn dispatch(&self, request: &AbstractRequest) -> Result<NormalizedResponse> {
        let prepared = self.prepare(request).map_err(DispatchError::InvalidRequest)?;
        self.send(prepared).await.into_result()
    }

    /// Builds the concrete HTTP call for `request` without sending it.
    ///
    /// # Errors
    ///
    /// Fails when a caller header is not a valid HTTP header.
    pub fn prepare(
        &self,
        request: &AbstractRequest,
    ) -> std::result::Result<PreparedRequest, NormalizedError> {
        request.prepare(&self.base_url)
    }

    /// Sends the request and classifies the result.
    ///
    /// A request that cannot be built is a `NetworkFailure` whose code is
    /// `INVALID_REQUEST`.
    pub async fn outcome(&self, request: &AbstractRequest) -> Outcome {
        match self.prepare(request) {
            Ok(prepared) => self.send(prepared).await,
            Err(error) => Outcome::NetworkFailure(error),
        }
    }

    async fn send(&self, prepared: PreparedRequest) -> Outcome {
        debug!(method = %prepared.method, url = %prepared.url, "dispatching request");

        let mut builder = self
            .client
            .request(prepared.method, &prepared.url)
            .headers(prepared.headers);
        if let Some(body) = prepared.body {
            builder = builder.body(body);
        }

        let response = match builder.send().await {
            Ok(response) => response,
            Err(err) => {
                warn!(url = %prepared.url, error = %err, "no response received");
                return Outcome::NetworkFailure(NormalizedError::network(transport_message(&err)));
            }
        };

        let status = response.status();
        let headers = NormalizedResponse::collect_headers(response.headers());
        // A body that cannot be read is treated like an unparseable one.
        let data = match response.bytes().await {
            Ok(bytes) => NormalizedResponse::parse_body(&bytes),
            Err(err) => {
                warn!(url = %prepared.url, error = %err, "failed to read response body");
                serde_json::Value::Null
            }
        };
        debug!(status = status.as_u16(), "response received");

        Outcome::from_response(NormalizedResponse {
            data,
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            headers,
        })
    }
}

fn transport_message(err: &reqwest::Error) -> String {
    let mut message = err.to_string();
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
