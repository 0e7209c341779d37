use std::collections::BTreeMap;

use reqwest::header::HeaderMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{DispatchError, NormalizedError};

/// The uniform response shape, produced for 2xx and for 4xx/5xx responses alike.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedResponse {
    /// Parsed JSON body; `null` when the body is empty or not JSON.
    pub data: Value,
    pub status: u16,
    pub status_text: String,
    pub headers: BTreeMap<String, String>,
}

impl NormalizedResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Parses a raw body leniently: anything that is not JSON becomes `null`.
    pub fn parse_body(body: &[u8]) -> Value {
        serde_json::from_slice(body).unwrap_or(Value::Null)
    }

    /// Flattens response headers; repeated headers are joined with `, `.
    pub fn collect_headers(headers: &HeaderMap) -> BTreeMap<String, String> {
        let mut result = BTreeMap::<String, String>::new();
        for (name, value) in headers {
            let value = String::from_utf8_lossy(value.as_bytes()).into_owned();
            result
                .entry(name.as_str().to_string())
                .and_modify(|existing| {
                    existing.push_str(", ");
                    existing.push_str(&value);
                })
                .or_insert(value);
        }
        result
    }
}

/// The three terminal outcomes of a dispatch.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Success(NormalizedResponse),
    HttpFailure(NormalizedResponse, NormalizedError),
    /// No response exists. The code is `NETWORK_ERROR` for transport
    /// failures and `INVALID_REQUEST` when the request could not be built.
    NetworkFailure(NormalizedError),
}

impl Outcome {
    /// Classifies a received response.
    pub fn from_response(response: NormalizedResponse) -> Self {
        if response.is_success() {
            Outcome::Success(response)
        } else {
            let error = NormalizedError::from_response(&response);
            Outcome::HttpFailure(response, error)
        }
    }

    /// The response, if one was received at all.
    pub fn response(&self) -> Option<&NormalizedResponse> {
        match self {
            Outcome::Success(response) | Outcome::HttpFailure(response, _) => Some(response),
            Outcome::NetworkFailure(_) => None,
        }
    }

    pub fn error(&self) -> Option<&NormalizedError> {
        match self {
            Outcome::Success(_) => None,
            Outcome::HttpFailure(_, error) | Outcome::NetworkFailure(error) => Some(error),
        }
    }

    pub fn into_result(self) -> Result<NormalizedResponse, DispatchError> {
        match self {
            Outcome::Success(response) => Ok(response),
            Outcome::HttpFailure(response, error) => Err(DispatchError::Http {
                response: Box::new(response),
                error,
            }),
            Outcome::NetworkFailure(error) => Err(DispatchError::Network(error)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::{HeaderValue, SET_COOKIE};
    use serde_json::json;

    fn response(status: u16) -> NormalizedResponse {
        NormalizedResponse {
            data: json!({ "message": "nope" }),
            status,
            status_text: String::new(),
            headers: BTreeMap::new(),
        }
    }

    #[test]
    fn lenient_body_parsing() {
        assert_eq!(NormalizedResponse::parse_body(b"{\"a\":1}"), json!({ "a": 1 }));
        assert_eq!(NormalizedResponse::parse_body(b"<html>"), Value::Null);
        assert_eq!(NormalizedResponse::parse_body(b""), Value::Null);
    }

    #[test]
    fn classification_by_status() {
        assert!(matches!(Outcome::from_response(response(201)), Outcome::Success(_)));
        assert!(matches!(Outcome::from_response(response(299)), Outcome::Success(_)));

        let outcome = Outcome::from_response(response(404));
        assert_eq!(outcome.error().map(|e| e.message.as_str()), Some("nope"));
        assert_eq!(outcome.response().map(|r| r.status), Some(404));

        let err = Outcome::from_response(response(301)).into_result().unwrap_err();
        assert_eq!(err.response().map(|r| r.status), Some(301));
    }

    #[test]
    fn repeated_headers_are_joined() {
        let mut headers = HeaderMap::new();
        headers.append(SET_COOKIE, HeaderValue::from_static("a=1"));
        headers.append(SET_COOKIE, HeaderValue::from_static("b=2"));
        let collected = NormalizedResponse::collect_headers(&headers);
        assert_eq!(collected["set-cookie"], "a=1, b=2");
    }
}
