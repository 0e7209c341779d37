use std::fmt;
use std::str::FromStr;

use reqwest::Method;
use serde::{Deserialize, Serialize};

/// One of the five canonical service operations.
///
/// The declaration order is the canonical order used whenever a list of
/// operations is presented: `find, get, create, patch, remove`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    Find,
    Get,
    Create,
    Patch,
    Remove,
}

impl OperationKind {
    /// All operations, in canonical order.
    pub const ALL: [OperationKind; 5] = [
        OperationKind::Find,
        OperationKind::Get,
        OperationKind::Create,
        OperationKind::Patch,
        OperationKind::Remove,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            OperationKind::Find => "find",
            OperationKind::Get => "get",
            OperationKind::Create => "create",
            OperationKind::Patch => "patch",
            OperationKind::Remove => "remove",
        }
    }

    /// The HTTP verb an operation is sent with. No operation maps to PUT or HEAD.
    pub fn http_method(self) -> Method {
        match self {
            OperationKind::Find | OperationKind::Get => Method::GET,
            OperationKind::Create => Method::POST,
            OperationKind::Patch => Method::PATCH,
            OperationKind::Remove => Method::DELETE,
        }
    }

    /// Whether the operation addresses a single resource, i.e. carries `/{id}`.
    pub fn addresses_resource(self) -> bool {
        match self {
            OperationKind::Get | OperationKind::Patch | OperationKind::Remove => true,
            OperationKind::Find | OperationKind::Create => false,
        }
    }

    /// Whether the operation sends the request data as its body.
    pub fn carries_body(self) -> bool {
        match self {
            OperationKind::Create | OperationKind::Patch => true,
            OperationKind::Find | OperationKind::Get | OperationKind::Remove => false,
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown operation `{0}`, expected one of find, get, create, patch, remove")]
pub struct UnknownOperation(pub String);

impl FromStr for OperationKind {
    type Err = UnknownOperation;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OperationKind::ALL
            .into_iter()
            .find(|op| op.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownOperation(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verb_mapping_is_total_and_never_put_or_head() {
        let verbs: Vec<Method> = OperationKind::ALL.iter().map(|op| op.http_method()).collect();
        assert_eq!(
            verbs,
            vec![Method::GET, Method::GET, Method::POST, Method::PATCH, Method::DELETE]
        );
        assert!(!verbs.contains(&Method::PUT));
        assert!(!verbs.contains(&Method::HEAD));
    }

    #[test]
    fn canonical_order_matches_ord() {
        let mut shuffled = vec![OperationKind::Remove, OperationKind::Find, OperationKind::Create];
        shuffled.sort();
        assert_eq!(
            shuffled,
            vec![OperationKind::Find, OperationKind::Create, OperationKind::Remove]
        );
    }

    #[test]
    fn serializes_lowercase() {
        let json = serde_json::to_string(&OperationKind::ALL).unwrap();
        assert_eq!(json, r#"["find","get","create","patch","remove"]"#);
    }

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("PATCH".parse::<OperationKind>(), Ok(OperationKind::Patch));
        assert!("update".parse::<OperationKind>().is_err());
    }
}
