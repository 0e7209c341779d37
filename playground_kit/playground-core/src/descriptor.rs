use serde::{Deserialize, Serialize};

use crate::operation::OperationKind;
use crate::schema::JsonSchema;

/// Description of one registered service, as returned by the discovery endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceDescriptor {
    pub name: String,
    pub path: String,
    /// Supported operations in canonical order.
    pub methods: Vec<OperationKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<JsonSchema>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ServiceDescriptor {
    pub fn supports(&self, operation: OperationKind) -> bool {
        self.methods.contains(&operation)
    }
}

/// Derives a service name from its path by stripping exactly one leading `/`.
pub fn service_name(path: &str) -> &str {
    path.strip_prefix('/').unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_strips_one_separator_only() {
        assert_eq!(service_name("/users"), "users");
        assert_eq!(service_name("/api/users"), "api/users");
        assert_eq!(service_name("//odd"), "/odd");
        assert_eq!(service_name("bare"), "bare");
    }

    #[test]
    fn optional_fields_are_omitted() {
        let descriptor = ServiceDescriptor {
            name: "users".into(),
            path: "/users".into(),
            methods: vec![OperationKind::Find],
            schema: None,
            description: None,
        };
        let json = serde_json::to_string(&descriptor).unwrap();
        assert_eq!(json, r#"{"name":"users","path":"/users","methods":["find"]}"#);
    }
}
