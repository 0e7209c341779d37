use tracing::warn;
use utoipa::PartialSchema;

use playground_core::JsonSchema;

/// Builds a [`JsonSchema`] from a type deriving `utoipa::ToSchema`.
///
/// ```ignore
/// use playground_kit::JsonSchemaExt;
/// let schema = JsonSchema::of::<CreateMessage>();
/// ```
pub trait JsonSchemaExt {
    fn of<T: PartialSchema>() -> Self;
}

impl JsonSchemaExt for JsonSchema {
    fn of<T: PartialSchema>() -> Self {
        schema_of::<T>()
    }
}

/// Converts the OpenAPI schema of `T` into a [`JsonSchema`].
///
/// Falls back to an empty object schema if the conversion fails.
pub fn schema_of<T: PartialSchema>() -> JsonSchema {
    let converted = serde_json::to_value(T::schema()).and_then(serde_json::from_value);
    match converted {
        Ok(schema) => schema,
        Err(err) => {
            warn!(type_name = std::any::type_name::<T>(), %err, "schema conversion failed");
            JsonSchema::object()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use playground_core::SchemaType;
    use serde::{Deserialize, Serialize};
    use utoipa::ToSchema;

    #[derive(Serialize, Deserialize, ToSchema)]
    #[allow(dead_code)]
    struct Message {
        /// Message body
        #[schema(min_length = 1)]
        text: String,
        user_id: Option<i64>,
    }

    #[test]
    fn converts_derived_schemas() {
        let schema = JsonSchema::of::<Message>();
        assert_eq!(schema.schema_type, Some(SchemaType::Single("object".into())));
        assert!(schema.is_required("text"));
        assert!(!schema.is_required("user_id"));

        let properties = schema.properties.as_ref().unwrap();
        let text = &properties["text"];
        assert_eq!(text.min_length, Some(1));
        assert_eq!(text.description.as_deref(), Some("Message body"));
        assert!(properties.contains_key("user_id"));
    }

    #[derive(ToSchema)]
    #[allow(dead_code)]
    struct Ordered {
        zeta: i64,
        alpha: String,
        mid: bool,
    }

    #[test]
    fn keeps_field_declaration_order() {
        let schema = JsonSchema::of::<Ordered>();
        let names: Vec<&str> = schema
            .properties
            .as_ref()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(names, ["zeta", "alpha", "mid"]);
    }

    #[test]
    fn primitives_convert_too() {
        let schema = schema_of::<String>();
        assert_eq!(schema.type_label(), "string");
    }
}
