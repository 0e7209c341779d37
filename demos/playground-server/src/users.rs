use chrono::{DateTime, Utc};
use serde_json::{json, Map, Value};

use crate::store::{search_term, FindQuery, MemoryStore, Record};
use crate::timestamp;
use playground_kit::{service_dto, JsonSchema, ServiceError, ServiceHandler, ServiceMetadata};

#[service_dto]
pub struct User {
    pub id: i64,
    pub email: String,
    pub name: String,
    pub avatar: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[service_dto]
pub struct NewUser {
    pub email: String,
    pub name: String,
    pub avatar: Option<String>,
}

impl Record for User {
    const KIND: &'static str = "User";

    fn id(&self) -> i64 {
        self.id
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }
}

pub fn seed() -> Vec<User> {
    [
        (1, "john@example.com", "John Doe", "2023-01-01T00:00:00Z"),
        (2, "jane@example.com", "Jane Smith", "2023-01-02T00:00:00Z"),
        (3, "bob@example.com", "Bob Johnson", "2023-01-03T00:00:00Z"),
    ]
    .into_iter()
    .map(|(id, email, name, at)| User {
        id,
        email: email.to_string(),
        name: name.to_string(),
        avatar: Some(format!("https://i.pravatar.cc/150?img={id}")),
        created_at: timestamp(at),
        updated_at: timestamp(at),
    })
    .collect()
}

/// Written out by hand to carry the `email`/`uri` formats and to forbid
/// unknown properties.
pub fn schema() -> JsonSchema {
    JsonSchema::object()
        .property("id", JsonSchema::number().description("Unique identifier"))
        .property(
            "email",
            JsonSchema::string()
                .format("email")
                .description("User email address"),
        )
        .property(
            "name",
            JsonSchema::string().min_length(1).description("User full name"),
        )
        .property(
            "avatar",
            JsonSchema::string().format("uri").description("Avatar image URL"),
        )
        .property(
            "createdAt",
            JsonSchema::string()
                .format("date-time")
                .description("Creation timestamp"),
        )
        .property(
            "updatedAt",
            JsonSchema::string()
                .format("date-time")
                .description("Last update timestamp"),
        )
        .required(["email", "name"])
        .additional_properties(false)
}

pub fn metadata() -> ServiceMetadata {
    ServiceMetadata::new()
        .schema(schema())
        .description("User management service")
}

fn validate(input: &NewUser) -> Result<(), ServiceError> {
    let mut errors = Map::new();
    if !input.email.contains('@') {
        errors.insert("email".into(), json!("must be a valid email address"));
    }
    if input.name.trim().is_empty() {
        errors.insert("name".into(), json!("must not be empty"));
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ServiceError::Unprocessable {
            message: "Invalid user data".to_string(),
            errors: Value::Object(errors),
        })
    }
}

/// `find` filters on `email` and `name`, both case-insensitive substrings.
pub fn handler(store: MemoryStore<User>) -> ServiceHandler {
    ServiceHandler::builder(store)
        .find(|store, params| async move {
            let query = FindQuery::from_query(&params.query)?;
            let email = search_term(&params.query, "email");
            let name = search_term(&params.query, "name");
            let page = store
                .find(&query, |u: &User| {
                    email
                        .as_ref()
                        .map_or(true, |e| u.email.to_lowercase().contains(e))
                        && name
                            .as_ref()
                            .map_or(true, |n| u.name.to_lowercase().contains(n))
                })
                .await;
            Ok(page)
        })
        .get(|store, id, _| async move { store.get(&id).await })
        .create(|store, data, _| async move {
            let input: NewUser = serde_json::from_value(data)?;
            validate(&input)?;
            let now = Utc::now();
            let user = store
                .insert(|id| User {
                    id,
                    email: input.email,
                    name: input.name,
                    avatar: input.avatar,
                    created_at: now,
                    updated_at: now,
                })
                .await;
            Ok(user)
        })
        .patch(|store, id, data, _| async move { store.patch(&id, data).await })
        .remove(|store, id, _| async move { store.remove(&id).await })
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use playground_kit::Params;

    fn service() -> ServiceHandler {
        handler(MemoryStore::new(seed()))
    }

    fn query(value: Value) -> Params {
        Params::with_query(value.as_object().cloned().unwrap_or_default())
    }

    #[test]
    fn schema_matches_the_documented_shape() {
        let schema = serde_json::to_value(schema()).unwrap();
        assert_eq!(schema["required"], json!(["email", "name"]));
        assert_eq!(schema["additionalProperties"], json!(false));
        assert_eq!(schema["properties"]["email"]["format"], "email");
    }

    #[tokio::test]
    async fn find_is_paginated_and_sortable() {
        let page = service()
            .find(query(json!({ "$sort": { "name": 1 }, "$limit": 2 })))
            .await
            .unwrap();
        assert_eq!(page["total"], 3);
        assert_eq!(page["limit"], 2);
        assert_eq!(page["skip"], 0);
        assert_eq!(page["data"][0]["name"], "Bob Johnson");
        assert_eq!(page["data"].as_array().unwrap().len(), 2);

        let page = service().find(query(json!({ "name": "jane" }))).await.unwrap();
        assert_eq!(page["total"], 1);
        assert_eq!(page["data"][0]["email"], "jane@example.com");
    }

    #[tokio::test]
    async fn numeric_search_text_is_not_ignored() {
        let page = service().find(query(json!({ "name": 123 }))).await.unwrap();
        assert_eq!(page["total"], 0);

        let page = service().find(query(json!({ "email": false }))).await.unwrap();
        assert_eq!(page["total"], 0);
    }

    #[tokio::test]
    async fn create_then_patch_then_remove() {
        let users = service();
        let created = users
            .create(json!({ "email": "ada@example.com", "name": "Ada" }), Params::default())
            .await
            .unwrap();
        assert_eq!(created["id"], 4);
        assert_eq!(created["avatar"], Value::Null);

        let patched = users
            .patch("4".into(), json!({ "name": "Ada Lovelace" }), Params::default())
            .await
            .unwrap();
        assert_eq!(patched["name"], "Ada Lovelace");
        assert_eq!(patched["email"], "ada@example.com");

        let removed = users.remove("4".into(), Params::default()).await.unwrap();
        assert_eq!(removed["id"], 4);
        assert!(users.get("4".into(), Params::default()).await.is_err());
    }

    #[tokio::test]
    async fn create_reports_field_errors() {
        let err = service()
            .create(json!({ "email": "nope", "name": "" }), Params::default())
            .await
            .unwrap_err();
        let body = err.to_body();
        assert_eq!(body["code"], 422);
        assert!(body["errors"].get("email").is_some());
        assert!(body["errors"].get("name").is_some());
    }
}
