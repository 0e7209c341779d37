use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::store::{search_term, FindQuery, MemoryStore, Record};
use crate::timestamp;
use playground_kit::{
    service_dto, JsonSchema, JsonSchemaExt, ServiceError, ServiceHandler, ServiceMetadata,
};

/// A chat message.
#[service_dto]
pub struct Message {
    /// Unique identifier
    pub id: i64,
    /// Message content
    #[schema(min_length = 1)]
    pub text: String,
    /// ID of the user who created the message
    pub user_id: i64,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

/// Body of `create`.
#[service_dto]
pub struct NewMessage {
    pub text: String,
    #[serde(default)]
    pub user_id: i64,
}

impl Record for Message {
    const KIND: &'static str = "Message";

    fn id(&self) -> i64 {
        self.id
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }
}

pub fn seed() -> Vec<Message> {
    [
        (1, "Hello, world!", 1, "2023-01-01T10:00:00Z"),
        (2, "How are you doing?", 2, "2023-01-01T11:00:00Z"),
        (3, "Great to see you!", 1, "2023-01-01T12:00:00Z"),
        (4, "This is a test message", 3, "2023-01-01T13:00:00Z"),
    ]
    .into_iter()
    .map(|(id, text, user_id, at)| Message {
        id,
        text: text.to_string(),
        user_id,
        created_at: timestamp(at),
        updated_at: timestamp(at),
    })
    .collect()
}

pub fn metadata() -> ServiceMetadata {
    ServiceMetadata::new()
        .schema(JsonSchema::of::<Message>())
        .description("Message management service")
}

/// `find` filters on `text` (case-insensitive substring) and `userId`.
pub fn handler(store: MemoryStore<Message>) -> ServiceHandler {
    ServiceHandler::builder(store)
        .find(|store, params| async move {
            let query = FindQuery::from_query(&params.query)?;
            let text = search_term(&params.query, "text");
            let user_id = params.query.get("userId").and_then(Value::as_i64);
            let page = store
                .find(&query, |m: &Message| {
                    text.as_ref()
                        .map_or(true, |t| m.text.to_lowercase().contains(t))
                        && user_id.map_or(true, |id| m.user_id == id)
                })
                .await;
            Ok(page)
        })
        .get(|store, id, _| async move { store.get(&id).await })
        .create(|store, data, _| async move {
            let input: NewMessage = serde_json::from_value(data)?;
            if input.text.trim().is_empty() {
                return Err(ServiceError::Unprocessable {
                    message: "Message text must not be empty".to_string(),
                    errors: serde_json::json!({ "text": "must not be empty" }),
                });
            }
            let now = Utc::now();
            let message = store
                .insert(|id| Message {
                    id,
                    text: input.text,
                    user_id: input.user_id,
                    created_at: now,
                    updated_at: now,
                })
                .await;
            Ok(message)
        })
        .patch(|store, id, data, _| async move { store.patch(&id, data).await })
        .remove(|store, id, _| async move { store.remove(&id).await })
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use playground_kit::{OperationKind, Params};
    use serde_json::json;

    fn service() -> ServiceHandler {
        handler(MemoryStore::new(seed()))
    }

    #[test]
    fn supports_every_operation_and_exposes_a_schema() {
        assert_eq!(service().operations(), OperationKind::ALL);
        let schema = metadata().schema.unwrap();
        assert!(schema.is_required("text"));
        assert!(schema.properties.unwrap().contains_key("userId"));
    }

    #[tokio::test]
    async fn find_filters_by_user_and_text() {
        let mut query = serde_json::Map::new();
        query.insert("userId".into(), json!(1));
        let page = service().find(Params::with_query(query)).await.unwrap();
        assert_eq!(page["total"], 2);

        let mut query = serde_json::Map::new();
        query.insert("text".into(), json!("TEST"));
        let page = service().find(Params::with_query(query)).await.unwrap();
        assert_eq!(page["data"][0]["id"], 4);
    }

    #[tokio::test]
    async fn typed_search_values_still_filter() {
        let mut query = serde_json::Map::new();
        query.insert("text".into(), json!(true));
        let page = service().find(Params::with_query(query)).await.unwrap();
        assert_eq!(page["total"], 0);
    }

    #[tokio::test]
    async fn create_assigns_an_id_and_defaults_the_user() {
        let created = service()
            .create(json!({ "text": "hi" }), Params::default())
            .await
            .unwrap();
        assert_eq!(created["id"], 5);
        assert_eq!(created["text"], "hi");
        assert_eq!(created["userId"], 0);
    }

    #[tokio::test]
    async fn create_validates_its_input() {
        let err = service().create(json!({ "text": " " }), Params::default()).await;
        assert!(matches!(err, Err(ServiceError::Unprocessable { .. })));
        let err = service().create(json!({ "userId": 1 }), Params::default()).await;
        assert!(matches!(err, Err(ServiceError::BadRequest { .. })));
    }

    #[tokio::test]
    async fn unknown_ids_are_not_found() {
        let err = service().get("999".into(), Params::default()).await.unwrap_err();
        assert_eq!(err.to_string(), "Message with id 999 not found");
    }
}
