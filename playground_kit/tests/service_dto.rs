use playground_kit::{service_dto, JsonSchema, JsonSchemaExt};
use serde_json::json;

/// A scheduled task.
#[service_dto]
pub struct Task {
    pub task_id: i64,
    /// What needs doing
    pub title: String,
    pub due_date: Option<String>,
}

#[service_dto(rename_all = "snake_case")]
pub struct LegacyTask {
    pub task_id: i64,
}

#[service_dto]
pub enum Priority {
    Low,
    UrgentNow,
}

#[test]
fn camel_case_is_the_default() {
    let task = Task {
        task_id: 1,
        title: "write docs".into(),
        due_date: None,
    };
    let value = serde_json::to_value(&task).unwrap();
    assert_eq!(value, json!({ "taskId": 1, "title": "write docs", "dueDate": null }));

    let parsed: Task = serde_json::from_value(json!({ "taskId": 2, "title": "x" })).unwrap();
    assert_eq!(parsed.task_id, 2);
    assert!(parsed.due_date.is_none());
}

#[test]
fn rename_rule_can_be_overridden() {
    let value = serde_json::to_value(LegacyTask { task_id: 3 }).unwrap();
    assert_eq!(value, json!({ "task_id": 3 }));
    assert_eq!(serde_json::to_value(Priority::UrgentNow).unwrap(), json!("urgentNow"));
}

#[test]
fn schema_follows_the_serialized_names() {
    let schema = JsonSchema::of::<Task>();
    assert!(schema.is_required("taskId"));
    assert!(schema.is_required("title"));
    assert!(!schema.is_required("dueDate"));
    let properties = schema.properties.unwrap();
    assert_eq!(
        properties["title"].description.as_deref(),
        Some("What needs doing")
    );
}
