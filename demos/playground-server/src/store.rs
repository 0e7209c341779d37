//! In-memory record storage shared by the demo services.

use std::cmp::Ordering;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{json, Map, Value};
use tokio::sync::RwLock;

use playground_kit::{ServiceError, ServiceResult};

/// A record kept in a [`MemoryStore`].
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Used in error messages, e.g. `Message with id 7 not found`.
    const KIND: &'static str;

    fn id(&self) -> i64;

    /// Marks the record as modified at `now`.
    fn touch(&mut self, now: DateTime<Utc>);
}

/// Result of `find`.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub total: usize,
    pub limit: usize,
    pub skip: usize,
    pub data: Vec<T>,
}

/// `$limit`, `$skip` and `$sort` taken from a query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FindQuery {
    pub limit: Option<usize>,
    pub skip: usize,
    /// Field name and whether to sort descending.
    pub sort: Option<(String, bool)>,
}

impl FindQuery {
    pub fn from_query(query: &Map<String, Value>) -> ServiceResult<Self> {
        let limit = query.get("$limit").map(|v| count("$limit", v)).transpose()?;
        let skip = query
            .get("$skip")
            .map(|v| count("$skip", v))
            .transpose()?
            .unwrap_or(0);
        let sort = query.get("$sort").map(parse_sort).transpose()?;
        Ok(Self { limit, skip, sort })
    }
}

fn count(name: &str, value: &Value) -> ServiceResult<usize> {
    let parsed = match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    parsed
        .and_then(|n| usize::try_from(n).ok())
        .ok_or_else(|| ServiceError::bad_request(format!("{name} must be a non-negative integer")))
}

fn parse_sort(value: &Value) -> ServiceResult<(String, bool)> {
    let parsed;
    let value = match value {
        Value::String(text) => {
            parsed = serde_json::from_str::<Value>(text)?;
            &parsed
        }
        other => other,
    };
    let (field, direction) = value
        .as_object()
        .and_then(|object| object.iter().next())
        .ok_or_else(|| ServiceError::bad_request("$sort must be an object like {\"field\": 1}"))?;
    match direction.as_i64() {
        Some(1) => Ok((field.clone(), false)),
        Some(-1) => Ok((field.clone(), true)),
        _ => Err(ServiceError::bad_request(format!(
            "$sort direction for `{field}` must be 1 or -1"
        ))),
    }
}

/// Lowercased search text for `key`.
///
/// Query values arrive typed (`name=123` is a number), so any scalar is
/// matched by its text.
pub fn search_term(query: &Map<String, Value>, key: &str) -> Option<String> {
    let text = match query.get(key)? {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null | Value::Array(_) | Value::Object(_) => return None,
    };
    Some(text.to_lowercase())
}

fn compare(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(a), Value::Number(b)) => a
            .as_f64()
            .partial_cmp(&b.as_f64())
            .unwrap_or(Ordering::Equal),
        (Value::String(a), Value::String(b)) => a.cmp(b),
        (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
        _ => Ordering::Equal,
    }
}

struct Inner<T> {
    records: Vec<T>,
    next_id: i64,
}

/// Records of one service, shared by all clones of the store.
#[derive(Clone)]
pub struct MemoryStore<T> {
    inner: Arc<RwLock<Inner<T>>>,
}

impl<T: Record> MemoryStore<T> {
    pub fn new(seed: Vec<T>) -> Self {
        let next_id = seed.iter().map(Record::id).max().unwrap_or(0) + 1;
        Self {
            inner: Arc::new(RwLock::new(Inner {
                records: seed,
                next_id,
            })),
        }
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.records.len()
    }

    /// Filters, sorts on the serialized field, then paginates. A missing or
    /// zero `$limit` returns every match.
    pub async fn find<F>(&self, query: &FindQuery, filter: F) -> Page<T>
    where
        F: Fn(&T) -> bool,
    {
        let mut result: Vec<T> = {
            let inner = self.inner.read().await;
            inner.records.iter().filter(|r| filter(r)).cloned().collect()
        };

        if let Some((field, descending)) = &query.sort {
            let mut keyed: Vec<(Value, T)> = result
                .into_iter()
                .map(|record| {
                    let key = serde_json::to_value(&record)
                        .ok()
                        .and_then(|v| v.get(field).cloned())
                        .unwrap_or(Value::Null);
                    (key, record)
                })
                .collect();
            keyed.sort_by(|(a, _), (b, _)| {
                let ordering = compare(a, b);
                if *descending {
                    ordering.reverse()
                } else {
                    ordering
                }
            });
            result = keyed.into_iter().map(|(_, record)| record).collect();
        }

        let total = result.len();
        let limit = query.limit.filter(|limit| *limit > 0).unwrap_or(total);
        let data = result.into_iter().skip(query.skip).take(limit).collect();
        Page {
            total,
            limit,
            skip: query.skip,
            data,
        }
    }

    pub async fn get(&self, id: &str) -> ServiceResult<T> {
        let inner = self.inner.read().await;
        parse_id(id)
            .and_then(|id| inner.records.iter().find(|r| r.id() == id))
            .cloned()
            .ok_or_else(|| not_found::<T>(id))
    }

    /// Stores the record built from the next free id.
    pub async fn insert(&self, build: impl FnOnce(i64) -> T) -> T {
        let mut inner = self.inner.write().await;
        let record = build(inner.next_id);
        inner.next_id += 1;
        inner.records.push(record.clone());
        record
    }

    /// Merges the top-level fields of `data` into the record. `id` cannot be changed.
    pub async fn patch(&self, id: &str, data: Value) -> ServiceResult<T> {
        let Value::Object(changes) = data else {
            return Err(ServiceError::bad_request("Patch data must be a JSON object"));
        };
        let mut inner = self.inner.write().await;
        let index = position(&inner.records, id).ok_or_else(|| not_found::<T>(id))?;

        let mut merged = serde_json::to_value(&inner.records[index])
            .map_err(|e| ServiceError::General(e.to_string()))?;
        if let Value::Object(fields) = &mut merged {
            for (key, value) in changes {
                if key != "id" {
                    fields.insert(key, value);
                }
            }
        }
        let mut updated: T = serde_json::from_value(merged)?;
        updated.touch(Utc::now());
        inner.records[index] = updated.clone();
        Ok(updated)
    }

    pub async fn remove(&self, id: &str) -> ServiceResult<T> {
        let mut inner = self.inner.write().await;
        let index = position(&inner.records, id).ok_or_else(|| not_found::<T>(id))?;
        Ok(inner.records.remove(index))
    }
}

fn parse_id(id: &str) -> Option<i64> {
    id.trim().parse().ok()
}

fn position<T: Record>(records: &[T], id: &str) -> Option<usize> {
    let id = parse_id(id)?;
    records.iter().position(|r| r.id() == id)
}

fn not_found<T: Record>(id: &str) -> ServiceError {
    ServiceError::not_found(format!("{} with id {id} not found", T::KIND)).with_data(json!({ "id": id }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Note {
        id: i64,
        title: String,
        rank: i64,
        #[serde(default)]
        touched: bool,
    }

    impl Record for Note {
        const KIND: &'static str = "Note";

        fn id(&self) -> i64 {
            self.id
        }

        fn touch(&mut self, _now: DateTime<Utc>) {
            self.touched = true;
        }
    }

    fn note(id: i64, title: &str, rank: i64) -> Note {
        Note {
            id,
            title: title.into(),
            rank,
            touched: false,
        }
    }

    fn store() -> MemoryStore<Note> {
        MemoryStore::new(vec![note(1, "b", 2), note(2, "a", 3), note(3, "c", 1)])
    }

    fn query(value: Value) -> FindQuery {
        FindQuery::from_query(value.as_object().unwrap()).unwrap()
    }

    #[tokio::test]
    async fn find_sorts_and_paginates() {
        let page = store()
            .find(&query(json!({ "$sort": { "rank": -1 }, "$skip": 1, "$limit": 1 })), |_| true)
            .await;
        assert_eq!(page.total, 3);
        assert_eq!(page.limit, 1);
        assert_eq!(page.skip, 1);
        assert_eq!(page.data, vec![note(1, "b", 2)]);

        let page = store().find(&query(json!({ "$sort": "{\"title\":1}" })), |_| true).await;
        let titles: Vec<&str> = page.data.iter().map(|n| n.title.as_str()).collect();
        assert_eq!(titles, ["a", "b", "c"]);
        assert_eq!(page.limit, 3);
    }

    #[tokio::test]
    async fn find_applies_the_filter_before_counting() {
        let page = store().find(&FindQuery::default(), |n| n.rank > 1).await;
        assert_eq!(page.total, 2);
        assert_eq!(page.data.len(), 2);
    }

    #[test]
    fn rejects_malformed_paging() {
        let bad = |value: Value| FindQuery::from_query(value.as_object().unwrap()).is_err();
        assert!(bad(json!({ "$limit": -1 })));
        assert!(bad(json!({ "$skip": "many" })));
        assert!(bad(json!({ "$sort": { "rank": 2 } })));
        assert!(bad(json!({ "$sort": [] })));
        assert_eq!(query(json!({ "$limit": "5" })).limit, Some(5));
    }

    #[test]
    fn search_terms_accept_any_scalar() {
        let query = json!({ "a": "MiXed", "b": 123, "c": true, "d": null, "e": [1] });
        let query = query.as_object().unwrap();
        assert_eq!(search_term(query, "a").as_deref(), Some("mixed"));
        assert_eq!(search_term(query, "b").as_deref(), Some("123"));
        assert_eq!(search_term(query, "c").as_deref(), Some("true"));
        assert_eq!(search_term(query, "d"), None);
        assert_eq!(search_term(query, "e"), None);
        assert_eq!(search_term(query, "missing"), None);
    }

    #[tokio::test]
    async fn insert_assigns_increasing_ids() {
        let store = store();
        let created = store.insert(|id| note(id, "d", 0)).await;
        assert_eq!(created.id, 4);
        assert_eq!(store.insert(|id| note(id, "e", 0)).await.id, 5);
        assert_eq!(store.len().await, 5);
    }

    #[tokio::test]
    async fn patch_merges_fields_and_keeps_the_id() {
        let store = store();
        let updated = store.patch("2", json!({ "title": "z", "id": 99 })).await.unwrap();
        assert_eq!(updated.id, 2);
        assert_eq!(updated.title, "z");
        assert_eq!(updated.rank, 3);
        assert!(updated.touched);
        assert_eq!(store.get("2").await.unwrap(), updated);

        let err = store.patch("2", json!({ "rank": "high" })).await.unwrap_err();
        assert!(matches!(err, ServiceError::BadRequest { .. }));
        let err = store.patch("2", json!([1])).await.unwrap_err();
        assert!(matches!(err, ServiceError::BadRequest { .. }));
    }

    #[tokio::test]
    async fn missing_records_are_not_found() {
        let store = store();
        let err = store.get("999").await.unwrap_err();
        assert_eq!(err.to_string(), "Note with id 999 not found");
        assert!(matches!(store.get("abc").await, Err(ServiceError::NotFound { .. })));
        assert!(matches!(store.remove("999").await, Err(ServiceError::NotFound { .. })));

        assert_eq!(store.remove("1").await.unwrap().id, 1);
        assert!(store.get("1").await.is_err());
    }
}
