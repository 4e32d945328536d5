//! In-process document store.
//!
//! Evaluates [`Predicate`] trees directly against stored JSON, with the same
//! ordering rules as the `PostgreSQL` adapter. Used by the integration tests
//! and by `LONGBOX_STORE=memory` for local development.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::ops::RangeBounds;

use async_trait::async_trait;
use rand::seq::IndexedRandom;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::debug;

use longbox_core::catalog::filter::wall_clock;
use longbox_core::catalog::{FieldSet, FindOptions, Predicate, SortOrder, canonical_price};
use longbox_core::{Collection, Document, DocumentId};

use super::{DocumentStore, StoreError, UpdateResult};

/// A document store held entirely in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<Collection, Vec<Document>>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a collection, appending to anything already there.
    #[must_use]
    pub fn with_collection(
        mut self,
        collection: Collection,
        documents: impl IntoIterator<Item = Document>,
    ) -> Self {
        self.collections
            .get_mut()
            .entry(collection)
            .or_default()
            .extend(documents);
        self
    }

    /// A copy of every document in `collection`, in insertion order.
    pub async fn snapshot(&self, collection: Collection) -> Vec<Document> {
        self.collections
            .read()
            .await
            .get(&collection)
            .cloned()
            .unwrap_or_default()
    }
}

fn contains_ignore_case(value: &Value, needle: &str) -> bool {
    match value {
        Value::String(s) => s.to_lowercase().contains(needle),
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_str)
            .any(|s| s.to_lowercase().contains(needle)),
        _ => false,
    }
}

fn has_dated_record(
    value: Option<&Value>,
    kind: &str,
    range: impl RangeBounds<chrono::NaiveDateTime>,
) -> bool {
    let Some(Value::Array(records)) = value else {
        return false;
    };

    records.iter().filter_map(Value::as_object).any(|record| {
        record.get("type").and_then(Value::as_str) == Some(kind)
            && record
                .get("date")
                .and_then(Value::as_str)
                .and_then(wall_clock)
                .is_some_and(|at| range.contains(&at))
    })
}

/// Evaluate a predicate against one document.
pub(crate) fn matches(doc: &Document, predicate: &Predicate) -> bool {
    match predicate {
        Predicate::And(clauses) => clauses.iter().all(|p| matches(doc, p)),
        Predicate::Or(clauses) => clauses.iter().any(|p| matches(doc, p)),
        Predicate::IdEquals(id) => {
            doc.get("_id").and_then(DocumentId::from_value).as_ref() == Some(id)
        }
        Predicate::FieldEquals { field, value } => doc.get(field) == Some(value),
        Predicate::Contains { field, needle } => doc
            .get(field)
            .is_some_and(|v| contains_ignore_case(v, &needle.to_lowercase())),
        Predicate::EqualsIgnoreCase { field, value } => doc
            .get(field)
            .and_then(Value::as_str)
            .is_some_and(|s| s.to_lowercase() == value.to_lowercase()),
        Predicate::PriceWithin { lower, upper } => canonical_price(doc)
            .ok()
            .is_some_and(|price| (*lower, *upper).contains(&price)),
        Predicate::DateRecord {
            field,
            kind,
            from,
            to,
        } => has_dated_record(doc.get(field), kind, *from..=*to),
    }
}

/// Order by canonical price, unpriceable documents last.
fn compare_prices(a: Option<f64>, b: Option<f64>, order: SortOrder) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => match order {
            SortOrder::Asc => a.total_cmp(&b),
            SortOrder::Desc => b.total_cmp(&a),
        },
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn to_usize(n: u64) -> usize {
    usize::try_from(n).unwrap_or(usize::MAX)
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn count(&self, collection: Collection, filter: &Predicate) -> Result<u64, StoreError> {
        let guard = self.collections.read().await;
        let count = guard
            .get(&collection)
            .map_or(0, |docs| docs.iter().filter(|d| matches(d, filter)).count());
        Ok(u64::try_from(count).unwrap_or(u64::MAX))
    }

    async fn find(
        &self,
        collection: Collection,
        filter: &Predicate,
        options: FindOptions,
    ) -> Result<Vec<Document>, StoreError> {
        let guard = self.collections.read().await;
        let Some(docs) = guard.get(&collection) else {
            return Ok(Vec::new());
        };

        let mut matched: Vec<&Document> = docs.iter().filter(|d| matches(d, filter)).collect();

        if let Some(order) = options.sort {
            let mut keyed: Vec<(Option<f64>, &Document)> = matched
                .into_iter()
                .map(|d| (canonical_price(d).ok(), d))
                .collect();
            keyed.sort_by(|(a, _), (b, _)| compare_prices(*a, *b, order));
            matched = keyed.into_iter().map(|(_, d)| d).collect();
        }

        let window = matched
            .into_iter()
            .skip(to_usize(options.skip))
            .take(options.limit.map_or(usize::MAX, to_usize))
            .cloned()
            .collect::<Vec<_>>();

        debug!(collection = %collection, returned = window.len(), "memory find");
        Ok(window)
    }

    async fn find_one(
        &self,
        collection: Collection,
        filter: &Predicate,
    ) -> Result<Option<Document>, StoreError> {
        let guard = self.collections.read().await;
        Ok(guard
            .get(&collection)
            .and_then(|docs| docs.iter().find(|d| matches(d, filter)))
            .cloned())
    }

    async fn sample(&self, collection: Collection, size: u64) -> Result<Vec<Document>, StoreError> {
        let guard = self.collections.read().await;
        let Some(docs) = guard.get(&collection) else {
            return Ok(Vec::new());
        };

        let mut rng = rand::rng();
        Ok(docs
            .choose_multiple(&mut rng, to_usize(size))
            .cloned()
            .collect())
    }

    async fn insert(&self, collection: Collection, document: Document) -> Result<(), StoreError> {
        self.collections
            .write()
            .await
            .entry(collection)
            .or_default()
            .push(document);
        Ok(())
    }

    async fn update_one(
        &self,
        collection: Collection,
        filter: &Predicate,
        set: &FieldSet,
    ) -> Result<UpdateResult, StoreError> {
        let mut guard = self.collections.write().await;
        let Some(doc) = guard
            .get_mut(&collection)
            .and_then(|docs| docs.iter_mut().find(|d| matches(d, filter)))
        else {
            return Ok(UpdateResult::default());
        };

        let mut changed = false;
        for (field, value) in set {
            if doc.get(field) != Some(value) {
                doc.insert(field.clone(), value.clone());
                changed = true;
            }
        }

        Ok(UpdateResult {
            matched: 1,
            modified: u64::from(changed),
        })
    }

    async fn delete_one(
        &self,
        collection: Collection,
        filter: &Predicate,
    ) -> Result<u64, StoreError> {
        let mut guard = self.collections.write().await;
        let Some(docs) = guard.get_mut(&collection) else {
            return Ok(0);
        };

        match docs.iter().position(|d| matches(d, filter)) {
            Some(index) => {
                docs.remove(index);
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn get_or_insert(
        &self,
        collection: Collection,
        key_field: &str,
        key: &str,
        default: Document,
    ) -> Result<Document, StoreError> {
        let filter = Predicate::field_eq(key_field, key);
        let mut guard = self.collections.write().await;
        let docs = guard.entry(collection).or_default();

        if let Some(existing) = docs.iter().find(|d| matches(d, &filter)) {
            return Ok(existing.clone());
        }

        debug!(collection = %collection, "memory get_or_insert created document");
        docs.push(default.clone());
        Ok(default)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::ops::Bound;

    use chrono::NaiveDate;
    use serde_json::json;

    use super::*;

    fn doc(value: Value) -> Document {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    fn catalog() -> MemoryStore {
        MemoryStore::new().with_collection(
            Collection::Comics,
            vec![
                doc(json!({
                    "_id": {"$oid": "65f1c0ffee0000000000abcd"},
                    "title": "Amazing Spider-Man #1",
                    "format": "Comic",
                    "categories": ["Superhero", "Teen"],
                    "prices": [{"type": "printPrice", "price": 3.5}],
                    "dates": [{"type": "onsaleDate", "date": "1963-03-01T00:00:00-0500"}]
                })),
                doc(json!({
                    "_id": "batman-year-one",
                    "title": "Batman: Year One",
                    "format": "Trade Paperback",
                    "prices": {"price": 4.0}
                })),
                doc(json!({"_id": 7, "title": "Untitled", "prices": {"price": "n/a"}})),
            ],
        )
    }

    fn titles(docs: &[Document]) -> Vec<&str> {
        docs.iter()
            .map(|d| d["title"].as_str().unwrap_or_default())
            .collect()
    }

    #[tokio::test]
    async fn test_contains_is_case_insensitive_and_array_aware() {
        let store = catalog();
        let by_title = Predicate::Contains {
            field: "title".to_string(),
            needle: "SPIDER".to_string(),
        };
        assert_eq!(store.count(Collection::Comics, &by_title).await.unwrap(), 1);

        let by_category = Predicate::Contains {
            field: "categories".to_string(),
            needle: "hero".to_string(),
        };
        assert_eq!(
            store.count(Collection::Comics, &by_category).await.unwrap(),
            1
        );
    }

    #[tokio::test]
    async fn test_equals_ignore_case_is_anchored() {
        let store = catalog();
        let exact = Predicate::EqualsIgnoreCase {
            field: "format".to_string(),
            value: "comic".to_string(),
        };
        assert_eq!(store.count(Collection::Comics, &exact).await.unwrap(), 1);

        let partial = Predicate::EqualsIgnoreCase {
            field: "format".to_string(),
            value: "trade".to_string(),
        };
        assert_eq!(store.count(Collection::Comics, &partial).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_id_equality_is_typed() {
        let store = catalog();
        let as_int = Predicate::IdEquals(DocumentId::Integer(7));
        let as_str = Predicate::IdEquals(DocumentId::String("7".to_string()));
        assert!(store.find_one(Collection::Comics, &as_int).await.unwrap().is_some());
        assert!(store.find_one(Collection::Comics, &as_str).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_price_range() {
        let store = catalog();
        let under_four = Predicate::PriceWithin {
            lower: Bound::Unbounded,
            upper: Bound::Excluded(4.0),
        };
        let found = store
            .find(Collection::Comics, &under_four, FindOptions::default())
            .await
            .unwrap();
        assert_eq!(titles(&found), vec!["Amazing Spider-Man #1"]);
    }

    #[tokio::test]
    async fn test_date_record() {
        let store = catalog();
        let year = |y: i32| Predicate::DateRecord {
            field: "dates".to_string(),
            kind: "onsaleDate".to_string(),
            from: NaiveDate::from_ymd_opt(y, 1, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            to: NaiveDate::from_ymd_opt(y, 12, 31)
                .unwrap()
                .and_hms_opt(23, 59, 59)
                .unwrap(),
        };
        assert_eq!(store.count(Collection::Comics, &year(1963)).await.unwrap(), 1);
        assert_eq!(store.count(Collection::Comics, &year(1964)).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_sort_puts_unpriceable_last_and_windows() {
        let store = catalog();
        let desc = store
            .find(
                Collection::Comics,
                &Predicate::all(),
                FindOptions {
                    sort: Some(SortOrder::Desc),
                    skip: 0,
                    limit: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(
            titles(&desc),
            vec!["Batman: Year One", "Amazing Spider-Man #1", "Untitled"]
        );

        let second = store
            .find(
                Collection::Comics,
                &Predicate::all(),
                FindOptions {
                    sort: Some(SortOrder::Asc),
                    skip: 1,
                    limit: Some(1),
                },
            )
            .await
            .unwrap();
        assert_eq!(titles(&second), vec!["Batman: Year One"]);
    }

    #[tokio::test]
    async fn test_update_reports_modified_only_on_change() {
        let store = catalog();
        let filter = Predicate::IdEquals(DocumentId::String("batman-year-one".to_string()));
        let mut set = FieldSet::new();
        set.insert("title".to_string(), json!("Batman: Year One"));

        let unchanged = store
            .update_one(Collection::Comics, &filter, &set)
            .await
            .unwrap();
        assert_eq!(unchanged, UpdateResult { matched: 1, modified: 0 });

        set.insert("price".to_string(), json!(5.0));
        let changed = store
            .update_one(Collection::Comics, &filter, &set)
            .await
            .unwrap();
        assert_eq!(changed, UpdateResult { matched: 1, modified: 1 });

        let missing = store
            .update_one(
                Collection::Comics,
                &Predicate::IdEquals(DocumentId::Integer(99)),
                &set,
            )
            .await
            .unwrap();
        assert_eq!(missing, UpdateResult::default());
    }

    #[tokio::test]
    async fn test_delete_one() {
        let store = catalog();
        let filter = Predicate::IdEquals(DocumentId::Integer(7));
        assert_eq!(store.delete_one(Collection::Comics, &filter).await.unwrap(), 1);
        assert_eq!(store.delete_one(Collection::Comics, &filter).await.unwrap(), 0);
        assert_eq!(store.snapshot(Collection::Comics).await.len(), 2);
    }

    #[tokio::test]
    async fn test_sample_is_bounded() {
        let store = catalog();
        assert_eq!(store.sample(Collection::Comics, 2).await.unwrap().len(), 2);
        assert_eq!(store.sample(Collection::Comics, 10).await.unwrap().len(), 3);
        assert!(store.sample(Collection::Users, 5).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_get_or_insert_creates_once() {
        let store = MemoryStore::new();
        let default = doc(json!({"sub": "u1", "cart": []}));

        let first = store
            .get_or_insert(Collection::Users, "sub", "u1", default.clone())
            .await
            .unwrap();
        let second = store
            .get_or_insert(Collection::Users, "sub", "u1", default)
            .await
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(store.snapshot(Collection::Users).await.len(), 1);
    }
}
