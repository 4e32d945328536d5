//! Import catalog documents from a JSON dump.
//!
//! Accepts either a bare array of documents or a Marvel API response
//! (`{"data": {"results": [...]}}`). Supplied `_id`s are kept in canonical
//! form; documents without one get a fresh `ObjectId`.

use std::path::Path;

use serde_json::Value;
use tracing::info;

use longbox_core::{Collection, Document, DocumentId, ObjectId};
use longbox_storefront::db::{DocumentStore, PgDocumentStore};

use super::{CommandError, connect};

/// Extract the documents to import from a parsed seed file.
///
/// # Errors
///
/// Returns `CommandError::InvalidSeed` if the file has neither shape or an
/// entry is not an object.
pub fn documents_from_json(value: Value) -> Result<Vec<Document>, CommandError> {
    let entries = match value {
        Value::Array(entries) => entries,
        Value::Object(mut root) => match root
            .remove("data")
            .and_then(|mut data| data.get_mut("results").map(Value::take))
        {
            Some(Value::Array(entries)) => entries,
            _ => {
                return Err(CommandError::InvalidSeed(
                    "expected an array or data.results".to_string(),
                ));
            }
        },
        _ => {
            return Err(CommandError::InvalidSeed(
                "expected an array or data.results".to_string(),
            ));
        }
    };

    entries
        .into_iter()
        .enumerate()
        .map(|(position, entry)| match entry {
            Value::Object(mut doc) => {
                let id = match doc.get("_id") {
                    None => Some(DocumentId::from(ObjectId::new())),
                    Some(raw) => DocumentId::from_value(raw),
                };
                // ObjectId hex is stored lowercase
                if let Some(id) = id {
                    doc.insert("_id".to_string(), id.to_value());
                }
                Ok(doc)
            }
            _ => Err(CommandError::InvalidSeed(format!(
                "entry {position} is not an object"
            ))),
        })
        .collect()
}

/// Seed the comics collection from `file_path`.
///
/// The file is parsed and validated before connecting to the database.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, or an insert fails.
pub async fn comics(file_path: &str) -> Result<(), CommandError> {
    let path = Path::new(file_path);
    info!(path = %file_path, "Loading catalog documents");

    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| CommandError::Io {
            path: file_path.to_string(),
            source,
        })?;
    let documents = documents_from_json(serde_json::from_str(&content)?)?;
    info!(count = documents.len(), "Parsed seed file");

    let store = PgDocumentStore::new(connect().await?);
    let mut inserted = 0_usize;
    for doc in documents {
        store.insert(Collection::Comics, doc).await?;
        inserted += 1;
    }

    info!(inserted, "Seeding complete!");
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_bare_array_keeps_supplied_ids() {
        let docs = documents_from_json(json!([
            {"_id": 1689, "title": "Hulk"},
            {"title": "No id"}
        ]))
        .unwrap();

        assert_eq!(docs[0]["_id"], json!(1689));
        let generated = DocumentId::from_value(&docs[1]["_id"]).unwrap();
        assert!(matches!(generated, DocumentId::ObjectId(_)));
    }

    #[test]
    fn test_object_ids_are_stored_lowercase() {
        let docs = documents_from_json(json!([
            {"_id": {"$oid": "65F1C0FFEE0000000000ABCD"}},
            {"_id": "Hulk-181"},
            {"_id": [1, 2]}
        ]))
        .unwrap();

        assert_eq!(docs[0]["_id"], json!({"$oid": "65f1c0ffee0000000000abcd"}));
        assert_eq!(docs[1]["_id"], "Hulk-181");
        assert_eq!(docs[2]["_id"], json!([1, 2]));
    }

    #[test]
    fn test_marvel_response_shape() {
        let docs = documents_from_json(json!({
            "code": 200,
            "data": {"results": [{"id": 5, "title": "X-Men"}]}
        }))
        .unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0]["title"], "X-Men");
    }

    #[test]
    fn test_rejects_other_shapes() {
        assert!(documents_from_json(json!({"results": []})).is_err());
        assert!(documents_from_json(json!("comics")).is_err());
        assert!(documents_from_json(json!([1, 2])).is_err());
    }
}
