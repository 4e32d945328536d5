//! Interpretation of externally supplied document identifiers.
//!
//! An admin URL carries an id as a plain string, but the stored `_id` may be
//! an object id, a string, or an integer. [`candidates`] lists every plausible
//! reading in priority order; the caller tries each against the store and
//! stops at the first match.

use crate::catalog::predicate::Predicate;
use crate::types::{DocumentId, ObjectId};

/// One typed reading of a raw identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdCandidate {
    ObjectId(ObjectId),
    Literal(String),
    Integer(i64),
}

impl IdCandidate {
    #[must_use]
    pub fn document_id(&self) -> DocumentId {
        match self {
            Self::ObjectId(oid) => DocumentId::ObjectId(*oid),
            Self::Literal(s) => DocumentId::String(s.clone()),
            Self::Integer(i) => DocumentId::Integer(*i),
        }
    }

    /// The `_id` equality predicate for this reading.
    #[must_use]
    pub fn predicate(&self) -> Predicate {
        Predicate::IdEquals(self.document_id())
    }
}

/// Every reading of `raw`, in the order they should be tried.
///
/// The literal reading is always present; the others only when `raw` parses.
#[must_use]
pub fn candidates(raw: &str) -> Vec<IdCandidate> {
    let mut out = Vec::with_capacity(3);

    if let Ok(oid) = ObjectId::parse_str(raw) {
        out.push(IdCandidate::ObjectId(oid));
    }

    out.push(IdCandidate::Literal(raw.to_string()));

    if let Ok(n) = raw.parse::<i64>() {
        out.push(IdCandidate::Integer(n));
    }

    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_object_id_string_yields_all_readings_in_order() {
        let raw = "65f1c0ffee0000000000abcd";
        let found = candidates(raw);
        assert_eq!(
            found,
            vec![
                IdCandidate::ObjectId(ObjectId::parse_str(raw).unwrap()),
                IdCandidate::Literal(raw.to_string()),
            ]
        );
    }

    #[test]
    fn test_numeric_string() {
        assert_eq!(
            candidates("42"),
            vec![
                IdCandidate::Literal("42".to_string()),
                IdCandidate::Integer(42)
            ]
        );
    }

    #[test]
    fn test_all_digit_object_id_adds_integer_only_when_in_range() {
        let raw = "123456789012345678901234";
        let found = candidates(raw);
        assert_eq!(found.len(), 2);
        assert!(matches!(found[0], IdCandidate::ObjectId(_)));
        assert!(matches!(found[1], IdCandidate::Literal(_)));

        let raw = "000000000000000000000042";
        let found = candidates(raw);
        assert_eq!(found.len(), 3);
        assert_eq!(found[2], IdCandidate::Integer(42));
    }

    #[test]
    fn test_plain_string_only_literal() {
        assert_eq!(
            candidates("doesnotexist"),
            vec![IdCandidate::Literal("doesnotexist".to_string())]
        );
    }

    #[test]
    fn test_predicate_is_typed_id_equality() {
        assert_eq!(
            IdCandidate::Integer(7).predicate(),
            Predicate::IdEquals(DocumentId::Integer(7))
        );
    }
}
