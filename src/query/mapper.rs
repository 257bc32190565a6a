use bson::Document as BsonDocument;

use super::filter::Predicate;

/// Where a field value lives: on the node body, or in the resolver-computed
/// side-namespace. Filtering and sorting both go through this, so they
/// always agree on the source of a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldSource {
    Body,
    Resolved,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRef {
    pub source: FieldSource,
    pub path: String,
}

impl FieldRef {
    #[must_use]
    pub fn body(path: impl Into<String>) -> Self {
        Self { source: FieldSource::Body, path: path.into() }
    }

    #[must_use]
    pub fn resolved(path: impl Into<String>) -> Self {
        Self { source: FieldSource::Resolved, path: path.into() }
    }
}

/// A dotted path is resolver-owned when it is a resolved field or falls
/// under one, i.e. its leading segment appears in the resolved-field map.
#[must_use]
pub fn is_resolved_path(path: &str, resolved_fields: &BsonDocument) -> bool {
    let first = path.split('.').next().unwrap_or(path);
    resolved_fields.contains_key(first)
}

/// Rewrites a sort-key path to the namespace it must be read from.
#[must_use]
pub fn map_field(path: &str, resolved_fields: &BsonDocument) -> FieldRef {
    if is_resolved_path(path, resolved_fields) {
        FieldRef::resolved(path)
    } else {
        FieldRef::body(path)
    }
}

/// Rewrites every leaf path of a compiled predicate. Paths inside an
/// `elemMatch` are relative to the array elements and stay body-sourced.
#[must_use]
pub fn map_predicate(pred: Predicate, resolved_fields: &BsonDocument) -> Predicate {
    match pred {
        Predicate::And(preds) => {
            Predicate::And(preds.into_iter().map(|p| map_predicate(p, resolved_fields)).collect())
        }
        Predicate::Leaf { field, op } => {
            Predicate::Leaf { field: map_field(&field.path, resolved_fields), op }
        }
        Predicate::ElemMatch { field, inner } => {
            Predicate::ElemMatch { field: map_field(&field.path, resolved_fields), inner }
        }
    }
}
