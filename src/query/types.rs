use crate::node::Node;
use crate::types::TypeName;
use bson::Document as BsonDocument;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::MAX_SORT_FIELDS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Order {
    Asc,
    Desc,
}

/// Multi-key sort wire shape: parallel `fields`/`order` lists. A field
/// without a matching order entry sorts ascending.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SortSpec {
    pub fields: Vec<String>,
    #[serde(default)]
    pub order: Vec<Order>,
}

impl SortSpec {
    /// Pairs each field with its direction, capped at `MAX_SORT_FIELDS`.
    #[must_use]
    pub fn normalized(&self) -> Vec<(&str, Order)> {
        self.fields
            .iter()
            .take(MAX_SORT_FIELDS)
            .enumerate()
            .map(|(i, f)| (f.as_str(), self.order.get(i).copied().unwrap_or(Order::Asc)))
            .collect()
    }
}

/// Arguments for one query. `resolved_fields` names which top-level fields
/// are resolver-owned for this query; reads of those fields go to the
/// resolved cache instead of the node body.
#[derive(Debug, Clone, Default)]
pub struct QueryArgs {
    pub filter: Option<BsonDocument>,
    pub sort: Option<SortSpec>,
    pub types: Vec<TypeName>,
    pub resolved_fields: BsonDocument,
    pub first_only: bool,
}

/// Outcome of a query. The two miss encodings are deliberate and
/// mode-dependent: first-match misses are `Matched(vec![])`, all-matches
/// misses are `NoMatch`, so callers can tell "matched nothing" apart from
/// an ordinary short result and fall through to another strategy.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryResult {
    Matched(Vec<Arc<Node>>),
    NoMatch,
}

impl QueryResult {
    #[must_use]
    pub fn is_no_match(&self) -> bool {
        matches!(self, Self::NoMatch)
    }

    /// The matched nodes, flattening `NoMatch` to empty. For callers that
    /// do not care about the miss distinction.
    #[must_use]
    pub fn into_nodes(self) -> Vec<Arc<Node>> {
        match self {
            Self::Matched(nodes) => nodes,
            Self::NoMatch => Vec::new(),
        }
    }
}
