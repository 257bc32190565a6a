use crate::node::Node;
use crate::resolved::ResolvedCache;
use bson::Document as BsonDocument;
use std::cmp::Ordering;
use std::sync::Arc;

use super::eval::{compare_bson, read_field};
use super::mapper::map_field;
use super::types::{Order, SortSpec};

/// Stable multi-key sort. Each sort field gets its own accessor (body or
/// resolved namespace, decided by the mapper) and its own direction;
/// records tied on every field keep their prior relative order.
pub fn sort_nodes(
    nodes: &mut [Arc<Node>],
    spec: &SortSpec,
    resolved_fields: &BsonDocument,
    resolved: &ResolvedCache,
) {
    let keys: Vec<_> = spec
        .normalized()
        .into_iter()
        .map(|(path, order)| (map_field(path, resolved_fields), order))
        .collect();
    if keys.is_empty() {
        return;
    }
    nodes.sort_by(|a, b| {
        for (field, order) in &keys {
            let va = read_field(a, field, resolved);
            let vb = read_field(b, field, resolved);
            let ord = match (&va, &vb) {
                (Some(x), Some(y)) => compare_bson(x, y),
                (Some(_), None) => Ordering::Greater,
                (None, Some(_)) => Ordering::Less,
                (None, None) => Ordering::Equal,
            };
            if ord != Ordering::Equal {
                return if matches!(order, Order::Asc) { ord } else { ord.reverse() };
            }
        }
        Ordering::Equal
    });
}
