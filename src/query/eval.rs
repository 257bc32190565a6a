use crate::node::Node;
use crate::resolved::ResolvedCache;
use bson::{Bson, Document as BsonDocument};
use std::cmp::Ordering;

use super::MAX_PATH_DEPTH;
use super::filter::{Operator, Predicate};
use super::mapper::{FieldRef, FieldSource};

/// Safe nested field access: walks a dotted path through subdocuments.
#[must_use]
pub fn read_path<'a>(doc: &'a BsonDocument, path: &str) -> Option<&'a Bson> {
    let mut parts = path.split('.');
    let first = parts.next()?;
    let mut cur = doc.get(first)?;
    let mut depth = 1usize;
    for p in parts {
        depth += 1;
        if depth > MAX_PATH_DEPTH {
            return None;
        }
        match cur {
            Bson::Document(d) => cur = d.get(p)?,
            _ => return None,
        }
    }
    Some(cur)
}

/// Reads a field reference off a node, from the body or from the resolver
/// side-namespace depending on where the mapper routed it. The record
/// identifier is addressable as `id` and shadows any body field of that
/// name, so the generic matcher agrees with the identity shortcut.
#[must_use]
pub fn read_field(node: &Node, field: &FieldRef, resolved: &ResolvedCache) -> Option<Bson> {
    match field.source {
        FieldSource::Body if field.path == "id" => Some(Bson::String(node.id.clone())),
        FieldSource::Body => read_path(&node.fields, &field.path).cloned(),
        FieldSource::Resolved => resolved.read(&node.node_type, &node.id, &field.path),
    }
}

/// Evaluates a canonical predicate against one node. An empty conjunction
/// matches unconditionally.
#[must_use]
pub fn eval_predicate(pred: &Predicate, node: &Node, resolved: &ResolvedCache) -> bool {
    match pred {
        Predicate::And(preds) => preds.iter().all(|p| eval_predicate(p, node, resolved)),
        Predicate::Leaf { field, op } => eval_operator(op, read_field(node, field, resolved).as_ref()),
        Predicate::ElemMatch { field, inner } => {
            matches!(read_field(node, field, resolved), Some(Bson::Array(items))
                if items.iter().any(|el| elem_matches(inner, el)))
        }
    }
}

// Inside elemMatch, leaf paths are relative to the array element.
fn elem_matches(pred: &Predicate, element: &Bson) -> bool {
    match pred {
        Predicate::And(preds) => preds.iter().all(|p| elem_matches(p, element)),
        Predicate::Leaf { field, op } => {
            let Bson::Document(doc) = element else { return false };
            eval_operator(op, read_path(doc, &field.path))
        }
        Predicate::ElemMatch { field, inner } => {
            let Bson::Document(doc) = element else { return false };
            matches!(read_path(doc, &field.path), Some(Bson::Array(items))
                if items.iter().any(|el| elem_matches(inner, el)))
        }
    }
}

fn eval_operator(op: &Operator, value: Option<&Bson>) -> bool {
    match op {
        Operator::Eq(t) => matches_eq(t, value),
        Operator::Ne(t) => !matches_eq(t, value),
        Operator::In(ts) => ts.iter().any(|t| matches_eq(t, value)),
        Operator::Nin(ts) => !ts.iter().any(|t| matches_eq(t, value)),
        Operator::Gt(t) => matches_cmp(value, t, |o| o == Ordering::Greater),
        Operator::Gte(t) => matches_cmp(value, t, |o| o != Ordering::Less),
        Operator::Lt(t) => matches_cmp(value, t, |o| o == Ordering::Less),
        Operator::Lte(t) => matches_cmp(value, t, |o| o != Ordering::Greater),
        Operator::Regex(re) | Operator::Glob(re) => matches_pattern(re, value),
    }
}

/// Equality with the conventional accommodations: `eq null` also matches an
/// absent value, a non-array target matches an array value when any element
/// matches, and numeric kinds compare by value across widths (so the scan
/// path agrees with the chain index, which canonicalizes numeric keys).
fn matches_eq(target: &Bson, value: Option<&Bson>) -> bool {
    match value {
        None => matches!(target, Bson::Null),
        Some(Bson::Array(items)) if !matches!(target, Bson::Array(_)) => {
            items.iter().any(|el| bson_eq(el, target))
        }
        Some(v) => bson_eq(v, target),
    }
}

fn bson_eq(a: &Bson, b: &Bson) -> bool {
    if is_num(a) && is_num(b) {
        return as_f64_num(a).total_cmp(&as_f64_num(b)) == Ordering::Equal;
    }
    a == b
}

fn matches_cmp(value: Option<&Bson>, target: &Bson, accept: impl Fn(Ordering) -> bool) -> bool {
    match value {
        None => false,
        Some(Bson::Array(items)) => {
            items.iter().any(|el| comparable_cmp(el, target).is_some_and(&accept))
        }
        Some(v) => comparable_cmp(v, target).is_some_and(&accept),
    }
}

fn matches_pattern(re: &regex::Regex, value: Option<&Bson>) -> bool {
    match value {
        Some(Bson::String(s)) => re.is_match(s),
        Some(Bson::Array(items)) => {
            items.iter().any(|el| matches!(el, Bson::String(s) if re.is_match(s)))
        }
        _ => false,
    }
}

/// Ordering comparisons only apply between values of a comparable kind;
/// cross-type comparisons never match a filter.
fn comparable_cmp(a: &Bson, b: &Bson) -> Option<Ordering> {
    if is_num(a) && is_num(b) {
        return Some(as_f64_num(a).total_cmp(&as_f64_num(b)));
    }
    match (a, b) {
        (Bson::String(x), Bson::String(y)) => Some(x.cmp(y)),
        (Bson::Boolean(x), Bson::Boolean(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

fn is_num(x: &Bson) -> bool {
    matches!(x, Bson::Int32(_) | Bson::Int64(_) | Bson::Double(_) | Bson::Decimal128(_))
}

// Adding 0.0 folds -0.0 into 0.0, so total_cmp treats the zeros as equal
// and numeric comparisons agree with the index key canonicalization.
#[allow(clippy::cast_precision_loss)]
fn as_f64_num(x: &Bson) -> f64 {
    match x {
        Bson::Int32(i) => f64::from(*i),
        Bson::Int64(i) => *i as f64,
        Bson::Double(f) => *f + 0.0,
        Bson::Decimal128(d) => d.to_string().parse::<f64>().unwrap_or(f64::NAN) + 0.0,
        _ => f64::NAN,
    }
}

/// Total order over bson values for sorting: numeric kinds compare by
/// value, strings and booleans naturally, everything else by type rank.
#[must_use]
pub fn compare_bson(a: &Bson, b: &Bson) -> Ordering {
    if let Some(ord) = comparable_cmp(a, b) {
        return ord;
    }
    type_rank(a).cmp(&type_rank(b))
}

fn type_rank(v: &Bson) -> u8 {
    match v {
        Bson::Null => 0,
        Bson::Boolean(_) => 1,
        Bson::Int32(_) => 2,
        Bson::Int64(_) => 3,
        Bson::Double(_) => 4,
        Bson::String(_) => 5,
        Bson::Array(_) => 6,
        Bson::Document(_) => 7,
        Bson::Binary(_) => 8,
        Bson::ObjectId(_) => 9,
        Bson::DateTime(_) => 10,
        Bson::RegularExpression(_) => 11,
        Bson::Timestamp(_) => 12,
        Bson::Symbol(_) => 13,
        Bson::Decimal128(_) => 14,
        Bson::Undefined => 15,
        Bson::DbPointer(_) => 16,
        Bson::JavaScriptCode(_) => 17,
        Bson::JavaScriptCodeWithScope(_) => 18,
        Bson::MaxKey => 250,
        Bson::MinKey => 251,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::compile_filter;
    use bson::doc;

    fn node(fields: BsonDocument) -> Node {
        Node::new("n1", "Item", fields)
    }

    fn matches(filter: BsonDocument, fields: BsonDocument) -> bool {
        let pred = compile_filter(&filter).unwrap();
        eval_predicate(&pred, &node(fields), &ResolvedCache::new())
    }

    #[test]
    fn eq_and_cmp_on_nested_path() {
        assert!(matches(doc! {"a": {"b": {"eq": 3}}}, doc! {"a": {"b": 3}}));
        assert!(matches(doc! {"a": {"b": {"gt": 2}}}, doc! {"a": {"b": 3}}));
        assert!(!matches(doc! {"a": {"b": {"gt": 3}}}, doc! {"a": {"b": 3}}));
        // Int vs Double compare numerically
        assert!(matches(doc! {"a": {"b": {"gte": 3}}}, doc! {"a": {"b": 3.0}}));
    }

    #[test]
    fn missing_values() {
        assert!(!matches(doc! {"a": {"eq": 1}}, doc! {"b": 1}));
        assert!(matches(doc! {"a": {"eq": Bson::Null}}, doc! {"b": 1}));
        assert!(matches(doc! {"a": {"ne": 1}}, doc! {"b": 1}));
        assert!(!matches(doc! {"a": {"gt": 0}}, doc! {"b": 1}));
        assert!(matches(doc! {"a": {"nin": [1, 2]}}, doc! {"b": 1}));
    }

    #[test]
    fn cross_type_comparisons_never_match() {
        assert!(!matches(doc! {"a": {"gt": 1}}, doc! {"a": "zzz"}));
        assert!(!matches(doc! {"a": {"lt": "zzz"}}, doc! {"a": 1}));
    }

    #[test]
    fn operators_distribute_over_arrays() {
        assert!(matches(doc! {"tags": {"eq": "abc"}}, doc! {"tags": ["abc", "zzz"]}));
        assert!(matches(doc! {"n": {"gt": 5}}, doc! {"n": [1, 9]}));
        assert!(!matches(doc! {"n": {"gt": 5}}, doc! {"n": [1, 2]}));
        assert!(matches(doc! {"tags": {"glob": "a*"}}, doc! {"tags": ["abc", "zzz"]}));
    }

    #[test]
    fn in_and_nin() {
        assert!(matches(doc! {"a": {"in": [1, 2]}}, doc! {"a": 2}));
        assert!(!matches(doc! {"a": {"in": [1, 2]}}, doc! {"a": 3}));
        assert!(matches(doc! {"a": {"nin": [1, 2]}}, doc! {"a": 3}));
    }

    #[test]
    fn regex_is_unanchored_glob_is_anchored() {
        assert!(matches(doc! {"a": {"regex": "b"}}, doc! {"a": "abc"}));
        assert!(!matches(doc! {"a": {"glob": "b"}}, doc! {"a": "abc"}));
        assert!(matches(doc! {"a": {"glob": "a?c"}}, doc! {"a": "abc"}));
    }

    #[test]
    fn elem_match_applies_inner_conjunction_per_element() {
        let filter = doc! {"runs": {"elemMatch": {"score": {"gt": 5}, "ok": {"eq": true}}}};
        // one element satisfies both keys
        assert!(matches(filter.clone(), doc! {"runs": [{"score": 9, "ok": true}]}));
        // both keys satisfied, but never by the same element
        assert!(!matches(filter, doc! {"runs": [{"score": 9, "ok": false}, {"score": 1, "ok": true}]}));
    }

    #[test]
    fn resolved_leaf_reads_the_cache_not_the_body() {
        let cache = ResolvedCache::new();
        cache.set("Item", "n1", doc! {"score": 10});
        let pred = compile_filter(&doc! {"score": {"eq": 10}}).unwrap();
        let pred = crate::query::map_predicate(pred, &doc! {"score": true});
        // body says 1, resolved says 10
        assert!(eval_predicate(&pred, &node(doc! {"score": 1}), &cache));
    }
}
