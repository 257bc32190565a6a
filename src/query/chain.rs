use bson::{Bson, Document as BsonDocument};

use super::MAX_PATH_DEPTH;
use super::filter::is_operator_key;

/// Detects whether a raw filter is a single nested equality chain, e.g.
/// `{a: {b: {c: {eq: "x"}}}}` -> `(["a","b","c"], "x")`. Such filters can be
/// served from a chain index without compiling or matching anything.
///
/// Disqualified (returns `None`, never an error) when any level has more
/// than one sibling key, the terminal operator is not `eq`, or the literal
/// is not a primitive. A bare literal under a field key counts as `eq`.
#[must_use]
pub fn detect_eq_chain(filter: &BsonDocument) -> Option<(Vec<String>, Bson)> {
    let mut chain: Vec<String> = Vec::new();
    let mut cur = filter;
    loop {
        if cur.len() != 1 || chain.len() > MAX_PATH_DEPTH {
            return None;
        }
        let (key, value) = cur.iter().next()?;
        if key == "eq" {
            if chain.is_empty() {
                return None;
            }
            return is_primitive(value).then(|| (chain, value.clone()));
        }
        if is_operator_key(key) {
            return None;
        }
        chain.push(key.clone());
        match value {
            Bson::Document(d) => cur = d,
            other => return is_primitive(other).then(|| (chain, other.clone())),
        }
    }
}

fn is_primitive(v: &Bson) -> bool {
    matches!(v, Bson::String(_) | Bson::Boolean(_) | Bson::Int32(_) | Bson::Int64(_) | Bson::Double(_))
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    #[test]
    fn deep_eq_chain_qualifies() {
        let f = doc! {"a": {"b": {"c": {"eq": "x"}}}};
        let (chain, value) = detect_eq_chain(&f).unwrap();
        assert_eq!(chain, ["a", "b", "c"]);
        assert_eq!(value, Bson::String("x".into()));
    }

    #[test]
    fn shorthand_literal_qualifies() {
        let f = doc! {"id": "node-1"};
        let (chain, _) = detect_eq_chain(&f).unwrap();
        assert_eq!(chain, ["id"]);
    }

    #[test]
    fn sibling_keys_disqualify() {
        let f = doc! {"a": {"eq": 1}, "b": {"eq": 2}};
        assert!(detect_eq_chain(&f).is_none());
        let f = doc! {"a": {"b": {"eq": 1}, "c": {"eq": 2}}};
        assert!(detect_eq_chain(&f).is_none());
    }

    #[test]
    fn non_eq_terminal_disqualifies() {
        assert!(detect_eq_chain(&doc! {"a": {"in": ["x"]}}).is_none());
        assert!(detect_eq_chain(&doc! {"a": {"ne": "x"}}).is_none());
        assert!(detect_eq_chain(&doc! {"a": {"elemMatch": {"b": {"eq": 1}}}}).is_none());
    }

    #[test]
    fn non_primitive_literal_disqualifies() {
        assert!(detect_eq_chain(&doc! {"a": {"eq": ["x"]}}).is_none());
        assert!(detect_eq_chain(&doc! {"a": {"eq": Bson::Null}}).is_none());
        assert!(detect_eq_chain(&doc! {"a": {"eq": {}}}).is_none());
    }

    #[test]
    fn bare_eq_at_top_level_disqualifies() {
        assert!(detect_eq_chain(&doc! {"eq": "x"}).is_none());
    }
}
