use bson::{Bson, doc};
use nodesift::{ChainIndexStore, Node, NodeStore};

fn chain(parts: &[&str]) -> Vec<String> {
    parts.iter().map(ToString::to_string).collect()
}

fn types(parts: &[&str]) -> Vec<String> {
    parts.iter().map(ToString::to_string).collect()
}

fn seed() -> NodeStore {
    let store = NodeStore::new();
    store.insert(Node::new("a1", "Post", doc! {"author": {"name": "Ada"}, "score": 1})).unwrap();
    store.insert(Node::new("a2", "Post", doc! {"author": {"name": "Ada"}, "score": 2})).unwrap();
    store.insert(Node::new("a3", "Post", doc! {"author": {"name": "Lin"}})).unwrap();
    store.insert(Node::new("c1", "Comment", doc! {"author": {"name": "Ada"}})).unwrap();
    store
}

#[test]
fn ensure_then_lookup_scoped_to_types() {
    let store = seed();
    let idx = ChainIndexStore::new();
    let (ch, ts) = (chain(&["author", "name"]), types(&["Post"]));
    idx.ensure(&ch, &ts, &store);
    assert_eq!(idx.lookup(&ch, &Bson::String("Ada".into()), &ts), ["a1", "a2"]);
    assert_eq!(idx.lookup(&ch, &Bson::String("Lin".into()), &ts), ["a3"]);
    assert!(idx.lookup(&ch, &Bson::String("Nobody".into()), &ts).is_empty());
    // the Comment node is outside this index's type set
    let both = types(&["Post", "Comment"]);
    idx.ensure(&ch, &both, &store);
    assert_eq!(idx.lookup(&ch, &Bson::String("Ada".into()), &both), ["a1", "a2", "c1"]);
}

#[test]
fn ensure_is_an_idempotent_no_op_once_built() {
    let store = seed();
    let idx = ChainIndexStore::new();
    let (ch, ts) = (chain(&["author", "name"]), types(&["Post"]));
    idx.ensure(&ch, &ts, &store);
    let keys_before = idx.stats(&ch, &ts).unwrap().keys;

    // a later insert is not picked up until the owner invalidates
    store.insert(Node::new("a4", "Post", doc! {"author": {"name": "New"}})).unwrap();
    idx.ensure(&ch, &ts, &store);
    assert_eq!(idx.stats(&ch, &ts).unwrap().keys, keys_before);

    idx.invalidate(&ts);
    assert!(idx.stats(&ch, &ts).is_none());
    idx.ensure(&ch, &ts, &store);
    assert_eq!(idx.lookup(&ch, &Bson::String("New".into()), &ts), ["a4"]);
}

#[test]
fn type_set_key_is_order_insensitive() {
    let store = seed();
    let idx = ChainIndexStore::new();
    let ch = chain(&["author", "name"]);
    idx.ensure(&ch, &types(&["Post", "Comment"]), &store);
    // same index, reversed type order: no rebuild, same answers
    assert!(idx.stats(&ch, &types(&["Comment", "Post"])).is_some());
    assert_eq!(
        idx.lookup(&ch, &Bson::String("Lin".into()), &types(&["Comment", "Post"])),
        ["a3"]
    );
}

#[test]
fn numeric_keys_unify_int_and_double() {
    let store = NodeStore::new();
    store.insert(Node::new("n1", "T", doc! {"v": 3_i32})).unwrap();
    store.insert(Node::new("n2", "T", doc! {"v": 3_i64})).unwrap();
    store.insert(Node::new("n3", "T", doc! {"v": 3.5})).unwrap();
    let idx = ChainIndexStore::new();
    let (ch, ts) = (chain(&["v"]), types(&["T"]));
    idx.ensure(&ch, &ts, &store);
    // integral numerics share a key; the fractional double is distinct
    assert_eq!(idx.lookup(&ch, &Bson::Int64(3), &ts), ["n1", "n2"]);
    assert_eq!(idx.lookup(&ch, &Bson::Double(3.5), &ts), ["n3"]);
}

#[test]
fn decimal_values_share_the_canonical_numeric_key() {
    let store = NodeStore::new();
    let three: Bson = Bson::Decimal128("3".parse().unwrap());
    store.insert(Node::new("n1", "T", doc! {"v": three})).unwrap();
    store.insert(Node::new("n2", "T", doc! {"v": 3_i32})).unwrap();
    let idx = ChainIndexStore::new();
    let (ch, ts) = (chain(&["v"]), types(&["T"]));
    idx.ensure(&ch, &ts, &store);
    assert_eq!(idx.lookup(&ch, &Bson::Int64(3), &ts), ["n1", "n2"]);
}

#[test]
fn array_values_index_each_element() {
    let store = NodeStore::new();
    store.insert(Node::new("n1", "T", doc! {"tags": ["a", "b", "a"]})).unwrap();
    store.insert(Node::new("n2", "T", doc! {"tags": "b"})).unwrap();
    let idx = ChainIndexStore::new();
    let (ch, ts) = (chain(&["tags"]), types(&["T"]));
    idx.ensure(&ch, &ts, &store);
    assert_eq!(idx.lookup(&ch, &Bson::String("a".into()), &ts), ["n1"]);
    assert_eq!(idx.lookup(&ch, &Bson::String("b".into()), &ts), ["n1", "n2"]);
}

#[test]
fn non_primitive_values_are_not_indexed() {
    let store = NodeStore::new();
    store.insert(Node::new("n1", "T", doc! {"v": {"nested": 1}})).unwrap();
    store.insert(Node::new("n2", "T", doc! {"v": "plain"})).unwrap();
    let idx = ChainIndexStore::new();
    let (ch, ts) = (chain(&["v"]), types(&["T"]));
    idx.ensure(&ch, &ts, &store);
    assert_eq!(idx.stats(&ch, &ts).unwrap().keys, 1);
    assert_eq!(idx.lookup(&ch, &Bson::String("plain".into()), &ts), ["n2"]);
}
