use crate::store::NodeStore;
use crate::types::{NodeId, TypeName};
use bson::Bson;
use ordered_float::OrderedFloat;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};

/// Index key over the primitive bson values a chain index accepts.
/// f64 goes through `OrderedFloat` so it can be hashed and compared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexKey {
    Str(String),
    I64(i64),
    F64(OrderedFloat<f64>),
    Bool(bool),
}

impl Hash for IndexKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Self::Str(s) => {
                0u8.hash(state);
                s.hash(state);
            }
            Self::I64(i) => {
                1u8.hash(state);
                i.hash(state);
            }
            Self::F64(f) => {
                2u8.hash(state);
                f.hash(state);
            }
            Self::Bool(b) => {
                3u8.hash(state);
                b.hash(state);
            }
        }
    }
}

/// Primitive and decimal values; anything else is not index-eligible.
/// Every numeric kind canonicalizes through the same f64 rule so numeric
/// equality matches the matcher's, whichever width the stored value has.
#[must_use]
pub fn key_from_bson(v: &Bson) -> Option<IndexKey> {
    match v {
        Bson::String(s) => Some(IndexKey::Str(s.clone())),
        Bson::Int32(i) => Some(IndexKey::I64(i64::from(*i))),
        Bson::Int64(i) => Some(IndexKey::I64(*i)),
        Bson::Double(f) => Some(canonical_f64_key(*f)),
        Bson::Decimal128(d) => d.to_string().parse::<f64>().ok().map(canonical_f64_key),
        Bson::Boolean(b) => Some(IndexKey::Bool(*b)),
        _ => None,
    }
}

// Integral doubles share the i64 key; adding 0.0 folds -0.0 into 0.0.
#[allow(clippy::cast_possible_truncation)]
fn canonical_f64_key(f: f64) -> IndexKey {
    let f = f + 0.0;
    if f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64 {
        IndexKey::I64(f as i64)
    } else {
        IndexKey::F64(OrderedFloat(f))
    }
}

#[derive(Debug, Clone, Default)]
pub struct IndexStats {
    pub keys: usize,
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
}

/// One built index: value at the chain path -> ids of matching nodes, in
/// store insertion order so indexed results stay deterministic.
#[derive(Debug, Default)]
struct ChainIndex {
    map: HashMap<IndexKey, Vec<NodeId>>,
    stats: IndexStats,
}

/// Identifies an index by its dotted chain and its (order-insensitive)
/// type set.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct IndexId {
    chain: String,
    types: Vec<TypeName>,
}

impl IndexId {
    fn new(chain: &[String], types: &[TypeName]) -> Self {
        let mut types: Vec<TypeName> = types.to_vec();
        types.sort();
        types.dedup();
        Self { chain: chain.join("."), types }
    }
}

/// Lazily built equality indexes over (field chain, type set) pairs. The
/// engine only ever calls `ensure` and `lookup`; the owning store is
/// responsible for calling `invalidate` when the underlying records change.
#[derive(Debug, Default)]
pub struct ChainIndexStore {
    indexes: RwLock<HashMap<IndexId, ChainIndex>>,
}

impl ChainIndexStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the index for (chain, types) from the full record set if it
    /// does not exist yet. A repeat call for the same pair is a cheap no-op.
    pub fn ensure(&self, chain: &[String], types: &[TypeName], store: &NodeStore) {
        let id = IndexId::new(chain, types);
        if self.indexes.read().contains_key(&id) {
            return;
        }
        let mut idx = ChainIndex::default();
        let path = id.chain.clone();
        for node in store.collect(types) {
            let Some(v) = crate::query::read_path(&node.fields, &path) else { continue };
            // Array values index every primitive element (multikey), matching
            // the matcher's element-wise equality on arrays.
            let mut keys: Vec<IndexKey> = Vec::new();
            let elements: &[Bson] = match v {
                Bson::Array(items) => items,
                other => std::slice::from_ref(other),
            };
            for el in elements {
                if let Some(k) = key_from_bson(el)
                    && !keys.contains(&k)
                {
                    keys.push(k);
                }
            }
            for k in keys {
                idx.map.entry(k).or_default().push(node.id.clone());
                idx.stats.entries += 1;
            }
        }
        idx.stats.keys = idx.map.len();
        log::debug!("built chain index {path:?} over {:?} ({} keys)", id.types, idx.stats.keys);
        // Lost race with a concurrent ensure: keep the existing build.
        self.indexes.write().entry(id).or_insert(idx);
    }

    /// Point lookup. Returns the ids of nodes of the given types whose value
    /// at the chain equals `value`; empty on a miss or a non-primitive value.
    #[must_use]
    pub fn lookup(&self, chain: &[String], value: &Bson, types: &[TypeName]) -> Vec<NodeId> {
        let id = IndexId::new(chain, types);
        let mut indexes = self.indexes.write();
        let Some(idx) = indexes.get_mut(&id) else {
            return Vec::new();
        };
        if let Some(k) = key_from_bson(value)
            && let Some(ids) = idx.map.get(&k)
        {
            idx.stats.hits += 1;
            return ids.clone();
        }
        idx.stats.misses += 1;
        Vec::new()
    }

    /// Drops every index touching any of the given types. For the external
    /// store to call after a mutation; the engine never invalidates.
    pub fn invalidate(&self, types: &[TypeName]) {
        self.indexes.write().retain(|id, _| !id.types.iter().any(|t| types.contains(t)));
    }

    pub fn clear(&self) {
        self.indexes.write().clear();
    }

    #[must_use]
    pub fn stats(&self, chain: &[String], types: &[TypeName]) -> Option<IndexStats> {
        self.indexes.read().get(&IndexId::new(chain, types)).map(|i| i.stats.clone())
    }
}
