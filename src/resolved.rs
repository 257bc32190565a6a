use crate::types::{NodeId, TypeName};
use bson::{Bson, Document as BsonDocument};
use parking_lot::RwLock;
use std::collections::HashMap;

/// Side-namespace of resolver-computed field values, keyed by node type and
/// then node id. An external resolution step populates it; the query engine
/// only reads. A field present here shadows a same-named field on the node
/// body for filtering and sorting once declared resolved for a query.
#[derive(Debug, Default)]
pub struct ResolvedCache {
    inner: RwLock<HashMap<TypeName, HashMap<NodeId, BsonDocument>>>,
}

impl ResolvedCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, node_type: impl Into<TypeName>, id: impl Into<NodeId>, fields: BsonDocument) {
        self.inner.write().entry(node_type.into()).or_default().insert(id.into(), fields);
    }

    /// Reads the value at a dotted path inside the resolved bag for
    /// (type, id). Absent cache entries and absent paths both read as None.
    #[must_use]
    pub fn read(&self, node_type: &str, id: &str, path: &str) -> Option<Bson> {
        let inner = self.inner.read();
        let bag = inner.get(node_type)?.get(id)?;
        crate::query::read_path(bag, path).cloned()
    }

    #[must_use]
    pub fn contains(&self, node_type: &str, id: &str) -> bool {
        self.inner.read().get(node_type).is_some_and(|m| m.contains_key(id))
    }
}
