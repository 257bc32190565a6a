use crate::errors::QueryError;
use crate::node::Node;
use crate::types::{NodeId, TypeName};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// In-memory node store. Owns the records the engine queries; the engine
/// itself only ever reads. Per-type id lists keep insertion order so a
/// full scan yields candidates in a deterministic relative order.
#[derive(Debug, Default)]
pub struct NodeStore {
    nodes: RwLock<HashMap<NodeId, Arc<Node>>>,
    by_type: RwLock<HashMap<TypeName, Vec<NodeId>>>,
}

impl NodeStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// # Errors
    /// Returns `QueryError::DuplicateId` if a node with the same id already
    /// exists, regardless of type.
    pub fn insert(&self, node: Node) -> Result<(), QueryError> {
        let mut nodes = self.nodes.write();
        if nodes.contains_key(&node.id) {
            return Err(QueryError::DuplicateId(node.id));
        }
        self.by_type.write().entry(node.node_type.clone()).or_default().push(node.id.clone());
        nodes.insert(node.id.clone(), Arc::new(node));
        Ok(())
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<Arc<Node>> {
        self.nodes.read().get(id).cloned()
    }

    /// Assembles the scan set for a type set: all nodes of each requested
    /// type, types in the requested order, nodes in insertion order.
    #[must_use]
    pub fn collect(&self, types: &[TypeName]) -> Vec<Arc<Node>> {
        let nodes = self.nodes.read();
        let by_type = self.by_type.read();
        let mut out = Vec::new();
        for t in types {
            if let Some(ids) = by_type.get(t) {
                out.extend(ids.iter().filter_map(|id| nodes.get(id).cloned()));
            }
        }
        out
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.read().is_empty()
    }
}
