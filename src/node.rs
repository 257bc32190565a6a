use crate::types::{NodeId, TypeName};
use bson::Document as BsonDocument;
use serde::{Deserialize, Serialize};

/// A uniquely identified, typed record. The id is unique across the whole
/// store (not per type) and the type tag never changes after creation.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Node {
    pub id: NodeId,
    pub node_type: TypeName,
    pub fields: BsonDocument,
}

impl Node {
    pub fn new(id: impl Into<NodeId>, node_type: impl Into<TypeName>, fields: BsonDocument) -> Self {
        Self { id: id.into(), node_type: node_type.into(), fields }
    }
}
