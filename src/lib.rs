//! nodesift: an in-memory node query engine.
//!
//! Filters typed records with nested, mongo-style filter documents,
//! short-circuits single-field equality chains through lazily built chain
//! indexes (with a dedicated shortcut for `id` equality), and stably sorts
//! multi-key results whose fields may live on the record body or in an
//! externally resolved side-namespace.
//!
//! The engine is a pure computation layer: the node store, the chain-index
//! store, and the resolved-field cache are injected collaborators it only
//! ever reads.

pub mod errors;
pub mod index;
pub mod logger;
pub mod node;
pub mod query;
pub mod resolved;
pub mod store;
pub mod types;

pub use errors::QueryError;
pub use index::ChainIndexStore;
pub use node::Node;
pub use query::{QueryArgs, QueryEngine, QueryResult};
pub use resolved::ResolvedCache;
pub use store::NodeStore;
