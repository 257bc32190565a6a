// Submodules for separation of concerns
mod chain;
mod eval;
mod exec;
mod filter;
mod mapper;
mod sort;
mod types;

pub use chain::detect_eq_chain;
pub use eval::{compare_bson, eval_predicate, read_field, read_path};
pub use exec::QueryEngine;
pub use filter::{Operator, Predicate, compile_filter, is_operator_key, parse_filter_json};
pub use mapper::{FieldRef, FieldSource, map_field, map_predicate};
pub use sort::sort_nodes;
pub use types::{Order, QueryArgs, QueryResult, SortSpec};

// Safety limits to prevent resource abuse
pub(crate) const MAX_PATH_DEPTH: usize = 32;
pub(crate) const MAX_IN_SET: usize = 1000;
pub(crate) const MAX_SORT_FIELDS: usize = 8;
pub(crate) const MAX_PATTERN_LEN: usize = 512;
