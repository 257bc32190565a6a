use crate::errors::QueryError;
use crate::index::ChainIndexStore;
use crate::node::Node;
use crate::resolved::ResolvedCache;
use crate::store::NodeStore;
use bson::Bson;
use std::sync::Arc;

use super::chain::detect_eq_chain;
use super::eval::eval_predicate;
use super::filter::{Predicate, compile_filter};
use super::mapper::{is_resolved_path, map_predicate};
use super::sort::sort_nodes;
use super::types::{QueryArgs, QueryResult};

/// Query facade over the injected collaborators: the record store, the
/// chain-index store, and the resolved-field cache. Pure reads; all three
/// outlive the engine and any one query.
pub struct QueryEngine<'a> {
    store: &'a NodeStore,
    indexes: &'a ChainIndexStore,
    resolved: &'a ResolvedCache,
}

impl<'a> QueryEngine<'a> {
    #[must_use]
    pub fn new(
        store: &'a NodeStore,
        indexes: &'a ChainIndexStore,
        resolved: &'a ResolvedCache,
    ) -> Self {
        Self { store, indexes, resolved }
    }

    /// General entry point. Routing order: the `id`-equality shortcut, then
    /// the chain-index fast path, then a full compile-and-scan over all
    /// candidates of the requested types. Only the full-scan path sorts.
    ///
    /// # Errors
    /// Fails only on filter compilation (configuration) errors; every kind
    /// of lookup miss is encoded in the returned `QueryResult`.
    pub fn query(&self, args: &QueryArgs) -> Result<QueryResult, QueryError> {
        if let Some(filter) = &args.filter
            && let Some((chain, value)) = detect_eq_chain(filter)
            && !is_resolved_path(&chain[0], &args.resolved_fields)
        {
            if chain.len() == 1 && chain[0] == "id" {
                log::debug!("identity shortcut for {value:?}");
                return Ok(self.lookup_by_id(&value, args));
            }
            self.indexes.ensure(&chain, &args.types, self.store);
            let ids = self.indexes.lookup(&chain, &value, &args.types);
            log::debug!("chain index path {} served {} ids", chain.join("."), ids.len());
            let mut nodes: Vec<Arc<Node>> = ids.iter().filter_map(|id| self.store.get(id)).collect();
            if args.first_only {
                nodes.truncate(1);
                return Ok(QueryResult::Matched(nodes));
            }
            // Indexed results are never sorted; only full scans are.
            if nodes.is_empty() {
                return Ok(QueryResult::NoMatch);
            }
            return Ok(QueryResult::Matched(nodes));
        }
        let candidates = self.store.collect(&args.types);
        self.scan(&candidates, args)
    }

    /// Same semantics over an explicitly supplied candidate set; the
    /// identity and chain fast paths are skipped by design.
    ///
    /// # Errors
    /// As for [`Self::query`].
    pub fn query_over_candidates(
        &self,
        candidates: &[Arc<Node>],
        args: &QueryArgs,
    ) -> Result<QueryResult, QueryError> {
        self.scan(candidates, args)
    }

    fn scan(&self, candidates: &[Arc<Node>], args: &QueryArgs) -> Result<QueryResult, QueryError> {
        let pred = match &args.filter {
            Some(f) => map_predicate(compile_filter(f)?, &args.resolved_fields),
            None => Predicate::empty(),
        };
        if args.first_only {
            let hit = candidates.iter().find(|n| eval_predicate(&pred, n, self.resolved)).cloned();
            log::debug!("full scan (first-only) over {} candidates: hit={}", candidates.len(), hit.is_some());
            return Ok(QueryResult::Matched(hit.into_iter().collect()));
        }
        let mut nodes: Vec<Arc<Node>> =
            candidates.iter().filter(|n| eval_predicate(&pred, n, self.resolved)).cloned().collect();
        log::debug!("full scan over {} candidates: {} matched", candidates.len(), nodes.len());
        if nodes.is_empty() {
            return Ok(QueryResult::NoMatch);
        }
        if nodes.len() > 1
            && let Some(spec) = &args.sort
        {
            sort_nodes(&mut nodes, spec, &args.resolved_fields, self.resolved);
        }
        Ok(QueryResult::Matched(nodes))
    }

    // Direct store lookup; no index is built or consulted. The record must
    // belong to one of the eligible types. Resolved fields for the hit are
    // visible to callers through the shared cache, same as on every path.
    fn lookup_by_id(&self, value: &Bson, args: &QueryArgs) -> QueryResult {
        let hit = match value {
            Bson::String(id) => self.store.get(id),
            _ => None,
        }
        .filter(|n| args.types.contains(&n.node_type));
        match hit {
            Some(node) => QueryResult::Matched(vec![node]),
            None if args.first_only => QueryResult::Matched(Vec::new()),
            None => QueryResult::NoMatch,
        }
    }
}
