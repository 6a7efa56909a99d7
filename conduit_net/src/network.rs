// A connected component and the cache built for it.
//
// Membership is fixed at construction: when a structural edit touches a
// network, the manager retires the whole `Network` (separating its cache)
// and a later flush builds replacements. Nothing here is mutable except the
// cache itself.

use crate::cache::NetworkCache;
use crate::types::{NetworkId, NodeId};

/// A maximal set of mutually reachable nodes plus their shared cache.
pub struct Network<C: NetworkCache> {
    id: NetworkId,
    nodes: Vec<NodeId>,
    cache: C,
}

impl<C: NetworkCache> Network<C> {
    pub(crate) fn new(id: NetworkId, nodes: Vec<NodeId>, cache: C) -> Self {
        debug_assert!(!nodes.is_empty(), "network {id} has no members");
        Self { id, nodes, cache }
    }

    pub fn id(&self) -> NetworkId {
        self.id
    }

    /// Member node ids in traversal order.
    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// `false` for every network the manager hands out.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }

    pub fn cache_mut(&mut self) -> &mut C {
        &mut self.cache
    }

    /// Separate the cache and drop the network.
    pub(crate) fn retire(mut self) {
        self.cache.separate();
    }
}

impl<C: NetworkCache + std::fmt::Debug> std::fmt::Debug for Network<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Network")
            .field("id", &self.id)
            .field("nodes", &self.nodes)
            .field("cache", &self.cache)
            .finish()
    }
}
