// Incremental connected-components engine for one cache class.
//
// `NetworkManager` owns every node of its cache class across all worlds,
// the live networks built over them, and a pending worklist. Structural
// edits (`add_node`, `remove_node`) are cheap and eager only in one respect:
// any network they touch is retired on the spot, separating its cache, so
// nobody can observe a cache that disagrees with its node set. Rebuilding
// is deferred to `flush()`, which runs before every `find_node` and once per
// global tick.
//
// ## Retire-then-rebuild
//
// - `add_node`: links the new node to each compatible neighbor and retires
//   each neighbor's network (a merge may follow). The new node is pending.
// - `remove_node`: retires the node's network (a split may follow), unlinks
//   its neighbors and marks them pending.
// - `flush`: for each pending node not yet visited, an explicit-stack DFS
//   collects its component into a brand-new network and hands the member
//   list to the cache factory. Visited nodes whose old network is somehow
//   still live retire it too.
//
// Every surviving member of a retired network is reachable from a pending
// node (through the new node on a merge, through one of the removed node's
// neighbors on a split), so a flush reassigns all of them.
//
// Retiring removes the network from `networks` before separating it, and
// network ids are never reused, so a second retire of the same id is a
// no-op. That is what makes `separate()` exactly-once per network no matter
// how many edits or traversal roots reach it.
//
// ## Storage
//
// - `nodes`: `FxHashMap<NodeId, NetworkNode>`; only ever probed by id.
// - `positions`: per-world `BTreeMap` from packed coordinate to `NodeId`.
// - `pending_updates`: `BTreeSet`, so flush roots are visited in id order.
// - `networks`: `BTreeMap<NetworkId, Network>`, so ticks run in creation
//   order.
//
// See also: `registry.rs` which owns one manager per cache class and drives
// `tick()`, `pipe.rs` for blacklist edits built on `refresh_node()`.
//
// **Critical constraint: single writer.** All methods take `&mut self` for
// mutation; other threads only ever see copied snapshots such as
// `NetworkNode::connection_mask()`.

use crate::cache::{CacheFactory, NetworkCache};
use crate::config::NetworkConfig;
use crate::error::{NetworkError, Result};
use crate::host::NodeHost;
use crate::network::Network;
use crate::node::NetworkNode;
use crate::types::{Direction, NetworkId, NodeId, VoxelCoord, WorldId};
use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;
use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;
use tracing::{debug, trace, warn};

/// Counts from the most recent non-empty flush.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FlushStats {
    pub nodes_visited: usize,
    pub networks_built: usize,
    pub networks_retired: usize,
}

/// The coordinator for every network of cache class `C`.
pub struct NetworkManager<C: NetworkCache> {
    cache_factory: CacheFactory<C>,
    config: NetworkConfig,
    nodes: FxHashMap<NodeId, NetworkNode<C::Host>>,
    positions: BTreeMap<WorldId, BTreeMap<u64, NodeId>>,
    pending_updates: BTreeSet<NodeId>,
    networks: BTreeMap<NetworkId, Network<C>>,
    next_node_id: u64,
    next_network_id: u64,
    last_flush: FlushStats,
}

impl<C: NetworkCache> NetworkManager<C> {
    pub fn new(
        cache_factory: impl Fn(&[&NetworkNode<C::Host>]) -> C + 'static,
        config: NetworkConfig,
    ) -> Self {
        Self {
            cache_factory: Box::new(cache_factory),
            config,
            nodes: FxHashMap::default(),
            positions: BTreeMap::new(),
            pending_updates: BTreeSet::new(),
            networks: BTreeMap::new(),
            next_node_id: 0,
            next_network_id: 0,
            last_flush: FlushStats::default(),
        }
    }

    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }

    // -----------------------------------------------------------------------
    // Structural edits
    // -----------------------------------------------------------------------

    /// Place a node for `host` at `position`.
    ///
    /// Links it to every neighbor whose host allows the shared face and
    /// retires those neighbors' networks. The new node joins a network on
    /// the next flush.
    pub fn add_node(
        &mut self,
        world: WorldId,
        position: VoxelCoord,
        host: Rc<C::Host>,
    ) -> Result<NodeId> {
        let packed = position
            .pack()
            .ok_or(NetworkError::PositionOutOfRange { position })?;
        let world_nodes = self.positions.entry(world).or_default();
        if world_nodes.contains_key(&packed) {
            return Err(NetworkError::DuplicatePosition { world, position });
        }

        let id = NodeId(self.next_node_id);
        self.next_node_id += 1;
        world_nodes.insert(packed, id);

        let allowed = host.allowed_connections();
        let mut node = NetworkNode::new(id, world, position, host);

        for direction in allowed.iter() {
            let Some(adjacent_packed) = position.offset(direction).pack() else {
                continue;
            };
            let Some(&adjacent_id) = world_nodes.get(&adjacent_packed) else {
                continue;
            };
            let Some(adjacent) = self.nodes.get_mut(&adjacent_id) else {
                continue;
            };
            if !adjacent
                .host()
                .allowed_connections()
                .contains(direction.opposite())
            {
                continue;
            }

            // The adjacent network may be unassigned if it was added this tick.
            if let Some(network_id) = adjacent.network {
                retire_network(&mut self.networks, network_id);
            }

            adjacent.add_connection(direction.opposite(), id);
            node.add_connection(direction, adjacent_id);
        }

        trace!(
            %world,
            %position,
            connections = node.connections().len(),
            "added network node"
        );
        self.nodes.insert(id, node);
        self.pending_updates.insert(id);
        Ok(id)
    }

    /// Remove the node at `position`, which must belong to `host`.
    ///
    /// Retires the node's network and marks every former neighbor pending.
    /// On error nothing changes.
    pub fn remove_node(
        &mut self,
        world: WorldId,
        position: VoxelCoord,
        host: &Rc<C::Host>,
    ) -> Result<()> {
        let not_found = || NetworkError::NodeNotFound { world, position };
        let packed = position.pack().ok_or_else(not_found)?;
        let id = self
            .positions
            .get(&world)
            .and_then(|world_nodes| world_nodes.get(&packed))
            .copied()
            .ok_or_else(not_found)?;
        let existing = self.nodes.get(&id).ok_or_else(not_found)?;
        if !Rc::ptr_eq(existing.host(), host) {
            return Err(NetworkError::HostMismatch { world, position });
        }

        if let Some(world_nodes) = self.positions.get_mut(&world) {
            world_nodes.remove(&packed);
            if world_nodes.is_empty() {
                self.positions.remove(&world);
            }
        }
        let Some(node) = self.nodes.remove(&id) else {
            return Err(not_found());
        };
        self.pending_updates.remove(&id);

        // Unassigned if the node never survived a flush.
        if let Some(network_id) = node.network {
            retire_network(&mut self.networks, network_id);
        }

        for connection in node.connections() {
            if let Some(target) = self.nodes.get_mut(&connection.target) {
                target.remove_connection(connection.direction.opposite(), id);
                self.pending_updates.insert(connection.target);
            }
        }

        trace!(
            %world,
            %position,
            neighbors = node.connections().len(),
            "removed network node"
        );
        Ok(())
    }

    /// Remove and re-add the node at `position` with the same host, picking
    /// up changes to the host's allowed connections.
    pub fn refresh_node(
        &mut self,
        world: WorldId,
        position: VoxelCoord,
        host: &Rc<C::Host>,
    ) -> Result<NodeId> {
        self.remove_node(world, position, host)?;
        self.add_node(world, position, Rc::clone(host))
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Look up the node at `position` after bringing every network up to
    /// date, so the node's network and cache are consistent.
    pub fn find_node(
        &mut self,
        world: WorldId,
        position: VoxelCoord,
    ) -> Option<&NetworkNode<C::Host>> {
        self.flush();
        let id = self.node_id_at(world, position)?;
        self.nodes.get(&id)
    }

    /// The network owning the node at `position`, after a flush.
    pub fn network_of(&mut self, world: WorldId, position: VoxelCoord) -> Option<&Network<C>> {
        self.flush();
        let id = self.node_id_at(world, position)?;
        let network_id = self.nodes.get(&id)?.network?;
        self.networks.get(&network_id)
    }

    /// Mutable access to the network owning the node at `position`, after a
    /// flush.
    pub fn network_of_mut(
        &mut self,
        world: WorldId,
        position: VoxelCoord,
    ) -> Option<&mut Network<C>> {
        self.flush();
        let id = self.node_id_at(world, position)?;
        let network_id = self.nodes.get(&id)?.network?;
        self.networks.get_mut(&network_id)
    }

    /// Node by id, without flushing. Its `network()` may be stale.
    pub fn node(&self, id: NodeId) -> Option<&NetworkNode<C::Host>> {
        self.nodes.get(&id)
    }

    /// Neighbors of `node` in connection order, without flushing.
    pub fn connections_of<'a>(
        &'a self,
        node: &'a NetworkNode<C::Host>,
    ) -> impl Iterator<Item = (Direction, &'a NetworkNode<C::Host>)> + 'a {
        node.connections()
            .iter()
            .filter_map(|c| self.nodes.get(&c.target).map(|target| (c.direction, target)))
    }

    /// Live network by id, without flushing.
    pub fn network(&self, id: NetworkId) -> Option<&Network<C>> {
        self.networks.get(&id)
    }

    /// Live networks in creation order, without flushing.
    pub fn networks(&self) -> impl Iterator<Item = &Network<C>> {
        self.networks.values()
    }

    pub fn network_count(&self) -> usize {
        self.networks.len()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn pending_count(&self) -> usize {
        self.pending_updates.len()
    }

    pub fn last_flush(&self) -> FlushStats {
        self.last_flush
    }

    pub(crate) fn host_at(&self, world: WorldId, position: VoxelCoord) -> Option<Rc<C::Host>> {
        let id = self.node_id_at(world, position)?;
        self.nodes.get(&id).map(|node| Rc::clone(node.host()))
    }

    fn node_id_at(&self, world: WorldId, position: VoxelCoord) -> Option<NodeId> {
        let packed = position.pack()?;
        self.positions.get(&world)?.get(&packed).copied()
    }

    // -----------------------------------------------------------------------
    // Recomputation
    // -----------------------------------------------------------------------

    /// Rebuild the component of every pending node. A no-op when nothing is
    /// pending.
    pub fn flush(&mut self) {
        if self.pending_updates.is_empty() {
            return;
        }

        let pending = std::mem::take(&mut self.pending_updates);
        let mut visited: FxHashSet<NodeId> = FxHashSet::default();
        let mut stack: Vec<NodeId> = Vec::new();
        let mut stats = FlushStats::default();

        for root in pending {
            if visited.contains(&root) || !self.nodes.contains_key(&root) {
                continue;
            }

            let network_id = NetworkId(self.next_network_id);
            self.next_network_id += 1;
            let mut members = Vec::new();

            visited.insert(root);
            stack.push(root);
            while let Some(id) = stack.pop() {
                let Some(node) = self.nodes.get_mut(&id) else {
                    continue;
                };
                let previous = node.network.replace(network_id);
                members.push(id);

                // Reverse so the first connection is explored first.
                let targets: SmallVec<[NodeId; 6]> =
                    node.connections().iter().rev().map(|c| c.target).collect();
                for target in targets {
                    if visited.insert(target) {
                        stack.push(target);
                    }
                }

                if previous.is_some_and(|previous| retire_network(&mut self.networks, previous)) {
                    stats.networks_retired += 1;
                }
            }

            let member_nodes: Vec<&NetworkNode<C::Host>> =
                members.iter().filter_map(|id| self.nodes.get(id)).collect();
            let cache = (self.cache_factory)(&member_nodes);
            stats.nodes_visited += members.len();
            stats.networks_built += 1;
            self.networks
                .insert(network_id, Network::new(network_id, members, cache));
        }

        debug!(
            nodes_visited = stats.nodes_visited,
            networks_built = stats.networks_built,
            networks_retired = stats.networks_retired,
            live_networks = self.networks.len(),
            "flushed pending network updates"
        );
        if stats.nodes_visited > self.config.large_flush_warn_threshold {
            warn!(
                nodes_visited = stats.nodes_visited,
                threshold = self.config.large_flush_warn_threshold,
                "network flush visited an unusually large number of nodes"
            );
        }
        self.last_flush = stats;
    }

    /// Tick every live cache. Does not flush.
    pub fn tick_networks(&mut self) {
        for network in self.networks.values_mut() {
            network.cache_mut().tick();
        }
    }

    /// Flush, then tick every live cache. One global tick for this manager.
    pub fn tick(&mut self) {
        self.flush();
        self.tick_networks();
    }

    /// Forget every node, network and pending update. Caches are dropped
    /// without being separated. Id counters keep running.
    pub fn clear(&mut self) {
        debug!(
            nodes = self.nodes.len(),
            networks = self.networks.len(),
            "clearing network manager"
        );
        self.nodes.clear();
        self.positions.clear();
        self.pending_updates.clear();
        self.networks.clear();
        self.last_flush = FlushStats::default();
    }
}

/// Remove `id` from the live set and separate its cache. Returns `false`
/// (and does nothing) if it was already gone.
fn retire_network<C: NetworkCache>(
    networks: &mut BTreeMap<NetworkId, Network<C>>,
    id: NetworkId,
) -> bool {
    match networks.remove(&id) {
        Some(network) => {
            trace!(network = %id, nodes = network.len(), "retiring network");
            network.retire();
            true
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DirectionSet;
    use std::cell::RefCell;

    struct Host(DirectionSet);

    impl NodeHost for Host {
        fn allowed_connections(&self) -> DirectionSet {
            self.0
        }
    }

    #[derive(Default)]
    struct Log {
        built: Vec<Vec<VoxelCoord>>,
        separated: Vec<usize>,
        ticked: Vec<usize>,
    }

    struct CountingCache {
        serial: usize,
        log: Rc<RefCell<Log>>,
    }

    impl NetworkCache for CountingCache {
        type Host = Host;

        fn separate(&mut self) {
            self.log.borrow_mut().separated.push(self.serial);
        }

        fn tick(&mut self) {
            self.log.borrow_mut().ticked.push(self.serial);
        }
    }

    fn manager() -> (NetworkManager<CountingCache>, Rc<RefCell<Log>>) {
        let log = Rc::new(RefCell::new(Log::default()));
        let factory_log = Rc::clone(&log);
        let manager = NetworkManager::new(
            move |members: &[&NetworkNode<Host>]| {
                let mut log = factory_log.borrow_mut();
                let mut positions: Vec<_> = members.iter().map(|n| n.position()).collect();
                positions.sort();
                log.built.push(positions);
                CountingCache {
                    serial: log.built.len() - 1,
                    log: Rc::clone(&factory_log),
                }
            },
            NetworkConfig::default(),
        );
        (manager, log)
    }

    fn all() -> Rc<Host> {
        Rc::new(Host(DirectionSet::ALL))
    }

    const W: WorldId = WorldId(0);

    fn at(x: i32) -> VoxelCoord {
        VoxelCoord::new(x, 0, 0)
    }

    #[test]
    fn add_links_compatible_neighbors_symmetrically() {
        let (mut m, _) = manager();
        m.add_node(W, at(0), all()).unwrap();
        m.add_node(W, at(1), all()).unwrap();

        let a_id = m.find_node(W, at(0)).unwrap().id();
        let a = m.node(a_id).unwrap();
        assert_eq!(a.connections().len(), 1);
        assert_eq!(a.connections()[0].direction, Direction::PosX);
        let b_id = a.connections()[0].target;
        let b = m.node(b_id).unwrap();
        assert_eq!(b.connections()[0].direction, Direction::NegX);
        assert_eq!(a.network(), b.network());
        assert_eq!(m.network_count(), 1);
    }

    #[test]
    fn network_handles_go_stale_after_an_edit() {
        let (mut m, log) = manager();
        m.add_node(W, at(0), all()).unwrap();
        let old = m.network_of(W, at(0)).unwrap().id();
        assert!(m.network(old).is_some());

        m.add_node(W, at(1), all()).unwrap();
        assert!(m.network(old).is_none());

        let merged = m.network_of_mut(W, at(1)).unwrap();
        assert_ne!(merged.id(), old);
        assert_eq!(merged.len(), 2);
        merged.cache_mut().tick();
        assert_eq!(log.borrow().ticked, vec![1]);
    }

    #[test]
    fn both_hosts_must_allow_the_shared_face() {
        let (mut m, _) = manager();
        m.add_node(W, at(0), Rc::new(Host(DirectionSet::of(&[Direction::PosX]))))
            .unwrap();
        // Neighbor only allows +X, so it can't connect back through -X.
        m.add_node(W, at(1), Rc::new(Host(DirectionSet::of(&[Direction::PosX]))))
            .unwrap();
        m.flush();
        assert_eq!(m.network_count(), 2);
        assert!(m.find_node(W, at(0)).unwrap().connections().is_empty());
    }

    #[test]
    fn nodes_in_different_worlds_never_connect() {
        let (mut m, _) = manager();
        m.add_node(WorldId(0), at(0), all()).unwrap();
        m.add_node(WorldId(1), at(1), all()).unwrap();
        m.flush();
        assert_eq!(m.network_count(), 2);
    }

    #[test]
    fn edits_defer_cache_builds_until_flush() {
        let (mut m, log) = manager();
        for x in 0..5 {
            m.add_node(W, at(x), all()).unwrap();
        }
        assert!(log.borrow().built.is_empty());
        assert_eq!(m.pending_count(), 5);

        m.flush();
        assert_eq!(log.borrow().built.len(), 1);
        assert_eq!(log.borrow().built[0].len(), 5);
        assert_eq!(m.pending_count(), 0);

        // A second flush with nothing pending builds nothing.
        m.flush();
        assert_eq!(log.borrow().built.len(), 1);
    }

    #[test]
    fn merge_separates_each_old_cache_once() {
        let (mut m, log) = manager();
        m.add_node(W, at(0), all()).unwrap();
        m.add_node(W, at(2), all()).unwrap();
        m.flush();
        assert_eq!(m.network_count(), 2);

        m.add_node(W, at(1), all()).unwrap();
        let mut separated = log.borrow().separated.clone();
        separated.sort();
        assert_eq!(separated, vec![0, 1]);

        m.flush();
        assert_eq!(m.network_count(), 1);
        assert_eq!(log.borrow().built.last().unwrap(), &vec![at(0), at(1), at(2)]);
        assert_eq!(log.borrow().separated.len(), 2);
    }

    #[test]
    fn touching_one_network_twice_separates_it_once() {
        let (mut m, log) = manager();
        // An L of three nodes; the new corner touches it on two faces.
        m.add_node(W, VoxelCoord::new(0, 0, 0), all()).unwrap();
        m.add_node(W, VoxelCoord::new(0, 1, 0), all()).unwrap();
        m.add_node(W, VoxelCoord::new(1, 1, 0), all()).unwrap();
        m.flush();

        m.add_node(W, VoxelCoord::new(1, 0, 0), all()).unwrap();
        m.add_node(W, VoxelCoord::new(2, 0, 0), all()).unwrap();
        m.flush();
        assert_eq!(log.borrow().separated, vec![0]);
        assert_eq!(m.network_count(), 1);
    }

    #[test]
    fn split_builds_one_network_per_component() {
        let (mut m, log) = manager();
        let hosts: Vec<_> = (0..3).map(|_| all()).collect();
        for (x, host) in hosts.iter().enumerate() {
            m.add_node(W, at(x as i32), Rc::clone(host)).unwrap();
        }
        m.flush();

        m.remove_node(W, at(1), &hosts[1]).unwrap();
        assert_eq!(log.borrow().separated, vec![0]);
        m.flush();

        assert_eq!(m.network_count(), 2);
        assert_eq!(m.network_of(W, at(0)).unwrap().len(), 1);
        assert_eq!(m.network_of(W, at(2)).unwrap().len(), 1);
        assert_eq!(log.borrow().separated, vec![0]);
    }

    #[test]
    fn removing_an_isolated_node_drops_its_network() {
        let (mut m, log) = manager();
        let host = all();
        m.add_node(W, at(0), Rc::clone(&host)).unwrap();
        m.flush();
        m.remove_node(W, at(0), &host).unwrap();
        assert_eq!(m.network_count(), 0);
        assert_eq!(log.borrow().separated, vec![0]);
    }

    #[test]
    fn add_then_remove_before_flush_leaves_no_trace() {
        let (mut m, log) = manager();
        let host = all();
        m.add_node(W, at(0), Rc::clone(&host)).unwrap();
        m.remove_node(W, at(0), &host).unwrap();
        m.flush();
        assert_eq!(m.network_count(), 0);
        assert_eq!(m.node_count(), 0);
        assert!(log.borrow().built.is_empty());
        assert!(log.borrow().separated.is_empty());
    }

    #[test]
    fn duplicate_position_leaves_existing_node() {
        let (mut m, _) = manager();
        let first = all();
        m.add_node(W, at(0), Rc::clone(&first)).unwrap();
        let err = m.add_node(W, at(0), all()).unwrap_err();
        assert_eq!(
            err,
            NetworkError::DuplicatePosition {
                world: W,
                position: at(0)
            }
        );
        assert_eq!(m.node_count(), 1);
        let node = m.find_node(W, at(0)).unwrap();
        assert!(Rc::ptr_eq(node.host(), &first));
    }

    #[test]
    fn host_mismatch_leaves_graph_unchanged() {
        let (mut m, log) = manager();
        m.add_node(W, at(0), all()).unwrap();
        m.add_node(W, at(1), all()).unwrap();
        m.flush();

        let err = m.remove_node(W, at(0), &all()).unwrap_err();
        assert_eq!(
            err,
            NetworkError::HostMismatch {
                world: W,
                position: at(0)
            }
        );
        assert_eq!(m.node_count(), 2);
        assert_eq!(m.pending_count(), 0);
        assert!(log.borrow().separated.is_empty());
        assert_eq!(m.network_of(W, at(1)).unwrap().len(), 2);
    }

    #[test]
    fn remove_missing_node_fails() {
        let (mut m, _) = manager();
        let err = m.remove_node(W, at(4), &all()).unwrap_err();
        assert_eq!(
            err,
            NetworkError::NodeNotFound {
                world: W,
                position: at(4)
            }
        );
    }

    #[test]
    fn out_of_range_position_is_rejected() {
        let (mut m, _) = manager();
        let position = VoxelCoord::new(0, 5000, 0);
        let err = m.add_node(W, position, all()).unwrap_err();
        assert_eq!(err, NetworkError::PositionOutOfRange { position });
        assert!(m.find_node(W, position).is_none());
    }

    #[test]
    fn refresh_picks_up_new_allowed_connections() {
        let (mut m, log) = manager();
        let a = all();
        let b = Rc::new(Host(DirectionSet::EMPTY));
        m.add_node(W, at(0), Rc::clone(&a)).unwrap();
        m.add_node(W, at(1), Rc::clone(&b)).unwrap();
        m.flush();
        assert_eq!(m.network_count(), 2);

        // Swap in a fully connectable host object at the same position.
        m.remove_node(W, at(1), &b).unwrap();
        let b2 = all();
        m.add_node(W, at(1), Rc::clone(&b2)).unwrap();
        m.refresh_node(W, at(0), &a).unwrap();
        m.flush();
        assert_eq!(m.network_count(), 1);
        assert_eq!(log.borrow().separated.len(), 2);
    }

    #[test]
    fn tick_flushes_then_ticks_every_live_cache() {
        let (mut m, log) = manager();
        m.add_node(W, at(0), all()).unwrap();
        m.add_node(W, at(5), all()).unwrap();
        m.tick();
        m.tick();
        let mut ticked = log.borrow().ticked.clone();
        ticked.sort();
        assert_eq!(ticked, vec![0, 0, 1, 1]);
    }

    #[test]
    fn clear_drops_everything_without_separating() {
        let (mut m, log) = manager();
        m.add_node(W, at(0), all()).unwrap();
        m.flush();
        m.add_node(W, at(3), all()).unwrap();
        m.clear();
        assert_eq!(m.node_count(), 0);
        assert_eq!(m.network_count(), 0);
        assert_eq!(m.pending_count(), 0);
        assert!(log.borrow().separated.is_empty());
        // The position is free again.
        m.add_node(W, at(0), all()).unwrap();
    }

    #[test]
    fn flush_stats_report_the_last_pass() {
        let (mut m, _) = manager();
        for x in 0..4 {
            m.add_node(W, at(x), all()).unwrap();
        }
        m.flush();
        assert_eq!(
            m.last_flush(),
            FlushStats {
                nodes_visited: 4,
                networks_built: 1,
                networks_retired: 0
            }
        );
    }

    #[test]
    fn connections_of_resolves_neighbors() {
        let (mut m, _) = manager();
        m.add_node(W, VoxelCoord::new(0, 0, 0), all()).unwrap();
        m.add_node(W, VoxelCoord::new(0, 1, 0), all()).unwrap();
        m.add_node(W, VoxelCoord::new(0, 0, 1), all()).unwrap();
        m.flush();
        let center_id = m.find_node(W, VoxelCoord::new(0, 0, 0)).unwrap().id();
        let center = m.node(center_id).unwrap();
        let neighbors: Vec<_> = m
            .connections_of(center)
            .map(|(dir, n)| (dir, n.position()))
            .collect();
        assert_eq!(
            neighbors,
            vec![
                (Direction::PosY, VoxelCoord::new(0, 1, 0)),
                (Direction::PosZ, VoxelCoord::new(0, 0, 1)),
            ]
        );
        assert_eq!(
            center.connection_mask(),
            DirectionSet::of(&[Direction::PosY, Direction::PosZ])
        );
    }
}
