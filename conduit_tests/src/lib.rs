// Test fixtures for network engine integration tests.
//
// `TestWorld` plays the part of the game world: it owns a real
// `NetworkRegistry` with the `RecordingCache` class registered, keeps the
// `Rc<TestHost>` of everything it placed, and performs add/remove through
// the same manager calls a block entity would.
//
// `RecordingCache` appends every build, separate and tick to a shared
// `CacheLog`, tagged with a per-cache serial number, so tests can assert
// exactly which caches were separated and how often.
//
// `TestWorld::assert_consistent()` is the workhorse: it flushes, then checks
// the manager's networks against an independent BFS flood fill over the
// placed hosts, plus the back-reference, symmetry and exactly-once-separate
// invariants.
//
// See also: `tests/scenarios.rs` for hand-written scenarios,
// `tests/connectivity_props.rs` for randomized edit sequences.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::rc::Rc;

use conduit_net::types::{Direction, DirectionSet, VoxelCoord, WorldId};
use conduit_net::{
    NetworkCache, NetworkError, NetworkManager, NetworkNode, NetworkRegistry, NodeHost,
};

/// The world most tests place into.
pub const WORLD: WorldId = WorldId(0);

/// A set of `(world, position)` keys making up one component.
pub type Component = BTreeSet<(WorldId, VoxelCoord)>;

// ---------------------------------------------------------------------------
// Hosts
// ---------------------------------------------------------------------------

/// A host with a fixed set of allowed directions.
#[derive(Debug)]
pub struct TestHost {
    allowed: DirectionSet,
}

impl TestHost {
    pub fn new(allowed: DirectionSet) -> Self {
        Self { allowed }
    }

    pub fn all() -> Self {
        Self::new(DirectionSet::ALL)
    }

    /// Connects only along the axis of `direction`.
    pub fn axis(direction: Direction) -> Self {
        Self::new(DirectionSet::axis(direction))
    }
}

impl NodeHost for TestHost {
    fn allowed_connections(&self) -> DirectionSet {
        self.allowed
    }
}

// ---------------------------------------------------------------------------
// Recording cache
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CacheEvent {
    Built {
        serial: usize,
        members: Vec<VoxelCoord>,
    },
    Separated { serial: usize },
    Ticked { serial: usize },
}

/// Shared, append-only record of cache lifecycle calls.
#[derive(Debug, Default)]
pub struct CacheLog {
    events: RefCell<Vec<CacheEvent>>,
    next_serial: Cell<usize>,
}

impl CacheLog {
    pub fn events(&self) -> Vec<CacheEvent> {
        self.events.borrow().clone()
    }

    /// Number of caches built so far. Serials run `0..builds()`.
    pub fn builds(&self) -> usize {
        self.next_serial.get()
    }

    /// Serials separated, in call order.
    pub fn separations(&self) -> Vec<usize> {
        self.events
            .borrow()
            .iter()
            .filter_map(|e| match e {
                CacheEvent::Separated { serial } => Some(*serial),
                _ => None,
            })
            .collect()
    }

    pub fn separations_of(&self, serial: usize) -> usize {
        self.separations().iter().filter(|&&s| s == serial).count()
    }

    pub fn ticks_of(&self, serial: usize) -> usize {
        self.events
            .borrow()
            .iter()
            .filter(|e| matches!(e, CacheEvent::Ticked { serial: s } if *s == serial))
            .count()
    }

    /// Sorted member positions the cache `serial` was built from.
    pub fn members_of(&self, serial: usize) -> Option<Vec<VoxelCoord>> {
        self.events.borrow().iter().find_map(|e| match e {
            CacheEvent::Built { serial: s, members } if *s == serial => Some(members.clone()),
            _ => None,
        })
    }

    fn record(&self, event: CacheEvent) {
        self.events.borrow_mut().push(event);
    }
}

/// A cache that records its own lifecycle.
#[derive(Debug)]
pub struct RecordingCache {
    serial: usize,
    members: Vec<VoxelCoord>,
    log: Rc<CacheLog>,
}

impl RecordingCache {
    pub fn build(nodes: &[&NetworkNode<TestHost>], log: &Rc<CacheLog>) -> Self {
        let serial = log.next_serial.get();
        log.next_serial.set(serial + 1);
        let mut members: Vec<VoxelCoord> = nodes.iter().map(|n| n.position()).collect();
        members.sort();
        log.record(CacheEvent::Built {
            serial,
            members: members.clone(),
        });
        Self {
            serial,
            members,
            log: Rc::clone(log),
        }
    }

    pub fn serial(&self) -> usize {
        self.serial
    }

    pub fn members(&self) -> &[VoxelCoord] {
        &self.members
    }
}

impl NetworkCache for RecordingCache {
    type Host = TestHost;

    fn separate(&mut self) {
        self.log.record(CacheEvent::Separated { serial: self.serial });
    }

    fn tick(&mut self) {
        self.log.record(CacheEvent::Ticked { serial: self.serial });
    }
}

// ---------------------------------------------------------------------------
// Test world
// ---------------------------------------------------------------------------

/// A registry plus the hosts placed into it.
pub struct TestWorld {
    pub registry: NetworkRegistry,
    pub log: Rc<CacheLog>,
    hosts: BTreeMap<(WorldId, VoxelCoord), Rc<TestHost>>,
}

impl Default for TestWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl TestWorld {
    pub fn new() -> Self {
        let log = Rc::new(CacheLog::default());
        let mut registry = NetworkRegistry::new();
        let factory_log = Rc::clone(&log);
        registry
            .register_cache_class::<RecordingCache>(move |nodes| {
                RecordingCache::build(nodes, &factory_log)
            })
            .expect("fresh registry");
        Self {
            registry,
            log,
            hosts: BTreeMap::new(),
        }
    }

    pub fn manager(&mut self) -> &mut NetworkManager<RecordingCache> {
        self.registry
            .get_mut::<RecordingCache>()
            .expect("RecordingCache is registered")
    }

    pub fn place(&mut self, position: VoxelCoord, host: TestHost) -> Result<(), NetworkError> {
        self.place_in(WORLD, position, host)
    }

    pub fn place_in(
        &mut self,
        world: WorldId,
        position: VoxelCoord,
        host: TestHost,
    ) -> Result<(), NetworkError> {
        let host = Rc::new(host);
        self.manager().add_node(world, position, Rc::clone(&host))?;
        self.hosts.insert((world, position), host);
        Ok(())
    }

    pub fn remove(&mut self, position: VoxelCoord) -> Result<(), NetworkError> {
        self.remove_in(WORLD, position)
    }

    pub fn remove_in(&mut self, world: WorldId, position: VoxelCoord) -> Result<(), NetworkError> {
        let host = self
            .hosts
            .get(&(world, position))
            .cloned()
            .ok_or(NetworkError::NodeNotFound { world, position })?;
        self.manager().remove_node(world, position, &host)?;
        self.hosts.remove(&(world, position));
        Ok(())
    }

    pub fn host(&self, world: WorldId, position: VoxelCoord) -> Option<Rc<TestHost>> {
        self.hosts.get(&(world, position)).cloned()
    }

    pub fn is_placed(&self, world: WorldId, position: VoxelCoord) -> bool {
        self.hosts.contains_key(&(world, position))
    }

    /// Forget placed hosts, as the world does on stop.
    pub fn stop(&mut self) {
        self.registry.on_simulation_stop();
        self.hosts.clear();
    }

    /// Flushed network sizes, ascending.
    pub fn network_sizes(&mut self) -> Vec<usize> {
        let manager = self.manager();
        manager.flush();
        let mut sizes: Vec<usize> = manager.networks().map(|n| n.len()).collect();
        sizes.sort();
        sizes
    }

    /// Serial of the live cache for the network at `position`, after a flush.
    pub fn serial_at(&mut self, position: VoxelCoord) -> Option<usize> {
        self.manager()
            .network_of(WORLD, position)
            .map(|n| n.cache().serial())
    }

    /// Serials of every live cache, ascending. Does not flush.
    pub fn live_serials(&mut self) -> Vec<usize> {
        let mut serials: Vec<usize> = self
            .manager()
            .networks()
            .map(|n| n.cache().serial())
            .collect();
        serials.sort();
        serials
    }

    /// The manager's networks as sets of `(world, position)`, after a flush.
    pub fn partition(&mut self) -> BTreeSet<Component> {
        let manager = self.manager();
        manager.flush();
        manager
            .networks()
            .map(|network| {
                network
                    .nodes()
                    .iter()
                    .filter_map(|&id| manager.node(id))
                    .map(|node| (node.world(), node.position()))
                    .collect()
            })
            .collect()
    }

    /// Connected components of the placed hosts by BFS, independent of the
    /// engine.
    pub fn reference_partition(&self) -> BTreeSet<Component> {
        let mut seen: BTreeSet<(WorldId, VoxelCoord)> = BTreeSet::new();
        let mut components = BTreeSet::new();

        for &start in self.hosts.keys() {
            if !seen.insert(start) {
                continue;
            }
            let mut component = Component::new();
            let mut queue = VecDeque::from([start]);
            while let Some((world, position)) = queue.pop_front() {
                component.insert((world, position));
                let allowed = self.hosts[&(world, position)].allowed_connections();
                for dir in allowed.iter() {
                    let neighbor = (world, position.offset(dir));
                    let Some(other) = self.hosts.get(&neighbor) else {
                        continue;
                    };
                    if other.allowed_connections().contains(dir.opposite())
                        && seen.insert(neighbor)
                    {
                        queue.push_back(neighbor);
                    }
                }
            }
            components.insert(component);
        }
        components
    }

    /// Flush and check every engine invariant against the reference model.
    pub fn assert_consistent(&mut self) {
        let partition = self.partition();
        assert_eq!(
            partition,
            self.reference_partition(),
            "networks differ from reference components"
        );

        let log = Rc::clone(&self.log);
        let manager = self.manager();
        assert_eq!(manager.pending_count(), 0);

        let mut covered = 0;
        for network in manager.networks() {
            covered += network.len();
            for &id in network.nodes() {
                let node = manager.node(id).expect("member node exists");
                assert_eq!(node.network(), Some(network.id()), "stale back-reference");
                for (dir, neighbor) in manager.connections_of(node) {
                    assert_eq!(neighbor.network(), Some(network.id()), "edge crosses networks");
                    assert!(
                        neighbor
                            .connections()
                            .iter()
                            .any(|c| c.direction == dir.opposite() && c.target == id),
                        "connection is not symmetric"
                    );
                }
            }
            assert_eq!(log.separations_of(network.cache().serial()), 0, "live cache separated");
        }
        assert_eq!(covered, manager.node_count(), "node outside every network");

        let live: BTreeSet<usize> = manager.networks().map(|n| n.cache().serial()).collect();
        for serial in 0..log.builds() {
            let expected = usize::from(!live.contains(&serial));
            assert_eq!(
                log.separations_of(serial),
                expected,
                "cache {serial} separated the wrong number of times"
            );
        }
    }
}
