// Applying edit commands to a live registry.
//
// `Replay` owns a `NetworkRegistry` with one cache class registered,
// `SegmentCache`, and the `Rc<PipeHost>` handle of every pipe it placed (the
// same handle is needed again to remove it). It is the world-side half of
// the contract: it keeps add/remove discipline, and it is what the `replay`
// binary and the integration tests drive.
//
// `SegmentCache` is deliberately small: it records member count, bounding
// box and how many ticks it has seen, and bumps shared counters on build and
// separate so a run can report cache churn.
//
// See also: `command.rs` for the command format, `main.rs` for the CLI.

use crate::cache::NetworkCache;
use crate::command::EditCommand;
use crate::config::NetworkConfig;
use crate::error::NetworkError;
use crate::manager::NetworkManager;
use crate::node::NetworkNode;
use crate::pipe::PipeHost;
use crate::registry::NetworkRegistry;
use crate::types::{NetworkId, VoxelCoord, WorldId};
use serde::Serialize;
use std::cell::Cell;
use std::collections::BTreeMap;
use std::rc::Rc;
use thiserror::Error;
use tracing::info;

/// Errors from loading or running a replay.
#[derive(Debug, Error)]
pub enum ReplayError {
    #[error(transparent)]
    Network(#[from] NetworkError),
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

// ---------------------------------------------------------------------------
// Demo cache
// ---------------------------------------------------------------------------

/// Running totals shared by every `SegmentCache` of one replay.
#[derive(Debug, Default)]
pub struct CacheCounters {
    built: Cell<u64>,
    separated: Cell<u64>,
}

impl CacheCounters {
    pub fn built(&self) -> u64 {
        self.built.get()
    }

    pub fn separated(&self) -> u64 {
        self.separated.get()
    }
}

/// Aggregate for one connected run of pipes.
#[derive(Debug)]
pub struct SegmentCache {
    members: usize,
    min: VoxelCoord,
    max: VoxelCoord,
    ticks: u64,
    counters: Rc<CacheCounters>,
}

impl SegmentCache {
    pub fn build(members: &[&NetworkNode<PipeHost>], counters: Rc<CacheCounters>) -> Self {
        let first = members
            .first()
            .map(|n| n.position())
            .unwrap_or(VoxelCoord::new(0, 0, 0));
        let (min, max) = members.iter().fold((first, first), |(min, max), n| {
            let p = n.position();
            (
                VoxelCoord::new(min.x.min(p.x), min.y.min(p.y), min.z.min(p.z)),
                VoxelCoord::new(max.x.max(p.x), max.y.max(p.y), max.z.max(p.z)),
            )
        });
        counters.built.set(counters.built.get() + 1);
        Self {
            members: members.len(),
            min,
            max,
            ticks: 0,
            counters,
        }
    }

    pub fn members(&self) -> usize {
        self.members
    }

    pub fn bounds(&self) -> (VoxelCoord, VoxelCoord) {
        (self.min, self.max)
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}

impl NetworkCache for SegmentCache {
    type Host = PipeHost;

    fn separate(&mut self) {
        self.counters.separated.set(self.counters.separated.get() + 1);
    }

    fn tick(&mut self) {
        self.ticks += 1;
    }
}

// ---------------------------------------------------------------------------
// Summary
// ---------------------------------------------------------------------------

/// One live network at the end of a replay.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NetworkSummary {
    pub id: NetworkId,
    pub members: usize,
    pub min: VoxelCoord,
    pub max: VoxelCoord,
    pub ticks: u64,
}

/// What a replay left behind.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ReplaySummary {
    pub ticks: u64,
    pub nodes: usize,
    pub caches_built: u64,
    pub caches_separated: u64,
    pub networks: Vec<NetworkSummary>,
}

// ---------------------------------------------------------------------------
// Driver
// ---------------------------------------------------------------------------

/// A registry plus the pipe hosts placed into it.
pub struct Replay {
    registry: NetworkRegistry,
    hosts: BTreeMap<(WorldId, VoxelCoord), Rc<PipeHost>>,
    counters: Rc<CacheCounters>,
    ticks: u64,
}

impl Replay {
    pub fn new(config: NetworkConfig) -> Result<Self, ReplayError> {
        let counters = Rc::new(CacheCounters::default());
        let mut registry = NetworkRegistry::with_config(config);
        let factory_counters = Rc::clone(&counters);
        registry.register_cache_class::<SegmentCache>(move |members| {
            SegmentCache::build(members, Rc::clone(&factory_counters))
        })?;
        Ok(Self {
            registry,
            hosts: BTreeMap::new(),
            counters,
            ticks: 0,
        })
    }

    pub fn registry(&self) -> &NetworkRegistry {
        &self.registry
    }

    pub fn manager(&mut self) -> Result<&mut NetworkManager<SegmentCache>, ReplayError> {
        Ok(self.registry.get_mut::<SegmentCache>()?)
    }

    pub fn counters(&self) -> &CacheCounters {
        &self.counters
    }

    pub fn apply(&mut self, command: &EditCommand) -> Result<(), ReplayError> {
        match *command {
            EditCommand::Place {
                world,
                position,
                blacklist,
            } => {
                let host = Rc::new(PipeHost::with_blacklist(blacklist));
                self.manager()?.add_node(world, position, Rc::clone(&host))?;
                self.hosts.insert((world, position), host);
            }
            EditCommand::Remove { world, position } => {
                let host = self
                    .hosts
                    .get(&(world, position))
                    .cloned()
                    .ok_or(NetworkError::NodeNotFound { world, position })?;
                self.manager()?.remove_node(world, position, &host)?;
                self.hosts.remove(&(world, position));
            }
            EditCommand::SetConnection {
                world,
                position,
                side,
                allowed,
            } => {
                self.manager()?.set_connection_allowed(world, position, side, allowed)?;
            }
            EditCommand::Tick { count } => {
                for _ in 0..count {
                    self.registry.on_global_tick();
                    self.ticks += 1;
                }
            }
            EditCommand::Stop => {
                self.registry.on_simulation_stop();
                self.hosts.clear();
            }
        }
        Ok(())
    }

    /// Apply every command in order, stopping at the first error.
    pub fn run(&mut self, commands: &[EditCommand]) -> Result<(), ReplayError> {
        for command in commands {
            self.apply(command)?;
        }
        info!(commands = commands.len(), ticks = self.ticks, "replay finished");
        Ok(())
    }

    /// Flush and describe every live network.
    pub fn summary(&mut self) -> Result<ReplaySummary, ReplayError> {
        let manager = self.registry.get_mut::<SegmentCache>()?;
        manager.flush();
        let networks = manager
            .networks()
            .map(|network| {
                let cache = network.cache();
                let (min, max) = cache.bounds();
                NetworkSummary {
                    id: network.id(),
                    members: cache.members(),
                    min,
                    max,
                    ticks: cache.ticks(),
                }
            })
            .collect();
        Ok(ReplaySummary {
            ticks: self.ticks,
            nodes: manager.node_count(),
            caches_built: self.counters.built(),
            caches_separated: self.counters.separated(),
            networks,
        })
    }
}
