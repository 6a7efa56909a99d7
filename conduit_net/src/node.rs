// Network nodes and their directional connections.
//
// A `NetworkNode` sits at one `(WorldId, VoxelCoord)` and wraps the host
// that put it there. Its connections are kept in insertion order (at most
// one per direction, so at most six) and always mirror the neighbor's:
// if A lists `(d, B)` then B lists `(d.opposite(), A)`. Only `manager.rs`
// mutates connections, and it always does both sides together.
//
// `network` is a handle into the manager's network map. It is `None` for a
// node that has been added but not yet flushed, and may briefly name a
// network that has already been retired (between a structural edit and the
// next flush).

use crate::types::{ConnectionMask, Direction, DirectionSet, NetworkId, NodeId, VoxelCoord, WorldId};
use smallvec::SmallVec;
use std::rc::Rc;

/// One edge from a node to its neighbor across `direction`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Connection {
    pub direction: Direction,
    pub target: NodeId,
}

/// A host placed at a fixed world position.
#[derive(Debug)]
pub struct NetworkNode<H> {
    id: NodeId,
    world: WorldId,
    position: VoxelCoord,
    host: Rc<H>,
    connections: SmallVec<[Connection; 6]>,
    pub(crate) network: Option<NetworkId>,
}

impl<H> NetworkNode<H> {
    pub(crate) fn new(id: NodeId, world: WorldId, position: VoxelCoord, host: Rc<H>) -> Self {
        Self {
            id,
            world,
            position,
            host,
            connections: SmallVec::new(),
            network: None,
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn world(&self) -> WorldId {
        self.world
    }

    pub fn position(&self) -> VoxelCoord {
        self.position
    }

    pub fn host(&self) -> &Rc<H> {
        &self.host
    }

    /// Connections in the order they were made.
    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    /// Handle of the owning network. `None` until the next flush after the
    /// node was added.
    pub fn network(&self) -> Option<NetworkId> {
        self.network
    }

    /// Directions this node is currently connected through.
    pub fn connection_mask(&self) -> ConnectionMask {
        self.connections.iter().map(|c| c.direction).collect::<DirectionSet>()
    }

    pub(crate) fn add_connection(&mut self, direction: Direction, target: NodeId) {
        debug_assert!(
            self.connections.iter().all(|c| c.direction != direction),
            "node {:?} already connected through {direction}",
            self.id
        );
        self.connections.push(Connection { direction, target });
    }

    /// Drop the connection across `direction` if it points at `target`.
    /// Returns whether anything was removed.
    pub(crate) fn remove_connection(&mut self, direction: Direction, target: NodeId) -> bool {
        let before = self.connections.len();
        self.connections
            .retain(|c| !(c.direction == direction && c.target == target));
        self.connections.len() != before
    }
}
