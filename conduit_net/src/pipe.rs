// Pipe hosts with a per-side connection blacklist.
//
// `PipeHost` is the stock `NodeHost` for pipe-like entities: it connects on
// every side except those in its blacklist. The blacklist lives in a `Cell`
// because the host is shared (`Rc`) between its entity and its node.
//
// Toggling a side is a two-pipe operation. Disabling the +X face of one pipe
// must also disable the -X face of the pipe next to it, or a later refresh of
// the neighbor would see an asymmetric pair and flip-flop. So
// `set_connection_allowed()` writes both blacklists first and only then
// refreshes both nodes, which re-runs the link check from scratch.
//
// The wrench interaction that decides *which* side to toggle lives with the
// caller; this module only sees the resulting (position, side, allowed).

use crate::cache::NetworkCache;
use crate::error::{NetworkError, Result};
use crate::host::NodeHost;
use crate::manager::NetworkManager;
use crate::types::{Direction, DirectionSet, VoxelCoord, WorldId};
use std::cell::Cell;
use tracing::debug;

/// A host that connects on all sides not explicitly blacklisted.
#[derive(Debug, Default)]
pub struct PipeHost {
    connection_blacklist: Cell<DirectionSet>,
}

impl PipeHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_blacklist(blacklist: DirectionSet) -> Self {
        Self {
            connection_blacklist: Cell::new(blacklist),
        }
    }

    pub fn blacklist(&self) -> DirectionSet {
        self.connection_blacklist.get()
    }

    pub fn is_side_allowed(&self, side: Direction) -> bool {
        !self.connection_blacklist.get().contains(side)
    }

    /// Update the blacklist for one side. Takes effect on the next refresh.
    pub fn set_side_allowed(&self, side: Direction, allowed: bool) {
        let mut blacklist = self.connection_blacklist.get();
        if allowed {
            blacklist.remove(side);
        } else {
            blacklist.insert(side);
        }
        self.connection_blacklist.set(blacklist);
    }
}

impl NodeHost for PipeHost {
    fn allowed_connections(&self) -> DirectionSet {
        self.connection_blacklist.get().complement()
    }
}

impl<C: NetworkCache<Host = PipeHost>> NetworkManager<C> {
    /// Allow or forbid the connection across `side` of the pipe at
    /// `position`, mirroring the change onto the pipe across that side (if
    /// any) and refreshing both nodes.
    ///
    /// The refreshed pipes' networks are retired even when the topology does
    /// not change; replacements appear on the next flush.
    pub fn set_connection_allowed(
        &mut self,
        world: WorldId,
        position: VoxelCoord,
        side: Direction,
        allowed: bool,
    ) -> Result<()> {
        let host = self
            .host_at(world, position)
            .ok_or(NetworkError::NodeNotFound { world, position })?;
        let neighbor_position = position.offset(side);
        let neighbor = self.host_at(world, neighbor_position);

        host.set_side_allowed(side, allowed);
        if let Some(neighbor) = &neighbor {
            neighbor.set_side_allowed(side.opposite(), allowed);
        }

        self.refresh_node(world, position, &host)?;
        if let Some(neighbor) = &neighbor {
            self.refresh_node(world, neighbor_position, neighbor)?;
        }

        debug!(%world, %position, %side, allowed, "updated pipe connection");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NetworkConfig;
    use std::rc::Rc;

    struct Segment(usize);

    impl NetworkCache for Segment {
        type Host = PipeHost;
        fn separate(&mut self) {}
    }

    fn manager() -> NetworkManager<Segment> {
        NetworkManager::<Segment>::new(|members| Segment(members.len()), NetworkConfig::default())
    }

    const W: WorldId = WorldId(0);

    #[test]
    fn blacklist_removes_sides_from_allowed_connections() {
        let host = PipeHost::new();
        assert_eq!(host.allowed_connections(), DirectionSet::ALL);

        host.set_side_allowed(Direction::PosY, false);
        assert!(!host.is_side_allowed(Direction::PosY));
        assert_eq!(host.allowed_connections().len(), 5);

        host.set_side_allowed(Direction::PosY, true);
        assert!(host.blacklist().is_empty());
    }

    #[test]
    fn disabling_a_side_splits_and_mirrors() {
        let mut m = manager();
        let a = VoxelCoord::new(0, 0, 0);
        let b = VoxelCoord::new(1, 0, 0);
        m.add_node(W, a, Rc::new(PipeHost::new())).unwrap();
        m.add_node(W, b, Rc::new(PipeHost::new())).unwrap();
        assert_eq!(m.network_of(W, a).unwrap().cache().0, 2);

        m.set_connection_allowed(W, a, Direction::PosX, false).unwrap();
        assert_eq!(m.network_of(W, a).unwrap().cache().0, 1);
        assert_eq!(m.network_of(W, b).unwrap().cache().0, 1);
        let neighbor = m.find_node(W, b).unwrap();
        assert!(!neighbor.host().is_side_allowed(Direction::NegX));
        assert!(neighbor.connection_mask().is_empty());

        m.set_connection_allowed(W, b, Direction::NegX, true).unwrap();
        assert_eq!(m.network_of(W, a).unwrap().cache().0, 2);
        assert!(m.find_node(W, a).unwrap().host().blacklist().is_empty());
    }

    #[test]
    fn toggling_a_side_with_no_neighbor_only_touches_one_pipe() {
        let mut m = manager();
        let a = VoxelCoord::new(0, 0, 0);
        m.add_node(W, a, Rc::new(PipeHost::new())).unwrap();
        m.flush();
        assert_eq!(m.network_count(), 1);

        // Retired until the next flush, even though nothing was split.
        m.set_connection_allowed(W, a, Direction::NegZ, false).unwrap();
        assert_eq!(m.network_count(), 0);
        m.flush();
        assert_eq!(m.network_count(), 1);
        let node = m.find_node(W, a).unwrap();
        assert_eq!(node.host().blacklist(), DirectionSet::of(&[Direction::NegZ]));
    }

    #[test]
    fn toggling_a_missing_pipe_fails() {
        let mut m = manager();
        let err = m
            .set_connection_allowed(W, VoxelCoord::new(3, 3, 3), Direction::PosX, false)
            .unwrap_err();
        assert!(matches!(err, NetworkError::NodeNotFound { .. }));
    }
}
