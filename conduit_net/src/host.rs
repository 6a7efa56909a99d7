// The contract a world entity implements to take part in a network.
//
// A host is owned by its entity (a pipe block, a cable, ...). Nodes hold a
// shared `Rc` handle to it and compare handles by pointer when the entity
// asks to be removed, so a stale handle from a replaced entity can't tear
// down its successor's node.
//
// The engine only ever calls `allowed_connections()`, and does so at link
// time for both endpoints. Hosts that need to change their answer later
// (see `pipe.rs`) go through `NetworkManager::refresh_node()`.

use crate::types::DirectionSet;

/// Capability exposed by a world entity that owns a network node.
pub trait NodeHost {
    /// Directions this host is willing to connect through. An edge exists
    /// only when both endpoints allow the shared face.
    fn allowed_connections(&self) -> DirectionSet;
}
