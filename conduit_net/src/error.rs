// Error types for the network engine.
//
// Every variant is an integration-contract violation: the caller's view of
// the world has drifted from the manager's. Operations that return one of
// these have not mutated anything, and nothing here is retried.

use crate::types::{VoxelCoord, WorldId};
use thiserror::Error;

/// Result type for network engine operations.
pub type Result<T> = std::result::Result<T, NetworkError>;

/// Errors raised by `NetworkManager` and `NetworkRegistry`.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum NetworkError {
    /// `add_node` targeted a position that already holds a node.
    #[error("node at {position} in {world} already exists")]
    DuplicatePosition {
        world: WorldId,
        position: VoxelCoord,
    },

    /// No node exists at the position.
    #[error("node at {position} in {world} doesn't exist")]
    NodeNotFound {
        world: WorldId,
        position: VoxelCoord,
    },

    /// The node at the position is owned by a different host.
    #[error("node at {position} in {world} can't be removed: the hosts don't match")]
    HostMismatch {
        world: WorldId,
        position: VoxelCoord,
    },

    /// The position can't be packed into a 64-bit key.
    #[error("position {position} is outside the addressable range")]
    PositionOutOfRange { position: VoxelCoord },

    #[error("no network manager registered for cache class {cache_class}")]
    UnregisteredCacheClass { cache_class: &'static str },

    #[error("duplicate registration of cache class {cache_class}")]
    DuplicateRegistration { cache_class: &'static str },
}
