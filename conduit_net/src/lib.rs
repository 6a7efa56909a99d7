// conduit_net: incremental connectivity engine for pipe networks.
//
// Nodes placed in a voxel world connect to face-adjacent nodes; every
// maximal connected set forms a `Network` that owns one aggregate cache
// (fluid totals, item routes, ...). The engine keeps those networks correct
// under a stream of add/remove edits without recomputing the world: edits
// retire the networks they touch and queue the affected nodes, and the next
// flush rebuilds only those components.
//
// Module overview:
// - `types.rs`:    VoxelCoord (+ 64-bit packing), Direction, DirectionSet, ids.
// - `host.rs`:     NodeHost: what a world entity exposes to the engine.
// - `cache.rs`:    NetworkCache trait and the cache factory type.
// - `node.rs`:     NetworkNode and its directional connections.
// - `network.rs`:  Network: fixed membership plus its cache.
// - `manager.rs`:  NetworkManager: add/remove/find and lazy flush.
// - `registry.rs`: NetworkRegistry: one manager per cache class, tick/stop hooks.
// - `pipe.rs`:     PipeHost with a per-side blacklist, symmetric side toggling.
// - `command.rs`:  EditCommand: structural edits as serde data.
// - `replay.rs`:   Replay driver and the demo SegmentCache.
// - `config.rs`:   NetworkConfig: tunables loaded from JSON.
// - `error.rs`:    NetworkError.
//
// The `replay` binary (`main.rs`) runs an edit scenario from a JSON file.
//
// **Critical constraint: single writer.** Everything here is driven from
// the simulation thread. Hosts are shared with `Rc`, and nothing is `Send`
// unless a cache chooses to be.

pub mod cache;
pub mod command;
pub mod config;
pub mod error;
pub mod host;
pub mod manager;
pub mod network;
pub mod node;
pub mod pipe;
pub mod registry;
pub mod replay;
pub mod types;

pub use cache::NetworkCache;
pub use error::{NetworkError, Result};
pub use host::NodeHost;
pub use manager::NetworkManager;
pub use network::Network;
pub use node::NetworkNode;
pub use registry::NetworkRegistry;
