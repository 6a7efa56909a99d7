// Per-network aggregate state.
//
// A `NetworkCache` is whatever a network type needs to know about its whole
// membership at once: total fluid capacity, the set of item endpoints, a
// routing table. It is built from scratch by a factory each time a network
// is (re)formed and is never patched in place.
//
// Lifecycle, as driven by `manager.rs`:
//   factory(members) -> tick()* -> separate() -> dropped
//
// `separate()` runs exactly once, at the moment a structural edit makes the
// cache stale. Caches dropped by `NetworkRegistry::on_simulation_stop()` are
// not separated: the world they described no longer exists.

use crate::host::NodeHost;
use crate::node::NetworkNode;

/// Aggregate state owned by one `Network`.
pub trait NetworkCache: 'static {
    /// The host type of every node in networks of this cache class.
    type Host: NodeHost + 'static;

    /// The membership this cache was built from is about to change. Release
    /// anything visible outside the cache.
    fn separate(&mut self);

    /// Called once per global tick while the network is live.
    fn tick(&mut self) {}
}

/// Builds a fresh cache from the full member list of a newly formed network.
/// Member order is deterministic but carries no meaning.
pub type CacheFactory<C> = Box<dyn Fn(&[&NetworkNode<<C as NetworkCache>::Host>]) -> C>;
