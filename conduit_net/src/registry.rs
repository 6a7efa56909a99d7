// The set of network managers, one per cache class.
//
// `NetworkRegistry` is an explicit context value owned by whatever drives
// the simulation. Cache classes are registered once at startup with their
// factory; each registration creates a `NetworkManager` keyed by the cache
// type's `TypeId`. Lookups downcast back to the concrete manager.
//
// Lifecycle hooks the game loop calls:
// - `on_global_tick()`: once per simulation tick. Each manager flushes, then
//   ticks its live caches, in registration order.
// - `on_simulation_stop()`: once at world teardown. Every manager forgets
//   its nodes and networks; registrations stay so the next world can reuse
//   them.
//
// **Critical constraint: single writer.** Registration and every hook take
// `&mut self`; the registry is never shared across threads.

use crate::cache::NetworkCache;
use crate::config::NetworkConfig;
use crate::error::{NetworkError, Result};
use crate::manager::NetworkManager;
use crate::node::NetworkNode;
use std::any::{Any, TypeId, type_name};
use tracing::{debug, info};

/// Object-safe view of a `NetworkManager<C>` for any `C`.
trait ErasedManager {
    fn tick(&mut self);
    fn clear(&mut self);
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<C: NetworkCache> ErasedManager for NetworkManager<C> {
    fn tick(&mut self) {
        NetworkManager::tick(self);
    }

    fn clear(&mut self) {
        NetworkManager::clear(self);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

struct Registration {
    cache_class: TypeId,
    name: &'static str,
    manager: Box<dyn ErasedManager>,
}

/// Owns one `NetworkManager` per registered cache class.
#[derive(Default)]
pub struct NetworkRegistry {
    config: NetworkConfig,
    registrations: Vec<Registration>,
}

impl NetworkRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry whose managers are all created with `config`.
    pub fn with_config(config: NetworkConfig) -> Self {
        Self {
            config,
            registrations: Vec::new(),
        }
    }

    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }

    /// Create the manager for cache class `C`. Fails if `C` already has one.
    pub fn register_cache_class<C: NetworkCache>(
        &mut self,
        factory: impl Fn(&[&NetworkNode<C::Host>]) -> C + 'static,
    ) -> Result<()> {
        let name = type_name::<C>();
        if self.is_registered::<C>() {
            return Err(NetworkError::DuplicateRegistration { cache_class: name });
        }
        self.registrations.push(Registration {
            cache_class: TypeId::of::<C>(),
            name,
            manager: Box::new(NetworkManager::new(factory, self.config.clone())),
        });
        info!(cache_class = name, "registered network cache class");
        Ok(())
    }

    pub fn is_registered<C: NetworkCache>(&self) -> bool {
        self.position::<C>().is_some()
    }

    /// The manager for cache class `C`.
    pub fn get<C: NetworkCache>(&self) -> Result<&NetworkManager<C>> {
        self.position::<C>()
            .and_then(|i| {
                self.registrations[i]
                    .manager
                    .as_any()
                    .downcast_ref::<NetworkManager<C>>()
            })
            .ok_or(NetworkError::UnregisteredCacheClass {
                cache_class: type_name::<C>(),
            })
    }

    /// Mutable access to the manager for cache class `C`.
    pub fn get_mut<C: NetworkCache>(&mut self) -> Result<&mut NetworkManager<C>> {
        let Some(i) = self.position::<C>() else {
            return Err(NetworkError::UnregisteredCacheClass {
                cache_class: type_name::<C>(),
            });
        };
        self.registrations[i]
            .manager
            .as_any_mut()
            .downcast_mut::<NetworkManager<C>>()
            .ok_or(NetworkError::UnregisteredCacheClass {
                cache_class: type_name::<C>(),
            })
    }

    /// Names of registered cache classes, in registration order.
    pub fn cache_classes(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.registrations.iter().map(|r| r.name)
    }

    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }

    /// Flush every manager, then tick every live cache.
    pub fn on_global_tick(&mut self) {
        for registration in &mut self.registrations {
            registration.manager.tick();
        }
    }

    /// Reset every manager for a world that no longer exists.
    pub fn on_simulation_stop(&mut self) {
        for registration in &mut self.registrations {
            debug!(cache_class = registration.name, "resetting network manager");
            registration.manager.clear();
        }
    }

    fn position<C: NetworkCache>(&self) -> Option<usize> {
        let id = TypeId::of::<C>();
        self.registrations.iter().position(|r| r.cache_class == id)
    }
}
