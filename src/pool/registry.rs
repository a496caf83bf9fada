//! Pool Registry - the five role pools, created once at startup.

use tracing::{debug, info};

use super::instance_pool::InstancePool;
use crate::assets::{AssetSource, Blueprint};
use crate::config::UiConfig;
use crate::scene::{NodeId, Scene};
use crate::types::PoolRole;

/// One [`InstancePool`] per [`PoolRole`].
#[derive(Debug)]
pub struct PoolRegistry {
    pools: [InstancePool; 5],
}

impl PoolRegistry {
    /// Build and pre-warm every pool.
    ///
    /// For each role: create a "<Role> Pool" container under `parent`, set
    /// the configured capacity, bind the template from `assets` and populate
    /// to capacity. A role without a template keeps zero instances until
    /// [`bind_template`](Self::bind_template) supplies one.
    pub fn initialize(
        scene: &mut Scene,
        parent: NodeId,
        assets: &dyn AssetSource,
        config: &UiConfig,
    ) -> Self {
        let pools = PoolRole::ALL.map(|role| {
            let container = scene.create_node(role.container_name());
            if let Err(err) = scene.set_parent(container, Some(parent), false) {
                debug!(%role, %err, "pool container left at scene root");
            }

            let mut pool = InstancePool::new(role, container);
            pool.set_capacity(config.capacities.get(role));
            pool.set_policy(config.exhaustion);
            pool.set_template(scene, assets.template(role));
            let capacity = pool.capacity();
            pool.populate(scene, capacity);
            pool
        });

        let registry = Self { pools };
        info!(
            page = registry.page().spawnable_count(),
            category = registry.category().spawnable_count(),
            function = registry.function().spawnable_count(),
            value = registry.value().spawnable_count(),
            toggle = registry.toggle().spawnable_count(),
            "pools initialized"
        );
        registry
    }

    /// Late template arrival for `role`. Runs deferred population.
    pub fn bind_template(&mut self, scene: &mut Scene, role: PoolRole, blueprint: Blueprint) {
        self.get_mut(role).set_template(scene, Some(blueprint));
    }

    pub fn get(&self, role: PoolRole) -> &InstancePool {
        &self.pools[role.index()]
    }

    pub fn get_mut(&mut self, role: PoolRole) -> &mut InstancePool {
        &mut self.pools[role.index()]
    }

    pub fn page(&self) -> &InstancePool {
        self.get(PoolRole::Page)
    }

    pub fn category(&self) -> &InstancePool {
        self.get(PoolRole::Category)
    }

    pub fn function(&self) -> &InstancePool {
        self.get(PoolRole::Function)
    }

    pub fn value(&self) -> &InstancePool {
        self.get(PoolRole::Value)
    }

    pub fn toggle(&self) -> &InstancePool {
        self.get(PoolRole::Toggle)
    }

    pub fn iter(&self) -> impl Iterator<Item = &InstancePool> {
        self.pools.iter()
    }
}
