//! Instance Pool - a bounded supply of pre-warmed UI element instances.
//!
//! Manages the lifecycle of one role's instances:
//! - `populate` clones inactive instances under the pool's container node
//! - `spawn` hands out the first available instance, re-parented and active
//! - `release` takes an instance back, inactive and under the container
//!
//! A handle is never handed out twice without a `release` in between, and
//! an exhausted pool fails (or grows, within a bound) instead of aliasing.

use std::collections::{HashSet, VecDeque};

use tracing::{debug, warn};

use crate::assets::Blueprint;
use crate::config::ExhaustionPolicy;
use crate::error::{Result, UiError};
use crate::scene::{NodeId, Scene};
use crate::types::PoolRole;

#[derive(Debug)]
pub struct InstancePool {
    role: PoolRole,
    capacity: usize,
    template: Option<Blueprint>,
    /// Parent of every idle instance.
    container: NodeId,
    /// Every instance this pool created, in creation order.
    instances: Vec<NodeId>,
    /// Idle instances, handed out front-first.
    available: VecDeque<NodeId>,
    /// Mirror of `available` for O(1) membership checks.
    idle: HashSet<NodeId>,
    /// Instances requested by `populate` while no template was bound.
    deferred: usize,
    policy: ExhaustionPolicy,
}

impl InstancePool {
    /// Create an empty pool whose idle instances live under `container`.
    pub fn new(role: PoolRole, container: NodeId) -> Self {
        Self {
            role,
            capacity: 0,
            template: None,
            container,
            instances: Vec::new(),
            available: VecDeque::new(),
            idle: HashSet::new(),
            deferred: 0,
            policy: ExhaustionPolicy::Fail,
        }
    }

    // =========================================================================
    // Configuration
    // =========================================================================

    /// Record the target pool size. Does not create anything.
    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity;
    }

    pub fn set_policy(&mut self, policy: ExhaustionPolicy) {
        self.policy = policy;
    }

    /// Bind the template instances are cloned from.
    ///
    /// `None` is tolerated (asset loading may not have finished): it logs and
    /// leaves the current template in place. Binding a template runs any
    /// population that was deferred while none was bound.
    pub fn set_template(&mut self, scene: &mut Scene, template: Option<Blueprint>) {
        let Some(template) = template else {
            warn!(role = %self.role, "template unavailable, pool stays unpopulated");
            return;
        };
        self.template = Some(template);

        let deferred = std::mem::take(&mut self.deferred);
        if deferred > 0 {
            debug!(role = %self.role, count = deferred, "running deferred populate");
            self.populate(scene, deferred);
        }
    }

    // =========================================================================
    // Population
    // =========================================================================

    /// Create `count` inactive instances and make them available.
    ///
    /// Additive: calling `populate(n)` twice leaves `2n` instances. Without a
    /// template nothing is created; the request is remembered and replayed by
    /// the next `set_template(Some(..))`. Returns how many were created.
    pub fn populate(&mut self, scene: &mut Scene, count: usize) -> usize {
        if self.template.is_none() {
            warn!(role = %self.role, count, "populate without template, deferring");
            self.deferred += count;
            return 0;
        }

        let mut created = 0;
        for _ in 0..count {
            if self.create_instance(scene).is_some() {
                created += 1;
            }
        }
        debug!(role = %self.role, created, total = self.instances.len(), "pool populated");
        created
    }

    fn create_instance(&mut self, scene: &mut Scene) -> Option<NodeId> {
        let template = self.template.as_ref()?;
        let node = scene.instantiate(template);
        if let Err(err) = scene
            .set_parent(node, Some(self.container), false)
            .and_then(|_| scene.set_active(node, false))
        {
            warn!(role = %self.role, %err, "could not park new instance");
            let _ = scene.destroy(node);
            return None;
        }
        self.instances.push(node);
        self.available.push_back(node);
        self.idle.insert(node);
        Some(node)
    }

    // =========================================================================
    // Spawn / Release
    // =========================================================================

    /// Hand out the next available instance, attached under `parent`.
    ///
    /// With `world_position_stays` the instance keeps its scene-space pose;
    /// otherwise its local pose is kept relative to the new parent.
    pub fn spawn(
        &mut self,
        scene: &mut Scene,
        parent: NodeId,
        world_position_stays: bool,
    ) -> Result<NodeId> {
        if !scene.contains(parent) {
            return Err(UiError::StaleNode(parent));
        }

        let node = loop {
            match self.available.pop_front() {
                Some(node) => {
                    self.idle.remove(&node);
                    // Destroyed behind our back: forget it and keep looking
                    if scene.contains(node) {
                        break node;
                    }
                    warn!(role = %self.role, node = %node, "dropping destroyed instance");
                    self.instances.retain(|&n| n != node);
                }
                None => break self.grow(scene)?,
            }
        };

        let attached = scene
            .set_parent(node, Some(parent), world_position_stays)
            .and_then(|()| scene.set_active(node, true));
        if let Err(err) = attached {
            // Failed attach: back to the front of the queue, still idle
            self.available.push_front(node);
            self.idle.insert(node);
            return Err(err);
        }
        debug!(role = %self.role, node = %node, remaining = self.available.len(), "spawned");
        Ok(node)
    }

    fn grow(&mut self, scene: &mut Scene) -> Result<NodeId> {
        let exhausted = UiError::PoolExhausted {
            role: self.role,
            capacity: self.capacity,
        };
        let ExhaustionPolicy::Grow { limit } = self.policy else {
            warn!(role = %self.role, capacity = self.capacity, "pool exhausted");
            return Err(exhausted);
        };
        if self.instances.len() >= limit {
            warn!(role = %self.role, limit, "pool exhausted at growth limit");
            return Err(exhausted);
        }

        let node = self.create_instance(scene).ok_or_else(|| exhausted.clone())?;
        // Fresh instance goes straight out, never through the idle queue
        self.available.retain(|&n| n != node);
        self.idle.remove(&node);
        debug!(role = %self.role, total = self.instances.len(), "pool grew by one");
        Ok(node)
    }

    /// Take a spawned instance back: deactivate it and park it under the
    /// container with its template pose.
    pub fn release(&mut self, scene: &mut Scene, node: NodeId) -> Result<()> {
        if !self.owns(node) {
            return Err(UiError::NotPooled {
                role: self.role,
                node,
            });
        }
        if self.idle.contains(&node) {
            return Err(UiError::AlreadyReleased {
                role: self.role,
                node,
            });
        }
        if !scene.contains(node) {
            self.instances.retain(|&n| n != node);
            return Err(UiError::StaleNode(node));
        }

        scene.set_active(node, false)?;
        scene.set_parent(node, Some(self.container), false)?;
        if let Some(template) = &self.template {
            scene.set_local_pose(node, template.local_pose())?;
        }
        scene.set_label(node, None)?;

        self.available.push_back(node);
        self.idle.insert(node);
        Ok(())
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn role(&self) -> PoolRole {
        self.role
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn template(&self) -> Option<&Blueprint> {
        self.template.as_ref()
    }

    pub fn container(&self) -> NodeId {
        self.container
    }

    /// Instances created so far (idle or spawned).
    pub fn instance_count(&self) -> usize {
        self.instances.len()
    }

    /// Instances `spawn` can hand out right now.
    pub fn spawnable_count(&self) -> usize {
        self.available.len()
    }

    /// Instances currently handed out.
    pub fn spawned_count(&self) -> usize {
        self.instances.len() - self.available.len()
    }

    pub fn deferred_count(&self) -> usize {
        self.deferred
    }

    /// Whether `node` was created by this pool.
    pub fn owns(&self, node: NodeId) -> bool {
        self.instances.contains(&node)
    }

    pub fn instances(&self) -> &[NodeId] {
        &self.instances
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Pose, Quat, Vec3};

    fn setup(role: PoolRole, capacity: usize) -> (Scene, InstancePool, NodeId) {
        let mut scene = Scene::new();
        let container = scene.create_node(role.container_name());
        let target = scene.create_node("target");
        let mut pool = InstancePool::new(role, container);
        pool.set_capacity(capacity);
        pool.set_template(&mut scene, Some(Blueprint::new(role.name())));
        (scene, pool, target)
    }

    #[test]
    fn test_populate_creates_inactive_instances() {
        let (mut scene, mut pool, _) = setup(PoolRole::Function, 6);
        assert_eq!(pool.populate(&mut scene, 6), 6);
        assert_eq!(pool.spawnable_count(), 6);
        assert_eq!(pool.instance_count(), 6);

        for &node in pool.instances() {
            assert!(!scene.is_active(node));
            assert_eq!(scene.parent(node), Some(pool.container()));
        }
    }

    #[test]
    fn test_populate_is_additive() {
        let (mut scene, mut pool, _) = setup(PoolRole::Value, 6);
        pool.populate(&mut scene, 6);
        pool.populate(&mut scene, 6);
        assert_eq!(pool.spawnable_count(), 12);
        assert_eq!(pool.capacity(), 6);
    }

    #[test]
    fn test_spawn_first_available() {
        let (mut scene, mut pool, target) = setup(PoolRole::Toggle, 3);
        pool.populate(&mut scene, 3);
        let first = pool.instances()[0];

        let node = pool.spawn(&mut scene, target, false).unwrap();
        assert_eq!(node, first);
        assert!(scene.is_active(node));
        assert_eq!(scene.parent(node), Some(target));
        assert_eq!(pool.spawnable_count(), 2);
        assert_eq!(pool.spawned_count(), 1);
    }

    #[test]
    fn test_spawn_before_populate_is_exhausted() {
        let (mut scene, mut pool, target) = setup(PoolRole::Category, 6);
        assert_eq!(
            pool.spawn(&mut scene, target, false),
            Err(UiError::PoolExhausted {
                role: PoolRole::Category,
                capacity: 6
            })
        );
    }

    #[test]
    fn test_exhaustion_never_aliases() {
        let (mut scene, mut pool, target) = setup(PoolRole::Category, 6);
        pool.populate(&mut scene, 6);

        let mut handed_out = HashSet::new();
        for _ in 0..6 {
            let node = pool.spawn(&mut scene, target, false).unwrap();
            assert!(handed_out.insert(node), "handle handed out twice");
        }
        let seventh = pool.spawn(&mut scene, target, false);
        assert_eq!(
            seventh,
            Err(UiError::PoolExhausted {
                role: PoolRole::Category,
                capacity: 6
            })
        );
        assert_eq!(scene.children(target).len(), 6);
    }

    #[test]
    fn test_release_and_reuse() {
        let (mut scene, mut pool, target) = setup(PoolRole::Function, 2);
        pool.populate(&mut scene, 2);

        let a = pool.spawn(&mut scene, target, false).unwrap();
        let b = pool.spawn(&mut scene, target, false).unwrap();
        assert!(pool.spawn(&mut scene, target, false).is_err());

        pool.release(&mut scene, a).unwrap();
        assert!(!scene.is_active(a));
        assert_eq!(scene.parent(a), Some(pool.container()));
        assert_eq!(pool.spawnable_count(), 1);

        let c = pool.spawn(&mut scene, target, false).unwrap();
        assert_eq!(c, a);
        assert_ne!(c, b);
    }

    #[test]
    fn test_double_release_rejected() {
        let (mut scene, mut pool, target) = setup(PoolRole::Function, 1);
        pool.populate(&mut scene, 1);
        let node = pool.spawn(&mut scene, target, false).unwrap();

        pool.release(&mut scene, node).unwrap();
        assert_eq!(
            pool.release(&mut scene, node),
            Err(UiError::AlreadyReleased {
                role: PoolRole::Function,
                node
            })
        );
        assert_eq!(pool.spawnable_count(), 1);
    }

    #[test]
    fn test_release_foreign_node_rejected() {
        let (mut scene, mut pool, target) = setup(PoolRole::Value, 1);
        pool.populate(&mut scene, 1);
        assert_eq!(
            pool.release(&mut scene, target),
            Err(UiError::NotPooled {
                role: PoolRole::Value,
                node: target
            })
        );
    }

    #[test]
    fn test_missing_template_defers_population() {
        let mut scene = Scene::new();
        let container = scene.create_node("Value Pool");
        let target = scene.create_node("target");
        let mut pool = InstancePool::new(PoolRole::Value, container);
        pool.set_capacity(6);

        pool.set_template(&mut scene, None);
        assert_eq!(pool.populate(&mut scene, 6), 0);
        assert_eq!(pool.spawnable_count(), 0);
        assert_eq!(pool.deferred_count(), 6);
        assert!(matches!(
            pool.spawn(&mut scene, target, false),
            Err(UiError::PoolExhausted { .. })
        ));

        pool.set_template(&mut scene, Some(Blueprint::new("Value")));
        assert_eq!(pool.deferred_count(), 0);
        assert_eq!(pool.spawnable_count(), 6);
    }

    #[test]
    fn test_grow_policy_is_bounded() {
        let (mut scene, mut pool, target) = setup(PoolRole::Category, 1);
        pool.set_policy(ExhaustionPolicy::Grow { limit: 2 });
        pool.populate(&mut scene, 1);

        let a = pool.spawn(&mut scene, target, false).unwrap();
        let b = pool.spawn(&mut scene, target, false).unwrap();
        assert_ne!(a, b);
        assert_eq!(pool.instance_count(), 2);
        assert_eq!(pool.spawnable_count(), 0);
        assert!(matches!(
            pool.spawn(&mut scene, target, false),
            Err(UiError::PoolExhausted { .. })
        ));
    }

    #[test]
    fn test_destroyed_instance_is_skipped() {
        let (mut scene, mut pool, target) = setup(PoolRole::Toggle, 2);
        pool.populate(&mut scene, 2);
        let first = pool.instances()[0];
        scene.destroy(first).unwrap();

        let node = pool.spawn(&mut scene, target, false).unwrap();
        assert_ne!(node, first);
        assert_eq!(pool.instance_count(), 1);
    }

    #[test]
    fn test_failed_attach_keeps_instance_in_pool() {
        let (mut scene, mut pool, target) = setup(PoolRole::Function, 2);
        pool.populate(&mut scene, 2);
        let first = pool.instances()[0];

        // Parenting the front instance under itself is a cycle
        assert_eq!(
            pool.spawn(&mut scene, first, false),
            Err(UiError::CyclicParent {
                node: first,
                parent: first
            })
        );
        assert_eq!(pool.spawnable_count(), 2);
        assert_eq!(scene.parent(first), Some(pool.container()));
        assert!(!scene.is_active(first));

        assert_eq!(pool.spawn(&mut scene, target, false), Ok(first));
    }

    #[test]
    fn test_spawn_keeping_world_pose() {
        let (mut scene, mut pool, target) = setup(PoolRole::Value, 1);
        scene
            .set_local_pose(pool.container(), Pose::from_position(Vec3::new(0.0, -5.0, 0.0)))
            .unwrap();
        scene
            .set_local_pose(
                target,
                Pose::new(Vec3::new(3.0, 0.0, 0.0), Quat::from_axis_angle(Vec3::Y, 0.5)),
            )
            .unwrap();
        pool.populate(&mut scene, 1);
        let before = scene.world_pose(pool.instances()[0]).unwrap();

        let node = pool.spawn(&mut scene, target, true).unwrap();
        assert_eq!(scene.parent(node), Some(target));
        assert!(scene.world_pose(node).unwrap().approx_eq(before, 1e-5));
        assert!(!scene.local_pose(node).unwrap().approx_eq(before, 1e-5));
    }
}
