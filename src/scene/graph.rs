//! Scene Graph - Node allocation and the parent/child attachment graph.
//!
//! Manages the lifecycle of scene nodes:
//! - Slot allocation with a free list for O(1) reuse
//! - Generation counters so stale handles never alias a reused slot
//! - Parenting with optional world-pose preservation
//! - Active flags (a node is visible only if it and all ancestors are active)

use std::cell::RefCell;
use std::rc::Rc;

use tracing::trace;

use super::node::{Node, NodeFlags, NodeId};
use crate::assets::Blueprint;
use crate::error::{Result, UiError};
use crate::types::{Pose, Vec3};

/// Shared handle to the scene, used by everything that runs on the tick thread.
pub type SceneHandle = Rc<RefCell<Scene>>;

// =============================================================================
// Scene State
// =============================================================================

#[derive(Debug, Default)]
struct Slot {
    generation: u32,
    node: Option<Node>,
}

/// The attachment graph that pooled instances live in.
#[derive(Debug, Default)]
pub struct Scene {
    slots: Vec<Slot>,
    /// Freed slot indices for reuse.
    free: Vec<u32>,
    live: usize,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a scene wrapped for sharing.
    pub fn shared() -> SceneHandle {
        Rc::new(RefCell::new(Self::new()))
    }

    // =========================================================================
    // Allocation
    // =========================================================================

    fn allocate(&mut self, node: Node) -> NodeId {
        self.live += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.node = Some(node);
            return NodeId {
                index,
                generation: slot.generation,
            };
        }

        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            node: Some(node),
        });
        NodeId {
            index,
            generation: 0,
        }
    }

    /// Create an empty, active, unparented node.
    pub fn create_node(&mut self, name: impl Into<String>) -> NodeId {
        self.allocate(Node::new(name, Pose::IDENTITY, NodeFlags::ACTIVE))
    }

    /// Clone a node from a blueprint. The clone is active and unparented.
    pub fn instantiate(&mut self, blueprint: &Blueprint) -> NodeId {
        let id = self.allocate(Node::new(
            blueprint.name(),
            blueprint.local_pose(),
            NodeFlags::ACTIVE | NodeFlags::INSTANCE,
        ));
        trace!(node = %id, blueprint = blueprint.name(), "instantiated");
        id
    }

    /// Destroy a node and all of its descendants.
    pub fn destroy(&mut self, id: NodeId) -> Result<()> {
        let parent = self.node(id).ok_or(UiError::StaleNode(id))?.parent;
        if let Some(parent) = parent {
            if let Some(parent) = self.node_mut(parent) {
                parent.children.retain(|&c| c != id);
            }
        }

        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let slot = &mut self.slots[current.index as usize];
            if let Some(node) = slot.node.take() {
                stack.extend(node.children);
                slot.generation = slot.generation.wrapping_add(1);
                self.free.push(current.index);
                self.live -= 1;
            }
        }
        Ok(())
    }

    // =========================================================================
    // Lookups
    // =========================================================================

    /// Resolve a handle. `None` if the node was destroyed.
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_ref())
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_mut())
    }

    fn require_mut(&mut self, id: NodeId) -> Result<&mut Node> {
        self.node_mut(id).ok_or(UiError::StaleNode(id))
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.node(id).is_some()
    }

    /// Number of live nodes.
    pub fn node_count(&self) -> usize {
        self.live
    }

    pub fn name(&self, id: NodeId) -> Option<&str> {
        self.node(id).map(Node::name)
    }

    pub fn label(&self, id: NodeId) -> Option<&str> {
        self.node(id).and_then(Node::label)
    }

    /// Attach display text (the bound element's name) to a node.
    pub fn set_label(&mut self, id: NodeId, label: Option<String>) -> Result<()> {
        self.require_mut(id)?.label = label;
        Ok(())
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(Node::parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map(Node::children).unwrap_or(&[])
    }

    /// Whether `ancestor` is `id` or one of its ancestors.
    pub fn is_descendant_of(&self, id: NodeId, ancestor: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node) = current {
            if node == ancestor {
                return true;
            }
            current = self.parent(node);
        }
        false
    }

    // =========================================================================
    // Active State
    // =========================================================================

    pub fn set_active(&mut self, id: NodeId, active: bool) -> Result<()> {
        self.require_mut(id)?.flags.set(NodeFlags::ACTIVE, active);
        Ok(())
    }

    /// The node's own flag. A stale handle is inactive.
    pub fn is_active(&self, id: NodeId) -> bool {
        self.node(id).is_some_and(Node::is_active)
    }

    /// Active and every ancestor active.
    pub fn is_active_in_hierarchy(&self, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node_id) = current {
            match self.node(node_id) {
                Some(node) if node.is_active() => current = node.parent,
                _ => return false,
            }
        }
        true
    }

    // =========================================================================
    // Poses
    // =========================================================================

    pub fn local_pose(&self, id: NodeId) -> Option<Pose> {
        self.node(id).map(Node::local_pose)
    }

    pub fn set_local_pose(&mut self, id: NodeId, pose: Pose) -> Result<()> {
        self.require_mut(id)?.local = pose;
        Ok(())
    }

    pub fn set_local_position(&mut self, id: NodeId, position: Vec3) -> Result<()> {
        self.require_mut(id)?.local.position = position;
        Ok(())
    }

    /// Pose in scene space, composed through all ancestors.
    pub fn world_pose(&self, id: NodeId) -> Option<Pose> {
        let mut pose = self.node(id)?.local;
        let mut current = self.parent(id);
        while let Some(parent_id) = current {
            let parent = self.node(parent_id)?;
            pose = parent.local.compose(pose);
            current = parent.parent;
        }
        Some(pose)
    }

    /// Place a node in scene space by solving for its local pose.
    pub fn set_world_pose(&mut self, id: NodeId, pose: Pose) -> Result<()> {
        let parent_world = match self.node(id).ok_or(UiError::StaleNode(id))?.parent {
            Some(parent) => self.world_pose(parent).unwrap_or(Pose::IDENTITY),
            None => Pose::IDENTITY,
        };
        self.require_mut(id)?.local = parent_world.inverse().compose(pose);
        Ok(())
    }

    // =========================================================================
    // Parenting
    // =========================================================================

    /// Re-parent `id` under `parent` (`None` = scene root).
    ///
    /// With `world_position_stays` the node keeps its scene-space pose and its
    /// local pose is recomputed; otherwise the local pose is kept as-is.
    pub fn set_parent(
        &mut self,
        id: NodeId,
        parent: Option<NodeId>,
        world_position_stays: bool,
    ) -> Result<()> {
        let old_parent = self.node(id).ok_or(UiError::StaleNode(id))?.parent;
        if let Some(new_parent) = parent {
            if !self.contains(new_parent) {
                return Err(UiError::StaleNode(new_parent));
            }
            if self.is_descendant_of(new_parent, id) {
                return Err(UiError::CyclicParent {
                    node: id,
                    parent: new_parent,
                });
            }
        }

        let world = if world_position_stays {
            self.world_pose(id)
        } else {
            None
        };

        if let Some(old) = old_parent {
            if let Some(old) = self.node_mut(old) {
                old.children.retain(|&c| c != id);
            }
        }
        if let Some(new_parent) = parent {
            self.require_mut(new_parent)?.children.push(id);
        }
        self.require_mut(id)?.parent = parent;

        if let Some(world) = world {
            self.set_world_pose(id, world)?;
        }
        Ok(())
    }
}
