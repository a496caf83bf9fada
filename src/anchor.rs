//! Surface anchor - rigidly locks the root UI surface to a moving pose.
//!
//! Polled once per tick rather than driven by events: the anchor (a tracked
//! head or controller) moves every frame. The pose is copied as-is, with no
//! smoothing, so the surface never lags behind.

use std::cell::Cell;
use std::rc::Rc;

use tracing::trace;

use crate::scene::{NodeId, Scene};
use crate::types::Pose;

// =============================================================================
// Anchor Sources
// =============================================================================

/// Something with a scene-space pose that may come and go.
pub trait AnchorSource {
    /// Current pose, or `None` while the anchor is unavailable.
    fn pose(&self, scene: &Scene) -> Option<Pose>;
}

/// A scene node as anchor. Unavailable once the node is destroyed.
impl AnchorSource for NodeId {
    fn pose(&self, scene: &Scene) -> Option<Pose> {
        scene.world_pose(*self)
    }
}

/// A pose pushed from outside the scene (e.g. a tracking system).
#[derive(Debug, Clone, Default)]
pub struct TrackedPose {
    pose: Rc<Cell<Option<Pose>>>,
}

impl TrackedPose {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, pose: Pose) {
        self.pose.set(Some(pose));
    }

    /// Mark tracking as lost.
    pub fn clear(&self) {
        self.pose.set(None);
    }
}

impl AnchorSource for TrackedPose {
    fn pose(&self, _scene: &Scene) -> Option<Pose> {
        self.pose.get()
    }
}

// =============================================================================
// SurfaceAnchor
// =============================================================================

/// Per-tick binding of a target node to an anchor.
pub struct SurfaceAnchor {
    source: Option<Box<dyn AnchorSource>>,
}

impl std::fmt::Debug for SurfaceAnchor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SurfaceAnchor")
            .field("bound", &self.source.is_some())
            .finish()
    }
}

impl SurfaceAnchor {
    pub fn new(source: impl AnchorSource + 'static) -> Self {
        Self {
            source: Some(Box::new(source)),
        }
    }

    /// A binding with nothing to follow. `sync` is always a no-op.
    pub fn unbound() -> Self {
        Self { source: None }
    }

    pub fn is_bound(&self) -> bool {
        self.source.is_some()
    }

    /// Replace what the surface follows.
    pub fn rebind(&mut self, source: impl AnchorSource + 'static) {
        self.source = Some(Box::new(source));
    }

    /// Copy the anchor's world pose onto `target`.
    ///
    /// Returns false (and changes nothing) when the anchor is unavailable or
    /// `target` no longer exists.
    pub fn sync(&self, scene: &mut Scene, target: NodeId) -> bool {
        let Some(pose) = self.source.as_ref().and_then(|s| s.pose(scene)) else {
            trace!("anchor unavailable, skipping sync");
            return false;
        };
        scene.set_world_pose(target, pose).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Quat, Vec3};

    const EPS: f32 = 1e-5;

    #[test]
    fn test_sync_copies_node_pose() {
        let mut scene = Scene::new();
        let rig = scene.create_node("rig");
        scene
            .set_local_pose(rig, Pose::from_position(Vec3::new(0.0, 1.0, 0.0)))
            .unwrap();
        let anchor = scene.create_node("panel view");
        scene.set_parent(anchor, Some(rig), false).unwrap();
        let target = scene.create_node("page");

        let pose = Pose::new(Vec3::new(1.0, 0.5, -2.0), Quat::from_axis_angle(Vec3::Y, 0.3));
        scene.set_local_pose(anchor, pose).unwrap();

        let binding = SurfaceAnchor::new(anchor);
        assert!(binding.sync(&mut scene, target));
        let expected = scene.world_pose(anchor).unwrap();
        assert!(scene.world_pose(target).unwrap().approx_eq(expected, EPS));
    }

    #[test]
    fn test_sync_follows_every_tick() {
        let mut scene = Scene::new();
        let target = scene.create_node("page");
        let tracked = TrackedPose::new();
        let binding = SurfaceAnchor::new(tracked.clone());

        for i in 0..3 {
            let pose = Pose::from_position(Vec3::new(i as f32, 0.0, 0.0));
            tracked.set(pose);
            assert!(binding.sync(&mut scene, target));
            assert_eq!(scene.world_pose(target), Some(pose));
        }
    }

    #[test]
    fn test_lost_anchor_is_noop() {
        let mut scene = Scene::new();
        let anchor = scene.create_node("panel view");
        let target = scene.create_node("page");
        let before = Pose::from_position(Vec3::new(4.0, 4.0, 4.0));
        scene.set_local_pose(target, before).unwrap();

        scene.destroy(anchor).unwrap();
        assert!(!SurfaceAnchor::new(anchor).sync(&mut scene, target));
        assert!(!SurfaceAnchor::unbound().sync(&mut scene, target));

        let tracked = TrackedPose::new();
        tracked.clear();
        assert!(!SurfaceAnchor::new(tracked).sync(&mut scene, target));
        assert_eq!(scene.world_pose(target), Some(before));
    }

    #[test]
    fn test_missing_target_is_noop() {
        let mut scene = Scene::new();
        let anchor = scene.create_node("panel view");
        let target = scene.create_node("page");
        scene.destroy(target).unwrap();
        assert!(!SurfaceAnchor::new(anchor).sync(&mut scene, target));
    }
}
