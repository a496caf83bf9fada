//! Core types for spark-menu.
//!
//! Rigid poses for the attachment graph (on `glam` vectors and quaternions)
//! and the closed set of pool roles.
//! Everything else in the crate builds on these.

use std::fmt;

pub use glam::{Quat, Vec3};

// =============================================================================
// Pose
// =============================================================================

/// Rigid transform: position + orientation. No scale.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Pose {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Pose {
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
    };

    pub const fn new(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    pub const fn from_position(position: Vec3) -> Self {
        Self {
            position,
            rotation: Quat::IDENTITY,
        }
    }

    /// `self` is the parent frame, `child` is expressed in it.
    /// Returns `child` expressed in the frame `self` lives in.
    pub fn compose(self, child: Pose) -> Pose {
        Pose {
            position: self.position + self.rotation * child.position,
            rotation: (self.rotation * child.rotation).normalize(),
        }
    }

    pub fn inverse(self) -> Pose {
        let rotation = self.rotation.inverse();
        Pose {
            position: rotation * -self.position,
            rotation,
        }
    }

    /// Same placement within `epsilon`. `q` and `-q` are the same rotation.
    pub fn approx_eq(self, other: Pose, epsilon: f32) -> bool {
        self.position.abs_diff_eq(other.position, epsilon)
            && (self.rotation.dot(other.rotation).abs() - 1.0).abs() <= epsilon
    }
}

// =============================================================================
// PoolRole
// =============================================================================

/// The fixed set of pooled element kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PoolRole {
    Page,
    Category,
    Function,
    Value,
    Toggle,
}

impl PoolRole {
    /// All roles in registry order.
    pub const ALL: [PoolRole; 5] = [
        PoolRole::Page,
        PoolRole::Category,
        PoolRole::Function,
        PoolRole::Value,
        PoolRole::Toggle,
    ];

    /// Slot in registry-ordered arrays.
    pub const fn index(self) -> usize {
        match self {
            PoolRole::Page => 0,
            PoolRole::Category => 1,
            PoolRole::Function => 2,
            PoolRole::Value => 3,
            PoolRole::Toggle => 4,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            PoolRole::Page => "Page",
            PoolRole::Category => "Category",
            PoolRole::Function => "Function",
            PoolRole::Value => "Value",
            PoolRole::Toggle => "Toggle",
        }
    }

    /// Name of the container node that parents this role's idle instances.
    pub fn container_name(self) -> String {
        format!("{} Pool", self.name())
    }
}

impl fmt::Display for PoolRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
