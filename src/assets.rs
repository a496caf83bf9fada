//! Asset source - templates and the panel-view anchor.
//!
//! Asset loading happens elsewhere; by the time the UI manager is created the
//! source must answer synchronously. Any answer may be missing, and the
//! pooling engine degrades instead of failing.

use std::cell::Cell;

use crate::scene::NodeId;
use crate::types::{Pose, PoolRole};

// =============================================================================
// Blueprint
// =============================================================================

/// Template a pool clones its instances from.
#[derive(Debug, Clone, PartialEq)]
pub struct Blueprint {
    name: String,
    local: Pose,
}

impl Blueprint {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            local: Pose::IDENTITY,
        }
    }

    /// Local pose every clone starts with.
    pub fn with_local_pose(mut self, pose: Pose) -> Self {
        self.local = pose;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn local_pose(&self) -> Pose {
        self.local
    }
}

// =============================================================================
// AssetSource
// =============================================================================

/// What the UI manager needs from asset loading.
pub trait AssetSource {
    /// Template for the given pool role, if it has been loaded.
    fn template(&self, role: PoolRole) -> Option<Blueprint>;

    /// The node the main page is attached under and locked to every tick.
    fn panel_view(&self) -> Option<NodeId>;

    /// One-time UI data initialization, run after the main page exists.
    fn init_ui(&self) {}
}

/// In-memory asset source.
///
/// ```ignore
/// let assets = StaticAssets::new()
///     .with_template(PoolRole::Page, Blueprint::new("Page"))
///     .with_panel_view(panel);
/// ```
#[derive(Debug, Default)]
pub struct StaticAssets {
    templates: [Option<Blueprint>; 5],
    panel_view: Option<NodeId>,
    init_calls: Cell<usize>,
}

impl StaticAssets {
    pub fn new() -> Self {
        Self::default()
    }

    /// A source with a blueprint named after every role.
    pub fn with_default_templates() -> Self {
        PoolRole::ALL
            .iter()
            .fold(Self::new(), |assets, &role| {
                assets.with_template(role, Blueprint::new(role.name()))
            })
    }

    pub fn with_template(mut self, role: PoolRole, blueprint: Blueprint) -> Self {
        self.templates[role.index()] = Some(blueprint);
        self
    }

    pub fn without_template(mut self, role: PoolRole) -> Self {
        self.templates[role.index()] = None;
        self
    }

    pub fn with_panel_view(mut self, node: NodeId) -> Self {
        self.panel_view = Some(node);
        self
    }

    /// How many times `init_ui` has run.
    pub fn init_calls(&self) -> usize {
        self.init_calls.get()
    }
}

impl AssetSource for StaticAssets {
    fn template(&self, role: PoolRole) -> Option<Blueprint> {
        self.templates[role.index()].clone()
    }

    fn panel_view(&self) -> Option<NodeId> {
        self.panel_view
    }

    fn init_ui(&self) {
        self.init_calls.set(self.init_calls.get() + 1);
    }
}
