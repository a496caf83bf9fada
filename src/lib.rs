//! # spark-menu
//!
//! Pooled, event-driven UI synchronization for hierarchical menus.
//!
//! ## Architecture
//!
//! UI elements are never created on demand. Each element role (page,
//! category, function, value, toggle) has a pool of pre-warmed instances,
//! and the visible page is rebuilt from those pools whenever the menu tree
//! changes:
//!
//! ```text
//! MenuTree mutation → MenuEvents → TreeReconciler → Page::draw → PoolRegistry
//!                                                        │
//!                           tick() → SurfaceAnchor ──────┘ (pose lock)
//! ```
//!
//! Everything runs on one tick thread. Shared state is `Rc<RefCell<_>>`, and
//! event delivery is synchronous.
//!
//! ## Modules
//!
//! - [`types`] - Pose math and [`PoolRole`]
//! - [`scene`] - Attachment graph with generational node handles
//! - [`assets`] - Templates and the panel-view anchor
//! - [`menu`] - Categories, elements, events and subscriptions
//! - [`pool`] - [`InstancePool`] and [`PoolRegistry`]
//! - [`page`] - The main page and its drawn rows
//! - [`anchor`] - Per-tick surface anchoring
//! - [`reconciler`] - Menu tree → page reconciliation
//! - [`manager`] - [`UiManager`] orchestrator

pub mod anchor;
pub mod assets;
pub mod config;
pub mod error;
pub mod manager;
pub mod menu;
pub mod page;
pub mod pool;
pub mod reconciler;
pub mod scene;
pub mod types;

// Re-export commonly used items
pub use types::*;

pub use anchor::{AnchorSource, SurfaceAnchor, TrackedPose};

pub use assets::{AssetSource, Blueprint, StaticAssets};

pub use config::{ExhaustionPolicy, PoolCapacities, UiConfig};

pub use error::{Result, UiError};

pub use manager::{manager_alive, UiManager};

pub use menu::{
    Category, ElementKind, MenuElement, MenuEventKind, MenuEvents, MenuTree, Subscription,
};

pub use page::{DrawnRow, Page};

pub use pool::{InstancePool, PoolRegistry};

pub use reconciler::{ReconcilerState, ReconcilerSubscriptions, TreeReconciler};

pub use scene::{Node, NodeFlags, NodeId, Scene, SceneHandle};
