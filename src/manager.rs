//! UI Manager - ties the menu tree to the pooled UI.
//!
//! # Lifecycle
//!
//! ```ignore
//! use spark_menu::{MenuTree, Scene, StaticAssets, UiConfig, UiManager};
//!
//! let scene = Scene::shared();
//! let panel = scene.borrow_mut().create_node("Panel View");
//! let assets = StaticAssets::with_default_templates().with_panel_view(panel);
//! let tree = MenuTree::new("BoneMenu");
//!
//! // Build pools, spawn the main page under the panel view
//! let events = tree.events().clone();
//! let mut manager = UiManager::new(scene.clone(), &assets, events, UiConfig::default())?;
//!
//! // Start listening to the menu tree
//! manager.enable()?;
//! tree.select_root();
//!
//! // Every frame
//! manager.tick();
//!
//! // Stop listening (also happens on drop)
//! manager.disable();
//! ```
//!
//! Only one manager may be alive per thread. Creating a second one fails with
//! `UiError::AlreadyInitialized`; dropping the first frees the slot.

use std::cell::{Cell, Ref};

use tracing::{debug, info, warn};

use crate::anchor::{AnchorSource, SurfaceAnchor};
use crate::assets::{AssetSource, Blueprint};
use crate::config::UiConfig;
use crate::error::{Result, UiError};
use crate::menu::MenuEvents;
use crate::page::Page;
use crate::pool::{InstancePool, PoolRegistry};
use crate::reconciler::{ReconcilerState, ReconcilerSubscriptions, TreeReconciler};
use crate::scene::{NodeId, SceneHandle};
use crate::types::PoolRole;

// =============================================================================
// Manager Slot
// =============================================================================

thread_local! {
    /// Whether a UiManager is alive on this thread.
    static MANAGER_ALIVE: Cell<bool> = const { Cell::new(false) };
}

/// Whether a [`UiManager`] is currently alive on this thread.
pub fn manager_alive() -> bool {
    MANAGER_ALIVE.with(|alive| alive.get())
}

/// Claims the per-thread slot; frees it on drop.
#[derive(Debug)]
struct ManagerSlot;

impl ManagerSlot {
    fn claim() -> Result<Self> {
        MANAGER_ALIVE.with(|alive| {
            if alive.replace(true) {
                Err(UiError::AlreadyInitialized)
            } else {
                Ok(ManagerSlot)
            }
        })
    }
}

impl Drop for ManagerSlot {
    fn drop(&mut self) {
        MANAGER_ALIVE.with(|alive| alive.set(false));
    }
}

// =============================================================================
// UiManager
// =============================================================================

/// Owns the pools, the main page and the anchor binding.
#[derive(Debug)]
pub struct UiManager {
    scene: SceneHandle,
    root: NodeId,
    page_node: NodeId,
    events: MenuEvents,
    reconciler: TreeReconciler,
    anchor: SurfaceAnchor,
    subscriptions: Option<ReconcilerSubscriptions>,
    _slot: ManagerSlot,
}

impl UiManager {
    /// Build the UI.
    ///
    /// 1. Create the root surface node "UI Manager"
    /// 2. Initialize the five pools under it
    /// 3. Spawn the main page from the page pool under the panel view
    ///    (or the root surface if the asset source has none)
    /// 4. Run the asset source's one-time `init_ui`
    ///
    /// The manager starts disabled; call [`enable`](Self::enable).
    pub fn new(
        scene: SceneHandle,
        assets: &dyn AssetSource,
        events: MenuEvents,
        config: UiConfig,
    ) -> Result<Self> {
        let slot = ManagerSlot::claim()?;

        let (root, page_node, reconciler, anchor) = {
            let mut s = scene.try_borrow_mut().map_err(|_| UiError::Busy)?;
            let root = s.create_node("UI Manager");
            let mut pools = PoolRegistry::initialize(&mut s, root, assets, &config);

            let panel_view = assets.panel_view().filter(|&panel| s.contains(panel));
            let page_parent = match panel_view {
                Some(panel) => panel,
                None => {
                    warn!("panel view unavailable, main page attached to the UI root");
                    root
                }
            };

            let page_node = match pools.get_mut(PoolRole::Page).spawn(&mut s, page_parent, false) {
                Ok(node) => node,
                Err(err) => {
                    // Leave no half-built surface behind
                    let _ = s.destroy(root);
                    return Err(err);
                }
            };
            let mut page = Page::new(page_node, config.row_spacing);
            page.hide(&mut s);

            let anchor = match panel_view {
                Some(panel) => SurfaceAnchor::new(panel),
                None => SurfaceAnchor::unbound(),
            };
            let reconciler = TreeReconciler::new(scene.clone(), pools, page);
            (root, page_node, reconciler, anchor)
        };

        assets.init_ui();
        info!(root = %root, "UI manager created");

        Ok(Self {
            scene,
            root,
            page_node,
            events,
            reconciler,
            anchor,
            subscriptions: None,
            _slot: slot,
        })
    }

    // =========================================================================
    // Activation
    // =========================================================================

    /// Wire the reconciler to the menu events.
    ///
    /// Fails with `AlreadyActive` (and subscribes nothing) if already enabled.
    pub fn enable(&mut self) -> Result<()> {
        if self.subscriptions.is_some() {
            warn!("enable called twice without disable");
            return Err(UiError::AlreadyActive);
        }
        self.subscriptions = Some(self.reconciler.attach(&self.events));
        debug!("UI manager enabled");
        Ok(())
    }

    /// Unwire the reconciler. No-op when already disabled.
    pub fn disable(&mut self) {
        if let Some(subscriptions) = self.subscriptions.take() {
            subscriptions.detach();
            debug!("UI manager disabled");
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.subscriptions.is_some()
    }

    // =========================================================================
    // Tick
    // =========================================================================

    /// Per-frame work: lock the main page to the anchor.
    ///
    /// Returns whether the page was moved. Never panics: an unavailable
    /// anchor or a busy scene skips the frame.
    pub fn tick(&self) -> bool {
        let Ok(mut scene) = self.scene.try_borrow_mut() else {
            warn!("scene busy during tick, skipping anchor sync");
            return false;
        };
        self.anchor.sync(&mut scene, self.page_node)
    }

    /// Supply a template the asset source did not have at startup.
    pub fn bind_template(&self, role: PoolRole, blueprint: Blueprint) -> Result<()> {
        self.reconciler.bind_template(role, blueprint)
    }

    /// Follow a different anchor from the next tick on.
    pub fn set_anchor(&mut self, source: impl AnchorSource + 'static) {
        self.anchor.rebind(source);
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// The root surface node all pools live under.
    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn scene(&self) -> &SceneHandle {
        &self.scene
    }

    pub fn reconciler(&self) -> &TreeReconciler {
        &self.reconciler
    }

    pub fn state(&self) -> ReconcilerState {
        self.reconciler.state()
    }

    pub fn main_page(&self) -> Ref<'_, Page> {
        self.reconciler.page()
    }

    pub fn pools(&self) -> Ref<'_, PoolRegistry> {
        self.reconciler.pools()
    }

    pub fn pool(&self, role: PoolRole) -> Ref<'_, InstancePool> {
        Ref::map(self.reconciler.pools(), |pools| pools.get(role))
    }

    pub fn page_pool(&self) -> Ref<'_, InstancePool> {
        self.pool(PoolRole::Page)
    }

    pub fn category_pool(&self) -> Ref<'_, InstancePool> {
        self.pool(PoolRole::Category)
    }

    pub fn function_pool(&self) -> Ref<'_, InstancePool> {
        self.pool(PoolRole::Function)
    }

    pub fn value_pool(&self) -> Ref<'_, InstancePool> {
        self.pool(PoolRole::Value)
    }

    pub fn toggle_pool(&self) -> Ref<'_, InstancePool> {
        self.pool(PoolRole::Toggle)
    }
}

impl Drop for UiManager {
    /// Unsubscribe, then remove the main page and the pooled surface.
    fn drop(&mut self) {
        self.disable();

        let Ok(mut scene) = self.scene.try_borrow_mut() else {
            warn!(root = %self.root, "scene busy on drop, UI nodes left in place");
            return;
        };
        // The page may sit under the panel view, outside the root
        for node in [self.page_node, self.root] {
            if !scene.contains(node) {
                continue;
            }
            if let Err(err) = scene.destroy(node) {
                warn!(node = %node, %err, "could not remove UI node");
            }
        }
        info!(root = %self.root, "UI manager torn down");
    }
}
