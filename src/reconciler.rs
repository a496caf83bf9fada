//! Tree Reconciler - rebuilds the main page whenever the menu tree changes.
//!
//! # States
//!
//! ```text
//!            CategorySelected(c)          CategorySelected(c')
//!   Empty ───────────────────────▶ Assigned(c) ───────────────▶ Assigned(c')
//!                                     │   ▲
//!                  ElementCreated(c,_) │   │ redraw
//!                  ElementRemoved(c,_) └───┘
//! ```
//!
//! `CategorySelected(None)` is ignored in every state. Element events do a
//! full redraw of the category they name; with at most a handful of rows per
//! pool, diffing is not worth it.
//!
//! # Wiring
//!
//! [`TreeReconciler::attach`] subscribes all three handlers and returns one
//! guard. Dropping the guard removes exactly those handlers, so an
//! attach/detach cycle can never leave a duplicate behind.

use std::cell::{Ref, RefCell};
use std::rc::Rc;

use spark_signals::batch;
use tracing::{debug, error};

use crate::assets::Blueprint;
use crate::error::{Result, UiError};
use crate::menu::{Category, MenuElement, MenuEvents, Subscription};
use crate::page::Page;
use crate::pool::PoolRegistry;
use crate::scene::SceneHandle;
use crate::types::PoolRole;

/// What the main page is showing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcilerState {
    Empty,
    Assigned(Category),
}

#[derive(Debug)]
struct Surface {
    pools: PoolRegistry,
    page: Page,
    last_error: Option<UiError>,
}

/// Reconciles the main page against the menu tree.
///
/// Cloning shares the same page and pools.
#[derive(Debug, Clone)]
pub struct TreeReconciler {
    scene: SceneHandle,
    surface: Rc<RefCell<Surface>>,
}

impl TreeReconciler {
    pub fn new(scene: SceneHandle, pools: PoolRegistry, page: Page) -> Self {
        Self {
            scene,
            surface: Rc::new(RefCell::new(Surface {
                pools,
                page,
                last_error: None,
            })),
        }
    }

    pub fn state(&self) -> ReconcilerState {
        match self.surface.borrow().page.assigned() {
            Some(category) => ReconcilerState::Assigned(category),
            None => ReconcilerState::Empty,
        }
    }

    pub fn page(&self) -> Ref<'_, Page> {
        Ref::map(self.surface.borrow(), |s| &s.page)
    }

    pub fn pools(&self) -> Ref<'_, PoolRegistry> {
        Ref::map(self.surface.borrow(), |s| &s.pools)
    }

    /// Error from the most recent event-driven redraw, if it failed.
    pub fn last_error(&self) -> Option<UiError> {
        self.surface.borrow().last_error.clone()
    }

    // =========================================================================
    // Transitions
    // =========================================================================

    /// Assign `category`, redraw and show the page. `None` is a no-op.
    ///
    /// Page signal writes are batched: effects tracking `assigned` or
    /// `visible` run once the scene and surface borrows are released, so
    /// they may read the reconciler freely.
    pub fn on_category_selected(&self, category: Option<&Category>) -> Result<()> {
        let Some(category) = category else {
            debug!("ignoring CategorySelected without a category");
            return Ok(());
        };

        let rows = batch(|| self.redraw(category))?;
        debug!(category = category.name(), rows, "page reconciled");
        Ok(())
    }

    fn redraw(&self, category: &Category) -> Result<usize> {
        let mut scene = self.scene.try_borrow_mut().map_err(|_| UiError::Busy)?;
        let mut surface = self.surface.try_borrow_mut().map_err(|_| UiError::Busy)?;
        let Surface { pools, page, .. } = &mut *surface;

        page.assign(category);
        let drawn = page.draw(&mut scene, pools);
        page.show(&mut scene);
        drawn
    }

    /// A child was added to `category`: full redraw.
    pub fn on_element_created(&self, category: &Category, _element: &MenuElement) -> Result<()> {
        self.on_category_selected(Some(category))
    }

    /// A child was removed from `category`: full redraw.
    pub fn on_element_removed(&self, category: &Category, _element: &MenuElement) -> Result<()> {
        self.on_category_selected(Some(category))
    }

    /// Bind a template that arrived after startup. Runs deferred population.
    pub fn bind_template(&self, role: PoolRole, blueprint: Blueprint) -> Result<()> {
        let mut scene = self.scene.try_borrow_mut().map_err(|_| UiError::Busy)?;
        let mut surface = self.surface.try_borrow_mut().map_err(|_| UiError::Busy)?;
        surface.pools.bind_template(&mut scene, role, blueprint);
        Ok(())
    }

    /// Log and remember the outcome of an event-driven call. Errors stop here.
    fn record(&self, result: Result<()>) {
        if let Err(err) = &result {
            error!(%err, "menu redraw failed");
        }
        match self.surface.try_borrow_mut() {
            Ok(mut surface) => surface.last_error = result.err(),
            Err(_) => error!("could not record redraw outcome, UI state busy"),
        }
    }

    // =========================================================================
    // Wiring
    // =========================================================================

    /// Subscribe the three handlers to `events`.
    pub fn attach(&self, events: &MenuEvents) -> ReconcilerSubscriptions {
        let selected = {
            let this = self.clone();
            events.on_category_selected(move |category| {
                this.record(this.on_category_selected(category));
            })
        };
        let created = {
            let this = self.clone();
            events.on_element_created(move |category, element| {
                this.record(this.on_element_created(category, element));
            })
        };
        let removed = {
            let this = self.clone();
            events.on_element_removed(move |category, element| {
                this.record(this.on_element_removed(category, element));
            })
        };
        debug!("reconciler attached");

        ReconcilerSubscriptions {
            subscriptions: [selected, created, removed],
        }
    }
}

/// The reconciler's three event subscriptions. Dropping detaches them.
#[derive(Debug)]
#[must_use = "dropping the subscriptions detaches the reconciler immediately"]
pub struct ReconcilerSubscriptions {
    subscriptions: [Subscription; 3],
}

impl ReconcilerSubscriptions {
    pub fn subscriptions(&self) -> &[Subscription] {
        &self.subscriptions
    }

    /// Unsubscribe all three handlers now. Same as dropping.
    pub fn detach(self) {
        debug!("reconciler detached");
    }
}

#[cfg(test)]
mod tests {
    use spark_signals::effect_sync;

    use super::*;
    use crate::assets::StaticAssets;
    use crate::config::UiConfig;
    use crate::menu::{MenuEventKind, MenuTree};
    use crate::scene::Scene;

    fn setup() -> TreeReconciler {
        let scene = Scene::shared();
        let (pools, page) = {
            let mut s = scene.borrow_mut();
            let root = s.create_node("UI Manager");
            let assets = StaticAssets::with_default_templates();
            let mut pools = PoolRegistry::initialize(&mut s, root, &assets, &UiConfig::default());
            let node = pools.get_mut(PoolRole::Page).spawn(&mut s, root, false).unwrap();
            (pools, Page::new(node, 0.1))
        };
        TreeReconciler::new(scene, pools, page)
    }

    /// Everything observable about the page after a transition.
    fn snapshot(reconciler: &TreeReconciler) -> (ReconcilerState, bool, Vec<(PoolRole, String)>) {
        let page = reconciler.page();
        let rows = page
            .rows()
            .iter()
            .map(|r| (r.role, r.element.name().to_string()))
            .collect();
        (reconciler.state(), page.is_visible(), rows)
    }

    #[test]
    fn test_starts_empty() {
        let reconciler = setup();
        assert_eq!(reconciler.state(), ReconcilerState::Empty);
        assert!(!reconciler.page().is_visible());
    }

    #[test]
    fn test_select_assigns_and_shows() {
        let reconciler = setup();
        let tree = MenuTree::new("Root");
        tree.root().create_function("Heal", || {});

        reconciler.on_category_selected(Some(tree.root())).unwrap();
        assert_eq!(reconciler.state(), ReconcilerState::Assigned(tree.root().clone()));
        assert!(reconciler.page().is_visible());
        assert_eq!(reconciler.page().rows().len(), 1);
    }

    #[test]
    fn test_every_selection_wins() {
        let reconciler = setup();
        let tree = MenuTree::new("Root");
        let a = tree.root().create_category("A");
        let b = tree.root().create_category("B");

        for category in [&a, &b, tree.root(), &a] {
            reconciler.on_category_selected(Some(category)).unwrap();
            assert_eq!(reconciler.state(), ReconcilerState::Assigned(category.clone()));
            assert!(reconciler.page().is_visible());
        }
    }

    #[test]
    fn test_null_selection_is_noop() {
        let reconciler = setup();
        let tree = MenuTree::new("Root");

        reconciler.on_category_selected(None).unwrap();
        assert_eq!(reconciler.state(), ReconcilerState::Empty);

        reconciler.on_category_selected(Some(tree.root())).unwrap();
        let draws = reconciler.page().draw_count();
        reconciler.on_category_selected(None).unwrap();
        assert_eq!(reconciler.state(), ReconcilerState::Assigned(tree.root().clone()));
        assert_eq!(reconciler.page().draw_count(), draws);
    }

    #[test]
    fn test_element_events_equal_selection() {
        let tree = MenuTree::new("Root");
        let root = tree.root();
        root.create_toggle("Noclip", false);
        let speed = root.create_value("Speed", 1.0);

        let via_created = setup();
        via_created.on_element_created(root, &speed).unwrap();
        let via_removed = setup();
        via_removed.on_element_removed(root, &speed).unwrap();
        let via_selected = setup();
        via_selected.on_category_selected(Some(root)).unwrap();

        assert_eq!(snapshot(&via_created), snapshot(&via_selected));
        assert_eq!(snapshot(&via_removed), snapshot(&via_selected));
    }

    #[test]
    fn test_attached_redraws_on_mutation() {
        let reconciler = setup();
        let tree = MenuTree::new("Root");
        let _subs = reconciler.attach(tree.events());

        tree.select_root();
        assert_eq!(reconciler.page().rows().len(), 0);

        let element = tree.root().create_function("Heal", || {});
        assert_eq!(reconciler.page().rows().len(), 1);

        tree.root().remove(&element);
        assert_eq!(reconciler.page().rows().len(), 0);
        assert_eq!(reconciler.pools().function().spawned_count(), 0);
    }

    #[test]
    fn test_detach_removes_exactly_three_handlers() {
        let reconciler = setup();
        let tree = MenuTree::new("Root");
        let events = tree.events();

        let subs = reconciler.attach(events);
        for kind in [
            MenuEventKind::CategorySelected,
            MenuEventKind::ElementCreated,
            MenuEventKind::ElementRemoved,
        ] {
            assert_eq!(events.handler_count(kind), 1);
        }
        subs.detach();
        for kind in [
            MenuEventKind::CategorySelected,
            MenuEventKind::ElementCreated,
            MenuEventKind::ElementRemoved,
        ] {
            assert_eq!(events.handler_count(kind), 0);
        }

        tree.select_root();
        assert_eq!(reconciler.state(), ReconcilerState::Empty);
    }

    #[test]
    fn test_exhaustion_recorded_not_propagated() {
        let reconciler = setup();
        let tree = MenuTree::new("Root");
        let _subs = reconciler.attach(tree.events());
        for i in 0..7 {
            tree.root().create_category(format!("c{i}"));
        }
        tree.select_root();

        assert_eq!(
            reconciler.last_error(),
            Some(UiError::PoolExhausted {
                role: PoolRole::Category,
                capacity: 6
            })
        );
        assert!(reconciler.page().is_visible());
        assert_eq!(reconciler.page().rows().len(), 6);
    }

    #[test]
    fn test_busy_scene_is_reported() {
        let reconciler = setup();
        let tree = MenuTree::new("Root");
        let _held = reconciler.scene.borrow();
        assert_eq!(
            reconciler.on_category_selected(Some(tree.root())),
            Err(UiError::Busy)
        );
    }

    #[test]
    fn test_effects_can_read_state_during_redraw() {
        let reconciler = setup();
        let tree = MenuTree::new("Root");
        tree.root().create_toggle("Noclip", false);
        let _subs = reconciler.attach(tree.events());

        let seen: Rc<RefCell<Vec<(ReconcilerState, usize)>>> = Rc::new(RefCell::new(Vec::new()));
        let visible = reconciler.page().visible_signal();
        let dispose = {
            let reconciler = reconciler.clone();
            let seen = seen.clone();
            effect_sync(move || {
                if visible.get() {
                    let rows = reconciler.page().rows().len();
                    seen.borrow_mut().push((reconciler.state(), rows));
                }
            })
        };

        tree.select_root();
        assert_eq!(
            *seen.borrow(),
            vec![(ReconcilerState::Assigned(tree.root().clone()), 1)]
        );
        assert_eq!(reconciler.last_error(), None);
        dispose();
    }
}
