//! Page - the displayed container a category is drawn into.
//!
//! A page holds at most one assigned category. Drawing releases every row
//! from the previous draw back to its pool, then spawns one row per child
//! element of the assigned category from that element's pool:
//!
//! ```text
//! Page ("Player")
//! ├── Category row  "Stats"     y = 0
//! ├── Function row  "Heal"      y = -spacing
//! └── Toggle row    "God Mode"  y = -2 * spacing
//! ```
//!
//! `assigned` and `visible` are signals, so reactive consumers (effects,
//! deriveds) can track the page without polling.

use spark_signals::{signal, Signal};
use tracing::{debug, warn};

use crate::error::Result;
use crate::menu::{Category, MenuElement};
use crate::pool::PoolRegistry;
use crate::scene::{NodeId, Scene};
use crate::types::{PoolRole, Vec3};

/// One spawned row and the element it displays.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawnRow {
    pub role: PoolRole,
    pub node: NodeId,
    pub element: MenuElement,
}

pub struct Page {
    node: NodeId,
    assigned: Signal<Option<Category>>,
    visible: Signal<bool>,
    rows: Vec<DrawnRow>,
    draw_count: usize,
    row_spacing: f32,
}

impl std::fmt::Debug for Page {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Page")
            .field("node", &self.node)
            .field("assigned", &self.assigned.get())
            .field("visible", &self.visible.get())
            .field("rows", &self.rows.len())
            .field("draw_count", &self.draw_count)
            .finish()
    }
}

impl Page {
    /// Wrap a spawned page instance. Starts unassigned and hidden.
    pub fn new(node: NodeId, row_spacing: f32) -> Self {
        Self {
            node,
            assigned: signal(None),
            visible: signal(false),
            rows: Vec::new(),
            draw_count: 0,
            row_spacing,
        }
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    // =========================================================================
    // Assignment
    // =========================================================================

    /// Bind `category`, superseding any previous assignment.
    pub fn assign(&mut self, category: &Category) {
        self.assigned.set(Some(category.clone()));
    }

    pub fn assigned(&self) -> Option<Category> {
        self.assigned.get()
    }

    /// The signal behind [`assigned`](Self::assigned).
    pub fn assigned_signal(&self) -> Signal<Option<Category>> {
        self.assigned.clone()
    }

    // =========================================================================
    // Drawing
    // =========================================================================

    /// Rebuild rows from the assigned category's current children.
    ///
    /// On pool exhaustion the rows spawned so far stay drawn and the error is
    /// returned. Returns the number of rows drawn.
    pub fn draw(&mut self, scene: &mut Scene, pools: &mut PoolRegistry) -> Result<usize> {
        self.release_rows(scene, pools);
        self.draw_count += 1;

        let Some(category) = self.assigned() else {
            return Ok(0);
        };
        if let Err(err) = scene.set_label(self.node, Some(category.name().to_string())) {
            warn!(%err, "page node missing while drawing");
        }

        for (i, element) in category.elements().into_iter().enumerate() {
            let role = element.pool_role();
            let node = pools.get_mut(role).spawn(scene, self.node, false)?;
            self.rows.push(DrawnRow {
                role,
                node,
                element: element.clone(),
            });
            scene.set_local_position(node, Vec3::new(0.0, -self.row_spacing * i as f32, 0.0))?;
            scene.set_label(node, Some(element.name().to_string()))?;
        }

        debug!(category = category.name(), rows = self.rows.len(), "page drawn");
        Ok(self.rows.len())
    }

    fn release_rows(&mut self, scene: &mut Scene, pools: &mut PoolRegistry) {
        for row in self.rows.drain(..) {
            if let Err(err) = pools.get_mut(row.role).release(scene, row.node) {
                warn!(%err, "could not release row");
            }
        }
    }

    /// Release all rows, drop the assignment and hide the page.
    pub fn clear(&mut self, scene: &mut Scene, pools: &mut PoolRegistry) {
        self.release_rows(scene, pools);
        self.assigned.set(None);
        self.hide(scene);
    }

    pub fn rows(&self) -> &[DrawnRow] {
        &self.rows
    }

    /// Rows currently drawn from `role`'s pool.
    pub fn row_count(&self, role: PoolRole) -> usize {
        self.rows.iter().filter(|r| r.role == role).count()
    }

    /// How many times `draw` has run.
    pub fn draw_count(&self) -> usize {
        self.draw_count
    }

    // =========================================================================
    // Visibility
    // =========================================================================

    pub fn show(&mut self, scene: &mut Scene) {
        self.set_visible(scene, true);
    }

    pub fn hide(&mut self, scene: &mut Scene) {
        self.set_visible(scene, false);
    }

    fn set_visible(&mut self, scene: &mut Scene, visible: bool) {
        if let Err(err) = scene.set_active(self.node, visible) {
            warn!(%err, visible, "page node missing");
        }
        self.visible.set(visible);
    }

    pub fn is_visible(&self) -> bool {
        self.visible.get()
    }

    /// The signal behind [`is_visible`](Self::is_visible).
    pub fn visible_signal(&self) -> Signal<bool> {
        self.visible.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::StaticAssets;
    use crate::config::UiConfig;
    use crate::error::UiError;
    use crate::menu::MenuEvents;

    fn setup() -> (Scene, PoolRegistry, Page) {
        let mut scene = Scene::new();
        let root = scene.create_node("UI Manager");
        let assets = StaticAssets::with_default_templates();
        let mut pools = PoolRegistry::initialize(&mut scene, root, &assets, &UiConfig::default());
        let node = pools.get_mut(PoolRole::Page).spawn(&mut scene, root, false).unwrap();
        (scene, pools, Page::new(node, 0.1))
    }

    #[test]
    fn test_draw_spawns_row_per_element() {
        let (mut scene, mut pools, mut page) = setup();
        let events = MenuEvents::new();
        let category = Category::new("Player", &events);
        category.create_category("Stats");
        category.create_function("Heal", || {});
        category.create_toggle("God Mode", false);

        page.assign(&category);
        assert_eq!(page.draw(&mut scene, &mut pools).unwrap(), 3);

        assert_eq!(page.row_count(PoolRole::Category), 1);
        assert_eq!(page.row_count(PoolRole::Function), 1);
        assert_eq!(page.row_count(PoolRole::Toggle), 1);
        assert_eq!(pools.category().spawned_count(), 1);
        assert_eq!(pools.function().spawned_count(), 1);
        assert_eq!(pools.toggle().spawned_count(), 1);
        assert_eq!(pools.value().spawned_count(), 0);

        let labels: Vec<&str> = page
            .rows()
            .iter()
            .map(|r| scene.label(r.node).unwrap())
            .collect();
        assert_eq!(labels, vec!["Stats", "Heal", "God Mode"]);
        assert_eq!(scene.children(page.node()).len(), 3);
    }

    #[test]
    fn test_redraw_recycles_rows() {
        let (mut scene, mut pools, mut page) = setup();
        let events = MenuEvents::new();
        let category = Category::new("Values", &events);
        for i in 0..6 {
            category.create_value(format!("v{i}"), i as f64);
        }
        page.assign(&category);

        for _ in 0..5 {
            assert_eq!(page.draw(&mut scene, &mut pools).unwrap(), 6);
        }
        assert_eq!(pools.value().spawned_count(), 6);
        assert_eq!(pools.value().instance_count(), 6);
        assert_eq!(page.draw_count(), 5);
    }

    #[test]
    fn test_draw_reports_exhaustion_and_keeps_partial_rows() {
        let (mut scene, mut pools, mut page) = setup();
        let events = MenuEvents::new();
        let category = Category::new("Many", &events);
        for i in 0..7 {
            category.create_category(format!("c{i}"));
        }
        page.assign(&category);

        assert_eq!(
            page.draw(&mut scene, &mut pools),
            Err(UiError::PoolExhausted {
                role: PoolRole::Category,
                capacity: 6
            })
        );
        assert_eq!(page.rows().len(), 6);
    }

    #[test]
    fn test_clear_returns_everything() {
        let (mut scene, mut pools, mut page) = setup();
        let events = MenuEvents::new();
        let category = Category::new("Player", &events);
        category.create_function("Heal", || {});
        page.assign(&category);
        page.draw(&mut scene, &mut pools).unwrap();
        page.show(&mut scene);

        page.clear(&mut scene, &mut pools);
        assert_eq!(page.assigned(), None);
        assert!(!page.is_visible());
        assert!(!scene.is_active(page.node()));
        assert_eq!(pools.function().spawned_count(), 0);
    }

    #[test]
    fn test_reassign_supersedes() {
        let (_, _, mut page) = setup();
        let events = MenuEvents::new();
        let a = Category::new("A", &events);
        let b = Category::new("B", &events);
        page.assign(&a);
        page.assign(&b);
        assert_eq!(page.assigned(), Some(b));
    }
}
