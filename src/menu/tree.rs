//! Menu tree - root category plus the current selection.

use std::cell::RefCell;

use tracing::debug;

use super::category::Category;
use super::events::MenuEvents;

/// The menu a UI manager displays.
///
/// Selecting a category raises `CategorySelected`; structural changes to any
/// category created through this tree raise `ElementCreated` /
/// `ElementRemoved` on the same [`MenuEvents`].
#[derive(Debug)]
pub struct MenuTree {
    events: MenuEvents,
    root: Category,
    selected: RefCell<Option<Category>>,
}

impl MenuTree {
    pub fn new(root_name: impl Into<String>) -> Self {
        let events = MenuEvents::new();
        let root = Category::new(root_name, &events);
        Self {
            events,
            root,
            selected: RefCell::new(None),
        }
    }

    pub fn events(&self) -> &MenuEvents {
        &self.events
    }

    pub fn root(&self) -> &Category {
        &self.root
    }

    pub fn selected(&self) -> Option<Category> {
        self.selected.borrow().clone()
    }

    /// Make `category` the active one and raise `CategorySelected`.
    pub fn select(&self, category: &Category) {
        debug!(category = category.name(), "category selected");
        *self.selected.borrow_mut() = Some(category.clone());
        self.events.emit_category_selected(Some(category));
    }

    pub fn select_root(&self) {
        let root = self.root.clone();
        self.select(&root);
    }

    /// Select the parent of the current category.
    ///
    /// Returns the newly selected category, or `None` when nothing is
    /// selected or the selection has no parent.
    pub fn back(&self) -> Option<Category> {
        let parent = self.selected().and_then(|c| c.parent())?;
        self.select(&parent);
        Some(parent)
    }
}
