//! Menu Events - handler registry for menu-tree changes.
//!
//! Three events are raised by the menu tree:
//! - `CategorySelected(category)` - the active category changed (may be `None`)
//! - `ElementCreated(category, element)` - a child was added to `category`
//! - `ElementRemoved(category, element)` - a child was removed from `category`
//!
//! # Subscriptions
//!
//! Every `on_*` call returns a [`Subscription`]. Dropping it removes exactly
//! the handler it was returned for, so add/remove can never get out of step:
//!
//! ```ignore
//! let events = MenuEvents::new();
//! let sub = events.on_category_selected(|category| {
//!     println!("selected {:?}", category.map(|c| c.name()));
//! });
//! events.emit_category_selected(None);
//! drop(sub); // handler gone
//! ```
//!
//! Dispatch is synchronous. The handler list is snapshotted before any
//! handler runs, so handlers may subscribe or unsubscribe while dispatching.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use tracing::trace;

use super::category::{Category, MenuElement};

// =============================================================================
// TYPES
// =============================================================================

/// Handler for `CategorySelected`.
pub type CategorySelectedHandler = Rc<dyn Fn(Option<&Category>)>;

/// Handler for `ElementCreated` / `ElementRemoved`.
pub type ElementChangedHandler = Rc<dyn Fn(&Category, &MenuElement)>;

/// Which event a subscription listens to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MenuEventKind {
    CategorySelected,
    ElementCreated,
    ElementRemoved,
}

// =============================================================================
// HANDLER REGISTRY
// =============================================================================

/// The two events that carry a `(category, element)` pair.
#[derive(Clone, Copy, Debug)]
enum ElementEvent {
    Created,
    Removed,
}

impl ElementEvent {
    fn kind(self) -> MenuEventKind {
        match self {
            ElementEvent::Created => MenuEventKind::ElementCreated,
            ElementEvent::Removed => MenuEventKind::ElementRemoved,
        }
    }
}

#[derive(Default)]
struct HandlerRegistry {
    category_selected: Vec<(usize, CategorySelectedHandler)>,
    element_created: Vec<(usize, ElementChangedHandler)>,
    element_removed: Vec<(usize, ElementChangedHandler)>,
    next_id: usize,
}

impl HandlerRegistry {
    fn next_id(&mut self) -> usize {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn element_handlers(&self, event: ElementEvent) -> &Vec<(usize, ElementChangedHandler)> {
        match event {
            ElementEvent::Created => &self.element_created,
            ElementEvent::Removed => &self.element_removed,
        }
    }

    fn element_handlers_mut(
        &mut self,
        event: ElementEvent,
    ) -> &mut Vec<(usize, ElementChangedHandler)> {
        match event {
            ElementEvent::Created => &mut self.element_created,
            ElementEvent::Removed => &mut self.element_removed,
        }
    }

    fn remove(&mut self, kind: MenuEventKind, id: usize) -> bool {
        match kind {
            MenuEventKind::CategorySelected => remove_handler(&mut self.category_selected, id),
            MenuEventKind::ElementCreated => remove_handler(&mut self.element_created, id),
            MenuEventKind::ElementRemoved => remove_handler(&mut self.element_removed, id),
        }
    }

    fn count(&self, kind: MenuEventKind) -> usize {
        match kind {
            MenuEventKind::CategorySelected => self.category_selected.len(),
            MenuEventKind::ElementCreated => self.element_created.len(),
            MenuEventKind::ElementRemoved => self.element_removed.len(),
        }
    }
}

fn remove_handler<H>(handlers: &mut Vec<(usize, H)>, id: usize) -> bool {
    let before = handlers.len();
    handlers.retain(|(h, _)| *h != id);
    handlers.len() != before
}

// =============================================================================
// MENU EVENTS
// =============================================================================

/// Event source for the menu tree. Cloning shares the same registry.
#[derive(Clone, Default)]
pub struct MenuEvents {
    registry: Rc<RefCell<HandlerRegistry>>,
}

impl fmt::Debug for MenuEvents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reg = self.registry.borrow();
        f.debug_struct("MenuEvents")
            .field("category_selected", &reg.category_selected.len())
            .field("element_created", &reg.element_created.len())
            .field("element_removed", &reg.element_removed.len())
            .finish()
    }
}

impl MenuEvents {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to `CategorySelected`.
    pub fn on_category_selected(
        &self,
        handler: impl Fn(Option<&Category>) + 'static,
    ) -> Subscription {
        let handler: CategorySelectedHandler = Rc::new(handler);
        let id = {
            let mut reg = self.registry.borrow_mut();
            let id = reg.next_id();
            reg.category_selected.push((id, handler));
            id
        };
        self.subscription(MenuEventKind::CategorySelected, id)
    }

    /// Subscribe to `ElementCreated`.
    pub fn on_element_created(
        &self,
        handler: impl Fn(&Category, &MenuElement) + 'static,
    ) -> Subscription {
        self.on_element_event(ElementEvent::Created, Rc::new(handler))
    }

    /// Subscribe to `ElementRemoved`.
    pub fn on_element_removed(
        &self,
        handler: impl Fn(&Category, &MenuElement) + 'static,
    ) -> Subscription {
        self.on_element_event(ElementEvent::Removed, Rc::new(handler))
    }

    fn on_element_event(
        &self,
        event: ElementEvent,
        handler: ElementChangedHandler,
    ) -> Subscription {
        let id = {
            let mut reg = self.registry.borrow_mut();
            let id = reg.next_id();
            reg.element_handlers_mut(event).push((id, handler));
            id
        };
        self.subscription(event.kind(), id)
    }

    fn subscription(&self, kind: MenuEventKind, id: usize) -> Subscription {
        trace!(?kind, id, "menu handler subscribed");
        Subscription {
            registry: Rc::downgrade(&self.registry),
            kind,
            id,
        }
    }

    /// Number of live handlers for `kind`.
    pub fn handler_count(&self, kind: MenuEventKind) -> usize {
        self.registry.borrow().count(kind)
    }

    // =========================================================================
    // DISPATCH
    // =========================================================================

    /// Raise `CategorySelected`.
    pub fn emit_category_selected(&self, category: Option<&Category>) {
        let handlers: Vec<CategorySelectedHandler> = self
            .registry
            .borrow()
            .category_selected
            .iter()
            .map(|(_, h)| h.clone())
            .collect();
        for handler in handlers {
            handler(category);
        }
    }

    /// Raise `ElementCreated`.
    pub fn emit_element_created(&self, category: &Category, element: &MenuElement) {
        self.emit_element_event(ElementEvent::Created, category, element);
    }

    /// Raise `ElementRemoved`.
    pub fn emit_element_removed(&self, category: &Category, element: &MenuElement) {
        self.emit_element_event(ElementEvent::Removed, category, element);
    }

    fn emit_element_event(&self, event: ElementEvent, category: &Category, element: &MenuElement) {
        let handlers: Vec<ElementChangedHandler> = self
            .registry
            .borrow()
            .element_handlers(event)
            .iter()
            .map(|(_, h)| h.clone())
            .collect();
        for handler in handlers {
            handler(category, element);
        }
    }
}

// =============================================================================
// SUBSCRIPTION
// =============================================================================

/// Registration guard. Dropping it unsubscribes the handler.
#[must_use = "dropping a Subscription unsubscribes its handler immediately"]
pub struct Subscription {
    registry: Weak<RefCell<HandlerRegistry>>,
    kind: MenuEventKind,
    id: usize,
}

impl Subscription {
    pub fn kind(&self) -> MenuEventKind {
        self.kind
    }

    /// Unsubscribe now. Same as dropping.
    pub fn unsubscribe(self) {}
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("kind", &self.kind)
            .field("id", &self.id)
            .finish()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        // Event source already gone: nothing to remove
        let Some(registry) = self.registry.upgrade() else { return };
        let removed = registry.borrow_mut().remove(self.kind, self.id);
        trace!(kind = ?self.kind, id = self.id, removed, "menu handler unsubscribed");
    }
}
