//! Categories and elements of the menu tree.
//!
//! Both are cheap shared handles compared by identity. A category owns an
//! ordered list of child elements; a child element may itself wrap a
//! sub-category. Structural changes raise `ElementCreated` /
//! `ElementRemoved` on the tree's [`MenuEvents`].

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use spark_signals::{signal, Signal};

use super::events::MenuEvents;
use crate::types::PoolRole;

// =============================================================================
// ElementKind
// =============================================================================

/// What a menu element does. Each kind is drawn from exactly one pool.
#[derive(Clone)]
pub enum ElementKind {
    /// Opens a sub-category.
    Category(Category),
    /// Runs a callback when pressed.
    Function(Rc<dyn Fn()>),
    /// Numeric value.
    Value(Signal<f64>),
    /// On/off switch.
    Toggle(Signal<bool>),
}

impl ElementKind {
    /// The pool rows of this kind are spawned from.
    pub fn pool_role(&self) -> PoolRole {
        match self {
            ElementKind::Category(_) => PoolRole::Category,
            ElementKind::Function(_) => PoolRole::Function,
            ElementKind::Value(_) => PoolRole::Value,
            ElementKind::Toggle(_) => PoolRole::Toggle,
        }
    }
}

impl fmt::Debug for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementKind::Category(c) => f.debug_tuple("Category").field(&c.name()).finish(),
            ElementKind::Function(_) => f.write_str("Function"),
            ElementKind::Value(v) => f.debug_tuple("Value").field(&v.get()).finish(),
            ElementKind::Toggle(t) => f.debug_tuple("Toggle").field(&t.get()).finish(),
        }
    }
}

// =============================================================================
// MenuElement
// =============================================================================

struct ElementData {
    name: String,
    kind: ElementKind,
}

/// A single interactive entry of a category.
#[derive(Clone)]
pub struct MenuElement(Rc<ElementData>);

impl MenuElement {
    pub fn new(name: impl Into<String>, kind: ElementKind) -> Self {
        Self(Rc::new(ElementData {
            name: name.into(),
            kind,
        }))
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn kind(&self) -> &ElementKind {
        &self.0.kind
    }

    pub fn pool_role(&self) -> PoolRole {
        self.0.kind.pool_role()
    }

    /// The sub-category this element opens, if it is a category entry.
    pub fn as_category(&self) -> Option<&Category> {
        match &self.0.kind {
            ElementKind::Category(c) => Some(c),
            _ => None,
        }
    }

    /// Run a function element. Returns false for other kinds.
    pub fn invoke(&self) -> bool {
        match &self.0.kind {
            ElementKind::Function(callback) => {
                callback();
                true
            }
            _ => false,
        }
    }

    /// Current value of a value element.
    pub fn value(&self) -> Option<f64> {
        match &self.0.kind {
            ElementKind::Value(v) => Some(v.get()),
            _ => None,
        }
    }

    /// Current state of a toggle element.
    pub fn toggled(&self) -> Option<bool> {
        match &self.0.kind {
            ElementKind::Toggle(t) => Some(t.get()),
            _ => None,
        }
    }

    pub fn ptr_eq(&self, other: &MenuElement) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq for MenuElement {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for MenuElement {}

impl fmt::Debug for MenuElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MenuElement")
            .field("name", &self.0.name)
            .field("kind", &self.0.kind)
            .finish()
    }
}

// =============================================================================
// Category
// =============================================================================

struct CategoryData {
    name: String,
    parent: RefCell<Weak<CategoryData>>,
    elements: RefCell<Vec<MenuElement>>,
    events: MenuEvents,
}

/// A node of the menu tree grouping elements and sub-categories.
#[derive(Clone)]
pub struct Category(Rc<CategoryData>);

impl Category {
    /// Create a parentless category that reports changes to `events`.
    pub fn new(name: impl Into<String>, events: &MenuEvents) -> Self {
        Self(Rc::new(CategoryData {
            name: name.into(),
            parent: RefCell::new(Weak::new()),
            elements: RefCell::new(Vec::new()),
            events: events.clone(),
        }))
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// Parent category, while it is still alive and still holds this one.
    pub fn parent(&self) -> Option<Category> {
        self.0.parent.borrow().upgrade().map(Category)
    }

    /// Snapshot of the child elements, in order.
    pub fn elements(&self) -> Vec<MenuElement> {
        self.0.elements.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.0.elements.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.elements.borrow().is_empty()
    }

    /// First child element named `name`.
    pub fn find(&self, name: &str) -> Option<MenuElement> {
        self.0
            .elements
            .borrow()
            .iter()
            .find(|e| e.name() == name)
            .cloned()
    }

    pub fn events(&self) -> &MenuEvents {
        &self.0.events
    }

    // =========================================================================
    // Mutation
    // =========================================================================

    /// Append an element and raise `ElementCreated`.
    pub fn add(&self, element: MenuElement) {
        if let Some(child) = element.as_category() {
            *child.0.parent.borrow_mut() = Rc::downgrade(&self.0);
        }
        self.0.elements.borrow_mut().push(element.clone());
        self.0.events.emit_element_created(self, &element);
    }

    /// Create and add a sub-category.
    pub fn create_category(&self, name: impl Into<String>) -> Category {
        let child = Category::new(name, &self.0.events);
        let element = MenuElement::new(child.name(), ElementKind::Category(child.clone()));
        self.add(element);
        child
    }

    /// Create and add a function element.
    pub fn create_function(
        &self,
        name: impl Into<String>,
        callback: impl Fn() + 'static,
    ) -> MenuElement {
        self.create(name, ElementKind::Function(Rc::new(callback)))
    }

    /// Create and add a value element.
    pub fn create_value(&self, name: impl Into<String>, initial: f64) -> MenuElement {
        self.create(name, ElementKind::Value(signal(initial)))
    }

    /// Create and add a toggle element.
    pub fn create_toggle(&self, name: impl Into<String>, initial: bool) -> MenuElement {
        self.create(name, ElementKind::Toggle(signal(initial)))
    }

    fn create(&self, name: impl Into<String>, kind: ElementKind) -> MenuElement {
        let element = MenuElement::new(name, kind);
        self.add(element.clone());
        element
    }

    /// Remove an element and raise `ElementRemoved`. False if not a child.
    pub fn remove(&self, element: &MenuElement) -> bool {
        let removed = {
            let mut elements = self.0.elements.borrow_mut();
            match elements.iter().position(|e| e.ptr_eq(element)) {
                Some(pos) => Some(elements.remove(pos)),
                None => None,
            }
        };
        let Some(removed) = removed else { return false };

        if let Some(child) = removed.as_category() {
            *child.0.parent.borrow_mut() = Weak::new();
        }
        self.0.events.emit_element_removed(self, &removed);
        true
    }

    pub fn ptr_eq(&self, other: &Category) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq for Category {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for Category {}

impl fmt::Debug for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Category")
            .field("name", &self.0.name)
            .field("elements", &self.0.elements.borrow().len())
            .finish()
    }
}
