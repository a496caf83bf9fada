//! Menu tree - the abstract model the UI is reconciled from.
//!
//! - [`Category`] / [`MenuElement`] - shared, identity-compared tree nodes
//! - [`MenuEvents`] - `CategorySelected`, `ElementCreated`, `ElementRemoved`
//! - [`MenuTree`] - root category, selection and back navigation
//!
//! The UI layer only reads the tree and subscribes to its events.

mod category;
mod events;
mod tree;

pub use category::*;
pub use events::*;
pub use tree::*;
