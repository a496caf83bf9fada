//! Attachment graph - the nodes pooled UI instances are parented into.
//!
//! The graph provides the primitives the pooling engine needs from a
//! renderer:
//! - create an empty attachable node
//! - clone a node from a [`Blueprint`](crate::assets::Blueprint)
//! - set parent, optionally preserving world pose
//! - set active/visible
//!
//! # Handles
//!
//! Nodes are addressed by generational [`NodeId`]s:
//!
//! ```text
//! slot 0: gen 0  "UI Manager"
//! slot 1: gen 0  "Page Pool"      (parent = slot 0)
//! slot 2: gen 3  "Function"       (reused three times)
//! ```
//!
//! A handle outlives its node safely: lookups through it return `None`, and
//! mutations return `UiError::StaleNode`.

mod graph;
mod node;

pub use graph::*;
pub use node::*;
