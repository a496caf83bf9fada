//! Scene nodes and their handles.

use std::fmt;

use crate::types::Pose;

/// Generational handle to a scene node.
///
/// Slots are reused after `destroy`, so a handle carries the generation it
/// was issued for. A handle kept past its node's destruction never resolves
/// to the node that later reuses the slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    pub(crate) index: u32,
    pub(crate) generation: u32,
}

impl NodeId {
    pub fn index(self) -> usize {
        self.index as usize
    }

    pub fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}v{}", self.index, self.generation)
    }
}

bitflags::bitflags! {
    /// Per-node state bits.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct NodeFlags: u8 {
        const NONE = 0;
        /// Node itself is enabled (its ancestors may still hide it).
        const ACTIVE = 1 << 0;
        /// Node was cloned from a blueprint.
        const INSTANCE = 1 << 1;
    }
}

/// A node in the attachment graph.
#[derive(Debug, Clone)]
pub struct Node {
    pub(crate) name: String,
    pub(crate) label: Option<String>,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) local: Pose,
    pub(crate) flags: NodeFlags,
}

impl Node {
    pub(crate) fn new(name: impl Into<String>, local: Pose, flags: NodeFlags) -> Self {
        Self {
            name: name.into(),
            label: None,
            parent: None,
            children: Vec::new(),
            local,
            flags,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn local_pose(&self) -> Pose {
        self.local
    }

    pub fn flags(&self) -> NodeFlags {
        self.flags
    }

    pub fn is_active(&self) -> bool {
        self.flags.contains(NodeFlags::ACTIVE)
    }
}
