//! The VarRec node and the arena that owns a tree of them.
//!
//! A node's parent is modeled as a non-owning back reference: the tree is a
//! single `Vec<VarRecNode>` and a node carries its parent's index (`None`
//! for the root). Detaching a
//! subtree removes it from its parent's `children` list; the orphaned slots
//! are never revisited or re-parented, so the arena never needs compaction
//! for correctness (only for memory reuse, which this crate does not need).

use crate::varrec::dialect::Dialect;

/// Index of a node within a [`VarRecTree`]'s arena.
pub type NodeId = usize;

/// Binary or text value payload, per the 32-bit dialect's `wType` field
/// The 16-bit dialect has no on-wire discriminator and always
/// behaves as `Binary`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    Binary = 0,
    Text = 1,
}

#[derive(Debug, Clone)]
pub struct VarRecNode {
    pub name: String,
    pub data_type: DataType,
    pub value: Option<Vec<u8>>,
    pub children: Vec<NodeId>,
    pub parent: Option<NodeId>,
}

impl VarRecNode {
    fn new(name: impl Into<String>, data_type: DataType, parent: Option<NodeId>) -> Self {
        VarRecNode {
            name: name.into(),
            data_type,
            value: None,
            children: Vec::new(),
            parent,
        }
    }
}

/// An arena-owned VarRec tree, homogeneous in [`Dialect`].
#[derive(Debug, Clone)]
pub struct VarRecTree {
    dialect: Dialect,
    nodes: Vec<VarRecNode>,
    root: NodeId,
}

impl VarRecTree {
    pub const ROOT: NodeId = 0;

    /// Creates a new tree with a single root node.
    pub fn new(dialect: Dialect, root_name: impl Into<String>) -> Self {
        let root = VarRecNode::new(root_name, DataType::Binary, None);
        VarRecTree {
            dialect,
            nodes: vec![root],
            root: Self::ROOT,
        }
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> &VarRecNode {
        &self.nodes[id]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut VarRecNode {
        &mut self.nodes[id]
    }

    /// Creates a new child of `parent`, appended to its children in wire
    /// order, and returns the new node's id.
    pub fn add_child(
        &mut self,
        parent: NodeId,
        name: impl Into<String>,
        data_type: DataType,
    ) -> NodeId {
        let node = VarRecNode::new(name, data_type, Some(parent));
        let id = self.nodes.len();
        self.nodes.push(node);
        self.nodes[parent].children.push(id);
        id
    }

    /// Detaches the child at position `index` in `parent`'s children list.
    /// The removed node (and its whole subtree) is dropped from the
    /// reachable set; remaining children shift down to fill the gap, which
    /// is how deletion renumbers later indices.
    pub fn remove_child_at(&mut self, parent: NodeId, index: usize) {
        self.nodes[parent].children.remove(index);
    }

    /// Finds the first child of `parent` whose name matches `name` under
    /// ASCII case-fold.
    pub fn find_child_ci(&self, parent: NodeId, name: &str) -> Option<NodeId> {
        self.nodes[parent]
            .children
            .iter()
            .copied()
            .find(|&id| self.nodes[id].name.eq_ignore_ascii_case(name))
    }

    /// Replaces the children of `root` with an empty list, discarding every
    /// descendant. Used by `reset()`.
    pub fn clear_children(&mut self, id: NodeId) {
        self.nodes[id].children.clear();
    }

    pub fn child_count(&self, parent: NodeId) -> usize {
        self.nodes[parent].children.len()
    }

    pub fn child_at(&self, parent: NodeId, index: usize) -> NodeId {
        self.nodes[parent].children[index]
    }
}
