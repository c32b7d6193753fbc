//! Arena-backed phylogenetic tree
//!
//! Clades are stored in a flat vector and addressed by [`NodeId`]. Children
//! keep their insertion order, which fixes the terminal traversal order used
//! by matrix reordering and subgroup detection.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{TreeError, TreeResult};

/// Index of a clade inside its [`Tree`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A node of the tree (terminal when it has no children)
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Clade {
    /// Label (terminals keep their input label, internal nodes are cleared)
    pub name: Option<String>,
    /// Length of the branch leading to this clade
    pub branch_length: Option<f64>,
    /// Child clades in insertion order
    pub children: Vec<NodeId>,
    /// Parent clade (None for the root)
    pub parent: Option<NodeId>,
}

impl Clade {
    /// Create a named clade without branch length
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    /// Check if this clade is a leaf
    pub fn is_terminal(&self) -> bool {
        self.children.is_empty()
    }
}

impl fmt::Display for Clade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name.as_deref().unwrap_or("None"))
    }
}

/// A rooted (or root-placed) tree of clades
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Tree {
    nodes: Vec<Clade>,
    root: Option<NodeId>,
    /// Whether the root position is meaningful (UPGMA) or arbitrary (NJ)
    pub rooted: bool,
}

impl Tree {
    /// Create a tree containing only a root clade
    pub fn with_root(root: Clade, rooted: bool) -> Self {
        let mut tree = Self {
            nodes: Vec::new(),
            root: None,
            rooted,
        };
        tree.add_clade(None, root);
        tree
    }

    /// Add a clade under `parent` (or as the root when `parent` is None)
    ///
    /// Adding a second root replaces the previous one; the old root stays in
    /// the arena but becomes unreachable.
    pub fn add_clade(&mut self, parent: Option<NodeId>, mut clade: Clade) -> NodeId {
        let id = NodeId(self.nodes.len());
        clade.parent = parent;
        self.nodes.push(clade);
        match parent {
            Some(p) => self.nodes[p.0].children.push(id),
            None => self.root = Some(id),
        }
        id
    }

    /// Store a clade with neither parent nor root status
    pub(crate) fn add_detached(&mut self, clade: Clade) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Clade {
            parent: None,
            children: Vec::new(),
            ..clade
        });
        id
    }

    /// Attach an existing parentless clade as the last child of `parent`
    pub(crate) fn attach(&mut self, parent: NodeId, child: NodeId) {
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    /// Make an existing clade the root
    pub(crate) fn set_root(&mut self, root: NodeId) {
        self.nodes[root.0].parent = None;
        self.root = Some(root);
    }

    /// Get the root clade id
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Get a clade by id
    pub fn clade(&self, id: NodeId) -> &Clade {
        &self.nodes[id.0]
    }

    /// Get a mutable clade by id
    pub fn clade_mut(&mut self, id: NodeId) -> &mut Clade {
        &mut self.nodes[id.0]
    }

    /// Name of a clade, `"None"` for unnamed clades
    pub fn name(&self, id: NodeId) -> String {
        self.clade(id).to_string()
    }

    /// All reachable clades in depth-first pre-order
    pub fn preorder(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<NodeId> = self.root.into_iter().collect();
        while let Some(id) = stack.pop() {
            order.push(id);
            stack.extend(self.nodes[id.0].children.iter().rev().copied());
        }
        order
    }

    /// Leaves in depth-first pre-order
    pub fn terminals(&self) -> Vec<NodeId> {
        self.preorder()
            .into_iter()
            .filter(|id| self.clade(*id).is_terminal())
            .collect()
    }

    /// Internal clades in depth-first pre-order
    pub fn nonterminals(&self) -> Vec<NodeId> {
        self.preorder()
            .into_iter()
            .filter(|id| !self.clade(*id).is_terminal())
            .collect()
    }

    /// Leaf names in traversal order
    pub fn terminal_names(&self) -> Vec<String> {
        self.terminals().into_iter().map(|id| self.name(id)).collect()
    }

    /// Find the first terminal carrying `name`
    pub fn find_terminal(&self, name: &str) -> Option<NodeId> {
        self.terminals()
            .into_iter()
            .find(|id| self.clade(*id).name.as_deref() == Some(name))
    }

    /// Remove the names of all internal clades
    pub fn clear_internal_names(&mut self) {
        for id in self.nonterminals() {
            self.nodes[id.0].name = None;
        }
    }

    /// Path from a clade up to the root (inclusive on both ends)
    fn lineage(&self, id: NodeId) -> Vec<NodeId> {
        let mut path = vec![id];
        let mut current = id;
        while let Some(parent) = self.nodes[current.0].parent {
            path.push(parent);
            current = parent;
        }
        path
    }

    /// Most recent common ancestor of two clades
    pub fn common_ancestor(&self, a: NodeId, b: NodeId) -> TreeResult<NodeId> {
        let ancestors_a = self.lineage(a);
        self.lineage(b)
            .into_iter()
            .find(|id| ancestors_a.contains(id))
            .ok_or(TreeError::Disconnected(a.0, b.0))
    }

    /// Sum of branch lengths from the root down to `id`
    ///
    /// The root's own branch length is not counted; missing lengths count as zero.
    pub fn depth(&self, id: NodeId) -> f64 {
        let mut total = 0.0;
        let mut current = id;
        while let Some(parent) = self.nodes[current.0].parent {
            total += self.nodes[current.0].branch_length.unwrap_or(0.0);
            current = parent;
        }
        total
    }

    /// Path length between two clades through their common ancestor
    pub fn distance(&self, a: NodeId, b: NodeId) -> TreeResult<f64> {
        let mrca = self.common_ancestor(a, b)?;
        Ok(self.depth(a) + self.depth(b) - 2.0 * self.depth(mrca))
    }

    /// Longest path from `id` down to any of its leaves
    pub fn height(&self, id: NodeId) -> f64 {
        self.nodes[id.0]
            .children
            .iter()
            .map(|c| self.nodes[c.0].branch_length.unwrap_or(0.0) + self.height(*c))
            .fold(0.0, f64::max)
    }

    /// Sum of all branch lengths in the reachable tree
    pub fn total_branch_length(&self) -> f64 {
        self.preorder()
            .into_iter()
            .filter_map(|id| self.clade(id).branch_length)
            .sum()
    }

    /// Number of reachable clades
    pub fn len(&self) -> usize {
        self.preorder().len()
    }

    /// Check if the tree has no clades
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }
}
