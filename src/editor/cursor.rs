use crate::sgf::{GameTree, MainlineIter, NodeId, SubtreeIter, TreeNode};

/// Read-only navigation over a [`GameTree`].
pub struct TreeCursor<'a> {
    tree: &'a GameTree,
    current: NodeId,
}

impl<'a> TreeCursor<'a> {
    pub fn new(tree: &'a GameTree, start: NodeId) -> Self {
        Self { tree, current: start }
    }

    pub fn node_id(&self) -> NodeId {
        self.current
    }

    pub fn current(&self) -> &'a TreeNode {
        self.tree.node(self.current)
    }

    /// Move to the first child. Returns `false` if already at a leaf.
    pub fn advance(&mut self) -> bool {
        self.branch(0)
    }

    /// Move to the parent. Returns `false` if already at the root.
    pub fn retreat(&mut self) -> bool {
        if let Some(parent) = self.current().parent() {
            self.current = parent;
            true
        } else {
            false
        }
    }

    /// Move to the nth child. Returns `false` if the index is out of range.
    pub fn branch(&mut self, idx: usize) -> bool {
        if let Some(&child) = self.current().children().get(idx) {
            self.current = child;
            true
        } else {
            false
        }
    }

    /// Step up to `n` times along first children; `false` if no step was taken.
    pub fn forward(&mut self, n: usize) -> bool {
        (0..n).take_while(|_| self.advance()).count() > 0
    }

    /// Step up to `n` times towards the root; `false` if no step was taken.
    pub fn back(&mut self, n: usize) -> bool {
        (0..n).take_while(|_| self.retreat()).count() > 0
    }

    /// Move to the next sibling, wrapping around to the first.
    pub fn next_sibling(&mut self) -> bool {
        let siblings = self.tree.siblings(self.current);
        if siblings.len() < 2 {
            return false;
        }
        let index = siblings.iter().position(|&s| s == self.current).unwrap_or(0);
        self.current = siblings[(index + 1) % siblings.len()];
        true
    }

    /// Climb until the current node is on the main line.
    pub fn return_to_main_line(&mut self) -> bool {
        let start = self.current;
        while !self.current().is_main_line() && self.retreat() {}
        self.current != start
    }

    pub fn home(&mut self) -> bool {
        let root = self.tree.get_root_node(self.current);
        std::mem::replace(&mut self.current, root) != root
    }

    pub fn end(&mut self) -> bool {
        let end = self.tree.get_end_node(self.current);
        std::mem::replace(&mut self.current, end) != end
    }

    pub fn iter_mainline(&self) -> MainlineIter<'a> {
        self.tree.iter_mainline(self.current)
    }

    pub fn iter_subtree(&self) -> SubtreeIter<'a> {
        self.tree.iter_subtree(self.current)
    }
}
