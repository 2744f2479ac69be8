use std::collections::HashSet;

use crate::{
    error::{Error, Result},
    sgf::{
        board::Board,
        coords::{MAX_BOARD_SIZE, Point},
        property::{Charset, FileFormat, GameType, Properties},
    },
};

pub type NodeId = usize;

/// One position of the game record.
#[derive(Debug, Clone, Default)]
pub struct TreeNode {
    pub properties: Properties,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) board: Board,
    pub(crate) moves_made: usize,
    pub(crate) is_main_line: bool,
}

impl TreeNode {
    pub(crate) fn with_properties(properties: Properties, parent: Option<NodeId>) -> Self {
        Self { properties, parent, ..Self::default() }
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn moves_made(&self) -> usize {
        self.moves_made
    }

    pub fn is_main_line(&self) -> bool {
        self.is_main_line
    }
}

/// A single game record: an arena of nodes hanging off one root.
///
/// Children own nothing directly; every link is a [`NodeId`] into the
/// arena. Slots of deleted subtrees are recycled, so an id is only valid
/// until the node it names is deleted.
#[derive(Debug, Clone)]
pub struct GameTree {
    nodes: Vec<Option<TreeNode>>,
    free: Vec<NodeId>,
    root: NodeId,
}

/// An empty 19×19 game.
impl Default for GameTree {
    fn default() -> Self {
        Self::fresh(19)
    }
}

impl GameTree {
    /// A fresh, materialized one-node tree on a `size`×`size` board.
    pub fn new(size: usize) -> Result<Self> {
        if !(1..=MAX_BOARD_SIZE).contains(&size) {
            return Err(Error::BadBoardSize { value: size.to_string() });
        }
        Ok(Self::fresh(size))
    }

    fn fresh(size: usize) -> Self {
        let mut tree = Self::with_root(Properties::new());
        let root = tree.node_mut(tree.root);
        root.properties.set_file_format(FileFormat::FF4);
        root.properties.set_game_type(GameType::Go);
        root.properties.set_charset(&Charset::UTF8);
        root.properties.set_board_size(size);
        root.board = Board::new(size);
        root.is_main_line = true;
        tree
    }

    /// A tree holding just an unmaterialized root. Used by the importers.
    pub(crate) fn with_root(properties: Properties) -> Self {
        Self {
            nodes: vec![Some(TreeNode::with_properties(properties, None))],
            free: Vec::new(),
            root: 0,
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Panics if `id` was never allocated or has been deleted.
    pub fn node(&self, id: NodeId) -> &TreeNode {
        self.get(id).expect("NodeId does not name a live node")
    }

    pub fn get(&self, id: NodeId) -> Option<&TreeNode> {
        self.nodes.get(id).and_then(Option::as_ref)
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut TreeNode {
        self.nodes
            .get_mut(id)
            .and_then(Option::as_mut)
            .expect("NodeId does not name a live node")
    }

    /// Metadata and comments are free to edit; structure and boards are not.
    pub fn properties_mut(&mut self, id: NodeId) -> &mut Properties {
        &mut self.node_mut(id).properties
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.nodes.len() - self.free.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Allocate a node and append it to `parent`'s children.
    pub(crate) fn push_child(&mut self, parent: NodeId, properties: Properties) -> NodeId {
        let node = TreeNode::with_properties(properties, Some(parent));
        let id = match self.free.pop() {
            Some(id) => {
                self.nodes[id] = Some(node);
                id
            }
            None => {
                self.nodes.push(Some(node));
                self.nodes.len() - 1
            }
        };
        self.node_mut(parent).children.push(id);
        id
    }

    /// Detach `id` from its parent and free its whole subtree.
    fn remove_subtree(&mut self, id: NodeId) {
        if let Some(parent) = self.node(id).parent {
            self.node_mut(parent).children.retain(|&c| c != id);
        }
        let doomed: Vec<NodeId> = self.iter_subtree(id).map(|(id, _)| id).collect();
        for id in doomed {
            self.nodes[id] = None;
            self.free.push(id);
        }
    }

    /// Delete `id` and everything below it, re-derive main-line flags and
    /// return the parent. The root cannot be deleted.
    pub fn delete_node(&mut self, id: NodeId) -> Option<NodeId> {
        let parent = self.node(id).parent?;
        self.remove_subtree(id);
        self.fix_main_line_status_recursive(parent);
        Some(parent)
    }

    /// Drop a freshly created child that turned out to be illegal.
    pub(crate) fn discard(&mut self, id: NodeId) {
        self.remove_subtree(id);
    }

    // -----------------------------------------------------------------------
    // Navigation
    // -----------------------------------------------------------------------

    pub fn get_root_node(&self, id: NodeId) -> NodeId {
        let mut current = id;
        while let Some(parent) = self.node(current).parent {
            current = parent;
        }
        current
    }

    /// Last node of the local main line, following first children.
    pub fn get_end_node(&self, id: NodeId) -> NodeId {
        self.iter_mainline(id).last().map(|(id, _)| id).unwrap_or(id)
    }

    pub fn siblings(&self, id: NodeId) -> &[NodeId] {
        match self.node(id).parent {
            Some(parent) => &self.node(parent).children,
            None => &[],
        }
    }

    /// On-board points played by this node's siblings.
    pub fn sibling_moves(&self, id: NodeId) -> HashSet<Point> {
        self.siblings(id)
            .iter()
            .filter(|&&sibling| sibling != id)
            .filter_map(|&sibling| self.move_point(sibling))
            .collect()
    }

    /// The point this node's move was played on, if it is on the board.
    pub fn move_point(&self, id: NodeId) -> Option<Point> {
        let node = self.node(id);
        let (_, value) = node.properties.move_value()?;
        Point::from_sgf(value).filter(|p| p.in_bounds(node.board.size()))
    }

    /// A move property whose value is empty or off the board.
    pub fn move_was_pass(&self, id: NodeId) -> bool {
        self.node(id).properties.has_move() && self.move_point(id).is_none()
    }

    /// Re-derive `is_main_line` below `id` from `id`'s own flag.
    pub fn fix_main_line_status_recursive(&mut self, id: NodeId) {
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let is_main_line = self.node(current).is_main_line;
            let children = self.node(current).children.clone();
            for (i, &child) in children.iter().enumerate() {
                self.node_mut(child).is_main_line = is_main_line && i == 0;
                stack.push(child);
            }
        }
    }

    /// One-line summary of a node for title bars and the CLI.
    pub fn describe(&self, id: NodeId) -> String {
        let node = self.node(id);
        let pass = self.move_was_pass(id);
        let point = self.move_point(id);

        let mut title = if point.is_none() && !pass {
            if node.parent.is_some() { "Empty node".to_string() } else { "Root node".to_string() }
        } else {
            format!("Move {}", node.moves_made)
        };

        let siblings = self.siblings(id);
        if siblings.len() > 1 {
            let index = siblings.iter().position(|&s| s == id).unwrap_or(0);
            title.push_str(&format!(" [{} of {} variations]", index + 1, siblings.len()));
        }

        if pass {
            title.push_str(" (pass)");
        } else if let Some(point) = point {
            title.push_str(&format!(" ({})", point.to_english(node.board.size())));
        }
        title
    }

    // -----------------------------------------------------------------------
    // Iteration
    // -----------------------------------------------------------------------

    pub fn iter_mainline(&self, start: NodeId) -> MainlineIter<'_> {
        MainlineIter { tree: self, current: Some(start) }
    }

    pub fn iter_subtree(&self, start: NodeId) -> SubtreeIter<'_> {
        SubtreeIter { tree: self, stack: vec![start] }
    }
}

/// Follows the first child of each node (the main line of play).
pub struct MainlineIter<'a> {
    tree: &'a GameTree,
    current: Option<NodeId>,
}

impl<'a> Iterator for MainlineIter<'a> {
    type Item = (NodeId, &'a TreeNode);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        let node = self.tree.node(id);
        self.current = node.children.first().copied();
        Some((id, node))
    }
}

/// DFS pre-order traversal over every node reachable from a given root.
pub struct SubtreeIter<'a> {
    tree: &'a GameTree,
    stack: Vec<NodeId>,
}

impl<'a> Iterator for SubtreeIter<'a> {
    type Item = (NodeId, &'a TreeNode);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        let node = self.tree.node(id);
        // Push children in reverse so the leftmost child is visited first.
        self.stack.extend(node.children.iter().rev().copied());
        Some((id, node))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sgf::board::Colour;

    /// root → a → (b → d | c)
    fn branching_tree() -> (GameTree, [NodeId; 5]) {
        let mut tree = GameTree::new(9).unwrap();
        let root = tree.root();
        let mv = |colour, x, y| {
            let mut props = Properties::new();
            props.set_move(colour, Some(Point::new(x, y)));
            props
        };
        let a = tree.push_child(root, mv(Colour::Black, 3, 3));
        let b = tree.push_child(a, mv(Colour::White, 7, 7));
        let c = tree.push_child(a, mv(Colour::White, 7, 3));
        let d = tree.push_child(b, mv(Colour::Black, 3, 7));
        tree.fix_main_line_status_recursive(root);
        (tree, [root, a, b, c, d])
    }

    #[test]
    fn new_tree_has_finalized_root() {
        let tree = GameTree::new(13).unwrap();
        let root = tree.node(tree.root());
        assert!(root.is_main_line());
        assert_eq!(root.board().size(), 13);
        assert_eq!(root.properties.first("SZ"), Some("13"));
        assert_eq!(root.properties.first("FF"), Some("4"));
        assert_eq!(tree.len(), 1);
        assert!(matches!(GameTree::new(0), Err(Error::BadBoardSize { .. })));
        assert!(matches!(GameTree::new(20), Err(Error::BadBoardSize { .. })));
    }

    #[test]
    fn main_line_follows_first_children() {
        let (tree, [root, a, b, c, d]) = branching_tree();
        for id in [root, a, b, d] {
            assert!(tree.node(id).is_main_line(), "{id}");
        }
        assert!(!tree.node(c).is_main_line());
        let line: Vec<_> = tree.iter_mainline(root).map(|(id, _)| id).collect();
        assert_eq!(line, [root, a, b, d]);
        assert_eq!(tree.get_end_node(root), d);
        assert_eq!(tree.get_end_node(c), c);
        assert_eq!(tree.get_root_node(d), root);
    }

    #[test]
    fn deleting_a_side_variation_keeps_flags() {
        let (mut tree, [root, a, b, c, d]) = branching_tree();
        assert_eq!(tree.delete_node(c), Some(a));
        assert!(tree.get(c).is_none());
        assert_eq!(tree.node(a).children(), [b]);
        for id in [root, a, b, d] {
            assert!(tree.node(id).is_main_line());
        }
        assert_eq!(tree.len(), 4);
    }

    #[test]
    fn deleting_the_main_line_promotes_the_next_child() {
        let (mut tree, [root, a, b, c, d]) = branching_tree();
        let e = tree.push_child(c, Properties::new());
        let f = tree.push_child(e, Properties::new());
        tree.fix_main_line_status_recursive(root);
        assert!(!tree.node(e).is_main_line() && !tree.node(f).is_main_line());

        assert_eq!(tree.delete_node(b), Some(a));
        assert!(tree.get(d).is_none());
        for id in [c, e, f] {
            assert!(tree.node(id).is_main_line(), "{id}");
        }
        assert_eq!(tree.get_end_node(root), f);
        let line: Vec<_> = tree.iter_mainline(root).map(|(id, _)| id).collect();
        assert_eq!(line, [root, a, c, e, f]);
    }

    #[test]
    fn root_cannot_be_deleted() {
        let (mut tree, [root, ..]) = branching_tree();
        assert_eq!(tree.delete_node(root), None);
        assert_eq!(tree.len(), 5);
    }

    #[test]
    fn freed_slots_are_reused() {
        let (mut tree, [_, a, b, _, _]) = branching_tree();
        tree.delete_node(b);
        let e = tree.push_child(a, Properties::new());
        assert!(e == b || e == 4);
        assert_eq!(tree.len(), 4);
    }

    #[test]
    fn sibling_moves_exclude_self() {
        let (tree, [root, a, b, c, _]) = branching_tree();
        let from_b = tree.sibling_moves(b);
        assert_eq!(from_b.len(), 1);
        assert!(from_b.contains(&Point::new(7, 3)));
        assert!(tree.sibling_moves(c).contains(&Point::new(7, 7)));
        assert!(tree.sibling_moves(a).is_empty());
        assert!(tree.sibling_moves(root).is_empty());
    }

    #[test]
    fn subtree_iteration_is_preorder() {
        let (tree, [root, a, b, c, d]) = branching_tree();
        let order: Vec<_> = tree.iter_subtree(root).map(|(id, _)| id).collect();
        assert_eq!(order, [root, a, b, d, c]);
    }

    #[test]
    fn describe_root_and_variations() {
        let (tree, [root, _, _, c, _]) = branching_tree();
        assert_eq!(tree.describe(root), "Root node");
        // Boards are not materialized here, so sizes fall back to 19.
        assert!(tree.describe(c).contains("[2 of 2 variations]"));
    }
}
