//! Board materialization and interactive move entry on a [`GameTree`].

use log::trace;

use crate::sgf::{
    board::{Cell, Colour},
    coords::{Point, points_from_points_string},
    property::{Properties, keys},
    tree::{GameTree, NodeId},
};

impl GameTree {
    /// Apply this node's own properties to its board.
    ///
    /// At most one move is played (B before W). A move whose value does not
    /// decode to an on-board point still counts toward `moves_made`, which
    /// is how passes and legacy off-board coordinates are represented.
    /// Setup stones (AB, AW, AE) are then written directly, without
    /// captures.
    pub fn update(&mut self, id: NodeId) {
        let node = self.node_mut(id);
        let size = node.board.size();

        if let Some((colour, value)) = node.properties.move_value() {
            match Point::from_sgf(value).filter(|p| p.in_bounds(size)) {
                Some(p) => node.board.play_move(colour, p.x, p.y),
                None => trace!("node {id}: move {value:?} is not on the board, treating as pass"),
            }
            node.moves_made += 1;
        }

        for cell in [Cell::Black, Cell::White, Cell::Empty] {
            let points: Vec<Point> = node
                .properties
                .setup(cell)
                .iter()
                .flat_map(|value| points_from_points_string(value, size))
                .collect();
            for p in points {
                node.board.set(p.x, p.y, cell);
            }
        }
    }

    /// Materialize every board below `id`, starting from `id`'s own board.
    ///
    /// Each child starts from a copy of its parent's updated board and move
    /// count. The walk uses an explicit stack, so long main lines and deep
    /// variations do not grow the call stack.
    pub fn update_recursive(&mut self, id: NodeId) {
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            self.update(current);

            let parent = self.node(current);
            let board = parent.board.clone();
            let moves_made = parent.moves_made;
            let is_main_line = parent.is_main_line;
            let children = parent.children.clone();

            for (i, &child) in children.iter().enumerate().rev() {
                let node = self.node_mut(child);
                node.board = board.clone();
                node.moves_made = moves_made;
                node.is_main_line = is_main_line && i == 0;
                stack.push(child);
            }
        }
    }

    /// Colour of the nearest move on this node or its ancestors. A node that
    /// only adds stones of one colour counts as that colour having played.
    pub fn last_colour_played(&self, id: NodeId) -> Option<Colour> {
        let mut current = Some(id);
        while let Some(node_id) = current {
            let props = &self.node(node_id).properties;
            if let Some((colour, _)) = props.move_value() {
                return Some(colour);
            }
            let adds_black = props.contains(keys::ADD_BLACK);
            let adds_white = props.contains(keys::ADD_WHITE);
            match (adds_black, adds_white) {
                (true, false) => return Some(Colour::Black),
                (false, true) => return Some(Colour::White),
                _ => {}
            }
            current = self.node(node_id).parent;
        }
        None
    }

    /// The colour to play next: alternate, Black when nothing was played.
    pub fn move_colour(&self, id: NodeId) -> Colour {
        match self.last_colour_played(id) {
            Some(colour) => colour.opponent(),
            None => Colour::Black,
        }
    }

    /// Play at `(x, y)` from node `id` and return the resulting child.
    ///
    /// An existing child with the same move is returned as-is. A new child is
    /// refused when the point is off the board or occupied, when the stone
    /// would be removed as suicide, or when the result repeats the board of
    /// `id`'s parent (simple ko; longer cycles are not detected).
    pub fn try_move(&mut self, id: NodeId, x: usize, y: usize, colour: Option<Colour>) -> Option<NodeId> {
        let colour = colour.unwrap_or_else(|| self.move_colour(id));
        let point = Point::new(x, y);

        if let Some(existing) = self.child_with_move(id, colour, Some(point)) {
            return Some(existing);
        }

        let node = self.node(id);
        if !point.in_bounds(node.board.size()) || node.board.state(x, y) != Cell::Empty {
            return None;
        }

        let mut props = Properties::new();
        props.set_move(colour, Some(point));
        let child = self.spawn(id, props);

        let board = &self.node(child).board;
        let suicide = board.state(x, y) == Cell::Empty;
        let ko = self
            .node(id)
            .parent
            .is_some_and(|grandparent| self.node(grandparent).board == *board);

        if suicide || ko {
            self.discard(child);
            return None;
        }
        Some(child)
    }

    /// Pass for the colour to move, reusing an existing pass child.
    pub fn make_pass(&mut self, id: NodeId) -> NodeId {
        let colour = self.move_colour(id);
        if let Some(existing) = self.child_with_move(id, colour, None) {
            return existing;
        }

        let mut props = Properties::new();
        props.set_move(colour, None);
        self.spawn(id, props)
    }

    /// A child of `id` whose move is `colour` at `point`, or a pass of that
    /// colour when `point` is `None`.
    fn child_with_move(&self, id: NodeId, colour: Colour, point: Option<Point>) -> Option<NodeId> {
        self.node(id).children.iter().copied().find(|&child| {
            let Some((c, _)) = self.node(child).properties.move_value() else {
                return false;
            };
            c == colour
                && match point {
                    Some(p) => self.move_point(child) == Some(p),
                    None => self.move_was_pass(child),
                }
        })
    }

    /// Append and materialize a child built from `id`'s board.
    fn spawn(&mut self, id: NodeId, props: Properties) -> NodeId {
        let parent = self.node(id);
        let board = parent.board.clone();
        let moves_made = parent.moves_made;
        let is_main_line = parent.is_main_line && parent.children.is_empty();

        let child = self.push_child(id, props);
        let node = self.node_mut(child);
        node.board = board;
        node.moves_made = moves_made;
        node.is_main_line = is_main_line;
        self.update(child);
        child
    }
}
