use std::fmt::{Display, Formatter};

use crate::sgf::coords::{MAX_BOARD_SIZE, Point, is_star_point};

// ---------------------------------------------------------------------------
// Cell / Colour
// ---------------------------------------------------------------------------

/// The occupancy state of a single intersection on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cell {
    #[default]
    Empty,
    Black,
    White,
}

/// The side that plays a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Colour {
    Black,
    White,
}

impl Colour {
    pub fn opponent(self) -> Self {
        match self {
            Colour::Black => Colour::White,
            Colour::White => Colour::Black,
        }
    }

    /// Property key carrying a move of this colour.
    pub fn move_key(self) -> &'static str {
        match self {
            Colour::Black => "B",
            Colour::White => "W",
        }
    }
}

impl From<Colour> for Cell {
    fn from(colour: Colour) -> Self {
        match colour {
            Colour::Black => Cell::Black,
            Colour::White => Cell::White,
        }
    }
}

impl Cell {
    pub fn colour(self) -> Option<Colour> {
        match self {
            Cell::Empty => None,
            Cell::Black => Some(Colour::Black),
            Cell::White => Some(Colour::White),
        }
    }
}

// ---------------------------------------------------------------------------
// Board
// ---------------------------------------------------------------------------

/// A snapshot of the position at one node of the game tree.
///
/// Every [`TreeNode`](crate::sgf::TreeNode) owns its own `Board`; it is
/// written once when the node is materialized and only read afterwards.
/// Nothing about groups or liberties is cached: both are recomputed by
/// flood fill whenever a move is played.
///
/// # Coordinate system
///
/// Points are 1-based. `x` runs left to right, `y` top to bottom, matching
/// the SGF letters (`'a'` is 1 on each axis):
///
/// ```text
///          x
///      1  2  3  …  N
/// y 1  .  .  .  …  .
///   2  .  .  .  …  .
///   …
///   N  .  .  .  …  .
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    size: usize,
    /// Row-major, `cells[(y - 1) * size + (x - 1)]`.
    cells: Vec<Cell>,
}

impl Default for Board {
    fn default() -> Self {
        Self::new(MAX_BOARD_SIZE)
    }
}

impl Board {
    pub fn new(size: usize) -> Self {
        Self { size, cells: vec![Cell::Empty; size * size] }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn in_bounds(&self, x: usize, y: usize) -> bool {
        Point::new(x, y).in_bounds(self.size)
    }

    fn index(&self, x: usize, y: usize) -> usize {
        (y - 1) * self.size + (x - 1)
    }

    /// The cell at `(x, y)`; off-board points read as empty.
    pub fn state(&self, x: usize, y: usize) -> Cell {
        if self.in_bounds(x, y) {
            self.cells[self.index(x, y)]
        } else {
            Cell::Empty
        }
    }

    /// Write a cell directly, bypassing capture logic. Off-board writes are
    /// ignored.
    pub fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if self.in_bounds(x, y) {
            let i = self.index(x, y);
            self.cells[i] = cell;
        }
    }

    /// Place a stone and resolve captures, then suicide.
    ///
    /// Legality is not checked: the point may already be occupied and the
    /// move may be suicide, in which case the placed group is removed.
    /// Opponent groups are resolved first, so a self-atari that captures
    /// keeps its stone.
    pub fn play_move(&mut self, colour: Colour, x: usize, y: usize) {
        if !self.in_bounds(x, y) {
            return;
        }

        self.set(x, y, colour.into());

        let opponent = Cell::from(colour.opponent());
        for n in Point::new(x, y).neighbours(self.size) {
            if self.state(n.x, n.y) == opponent && !self.group_has_liberties(n.x, n.y) {
                self.destroy_group(n.x, n.y);
            }
        }

        if !self.group_has_liberties(x, y) {
            self.destroy_group(x, y);
        }
    }

    /// Whether the group at `(x, y)` touches at least one empty point.
    /// An empty point counts as having liberties.
    pub fn group_has_liberties(&self, x: usize, y: usize) -> bool {
        let colour = self.state(x, y);
        if colour == Cell::Empty {
            return true;
        }

        let mut visited = vec![false; self.cells.len()];
        let mut stack = vec![Point::new(x, y)];
        visited[self.index(x, y)] = true;

        while let Some(pt) = stack.pop() {
            for n in pt.neighbours(self.size) {
                let i = self.index(n.x, n.y);
                match self.cells[i] {
                    Cell::Empty => return true,
                    c if c == colour && !visited[i] => {
                        visited[i] = true;
                        stack.push(n);
                    }
                    _ => {}
                }
            }
        }

        false
    }

    /// Every stone of the group at `(x, y)`; empty for an empty point.
    pub fn group(&self, x: usize, y: usize) -> Vec<Point> {
        let colour = self.state(x, y);
        let mut out = Vec::new();
        if colour == Cell::Empty {
            return out;
        }

        let mut visited = vec![false; self.cells.len()];
        let mut stack = vec![Point::new(x, y)];
        visited[self.index(x, y)] = true;

        while let Some(pt) = stack.pop() {
            out.push(pt);
            for n in pt.neighbours(self.size) {
                let i = self.index(n.x, n.y);
                if self.cells[i] == colour && !visited[i] {
                    visited[i] = true;
                    stack.push(n);
                }
            }
        }

        out
    }

    /// Clear the whole group at `(x, y)` to empty.
    pub fn destroy_group(&mut self, x: usize, y: usize) {
        for pt in self.group(x, y) {
            self.set(pt.x, pt.y, Cell::Empty);
        }
    }

    pub fn count(&self, cell: Cell) -> usize {
        self.cells.iter().filter(|&&c| c == cell).count()
    }
}

impl Display for Board {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for y in 1..=self.size {
            for x in 1..=self.size {
                let c = match self.state(x, y) {
                    Cell::Black => '*',
                    Cell::White => 'O',
                    Cell::Empty if is_star_point(x, y, self.size) => '+',
                    Cell::Empty => '.',
                };
                if x > 1 {
                    write!(f, " ")?;
                }
                write!(f, "{}", c)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
