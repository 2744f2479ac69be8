pub mod board;
pub mod coords;
pub mod property;
pub mod tree;
mod parser;
mod play;
mod serializer;

pub use board::{Board, Cell, Colour};
pub use coords::{MAX_BOARD_SIZE, Point, handicap_points, is_star_point, points_from_points_string};
pub use parser::parse_sgf;
pub use property::{Charset, FileFormat, GameType, Komi, Properties, escape, keys, unescape};
pub use serializer::{save_file, write_sgf};
pub use tree::{GameTree, MainlineIter, NodeId, SubtreeIter, TreeNode};
