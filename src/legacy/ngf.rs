//! WBaduk `.ngf` records.
//!
//! Fixed line positions: line 1 holds the board size and line 5 the
//! handicap. Moves are lines shaped like `PMxxBcr..`, where `B`/`W` is the
//! colour and `c`/`r` are letters offset from `A`.

use log::debug;

use crate::{
    error::{Error, Result},
    legacy::{LegacyFormat, place_handicap, require_moves},
    sgf::{Colour, GameTree, MAX_BOARD_SIZE, Point, Properties},
};

const FORMAT: &str = "NGF";

fn fail(reason: impl Into<String>) -> Error {
    Error::parser_fail(FORMAT, reason)
}

pub struct Ngf;

impl LegacyFormat for Ngf {
    fn name(&self) -> &'static str {
        FORMAT
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["ngf"]
    }

    fn parse(&self, text: &str) -> Result<GameTree> {
        let lines: Vec<&str> = text.trim().lines().collect();

        let header_number = |index: usize, what: &str| -> Result<i64> {
            let line = lines
                .get(index)
                .ok_or_else(|| fail(format!("{what} line missing")))?
                .trim();
            line.parse()
                .map_err(|_| fail(format!("{what} {line:?} is not a number")))
        };
        let size = header_number(1, "board size")?;
        let handicap = header_number(5, "handicap")?;

        if !(1..=MAX_BOARD_SIZE as i64).contains(&size) {
            return Err(fail(format!("board size {size} out of range")));
        }
        if !(0..=9).contains(&handicap) {
            return Err(fail(format!("handicap {handicap} out of range")));
        }
        if size < 19 && handicap != 0 {
            return Err(fail("handicap is only supported on 19x19"));
        }

        let mut root_props = Properties::new();
        root_props.set_board_size(size as usize);
        place_handicap(&mut root_props, handicap as usize);

        let mut tree = GameTree::with_root(root_props);
        let mut node = tree.root();

        for line in &lines {
            let Some((colour, point)) = move_line(line) else {
                continue;
            };
            let mut props = Properties::new();
            props.set_move(colour, Some(point));
            node = tree.push_child(node, props);
        }

        require_moves(tree, FORMAT)
    }
}

/// Decode a `PM` line. Anything else, or a move off the 26-letter range,
/// yields `None`.
fn move_line(line: &str) -> Option<(Colour, Point)> {
    let line = line.trim().to_ascii_uppercase();
    let bytes = line.as_bytes();
    if bytes.len() < 7 || !line.starts_with("PM") {
        return None;
    }
    let colour = match bytes[4] {
        b'B' => Colour::Black,
        b'W' => Colour::White,
        _ => return None,
    };
    let x = i32::from(bytes[5]) - i32::from(b'A');
    let y = i32::from(bytes[6]) - i32::from(b'A');
    if !(1..=26).contains(&x) || !(1..=26).contains(&y) {
        debug!("NGF: coordinate out of range: {line:?}");
        return None;
    }
    Some((colour, Point::new(x as usize, y as usize)))
}
