//! Importers for legacy game record formats.
//!
//! Each importer turns its dialect into the same raw property vocabulary the
//! SGF parser produces (moves, setup stones, handicap, size and a little
//! metadata), so materialization does not care where a tree came from.
//! None of them check move legality: historical records are reproduced as
//! written.

mod gib;
mod ngf;
mod ugf;

pub use gib::Gib;
pub use ngf::Ngf;
pub use ugf::Ugf;

use crate::{
    error::{Error, Result},
    sgf::{Cell, GameTree, Properties, handicap_points},
};

/// A legacy format the loader can fall back to.
pub trait LegacyFormat {
    /// Short name used in errors and logs.
    fn name(&self) -> &'static str;

    /// Lower-case file extensions, without the dot.
    fn extensions(&self) -> &'static [&'static str];

    /// Build an unmaterialized tree from the file text.
    fn parse(&self, text: &str) -> Result<GameTree>;

    fn claims(&self, extension: &str) -> bool {
        self.extensions()
            .iter()
            .any(|ext| ext.eq_ignore_ascii_case(extension))
    }
}

/// GIB, NGF and UGF, in that order.
pub fn default_adapters() -> Vec<Box<dyn LegacyFormat>> {
    vec![Box::new(Gib), Box::new(Ngf), Box::new(Ugf)]
}

/// Record a fixed 19×19 handicap as HA plus AB stones. Counts below 2 are
/// not handicaps and leave `props` alone.
fn place_handicap(props: &mut Properties, stones: usize) {
    if stones < 2 {
        return;
    }
    props.set_handicap(stones);
    for &point in handicap_points(stones) {
        props.add_setup(Cell::Black, point);
    }
}

/// An import that produced no nodes below the root is a failure.
fn require_moves(tree: GameTree, format: &'static str) -> Result<GameTree> {
    if tree.node(tree.root()).children().is_empty() {
        return Err(Error::parser_fail(format, "no moves found"));
    }
    Ok(tree)
}

/// First run of digits (with an optional fractional part) in `s`.
fn first_float(s: &str) -> Option<f64> {
    let start = s.find(|c: char| c.is_ascii_digit())?;
    let rest = &s[start..];
    let end = rest
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(rest.len());
    rest[..end].trim_end_matches('.').parse().ok()
}
