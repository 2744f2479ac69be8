//! Go game records: a board engine with captures, suicide and simple ko, an
//! SGF parser and writer, and importers for the GIB, NGF and UGF formats.

#[cfg(feature = "cli")]
pub mod cli;
pub mod editor;
pub mod error;
pub mod legacy;
pub mod loader;
pub mod logging;
pub mod sgf;

pub use editor::{Adapter, EditCommand, Editor, run_editor};
pub use error::{Error, Result};
pub use loader::{Loader, load};
pub use sgf::{GameTree, parse_sgf, save_file, write_sgf};
