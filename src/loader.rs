//! Turning files into ready-to-use game trees.

use std::{fs, path::Path};

use log::{debug, info, warn};

use crate::{
    error::{Error, Result},
    legacy::{LegacyFormat, default_adapters},
    sgf::{Board, Charset, FileFormat, GameTree, GameType, MAX_BOARD_SIZE, Properties, parse_sgf},
};

/// Loads SGF files, falling back to legacy importers chosen by extension.
pub struct Loader {
    adapters: Vec<Box<dyn LegacyFormat>>,
}

impl Default for Loader {
    fn default() -> Self {
        Self::new(default_adapters())
    }
}

impl Loader {
    /// A loader that tries `adapters` in order after SGF parsing fails.
    pub fn new(adapters: Vec<Box<dyn LegacyFormat>>) -> Self {
        Self { adapters }
    }

    pub fn adapters(&self) -> impl Iterator<Item = &dyn LegacyFormat> {
        self.adapters.iter().map(Box::as_ref)
    }

    /// Read, parse and materialize `path`.
    ///
    /// Filesystem errors, including a missing file, are returned unchanged.
    /// Invalid UTF-8 is replaced rather than rejected.
    pub fn load(&self, path: impl AsRef<Path>) -> Result<GameTree> {
        let path = path.as_ref();
        let bytes = fs::read(path)?;
        let text = String::from_utf8_lossy(&bytes);
        let file_name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
        let tree = self.load_str(&text, file_name)?;
        info!("loaded {} ({} nodes)", path.display(), tree.len());
        Ok(tree)
    }

    /// Parse and materialize `text`. `file_name` only picks the legacy
    /// importer when the text is not SGF.
    pub fn load_str(&self, text: &str, file_name: &str) -> Result<GameTree> {
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);
        let tree = match parse_sgf(text) {
            Ok(tree) => tree,
            Err(err) if err.is_parse_failure() => {
                let Some(adapter) = self.adapter_for(file_name) else {
                    return Err(err);
                };
                debug!("{file_name}: not SGF ({err}), trying {} importer", adapter.name());
                adapter.parse(text)?
            }
            Err(err) => return Err(err),
        };
        finalize(tree)
    }

    fn adapter_for(&self, file_name: &str) -> Option<&dyn LegacyFormat> {
        let (_, extension) = file_name.rsplit_once('.')?;
        self.adapters().find(|adapter| adapter.claims(extension))
    }
}

/// Load `path` with the default importers.
pub fn load(path: impl AsRef<Path>) -> Result<GameTree> {
    Loader::default().load(path)
}

/// Normalize the root and build every board in the tree.
fn finalize(mut tree: GameTree) -> Result<GameTree> {
    let root = tree.root();
    let props = tree.properties_mut(root);
    report_declared_format(props);
    props.set_file_format(FileFormat::FF4);
    props.set_game_type(GameType::Go);
    props.set_charset(&Charset::UTF8);

    let size = match props.board_size()? {
        Some(size) => size,
        None => {
            props.set_board_size(19);
            19
        }
    };
    if !(1..=MAX_BOARD_SIZE).contains(&size) {
        return Err(Error::BadBoardSize { value: size.to_string() });
    }

    let node = tree.node_mut(root);
    node.board = Board::new(size);
    node.moves_made = 0;
    node.is_main_line = true;
    tree.update_recursive(root);
    Ok(tree)
}

/// Log what the file claimed about itself before the root is normalized.
fn report_declared_format(props: &Properties) {
    match props.charset() {
        Ok(Some(Charset::UTF8)) | Ok(None) => {}
        Ok(Some(charset)) => warn!("record declares charset {charset}; text was read as UTF-8"),
        Err(err) => debug!("ignoring charset: {err}"),
    }
    match props.game_type() {
        Ok(Some(GameType::Other(n))) => warn!("record declares game type {n}; loading it as Go"),
        Ok(_) => {}
        Err(err) => debug!("ignoring game type: {err}"),
    }
    match props.file_format() {
        Ok(Some(ff)) if ff != FileFormat::FF4 => debug!("upgrading FF[{ff}] record to FF[4]"),
        Ok(_) => {}
        Err(err) => debug!("ignoring file format: {err}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sgf::Cell;

    #[test]
    fn nine_by_nine_main_line() {
        let tree = Loader::default()
            .load_str("(;FF[4]GM[1]SZ[9];B[ab];W[ba];B[bb])", "game.sgf")
            .unwrap();
        let line: Vec<_> = tree.iter_mainline(tree.root()).map(|(_, n)| n).collect();
        assert_eq!(line.len(), 4);
        let moves: Vec<_> = line.iter().map(|n| n.moves_made()).collect();
        assert_eq!(moves, [0, 1, 2, 3]);
        assert!(line.iter().all(|n| n.is_main_line() && n.board().size() == 9));

        let last = line[3].board();
        assert_eq!(last.state(1, 2), Cell::Black);
        assert_eq!(last.state(2, 1), Cell::White);
        assert_eq!(last.state(2, 2), Cell::Black);
        assert_eq!(last.count(Cell::Empty), 78);
    }

    #[test]
    fn root_is_normalized() {
        let tree = Loader::default().load_str("(;FF[3]CA[latin1];B[dd])", "x.sgf").unwrap();
        let props = &tree.node(tree.root()).properties;
        assert_eq!(props.first("FF"), Some("4"));
        assert_eq!(props.first("GM"), Some("1"));
        assert_eq!(props.first("CA"), Some("UTF-8"));
        assert_eq!(props.first("SZ"), Some("19"));
        assert_eq!(tree.node(tree.root()).board().size(), 19);
    }

    #[test]
    fn foreign_declarations_are_overridden() {
        let tree = Loader::default()
            .load_str("(;GM[2]FF[x]CA[ISO-8859-1]SZ[9];B[aa])", "odd.sgf")
            .unwrap();
        let props = &tree.node(tree.root()).properties;
        assert_eq!(props.game_type().unwrap(), Some(GameType::Go));
        assert_eq!(props.file_format().unwrap(), Some(FileFormat::FF4));
        assert_eq!(props.charset().unwrap(), Some(Charset::UTF8));
        assert_eq!(tree.len(), 2);
    }

    #[test]
    fn bad_sizes_are_rejected() {
        for sgf in ["(;SZ[25])", "(;SZ[0])", "(;SZ[big])"] {
            let err = Loader::default().load_str(sgf, "x.sgf").unwrap_err();
            assert!(matches!(err, Error::BadBoardSize { .. }), "{sgf}: {err}");
        }
    }

    #[test]
    fn bom_is_ignored() {
        let tree = Loader::default().load_str("\u{feff}(;SZ[9])", "bom.sgf").unwrap();
        assert_eq!(tree.node(tree.root()).board().size(), 9);
    }

    #[test]
    fn unknown_extension_keeps_the_sgf_error() {
        let err = Loader::default().load_str("not a game", "notes.txt").unwrap_err();
        assert!(matches!(err, Error::ParserFail { format: "SGF", .. }));
        let err = Loader::default().load_str("not a game", "no_extension").unwrap_err();
        assert!(err.is_parse_failure());
    }

    #[test]
    fn extension_match_ignores_case() {
        let tree = Loader::default().load_str("STO 0 2 1 3 3\n", "GAME.GIB").unwrap();
        assert_eq!(tree.len(), 2);
    }

    #[test]
    fn adapter_errors_propagate() {
        let err = Loader::default().load_str("nothing useful", "x.ngf").unwrap_err();
        assert!(matches!(err, Error::ParserFail { format: "NGF", .. }));
    }

    #[test]
    fn missing_file_is_io_not_found() {
        let err = load("/definitely/not/here.sgf").unwrap_err();
        assert!(err.is_not_found());
    }
}
