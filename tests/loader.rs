use std::{
    cell::Cell,
    fs,
    path::PathBuf,
    rc::Rc,
};

use kifu::{
    Error, GameTree, Loader, Result,
    legacy::{Gib, LegacyFormat},
    parse_sgf,
    sgf::{Cell as Stone, Colour},
};

fn temp_file(name: &str, contents: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("kifu-{}-{name}", std::process::id()));
    fs::write(&path, contents).unwrap();
    path
}

/// Counts how often the loader asks it to parse.
struct Recording {
    calls: Rc<Cell<usize>>,
}

impl LegacyFormat for Recording {
    fn name(&self) -> &'static str {
        "REC"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["sgf", "rec", "gib"]
    }

    fn parse(&self, _text: &str) -> Result<GameTree> {
        self.calls.set(self.calls.get() + 1);
        parse_sgf("(;B[aa])")
    }
}

fn recording_loader() -> (Loader, Rc<Cell<usize>>) {
    let calls = Rc::new(Cell::new(0));
    let loader = Loader::new(vec![Box::new(Recording { calls: Rc::clone(&calls) })]);
    (loader, calls)
}

#[test]
fn valid_sgf_never_reaches_an_adapter() {
    let (loader, calls) = recording_loader();
    let path = temp_file("valid.sgf", "(;FF[4]GM[1]SZ[9];B[ab];W[ba];B[bb])");
    let tree = loader.load(&path).unwrap();
    fs::remove_file(&path).unwrap();

    assert_eq!(calls.get(), 0);
    let moves: Vec<_> = tree.iter_mainline(tree.root()).map(|(_, n)| n.moves_made()).collect();
    assert_eq!(moves, [0, 1, 2, 3]);
    let last = tree.get_end_node(tree.root());
    assert_eq!(tree.node(last).board().count(Stone::Black), 2);
    assert_eq!(tree.node(last).board().count(Stone::White), 1);
}

#[test]
fn invalid_sgf_falls_back_by_extension() {
    let (loader, calls) = recording_loader();
    let tree = loader.load_str("garbage", "broken.REC").unwrap();
    assert_eq!(calls.get(), 1);
    assert_eq!(tree.len(), 2);

    let err = loader.load_str("garbage", "broken.ngf").unwrap_err();
    assert!(matches!(err, Error::ParserFail { format: "SGF", .. }));
    assert_eq!(calls.get(), 1);
}

#[test]
fn gib_content_is_routed_to_the_gib_importer() {
    let path = temp_file("game.gib", "\\[GAMEBLACKNAME=kuro\\]\nINI 0 1 2 &4\nSTO 0 2 2 2 2\n");
    let tree = kifu::load(&path).unwrap();
    fs::remove_file(&path).unwrap();

    let root = tree.node(tree.root());
    assert_eq!(root.properties.first("PB"), Some("kuro"));
    assert_eq!(root.properties.first("HA"), Some("2"));
    assert_eq!(root.board().state(16, 4), Stone::Black);
    assert_eq!(root.board().state(4, 16), Stone::Black);

    let first = root.children()[0];
    assert_eq!(tree.node(first).board().state(3, 3), Stone::White);
    assert_eq!(tree.move_colour(first), Colour::Black);
}

#[test]
fn loader_keeps_first_matching_adapter() {
    let calls = Rc::new(Cell::new(0));
    let loader = Loader::new(vec![
        Box::new(Gib),
        Box::new(Recording { calls: Rc::clone(&calls) }),
    ]);
    let names: Vec<_> = loader.adapters().map(|a| a.name()).collect();
    assert_eq!(names, ["GIB", "REC"]);
    let tree = loader.load_str("STO 0 2 1 3 3", "x.gib").unwrap();
    assert_eq!(calls.get(), 0);
    assert_eq!(tree.move_point(tree.get_end_node(tree.root())), Some(kifu::sgf::Point::new(4, 4)));
}

#[test]
fn missing_file_is_reported_as_io() {
    let path = std::env::temp_dir().join("kifu-this-file-does-not-exist.sgf");
    let err = Loader::default().load(&path).unwrap_err();
    assert!(err.is_not_found());
    assert!(matches!(err, Error::Io(_)));
}

#[test]
fn declared_size_is_validated() {
    let path = temp_file("huge.sgf", "(;SZ[21];B[aa])");
    let err = kifu::load(&path).unwrap_err();
    fs::remove_file(&path).unwrap();
    assert!(matches!(err, Error::BadBoardSize { .. }));
}

#[test]
fn invalid_utf8_is_replaced() {
    let path = std::env::temp_dir().join(format!("kifu-{}-latin1.sgf", std::process::id()));
    fs::write(&path, b"(;PB[Fran\xe7ois];B[dd])").unwrap();
    let tree = kifu::load(&path).unwrap();
    fs::remove_file(&path).unwrap();
    let name = tree.node(tree.root()).properties.unescaped_concat("PB");
    assert!(name.starts_with("Fran"));
    assert_eq!(tree.len(), 2);
}
