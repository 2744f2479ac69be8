//! PandaNet `.ugf`/`.ugi` records.
//!
//! An INI-like layout: `[Header]` entries such as `Size=19` and
//! `Hdcp=2,0.5`, then a `[Data]` section of `coord,colour+number,node,time`
//! records. Lines are classified by a small pest grammar; the importer then
//! walks them as a two-phase state machine.

use chrono::NaiveDate;
use log::debug;
use pest_consume::{Parser, match_nodes};

use crate::{
    error::{Error, Result},
    legacy::{LegacyFormat, require_moves},
    sgf::{Colour, GameTree, Komi, MAX_BOARD_SIZE, NodeId, Point, Properties, keys},
};

const FORMAT: &str = "UGF";

fn fail(reason: impl Into<String>) -> Error {
    Error::parser_fail(FORMAT, reason)
}

type Node<'i> = pest_consume::Node<'i, Rule, ()>;
type ParseResult<T> = std::result::Result<T, pest_consume::Error<Rule>>;

#[derive(Debug, PartialEq, Eq)]
enum UgfLine {
    Section(String),
    Entry { key: String, value: String },
    Record(Vec<String>),
    Other,
}

#[derive(Parser)]
#[grammar = "legacy/ugf.pest"]
struct UgfLineParser;

#[pest_consume::parser]
impl UgfLineParser {
    fn EOI(_input: Node) -> ParseResult<()> {
        Ok(())
    }

    fn name(input: Node) -> ParseResult<String> {
        Ok(input.as_str().trim().to_string())
    }

    fn key(input: Node) -> ParseResult<String> {
        Ok(input.as_str().to_ascii_uppercase())
    }

    fn value(input: Node) -> ParseResult<String> {
        Ok(input.as_str().trim().to_string())
    }

    fn field(input: Node) -> ParseResult<String> {
        Ok(input.as_str().trim().to_string())
    }

    fn section(input: Node) -> ParseResult<UgfLine> {
        match_nodes!(input.into_children();
            [name(name)] => Ok(UgfLine::Section(name))
        )
    }

    fn entry(input: Node) -> ParseResult<UgfLine> {
        match_nodes!(input.into_children();
            [key(key), value(value)] => Ok(UgfLine::Entry { key, value })
        )
    }

    fn record(input: Node) -> ParseResult<UgfLine> {
        match_nodes!(input.into_children();
            [field(fields)..] => Ok(UgfLine::Record(fields.collect()))
        )
    }

    fn other(_input: Node) -> ParseResult<UgfLine> {
        Ok(UgfLine::Other)
    }

    fn line(input: Node) -> ParseResult<UgfLine> {
        match_nodes!(input.into_children();
            [section(line), EOI(_)] => Ok(line),
            [entry(line), EOI(_)] => Ok(line),
            [record(line), EOI(_)] => Ok(line),
            [other(line), EOI(_)] => Ok(line),
        )
    }
}

fn classify(line: &str) -> UgfLine {
    UgfLineParser::parse(Rule::line, line)
        .and_then(|nodes| nodes.single())
        .and_then(UgfLineParser::line)
        .unwrap_or(UgfLine::Other)
}

// ---------------------------------------------------------------------------
// Import
// ---------------------------------------------------------------------------

/// Header values gathered before the data section starts.
#[derive(Default)]
struct Header {
    size: Option<i64>,
    handicap: Option<i64>,
    igs_coordinates: bool,
    props: Properties,
}

impl Header {
    fn apply(&mut self, key: &str, value: &str) {
        let mut fields = value.split(',').map(str::trim);
        let first = fields.next().unwrap_or_default();
        match key {
            "SIZE" => self.size = first.parse().ok(),
            "HDCP" => {
                self.handicap = first.parse().ok();
                if let Some(komi) = fields.next().and_then(|k| k.parse::<Komi>().ok()) {
                    self.props.set_komi(komi);
                }
            }
            "KOMI" => {
                if let Ok(komi) = first.parse::<Komi>() {
                    self.props.set_komi(komi);
                }
            }
            "COORDINATETYPE" => self.igs_coordinates = first.eq_ignore_ascii_case("IGS"),
            "PLAYERB" | "PLAYERW" => {
                let (name_key, rank_key) = if key == "PLAYERB" {
                    (keys::PLAYER_BLACK, keys::BLACK_RANK)
                } else {
                    (keys::PLAYER_WHITE, keys::WHITE_RANK)
                };
                if !first.is_empty() {
                    self.props.commit_text(name_key, first);
                }
                if let Some(rank) = fields.next().filter(|r| !r.is_empty()) {
                    self.props.commit_text(rank_key, rank);
                }
            }
            "WINNER" => {
                let winner = first.to_ascii_uppercase();
                if winner == "B" || winner == "W" {
                    let margin = fields.next().unwrap_or_default();
                    self.props.commit_text(keys::RESULT, &format!("{winner}+{margin}"));
                }
            }
            "DATE" => {
                let date = NaiveDate::parse_from_str(first, "%Y/%m/%d")
                    .or_else(|_| NaiveDate::parse_from_str(first, "%Y-%m-%d"));
                if let Ok(date) = date {
                    self.props.set_value(keys::DATE, date.format("%Y-%m-%d").to_string());
                }
            }
            "TITLE" if !first.is_empty() => self.props.commit_text(keys::GAME_NAME, value),
            _ => {}
        }
    }
}

/// Import state once `[Data]` has been seen.
struct Data {
    tree: GameTree,
    node: NodeId,
    size: i64,
    handicap: i64,
    igs_coordinates: bool,
    handicap_stones_set: i64,
}

impl Data {
    fn start(header: Header) -> Result<Self> {
        let (Some(size), Some(handicap)) = (header.size, header.handicap) else {
            return Err(fail("board size and handicap must precede the data section"));
        };
        if !(1..=MAX_BOARD_SIZE as i64).contains(&size) {
            return Err(fail(format!("board size {size} out of range")));
        }
        if handicap < 0 {
            return Err(fail(format!("handicap {handicap} is negative")));
        }

        let mut props = header.props;
        props.set_board_size(size as usize);
        if handicap >= 2 {
            props.set_handicap(handicap as usize);
        }
        let tree = GameTree::with_root(props);
        let node = tree.root();
        Ok(Self {
            tree,
            node,
            size,
            handicap,
            igs_coordinates: header.igs_coordinates,
            handicap_stones_set: 0,
        })
    }

    fn record(&mut self, fields: &[String]) {
        let (Some(coord), Some(colour)) = (fields.first(), fields.get(1)) else {
            return;
        };
        let coord: Vec<char> = coord.to_ascii_uppercase().chars().collect();
        let &[x_chr, y_chr, ..] = coord.as_slice() else {
            debug!("UGF: short coordinate in {fields:?}");
            return;
        };
        let colour = match colour.to_ascii_uppercase().chars().next() {
            Some('B') => Colour::Black,
            Some('W') => Colour::White,
            _ => {
                debug!("UGF: unknown colour in {fields:?}");
                return;
            }
        };
        let node_field = fields.get(2).map(String::as_str).unwrap_or_default();

        let x = i64::from(u32::from(x_chr)) - 64;
        let y_raw = i64::from(u32::from(y_chr)) - 64;
        let y = if self.igs_coordinates { self.size - y_raw + 1 } else { y_raw };
        let on_board = |n: i64| (1..=self.size).contains(&n);
        let point = (on_board(x) && on_board(y)).then(|| Point::new(x as usize, y as usize));

        let root = self.tree.root();
        if self.handicap >= 2
            && self.handicap_stones_set < self.handicap
            && node_field == "0"
            && colour == Colour::Black
            && self.node == root
        {
            self.handicap_stones_set += 1;
            if let Some(point) = point {
                self.tree.properties_mut(root).add_setup(colour.into(), point);
            }
            return;
        }

        // Off-board coordinates are how passes are written.
        let mut props = Properties::new();
        props.set_move(colour, point);
        self.node = self.tree.push_child(self.node, props);
    }
}

pub struct Ugf;

impl LegacyFormat for Ugf {
    fn name(&self) -> &'static str {
        FORMAT
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["ugf", "ugi"]
    }

    fn parse(&self, text: &str) -> Result<GameTree> {
        let mut header = Header::default();
        let mut data: Option<Data> = None;

        for raw in text.lines() {
            let line = classify(raw.trim());
            if let Some(data) = data.as_mut() {
                match line {
                    // Only the first data section is read.
                    UgfLine::Section(_) => break,
                    UgfLine::Record(fields) => data.record(&fields),
                    _ => {}
                }
                continue;
            }
            match line {
                UgfLine::Section(name) if name.eq_ignore_ascii_case("DATA") => {
                    data = Some(Data::start(std::mem::take(&mut header))?);
                }
                UgfLine::Entry { key, value } => header.apply(&key, &value),
                _ => {}
            }
        }

        let data = data.ok_or_else(|| fail("no data section"))?;
        require_moves(data.tree, FORMAT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
[Header]
Lang=JP
Title=Friendly game
PlayerB=Kuro,3d,,
PlayerW=Shiro,4d,,
Size=19
Hdcp=0,6.5
Winner=W,5.5
Date=2004/05/06,12:00
CoordinateType=IGS
[Data]
QP,B1,1,0
DD,W2,2,0
[Figure]
QD,B3,3,0
";

    #[test]
    fn lines_are_classified() {
        assert_eq!(classify("[Data]"), UgfLine::Section("Data".into()));
        assert_eq!(
            classify("Size=19"),
            UgfLine::Entry { key: "SIZE".into(), value: "19".into() }
        );
        assert_eq!(
            classify("QD,B1,1,0"),
            UgfLine::Record(vec!["QD".into(), "B1".into(), "1".into(), "0".into()])
        );
        assert_eq!(classify("free text"), UgfLine::Other);
        assert_eq!(classify(""), UgfLine::Other);
        assert_eq!(classify("[open"), UgfLine::Other);
    }

    #[test]
    fn header_and_moves_are_imported() {
        let tree = Ugf.parse(SAMPLE).unwrap();
        let root = tree.node(tree.root());
        let props = &root.properties;
        assert_eq!(props.first("SZ"), Some("19"));
        assert_eq!(props.first("PB"), Some("Kuro"));
        assert_eq!(props.first("BR"), Some("3d"));
        assert_eq!(props.first("PW"), Some("Shiro"));
        assert_eq!(props.first("RE"), Some("W+5.5"));
        assert_eq!(props.first("KM"), Some("6.5"));
        assert_eq!(props.first("DT"), Some("2004-05-06"));
        assert_eq!(props.first("GN"), Some("Friendly game"));
        assert!(!props.contains("HA"));

        // IGS rows count up from the bottom; the [Figure] move is not read.
        let moves: Vec<_> = tree
            .iter_mainline(tree.root())
            .skip(1)
            .filter_map(|(_, n)| n.properties.move_value().map(|(c, v)| (c, v.to_string())))
            .collect();
        assert_eq!(
            moves,
            [(Colour::Black, "qd".to_string()), (Colour::White, "dp".to_string())]
        );
    }

    #[test]
    fn handicap_stones_become_setup() {
        let text = "[Header]\nSize=19\nHdcp=2,0.5\n[Data]\nDD,B1,0,0\nPP,B2,0,0\nQC,W1,1,0\n";
        let tree = Ugf.parse(text).unwrap();
        let root = tree.node(tree.root());
        assert_eq!(root.properties.first("HA"), Some("2"));
        assert_eq!(root.properties.get("AB").unwrap(), ["dd", "pp"]);
        assert_eq!(root.children().len(), 1);
        assert_eq!(tree.len(), 2);
    }

    #[test]
    fn extreme_komi_is_ignored() {
        for komi in ["-99999", "99999", "-16384.5"] {
            let text = format!("[Header]\nSize=19\nHdcp=0,{komi}\n[Data]\nPD,B1,1,0\n");
            let tree = Ugf.parse(&text).unwrap();
            assert!(!tree.node(tree.root()).properties.contains("KM"), "{komi}");
        }
        let tree = Ugf.parse("[Header]\nSize=19\nHdcp=0,-16384\n[Data]\nPD,B1,1,0\n").unwrap();
        assert_eq!(tree.node(tree.root()).properties.first("KM"), Some("-16384"));
    }

    #[test]
    fn off_board_coordinates_are_passes() {
        let text = "[Header]\nSize=9\nHdcp=0,6.5\n[Data]\nEE,B1,1,0\nYA,W2,2,0\n";
        let tree = Ugf.parse(text).unwrap();
        let last = tree.get_end_node(tree.root());
        assert_eq!(tree.node(last).properties.first("W"), Some(""));
        assert!(tree.move_was_pass(last));
    }

    #[test]
    fn malformed_files_fail() {
        for text in [
            "[Header]\nSize=19\nHdcp=0,6.5\n",
            "[Header]\nHdcp=0\n[Data]\nDD,B1,1,0\n",
            "[Header]\nSize=19\n[Data]\nDD,B1,1,0\n",
            "[Header]\nSize=25\nHdcp=0\n[Data]\nDD,B1,1,0\n",
            "[Header]\nSize=19\nHdcp=-1\n[Data]\nDD,B1,1,0\n",
            "[Header]\nSize=19\nHdcp=0\n[Data]\n",
        ] {
            assert!(Ugf.parse(text).unwrap_err().is_parse_failure(), "{text:?}");
        }
    }
}
