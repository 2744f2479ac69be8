use std::{
    fmt::{Display, Formatter},
    str::FromStr,
};

use crate::{
    error::{Error, Result},
    sgf::{
        board::{Cell, Colour},
        coords::Point,
    },
};

/// Raw property identifiers. Callers outside the parsers should prefer the
/// typed accessors on [`Properties`].
pub mod keys {
    pub const BLACK: &str = "B";
    pub const WHITE: &str = "W";
    pub const ADD_BLACK: &str = "AB";
    pub const ADD_WHITE: &str = "AW";
    pub const ADD_EMPTY: &str = "AE";
    pub const SIZE: &str = "SZ";
    pub const KOMI: &str = "KM";
    pub const HANDICAP: &str = "HA";
    pub const FILE_FORMAT: &str = "FF";
    pub const GAME: &str = "GM";
    pub const CHARSET: &str = "CA";
    pub const PLAYER_BLACK: &str = "PB";
    pub const PLAYER_WHITE: &str = "PW";
    pub const BLACK_RANK: &str = "BR";
    pub const WHITE_RANK: &str = "WR";
    pub const RESULT: &str = "RE";
    pub const DATE: &str = "DT";
    pub const GAME_NAME: &str = "GN";
    pub const COMMENT: &str = "C";
}

/// Komi stored in half points.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Komi(i16);

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Charset {
    #[default]
    UTF8,
    Latin1,
    Other(String),
}

#[repr(u8)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum FileFormat {
    FF1 = 1,
    FF2,
    FF3,
    #[default]
    FF4,
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum GameType {
    #[default]
    Go,
    Other(u8),
}

/// Ordered, multi-valued, string-keyed property bag of one node.
///
/// Values are kept in their escaped on-disk form: a `\` and the character it
/// escapes are both stored. [`unescape`] produces the display text and
/// [`Properties::commit_text`] escapes user text on the way in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Properties {
    entries: Vec<(String, Vec<String>)>,
}

impl Properties {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.index_of(key).is_some()
    }

    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.index_of(key).map(|i| self.entries[i].1.as_slice())
    }

    pub fn first(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(|v| v.first()).map(String::as_str)
    }

    /// Keys with their value lists, in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Append `value` unless the key already holds it.
    pub fn add_value(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        match self.index_of(key) {
            Some(i) => {
                let values = &mut self.entries[i].1;
                if !values.contains(&value) {
                    values.push(value);
                }
            }
            None => self.entries.push((key.to_string(), vec![value])),
        }
    }

    /// Replace the key's whole list with one value.
    pub fn set_value(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        match self.index_of(key) {
            Some(i) => self.entries[i].1 = vec![value],
            None => self.entries.push((key.to_string(), vec![value])),
        }
    }

    pub fn delete_key(&mut self, key: &str) -> Option<Vec<String>> {
        self.index_of(key).map(|i| self.entries.remove(i).1)
    }

    /// All values of `key` unescaped and joined, or `""` if absent.
    pub fn unescaped_concat(&self, key: &str) -> String {
        self.get(key)
            .map(|values| values.iter().map(|v| unescape(v)).collect())
            .unwrap_or_default()
    }

    /// Store free text under `key`, escaping it; empty text deletes the key.
    pub fn commit_text(&mut self, key: &str, text: &str) {
        if text.is_empty() {
            self.delete_key(key);
        } else {
            self.set_value(key, escape(text));
        }
    }

    fn index_of(&self, key: &str) -> Option<usize> {
        self.entries.iter().position(|(k, _)| k == key)
    }

    // -----------------------------------------------------------------------
    // Typed accessors
    // -----------------------------------------------------------------------

    /// The node's move: colour and raw value. Black wins if both are present.
    pub fn move_value(&self) -> Option<(Colour, &str)> {
        [Colour::Black, Colour::White].into_iter().find_map(|colour| {
            self.get(colour.move_key())
                .map(|values| (colour, values.first().map(String::as_str).unwrap_or("")))
        })
    }

    /// Set a move; `None` writes a pass (empty value).
    pub fn set_move(&mut self, colour: Colour, point: Option<Point>) {
        let value = point.and_then(Point::to_sgf).unwrap_or_default();
        self.set_value(colour.move_key(), value);
    }

    pub fn has_move(&self) -> bool {
        self.move_value().is_some()
    }

    /// Raw setup values for the given cell kind (AB, AW or AE).
    pub fn setup(&self, cell: Cell) -> &[String] {
        self.get(setup_key(cell)).unwrap_or(&[])
    }

    pub fn add_setup(&mut self, cell: Cell, point: Point) {
        if let Some(value) = point.to_sgf() {
            self.add_value(setup_key(cell), value);
        }
    }

    /// Declared board size. `Ok(None)` if absent.
    pub fn board_size(&self) -> Result<Option<usize>> {
        self.first(keys::SIZE)
            .map(|s| {
                s.trim()
                    .parse()
                    .map_err(|_| Error::BadBoardSize { value: s.to_string() })
            })
            .transpose()
    }

    pub fn set_board_size(&mut self, size: usize) {
        self.set_value(keys::SIZE, size.to_string());
    }

    pub fn komi(&self) -> Result<Option<Komi>> {
        self.first(keys::KOMI).map(str::parse).transpose()
    }

    pub fn set_komi(&mut self, komi: Komi) {
        self.set_value(keys::KOMI, komi.to_string());
    }

    pub fn handicap(&self) -> Result<Option<usize>> {
        self.first(keys::HANDICAP)
            .map(|s| {
                s.trim()
                    .parse()
                    .map_err(|_| Error::invalid_value("handicap", s))
            })
            .transpose()
    }

    pub fn set_handicap(&mut self, stones: usize) {
        self.set_value(keys::HANDICAP, stones.to_string());
    }

    pub fn charset(&self) -> Result<Option<Charset>> {
        self.first(keys::CHARSET).map(str::parse).transpose()
    }

    pub fn set_charset(&mut self, charset: &Charset) {
        self.set_value(keys::CHARSET, charset.to_string());
    }

    pub fn file_format(&self) -> Result<Option<FileFormat>> {
        self.first(keys::FILE_FORMAT).map(str::parse).transpose()
    }

    pub fn set_file_format(&mut self, ff: FileFormat) {
        self.set_value(keys::FILE_FORMAT, ff.to_string());
    }

    pub fn game_type(&self) -> Result<Option<GameType>> {
        self.first(keys::GAME).map(str::parse).transpose()
    }

    pub fn set_game_type(&mut self, gm: GameType) {
        self.set_value(keys::GAME, gm.to_string());
    }
}

fn setup_key(cell: Cell) -> &'static str {
    match cell {
        Cell::Black => keys::ADD_BLACK,
        Cell::White => keys::ADD_WHITE,
        Cell::Empty => keys::ADD_EMPTY,
    }
}

/// Escape `\` and `]` so `s` can sit inside a property value.
pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if c == '\\' || c == ']' {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Drop escaping backslashes. A trailing lone backslash is dropped too.
pub fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(escaped) = chars.next() {
                out.push(escaped);
            }
        } else {
            out.push(c);
        }
    }
    out
}

impl Komi {
    /// Rounds to the nearest half point. Out-of-range values saturate; use
    /// `Komi::try_from` for untrusted input.
    pub fn new(n: f64) -> Self {
        Komi((n * 2.0).round() as i16)
    }
}

impl TryFrom<f64> for Komi {
    type Error = Error;

    fn try_from(n: f64) -> Result<Self> {
        let half_points = (n * 2.0).round();
        if !(f64::from(i16::MIN)..=f64::from(i16::MAX)).contains(&half_points) {
            return Err(Error::invalid_value("komi", n.to_string()));
        }
        Ok(Komi(half_points as i16))
    }
}

impl Default for Komi {
    fn default() -> Self {
        Komi::new(6.5)
    }
}

impl FromStr for Komi {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let n: f64 = s
            .trim()
            .parse()
            .map_err(|_| Error::invalid_value("komi", s))?;
        Komi::try_from(n).map_err(|_| Error::invalid_value("komi", s))
    }
}

impl FromStr for GameType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let n: u8 = s
            .trim()
            .parse()
            .map_err(|_| Error::invalid_value("game type", s))?;
        Ok(match n {
            1 => GameType::Go,
            n => GameType::Other(n),
        })
    }
}

impl FromStr for FileFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Ok(match s.trim() {
            "1" => FileFormat::FF1,
            "2" => FileFormat::FF2,
            "3" => FileFormat::FF3,
            "4" => FileFormat::FF4,
            _ => return Err(Error::invalid_value("file format", s)),
        })
    }
}

impl FromStr for Charset {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Ok(match s {
            "UTF-8" | "utf-8" | "UTF8" => Charset::UTF8,
            "Latin-1" | "ISO-8859-1" => Charset::Latin1,
            other => Charset::Other(other.to_string()),
        })
    }
}

impl Display for Komi {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let n = self.0;
        let sign = if n < 0 { "-" } else { "" };
        let n = n.unsigned_abs();
        if n % 2 == 0 {
            write!(f, "{}{}", sign, n / 2)
        } else {
            write!(f, "{}{}.5", sign, n / 2)
        }
    }
}

impl Display for FileFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", *self as u8)
    }
}

impl Display for GameType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let n = match self {
            Self::Go => 1,
            Self::Other(other) => *other,
        };
        write!(f, "{}", n)
    }
}

impl Display for Charset {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::UTF8 => "UTF-8",
            Self::Latin1 => "Latin-1",
            Self::Other(other) => other,
        };
        write!(f, "{}", s)
    }
}
