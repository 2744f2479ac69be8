//! Tygem `.gib` records.
//!
//! The format is undocumented. Lines are dispatched on their first three
//! characters: `INI` sets up handicap stones, `STO` places a stone. Header
//! lines look like `\[KEY=value\]`; names are taken as-is while result, komi
//! and date are scraped by keyword and first-number matching, which is
//! crude and will misread some files.

use chrono::NaiveDate;
use log::debug;

use crate::{
    error::{Error, Result},
    legacy::{LegacyFormat, first_float, place_handicap, require_moves},
    sgf::{Colour, GameTree, Komi, Point, Properties, keys},
};

const FORMAT: &str = "GIB";

fn fail(reason: impl Into<String>) -> Error {
    Error::parser_fail(FORMAT, reason)
}

pub struct Gib;

impl LegacyFormat for Gib {
    fn name(&self) -> &'static str {
        FORMAT
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["gib"]
    }

    fn parse(&self, text: &str) -> Result<GameTree> {
        let mut tree = GameTree::with_root(Properties::new());
        let root = tree.root();
        let mut node = root;

        for line in text.lines() {
            let line = line.trim();

            if let Some((key, value)) = header_field(line) {
                apply_header(tree.properties_mut(root), key, value);
                continue;
            }

            let fields: Vec<&str> = line.split_whitespace().collect();

            if line.starts_with("INI") {
                if node != root {
                    return Err(fail("handicap setup after the first move"));
                }
                let Some(field) = fields.get(3) else {
                    debug!("GIB: INI line without a handicap field: {line:?}");
                    continue;
                };
                let handicap: i64 = field
                    .parse()
                    .map_err(|_| fail(format!("handicap {field:?} is not a number")))?;
                if !(0..=9).contains(&handicap) {
                    return Err(fail(format!("handicap {handicap} out of range")));
                }
                place_handicap(tree.properties_mut(root), handicap as usize);
            } else if line.starts_with("STO") {
                if fields.len() < 6 {
                    debug!("GIB: short STO line: {line:?}");
                    continue;
                }
                let colour = if fields[3] == "1" { Colour::Black } else { Colour::White };

                // Zero-based from the top left, like SGF. One source says
                // bottom left, but real files disagree.
                let coordinate = |s: &str| -> Result<i64> {
                    s.parse::<i64>()
                        .map(|n| n + 1)
                        .map_err(|_| fail(format!("coordinate {s:?} is not a number")))
                };
                let x = coordinate(fields[4])?;
                let y = coordinate(fields[5])?;
                if !(1..=26).contains(&x) || !(1..=26).contains(&y) {
                    debug!("GIB: coordinate out of range: {line:?}");
                    continue;
                }

                let mut props = Properties::new();
                props.set_move(colour, Some(Point::new(x as usize, y as usize)));
                node = tree.push_child(node, props);
            }
        }

        require_moves(tree, FORMAT)
    }
}

/// Split `\[KEY=value\]` into key and value.
fn header_field(line: &str) -> Option<(&str, &str)> {
    line.strip_prefix("\\[")?.strip_suffix("\\]")?.split_once('=')
}

fn apply_header(props: &mut Properties, key: &str, value: &str) {
    let upper = key.to_ascii_uppercase();
    match upper.as_str() {
        "GAMEBLACKNAME" => props.commit_text(keys::PLAYER_BLACK, value),
        "GAMEWHITENAME" => props.commit_text(keys::PLAYER_WHITE, value),
        k if k.contains("RESULT") => {
            if let Some(result) = result_from_text(value) {
                props.commit_text(keys::RESULT, &result);
            }
        }
        k if k.contains("KOMI") => {
            if let Some(komi) = first_float(value).and_then(|n| Komi::try_from(n).ok()) {
                props.set_komi(komi);
            }
        }
        k if k.contains("DATE") => {
            if let Some(date) = date_from_text(value) {
                props.set_value(keys::DATE, date.format("%Y-%m-%d").to_string());
            }
        }
        _ => {}
    }
}

/// Guess an SGF result from free text such as `"White 3.5 win"`.
fn result_from_text(text: &str) -> Option<String> {
    let upper = text.to_uppercase();
    let winner = if upper.contains("BLACK") {
        'B'
    } else if upper.contains("WHITE") {
        'W'
    } else {
        return None;
    };
    let margin = if upper.contains("RESIGN") {
        "R".to_string()
    } else if upper.contains("TIME") {
        "T".to_string()
    } else {
        first_float(&upper).map(|n| n.to_string()).unwrap_or_default()
    };
    Some(format!("{winner}+{margin}"))
}

/// The first three numbers of `text` read as year, month and day.
fn date_from_text(text: &str) -> Option<NaiveDate> {
    let mut numbers = text
        .split(|c: char| !c.is_ascii_digit())
        .filter(|s| !s.is_empty())
        .map(str::parse::<u32>);
    let year = numbers.next()?.ok()?;
    let month = numbers.next()?.ok()?;
    let day = numbers.next()?.ok()?;
    NaiveDate::from_ymd_opt(i32::try_from(year).ok()?, month, day)
}
