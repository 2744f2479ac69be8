use std::{
    collections::HashSet,
    fmt::{Display, Formatter},
};

/// Largest board any loader or editor accepts.
pub const MAX_BOARD_SIZE: usize = 19;

/// Column letters for the human-facing notation. `I` is skipped.
const ENGLISH_COLUMNS: &[u8] = b"ABCDEFGHJKLMNOPQRSTUVWXYZ";

/// A board intersection, 1-based on both axes.
///
/// `x` is the column (first SGF letter), `y` the row counted from the top
/// edge (second SGF letter), so `"pd"` is `Point { x: 16, y: 4 }`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Point {
    pub x: usize,
    pub y: usize,
}

impl Point {
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    /// Decode the two-letter storage form, `a` = 1. Only the first two
    /// characters are looked at; anything that is not `a..=z` gives `None`.
    pub fn from_sgf(s: &str) -> Option<Self> {
        let mut chars = s.chars();
        let decode = |c: char| -> Option<usize> {
            c.is_ascii_lowercase().then(|| c as usize - 'a' as usize + 1)
        };
        let x = decode(chars.next()?)?;
        let y = decode(chars.next()?)?;
        Some(Self { x, y })
    }

    /// Encode as two lowercase letters. `None` outside `1..=26`.
    pub fn to_sgf(self) -> Option<String> {
        let encode = |n: usize| -> Option<char> {
            (1..=26).contains(&n).then(|| (b'a' + (n - 1) as u8) as char)
        };
        Some([encode(self.x)?, encode(self.y)?].iter().collect())
    }

    pub fn in_bounds(self, size: usize) -> bool {
        (1..=size).contains(&self.x) && (1..=size).contains(&self.y)
    }

    /// Human-facing form, e.g. `(16, 4)` on 19×19 is `"Q16"`. A column or
    /// row off the board shows as `?`.
    pub fn to_english(self, size: usize) -> String {
        let col = ENGLISH_COLUMNS
            .get(self.x.wrapping_sub(1))
            .map(|&b| b as char)
            .unwrap_or('?');
        if (1..=size).contains(&self.y) {
            format!("{}{}", col, size + 1 - self.y)
        } else {
            format!("{col}?")
        }
    }

    /// Inverse of [`Point::to_english`]. Case-insensitive; `None` when the
    /// text is malformed or names a point off the board.
    pub fn from_english(s: &str, size: usize) -> Option<Self> {
        let s = s.trim().to_ascii_uppercase();
        if !(2..=3).contains(&s.len()) {
            return None;
        }
        let first = s.as_bytes()[0];
        let x = ENGLISH_COLUMNS.iter().position(|&b| b == first)? + 1;
        let row: i64 = s[1..].parse().ok()?;
        let y = size as i64 - row + 1;
        if y < 1 {
            return None;
        }
        let point = Self { x, y: y as usize };
        point.in_bounds(size).then_some(point)
    }

    /// Orthogonal neighbours that lie on a board of the given size.
    pub fn neighbours(self, size: usize) -> impl Iterator<Item = Point> {
        let Point { x, y } = self;
        [
            (x.wrapping_sub(1), y),
            (x + 1, y),
            (x, y.wrapping_sub(1)),
            (x, y + 1),
        ]
        .into_iter()
        .map(|(x, y)| Point { x, y })
        .filter(move |p| p.in_bounds(size))
    }
}

impl Display for Point {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.to_sgf() {
            Some(s) => write!(f, "{}", s),
            None => write!(f, "({}, {})", self.x, self.y),
        }
    }
}

/// Whether `(x, y)` is a hoshi on a board of the given size.
pub fn is_star_point(x: usize, y: usize, size: usize) -> bool {
    let mut good_x = false;
    let mut good_y = false;

    if size >= 15 || x == y {
        if 2 * x == size + 1 {
            good_x = true;
        }
        if 2 * y == size + 1 {
            good_y = true;
        }
    }

    let edge = if size >= 12 { 4 } else { 3 };
    if x == edge || x + edge == size + 1 {
        good_x = true;
    }
    if y == edge || y + edge == size + 1 {
        good_y = true;
    }

    good_x && good_y
}

/// Expand a point value: `"aa"` is one point, `"cd:jf"` the rectangle with
/// those corners. Points off the board are dropped.
pub fn points_from_points_string(s: &str, size: usize) -> HashSet<Point> {
    let mut ret = HashSet::new();

    let chars: Vec<char> = s.chars().collect();
    if chars.len() < 2 {
        return ret;
    }

    let decode = |c: char| c as i64 - 'a' as i64 + 1;
    let (mut left, mut top) = (decode(chars[0]), decode(chars[1]));
    let (mut right, mut bottom) = (
        decode(chars[chars.len() - 2]),
        decode(chars[chars.len() - 1]),
    );

    if left > right {
        std::mem::swap(&mut left, &mut right);
    }
    if top > bottom {
        std::mem::swap(&mut top, &mut bottom);
    }

    let size = size as i64;
    for x in left.max(1)..=right.min(size) {
        for y in top.max(1)..=bottom.min(size) {
            ret.insert(Point::new(x as usize, y as usize));
        }
    }

    ret
}

const fn p(x: usize, y: usize) -> Point {
    Point::new(x, y)
}

/// Standard fixed handicap placements on 19×19, indexed by stone count.
const HANDICAP_POINTS_19: [&[Point]; 10] = [
    &[],
    &[],
    &[p(16, 4), p(4, 16)],
    &[p(16, 4), p(4, 16), p(16, 16)],
    &[p(16, 4), p(4, 16), p(16, 16), p(4, 4)],
    &[p(16, 4), p(4, 16), p(16, 16), p(4, 4), p(10, 10)],
    &[p(16, 4), p(4, 16), p(16, 16), p(4, 4), p(4, 10), p(16, 10)],
    &[p(16, 4), p(4, 16), p(16, 16), p(4, 4), p(4, 10), p(16, 10), p(10, 10)],
    &[
        p(16, 4), p(4, 16), p(16, 16), p(4, 4),
        p(4, 10), p(16, 10), p(10, 4), p(10, 16),
    ],
    &[
        p(16, 4), p(4, 16), p(16, 16), p(4, 4),
        p(4, 10), p(16, 10), p(10, 4), p(10, 16), p(10, 10),
    ],
];

/// Handicap stone points for a 19×19 board. Empty for counts below 2 or
/// above 9.
pub fn handicap_points(stones: usize) -> &'static [Point] {
    HANDICAP_POINTS_19.get(stones).copied().unwrap_or(&[])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sgf_letters_are_one_based() {
        assert_eq!(Point::from_sgf("pd"), Some(Point::new(16, 4)));
        assert_eq!(Point::from_sgf("aa"), Some(Point::new(1, 1)));
        assert_eq!(Point::new(16, 4).to_sgf().as_deref(), Some("pd"));
        assert_eq!(Point::new(0, 4).to_sgf(), None);
        assert_eq!(Point::new(27, 4).to_sgf(), None);
    }

    #[test]
    fn malformed_sgf_points_are_rejected() {
        assert_eq!(Point::from_sgf(""), None);
        assert_eq!(Point::from_sgf("a"), None);
        assert_eq!(Point::from_sgf("A1"), None);
        assert_eq!(Point::from_sgf("a!"), None);
    }

    #[test]
    fn english_notation_skips_i_and_counts_from_bottom() {
        assert_eq!(Point::new(16, 4).to_english(19), "Q16");
        assert_eq!(Point::new(9, 19).to_english(19), "J1");
        assert_eq!(Point::from_english("q16", 19), Some(Point::new(16, 4)));
        assert_eq!(Point::from_english("J1", 19), Some(Point::new(9, 19)));
        assert_eq!(Point::from_english("I5", 19), None);
        assert_eq!(Point::from_english("A20", 19), None);
        assert_eq!(Point::from_english("K10", 9), None);
    }

    #[test]
    fn off_board_points_show_question_marks() {
        assert_eq!(Point::new(3, 25).to_english(19), "C?");
        assert_eq!(Point::new(3, 20).to_english(19), "C?");
        assert_eq!(Point::new(3, 0).to_english(19), "C?");
        assert_eq!(Point::new(26, 5).to_english(9), "?5");
        assert_eq!(Point::new(0, 0).to_english(9), "??");
    }

    #[test]
    fn english_round_trip_covers_every_point() {
        for size in [5, 9, 13, 19] {
            for x in 1..=size {
                for y in 1..=size {
                    let point = Point::new(x, y);
                    let text = point.to_english(size);
                    assert_eq!(Point::from_english(&text, size), Some(point), "{text}");
                }
            }
        }
    }

    #[test]
    fn star_points_match_usual_layouts() {
        let stars = |size: usize| {
            let mut v = Vec::new();
            for x in 1..=size {
                for y in 1..=size {
                    if is_star_point(x, y, size) {
                        v.push((x, y));
                    }
                }
            }
            v
        };
        assert_eq!(stars(19).len(), 9);
        assert!(is_star_point(10, 10, 19));
        assert!(is_star_point(4, 10, 19));
        assert_eq!(stars(13), vec![(4, 4), (4, 10), (7, 7), (10, 4), (10, 10)]);
        assert_eq!(stars(9), vec![(3, 3), (3, 7), (5, 5), (7, 3), (7, 7)]);
    }

    #[test]
    fn neighbours_stay_on_board() {
        let corner: Vec<_> = Point::new(1, 1).neighbours(9).collect();
        assert_eq!(corner, vec![Point::new(2, 1), Point::new(1, 2)]);
        assert_eq!(Point::new(5, 5).neighbours(9).count(), 4);
    }

    #[test]
    fn compressed_point_lists_expand_to_rectangles() {
        let single = points_from_points_string("cd", 19);
        assert_eq!(single.len(), 1);
        assert!(single.contains(&Point::new(3, 4)));

        let rect = points_from_points_string("jf:cd", 19);
        assert_eq!(rect.len(), 8 * 3);
        assert!(rect.contains(&Point::new(10, 6)));

        let clipped = points_from_points_string("ha:jj", 9);
        assert_eq!(clipped.len(), 2 * 9);
        assert!(points_from_points_string("", 19).is_empty());
    }

    #[test]
    fn handicap_table_sizes() {
        for n in 2..=9 {
            assert_eq!(handicap_points(n).len(), n);
        }
        assert!(handicap_points(1).is_empty());
        assert!(handicap_points(10).is_empty());
    }
}
