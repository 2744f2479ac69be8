use crate::{
    error::{Error, Result},
    sgf::{
        property::Properties,
        tree::{GameTree, NodeId},
    },
};

const FORMAT: &str = "SGF";

fn fail(reason: &str) -> Error {
    Error::parser_fail(FORMAT, reason)
}

/// Single-pass scanner state shared by every nesting level.
struct SgfParser {
    tree: Option<GameTree>,
}

impl SgfParser {
    fn new_node(&mut self, parent: Option<NodeId>) -> NodeId {
        if let (Some(parent), Some(tree)) = (parent, self.tree.as_mut()) {
            return tree.push_child(parent, Properties::new());
        }
        self.tree.insert(GameTree::with_root(Properties::new())).root()
    }

    /// Scan one tree body. `input` starts just after its opening `(`.
    ///
    /// Returns the number of bytes consumed, including the closing `)`, so
    /// the caller resumes right after the subtree. Values keep their escape
    /// backslashes.
    fn parse_tree(&mut self, input: &str, parent: Option<NodeId>) -> Result<usize> {
        let mut node: Option<NodeId> = None;
        let mut inside = false;
        let mut key = String::new();
        let mut key_complete = false;
        let mut value = String::new();
        let mut pos = 0;

        while let Some(c) = input[pos..].chars().next() {
            pos += c.len_utf8();

            if inside {
                match c {
                    '\\' => {
                        let escaped = input[pos..]
                            .chars()
                            .next()
                            .ok_or_else(|| fail("input ends after an escape"))?;
                        pos += escaped.len_utf8();
                        value.push('\\');
                        value.push(escaped);
                    }
                    ']' => {
                        inside = false;
                        match (node, self.tree.as_mut()) {
                            (Some(id), Some(tree)) => tree
                                .properties_mut(id)
                                .add_value(&key, std::mem::take(&mut value)),
                            _ => return Err(fail("value before any node")),
                        }
                    }
                    _ => value.push(c),
                }
                continue;
            }

            match c {
                '[' => {
                    value.clear();
                    inside = true;
                    key_complete = true;
                }
                '(' => {
                    let id = node.ok_or_else(|| fail("variation before any node"))?;
                    pos += self.parse_tree(&input[pos..], Some(id))?;
                }
                ')' => {
                    if node.is_none() {
                        return Err(fail("tree closed before any node"));
                    }
                    return Ok(pos);
                }
                ';' => node = Some(self.new_node(node.or(parent))),
                c if c.is_whitespace() => {}
                c => {
                    if key_complete {
                        key.clear();
                        key_complete = false;
                    }
                    key.push(c);
                }
            }
        }

        if inside {
            return Err(fail("input ends inside a value"));
        }
        if node.is_none() {
            return Err(fail("tree has no nodes"));
        }
        Ok(pos)
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Parse the first game tree in `input` into an unmaterialized [`GameTree`].
///
/// Anything before the first `(` and after the first complete tree is
/// ignored. Boards are left empty; the loader materializes them.
pub fn parse_sgf(input: &str) -> Result<GameTree> {
    let start = input.find('(').ok_or_else(|| fail("no game tree found"))?;
    let mut parser = SgfParser { tree: None };
    parser.parse_tree(&input[start + 1..], None)?;
    parser.tree.ok_or_else(|| fail("tree has no nodes"))
}
