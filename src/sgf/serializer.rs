use std::path::Path;

use crate::{
    error::Result,
    sgf::{GameTree, NodeId},
};

/// Serialise a [`GameTree`] back to SGF text.
pub fn write_sgf(tree: &GameTree) -> String {
    let mut out = String::new();
    out.push('(');
    write_node(tree, tree.root(), &mut out);
    out.push_str(")\n");
    out
}

/// Write the tree to `path` as SGF.
pub fn save_file(path: impl AsRef<Path>, tree: &GameTree) -> Result<()> {
    std::fs::write(path, write_sgf(tree))?;
    Ok(())
}

/// Write a node (`;` followed by its properties) and everything below it.
///
/// Branching rules:
/// - **0 children**: nothing more to emit.
/// - **1 child**: continue inline (no extra parentheses).
/// - **2+ children**: each child is a separate variation, wrapped in `(…)`.
///
/// Single-child chains are walked in a loop, so only variation depth
/// recurses.
fn write_node(tree: &GameTree, id: NodeId, out: &mut String) {
    let mut id = id;
    loop {
        let node = tree.node(id);
        out.push(';');
        for (key, values) in node.properties.iter() {
            write_property(key, values, out);
        }
        match node.children() {
            [] => return,
            [only] => id = *only,
            children => {
                for &child in children {
                    out.push_str("\n(");
                    write_node(tree, child, out);
                    out.push(')');
                }
                return;
            }
        }
    }
}

/// Append one property. Stored values are already escaped.
fn write_property(key: &str, values: &[String], out: &mut String) {
    out.push_str(key);
    for value in values {
        out.push('[');
        out.push_str(value);
        out.push(']');
    }
}

#[cfg(test)]
mod tests {
    use crate::sgf::{GameTree, parse_sgf, write_sgf};

    fn shape(tree: &GameTree) -> Vec<(Option<usize>, Vec<(String, Vec<String>)>)> {
        let ids: Vec<_> = tree.iter_subtree(tree.root()).map(|(id, _)| id).collect();
        let index = |id: usize| ids.iter().position(|&x| x == id);
        tree.iter_subtree(tree.root())
            .map(|(_, node)| {
                let props = node
                    .properties
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_vec()))
                    .collect();
                (node.parent().and_then(index), props)
            })
            .collect()
    }

    /// Parse → serialize → re-parse and check that properties and topology match.
    #[test]
    fn round_trip_main_line() {
        let sgf = "(;GM[1]FF[4]SZ[19];B[dd];W[pd];B[dp])";
        let tree1 = parse_sgf(sgf).unwrap();
        let serialized = write_sgf(&tree1);
        assert_eq!(serialized, "(;GM[1]FF[4]SZ[19];B[dd];W[pd];B[dp])\n");
        let tree2 = parse_sgf(&serialized).unwrap();
        assert_eq!(shape(&tree1), shape(&tree2));
    }

    /// Verify that a game with variations round-trips correctly.
    #[test]
    fn round_trip_with_variations() {
        let sgf = "(;GM[1]FF[4]SZ[19];B[dd](;W[pd](;B[qq])(;B[cc]))(;W[dp]))";
        let tree1 = parse_sgf(sgf).unwrap();
        let serialized = write_sgf(&tree1);
        let tree2 = parse_sgf(&serialized).unwrap();
        assert_eq!(shape(&tree1), shape(&tree2));
        let root2 = tree2.root();
        let b_node = tree2.node(root2).children()[0];
        assert_eq!(tree2.node(b_node).children().len(), 2);
    }

    #[test]
    fn round_trip_keeps_escapes() {
        let sgf = r"(;C[close \] and slash \\ here]GN[a\\]PB[x\]y])";
        let tree1 = parse_sgf(sgf).unwrap();
        let tree2 = parse_sgf(&write_sgf(&tree1)).unwrap();
        assert_eq!(shape(&tree1), shape(&tree2));
        let props = &tree2.node(tree2.root()).properties;
        assert_eq!(props.unescaped_concat("C"), r"close ] and slash \ here");
        assert_eq!(props.unescaped_concat("GN"), r"a\");
    }

    #[test]
    fn committed_text_round_trips() {
        let mut tree = GameTree::new(19).unwrap();
        let root = tree.root();
        tree.properties_mut(root).commit_text("C", r"tricky ] text \ here");
        let reparsed = parse_sgf(&write_sgf(&tree)).unwrap();
        assert_eq!(
            reparsed.node(reparsed.root()).properties.unescaped_concat("C"),
            r"tricky ] text \ here"
        );
    }
}
