mod cursor;
pub use cursor::TreeCursor;

use log::warn;

use crate::sgf::{GameTree, NodeId, Point, keys};

/// A game tree plus the node the user is looking at.
pub struct Editor {
    pub tree: GameTree,
    pub cursor: NodeId,
}

pub enum EditCommand {
    NavigateNext,
    NavigatePrev,
    NavigateBranch(usize),
    /// Cycle to the next sibling variation.
    NextVariation,
    Forward(usize),
    Back(usize),
    Home,
    End,
    ReturnToMainLine,
    /// Play for the side to move.
    Play(Point),
    Pass,
    /// Delete the current node and its subtree. On the root this starts a
    /// fresh game.
    DeleteCurrentNode,
    SetComment(String),
    Load(GameTree),
    NewGame(usize),
}

impl Editor {
    pub fn new(tree: GameTree) -> Self {
        let cursor = tree.root();
        Self { tree, cursor }
    }

    pub fn cursor(&self) -> TreeCursor<'_> {
        TreeCursor::new(&self.tree, self.cursor)
    }

    /// Apply `cmd`. Returns whether the tree or the cursor changed.
    pub fn apply(&mut self, cmd: EditCommand) -> bool {
        match cmd {
            EditCommand::NavigateNext => self.navigate(|c| c.advance()),
            EditCommand::NavigatePrev => self.navigate(|c| c.retreat()),
            EditCommand::NavigateBranch(n) => self.navigate(|c| c.branch(n)),
            EditCommand::NextVariation => self.navigate(|c| c.next_sibling()),
            EditCommand::Forward(n) => self.navigate(|c| c.forward(n)),
            EditCommand::Back(n) => self.navigate(|c| c.back(n)),
            EditCommand::Home => self.navigate(|c| c.home()),
            EditCommand::End => self.navigate(|c| c.end()),
            EditCommand::ReturnToMainLine => self.navigate(|c| c.return_to_main_line()),
            EditCommand::Play(p) => match self.tree.try_move(self.cursor, p.x, p.y, None) {
                Some(child) => {
                    self.cursor = child;
                    true
                }
                None => false,
            },
            EditCommand::Pass => {
                self.cursor = self.tree.make_pass(self.cursor);
                true
            }
            EditCommand::DeleteCurrentNode => {
                match self.tree.delete_node(self.cursor) {
                    Some(parent) => self.cursor = parent,
                    None => self.replace(GameTree::default()),
                }
                true
            }
            EditCommand::SetComment(text) => {
                self.tree
                    .properties_mut(self.cursor)
                    .commit_text(keys::COMMENT, &text);
                true
            }
            EditCommand::Load(tree) => {
                self.replace(tree);
                true
            }
            EditCommand::NewGame(size) => match GameTree::new(size) {
                Ok(tree) => {
                    self.replace(tree);
                    true
                }
                Err(err) => {
                    warn!("cannot start a new game: {err}");
                    false
                }
            },
        }
    }

    fn navigate(&mut self, step: impl FnOnce(&mut TreeCursor) -> bool) -> bool {
        let mut cursor = self.cursor();
        let moved = step(&mut cursor);
        self.cursor = cursor.node_id();
        moved
    }

    fn replace(&mut self, tree: GameTree) {
        self.cursor = tree.root();
        self.tree = tree;
    }
}

/// A front end: shows the editor and produces commands until it is done.
pub trait Adapter {
    fn render(&mut self, editor: &Editor) -> anyhow::Result<()>;

    /// `Ok(None)` ends the session.
    fn next_command(&mut self) -> anyhow::Result<Option<EditCommand>>;
}

/// Drive `adapter` until it stops producing commands, re-rendering after
/// each change. Returns the final editor state.
pub fn run_editor(mut editor: Editor, adapter: &mut impl Adapter) -> anyhow::Result<Editor> {
    adapter.render(&editor)?;
    while let Some(cmd) = adapter.next_command()? {
        if editor.apply(cmd) {
            adapter.render(&editor)?;
        }
    }
    Ok(editor)
}
