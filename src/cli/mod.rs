use std::{
    io::{self, BufRead, Write as _},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, bail};
use clap::{ArgAction, CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use log::debug;

use crate::{
    editor::{Adapter, EditCommand, Editor, run_editor},
    loader::Loader,
    logging,
    sgf::{GameTree, NodeId, Point, keys, save_file, write_sgf},
};

#[derive(Parser)]
#[command(name = "kifu", version, about = "Read, convert and edit Go game records")]
struct Cli {
    /// More log output; repeat for more detail.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// No log output at all.
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print a position from a game record.
    Show {
        file: PathBuf,
        /// Main-line move to show; defaults to the last one.
        #[arg(long = "move", value_name = "N")]
        move_number: Option<usize>,
    },
    /// Convert any supported record to SGF.
    Convert {
        file: PathBuf,
        /// Output path; stdout when omitted.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Edit a record interactively. Type `help` at the prompt.
    Edit { file: Option<PathBuf> },
    /// Print a shell completion script.
    Completions { shell: Shell },
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    logging::init(logging::level_from_flags(cli.verbose, cli.quiet));
    let loader = Loader::default();

    match cli.command {
        Command::Show { file, move_number } => {
            let tree = load(&loader, &file)?;
            let id = mainline_node(&tree, move_number)?;
            if let Some(info) = render_game_info(&tree) {
                println!("{info}");
            }
            print!("{}", render_position(&tree, id));
        }
        Command::Convert { file, output } => {
            let tree = load(&loader, &file)?;
            match output {
                Some(path) => save_file(&path, &tree)
                    .with_context(|| format!("failed to write {}", path.display()))?,
                None => print!("{}", write_sgf(&tree)),
            }
        }
        Command::Edit { file } => {
            let tree = match &file {
                Some(path) => load(&loader, path)?,
                None => GameTree::default(),
            };
            let mut adapter = CliAdapter::new(file, loader);
            run_editor(Editor::new(tree), &mut adapter)?;
        }
        Command::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "kifu", &mut io::stdout());
        }
    }
    Ok(())
}

fn load(loader: &Loader, path: &Path) -> Result<GameTree> {
    loader
        .load(path)
        .with_context(|| format!("failed to load {}", path.display()))
}

fn mainline_node(tree: &GameTree, move_number: Option<usize>) -> Result<NodeId> {
    let root = tree.root();
    let Some(n) = move_number else {
        return Ok(tree.get_end_node(root));
    };
    match tree.iter_mainline(root).nth(n) {
        Some((id, _)) => Ok(id),
        None => bail!("the main line has only {} moves", tree.iter_mainline(root).count() - 1),
    }
}

/// Players, komi and handicap from the root, if any are recorded.
fn render_game_info(tree: &GameTree) -> Option<String> {
    let props = &tree.node(tree.root()).properties;
    let mut parts = Vec::new();
    let black = props.unescaped_concat(keys::PLAYER_BLACK);
    let white = props.unescaped_concat(keys::PLAYER_WHITE);
    if !black.is_empty() || !white.is_empty() {
        let name = |s: String| if s.is_empty() { "?".to_string() } else { s };
        parts.push(format!("{} (B) vs {} (W)", name(black), name(white)));
    }
    match props.komi() {
        Ok(Some(komi)) => parts.push(format!("komi {komi}")),
        Ok(None) => {}
        Err(err) => debug!("not showing komi: {err}"),
    }
    match props.handicap() {
        Ok(Some(stones)) if stones > 0 => parts.push(format!("handicap {stones}")),
        Ok(_) => {}
        Err(err) => debug!("not showing handicap: {err}"),
    }
    (!parts.is_empty()).then(|| parts.join(", "))
}

/// Description, board and comment of one node.
fn render_position(tree: &GameTree, id: NodeId) -> String {
    let node = tree.node(id);
    let mut out = format!("{}\n{}", tree.describe(id), node.board());
    let comment = node.properties.unescaped_concat(keys::COMMENT);
    if !comment.is_empty() {
        out.push_str(&comment);
        out.push('\n');
    }
    out
}

/// Indented outline of the whole tree with the cursor marked.
fn render_tree(tree: &GameTree, cursor: NodeId) -> String {
    let mut out = String::new();
    let mut stack = vec![(tree.root(), 0)];
    while let Some((id, depth)) = stack.pop() {
        let marker = if id == cursor { "* " } else { "  " };
        out.push_str(&format!("{}{}[{}] {}\n", "  ".repeat(depth), marker, id, tree.describe(id)));
        for &child in tree.node(id).children().iter().rev() {
            stack.push((child, depth + 1));
        }
    }
    out
}

const HELP: &str = "\
next [N] | prev [N] | branch N | tab | main | home | end
play D4 | pass | delete | comment TEXT | new [SIZE]
tree | load PATH | save [PATH] | quit";

pub struct CliAdapter {
    file_path: Option<PathBuf>,
    loader: Loader,
    board_size: usize,
    last_sgf: String,
    last_tree_display: String,
}

impl CliAdapter {
    fn new(file_path: Option<PathBuf>, loader: Loader) -> Self {
        Self {
            file_path,
            loader,
            board_size: 19,
            last_sgf: String::new(),
            last_tree_display: String::new(),
        }
    }

    fn save(&self, rest: &str) -> Result<()> {
        let path = match (rest, &self.file_path) {
            ("", Some(path)) => path.clone(),
            ("", None) => bail!("usage: save <path>"),
            (rest, _) => PathBuf::from(rest),
        };
        std::fs::write(&path, &self.last_sgf)
            .with_context(|| format!("failed to write {}", path.display()))?;
        println!("saved to {}", path.display());
        Ok(())
    }
}

/// Parse the optional count after `next`/`prev`.
fn count(rest: &str) -> Option<usize> {
    if rest.is_empty() { Some(1) } else { rest.parse().ok() }
}

impl Adapter for CliAdapter {
    fn render(&mut self, editor: &Editor) -> Result<()> {
        print!("{}", render_position(&editor.tree, editor.cursor));
        // Cache SGF and tree display for save/tree commands
        self.board_size = editor.tree.node(editor.cursor).board().size();
        self.last_sgf = write_sgf(&editor.tree);
        self.last_tree_display = render_tree(&editor.tree, editor.cursor);
        Ok(())
    }

    fn next_command(&mut self) -> Result<Option<EditCommand>> {
        let stdin = io::stdin();
        loop {
            print!("> ");
            io::stdout().flush()?;

            let mut line = String::new();
            let n = stdin.lock().read_line(&mut line)?;
            if n == 0 {
                return Ok(None); // EOF
            }

            let line = line.trim();
            let (cmd, rest) = match line.split_once(' ') {
                Some((c, r)) => (c, r.trim()),
                None => (line, ""),
            };

            let command = match cmd {
                "quit" | "exit" => return Ok(None),
                "next" => count(rest).map(|n| match n {
                    1 => EditCommand::NavigateNext,
                    n => EditCommand::Forward(n),
                }),
                "prev" => count(rest).map(|n| match n {
                    1 => EditCommand::NavigatePrev,
                    n => EditCommand::Back(n),
                }),
                "branch" => rest.parse().ok().map(EditCommand::NavigateBranch),
                "tab" => Some(EditCommand::NextVariation),
                "main" => Some(EditCommand::ReturnToMainLine),
                "home" => Some(EditCommand::Home),
                "end" => Some(EditCommand::End),
                "play" => Point::from_english(rest, self.board_size).map(EditCommand::Play),
                "pass" => Some(EditCommand::Pass),
                "delete" => Some(EditCommand::DeleteCurrentNode),
                "comment" => Some(EditCommand::SetComment(rest.to_string())),
                "new" => match rest {
                    "" => Some(EditCommand::NewGame(19)),
                    size => size.parse().ok().map(EditCommand::NewGame),
                },
                "tree" => {
                    print!("{}", self.last_tree_display);
                    continue;
                }
                "load" => {
                    if rest.is_empty() {
                        eprintln!("usage: load <path>");
                        continue;
                    }
                    match self.loader.load(rest) {
                        Ok(tree) => {
                            self.file_path = Some(PathBuf::from(rest));
                            Some(EditCommand::Load(tree))
                        }
                        Err(err) => {
                            eprintln!("load failed: {err}");
                            continue;
                        }
                    }
                }
                "save" => {
                    if let Err(err) = self.save(rest) {
                        eprintln!("{err:#}");
                    }
                    continue;
                }
                "help" => {
                    println!("{HELP}");
                    continue;
                }
                "" => continue,
                _ => {
                    eprintln!("unknown command: {line} (try `help`)");
                    continue;
                }
            };

            match command {
                Some(command) => return Ok(Some(command)),
                None => eprintln!("bad argument: {line}"),
            }
        }
    }
}
