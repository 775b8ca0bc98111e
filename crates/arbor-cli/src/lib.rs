//! CLI logic for the Arbor tree editor.
//!
//! Each invocation opens an editing session on the saved tree, applies one
//! command, and exits. The tree is saved by the session itself whenever a
//! command changes it.

pub mod error_adapter;

mod args;
mod config;

pub use args::{Args, Command};

use std::io::{self, Write};

use log::{debug, info};

use arbor::{
    Action, ArborError, Editor, Outcome, TreeError,
    export::{self, OutlineRenderer, Renderer, SvgRenderer},
    identifier::NodeId,
    persist::FileStore,
};

/// Run the Arbor CLI application, printing to standard output
///
/// # Errors
///
/// See [`run_with_output`].
pub fn run(args: &Args) -> Result<(), ArborError> {
    let stdout = io::stdout();
    run_with_output(args, &mut stdout.lock())
}

/// Run the Arbor CLI application
///
/// Loads the configuration, opens the saved tree from the state directory
/// and applies `args.command`, writing any report to `out`.
///
/// # Errors
///
/// Returns `ArborError` for:
/// - Configuration loading or validation errors
/// - Unknown node ids, and attempts to delete the root
/// - Rendering and file I/O errors
pub fn run_with_output(args: &Args, out: &mut impl Write) -> Result<(), ArborError> {
    let app_config = config::load_config(args.config.as_ref())?;
    let state_dir = config::state_dir(args.state_dir.as_ref())?;
    info!(state_dir = state_dir.display().to_string(), command:? = args.command; "Running command");

    let mut editor = Editor::open(&app_config, FileStore::new(state_dir));

    match &args.command {
        Command::Show => {
            let outline = OutlineRenderer::new().render(&editor.frame())?;
            write!(out, "{outline}")?;
        }
        Command::Add { parent } => {
            ensure_exists(&editor, parent)?;
            let frame = editor.dispatch(Action::Activate(NodeId::new(parent.as_str())));
            match (frame.outcome(), frame.notice()) {
                (Outcome::Added(id), _) => writeln!(out, "{id}")?,
                (_, Some(notice)) => eprintln!("{notice}"),
                (outcome, None) => debug!(outcome:?; "Nothing added"),
            }
        }
        Command::Delete { id } => {
            ensure_exists(&editor, id)?;
            if editor.tree().root() == id.as_str() {
                return Err(TreeError::ProtectedRoot(NodeId::new(id.as_str())).into());
            }
            let frame = editor.dispatch(Action::Delete(NodeId::new(id.as_str())));
            if let Outcome::Removed { count, .. } = frame.outcome() {
                writeln!(out, "Removed {count} node(s)")?;
            }
        }
        Command::Render { output } => {
            let palette = app_config.style().palette().map_err(ArborError::Config)?;
            export::write_to_file(&SvgRenderer::new(palette), &editor.frame(), output)?;
            info!(output_file = output; "SVG exported successfully");
        }
        Command::Reset => {
            editor.dispatch(Action::Reset);
            writeln!(out, "Tree reset")?;
        }
    }

    Ok(())
}

fn ensure_exists(editor: &Editor<FileStore>, id: &str) -> Result<(), ArborError> {
    if editor.tree().contains(id) {
        Ok(())
    } else {
        Err(TreeError::NotFound(NodeId::new(id)).into())
    }
}
