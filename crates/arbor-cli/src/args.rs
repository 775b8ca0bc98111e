//! Command-line argument definitions for the Arbor CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Global options select the configuration file, the state
//! directory and logging verbosity; the [`Command`] picks the editing action.

use clap::{Parser, Subcommand};

/// Command-line arguments for the Arbor tree editor
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to configuration file (TOML)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Directory holding the saved tree
    #[arg(long, global = true)]
    pub state_dir: Option<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "warn", global = true)]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

/// Editing commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Print the tree as an indented outline
    Show,

    /// Add a child beneath a node
    Add {
        /// Id of the parent node, e.g. `n0`
        parent: String,
    },

    /// Delete a node and everything beneath it
    Delete {
        /// Id of the node to delete
        id: String,
    },

    /// Render the tree to an SVG file
    Render {
        /// Path to the output SVG file
        #[arg(short, long, default_value = "out.svg")]
        output: String,
    },

    /// Replace the tree with a fresh root
    Reset,
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_args_definition() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_parse_global_options_after_command() {
        let args = Args::try_parse_from([
            "arbor",
            "add",
            "n0",
            "--state-dir",
            "/tmp/arbor",
            "--log-level",
            "debug",
        ])
        .unwrap();

        assert_eq!(
            args.command,
            Command::Add {
                parent: "n0".to_string()
            }
        );
        assert_eq!(args.state_dir.as_deref(), Some("/tmp/arbor"));
        assert_eq!(args.log_level, "debug");
        assert_eq!(args.config, None);
    }

    #[test]
    fn test_render_output_default() {
        let args = Args::try_parse_from(["arbor", "render"]).unwrap();
        assert_eq!(
            args.command,
            Command::Render {
                output: "out.svg".to_string()
            }
        );
        assert_eq!(args.log_level, "warn");
    }

    #[test]
    fn test_command_required() {
        assert!(Args::try_parse_from(["arbor"]).is_err());
    }
}
