//! Arbor - an interactive tree editor.
//!
//! Editing, layout, persistence and rendering for Arbor trees. A tree starts
//! as a single root; activating a node adds a child beneath it, and deleting
//! a node removes its whole subtree. After every change the tree is laid out
//! again and saved.
//!
//! # Examples
//!
//! ```
//! use arbor::{
//!     Action, Editor,
//!     config::AppConfig,
//!     export::{Renderer, SvgRenderer},
//!     persist::MemoryStore,
//! };
//!
//! let config = AppConfig::default();
//! let mut editor = Editor::open(&config, MemoryStore::new());
//!
//! editor.dispatch(Action::Activate("n0".into()));
//! let frame = editor.dispatch(Action::Activate("n0".into()));
//! assert_eq!(frame.layout().connectors().len(), 1);
//!
//! let palette = config.style().palette().expect("default colors are valid");
//! let svg = SvgRenderer::new(palette).render(&frame).expect("Failed to render");
//! assert!(svg.contains("Node 2"));
//! ```

pub mod config;
pub mod editor;
pub mod export;
pub mod layout;
pub mod persist;

mod error;

pub use arbor_core::{color, geometry, identifier, mutation, tree};

pub use editor::{Action, Editor, Frame, Notice, Outcome};
pub use error::ArborError;

/// Errors raised by tree mutations.
pub use arbor_core::error::{TreeError, TreeResult};
