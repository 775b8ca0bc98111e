//! Arbor Core Types and Definitions
//!
//! This crate provides the foundational types for the Arbor tree editor.
//! It includes:
//!
//! - **Identifiers**: Owned node identifiers with numeric serials ([`identifier::NodeId`])
//! - **Colors**: Color handling with CSS color support ([`color::Color`])
//! - **Geometry**: Basic geometric types ([`geometry`] module)
//! - **Tree**: The arena-backed tree model and its structural queries ([`tree`] module)
//! - **Mutation**: Id allocation and the add/remove operations ([`mutation`] module)
//! - **Errors**: The mutation error taxonomy ([`error::TreeError`])

pub mod color;
pub mod error;
pub mod geometry;
pub mod identifier;
pub mod mutation;
pub mod tree;
