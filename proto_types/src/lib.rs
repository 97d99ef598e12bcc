//! Resolved Message Schema Definitions
//!
//! This crate contains the core data model for a fully-resolved message
//! schema: messages, fields, enums, nesting and options. It provides pure
//! data structures without any file I/O or codec logic; the upstream schema
//! parser produces this tree and the codec compiler consumes it read-only.

pub mod schema;
pub mod types;

// Re-export commonly used types at the crate root
pub use schema::*;
pub use types::*;
