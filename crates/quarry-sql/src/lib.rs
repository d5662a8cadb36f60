//! SQL text transformation for the query-lowering engine.
//!
//! Everything here operates on raw query text: stripping comments, rewriting
//! positional placeholders into a driver's named syntax, and the sentinel
//! machinery for runtime-length slice parameters. The transforms are shared
//! by all driver variants; the variants only choose the placeholder syntax
//! and the trailing statements.

pub mod comment;
pub use comment::{collapse_whitespace, strip_comments};

pub mod placeholder;
pub use placeholder::{rewrite_placeholders, SourceSyntax};

pub mod slice;
pub use slice::{expand_slice_placeholder, slice_sentinel};
