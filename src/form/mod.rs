//! Form engine - the document store behind every inline field.
//!
//! - [`Form`] - values, committed snapshot, per-field subscriptions, array mutators
//! - [`FieldPath`] - dot/bracket addressing into the document
//! - [`JsonFile`] - a loaded document and its storage identity

mod engine;
pub mod path;
mod source;

pub use engine::{FieldMeta, Form};
pub use path::{FieldPath, Segment};
pub use source::JsonFile;
