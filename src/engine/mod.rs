//! Surface Engine - Node registry and parallel arrays.
//!
//! The engine manages the core data structures of the render surface:
//! - Registry: Index allocation, ID mapping, parent context, queries
//! - Arrays: Parallel storage for node state
//!
//! # Architecture
//!
//! Nodes are NOT objects. They are indices into parallel arrays:
//!
//! ```text
//! Index 0: Region     (parent=None, path=None)
//! Index 1: Collection (parent=0, path="blocks")
//! Index 2: Block      (parent=1, path="blocks.0", label="Hero")
//! Index 3: Display    (parent=2, path="blocks.0.text", content="A")
//! ```

mod registry;
pub mod arrays;

pub use registry::*;
