//! The VarRec binary format: a generic variable-length-record tree with
//! parent/child structure, an optional opaque value payload, and byte-exact
//! read/write against a seekable byte stream. See [`codec`] for the framing
//! rules and [`crate::versioninfo`] for the `VS_VERSIONINFO`-specific
//! semantic overlay built on top of it.

pub mod codec;
pub mod dialect;
pub mod key;
pub mod node;

pub use codec::{read_tree, write_tree};
pub use dialect::Dialect;
pub use node::{DataType, NodeId, VarRecNode, VarRecTree};
