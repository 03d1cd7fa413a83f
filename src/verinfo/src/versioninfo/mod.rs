//! The `VS_VERSIONINFO` semantic model: fixed file info, translations, and
//! string tables layered on top of the generic [`crate::varrec`] tree.

pub mod ffi;
pub mod model;
pub mod translation;

pub use ffi::FixedFileInfo;
pub use model::VersionInfo;
