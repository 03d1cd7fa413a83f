//! Codec and semantic model for Windows `VS_VERSIONINFO` binary resources.
//!
//! [`varrec`] is the generic variable-length-record tree and its byte-exact
//! read/write; [`versioninfo`] layers the `VS_VERSIONINFO`-specific required
//! shape (fixed file info, translations, string tables) on top of it.

mod config;
mod error;
mod stream;

pub mod varrec;
pub mod versioninfo;

pub use config::Config;
pub use error::{Result, VarRecError};
pub use stream::ByteStream;
pub use varrec::Dialect;
pub use versioninfo::{FixedFileInfo, VersionInfo};

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn read_write_round_trip_preserves_fixed_file_info() {
        let mut original = VersionInfo::new(Dialect::Wide32);
        let mut ffi = original.get_fixed_file_info();
        ffi.dw_file_version_ms = 0x0001_0000;
        ffi.dw_file_version_ls = 0x0000_002A;
        original.set_fixed_file_info(ffi);

        let mut buf = Cursor::new(Vec::new());
        original.write_to_stream(&mut buf).unwrap();

        buf.set_position(0);
        let mut reparsed = VersionInfo::new(Dialect::Wide32);
        reparsed.read_from_stream(&mut buf).unwrap();

        assert_eq!(reparsed.get_fixed_file_info(), original.get_fixed_file_info());
    }
}
