//! The 52-byte `VS_FIXEDFILEINFO` record carried as the root node's value.

pub const FFI_SIZE: usize = 52;
pub const FFI_SIGNATURE: u32 = 0xFEEF_04BD;
pub const FFI_STRUC_VERSION: u32 = 0x0001_0000;

/// `VS_FIXEDFILEINFO`, little-endian, fixed 52-byte layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FixedFileInfo {
    pub dw_signature: u32,
    pub dw_struc_version: u32,
    pub dw_file_version_ms: u32,
    pub dw_file_version_ls: u32,
    pub dw_product_version_ms: u32,
    pub dw_product_version_ls: u32,
    pub dw_file_flags_mask: u32,
    pub dw_file_flags: u32,
    pub dw_file_os: u32,
    pub dw_file_type: u32,
    pub dw_file_subtype: u32,
    pub dw_file_date_ms: u32,
    pub dw_file_date_ls: u32,
}

impl FixedFileInfo {
    /// A zeroed record stamped with the required signature/struct-version.
    pub fn stamped_zero() -> Self {
        FixedFileInfo {
            dw_signature: FFI_SIGNATURE,
            dw_struc_version: FFI_STRUC_VERSION,
            ..Default::default()
        }
    }

    /// Returns `self` with the signature and struct-version forced to the
    /// required constants, regardless of what was supplied.
    pub fn stamped(mut self) -> Self {
        self.dw_signature = FFI_SIGNATURE;
        self.dw_struc_version = FFI_STRUC_VERSION;
        self
    }

    pub fn to_bytes(self) -> [u8; FFI_SIZE] {
        let mut bytes = [0u8; FFI_SIZE];
        let fields = [
            self.dw_signature,
            self.dw_struc_version,
            self.dw_file_version_ms,
            self.dw_file_version_ls,
            self.dw_product_version_ms,
            self.dw_product_version_ls,
            self.dw_file_flags_mask,
            self.dw_file_flags,
            self.dw_file_os,
            self.dw_file_type,
            self.dw_file_subtype,
            self.dw_file_date_ms,
            self.dw_file_date_ls,
        ];
        for (i, field) in fields.iter().enumerate() {
            bytes[i * 4..i * 4 + 4].copy_from_slice(&field.to_le_bytes());
        }
        bytes
    }

    /// Parses a 52-byte FFI record. Shorter input is zero-extended; longer
    /// input is truncated, so a host can hand this the raw root-node value
    /// buffer without pre-validating its length.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let mut padded = [0u8; FFI_SIZE];
        let n = bytes.len().min(FFI_SIZE);
        padded[..n].copy_from_slice(&bytes[..n]);

        let read_u32 = |offset: usize| {
            u32::from_le_bytes(padded[offset..offset + 4].try_into().unwrap())
        };

        FixedFileInfo {
            dw_signature: read_u32(0),
            dw_struc_version: read_u32(4),
            dw_file_version_ms: read_u32(8),
            dw_file_version_ls: read_u32(12),
            dw_product_version_ms: read_u32(16),
            dw_product_version_ls: read_u32(20),
            dw_file_flags_mask: read_u32(24),
            dw_file_flags: read_u32(28),
            dw_file_os: read_u32(32),
            dw_file_type: read_u32(36),
            dw_file_subtype: read_u32(40),
            dw_file_date_ms: read_u32(44),
            dw_file_date_ls: read_u32(48),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stamped_zero_has_required_stamps_and_nothing_else() {
        let ffi = FixedFileInfo::stamped_zero();
        assert_eq!(ffi.dw_signature, FFI_SIGNATURE);
        assert_eq!(ffi.dw_struc_version, FFI_STRUC_VERSION);
        assert_eq!(ffi.dw_file_version_ms, 0);
        assert_eq!(ffi.dw_file_date_ls, 0);
    }

    #[test]
    fn round_trips_through_bytes() {
        let ffi = FixedFileInfo {
            dw_file_version_ms: 0x0001_0002,
            dw_file_version_ls: 0x0003_0004,
            ..FixedFileInfo::stamped_zero()
        };
        let bytes = ffi.to_bytes();
        assert_eq!(bytes.len(), FFI_SIZE);
        assert_eq!(FixedFileInfo::from_bytes(&bytes), ffi);
    }

    #[test]
    fn stamping_overrides_caller_supplied_signature() {
        let ffi = FixedFileInfo {
            dw_signature: 0,
            dw_struc_version: 0,
            ..Default::default()
        }
        .stamped();
        assert_eq!(ffi.dw_signature, FFI_SIGNATURE);
        assert_eq!(ffi.dw_struc_version, FFI_STRUC_VERSION);
    }
}
