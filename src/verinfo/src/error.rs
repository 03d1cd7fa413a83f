use thiserror::Error;

/// Error taxonomy shared by the VarRec codec and the version-info model.
#[derive(Debug, Error)]
pub enum VarRecError {
    /// No bytes remained at the stream's current position at the time of
    /// `read_from_stream`.
    #[error("version information stream is empty")]
    Empty,

    /// An I/O failure, or a structural inconsistency in the record tree
    /// (child bytes overflow the parent, NUL terminator not found before
    /// end-of-stream, length prefix does not fit its claimed span, ...).
    #[error("corrupt version information: {reason}")]
    Corrupt { reason: String },

    /// An enumeration index fell outside `[0, len)`.
    #[error("index {index} out of bounds (len {len})")]
    IndexOutOfBounds { index: usize, len: usize },

    /// A named lookup found no matching entry.
    #[error("unknown name: {name}")]
    UnknownName { name: String },

    /// `add_string` was called with a name already present in the target table.
    #[error("duplicate name: {name}")]
    DuplicateName { name: String },
}

impl From<std::io::Error> for VarRecError {
    fn from(err: std::io::Error) -> Self {
        VarRecError::Corrupt {
            reason: err.to_string(),
        }
    }
}

impl VarRecError {
    pub(crate) fn corrupt(reason: impl Into<String>) -> Self {
        VarRecError::Corrupt {
            reason: reason.into(),
        }
    }

    pub(crate) fn index_out_of_bounds(index: usize, len: usize) -> Self {
        VarRecError::IndexOutOfBounds { index, len }
    }

    pub(crate) fn unknown_name(name: impl Into<String>) -> Self {
        VarRecError::UnknownName { name: name.into() }
    }

    pub(crate) fn duplicate_name(name: impl Into<String>) -> Self {
        VarRecError::DuplicateName { name: name.into() }
    }
}

pub type Result<T> = std::result::Result<T, VarRecError>;
