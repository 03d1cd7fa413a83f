/// Parse-time strictness knobs.
///
/// The wire format is self-describing and producers are known to emit
/// quirky-but-recoverable records (see [`crate::varrec::codec`]); `Config`
/// lets a host opt into stricter validation than the tolerant defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Maximum nesting depth accepted while reading a tree. Guards against
    /// pathological or adversarial input; the `VS_VERSIONINFO` schema never
    /// nests deeper than 4 (root, `StringFileInfo`, table, string).
    pub max_node_depth: usize,

    /// When `true`, non-zero bytes found in alignment padding are treated as
    /// corruption instead of being silently skipped.
    pub strict_padding: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            max_node_depth: 64,
            strict_padding: false,
        }
    }
}
