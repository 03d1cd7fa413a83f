//! Key encoding and ASCII case-fold comparison.
//!
//! Keys are ASCII by format convention; comparisons use plain ASCII
//! case-folding rather than full Unicode folding.

use super::dialect::Dialect;
use crate::error::{Result, VarRecError};
use crate::stream::ByteStream;

/// Windows-1252 code points for bytes 0x80-0x9F, the only range where cp1252
/// disagrees with Latin-1/Unicode. Bytes outside this range map straight to
/// the same-valued code point. Used as the fixed "platform default ANSI code
/// page" for the 16-bit dialect (see DESIGN.md).
const CP1252_HIGH: [char; 32] = [
    '\u{20AC}', '\u{81}', '\u{201A}', '\u{0192}', '\u{201E}', '\u{2026}', '\u{2020}', '\u{2021}',
    '\u{02C6}', '\u{2030}', '\u{0160}', '\u{2039}', '\u{0152}', '\u{8D}', '\u{017D}', '\u{8F}',
    '\u{90}', '\u{2018}', '\u{2019}', '\u{201C}', '\u{201D}', '\u{2022}', '\u{2013}', '\u{2014}',
    '\u{02DC}', '\u{2122}', '\u{0161}', '\u{203A}', '\u{0153}', '\u{9D}', '\u{017E}', '\u{0178}',
];

fn cp1252_to_char(byte: u8) -> char {
    if (0x80..=0x9F).contains(&byte) {
        CP1252_HIGH[(byte - 0x80) as usize]
    } else {
        byte as char
    }
}

/// Encodes a `char` as a cp1252 byte if it falls in cp1252's repertoire,
/// else substitutes `?` (0x3F), matching the lossy behavior of `?`-replacement
/// transcoders rather than failing the whole key/value on one stray glyph.
fn char_to_cp1252(ch: char) -> u8 {
    if (ch as u32) < 0x100 && !(0x80..=0x9F).contains(&(ch as u32)) {
        return ch as u32 as u8;
    }
    CP1252_HIGH
        .iter()
        .position(|&c| c == ch)
        .map(|i| 0x80 + i as u8)
        .unwrap_or(b'?')
}

/// Returns `true` if two keys are equal under ASCII case-fold.
pub fn key_eq_ignore_ascii_case(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b)
}

/// Encodes `key` (plus NUL terminator) in the dialect's wire encoding.
pub fn encode_key(key: &str, dialect: Dialect) -> Vec<u8> {
    match dialect {
        Dialect::Ansi16 => {
            let mut bytes: Vec<u8> = key.chars().map(char_to_cp1252).collect();
            bytes.push(0);
            bytes
        }
        Dialect::Wide32 => {
            let mut bytes = Vec::with_capacity(key.len() * 2 + 2);
            for unit in key.encode_utf16() {
                bytes.extend_from_slice(&unit.to_le_bytes());
            }
            bytes.extend_from_slice(&0u16.to_le_bytes());
            bytes
        }
    }
}

/// Decodes a NUL-terminated TEXT value buffer (as stored on a string node)
/// back into a Rust string, stripping the terminator. Uses the same
/// per-dialect code-unit width as [`encode_key`].
pub fn decode_text(bytes: &[u8], dialect: Dialect) -> String {
    match dialect {
        Dialect::Ansi16 => {
            let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
            bytes[..end].iter().map(|&b| cp1252_to_char(b)).collect()
        }
        Dialect::Wide32 => {
            let units: Vec<u16> = bytes
                .chunks_exact(2)
                .map(|c| u16::from_le_bytes([c[0], c[1]]))
                .collect();
            let end = units.iter().position(|&u| u == 0).unwrap_or(units.len());
            String::from_utf16_lossy(&units[..end])
        }
    }
}

/// Reads a NUL-terminated key in the dialect's wire encoding. Returns the
/// decoded key and the number of bytes consumed (including the terminator).
pub fn read_key(stream: &mut dyn ByteStream, dialect: Dialect) -> Result<(String, usize)> {
    match dialect {
        Dialect::Ansi16 => {
            let mut bytes = Vec::new();
            loop {
                let b = stream.read_u8().map_err(|e| {
                    VarRecError::corrupt(format!("truncated key: {e}"))
                })?;
                if b == 0 {
                    break;
                }
                bytes.push(b);
            }
            let consumed = bytes.len() + 1;
            // Keys are ASCII by convention; tolerate non-ASCII bytes rather
            // than reject them outright, matching the codec's general
            // "recover what is recoverable" posture.
            let key = bytes.iter().map(|&b| cp1252_to_char(b)).collect();
            Ok((key, consumed))
        }
        Dialect::Wide32 => {
            let mut units = Vec::new();
            loop {
                let unit = stream
                    .read_u16_le()
                    .map_err(|e| VarRecError::corrupt(format!("truncated key: {e}")))?;
                if unit == 0 {
                    break;
                }
                units.push(unit);
            }
            let consumed = units.len() * 2 + 2;
            let key = String::from_utf16_lossy(&units);
            Ok((key, consumed))
        }
    }
}
