//! Binary read/write for a [`VarRecTree`]: a
//! `wLength`/`wValueLength`(/`wType`)/key header, DWORD-aligned padding
//! around the value, and contiguous, individually-padded children.

use log::{debug, trace};

use crate::config::Config;
use crate::error::{Result, VarRecError};
use crate::stream::ByteStream;
use crate::varrec::dialect::Dialect;
use crate::varrec::key::{encode_key, read_key};
use crate::varrec::node::{DataType, NodeId, VarRecTree};

fn pad_to_dword(n: usize) -> usize {
    (4 - (n % 4)) % 4
}

fn skip_padding(stream: &mut dyn ByteStream, len: usize, strict: bool) -> Result<()> {
    if len == 0 {
        return Ok(());
    }
    let mut buf = vec![0u8; len];
    stream
        .read_exact(&mut buf)
        .map_err(|e| VarRecError::corrupt(format!("truncated padding: {e}")))?;
    if strict && buf.iter().any(|&b| b != 0) {
        return Err(VarRecError::corrupt("non-zero padding byte"));
    }
    Ok(())
}

fn write_padding(stream: &mut dyn ByteStream, len: usize) -> Result<()> {
    if len == 0 {
        return Ok(());
    }
    stream.write_exact(&vec![0u8; len])?;
    Ok(())
}

/// Reads one full `VarRecTree`, starting at the current stream position `P`.
///
/// Returns [`VarRecError::Empty`] if no bytes remain at `P`.
pub fn read_tree(
    stream: &mut dyn ByteStream,
    dialect: Dialect,
    config: &Config,
) -> Result<VarRecTree> {
    let start = stream.position()?;
    if stream.len()? <= start {
        return Err(VarRecError::Empty);
    }
    trace!("reading VarRec tree (dialect = {dialect:?})");

    let mut tree = VarRecTree::new(dialect, "");
    let root = tree.root();
    read_node_into(stream, &mut tree, root, dialect, 0, config)?;
    trace!("finished reading VarRec tree");
    Ok(tree)
}

/// Writes the full tree starting at the stream's current position. The
/// cursor ends at end-of-stream.
pub fn write_tree(tree: &VarRecTree, stream: &mut dyn ByteStream) -> Result<()> {
    trace!("writing VarRec tree (dialect = {:?})", tree.dialect());
    write_node(tree, tree.root(), stream)?;
    trace!("finished writing VarRec tree");
    Ok(())
}

fn read_node_into(
    stream: &mut dyn ByteStream,
    tree: &mut VarRecTree,
    node_id: NodeId,
    dialect: Dialect,
    depth: usize,
    config: &Config,
) -> Result<u64> {
    if depth > config.max_node_depth {
        return Err(VarRecError::corrupt("max node depth exceeded"));
    }

    let record_start = stream.position()?;
    let wlength = stream
        .read_u16_le()
        .map_err(|e| VarRecError::corrupt(format!("truncated wLength: {e}")))?;
    let wvaluelength = stream
        .read_u16_le()
        .map_err(|e| VarRecError::corrupt(format!("truncated wValueLength: {e}")))?;

    let data_type = if dialect.has_type_field() {
        match stream
            .read_u16_le()
            .map_err(|e| VarRecError::corrupt(format!("truncated wType: {e}")))?
        {
            0 => DataType::Binary,
            1 => DataType::Text,
            other => {
                return Err(VarRecError::corrupt(format!(
                    "invalid wType {other}, expected 0 or 1"
                )))
            }
        }
    } else {
        DataType::Binary
    };

    let (key, key_len) = read_key(stream, dialect)?;

    let header_size = 2 + 2 + if dialect.has_type_field() { 2 } else { 0 } + key_len;
    let header_pad = pad_to_dword(header_size);
    skip_padding(stream, header_pad, config.strict_padding)?;

    tree.node_mut(node_id).name = key;
    tree.node_mut(node_id).data_type = data_type;

    match data_type {
        DataType::Binary => {
            let value_byte_size = wvaluelength as usize;
            let mut value = vec![0u8; value_byte_size];
            stream
                .read_exact(&mut value)
                .map_err(|e| VarRecError::corrupt(format!("truncated value: {e}")))?;
            tree.node_mut(node_id).value = if value_byte_size > 0 { Some(value) } else { None };

            let value_pad = pad_to_dword(value_byte_size);
            skip_padding(stream, value_pad, config.strict_padding)?;

            let header_total = header_size + header_pad;
            let children_offset = header_total + value_byte_size + value_pad;
            if children_offset > wlength as usize {
                return Err(VarRecError::corrupt(format!(
                    "record header/value span ({children_offset}) exceeds wLength ({wlength})"
                )));
            }
            let children_size = wlength as usize - children_offset;

            if children_size > 0 {
                stream.seek_to(record_start + children_offset as u64)?;
                let mut accumulated = 0usize;
                while accumulated < children_size {
                    let child_id = tree.add_child(node_id, "", DataType::Binary);
                    let outer =
                        read_node_into(stream, tree, child_id, dialect, depth + 1, config)?;
                    accumulated += outer as usize;
                }
            }
        }
        DataType::Text => {
            // wValueLength is untrustworthy for TEXT: some producers write
            // character count, some byte count, some garbage. Recover the
            // real string by scanning for the UTF-16 NUL terminator instead.
            if wvaluelength as usize != 0 {
                debug!(
                    "TEXT node {:?}: trusting NUL scan over wValueLength={wvaluelength}",
                    tree.node(node_id).name
                );
            }
            let mut units: Vec<u8> = Vec::new();
            loop {
                let unit = stream
                    .read_u16_le()
                    .map_err(|e| VarRecError::corrupt(format!("unterminated TEXT value: {e}")))?;
                units.extend_from_slice(&unit.to_le_bytes());
                if unit == 0 {
                    break;
                }
            }
            tree.node_mut(node_id).value = Some(units);
            // A TEXT node has no children by definition (see module docs).
        }
    }

    let outer = wlength as u64 + pad_to_dword(wlength as usize) as u64;
    stream.seek_to(record_start + outer)?;
    Ok(outer)
}

fn write_node(tree: &VarRecTree, id: NodeId, stream: &mut dyn ByteStream) -> Result<()> {
    let node = tree.node(id);
    let dialect = tree.dialect();
    let record_start = stream.position()?;

    // 1. wLength placeholder.
    stream.write_u16_le(0)?;

    let value_byte_size = node.value.as_ref().map_or(0, |v| v.len());
    let wvaluelength: u16 = if node.data_type == DataType::Text && dialect.has_type_field() {
        (value_byte_size / 2) as u16
    } else {
        value_byte_size as u16
    };
    stream.write_u16_le(wvaluelength)?;

    if dialect.has_type_field() {
        stream.write_u16_le(node.data_type as u16)?;
    }

    let key_bytes = encode_key(&node.name, dialect);
    stream.write_exact(&key_bytes)?;

    let header_size = (stream.position()? - record_start) as usize;
    write_padding(stream, pad_to_dword(header_size))?;

    if let Some(value) = &node.value {
        stream.write_exact(value)?;
    }
    write_padding(stream, pad_to_dword(value_byte_size))?;

    for &child in &tree.node(id).children {
        write_node(tree, child, stream)?;
    }

    let record_end = stream.position()?;
    let wlength = (record_end - record_start) as u64;
    if wlength > u16::MAX as u64 {
        return Err(VarRecError::corrupt(format!(
            "record length {wlength} exceeds u16::MAX"
        )));
    }
    stream.seek_to(record_start)?;
    stream.write_u16_le(wlength as u16)?;
    stream.seek_to(record_end)?;

    write_padding(stream, pad_to_dword(wlength as usize))?;

    Ok(())
}
