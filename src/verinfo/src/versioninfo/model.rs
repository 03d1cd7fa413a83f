//! The `VS_VERSIONINFO` semantic overlay: a thin layer over a [`VarRecTree`]
//! that enforces the required interior nodes and exposes typed operations on
//! fixed file info, translations, string tables, and strings.

use log::trace;

use crate::config::Config;
use crate::error::{Result, VarRecError};
use crate::stream::ByteStream;
use crate::varrec::codec::{read_tree, write_tree};
use crate::varrec::dialect::Dialect;
use crate::varrec::key::{decode_text, encode_key};
use crate::varrec::node::{DataType, NodeId, VarRecTree};

use super::ffi::FixedFileInfo;
use super::translation::{self, SENTINEL};

const ROOT_NAME: &str = "VS_VERSION_INFO";
const VAR_FILE_INFO: &str = "VarFileInfo";
const TRANSLATION: &str = "Translation";
const STRING_FILE_INFO: &str = "StringFileInfo";

/// A `VS_VERSIONINFO` tree, read from or destined for a raw byte stream.
pub struct VersionInfo {
    tree: VarRecTree,
    config: Config,
}

impl VersionInfo {
    /// Creates an empty, required-shape-complete model in the given dialect.
    pub fn new(dialect: Dialect) -> Self {
        Self::with_config(dialect, Config::default())
    }

    pub fn with_config(dialect: Dialect, config: Config) -> Self {
        let mut model = VersionInfo {
            tree: VarRecTree::new(dialect, ROOT_NAME),
            config,
        };
        model.set_fixed_file_info(FixedFileInfo::stamped_zero());
        model.ensure_required_shape();
        model
    }

    pub fn dialect(&self) -> Dialect {
        self.tree.dialect()
    }

    /// Clears the tree back to an empty required-shape model with a zeroed,
    /// stamped FFI.
    pub fn reset(&mut self) {
        let root = self.tree.root();
        self.tree.clear_children(root);
        self.tree.node_mut(root).name = ROOT_NAME.to_string();
        self.set_fixed_file_info(FixedFileInfo::stamped_zero());
        self.ensure_required_shape();
    }

    /// Ensures `VarFileInfo`, `VarFileInfo/Translation`, and `StringFileInfo`
    /// exist, creating any missing ones with empty values. Called on
    /// construction, on `reset()`, and after every `read_from_stream`.
    fn ensure_required_shape(&mut self) {
        let root = self.tree.root();
        self.tree.node_mut(root).name = ROOT_NAME.to_string();

        let var_file_info = match self.tree.find_child_ci(root, VAR_FILE_INFO) {
            Some(id) => id,
            None => {
                trace!("creating missing {VAR_FILE_INFO} node");
                self.tree.add_child(root, VAR_FILE_INFO, DataType::Binary)
            }
        };

        if self.tree.find_child_ci(var_file_info, TRANSLATION).is_none() {
            trace!("creating missing {TRANSLATION} node");
            self.tree
                .add_child(var_file_info, TRANSLATION, DataType::Binary);
        }

        if self.tree.find_child_ci(root, STRING_FILE_INFO).is_none() {
            trace!("creating missing {STRING_FILE_INFO} node");
            self.tree.add_child(root, STRING_FILE_INFO, DataType::Binary);
        }
    }

    fn var_file_info_node(&self) -> NodeId {
        self.tree
            .find_child_ci(self.tree.root(), VAR_FILE_INFO)
            .expect("VarFileInfo is a required-shape invariant")
    }

    fn translation_node(&self) -> NodeId {
        self.tree
            .find_child_ci(self.var_file_info_node(), TRANSLATION)
            .expect("Translation is a required-shape invariant")
    }

    fn string_file_info_node(&self) -> NodeId {
        self.tree
            .find_child_ci(self.tree.root(), STRING_FILE_INFO)
            .expect("StringFileInfo is a required-shape invariant")
    }

    // ---------------------------------------------------------------- I/O

    /// Parses `stream` into this model, replacing any prior content. Fails
    /// with [`VarRecError::Empty`] if no bytes remain at the stream's current
    /// position.
    pub fn read_from_stream(&mut self, stream: &mut dyn ByteStream) -> Result<()> {
        let tree = read_tree(stream, self.dialect(), &self.config)?;
        self.tree = tree;
        self.ensure_required_shape();
        Ok(())
    }

    /// Serializes this model to `stream`, starting at its current position.
    pub fn write_to_stream(&self, stream: &mut dyn ByteStream) -> Result<()> {
        write_tree(&self.tree, stream)
    }

    // --------------------------------------------------------------- FFI

    pub fn get_fixed_file_info(&self) -> FixedFileInfo {
        match &self.tree.node(self.tree.root()).value {
            Some(bytes) => FixedFileInfo::from_bytes(bytes),
            None => FixedFileInfo::stamped_zero(),
        }
    }

    /// Stamps `ffi`'s signature and struct-version before storing it into
    /// the root node's value.
    pub fn set_fixed_file_info(&mut self, ffi: FixedFileInfo) {
        let root = self.tree.root();
        self.tree.node_mut(root).value = Some(ffi.stamped().to_bytes().to_vec());
    }

    // --------------------------------------------------------- Translations

    fn translation_bytes(&self) -> &[u8] {
        self.tree
            .node(self.translation_node())
            .value
            .as_deref()
            .unwrap_or(&[])
    }

    pub fn translation_count(&self) -> usize {
        self.translation_bytes().len() / 4
    }

    fn translation_code_at(&self, index: usize) -> Result<u32> {
        let count = self.translation_count();
        if index >= count {
            return Err(VarRecError::index_out_of_bounds(index, count));
        }
        let bytes = self.translation_bytes();
        Ok(u32::from_le_bytes(
            bytes[index * 4..index * 4 + 4].try_into().unwrap(),
        ))
    }

    pub fn translation_language_id(&self, index: usize) -> Result<u16> {
        Ok(translation::unpack(self.translation_code_at(index)?).0)
    }

    pub fn translation_charset(&self, index: usize) -> Result<u16> {
        Ok(translation::unpack(self.translation_code_at(index)?).1)
    }

    pub fn translation_string(&self, index: usize) -> Result<String> {
        let (lang, cs) = translation::unpack(self.translation_code_at(index)?);
        Ok(translation::format_trans_string(lang, cs))
    }

    /// `lang == 0xFFFF` or `cs == 0xFFFF` leaves that half of the pair
    /// unchanged.
    pub fn set_translation(&mut self, index: usize, lang: u16, cs: u16) -> Result<()> {
        let (old_lang, old_cs) = translation::unpack(self.translation_code_at(index)?);
        let new_lang = if lang == SENTINEL { old_lang } else { lang };
        let new_cs = if cs == SENTINEL { old_cs } else { cs };
        let code = translation::pack(new_lang, new_cs);

        let node = self.tree.node_mut(self.translation_node());
        let value = node.value.get_or_insert_with(Vec::new);
        value[index * 4..index * 4 + 4].copy_from_slice(&code.to_le_bytes());
        Ok(())
    }

    /// `lang == 0xFFFF` or `cs == 0xFFFF` is treated as 0.
    pub fn add_translation(&mut self, lang: u16, cs: u16) -> usize {
        let lang = if lang == SENTINEL { 0 } else { lang };
        let cs = if cs == SENTINEL { 0 } else { cs };
        let code = translation::pack(lang, cs);
        let new_index = self.translation_count();

        let node = self.tree.node_mut(self.translation_node());
        let value = node.value.get_or_insert_with(Vec::new);
        value.extend_from_slice(&code.to_le_bytes());
        new_index
    }

    pub fn delete_translation(&mut self, index: usize) -> Result<()> {
        let count = self.translation_count();
        if index >= count {
            return Err(VarRecError::index_out_of_bounds(index, count));
        }
        let node = self.tree.node_mut(self.translation_node());
        let value = node.value.get_or_insert_with(Vec::new);
        value.drain(index * 4..index * 4 + 4);
        Ok(())
    }

    pub fn index_of_translation(&self, lang: u16, cs: u16) -> Option<usize> {
        let target = translation::pack(lang, cs);
        (0..self.translation_count()).find(|&i| self.translation_code_at(i).unwrap() == target)
    }

    // -------------------------------------------------------- String tables

    fn string_table_id_at(&self, index: usize) -> Result<NodeId> {
        let count = self.string_table_count();
        if index >= count {
            return Err(VarRecError::index_out_of_bounds(index, count));
        }
        Ok(self.tree.child_at(self.string_file_info_node(), index))
    }

    pub fn string_table_count(&self) -> usize {
        self.tree.child_count(self.string_file_info_node())
    }

    pub fn string_table_trans_string(&self, index: usize) -> Result<String> {
        Ok(self.tree.node(self.string_table_id_at(index)?).name.clone())
    }

    pub fn string_table_language_id(&self, index: usize) -> Result<u16> {
        let name = self.string_table_trans_string(index)?;
        Ok(translation::parse_trans_string(&name)?.0)
    }

    pub fn string_table_charset(&self, index: usize) -> Result<u16> {
        let name = self.string_table_trans_string(index)?;
        Ok(translation::parse_trans_string(&name)?.1)
    }

    pub fn add_string_table(&mut self, trans_str: &str) -> usize {
        let sfi = self.string_file_info_node();
        let new_index = self.tree.child_count(sfi);
        self.tree.add_child(sfi, trans_str, DataType::Binary);
        new_index
    }

    pub fn add_string_table_by_trans(&mut self, lang: u16, cs: u16) -> usize {
        self.add_string_table(&translation::format_trans_string(lang, cs))
    }

    pub fn delete_string_table(&mut self, index: usize) -> Result<()> {
        self.string_table_id_at(index)?;
        let sfi = self.string_file_info_node();
        self.tree.remove_child_at(sfi, index);
        Ok(())
    }

    pub fn index_of_string_table(&self, trans_str: &str) -> Option<usize> {
        let sfi = self.string_file_info_node();
        (0..self.tree.child_count(sfi))
            .find(|&i| self.tree.node(self.tree.child_at(sfi, i)).name.eq_ignore_ascii_case(trans_str))
    }

    pub fn index_of_string_table_by_trans(&self, lang: u16, cs: u16) -> Option<usize> {
        self.index_of_string_table(&translation::format_trans_string(lang, cs))
    }

    // -------------------------------------------------------------- Strings

    pub fn string_count(&self, table: usize) -> Result<usize> {
        Ok(self.tree.child_count(self.string_table_id_at(table)?))
    }

    fn string_id_at(&self, table: usize, index: usize) -> Result<NodeId> {
        let count = self.string_count(table)?;
        if index >= count {
            return Err(VarRecError::index_out_of_bounds(index, count));
        }
        Ok(self.tree.child_at(self.string_table_id_at(table)?, index))
    }

    pub fn string_name(&self, table: usize, index: usize) -> Result<String> {
        Ok(self.tree.node(self.string_id_at(table, index)?).name.clone())
    }

    pub fn string_value(&self, table: usize, index: usize) -> Result<String> {
        let id = self.string_id_at(table, index)?;
        let bytes = self.tree.node(id).value.as_deref().unwrap_or(&[]);
        Ok(decode_text(bytes, self.dialect()))
    }

    pub fn index_of_string(&self, table: usize, name: &str) -> Result<Option<usize>> {
        let table_id = self.string_table_id_at(table)?;
        let count = self.tree.child_count(table_id);
        Ok((0..count).find(|&i| {
            self.tree
                .node(self.tree.child_at(table_id, i))
                .name
                .eq_ignore_ascii_case(name)
        }))
    }

    pub fn string_value_by_name(&self, table: usize, name: &str) -> Result<String> {
        let index = self
            .index_of_string(table, name)?
            .ok_or_else(|| VarRecError::unknown_name(name))?;
        self.string_value(table, index)
    }

    /// Fails with [`VarRecError::DuplicateName`] if `name` already exists in
    /// the table.
    pub fn add_string(&mut self, table: usize, name: &str, value: &str) -> Result<usize> {
        let table_id = self.string_table_id_at(table)?;
        if self.index_of_string(table, name)?.is_some() {
            return Err(VarRecError::duplicate_name(name));
        }
        let new_index = self.tree.child_count(table_id);
        let child = self.tree.add_child(table_id, name, DataType::Text);
        self.tree.node_mut(child).value = Some(encode_key(value, self.dialect()));
        Ok(new_index)
    }

    pub fn add_or_update_string(&mut self, table: usize, name: &str, value: &str) -> Result<usize> {
        match self.index_of_string(table, name)? {
            Some(index) => {
                self.set_string_value(table, index, value)?;
                Ok(index)
            }
            None => self.add_string(table, name, value),
        }
    }

    pub fn set_string_value(&mut self, table: usize, index: usize, value: &str) -> Result<()> {
        let id = self.string_id_at(table, index)?;
        let dialect = self.dialect();
        self.tree.node_mut(id).value = Some(encode_key(value, dialect));
        Ok(())
    }

    pub fn set_string_value_by_name(&mut self, table: usize, name: &str, value: &str) -> Result<()> {
        let index = self
            .index_of_string(table, name)?
            .ok_or_else(|| VarRecError::unknown_name(name))?;
        self.set_string_value(table, index, value)
    }

    pub fn delete_string(&mut self, table: usize, index: usize) -> Result<()> {
        let table_id = self.string_table_id_at(table)?;
        self.string_id_at(table, index)?;
        self.tree.remove_child_at(table_id, index);
        Ok(())
    }

    pub fn delete_string_by_name(&mut self, table: usize, name: &str) -> Result<()> {
        let index = self
            .index_of_string(table, name)?
            .ok_or_else(|| VarRecError::unknown_name(name))?;
        self.delete_string(table, index)
    }

    // --------------------------------------------------------------- assign

    /// Clears `self` and copies `source`'s FFI, translations, and string
    /// tables (with their strings) in order. This is the dialect-conversion
    /// primitive: feed a 16-bit-dialect source into a 32-bit-dialect target
    /// (or vice versa) to re-encode every key and string.
    pub fn assign(&mut self, source: &VersionInfo) {
        self.reset();
        self.set_fixed_file_info(source.get_fixed_file_info());

        for i in 0..source.translation_count() {
            let lang = source.translation_language_id(i).unwrap();
            let cs = source.translation_charset(i).unwrap();
            self.add_translation(lang, cs);
        }

        for t in 0..source.string_table_count() {
            let trans_str = source.string_table_trans_string(t).unwrap();
            let new_table = self.add_string_table(&trans_str);
            for s in 0..source.string_count(t).unwrap() {
                let name = source.string_name(t, s).unwrap();
                let value = source.string_value(t, s).unwrap();
                self.add_string(new_table, &name, &value)
                    .expect("freshly reset table cannot contain duplicates");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    // S1: empty round trip.
    #[test]
    fn s1_empty_round_trip() {
        let mut model = VersionInfo::new(Dialect::Wide32);
        model.reset();

        let mut buf = Cursor::new(Vec::new());
        model.write_to_stream(&mut buf).unwrap();

        buf.set_position(0);
        let mut reparsed = VersionInfo::new(Dialect::Wide32);
        reparsed.read_from_stream(&mut buf).unwrap();

        assert_eq!(reparsed.translation_count(), 0);
        assert_eq!(reparsed.string_table_count(), 0);
        assert_eq!(reparsed.get_fixed_file_info().dw_signature, 0xFEEF_04BD);
    }

    // S2: single translation.
    #[test]
    fn s2_single_translation() {
        let mut model = VersionInfo::new(Dialect::Wide32);
        assert_eq!(model.add_translation(0x0809, 0x04B0), 0);
        assert_eq!(model.translation_string(0).unwrap(), "080904B0");
        assert_eq!(model.index_of_translation(0x0809, 0x04B0), Some(0));
        assert_eq!(model.index_of_translation(0x0409, 0x04B0), None);
    }

    // S3: string table with strings.
    #[test]
    fn s3_string_table_with_strings() {
        let mut model = VersionInfo::new(Dialect::Wide32);
        model.add_translation(0x0809, 0x04B0);
        let table = model.add_string_table_by_trans(0x0809, 0x04B0);
        assert_eq!(model.add_string(table, "CompanyName", "Acme Ltd").unwrap(), 0);
        assert_eq!(model.add_string(table, "FileVersion", "1.2.3.4").unwrap(), 1);

        let mut buf = Cursor::new(Vec::new());
        model.write_to_stream(&mut buf).unwrap();
        buf.set_position(0);

        let mut reparsed = VersionInfo::new(Dialect::Wide32);
        reparsed.read_from_stream(&mut buf).unwrap();

        assert_eq!(reparsed.string_count(table).unwrap(), 2);
        assert_eq!(reparsed.string_name(table, 0).unwrap(), "CompanyName");
        assert_eq!(reparsed.string_value(table, 0).unwrap(), "Acme Ltd");
        assert_eq!(reparsed.string_name(table, 1).unwrap(), "FileVersion");
        assert_eq!(
            reparsed.string_value_by_name(table, "FileVersion").unwrap(),
            "1.2.3.4"
        );
    }

    // S4 is exercised directly against the codec in `varrec::codec::tests`,
    // since it hand-crafts raw record bytes rather than going through the
    // model's builder API.

    // S5: dialect conversion.
    #[test]
    fn s5_dialect_conversion() {
        let mut source = VersionInfo::new(Dialect::Ansi16);
        source.add_translation(0x0409, 0x04E4);
        let table = source.add_string_table_by_trans(0x0409, 0x04E4);
        source.add_string(table, "ProductName", "Widget").unwrap();

        let mut target = VersionInfo::new(Dialect::Wide32);
        target.assign(&source);

        assert_eq!(target.get_fixed_file_info(), source.get_fixed_file_info());
        assert_eq!(target.translation_count(), source.translation_count());
        assert_eq!(
            target.translation_string(0).unwrap(),
            source.translation_string(0).unwrap()
        );
        assert_eq!(target.string_table_count(), source.string_table_count());
        assert_eq!(
            target.string_table_trans_string(0).unwrap(),
            source.string_table_trans_string(0).unwrap()
        );
        assert_eq!(
            target.string_value_by_name(0, "ProductName").unwrap(),
            "Widget"
        );

        // Serialized form is 32-bit framed: wType field present, UTF-16 key.
        let mut buf = Cursor::new(Vec::new());
        target.write_to_stream(&mut buf).unwrap();
        let bytes = buf.into_inner();
        // wLength, wValueLength, wType, then UTF-16 "VS_VERSION_INFO" + NUL.
        let key_bytes: Vec<u8> = ROOT_NAME.encode_utf16().flat_map(u16::to_le_bytes).collect();
        assert_eq!(&bytes[6..6 + key_bytes.len()], key_bytes.as_slice());
    }

    // S6: delete semantics.
    #[test]
    fn s6_delete_semantics() {
        let mut model = VersionInfo::new(Dialect::Wide32);
        model.add_translation(0x0409, 0x0000);
        model.add_translation(0x0809, 0x04B0);
        model.add_translation(0x0C0A, 0x04E4);

        model.delete_translation(1).unwrap();

        assert_eq!(model.translation_count(), 2);
        assert_eq!(model.translation_language_id(0).unwrap(), 0x0409);
        assert_eq!(model.translation_language_id(1).unwrap(), 0x0C0A);
    }

    #[test]
    fn set_fixed_file_info_always_stamps() {
        let mut model = VersionInfo::new(Dialect::Wide32);
        let mut ffi = FixedFileInfo::default();
        ffi.dw_file_version_ms = 7;
        model.set_fixed_file_info(ffi);

        let got = model.get_fixed_file_info();
        assert_eq!(got.dw_signature, 0xFEEF_04BD);
        assert_eq!(got.dw_struc_version, 0x0001_0000);
        assert_eq!(got.dw_file_version_ms, 7);
    }

    #[test]
    fn out_of_range_translation_index_is_bounds_error() {
        let model = VersionInfo::new(Dialect::Wide32);
        let err = model.translation_language_id(0).unwrap_err();
        assert!(matches!(err, VarRecError::IndexOutOfBounds { index: 0, len: 0 }));
    }

    #[test]
    fn duplicate_string_name_is_rejected() {
        let mut model = VersionInfo::new(Dialect::Wide32);
        let table = model.add_string_table_by_trans(0x0409, 0x04B0);
        model.add_string(table, "CompanyName", "Acme").unwrap();
        let err = model.add_string(table, "CompanyName", "Other").unwrap_err();
        assert!(matches!(err, VarRecError::DuplicateName { .. }));
    }

    #[test]
    fn add_or_update_string_updates_existing_without_duplicating() {
        let mut model = VersionInfo::new(Dialect::Wide32);
        let table = model.add_string_table_by_trans(0x0409, 0x04B0);
        model.add_or_update_string(table, "CompanyName", "Acme").unwrap();
        model.add_or_update_string(table, "CompanyName", "Acme2").unwrap();

        assert_eq!(model.string_count(table).unwrap(), 1);
        assert_eq!(
            model.string_value_by_name(table, "CompanyName").unwrap(),
            "Acme2"
        );
    }

    #[test]
    fn delete_string_by_name_on_missing_name_is_unknown_name() {
        let mut model = VersionInfo::new(Dialect::Wide32);
        let table = model.add_string_table_by_trans(0x0409, 0x04B0);
        let err = model.delete_string_by_name(table, "Nope").unwrap_err();
        assert!(matches!(err, VarRecError::UnknownName { .. }));
    }

    // reset() leaves exactly one required-shape path and a
    // stamped all-zero FFI.
    #[test]
    fn reset_yields_exactly_one_required_shape_path() {
        let mut model = VersionInfo::new(Dialect::Wide32);
        model.add_translation(0x0409, 0x04B0);
        let table = model.add_string_table_by_trans(0x0409, 0x04B0);
        model.add_string(table, "CompanyName", "Acme").unwrap();

        model.reset();

        assert_eq!(model.translation_count(), 0);
        assert_eq!(model.string_table_count(), 0);
        let ffi = model.get_fixed_file_info();
        assert_eq!(
            ffi,
            FixedFileInfo {
                dw_signature: 0xFEEF_04BD,
                dw_struc_version: 0x0001_0000,
                ..Default::default()
            }
        );
    }

    // Re-serializing a parsed tree is idempotent.
    #[test]
    fn reserialize_after_parse_is_idempotent() {
        let mut model = VersionInfo::new(Dialect::Wide32);
        model.add_translation(0x0809, 0x04B0);
        let table = model.add_string_table_by_trans(0x0809, 0x04B0);
        model.add_string(table, "CompanyName", "Acme Ltd").unwrap();

        let mut first = Cursor::new(Vec::new());
        model.write_to_stream(&mut first).unwrap();
        let first_bytes = first.into_inner();

        let mut reparsed = VersionInfo::new(Dialect::Wide32);
        reparsed
            .read_from_stream(&mut Cursor::new(first_bytes.clone()))
            .unwrap();

        let mut second = Cursor::new(Vec::new());
        reparsed.write_to_stream(&mut second).unwrap();
        let second_bytes = second.into_inner();

        assert_eq!(first_bytes, second_bytes);
    }
}
