//! Version-parameterized parser and structural validator for one fixed-width
//! symbol record.

use log::trace;

use crate::byteview::ByteView;
use crate::error::Result;
use crate::version::Version;

/// One parsed symbol-table entry, still addressed by target virtual
/// addresses rather than resolved names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SymbolRecord {
    /// Image offset this record was read from.
    pub offset: usize,
    /// Target-endian name pointer (a virtual address into the string pool).
    pub name_ptr: u32,
    /// Target-endian value (the symbol's resolved virtual address).
    pub value: u32,
    /// Raw type byte; meaning depends on [`Version`].
    pub type_code: u8,
}

/// Structural validity check, endianness-agnostic: every test here operates
/// on fixed byte positions rather than an endian-interpreted integer, so it
/// can run before endianness is known.
pub fn is_structurally_valid(record: &[u8], version: Version) -> bool {
    let width = version.record_width();
    if record.len() != width {
        return false;
    }

    let type_code = record[version.type_offset()];
    if !version.admissible_types().contains(&type_code) {
        return false;
    }

    if record[version.pad_offset()] != 0 {
        return false;
    }

    let group = &record[version.group_offset()..version.group_offset() + 2];
    if group != [0x00, 0x00] {
        return false;
    }

    let name_ptr = &record[4..8];
    if name_ptr == [0x00, 0x00, 0x00, 0x00] {
        return false;
    }

    if version.requires_nonzero_value() {
        let value = &record[8..12];
        if value == [0x00, 0x00, 0x00, 0x00] {
            return false;
        }
    }

    true
}

/// Parse a single record at `offset`, assuming it has already passed
/// [`is_structurally_valid`].
pub fn parse(view: &ByteView<'_>, offset: usize, version: Version, big_endian: bool) -> Result<SymbolRecord> {
    let raw = view.slice(offset, version.record_width())?;
    let record = SymbolRecord {
        offset,
        name_ptr: view.u32(offset + 4, big_endian)?,
        value: view.u32(offset + 8, big_endian)?,
        type_code: raw[version.type_offset()],
    };
    trace!("parsed record at {offset:#x}: {record:?}");
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v5_record(name_ptr: u32, value: u32, type_code: u8) -> Vec<u8> {
        let mut r = vec![0u8; 16];
        r[0..4].copy_from_slice(&0u32.to_be_bytes());
        r[4..8].copy_from_slice(&name_ptr.to_be_bytes());
        r[8..12].copy_from_slice(&value.to_be_bytes());
        r[12..14].copy_from_slice(&[0, 0]);
        r[14] = type_code;
        r[15] = 0;
        r
    }

    #[test]
    fn valid_v5_record_passes() {
        let r = v5_record(0x1000, 0x2000, 0x05);
        assert!(is_structurally_valid(&r, Version::V5));
    }

    #[test]
    fn v5_requires_nonzero_value() {
        let r = v5_record(0x1000, 0x0000, 0x05);
        assert!(!is_structurally_valid(&r, Version::V5));
    }

    #[test]
    fn v6_allows_zero_value() {
        let mut r = vec![0u8; 20];
        r[4..8].copy_from_slice(&0x1000u32.to_be_bytes());
        r[8..12].copy_from_slice(&0u32.to_be_bytes());
        r[16..18].copy_from_slice(&[0, 0]);
        r[18] = 0x09;
        r[19] = 0;
        assert!(is_structurally_valid(&r, Version::V6));
    }

    #[test]
    fn bad_type_fails() {
        let r = v5_record(0x1000, 0x2000, 0xFF);
        assert!(!is_structurally_valid(&r, Version::V5));
    }

    #[test]
    fn nonzero_pad_fails() {
        let mut r = v5_record(0x1000, 0x2000, 0x05);
        r[15] = 1;
        assert!(!is_structurally_valid(&r, Version::V5));
    }

    #[test]
    fn nonzero_group_fails() {
        let mut r = v5_record(0x1000, 0x2000, 0x05);
        r[12] = 1;
        assert!(!is_structurally_valid(&r, Version::V5));
    }

    #[test]
    fn null_name_ptr_fails() {
        let r = v5_record(0x0000, 0x2000, 0x05);
        assert!(!is_structurally_valid(&r, Version::V5));
    }

    #[test]
    fn parse_reads_target_endian_fields() {
        let r = v5_record(0x1000, 0x2000, 0x05);
        let view = ByteView::new(&r);
        let parsed = parse(&view, 0, Version::V5, true).unwrap();
        assert_eq!(parsed.name_ptr, 0x1000);
        assert_eq!(parsed.value, 0x2000);
        assert_eq!(parsed.type_code, 0x05);
    }
}
