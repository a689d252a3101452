//! Scans an image for the start and end of the unique run of valid symbol
//! records.

use log::{debug, warn};

use crate::byteview::ByteView;
use crate::endian::column_test_strict;
use crate::error::{Error, Result};
use crate::record::is_structurally_valid;
use crate::version::Version;

/// Number of consecutive records a candidate offset must sustain to be
/// accepted as the start of the symbol table.
pub const WINDOW: usize = 100;

/// Bounds of the located symbol-table run, `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableBounds {
    pub start: usize,
    pub end: usize,
}

/// Whether `WINDOW` consecutive records starting at `offset` are all
/// structurally valid. Assumes the record at `offset` itself has already
/// been checked by the caller.
fn window_holds(view: &ByteView<'_>, offset: usize, version: Version) -> bool {
    let width = version.record_width();
    let needed = width * WINDOW;
    if offset + needed > view.len() {
        return false;
    }
    for i in 0..WINDOW {
        let rec_offset = offset + i * width;
        let record = match view.slice(rec_offset, width) {
            Ok(r) => r,
            Err(_) => return false,
        };
        if !is_structurally_valid(record, version) {
            return false;
        }
    }
    true
}

/// Locate the unique symbol table run. Returns its bounds together with the
/// provisional endianness the V5 column test resolved during acceptance (V6
/// has no such provisional verdict; endianness is decided later by
/// [`crate::endian::probe`]).
pub fn locate(view: &ByteView<'_>, version: Version) -> Result<(TableBounds, Option<bool>)> {
    let width = version.record_width();
    if view.len() < width * WINDOW {
        warn!("image shorter than one window of records; no symbol table possible");
        return Err(Error::NoSymbolTable);
    }

    let mut start = None;
    let mut endian_hint = None;

    let mut offset = 0;
    while offset + width <= view.len() {
        let record = view.slice(offset, width)?;
        if !is_structurally_valid(record, version) {
            offset += 1;
            continue;
        }
        if !window_holds(view, offset, version) {
            offset += 1;
            continue;
        }

        if version == Version::V5 {
            match column_test_strict(view, offset, version, 9)? {
                Some(big_endian) => {
                    debug!("accepted V5 symbol table window at {offset:#x}, big_endian={big_endian}");
                    start = Some(offset);
                    endian_hint = Some(big_endian);
                    break;
                }
                None => {
                    // Ambiguous column test: this window is rejected, keep scanning.
                    offset += 1;
                    continue;
                }
            }
        } else {
            debug!("accepted V6 symbol table window at {offset:#x}");
            start = Some(offset);
            break;
        }
    }

    let start = match start {
        Some(s) => s,
        None => {
            warn!("no offset produced a valid {WINDOW}-record window");
            return Err(Error::NoSymbolTable);
        }
    };

    let mut end = start;
    while end + width <= view.len() {
        let record = view.slice(end, width)?;
        if !is_structurally_valid(record, version) {
            break;
        }
        end += width;
    }

    debug!("symbol table spans [{start:#x}, {end:#x})");
    Ok((TableBounds { start, end }, endian_hint))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v5_record(name_ptr: u32, value: u32, type_code: u8) -> [u8; 16] {
        let mut r = [0u8; 16];
        r[4..8].copy_from_slice(&name_ptr.to_be_bytes());
        r[8..12].copy_from_slice(&value.to_be_bytes());
        r[14] = type_code;
        r
    }

    fn build_v5_table(count: usize) -> Vec<u8> {
        let mut image = Vec::new();
        for i in 0..count {
            image.extend(v5_record(0x1000 + i as u32 * 8, 0x2000 + i as u32, 0x05));
        }
        image
    }

    #[test]
    fn locates_table_spanning_the_whole_image() {
        let image = build_v5_table(150);
        let view = ByteView::new(&image);
        let (bounds, hint) = locate(&view, Version::V5).unwrap();
        assert_eq!(bounds.start, 0);
        assert_eq!(bounds.end, image.len());
        assert_eq!(hint, Some(true));
    }

    #[test]
    fn skips_leading_junk_that_fails_the_window_test() {
        // One plausible-looking record followed by garbage, then the real table.
        let mut image = v5_record(0x1000, 0x2000, 0x05).to_vec();
        image.extend(std::iter::repeat(0xFFu8).take(16));
        let real_table = build_v5_table(150);
        let junk_len = image.len();
        image.extend(real_table);
        let view = ByteView::new(&image);
        let (bounds, _) = locate(&view, Version::V5).unwrap();
        assert!(bounds.start >= junk_len);
    }

    #[test]
    fn truncates_at_first_invalid_record() {
        let mut image = build_v5_table(150);
        // Corrupt the type byte of record 120.
        let bad_offset = 120 * 16 + 14;
        image[bad_offset] = 0xFF;
        let view = ByteView::new(&image);
        let (bounds, _) = locate(&view, Version::V5).unwrap();
        assert_eq!(bounds.end, 120 * 16);
    }

    #[test]
    fn short_image_has_no_symbol_table() {
        let image = vec![0u8; 16 * 10];
        let view = ByteView::new(&image);
        assert_eq!(locate(&view, Version::V5), Err(Error::NoSymbolTable));
    }
}
