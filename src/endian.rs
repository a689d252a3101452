//! Endianness determination from the column structure of consecutive
//! symbol records.

use log::debug;

use crate::byteview::ByteView;
use crate::error::{Error, Result};
use crate::version::Version;

/// Strict column test used by the locator to decide whether a candidate
/// window is acceptable at all. Compares the high bytes (`[4, 6)`, "big
/// endian" column) and low bytes (`[6, 8)`, "little endian" column) of the
/// name pointer across `pairs + 1` consecutive records starting at `offset`.
///
/// Returns `Ok(Some(true))`/`Ok(Some(false))` when exactly one direction is
/// consistent across every pair, `Ok(None)` when both or neither are
/// (ambiguous — the caller should reject this candidate and keep scanning).
pub fn column_test_strict(view: &ByteView<'_>, offset: usize, version: Version, pairs: usize) -> Result<Option<bool>> {
    let width = version.record_width();
    let mut big_ok = true;
    let mut little_ok = true;

    for i in 0..pairs {
        let a = view.slice(offset + i * width + 4, 2)?;
        let b = view.slice(offset + (i + 1) * width + 4, 2)?;
        if a != b {
            big_ok = false;
        }

        let a2 = view.slice(offset + i * width + 6, 2)?;
        let b2 = view.slice(offset + (i + 1) * width + 6, 2)?;
        if a2 != b2 {
            little_ok = false;
        }
    }

    Ok(match (big_ok, little_ok) {
        (true, false) => Some(true),
        (false, true) => Some(false),
        _ => None,
    })
}

/// Looser column comparison over up to `max_records` name pointers,
/// defaulting ties to little-endian (explicit, logged). Unlike [`column_test_strict`] this
/// never fails outright; it stops early if the image runs out of bytes to
/// compare.
fn column_test_loose(view: &ByteView<'_>, offset: usize, version: Version, max_records: usize) -> bool {
    let width = version.record_width();
    let pairs = max_records.saturating_sub(1);
    let mut big_ok = true;
    let mut little_ok = true;
    let mut compared = 0usize;

    for i in 0..pairs {
        let a = match view.slice(offset + i * width + 4, 2) {
            Ok(s) => s,
            Err(_) => break,
        };
        let b = match view.slice(offset + (i + 1) * width + 4, 2) {
            Ok(s) => s,
            Err(_) => break,
        };
        if a != b {
            big_ok = false;
        }

        let a2 = match view.slice(offset + i * width + 6, 2) {
            Ok(s) => s,
            Err(_) => break,
        };
        let b2 = match view.slice(offset + (i + 1) * width + 6, 2) {
            Ok(s) => s,
            Err(_) => break,
        };
        if a2 != b2 {
            little_ok = false;
        }
        compared += 1;
    }

    if compared == 0 {
        debug!("endianness probe had no records to compare; defaulting to little-endian");
        return false;
    }

    match (big_ok, little_ok) {
        (true, false) => true,
        (false, true) => false,
        _ => {
            debug!("endianness probe was inconclusive; defaulting to little-endian");
            false
        }
    }
}

/// Final endianness determination for a confirmed symbol table.
///
/// V5 re-runs the strict nine-pair column test; V6 never ran it during
/// locating (its window test is purely structural), so this is the first
/// time endianness is decided and ties default to little-endian.
pub fn probe(view: &ByteView<'_>, table_start: usize, version: Version) -> Result<bool> {
    match version {
        Version::V5 => match column_test_strict(view, table_start, version, 9)? {
            Some(big_endian) => Ok(big_endian),
            None => Err(Error::AmbiguousEndian),
        },
        Version::V6 => Ok(column_test_loose(view, table_start, version, 10)),
    }
}
