//! Recovers the unknown load address by cross-matching the string pool's
//! length distribution against the symbol table's name-length distribution
//! with a known-base shortcut tried first.

use log::debug;

use crate::byteview::ByteView;
use crate::error::{Error, Result};
use crate::record::SymbolRecord;
use crate::strings::PoolEntry;

/// Canonical anchor keywords, tried in order; all must occur somewhere in
/// the image (in either plain or underscore-prefixed form) or the pipeline
/// aborts with [`Error::MissingAnchor`].
pub const ANCHOR_KEYWORDS: [&str; 3] = ["bzero", "usrInit", "bfill"];

/// Common VxWorks link bases tried by [`quick_test`] before the full scan.
pub const KNOWN_BASES: [u32; 6] = [0x8000_2000, 0x0001_0000, 0x0000_1000, 0xF200_3FE4, 0x0010_0000, 0x0010_7FE0];

/// Maximum number of table/pool entries examined by the fixup check and the
/// quick test.
pub const CHECK_COUNT: usize = 100;

/// Maximum tolerated faults in the fixup check.
pub const MAX_FAULTS: usize = 10;

fn needle(keyword: &str, underscored: bool) -> Vec<u8> {
    let mut v = vec![0u8];
    if underscored {
        v.push(b'_');
    }
    v.extend_from_slice(keyword.as_bytes());
    v.push(0);
    v
}

fn contains_subsequence(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}

fn find_subsequence(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// Find the seed offset for string-pool discovery: the first canonical
/// keyword that occurs in the image, pointing just past its leading NUL.
///
/// Fixes a precedence bug in naive containment checks: every
/// keyword must genuinely occur, in either form, or the whole pipeline
/// aborts — not just the first one checked.
pub fn find_anchor_seed(view: &ByteView<'_>) -> Result<usize> {
    let bytes = view.as_slice();

    for keyword in ANCHOR_KEYWORDS {
        let plain = needle(keyword, false);
        let underscored = needle(keyword, true);
        if !contains_subsequence(bytes, &plain) && !contains_subsequence(bytes, &underscored) {
            debug!("anchor keyword {keyword:?} not found in either form");
            return Err(Error::MissingAnchor);
        }
    }

    for keyword in ANCHOR_KEYWORDS {
        let plain = needle(keyword, false);
        if let Some(pos) = find_subsequence(bytes, &plain) {
            debug!("anchor keyword {keyword:?} found at {pos:#x} (plain form)");
            return Ok(pos + 1);
        }
        let underscored = needle(keyword, true);
        if let Some(pos) = find_subsequence(bytes, &underscored) {
            debug!("anchor keyword {keyword:?} found at {pos:#x} (underscored form)");
            return Ok(pos + 1);
        }
    }

    Err(Error::MissingAnchor)
}

/// A symbol-table record annotated with its name-pointer-ascending sort
/// position and the distance to the next record's name pointer.
#[derive(Debug, Clone, Copy)]
pub struct HintedRecord {
    pub record: SymbolRecord,
    pub name_length_hint: Option<u32>,
}

/// Sort records by `name_ptr` ascending and annotate each with the distance
/// to the next record's name pointer.
pub fn hint_by_name_length(records: &[SymbolRecord]) -> Vec<HintedRecord> {
    let mut sorted: Vec<SymbolRecord> = records.to_vec();
    sorted.sort_by_key(|r| r.name_ptr);

    let len = sorted.len();
    let mut hinted = Vec::with_capacity(len);
    for (i, record) in sorted.iter().enumerate() {
        let name_length_hint = sorted.get(i + 1).map(|next| next.name_ptr - record.name_ptr);
        hinted.push(HintedRecord { record: *record, name_length_hint });
    }
    hinted
}

/// Windowed alignment test validating a tentative `(j, i)` pairing between
/// the name-hinted table and the string pool.
fn check_fix(table: &[HintedRecord], pool: &[PoolEntry], mut j: usize, mut i: usize) -> bool {
    let mut fault_count = 0;
    let steps = table.len().min(CHECK_COUNT);

    for step in 0..steps {
        if j >= table.len() || i >= pool.len() {
            return false;
        }
        let hint = match table[j].name_length_hint {
            Some(h) => h as usize,
            None => return false,
        };
        let pool_len = pool[i].length;

        if step == steps - 1 {
            return fault_count < MAX_FAULTS;
        }

        if pool_len == hint {
            j += 1;
            i += 1;
        } else if hint < pool_len {
            j += 1;
            fault_count += 1;
        } else {
            return false;
        }
    }

    fault_count < MAX_FAULTS
}

/// Full name-length matching scan over every `(i, j)` pair, in lexicographic
/// order so a parallel implementation can still return the first match
/// deterministically.
pub fn solve(table: &[HintedRecord], pool: &[PoolEntry]) -> Result<u32> {
    for (i, pool_entry) in pool.iter().enumerate() {
        for (j, hinted) in table.iter().enumerate() {
            let hint = match hinted.name_length_hint {
                Some(h) => h,
                None => continue,
            };
            if pool_entry.length as u32 != hint {
                continue;
            }
            if check_fix(table, pool, j, i) {
                let load_address = hinted.record.name_ptr.wrapping_sub(pool_entry.offset as u32);
                debug!("matched (i={i}, j={j}) -> load address {load_address:#x}");
                return Ok(load_address);
            }
        }
    }
    Err(Error::NoLoadAddress)
}

/// Try a short list of common VxWorks link bases before running the full
/// matching scan.
pub fn quick_test(view: &ByteView<'_>, records: &[SymbolRecord]) -> Option<u32> {
    let count = records.len().min(CHECK_COUNT);

    'bases: for base in KNOWN_BASES {
        for record in &records[..count] {
            if record.name_ptr <= base {
                continue 'bases;
            }
            let offset = (record.name_ptr - base) as usize;
            if offset >= view.len() {
                continue 'bases;
            }
            let starts_string = offset == 0 || matches!(view.byte(offset - 1), Ok(0));
            if !starts_string {
                continue 'bases;
            }
        }
        debug!("quick test validated known base {base:#x}");
        return Some(base);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anchor_requires_all_keywords_present() {
        let mut image = vec![0u8];
        image.extend_from_slice(b"bzero\0");
        image.extend_from_slice(b"usrInit\0");
        // bfill missing entirely.
        let view = ByteView::new(&image);
        assert_eq!(find_anchor_seed(&view), Err(Error::MissingAnchor));
    }

    #[test]
    fn anchor_accepts_underscore_prefixed_form() {
        let mut image = vec![0u8];
        image.extend_from_slice(b"_bzero\0");
        image.extend_from_slice(b"usrInit\0");
        image.extend_from_slice(b"bfill\0");
        let view = ByteView::new(&image);
        let seed = find_anchor_seed(&view).unwrap();
        assert_eq!(&image[seed..seed + 6], b"_bzero");
    }

    #[test]
    fn quick_test_validates_a_known_base() {
        let base = 0x0001_0000u32;
        let mut image = vec![0u8];
        let mut records = Vec::new();
        for i in 0..5u32 {
            let name = format!("sym_{i}");
            let offset = image.len();
            image.extend_from_slice(name.as_bytes());
            image.push(0);
            records.push(SymbolRecord {
                offset: 0,
                name_ptr: base + offset as u32,
                value: 0x1000,
                type_code: 0x05,
            });
        }
        let view = ByteView::new(&image);
        assert_eq!(quick_test(&view, &records), Some(base));
    }

    #[test]
    fn quick_test_rejects_base_pointing_mid_string() {
        let mut image = vec![0u8];
        image.extend_from_slice(b"usrInit\0");
        let view = ByteView::new(&image);
        let records = vec![SymbolRecord {
            offset: 0,
            name_ptr: 0x0001_0000 + 2, // points into the middle of "usrInit"
            value: 0,
            type_code: 0x05,
        }];
        assert_eq!(quick_test(&view, &records), None);
    }
}
