//! Grows a contiguous window of NUL-terminated printable strings into a
//! plausible symbol name pool, starting from a seed offset known to point at
//! a function name.

use log::debug;

use crate::byteview::ByteView;
use crate::error::{Error, Result};

/// Minimum number of entries that must be accepted before a rejection is
/// tolerated rather than treated as a discovery failure.
pub const REQUIRED_ENTRIES: usize = 100;

/// Maximum gap, in NUL bytes, tolerated between consecutive pool entries.
pub const MAX_GAP: usize = 3;

/// One resolved entry in the string pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolEntry {
    /// Offset of the first byte of the string (not including any leading
    /// NUL padding).
    pub offset: usize,
    /// The string's bytes, not including the terminating NUL.
    pub bytes: Vec<u8>,
    /// Length including the terminating NUL byte.
    pub length: usize,
}

/// Bounds of the located string pool, `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolBounds {
    pub start: usize,
    pub end: usize,
}

fn printable(b: u8) -> bool {
    (0x20..=0x7E).contains(&b)
}

const FORBIDDEN: [u8; 10] = [b'\\', b'%', b'+', b',', b'&', b'/', b')', b'(', b'[', b']'];

/// Function-name predicate.
pub fn is_func_name(bytes: &[u8]) -> bool {
    if bytes.is_empty() || bytes.len() > 512 {
        return false;
    }
    bytes.iter().all(|&b| printable(b) && !FORBIDDEN.contains(&b))
}

/// Find the NUL-terminated run ending strictly before `boundary`, along with
/// the gap (number of NUL bytes) between its end and `boundary`.
fn prev_run(view: &ByteView<'_>, boundary: usize) -> Result<Option<(usize, usize, usize)>> {
    if boundary == 0 {
        return Ok(None);
    }
    let mut k = boundary;
    while k > 0 && view.byte(k - 1)? == 0 {
        k -= 1;
    }
    if k == 0 {
        return Ok(None);
    }
    let end = k;
    let gap = boundary - k;
    let mut start = k - 1;
    while start > 0 && view.byte(start - 1)? != 0 {
        start -= 1;
    }
    Ok(Some((start, end, gap)))
}

/// Find the NUL-terminated run starting at or after `boundary`, along with
/// the gap between `boundary` and its start.
fn next_run(view: &ByteView<'_>, boundary: usize) -> Result<Option<(usize, usize, usize)>> {
    let len = view.len();
    let mut k = boundary;
    while k < len && view.byte(k)? == 0 {
        k += 1;
    }
    if k >= len {
        return Ok(None);
    }
    let start = k;
    let gap = k - boundary;
    let mut end = k + 1;
    while end < len && view.byte(end)? != 0 {
        end += 1;
    }
    Ok(Some((start, end, gap)))
}

/// Grow the string pool from a seed offset known to point at the start of a
/// function name.
pub fn locate(view: &ByteView<'_>, seed_offset: usize) -> Result<PoolBounds> {
    let len = view.len();

    let mut seed_end = seed_offset;
    while seed_end < len && view.byte(seed_end)? != 0 {
        seed_end += 1;
    }

    let mut entries: Vec<(usize, usize)> = vec![(seed_offset, seed_end)];
    let mut left_edge = seed_offset;
    let mut right_edge = seed_end;

    // Left growth: a rejection before REQUIRED_ENTRIES entries aborts
    // discovery entirely.
    loop {
        match prev_run(view, left_edge)? {
            None => break,
            Some((start, end, gap)) => {
                let candidate = view.slice(start, end - start)?;
                if gap <= MAX_GAP && is_func_name(candidate) {
                    entries.insert(0, (start, end));
                    left_edge = start;
                } else if entries.len() < REQUIRED_ENTRIES {
                    debug!("string pool left growth rejected at {start:#x} with only {} entries", entries.len());
                    return Err(Error::NoStringPool);
                } else {
                    break;
                }
            }
        }
    }

    // Right growth tolerates rejections before REQUIRED_ENTRIES entries by
    // resetting the accumulator and continuing past the offending run,
    // so a short stretch of unrelated strings near the pool doesn't abort it.
    loop {
        match next_run(view, right_edge)? {
            None => break,
            Some((start, end, gap)) => {
                let candidate = view.slice(start, end - start)?;
                if gap <= MAX_GAP && is_func_name(candidate) {
                    entries.push((start, end));
                    right_edge = end;
                } else if entries.len() < REQUIRED_ENTRIES {
                    debug!("string pool right growth reset at {start:#x} with only {} entries", entries.len());
                    entries.clear();
                    right_edge = end;
                } else {
                    break;
                }
            }
        }
    }

    if entries.len() < REQUIRED_ENTRIES {
        debug!("string pool growth stalled with only {} entries", entries.len());
        return Err(Error::NoStringPool);
    }

    let start = entries.iter().map(|&(s, _)| s).min().unwrap();
    let end = entries.iter().map(|&(_, e)| e).max().unwrap();
    debug!("string pool spans [{start:#x}, {end:#x}) with {} entries", entries.len());
    Ok(PoolBounds { start, end })
}

/// Rebuild the pool cleanly by walking `[bounds.start, bounds.end)` and
/// splitting on NUL, independent of the function-name predicate used to
/// find the bounds.
pub fn rebuild(view: &ByteView<'_>, bounds: PoolBounds) -> Result<Vec<PoolEntry>> {
    let mut entries = Vec::new();
    let mut i = bounds.start;
    while i < bounds.end {
        if view.byte(i)? == 0 {
            i += 1;
            continue;
        }
        let start = i;
        while i < bounds.end && view.byte(i)? != 0 {
            i += 1;
        }
        let bytes = view.slice(start, i - start)?.to_vec();
        let length = i - start + 1; // include terminating NUL
        entries.push(PoolEntry { offset: start, bytes, length });
        i += 1;
    }
    Ok(entries)
}
