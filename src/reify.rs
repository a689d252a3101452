//! Resolves each symbol record's name pointer into a string from the pool,
//! using the recovered load address.

use log::debug;

use crate::byteview::ByteView;
use crate::error::Result;
use crate::record::SymbolRecord;
use crate::version::Version;

/// A fully resolved symbol: a name, its two virtual addresses, and its raw
/// type code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    /// Resolved symbol name.
    pub name: String,
    /// Virtual address of the name in the string pool.
    pub name_vaddr: u32,
    /// Virtual address the symbol resolves to.
    pub value_vaddr: u32,
    /// Raw type byte.
    pub type_code: u8,
}

impl Symbol {
    /// Whether this symbol's type denotes executable code, per the
    /// function-creation mask.
    pub fn is_function(&self, version: Version) -> bool {
        version.creates_function(self.type_code)
    }
}

/// Resolve every record in `records` (kept in their original image order,
/// not name order) into a [`Symbol`]. Records whose name pointer does not
/// land on a NUL-terminated run inside the image are silently skipped:
/// a malformed individual record does not fail the analysis.
pub fn reify(view: &ByteView<'_>, records: &[SymbolRecord], load_address: u32) -> Result<Vec<Symbol>> {
    let mut symbols = Vec::with_capacity(records.len());

    for record in records {
        let Some(offset) = record.name_ptr.checked_sub(load_address) else {
            debug!("record at {:#x} has name_ptr below load address; skipping", record.offset);
            continue;
        };
        let offset = offset as usize;

        if offset >= view.len() {
            debug!("record at {:#x} name_ptr resolves out of bounds; skipping", record.offset);
            continue;
        }
        if offset > 0 && view.byte(offset - 1)? != 0 {
            debug!("record at {:#x} name_ptr does not start a string; skipping", record.offset);
            continue;
        }

        let mut end = offset;
        let len = view.len();
        while end < len && view.byte(end)? != 0 {
            end += 1;
        }
        if end >= len {
            debug!("record at {:#x} name run is unterminated; skipping", record.offset);
            continue;
        }

        let bytes = view.slice(offset, end - offset)?;
        let name = String::from_utf8_lossy(bytes).into_owned();
        symbols.push(Symbol {
            name,
            name_vaddr: record.name_ptr,
            value_vaddr: record.value,
            type_code: record.type_code,
        });
    }

    debug!("reified {} of {} records", symbols.len(), records.len());
    Ok(symbols)
}
