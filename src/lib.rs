//! Symbol-table and load-address discovery engine for raw VxWorks firmware
//! images.
//!
//! Given an opaque byte blob with no headers, no section table, unknown
//! endianness, and unknown base address, [`analyze`] locates the embedded
//! symbol table, locates the string pool containing symbol names, recovers
//! the virtual address the image was linked at, and reconstructs the named
//! symbol list. The crate performs no I/O and drives no external tooling —
//! it consumes a byte slice and a declared VxWorks major version and
//! produces a structured report.

pub mod address;
pub mod byteview;
pub mod endian;
pub mod error;
pub mod locator;
pub mod record;
pub mod reify;
pub mod strings;
pub mod version;

use log::{debug, warn};

pub use crate::error::{Error, Result};
pub use crate::record::SymbolRecord;
pub use crate::reify::Symbol;
pub use crate::version::Version;

use crate::byteview::ByteView;

/// The complete analysis report for one image.
#[derive(Debug, Clone, PartialEq)]
pub struct FirmwareInfo {
    /// Declared VxWorks major version.
    pub version: Version,
    /// Whether the image's symbol table is big-endian.
    pub big_endian: bool,
    /// Recovered virtual base address the image was linked at.
    pub load_address: u32,
    /// Image offset of the first symbol record.
    pub symbol_table_start: usize,
    /// Image offset one past the last symbol record.
    pub symbol_table_end: usize,
    /// Resolved symbols, in original record order.
    pub symbols: Vec<Symbol>,
}

/// Run the full pipeline against `image`, assuming it is a VxWorks `version`
/// firmware image.
///
/// A single entry point taking a byte slice and returning a `Result` over a
/// structured report, with no side effects and no I/O.
pub fn analyze(image: &[u8], version: Version) -> Result<FirmwareInfo> {
    let view = ByteView::new(image);

    let (bounds, endian_hint) = locator::locate(&view, version)?;
    debug!("located symbol table [{:#x}, {:#x})", bounds.start, bounds.end);

    let big_endian = match endian_hint {
        Some(hint) => hint,
        None => endian::probe(&view, bounds.start, version)?,
    };

    let width = version.record_width();
    let mut records = Vec::with_capacity((bounds.end - bounds.start) / width);
    let mut offset = bounds.start;
    while offset < bounds.end {
        records.push(record::parse(&view, offset, version, big_endian)?);
        offset += width;
    }

    let load_address = match address::quick_test(&view, &records) {
        Some(base) => {
            debug!("load address {base:#x} validated by known-base quick test; skipping string pool discovery");
            base
        }
        None => {
            let seed = address::find_anchor_seed(&view)?;
            let pool_bounds = strings::locate(&view, seed)?;
            let pool = strings::rebuild(&view, pool_bounds)?;
            let hinted = address::hint_by_name_length(&records);
            match address::solve(&hinted, &pool) {
                Ok(base) => base,
                Err(e) => {
                    warn!("no load address matched the symbol table");
                    return Err(e);
                }
            }
        }
    };

    let symbols = reify::reify(&view, &records, load_address)?;

    Ok(FirmwareInfo {
        version,
        big_endian,
        load_address,
        symbol_table_start: bounds.start,
        symbol_table_end: bounds.end,
        symbols,
    })
}
