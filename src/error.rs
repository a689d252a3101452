//! Typed, terminal failure reasons for a single firmware analysis.
//!
//! Every variant corresponds to one of the pipeline stages described in the
//! component design: the pipeline short-circuits at the first stage that
//! cannot produce a confident answer and returns one of these.

use core::fmt;

/// Reason an [`analyze`](crate::analyze) call failed to produce a
/// [`FirmwareInfo`](crate::FirmwareInfo).
///
/// All variants are terminal and non-retryable for the given image: running
/// the pipeline again on the same bytes produces the same error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A byte access exceeded the bounds of the image. Unlike the other
    /// variants this indicates a logic bug in the pipeline rather than an
    /// unrecognizable image, since every offset the pipeline computes is
    /// supposed to be checked before use.
    OutOfBounds {
        /// The offset that was requested.
        offset: usize,
        /// The length of the image the offset was checked against.
        len: usize,
    },
    /// No offset in the image produced a run of structurally valid symbol
    /// records long enough to be accepted as the symbol table.
    NoSymbolTable,
    /// The V5 column test found both or neither of big/little endian
    /// plausible for the candidate symbol table.
    AmbiguousEndian,
    /// None of the canonical anchor keywords (`bzero`, `usrInit`, `bfill`)
    /// appear anywhere in the image, in either their plain or
    /// underscore-prefixed form.
    MissingAnchor,
    /// String-pool growth from the anchor seed could not reach the minimum
    /// number of accepted entries before running off a gap or a non-name
    /// run.
    NoStringPool,
    /// Neither the known-base quick test nor the full name-length matching
    /// scan produced a consistent load address.
    NoLoadAddress,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Error::OutOfBounds { offset, len } => {
                write!(f, "offset {offset:#x} is out of bounds for a {len}-byte image")
            }
            Error::NoSymbolTable => f.write_str("no run of valid symbol records found in image"),
            Error::AmbiguousEndian => {
                f.write_str("column test could not determine symbol table endianness")
            }
            Error::MissingAnchor => {
                f.write_str("none of the canonical anchor keywords occur in the image")
            }
            Error::NoStringPool => {
                f.write_str("could not grow a string pool from the anchor seed offset")
            }
            Error::NoLoadAddress => f.write_str("no load address matched the symbol table"),
        }
    }
}

impl std::error::Error for Error {}

/// Convenience alias used throughout the crate.
pub type Result<T> = core::result::Result<T, Error>;
