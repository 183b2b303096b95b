//! # Store Layer
//!
//! [`MappedVector`] provides dense, typed array semantics over a
//! memory-mapped backing file. The file layout is the simplest possible:
//! element 0 at offset 0, element i at offset `i * width`, file length
//! always `count * width`. Growth and shrinkage resize the file in place
//! through the region's unmap/truncate/remap protocol.
//!
//! ## Failure Semantics
//!
//! - Get-family out-of-range indexes are a soft `None`, never an error.
//! - Set/append index or value problems are hard batch-aborting errors:
//!   every pair in a batch is validated before any element is modified.
//! - Every mutating operation on a read-only store fails with
//!   [`StoreError::ReadOnly`] before its arguments are looked at.
//!
//! ## Durability
//!
//! Writes request asynchronous write-back of the mapping; data becomes
//! durable at the OS's discretion. Callers needing stronger guarantees use
//! [`MappedVector::flush`].

mod region;
mod vector;

pub(crate) use region::MappedRegion;
pub use vector::MappedVector;

use crate::error::StoreError;

/// Parses a textual index argument for command bindings. Malformed input is
/// a hard error, unlike out-of-range lookups which are soft.
pub fn parse_index(raw: &str) -> Result<i64, StoreError> {
    raw.trim().parse().map_err(|_| StoreError::BadIndex {
        raw: raw.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_index_accepts_integers() {
        assert_eq!(parse_index("0").unwrap(), 0);
        assert_eq!(parse_index(" -3 ").unwrap(), -3);
    }

    #[test]
    fn parse_index_rejects_garbage() {
        assert_eq!(
            parse_index("1.5").unwrap_err(),
            StoreError::BadIndex {
                raw: "1.5".to_string()
            }
        );
        assert!(parse_index("x").is_err());
    }
}
