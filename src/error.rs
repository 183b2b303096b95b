//! # Error Taxonomy
//!
//! [`StoreError`] is the crate's typed error vocabulary. Fallible
//! operations return `eyre::Result`; a `StoreError` converts into the
//! report via `thiserror`'s `std::error::Error` impl, so hosts branch on
//! the variant with `downcast_ref::<StoreError>()` while plain IO
//! failures (open/stat/map/truncate) stay `eyre` reports carrying path
//! context.
//!
//! Variants derive `PartialEq` so callers and tests can match on the
//! exact failure, fields included.

use thiserror::Error;

use crate::types::ElementType;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("unknown element type '{name}'")]
    UnknownType { name: String },

    #[error("element width {requested} does not match the fixed width of {ty}")]
    WidthMismatch { ty: ElementType, requested: u8 },

    #[error("string stores require an explicit element width")]
    MissingWidth,

    #[error("element width must be between 1 and 255, got {requested}")]
    BadWidth { requested: u64 },

    #[error("no store is open under key '{key}'")]
    NotOpen { key: String },

    #[error("store is bound to '{bound}' and cannot be rebound to '{requested}'")]
    Rebind { bound: String, requested: String },

    #[error("index '{raw}' is not an integer")]
    BadIndex { raw: String },

    #[error("index {index} is out of bounds for {count} elements")]
    IndexOutOfBounds { index: i64, count: u64 },

    #[error("value '{raw}' is not {expected}")]
    BadValue { raw: String, expected: &'static str },

    #[error("value '{raw}' must be a number {}", range_phrase(.ty))]
    ValueOutOfRange { raw: String, ty: ElementType },

    #[error("store is read-only")]
    ReadOnly,
}

fn range_phrase(ty: &ElementType) -> String {
    let bounds = match ty {
        ElementType::Int8 => "between -128 and 127",
        ElementType::Uint8 => "between 0 and 255",
        ElementType::Int16 => "between -32768 and 32767",
        ElementType::Uint16 => "between 0 and 65535",
        ElementType::Int32 => "between -2147483648 and 2147483647",
        ElementType::Uint32 => "between 0 and 4294967295",
        ElementType::Int64 => "between -9223372036854775808 and 9223372036854775807",
        ElementType::Uint64 => "between 0 and 18446744073709551615",
        other => return format!("in the {other} range"),
    };
    bounds.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_actual_type_range() {
        let err = StoreError::ValueOutOfRange {
            raw: "300".to_string(),
            ty: ElementType::Uint8,
        };
        assert_eq!(err.to_string(), "value '300' must be a number between 0 and 255");

        let err = StoreError::ValueOutOfRange {
            raw: "-1".to_string(),
            ty: ElementType::Uint64,
        };
        assert_eq!(
            err.to_string(),
            "value '-1' must be a number between 0 and 18446744073709551615"
        );
    }

    #[test]
    fn variants_compare_by_fields() {
        assert_eq!(
            StoreError::NotOpen {
                key: "db".to_string()
            },
            StoreError::NotOpen {
                key: "db".to_string()
            }
        );
        assert_ne!(
            StoreError::IndexOutOfBounds { index: 5, count: 3 },
            StoreError::IndexOutOfBounds { index: 4, count: 3 }
        );
    }

    #[test]
    fn downcasts_through_an_eyre_report() {
        let report = eyre::Report::from(StoreError::ReadOnly);
        assert_eq!(
            report.downcast_ref::<StoreError>(),
            Some(&StoreError::ReadOnly)
        );

        let report = eyre::Report::from(StoreError::UnknownType {
            name: "varchar".to_string(),
        });
        assert!(report.to_string().contains("unknown element type 'varchar'"));
    }
}
