//! # Element Types
//!
//! The twelve supported element encodings and their width rules.
//!
//! ## Width Table
//!
//! | Type | Width | Notes |
//! |------|-------|-------|
//! | Int8 / Uint8 | 1 | |
//! | Int16 / Uint16 | 2 | |
//! | Int32 / Uint32 | 4 | |
//! | Int64 / Uint64 | 8 | |
//! | Float32 | 4 | alias `float` |
//! | Float64 | 8 | alias `double` |
//! | Float80 | 16 | alias `long double`; x87 extended in a 16-byte slot |
//! | Str | caller-supplied | width is mandatory, 1..=255 |
//!
//! For every type but `Str` the width is implied; an explicit width is
//! accepted only when it matches exactly. `Str` has no implied width and
//! rejects open without one.
//!
//! Names parse case-insensitively. The C-flavored aliases (`float`,
//! `double`, `long double`) are accepted alongside the canonical names so
//! existing datasets keep their declared type strings.

use crate::error::StoreError;
use std::fmt;

/// Fixed decoding/encoding rule applied uniformly to every record in a store.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementType {
    Int8 = 0,
    Uint8 = 1,
    Int16 = 2,
    Uint16 = 3,
    Int32 = 4,
    Uint32 = 5,
    Int64 = 6,
    Uint64 = 7,
    Float32 = 8,
    Float64 = 9,
    Float80 = 10,
    Str = 11,
}

impl ElementType {
    /// Parses a type name, case-insensitively. Accepts the canonical names
    /// plus the `float`/`double`/`long double` aliases.
    pub fn parse(name: &str) -> Result<Self, StoreError> {
        let lowered = name.trim().to_ascii_lowercase();
        let ty = match lowered.as_str() {
            "int8" => ElementType::Int8,
            "uint8" => ElementType::Uint8,
            "int16" => ElementType::Int16,
            "uint16" => ElementType::Uint16,
            "int32" => ElementType::Int32,
            "uint32" => ElementType::Uint32,
            "int64" => ElementType::Int64,
            "uint64" => ElementType::Uint64,
            "float32" | "float" => ElementType::Float32,
            "float64" | "double" => ElementType::Float64,
            "float80" | "long double" => ElementType::Float80,
            "string" => ElementType::Str,
            _ => {
                return Err(StoreError::UnknownType {
                    name: name.to_string(),
                })
            }
        };
        Ok(ty)
    }

    /// Canonical byte width, or `None` for `Str` (caller-supplied).
    pub fn fixed_width(&self) -> Option<u8> {
        match self {
            ElementType::Int8 | ElementType::Uint8 => Some(1),
            ElementType::Int16 | ElementType::Uint16 => Some(2),
            ElementType::Int32 | ElementType::Uint32 => Some(4),
            ElementType::Int64 | ElementType::Uint64 => Some(8),
            ElementType::Float32 => Some(4),
            ElementType::Float64 => Some(8),
            ElementType::Float80 => Some(16),
            ElementType::Str => None,
        }
    }

    /// Applies the open-time width rules: fixed-width types accept an absent
    /// or exactly-matching request, `Str` requires an explicit width in
    /// `1..=255`.
    pub fn resolve_width(&self, requested: Option<u64>) -> Result<u8, StoreError> {
        if let Some(w) = requested {
            if w == 0 || w > u8::MAX as u64 {
                return Err(StoreError::BadWidth { requested: w });
            }
        }
        match (self.fixed_width(), requested) {
            (Some(fixed), None) => Ok(fixed),
            (Some(fixed), Some(w)) if w == fixed as u64 => Ok(fixed),
            (Some(_), Some(w)) => Err(StoreError::WidthMismatch {
                ty: *self,
                requested: w as u8,
            }),
            (None, Some(w)) => Ok(w as u8),
            (None, None) => Err(StoreError::MissingWidth),
        }
    }

    /// Canonical lowercase name.
    pub fn name(&self) -> &'static str {
        match self {
            ElementType::Int8 => "int8",
            ElementType::Uint8 => "uint8",
            ElementType::Int16 => "int16",
            ElementType::Uint16 => "uint16",
            ElementType::Int32 => "int32",
            ElementType::Uint32 => "uint32",
            ElementType::Int64 => "int64",
            ElementType::Uint64 => "uint64",
            ElementType::Float32 => "float32",
            ElementType::Float64 => "float64",
            ElementType::Float80 => "float80",
            ElementType::Str => "string",
        }
    }

    pub fn is_string(&self) -> bool {
        matches!(self, ElementType::Str)
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_canonical_names() {
        assert_eq!(ElementType::parse("int8").unwrap(), ElementType::Int8);
        assert_eq!(ElementType::parse("uint64").unwrap(), ElementType::Uint64);
        assert_eq!(ElementType::parse("float80").unwrap(), ElementType::Float80);
        assert_eq!(ElementType::parse("string").unwrap(), ElementType::Str);
    }

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!(ElementType::parse("INT32").unwrap(), ElementType::Int32);
        assert_eq!(ElementType::parse("Float64").unwrap(), ElementType::Float64);
    }

    #[test]
    fn parse_c_aliases() {
        assert_eq!(ElementType::parse("float").unwrap(), ElementType::Float32);
        assert_eq!(ElementType::parse("double").unwrap(), ElementType::Float64);
        assert_eq!(
            ElementType::parse("long double").unwrap(),
            ElementType::Float80
        );
    }

    #[test]
    fn parse_rejects_unknown_names() {
        let err = ElementType::parse("varchar").unwrap_err();
        assert_eq!(
            err,
            StoreError::UnknownType {
                name: "varchar".to_string()
            }
        );
    }

    #[test]
    fn width_table() {
        assert_eq!(ElementType::Int8.fixed_width(), Some(1));
        assert_eq!(ElementType::Uint16.fixed_width(), Some(2));
        assert_eq!(ElementType::Int32.fixed_width(), Some(4));
        assert_eq!(ElementType::Uint64.fixed_width(), Some(8));
        assert_eq!(ElementType::Float32.fixed_width(), Some(4));
        assert_eq!(ElementType::Float64.fixed_width(), Some(8));
        assert_eq!(ElementType::Float80.fixed_width(), Some(16));
        assert_eq!(ElementType::Str.fixed_width(), None);
    }

    #[test]
    fn resolve_width_accepts_matching_explicit_width() {
        assert_eq!(ElementType::Int32.resolve_width(None).unwrap(), 4);
        assert_eq!(ElementType::Int32.resolve_width(Some(4)).unwrap(), 4);
    }

    #[test]
    fn resolve_width_rejects_mismatch() {
        let err = ElementType::Int32.resolve_width(Some(8)).unwrap_err();
        assert_eq!(
            err,
            StoreError::WidthMismatch {
                ty: ElementType::Int32,
                requested: 8
            }
        );
    }

    #[test]
    fn string_requires_width() {
        assert_eq!(ElementType::Str.resolve_width(Some(5)).unwrap(), 5);
        assert_eq!(
            ElementType::Str.resolve_width(None).unwrap_err(),
            StoreError::MissingWidth
        );
    }

    #[test]
    fn width_bounds() {
        assert_eq!(
            ElementType::Str.resolve_width(Some(0)).unwrap_err(),
            StoreError::BadWidth { requested: 0 }
        );
        assert_eq!(
            ElementType::Str.resolve_width(Some(256)).unwrap_err(),
            StoreError::BadWidth { requested: 256 }
        );
        assert_eq!(ElementType::Str.resolve_width(Some(255)).unwrap(), 255);
    }
}
