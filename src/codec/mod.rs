//! # Per-Type Decode/Encode
//!
//! One [`Codec`] is built per open store from its element type and width,
//! and every operation goes through it. This collapses what would otherwise
//! be a twelve-armed conditional in every read and write path into a single
//! dispatch point, and it means the type name is parsed exactly once, at
//! open time.
//!
//! ## Decode
//!
//! Slots are read little-endian and widened to the reply form: signed
//! integers to i64, unsigned to u64, float32/float64 to f64, float80 to
//! [`F80`], strings to the NUL-terminated prefix of the slot (lossy UTF-8).
//!
//! ## Encode
//!
//! Inputs arrive as text, the way a command binding delivers them. Encoding
//! validates exactly against the type's representable range before writing:
//! int8 accepts -128 and 127 and rejects -129 and 128; uint64 rejects any
//! negative input; floats accept any finite parseable decimal; strings
//! longer than the slot are truncated to the slot width and shorter ones
//! are NUL-padded. Validation never mutates the slot on failure.

use crate::error::StoreError;
use crate::types::{ElementType, Value, F80};

/// Decode/encode engine for a single `(element type, width)` pair.
#[derive(Debug, Clone)]
pub struct Codec {
    ty: ElementType,
    width: u8,
}

impl Codec {
    pub fn new(ty: ElementType, width: u8) -> Self {
        Codec { ty, width }
    }

    pub fn element_type(&self) -> ElementType {
        self.ty
    }

    pub fn width(&self) -> usize {
        self.width as usize
    }

    /// Decodes one slot. The slot length always equals the codec width; the
    /// store guarantees it.
    pub fn decode(&self, slot: &[u8]) -> Value {
        debug_assert_eq!(slot.len(), self.width());
        match self.ty {
            ElementType::Int8 => Value::Int(slot[0] as i8 as i64),
            ElementType::Uint8 => Value::Uint(slot[0] as u64),
            ElementType::Int16 => Value::Int(i16::from_le_bytes(array(slot)) as i64),
            ElementType::Uint16 => Value::Uint(u16::from_le_bytes(array(slot)) as u64),
            ElementType::Int32 => Value::Int(i32::from_le_bytes(array(slot)) as i64),
            ElementType::Uint32 => Value::Uint(u32::from_le_bytes(array(slot)) as u64),
            ElementType::Int64 => Value::Int(i64::from_le_bytes(array(slot))),
            ElementType::Uint64 => Value::Uint(u64::from_le_bytes(array(slot))),
            ElementType::Float32 => Value::Float(f32::from_le_bytes(array(slot)) as f64),
            ElementType::Float64 => Value::Float(f64::from_le_bytes(array(slot))),
            ElementType::Float80 => Value::Float80(F80::from_le_bytes(&array(slot))),
            ElementType::Str => {
                let prefix = match slot.iter().position(|b| *b == 0) {
                    Some(nul) => &slot[..nul],
                    None => slot,
                };
                Value::Str(String::from_utf8_lossy(prefix).into_owned())
            }
        }
    }

    /// Parses and range-validates `raw`, writing the encoded bytes into
    /// `out` on success. `out` length always equals the codec width.
    pub fn encode(&self, raw: &str, out: &mut [u8]) -> Result<(), StoreError> {
        debug_assert_eq!(out.len(), self.width());
        match self.ty {
            ElementType::Int8 => out.copy_from_slice(&(self.int(raw)? as i8).to_le_bytes()),
            ElementType::Uint8 => out.copy_from_slice(&(self.int(raw)? as u8).to_le_bytes()),
            ElementType::Int16 => out.copy_from_slice(&(self.int(raw)? as i16).to_le_bytes()),
            ElementType::Uint16 => out.copy_from_slice(&(self.int(raw)? as u16).to_le_bytes()),
            ElementType::Int32 => out.copy_from_slice(&(self.int(raw)? as i32).to_le_bytes()),
            ElementType::Uint32 => out.copy_from_slice(&(self.int(raw)? as u32).to_le_bytes()),
            ElementType::Int64 => out.copy_from_slice(&(self.int(raw)? as i64).to_le_bytes()),
            ElementType::Uint64 => out.copy_from_slice(&(self.int(raw)? as u64).to_le_bytes()),
            ElementType::Float32 => out.copy_from_slice(&(self.float(raw)? as f32).to_le_bytes()),
            ElementType::Float64 => out.copy_from_slice(&self.float(raw)?.to_le_bytes()),
            ElementType::Float80 => {
                let v = F80::parse(raw).ok_or_else(|| StoreError::BadValue {
                    raw: raw.to_string(),
                    expected: "a finite number",
                })?;
                out.copy_from_slice(&v.to_le_bytes());
            }
            ElementType::Str => {
                let bytes = raw.as_bytes();
                let copied = bytes.len().min(out.len());
                out[..copied].copy_from_slice(&bytes[..copied]);
                out[copied..].fill(0);
            }
        }
        Ok(())
    }

    fn int(&self, raw: &str) -> Result<i128, StoreError> {
        let v: i128 = raw.trim().parse().map_err(|_| StoreError::BadValue {
            raw: raw.to_string(),
            expected: "an integer",
        })?;
        let (min, max) = int_range(self.ty);
        if v < min || v > max {
            return Err(StoreError::ValueOutOfRange {
                raw: raw.to_string(),
                ty: self.ty,
            });
        }
        Ok(v)
    }

    fn float(&self, raw: &str) -> Result<f64, StoreError> {
        let v: f64 = raw.trim().parse().map_err(|_| StoreError::BadValue {
            raw: raw.to_string(),
            expected: "a finite number",
        })?;
        if !v.is_finite() {
            return Err(StoreError::BadValue {
                raw: raw.to_string(),
                expected: "a finite number",
            });
        }
        Ok(v)
    }
}

/// Representable range per integer element type, in i128 so every bound
/// (including u64::MAX) is exact.
fn int_range(ty: ElementType) -> (i128, i128) {
    match ty {
        ElementType::Int8 => (i8::MIN as i128, i8::MAX as i128),
        ElementType::Uint8 => (0, u8::MAX as i128),
        ElementType::Int16 => (i16::MIN as i128, i16::MAX as i128),
        ElementType::Uint16 => (0, u16::MAX as i128),
        ElementType::Int32 => (i32::MIN as i128, i32::MAX as i128),
        ElementType::Uint32 => (0, u32::MAX as i128),
        ElementType::Int64 => (i64::MIN as i128, i64::MAX as i128),
        ElementType::Uint64 => (0, u64::MAX as i128),
        // Floats and strings never reach the integer path.
        _ => (i128::MIN, i128::MAX),
    }
}

fn array<const N: usize>(slot: &[u8]) -> [u8; N] {
    let mut buf = [0u8; N];
    buf.copy_from_slice(&slot[..N]);
    buf
}
