//! # Element Type System
//!
//! The canonical [`ElementType`] enum, the decoded [`Value`] representation,
//! and the 80-bit extended-precision carrier [`F80`].
//!
//! Every record in a store is decoded and encoded by exactly one element
//! type, fixed at open time. The type name is parsed once at open; all
//! per-operation dispatch happens on the enum, never on strings.

mod element;
mod float80;
mod value;

pub use element::ElementType;
pub use float80::F80;
pub use value::Value;
