//! # mmvec - Typed Memory-Mapped Vector Store
//!
//! A growable, shrinkable on-disk array of fixed-width records, exposed as
//! a random-access, appendable, poppable collection. The backing file is
//! memory-mapped whole; element i lives at byte offset `i * width` and the
//! file length is always `count * width`.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────┐
//! │       Registry (key -> store)         │
//! ├──────────────────────────────────────┤
//! │  MappedVector (get/set/append/pop)    │   persist: snapshot/replay
//! ├──────────────────────────────────────┤
//! │  Codec (decode/encode, 12 types)      │
//! ├──────────────────────────────────────┤
//! │  MappedRegion (fd + mmap + resize)    │
//! └──────────────────────────────────────┘
//! ```
//!
//! ## Element Types
//!
//! Signed and unsigned 8/16/32/64-bit integers, 32/64/80-bit floats, and
//! fixed-width byte strings. Widths are implied for all but `string`,
//! which takes a caller-supplied width of 1..=255 bytes.
//!
//! ## Resizing
//!
//! Element count changes resize the file in place: unmap, truncate, remap.
//! Bulk append grows exactly once per batch - remapping is the expensive
//! step, so n appended values never cost n remaps.
//!
//! ## Quick Start
//!
//! ```ignore
//! use mmvec::{ElementType, MappedVector};
//!
//! let mut v = MappedVector::open("data.mmap", ElementType::Int32, None, true)?;
//! v.append(&["1", "2", "3"])?;
//! assert_eq!(v.count(), 3);
//! assert_eq!(v.get(1).unwrap().to_string(), "2");
//! ```
//!
//! ## Concurrency Contract
//!
//! The store has no internal locking: the embedding host must serialize
//! all operations on a given store. All operations are synchronous and run
//! to completion on the calling thread. The backing file may in principle
//! be mapped by other processes, but the crate provides no cross-process
//! coordination - concurrent external writers can corrupt the size
//! invariant and are unsupported.
//!
//! ## Durability
//!
//! Writes request asynchronous write-back (latency over durability);
//! snapshots flush synchronously. Callers needing durability at other
//! points use [`MappedVector::flush`].

pub mod codec;
pub mod error;
pub mod persist;
pub mod registry;
pub mod store;
pub mod types;

pub use codec::Codec;
pub use error::StoreError;
pub use persist::{replay_ops, restore, snapshot, ReplayOp, SnapshotRecord};
pub use registry::Registry;
pub use store::{parse_index, MappedVector};
pub use types::{ElementType, Value, F80};
