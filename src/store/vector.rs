//! # Mapped Vector
//!
//! The sole stateful entity of the crate: one open, typed, growable vector
//! over one backing file. Path, element type, width, and writability are
//! fixed at open time; only the element count changes afterwards.

use std::path::{Path, PathBuf};

use eyre::{ensure, Result};
use smallvec::SmallVec;
use tracing::debug;

use super::MappedRegion;
use crate::codec::Codec;
use crate::error::StoreError;
use crate::types::{ElementType, Value};

/// A typed, random-access, appendable, poppable vector over a
/// memory-mapped file.
///
/// Operations assume the embedding host serializes access per object; the
/// store has no internal locking. Concurrent external writers to the same
/// backing file can corrupt the size invariant and are unsupported.
#[derive(Debug)]
pub struct MappedVector {
    path: PathBuf,
    ty: ElementType,
    codec: Codec,
    region: MappedRegion,
}

impl MappedVector {
    /// Opens or creates the backing file and binds it to one element type
    /// and width for the object's lifetime.
    ///
    /// Creation only happens in writable mode; a read-only open of a
    /// missing file fails. An existing file's size is adopted and must be a
    /// multiple of the element width.
    pub fn open(
        path: impl Into<PathBuf>,
        ty: ElementType,
        width: Option<u64>,
        writable: bool,
    ) -> Result<Self> {
        let path = path.into();
        let width = ty.resolve_width(width)?;
        let region = MappedRegion::open(&path, writable)?;

        ensure!(
            region.len() % width as u64 == 0,
            "backing file '{}' length {} is not a multiple of element width {}",
            path.display(),
            region.len(),
            width
        );

        let codec = Codec::new(ty, width);
        debug!(
            path = %path.display(),
            %ty,
            width,
            writable,
            count = region.len() / width as u64,
            "opened mapped vector"
        );

        Ok(Self {
            path,
            ty,
            codec,
            region,
        })
    }

    /// Idempotent re-open check for an already-bound object. The same path
    /// returns the current element count; a different path is a rebind
    /// error and leaves the object untouched.
    pub fn reopen_check(&self, path: &Path) -> Result<u64, StoreError> {
        if self.path != path {
            return Err(StoreError::Rebind {
                bound: self.path.display().to_string(),
                requested: path.display().to_string(),
            });
        }
        Ok(self.count())
    }

    pub fn file_path(&self) -> &Path {
        &self.path
    }

    pub fn element_type(&self) -> ElementType {
        self.ty
    }

    pub fn element_width(&self) -> u8 {
        self.codec.width() as u8
    }

    pub fn is_writable(&self) -> bool {
        self.region.is_writable()
    }

    /// Current element count: logical length divided by element width.
    pub fn count(&self) -> u64 {
        self.region.len() / self.codec.width() as u64
    }

    /// Mapped byte length; what the object costs in address space.
    pub fn mem_usage(&self) -> u64 {
        self.region.len()
    }

    /// Decodes the element at `index`, or `None` when the index is negative
    /// or past the end. Out-of-range reads are not errors.
    pub fn get(&self, index: i64) -> Option<Value> {
        if index < 0 || index as u64 >= self.count() {
            return None;
        }
        Some(self.codec.decode(self.slot(index as u64)))
    }

    /// Per-index [`get`](Self::get) over a batch; output order matches the
    /// input and each index is resolved independently.
    pub fn get_many(&self, indices: &[i64]) -> Vec<Option<Value>> {
        indices.iter().map(|i| self.get(*i)).collect()
    }

    /// All elements in storage order.
    pub fn get_all(&self) -> Vec<Value> {
        (0..self.count())
            .map(|i| self.codec.decode(self.slot(i)))
            .collect()
    }

    /// Overwrites elements in place. Two-phase: every `(index, value)` pair
    /// is validated and encoded into a staging buffer before any element is
    /// modified; a single bad pair aborts the whole call with the store
    /// untouched. Returns the number of pairs written.
    pub fn set_many(&mut self, pairs: &[(i64, &str)]) -> Result<u64> {
        self.ensure_writable()?;

        let width = self.codec.width();
        let count = self.count();
        let mut staged = vec![0u8; pairs.len() * width];
        let mut offsets: SmallVec<[usize; 16]> = SmallVec::with_capacity(pairs.len());

        for (slot, (index, raw)) in staged.chunks_exact_mut(width).zip(pairs) {
            let index = check_index(*index, count)?;
            self.codec.encode(raw, slot)?;
            offsets.push(index as usize * width);
        }

        let mapping = self.region.as_mut_slice();
        for (slot, offset) in staged.chunks_exact(width).zip(&offsets) {
            mapping[*offset..*offset + width].copy_from_slice(slot);
        }

        self.region.flush_async();
        Ok(pairs.len() as u64)
    }

    /// Appends a batch of values, one value per new element for every type.
    /// All values are validated and encoded first; the backing store then
    /// grows exactly once for the whole batch (remapping is the expensive
    /// step), and the staged bytes land at the old tail. Returns the new
    /// element count.
    pub fn append(&mut self, values: &[&str]) -> Result<u64> {
        self.ensure_writable()?;
        if values.is_empty() {
            return Ok(self.count());
        }

        let width = self.codec.width();
        let mut staged = vec![0u8; values.len() * width];
        for (slot, raw) in staged.chunks_exact_mut(width).zip(values) {
            self.codec.encode(raw, slot)?;
        }

        let old_len = self.region.len();
        self.region.resize(old_len + staged.len() as u64)?;
        self.region.as_mut_slice()[old_len as usize..].copy_from_slice(&staged);

        self.region.flush_async();
        Ok(self.count())
    }

    /// Removes and returns the last element, shrinking the file by one
    /// width. `None` on an empty store.
    pub fn pop(&mut self) -> Result<Option<Value>> {
        self.ensure_writable()?;

        let count = self.count();
        if count == 0 {
            return Ok(None);
        }

        let value = self.codec.decode(self.slot(count - 1));
        let new_len = self.region.len() - self.codec.width() as u64;
        self.region.resize(new_len)?;
        Ok(Some(value))
    }

    /// Truncates the backing file to zero, leaving the store unmapped.
    /// Returns the element count before clearing.
    pub fn clear(&mut self) -> Result<u64> {
        self.ensure_writable()?;

        let previous = self.count();
        self.region.resize(0)?;
        debug!(path = %self.path.display(), previous, "cleared mapped vector");
        Ok(previous)
    }

    /// Synchronously flushes the mapping to disk.
    pub fn flush(&self) -> Result<()> {
        self.region.flush()
    }

    #[cfg(test)]
    pub(crate) fn resize_count(&self) -> u64 {
        self.region.resize_count()
    }

    fn ensure_writable(&self) -> Result<(), StoreError> {
        if self.region.is_writable() {
            Ok(())
        } else {
            Err(StoreError::ReadOnly)
        }
    }

    fn slot(&self, index: u64) -> &[u8] {
        let width = self.codec.width();
        &self.region.as_slice()[index as usize * width..][..width]
    }
}

fn check_index(index: i64, count: u64) -> Result<u64, StoreError> {
    if index < 0 || index as u64 >= count {
        return Err(StoreError::IndexOutOfBounds { index, count });
    }
    Ok(index as u64)
}
