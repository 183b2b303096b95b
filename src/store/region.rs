//! # Mapped Region
//!
//! `MappedRegion` owns the backing file descriptor and its memory mapping
//! as one scoped resource, and is the only place the resize protocol is
//! implemented. The invariants it maintains at every observable point:
//!
//! 1. A mapping is present iff the logical length is greater than zero.
//! 2. Mapping length == logical length == on-disk file length.
//!
//! ## Resize Protocol
//!
//! Every length change runs the same three steps, in this order, never
//! skipped or reordered:
//!
//! 1. Unmap the current mapping if present.
//! 2. Change the file length with `set_len` (truncate/extend). Extension
//!    zero-fills the new tail per POSIX `ftruncate` semantics.
//! 3. Remap the new length if it is greater than zero, else stay unmapped.
//!
//! When a remap fails, after a successful truncate or while restoring
//! after a failed one, the region degrades to a mapping-absent state:
//! the length field still matches the on-disk file length (invariant 2
//! holds), invariant 1 is suspended until the next successful resize,
//! and the slices read empty. The region never holds a stale mapping.
//!
//! ## Teardown
//!
//! Drop unmaps and closes unconditionally. The same holds for partially
//! constructed regions: if mapping fails during `open`, the already-opened
//! `File` is dropped (and the descriptor closed) on the error return path.

use std::fs::{File, OpenOptions};
use std::path::Path;

use eyre::{Result, WrapErr};
use memmap2::{Mmap, MmapMut};
use tracing::{debug, trace};

#[derive(Debug)]
enum Mapping {
    Rw(MmapMut),
    Ro(Mmap),
}

/// Owner of one backing file and its current mapping.
///
/// Field order matters for Drop: the mapping is released before the file
/// is closed.
#[derive(Debug)]
pub(crate) struct MappedRegion {
    mapping: Option<Mapping>,
    file: File,
    len: u64,
    writable: bool,
    resizes: u64,
}

impl MappedRegion {
    /// Opens or (in writable mode) creates the backing file and maps it
    /// whole if non-empty. The existing file size is adopted as-is.
    pub(crate) fn open(path: &Path, writable: bool) -> Result<Self> {
        let file = if writable {
            OpenOptions::new()
                .read(true)
                .write(true)
                .create(true)
                .open(path)
        } else {
            OpenOptions::new().read(true).open(path)
        }
        .wrap_err_with(|| format!("failed to open backing file '{}'", path.display()))?;

        let len = file
            .metadata()
            .wrap_err_with(|| format!("failed to stat backing file '{}'", path.display()))?
            .len();

        let mapping = if len > 0 {
            Some(map_file(&file, writable).wrap_err_with(|| {
                format!("failed to memory-map backing file '{}'", path.display())
            })?)
        } else {
            None
        };

        Ok(Self {
            mapping,
            file,
            len,
            writable,
            resizes: 0,
        })
    }

    pub(crate) fn len(&self) -> u64 {
        self.len
    }

    pub(crate) fn is_writable(&self) -> bool {
        self.writable
    }

    /// Number of resize protocol runs since open. Used to verify that bulk
    /// append grows exactly once per batch.
    #[cfg(test)]
    pub(crate) fn resize_count(&self) -> u64 {
        self.resizes
    }

    /// The mapped bytes, empty when the region is unmapped.
    pub(crate) fn as_slice(&self) -> &[u8] {
        match &self.mapping {
            Some(Mapping::Rw(m)) => m,
            Some(Mapping::Ro(m)) => m,
            None => &[],
        }
    }

    /// Mutable view of the mapped bytes. Empty for read-only or unmapped
    /// regions; callers gate on `is_writable` first.
    pub(crate) fn as_mut_slice(&mut self) -> &mut [u8] {
        match &mut self.mapping {
            Some(Mapping::Rw(m)) => m,
            _ => &mut [],
        }
    }

    /// Runs the three-step resize protocol to the new length.
    pub(crate) fn resize(&mut self, new_len: u64) -> Result<()> {
        self.resizes += 1;
        trace!(
            old_len = self.len,
            new_len,
            resizes = self.resizes,
            "resizing mapped region"
        );
        self.mapping = None;

        if let Err(err) = self.file.set_len(new_len) {
            // The file kept its old length, so the length field already
            // matches the on-disk state; remap it before the error
            // surfaces. If the remap also fails the region degrades to
            // the documented mapping-absent state.
            if self.len > 0 {
                self.mapping = map_file(&self.file, self.writable).ok();
            }
            return Err(err)
                .wrap_err_with(|| format!("failed to resize backing file to {new_len} bytes"));
        }

        self.len = new_len;
        if new_len > 0 {
            // On failure: len already matches the truncated file, mapping
            // stays None.
            self.mapping = Some(
                map_file(&self.file, self.writable)
                    .wrap_err("failed to remap backing file after resize")?,
            );
        }
        Ok(())
    }

    /// Requests asynchronous write-back of the mapping. Best-effort: the
    /// data becomes durable at the OS's discretion and failures are logged,
    /// not propagated.
    pub(crate) fn flush_async(&self) {
        if let Some(Mapping::Rw(m)) = &self.mapping {
            if let Err(err) = m.flush_async() {
                debug!(%err, "async flush of mapping failed");
            }
        }
    }

    /// Synchronous flush of the mapping, for snapshot boundaries.
    pub(crate) fn flush(&self) -> Result<()> {
        if let Some(Mapping::Rw(m)) = &self.mapping {
            m.flush().wrap_err("failed to flush mapping to disk")?;
        }
        Ok(())
    }
}

fn map_file(file: &File, writable: bool) -> Result<Mapping> {
    // SAFETY: map_mut/map are unsafe because the file could be modified or
    // truncated externally, invalidating the mapping. This is safe under the
    // store's documented contract:
    // 1. The region exclusively owns the descriptor; all in-process length
    //    changes go through resize(), which never leaves a stale mapping.
    // 2. Concurrent external writers to the same path are explicitly
    //    unsupported (see crate docs).
    // 3. All access goes through as_slice/as_mut_slice, bounded by the
    //    mapping length which always equals the file length.
    if writable {
        let m = unsafe { MmapMut::map_mut(file)? };
        Ok(Mapping::Rw(m))
    } else {
        let m = unsafe { Mmap::map(file)? };
        Ok(Mapping::Ro(m))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn create_starts_empty_and_unmapped() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("region.bin");

        let region = MappedRegion::open(&path, true).unwrap();

        assert_eq!(region.len(), 0);
        assert!(region.as_slice().is_empty());
        assert_eq!(std::fs::metadata(&path).unwrap().len(), 0);
    }

    #[test]
    fn open_missing_file_read_only_fails() {
        let dir = tempdir().unwrap();
        let result = MappedRegion::open(&dir.path().join("absent.bin"), false);
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("failed to open backing file"));
    }

    #[test]
    fn grow_zero_fills_and_maps() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("region.bin");

        let mut region = MappedRegion::open(&path, true).unwrap();
        region.resize(8).unwrap();

        assert_eq!(region.len(), 8);
        assert_eq!(region.as_slice(), &[0u8; 8]);
        assert_eq!(std::fs::metadata(&path).unwrap().len(), 8);

        region.as_mut_slice()[0] = 0xAB;
        region.resize(16).unwrap();
        assert_eq!(region.as_slice()[0], 0xAB);
        assert_eq!(&region.as_slice()[8..], &[0u8; 8]);
    }

    #[test]
    fn shrink_to_zero_unmaps() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("region.bin");

        let mut region = MappedRegion::open(&path, true).unwrap();
        region.resize(4).unwrap();
        region.resize(0).unwrap();

        assert_eq!(region.len(), 0);
        assert!(region.as_slice().is_empty());
        assert_eq!(std::fs::metadata(&path).unwrap().len(), 0);
    }

    #[test]
    fn adopts_existing_file_size() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("region.bin");
        std::fs::File::create(&path)
            .unwrap()
            .write_all(&[1, 2, 3, 4])
            .unwrap();

        let region = MappedRegion::open(&path, false).unwrap();
        assert_eq!(region.len(), 4);
        assert_eq!(region.as_slice(), &[1, 2, 3, 4]);
        assert!(!region.is_writable());
    }

    #[test]
    fn resize_counter_tracks_protocol_runs() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("region.bin");

        let mut region = MappedRegion::open(&path, true).unwrap();
        assert_eq!(region.resize_count(), 0);
        region.resize(8).unwrap();
        region.resize(4).unwrap();
        assert_eq!(region.resize_count(), 2);
    }

    #[test]
    fn len_tracks_on_disk_length() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("region.bin");

        let mut region = MappedRegion::open(&path, true).unwrap();
        for new_len in [8u64, 24, 4, 0, 16] {
            region.resize(new_len).unwrap();
            assert_eq!(
                region.len(),
                std::fs::metadata(&path).unwrap().len(),
                "after resize to {new_len}"
            );
        }
    }

    #[test]
    fn drop_releases_file_for_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("region.bin");

        {
            let mut region = MappedRegion::open(&path, true).unwrap();
            region.resize(2).unwrap();
            region.as_mut_slice().copy_from_slice(&[7, 9]);
            region.flush().unwrap();
        }

        let region = MappedRegion::open(&path, false).unwrap();
        assert_eq!(region.as_slice(), &[7, 9]);
    }
}
