//! # Persistence Adapter
//!
//! Hooks the host calls at snapshot and replay boundaries. Never invoked
//! during normal reads or writes.
//!
//! ## Snapshots
//!
//! A snapshot persists metadata only: path, type name, width, writability.
//! The element bytes live in the backing file itself, so the snapshot
//! first flushes the mapping synchronously and then records the four
//! fields. Restore re-runs open with them; a missing or unreadable file is
//! a hard restore failure.
//!
//! ## Replay Re-expression
//!
//! A writable store re-expresses as "open, clear, append every current
//! element in order" - idempotent on replay. A read-only store does not
//! own its element bytes (the log cannot safely recreate the external
//! file), so it re-expresses as "delete the binding, reopen the same path
//! read-only" instead. Float80 follows the same textual emission rule as
//! every other fixed-width numeric type.

use eyre::{Result, WrapErr};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::store::MappedVector;
use crate::types::ElementType;

/// Metadata-only persisted description of one store: enough to reopen it,
/// never any element data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotRecord {
    pub file_path: String,
    pub element_type: String,
    pub element_width: u8,
    pub writable: bool,
}

impl SnapshotRecord {
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        bincode::serialize(self).wrap_err("failed to encode snapshot record")
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        bincode::deserialize(bytes).wrap_err("failed to decode snapshot record")
    }
}

/// One idempotent-on-replay operation for log re-expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplayOp {
    Open {
        key: String,
        path: String,
        type_name: String,
        width: u8,
        writable: bool,
    },
    Clear {
        key: String,
    },
    Append {
        key: String,
        value: String,
    },
    Delete {
        key: String,
    },
}

/// Emits the snapshot record for a store, flushing the mapping first so
/// the on-disk file reflects the in-memory state at the snapshot instant.
pub fn snapshot(store: &MappedVector) -> Result<SnapshotRecord> {
    store.flush()?;
    Ok(SnapshotRecord {
        file_path: store.file_path().display().to_string(),
        element_type: store.element_type().name().to_string(),
        element_width: store.element_width(),
        writable: store.is_writable(),
    })
}

/// Reopens a store from its snapshot record. Open failure (file missing,
/// permission denied) is a hard restore failure.
pub fn restore(record: &SnapshotRecord) -> Result<MappedVector> {
    let ty = ElementType::parse(&record.element_type)?;
    let store = MappedVector::open(
        record.file_path.as_str(),
        ty,
        Some(record.element_width as u64),
        record.writable,
    )
    .wrap_err_with(|| format!("failed to restore store from '{}'", record.file_path))?;
    debug!(path = %record.file_path, count = store.count(), "restored mapped vector");
    Ok(store)
}

/// Re-expresses a store as a sequence of replay operations under `key`.
pub fn replay_ops(key: &str, store: &MappedVector) -> Vec<ReplayOp> {
    let open = ReplayOp::Open {
        key: key.to_string(),
        path: store.file_path().display().to_string(),
        type_name: store.element_type().name().to_string(),
        width: store.element_width(),
        writable: store.is_writable(),
    };

    if !store.is_writable() {
        // The log does not own read-only bytes: rebind instead of replaying.
        return vec![
            ReplayOp::Delete {
                key: key.to_string(),
            },
            open,
        ];
    }

    let mut ops = Vec::with_capacity(store.count() as usize + 2);
    ops.push(open);
    ops.push(ReplayOp::Clear {
        key: key.to_string(),
    });
    for value in store.get_all() {
        ops.push(ReplayOp::Append {
            key: key.to_string(),
            value: value.to_string(),
        });
    }
    ops
}
