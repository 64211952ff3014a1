use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::{Partition, PartitionSlotList, SlotKey};

const MAX_INSTANCE_ID_LEN: usize = 256;

pub fn now_nanos() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos()
        .try_into()
        .unwrap_or(i64::MAX)
}

/// Strictly increasing version stamps.
///
/// Stamps follow wall-clock nanoseconds, but never repeat or go backwards
/// even if the clock does: each stamp is `max(now, last + 1)`.
#[derive(Debug, Default)]
pub struct VersionClock {
    last: AtomicI64,
}

impl VersionClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&self) -> i64 {
        let now = now_nanos();
        let previous = self
            .last
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |last| {
                Some(now.max(last.saturating_add(1)))
            })
            .unwrap_or_else(|last| last);
        now.max(previous.saturating_add(1))
    }
}

/// A slot whose owner changed between two assignments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotMove {
    pub slot: SlotKey,
    pub from: Option<String>,
    pub to: Option<String>,
}

/// Compare two assignments of the same ring and list the slots that changed
/// owner, in `next` order.
///
/// Slots that only exist in one of the two lists are not included: a new slot
/// needs a direct assignment, not a handoff.
pub fn compute_slot_moves(previous: &PartitionSlotList, next: &PartitionSlotList) -> Vec<SlotMove> {
    let before: HashMap<SlotKey, Option<&str>> = previous
        .slots()
        .iter()
        .map(|slot| (slot.key(), slot.assignee()))
        .collect();

    next.slots()
        .iter()
        .filter_map(|slot| {
            let old_owner = *before.get(&slot.key())?;
            (old_owner != slot.assignee()).then(|| SlotMove {
                slot: slot.key(),
                from: old_owner.map(str::to_string),
                to: slot.assigned_instance_id.clone(),
            })
        })
        .collect()
}

/// Check that every partition belongs to a ring of `ring_size` keys, is a
/// non-empty range inside it, and that no two partitions overlap.
pub fn validate_partitions(ring_size: u32, partitions: &[Partition]) -> Result<()> {
    for partition in partitions {
        if partition.ring_size != ring_size {
            return Err(Error::RingSizeMismatch {
                expected: ring_size,
                found: partition.ring_size,
            });
        }
        Partition::new(partition.range_start, partition.range_stop, ring_size)?;
    }

    let mut sorted: Vec<&Partition> = partitions.iter().collect();
    sorted.sort_by_key(|p| p.key());
    for pair in sorted.windows(2) {
        if pair[0].overlaps(pair[1]) {
            return Err(Error::OverlappingPartitions {
                first: pair[0].key(),
                second: pair[1].key(),
            });
        }
    }
    Ok(())
}

/// Validate a consumer instance id before it's handed to a rebalance.
///
/// An empty id can't be told apart from "unassigned" by consumers that read
/// the published mapping.
pub fn validate_instance_id(id: &str) -> Result<()> {
    if id.trim().is_empty() || id.len() > MAX_INSTANCE_ID_LEN {
        return Err(Error::InvalidInstanceId(format!(
            "instance id must be 1-{MAX_INSTANCE_ID_LEN} non-blank characters"
        )));
    }
    if id.chars().any(char::is_control) {
        return Err(Error::InvalidInstanceId(format!(
            "instance id {id:?} contains control characters"
        )));
    }
    Ok(())
}
