use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A contiguous range `[range_start, range_stop)` carved out of a ring of
/// `ring_size` keys.
///
/// Partitions are owned by the external topic catalog; this crate only reads
/// them. All partitions handed to a single rebalance must share one ring size
/// and must not overlap, but they don't need to cover the whole ring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Partition {
    pub range_start: u32,
    pub range_stop: u32,
    pub ring_size: u32,
}

impl Partition {
    /// Build a partition, rejecting empty ranges and ranges that run past the ring.
    pub fn new(range_start: u32, range_stop: u32, ring_size: u32) -> Result<Self> {
        if range_start >= range_stop || range_stop > ring_size {
            return Err(Error::InvalidPartition {
                start: range_start,
                stop: range_stop,
                ring_size,
            });
        }
        Ok(Self {
            range_start,
            range_stop,
            ring_size,
        })
    }

    pub fn key(&self) -> SlotKey {
        SlotKey {
            range_start: self.range_start,
            range_stop: self.range_stop,
        }
    }

    pub fn overlaps(&self, other: &Partition) -> bool {
        self.range_start < other.range_stop && other.range_start < self.range_stop
    }
}

/// Identity of a slot within one ring: its `(range_start, range_stop)` pair.
///
/// Used to correlate slots across two assignments computed for the same ring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SlotKey {
    pub range_start: u32,
    pub range_stop: u32,
}

impl fmt::Display for SlotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.range_start, self.range_stop)
    }
}

/// One partition range plus the consumer instance that owns it.
///
/// `assigned_instance_id` is `None` while the slot is unassigned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionSlot {
    pub range_start: u32,
    pub range_stop: u32,
    pub ring_size: u32,
    pub assigned_instance_id: Option<String>,
}

impl PartitionSlot {
    pub fn key(&self) -> SlotKey {
        SlotKey {
            range_start: self.range_start,
            range_stop: self.range_stop,
        }
    }

    pub fn is_assigned(&self) -> bool {
        self.assigned_instance_id.is_some()
    }

    pub fn assignee(&self) -> Option<&str> {
        self.assigned_instance_id.as_deref()
    }
}

impl From<&Partition> for PartitionSlot {
    fn from(partition: &Partition) -> Self {
        Self {
            range_start: partition.range_start,
            range_stop: partition.range_stop,
            ring_size: partition.ring_size,
            assigned_instance_id: None,
        }
    }
}

/// Build one unassigned slot per partition, in input order.
pub fn to_partition_slots(partitions: &[Partition]) -> Vec<PartitionSlot> {
    partitions.iter().map(PartitionSlot::from).collect()
}

/// A complete, versioned assignment of one ring.
///
/// Once a list is published by the coordinator it is shared behind an `Arc`
/// and never mutated again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionSlotList {
    version: i64,
    ring_size: u32,
    slots: Vec<PartitionSlot>,
}

impl PartitionSlotList {
    pub fn new(ring_size: u32, version: i64, slots: Vec<PartitionSlot>) -> Self {
        Self {
            version,
            ring_size,
            slots,
        }
    }

    pub fn empty(ring_size: u32, version: i64) -> Self {
        Self::new(ring_size, version, Vec::new())
    }

    pub fn version(&self) -> i64 {
        self.version
    }

    pub fn ring_size(&self) -> u32 {
        self.ring_size
    }

    pub fn slots(&self) -> &[PartitionSlot] {
        &self.slots
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Owner of the slot with the given key, if the slot exists and is assigned.
    pub fn assignee_of(&self, key: SlotKey) -> Option<&str> {
        self.slots
            .iter()
            .find(|slot| slot.key() == key)
            .and_then(PartitionSlot::assignee)
    }

    /// Slots owned by `instance_id`, in list order.
    pub fn slots_for<'a>(&'a self, instance_id: &'a str) -> impl Iterator<Item = &'a PartitionSlot> {
        self.slots
            .iter()
            .filter(move |slot| slot.assignee() == Some(instance_id))
    }

    /// Slots left without an owner, in list order.
    pub fn unassigned(&self) -> impl Iterator<Item = &PartitionSlot> {
        self.slots.iter().filter(|slot| !slot.is_assigned())
    }

    pub fn has_unassigned(&self) -> bool {
        self.unassigned().next().is_some()
    }

    /// Number of slots owned by each instance that owns at least one.
    pub fn load(&self) -> BTreeMap<&str, usize> {
        let mut load = BTreeMap::new();
        for owner in self.slots.iter().filter_map(PartitionSlot::assignee) {
            *load.entry(owner).or_insert(0) += 1;
        }
        load
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot(start: u32, stop: u32, owner: Option<&str>) -> PartitionSlot {
        PartitionSlot {
            range_start: start,
            range_stop: stop,
            ring_size: 100,
            assigned_instance_id: owner.map(str::to_string),
        }
    }

    #[test]
    fn partition_new_accepts_valid_range() {
        let p = Partition::new(0, 25, 100).unwrap();
        assert_eq!(p.key(), SlotKey { range_start: 0, range_stop: 25 });
    }

    #[test]
    fn partition_new_rejects_empty_and_out_of_ring() {
        assert!(Partition::new(10, 10, 100).is_err());
        assert!(Partition::new(30, 10, 100).is_err());
        assert!(Partition::new(90, 101, 100).is_err());
    }

    #[test]
    fn overlap_is_half_open() {
        let a = Partition::new(0, 50, 100).unwrap();
        let b = Partition::new(50, 100, 100).unwrap();
        let c = Partition::new(49, 60, 100).unwrap();
        assert!(!a.overlaps(&b));
        assert!(a.overlaps(&c));
        assert!(c.overlaps(&b));
    }

    #[test]
    fn to_partition_slots_preserves_order_and_is_unassigned() {
        let partitions = vec![
            Partition::new(50, 100, 100).unwrap(),
            Partition::new(0, 50, 100).unwrap(),
        ];
        let slots = to_partition_slots(&partitions);
        assert_eq!(slots, vec![slot(50, 100, None), slot(0, 50, None)]);
    }

    #[test]
    fn to_partition_slots_empty() {
        assert!(to_partition_slots(&[]).is_empty());
    }

    #[test]
    fn slot_list_queries() {
        let list = PartitionSlotList::new(
            100,
            7,
            vec![
                slot(0, 25, Some("c1")),
                slot(25, 50, Some("c2")),
                slot(50, 75, None),
                slot(75, 100, Some("c1")),
            ],
        );

        assert_eq!(list.len(), 4);
        assert_eq!(list.assignee_of(SlotKey { range_start: 25, range_stop: 50 }), Some("c2"));
        assert_eq!(list.assignee_of(SlotKey { range_start: 50, range_stop: 75 }), None);
        assert_eq!(list.assignee_of(SlotKey { range_start: 1, range_stop: 2 }), None);
        assert_eq!(list.slots_for("c1").count(), 2);
        assert!(list.has_unassigned());
        assert_eq!(list.unassigned().count(), 1);

        let load = list.load();
        assert_eq!(load.get("c1"), Some(&2));
        assert_eq!(load.get("c2"), Some(&1));
        assert_eq!(load.len(), 2);
    }

    #[test]
    fn slot_list_serializes_unassigned_as_null() {
        let list = PartitionSlotList::new(100, 1, vec![slot(0, 100, None)]);
        let json = serde_json::to_value(&list).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "version": 1,
                "ring_size": 100,
                "slots": [{
                    "range_start": 0,
                    "range_stop": 100,
                    "ring_size": 100,
                    "assigned_instance_id": null,
                }],
            })
        );
    }

    #[test]
    fn slot_key_display() {
        assert_eq!(SlotKey { range_start: 3, range_stop: 9 }.to_string(), "3-9");
    }
}
