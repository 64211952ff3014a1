#![allow(dead_code)]

use std::collections::BTreeSet;

use partition_mapping::{Partition, PartitionSlotList, SlotKey};

pub const RING_SIZE: u32 = 100;

/// `count` contiguous partitions of (nearly) equal width covering the ring.
pub fn ring_partitions(ring_size: u32, count: u32) -> Vec<Partition> {
    let width = ring_size / count;
    (0..count)
        .map(|i| {
            let stop = if i == count - 1 {
                ring_size
            } else {
                (i + 1) * width
            };
            Partition::new(i * width, stop, ring_size).expect("valid partition")
        })
        .collect()
}

pub fn quarters() -> Vec<Partition> {
    ring_partitions(RING_SIZE, 4)
}

pub fn ids(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| n.to_string()).collect()
}

pub fn owners(list: &PartitionSlotList) -> Vec<Option<String>> {
    list.slots()
        .iter()
        .map(|slot| slot.assigned_instance_id.clone())
        .collect()
}

pub fn load_of(list: &PartitionSlotList, instance: &str) -> usize {
    list.slots_for(instance).count()
}

/// Every partition is covered exactly once, in input order, and no slot is invented.
pub fn assert_covers(list: &PartitionSlotList, partitions: &[Partition]) {
    let expected: Vec<SlotKey> = partitions.iter().map(Partition::key).collect();
    let actual: Vec<SlotKey> = list.slots().iter().map(|slot| slot.key()).collect();
    assert_eq!(actual, expected, "slot keys must match the partitions");
    assert!(list.slots().iter().all(|slot| slot.ring_size == list.ring_size()));
}

/// No slot points at an instance outside `live`.
pub fn assert_only_live_owners(list: &PartitionSlotList, live: &[String]) {
    for slot in list.slots() {
        if let Some(owner) = slot.assignee() {
            assert!(
                live.iter().any(|id| id == owner),
                "slot {} still owned by departed instance {owner}",
                slot.key()
            );
        }
    }
}

/// Slots that existed before and whose owner is still live kept that owner.
pub fn assert_sticky(previous: &PartitionSlotList, next: &PartitionSlotList, live: &[String]) {
    for slot in next.slots() {
        let Some(before) = previous
            .slots()
            .iter()
            .find(|prev| prev.key() == slot.key())
        else {
            continue;
        };
        if let Some(owner) = before.assignee() {
            if live.iter().any(|id| id == owner) {
                assert_eq!(
                    slot.assignee(),
                    Some(owner),
                    "slot {} moved away from live owner {owner}",
                    slot.key()
                );
            }
        }
    }
}

/// Every instance holding slots sits within one slot of the ideal share.
pub fn assert_load_bound(list: &PartitionSlotList, instances: usize) {
    let distinct: BTreeSet<&str> = list.slots().iter().filter_map(|s| s.assignee()).collect();
    assert!(distinct.len() <= instances);

    let average = list.len() as f64 / instances as f64;
    let (floor, ceil) = (average.floor() as usize, average.ceil() as usize);
    for (owner, load) in list.load() {
        assert!(
            (floor..=ceil).contains(&load),
            "{owner} owns {load} slots, expected within [{floor}, {ceil}]"
        );
    }
}
