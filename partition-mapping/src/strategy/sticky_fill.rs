use std::collections::{HashMap, HashSet};

use crate::types::{to_partition_slots, Partition, PartitionSlot, PartitionSlotList, SlotKey};

use super::AssignmentStrategy;

/// Assigns slots while never moving a slot away from a live owner.
///
/// Slots whose previous owner is still live keep that owner. Every other slot
/// is offered to the instances in round-robin order, starting from a cursor
/// that carries over from one slot to the next; the first instance whose load
/// is strictly below `partitions / instances` takes it. A slot nobody can take
/// within one pass over the instances stays unassigned until the next
/// rebalance.
///
/// Because the admission test is a strict comparison against a real-valued
/// average, instances settle at either the floor or the ceiling of the
/// average when the split is uneven.
pub struct StickyFillStrategy;

impl AssignmentStrategy for StickyFillStrategy {
    fn name(&self) -> &'static str {
        "sticky_fill"
    }

    fn assign(
        &self,
        partitions: &[Partition],
        instance_ids: &[String],
        previous: Option<&PartitionSlotList>,
    ) -> Vec<PartitionSlot> {
        let mut slots = to_partition_slots(partitions);
        if instance_ids.is_empty() {
            return slots;
        }

        let live: HashSet<&str> = instance_ids.iter().map(String::as_str).collect();
        let previous_slots = previous.map(PartitionSlotList::slots).unwrap_or_default();

        // Step 1: owners in the previous assignment that are no longer live
        let departed: HashSet<&str> = previous_slots
            .iter()
            .filter_map(PartitionSlot::assignee)
            .filter(|owner| !live.contains(owner))
            .collect();

        // Step 2: carry forward every assignment whose owner didn't leave
        let previous_owners: HashMap<SlotKey, &str> = previous_slots
            .iter()
            .filter_map(|slot| slot.assignee().map(|owner| (slot.key(), owner)))
            .collect();
        for slot in &mut slots {
            if let Some(owner) = previous_owners.get(&slot.key()) {
                if !departed.contains(owner) {
                    slot.assigned_instance_id = Some((*owner).to_string());
                }
            }
        }

        // Step 3: tally carried load against the ideal share
        let mut load: HashMap<&str, usize> = HashMap::with_capacity(live.len());
        for owner in slots.iter().filter_map(PartitionSlot::assignee) {
            if let Some(id) = live.get(owner) {
                *load.entry(*id).or_insert(0) += 1;
            }
        }
        let average = partitions.len() as f64 / instance_ids.len() as f64;

        // Step 4: fill the gaps round-robin, scanning each instance at most once per slot
        let mut cursor = 0;
        for slot in slots.iter_mut().filter(|slot| !slot.is_assigned()) {
            for _ in 0..instance_ids.len() {
                let candidate = instance_ids[cursor].as_str();
                cursor = (cursor + 1) % instance_ids.len();

                let tally = load.entry(candidate).or_insert(0);
                if (*tally as f64) < average {
                    *tally += 1;
                    slot.assigned_instance_id = Some(candidate.to_string());
                    break;
                }
            }
        }

        slots
    }
}
