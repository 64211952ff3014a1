use std::collections::{HashMap, HashSet};

use crate::types::{to_partition_slots, Partition, PartitionSlot, PartitionSlotList, SlotKey};

use super::AssignmentStrategy;

/// Assigns slots while minimizing movement, capping every instance at its
/// fair share.
///
/// Keeps existing assignments where the owner is still live, up to a
/// per-instance target (each instance gets within +/-1 of the ideal count).
/// Surplus slots are released and handed, together with orphaned and new
/// slots, to the least-loaded instances. When a new instance joins with zero
/// slots this steals the minimum number from the most-loaded instances.
///
/// Duplicate instance ids are collapsed, first occurrence wins.
pub struct StickyBalancedStrategy;

impl AssignmentStrategy for StickyBalancedStrategy {
    fn name(&self) -> &'static str {
        "sticky_balanced"
    }

    fn assign(
        &self,
        partitions: &[Partition],
        instance_ids: &[String],
        previous: Option<&PartitionSlotList>,
    ) -> Vec<PartitionSlot> {
        let mut slots = to_partition_slots(partitions);

        let mut seen = HashSet::new();
        let members: Vec<&str> = instance_ids
            .iter()
            .map(String::as_str)
            .filter(|id| seen.insert(*id))
            .collect();
        if members.is_empty() {
            return slots;
        }

        let num_members = members.len();
        let target_min = slots.len() / num_members;
        let extra = slots.len() % num_members;
        // `extra` members get target_min + 1, the rest get target_min

        // Step 1: Collect valid assignments per member, in slot order
        let position: HashMap<&str, usize> = members
            .iter()
            .enumerate()
            .map(|(i, id)| (*id, i))
            .collect();
        let previous_owners: HashMap<SlotKey, &str> = previous
            .map(PartitionSlotList::slots)
            .unwrap_or_default()
            .iter()
            .filter_map(|slot| slot.assignee().map(|owner| (slot.key(), owner)))
            .collect();

        let mut member_slots: Vec<Vec<usize>> = vec![Vec::new(); num_members];
        for (index, slot) in slots.iter().enumerate() {
            let member = previous_owners
                .get(&slot.key())
                .and_then(|owner| position.get(owner));
            if let Some(&member) = member {
                member_slots[member].push(index);
            }
        }

        // Step 2: Members that already hold more slots get priority for the
        // +1 target. Stable sort, so ties follow the given instance order.
        let mut by_load: Vec<usize> = (0..num_members).collect();
        by_load.sort_by(|a, b| member_slots[*b].len().cmp(&member_slots[*a].len()));

        let mut targets = vec![target_min; num_members];
        for member in by_load.iter().take(extra) {
            targets[*member] += 1;
        }

        // Step 3: Strip surplus, releasing the last slots in partition order
        for (member, owned) in member_slots.iter_mut().enumerate() {
            owned.truncate(targets[member]);
            for &index in owned.iter() {
                slots[index].assigned_instance_id = Some(members[member].to_string());
            }
        }

        // Step 4: Fill from the pool in partition order, emptiest member first
        let mut pool = slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| !slot.is_assigned())
            .map(|(index, _)| index)
            .collect::<Vec<_>>()
            .into_iter();

        let mut fill_order: Vec<usize> = (0..num_members).collect();
        fill_order.sort_by_key(|member| member_slots[*member].len());

        for member in fill_order {
            while member_slots[member].len() < targets[member] {
                let Some(index) = pool.next() else {
                    break;
                };
                slots[index].assigned_instance_id = Some(members[member].to_string());
                member_slots[member].push(index);
            }
        }

        slots
    }
}
