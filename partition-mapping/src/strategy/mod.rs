mod sticky_balanced;
mod sticky_fill;

pub use sticky_balanced::StickyBalancedStrategy;
pub use sticky_fill::StickyFillStrategy;

use crate::types::{Partition, PartitionSlot, PartitionSlotList};

/// Trait for slot assignment strategies.
///
/// The coordinator calls `assign` on every applied rebalance, passing the
/// assignment being replaced. Implementations must be deterministic: the same
/// partitions, instance ids and previous assignment always produce the same
/// slots, in `partitions` order.
pub trait AssignmentStrategy: Send + Sync {
    /// Short name used in logs and configuration.
    fn name(&self) -> &'static str;

    /// Compute the new slot list.
    ///
    /// - `partitions`: every partition the new assignment must cover (non-empty)
    /// - `instance_ids`: live consumer instances, order-significant (non-empty)
    /// - `previous`: the assignment being replaced, `None` on the first rebalance
    ///
    /// Slots may be left unassigned when no instance is eligible for them.
    fn assign(
        &self,
        partitions: &[Partition],
        instance_ids: &[String],
        previous: Option<&PartitionSlotList>,
    ) -> Vec<PartitionSlot>;
}
