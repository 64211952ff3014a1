//! Sticky partition-to-consumer assignment for a fixed-size partition ring.
//!
//! A ring of `ring_size` keys is carved into contiguous partitions. Given the
//! current partitions and the live consumer instances, a [`MappingCoordinator`]
//! computes which instance owns each partition slot, keeping existing owners
//! wherever it can and publishing each result as an immutable, versioned
//! [`PartitionSlotList`].
//!
//! Deciding when to rebalance, liveness detection and broadcasting the mapping
//! to consumers are left to the embedding service.

pub mod config;
pub mod coordinator;
pub mod error;
pub mod metrics_const;
pub mod strategy;
pub mod types;
pub mod util;

pub use coordinator::{MappingCoordinator, RebalanceOutcome, SkipReason};
pub use error::{Error, Result};
pub use types::{to_partition_slots, Partition, PartitionSlot, PartitionSlotList, SlotKey};
