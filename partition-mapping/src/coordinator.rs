use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use crate::config::Config;
use crate::error::Result;
use crate::metrics_const::{
    ASSIGNED_SLOTS_GAUGE, MAPPING_VERSION_GAUGE, REBALANCES_TOTAL_COUNTER,
    SLOTS_MOVED_TOTAL_COUNTER, UNASSIGNED_SLOTS_GAUGE,
};
use crate::strategy::{AssignmentStrategy, StickyFillStrategy};
use crate::types::{Partition, PartitionSlotList};
use crate::util::{compute_slot_moves, VersionClock};

pub const DEFAULT_HISTORY_SIZE: usize = 8;

/// Why a rebalance call left the mapping untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NoPartitions,
    NoInstances,
    /// A partition was carved from a different ring than the coordinator's.
    RingSizeMismatch { expected: u32, found: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RebalanceOutcome {
    /// The call was a no-op; the current mapping is unchanged.
    Skipped(SkipReason),
    /// A new mapping was published.
    Applied {
        version: i64,
        /// Slots present in both mappings whose owner changed.
        moved: usize,
        /// Slots the strategy could not place; a later rebalance may fill them.
        unassigned: usize,
    },
}

impl RebalanceOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied { .. })
    }
}

struct MappingState {
    current: Arc<PartitionSlotList>,
    /// Superseded mappings, oldest first, bounded by the coordinator's history size.
    previous: VecDeque<Arc<PartitionSlotList>>,
    /// False until the first applied rebalance; the initial empty mapping is
    /// not a real assignment and is never fed to the strategy.
    rebalanced: bool,
}

/// Owns the current slot-to-instance mapping of one ring and produces new
/// ones on request.
///
/// Rebalances are serialized. Readers calling [`MappingCoordinator::current`]
/// never wait on a rebalance's computation and always get a complete,
/// immutable mapping: either the one before or the one after.
pub struct MappingCoordinator {
    ring_size: u32,
    history_size: usize,
    strategy: Arc<dyn AssignmentStrategy>,
    versions: VersionClock,
    state: Mutex<MappingState>,
    published: RwLock<Arc<PartitionSlotList>>,
}

impl MappingCoordinator {
    /// A coordinator for a ring of `ring_size` keys using [`StickyFillStrategy`].
    pub fn new(ring_size: u32) -> Self {
        Self::with_strategy(ring_size, DEFAULT_HISTORY_SIZE, Arc::new(StickyFillStrategy))
    }

    pub fn with_strategy(
        ring_size: u32,
        history_size: usize,
        strategy: Arc<dyn AssignmentStrategy>,
    ) -> Self {
        let versions = VersionClock::new();
        let initial = Arc::new(PartitionSlotList::empty(ring_size, versions.next()));
        Self {
            ring_size,
            history_size,
            strategy,
            versions,
            state: Mutex::new(MappingState {
                current: Arc::clone(&initial),
                previous: VecDeque::with_capacity(history_size),
                rebalanced: false,
            }),
            published: RwLock::new(initial),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::with_strategy(
            config.ring_size,
            config.mapping_history_size,
            config.strategy()?,
        ))
    }

    pub fn ring_size(&self) -> u32 {
        self.ring_size
    }

    pub fn strategy_name(&self) -> &'static str {
        self.strategy.name()
    }

    /// Snapshot of the current mapping.
    pub fn current(&self) -> Arc<PartitionSlotList> {
        Arc::clone(&self.published.read())
    }

    /// The most recently superseded mapping still retained, if any.
    pub fn previous(&self) -> Option<Arc<PartitionSlotList>> {
        self.state.lock().previous.back().cloned()
    }

    /// Retained superseded mappings, oldest first.
    pub fn history(&self) -> Vec<Arc<PartitionSlotList>> {
        self.state.lock().previous.iter().cloned().collect()
    }

    /// Compute and publish a new mapping covering `partitions` with the live
    /// `instance_ids`, seeded from the mapping being replaced.
    ///
    /// Empty inputs and partitions from another ring leave the state untouched.
    pub fn rebalance(&self, partitions: &[Partition], instance_ids: &[String]) -> RebalanceOutcome {
        if let Some(reason) = self.check_inputs(partitions, instance_ids) {
            tracing::debug!(?reason, "skipping rebalance");
            metrics::counter!(REBALANCES_TOTAL_COUNTER, "outcome" => "skipped").increment(1);
            return RebalanceOutcome::Skipped(reason);
        }

        let mut state = self.state.lock();

        let replaced = Arc::clone(&state.current);
        let previous = state.rebalanced.then_some(replaced.as_ref());
        if let Some(previous) = previous {
            let departed: Vec<&str> = previous
                .load()
                .into_keys()
                .filter(|owner| !instance_ids.iter().any(|id| id.as_str() == *owner))
                .collect();
            if !departed.is_empty() {
                tracing::info!(?departed, "releasing slots of departed instances");
            }
        }

        let slots = self.strategy.assign(partitions, instance_ids, previous);
        let next = Arc::new(PartitionSlotList::new(
            self.ring_size,
            self.versions.next(),
            slots,
        ));

        let moved = compute_slot_moves(&replaced, &next).len();
        let unassigned = next.unassigned().count();

        state.previous.push_back(replaced);
        while state.previous.len() > self.history_size {
            state.previous.pop_front();
        }
        state.current = Arc::clone(&next);
        state.rebalanced = true;
        *self.published.write() = Arc::clone(&next);
        drop(state);

        tracing::info!(
            strategy = self.strategy.name(),
            version = next.version(),
            slots = next.len(),
            instances = instance_ids.len(),
            moved,
            unassigned,
            "published new partition mapping"
        );
        if unassigned > 0 {
            tracing::warn!(
                version = next.version(),
                unassigned,
                "rebalance left slots unassigned, a later rebalance may place them"
            );
        }

        metrics::counter!(REBALANCES_TOTAL_COUNTER, "outcome" => "applied").increment(1);
        metrics::counter!(SLOTS_MOVED_TOTAL_COUNTER).increment(moved as u64);
        metrics::gauge!(UNASSIGNED_SLOTS_GAUGE).set(unassigned as f64);
        metrics::gauge!(ASSIGNED_SLOTS_GAUGE).set((next.len() - unassigned) as f64);
        metrics::gauge!(MAPPING_VERSION_GAUGE).set(next.version() as f64);

        RebalanceOutcome::Applied {
            version: next.version(),
            moved,
            unassigned,
        }
    }

    fn check_inputs(&self, partitions: &[Partition], instance_ids: &[String]) -> Option<SkipReason> {
        if partitions.is_empty() {
            return Some(SkipReason::NoPartitions);
        }
        if instance_ids.is_empty() {
            return Some(SkipReason::NoInstances);
        }
        partitions
            .iter()
            .find(|p| p.ring_size != self.ring_size)
            .map(|p| SkipReason::RingSizeMismatch {
                expected: self.ring_size,
                found: p.ring_size,
            })
    }
}
