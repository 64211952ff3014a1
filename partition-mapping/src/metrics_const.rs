/// Counter for rebalance calls, labelled with `outcome` (applied/skipped)
pub const REBALANCES_TOTAL_COUNTER: &str = "partition_mapping_rebalances_total";

/// Counter for slots whose owner changed across an applied rebalance
pub const SLOTS_MOVED_TOTAL_COUNTER: &str = "partition_mapping_slots_moved_total";

/// Gauge for slots left without an owner by the latest rebalance
pub const UNASSIGNED_SLOTS_GAUGE: &str = "partition_mapping_unassigned_slots";

/// Gauge for slots with an owner in the latest rebalance
pub const ASSIGNED_SLOTS_GAUGE: &str = "partition_mapping_assigned_slots";

/// Gauge for the version of the current assignment
pub const MAPPING_VERSION_GAUGE: &str = "partition_mapping_version";
