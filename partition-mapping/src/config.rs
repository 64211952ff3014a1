use std::sync::Arc;

use envconfig::Envconfig;

use crate::error::{Error, Result};
use crate::strategy::{AssignmentStrategy, StickyBalancedStrategy, StickyFillStrategy};

#[derive(Envconfig, Clone, Debug)]
pub struct Config {
    // ── Ring ────────────────────────────────────────────────────────
    #[envconfig(default = "4096")]
    pub ring_size: u32,

    // ── Coordinator ─────────────────────────────────────────────────
    /// Number of superseded assignments kept for inspection. Only the most
    /// recent one is ever fed back into a rebalance.
    #[envconfig(default = "8")]
    pub mapping_history_size: usize,

    #[envconfig(default = "sticky_fill")]
    pub assignment_strategy: String,
}

impl Config {
    pub fn init_with_defaults() -> Result<Self> {
        Ok(Config::init_from_env()?)
    }

    pub fn strategy(&self) -> Result<Arc<dyn AssignmentStrategy>> {
        match self.assignment_strategy.trim() {
            "sticky_fill" => Ok(Arc::new(StickyFillStrategy)),
            "sticky_balanced" => Ok(Arc::new(StickyBalancedStrategy)),
            other => Err(Error::UnknownStrategy(other.to_string())),
        }
    }
}
