use thiserror::Error;

use crate::types::SlotKey;

#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid partition [{start}, {stop}) for ring size {ring_size}")]
    InvalidPartition { start: u32, stop: u32, ring_size: u32 },

    #[error("ring size mismatch: expected {expected}, found {found}")]
    RingSizeMismatch { expected: u32, found: u32 },

    #[error("partitions {first} and {second} overlap")]
    OverlappingPartitions { first: SlotKey, second: SlotKey },

    #[error("invalid consumer instance id: {0}")]
    InvalidInstanceId(String),

    #[error("unknown assignment strategy: {0}")]
    UnknownStrategy(String),

    #[error(transparent)]
    Config(#[from] envconfig::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
