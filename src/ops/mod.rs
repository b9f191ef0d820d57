//! Ops commands for ring maintenance

pub mod repair;
pub mod verify;

pub use repair::{repair_ring, RepairReport};
pub use verify::{verify_ring, VerifyReport};
