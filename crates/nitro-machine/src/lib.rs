//! Hardware state construction for nitrous
//!
//! Builds the initial machine context (memory banks, register files,
//! save backend) from the artifacts the loader stages produce.

pub mod cpu;
pub mod machine;
pub mod memory;

pub use cpu::{CpuId, RegisterFile};
pub use machine::{Machine, SaveBackend};
pub use memory::{BankFlags, MemoryBank, MemoryBanks};
