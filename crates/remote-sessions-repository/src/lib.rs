//! Local session repository implementations.
//!
//! Provides:
//! - `MemoryRepository` - In-memory, keyed by session instance id

pub mod memory;

pub use memory::MemoryRepository;
