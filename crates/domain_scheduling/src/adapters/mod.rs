//! Port adapters

pub mod memory;

pub use memory::InMemoryScheduleStore;
