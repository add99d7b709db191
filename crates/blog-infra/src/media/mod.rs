//! Media storage implementations.

mod memory;

pub use memory::InMemoryMediaStore;
