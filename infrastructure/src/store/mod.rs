//! In-memory message store.

mod memory;

pub use memory::InMemoryMessageStore;
