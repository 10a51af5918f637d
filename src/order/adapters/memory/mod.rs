//! In-memory adapters for order persistence.

mod order;

pub use order::InMemoryOrderRepository;
