pub mod hosted;
pub mod memory;
pub mod postgres;
mod store;

pub use hosted::HostedStore;
pub use memory::InMemoryStore;
pub use postgres::{create_pool, PgStore};
pub use store::TrackerStore;

#[cfg(test)]
pub use store::MockTrackerStore;
