pub mod manager;
pub mod memory;
pub mod permissions;
pub mod store;

pub use manager::{connect_pool, health_check, DatabaseError};
pub use memory::{Membership, MemoryPermissionStore};
pub use permissions::{PermissionStore, PgPermissionStore};
pub use store::store_from_config;
