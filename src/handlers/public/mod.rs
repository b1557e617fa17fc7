// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Service banner and health probe. No principal is available here.
pub mod health;

pub use health::{health, root};
