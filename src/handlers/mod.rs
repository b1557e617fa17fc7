// handlers/mod.rs - Two-tier handler architecture
//
// Public (no auth) → Protected (bearer token, plus per-route permission guards)
pub mod protected; // Tier 2: authentication gate applied (/api/*)
pub mod public; // Tier 1: no authentication required
