// handlers/protected/mod.rs - Protected handlers (bearer token required)
//
// Every route under /api/* runs behind the authentication gate, so handlers
// can extract `Principal` directly. Routes needing a named permission add a
// `require_permission` guard in the route table.
pub mod auth; // Identity introspection
pub mod permissions; // Permission catalog and checks
