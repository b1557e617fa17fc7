pub mod session;

pub use session::{permissions as session_permissions, whoami as session_whoami};
