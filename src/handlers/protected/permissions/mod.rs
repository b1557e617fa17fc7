pub mod catalog;
pub mod check;

pub use catalog::catalog_get;
pub use check::check_get;
