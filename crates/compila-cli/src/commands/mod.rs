//! Command implementations.

pub mod fill;
pub mod scan;

pub use self::fill::execute_fill;
pub use self::scan::execute_scan;
