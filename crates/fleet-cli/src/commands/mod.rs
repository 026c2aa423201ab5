//! Command implementations

pub mod report;
pub mod scout;
pub mod tag;
