pub mod backend;
pub mod config;
pub mod executor;
pub mod formatter;

pub use shadowpath_common::protocol;
