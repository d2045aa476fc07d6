//! Shared types for the jobwatch control panel.

mod indicator;
mod job;
mod log;

pub use indicator::*;
pub use job::*;
pub use log::*;
