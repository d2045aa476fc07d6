//! Error types for jobwatch.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum JobwatchError {
    #[error("Status query failed: {0}")]
    StatusQuery(String),

    #[error("Status response carried no status value")]
    MissingStatusValue,
}
