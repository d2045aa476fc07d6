//! Log-stream interpretation and job status polling for jobwatch.

mod board;
mod classifier;
mod control;
mod error;
mod poller;
mod progress;
mod terminal;

pub use board::{BoardChange, ProgressBoard};
pub use classifier::{classify, PROGRESS_SEGMENT_DELIMITER};
pub use control::ActionButton;
pub use error::JobwatchError;
pub use poller::{
    PollOutcome, PollPhase, PollState, QueryFailurePolicy, Scheduler, StatusPoller, StatusSource,
    TokioScheduler, DEFAULT_POLL_INTERVAL,
};
pub use progress::{parse_progress_token, PROGRESS_TOKEN_OPENER};
pub use terminal::{RenderSurface, Terminal, TransportEvent};

/// Result type for jobwatch operations.
pub type Result<T> = std::result::Result<T, JobwatchError>;
