//! Line classification for the job log stream.

use crate::progress::{parse_progress_token, PROGRESS_TOKEN_OPENER};
use jobwatch_types::{LogCategory, LogLine};

/// Separator between the logger preamble and the message of a log line.
pub const PROGRESS_SEGMENT_DELIMITER: &str = " : ";

/// Prefix markers, checked in this order.
const MARKERS: [(&str, LogCategory); 4] = [
    ("[E", LogCategory::Error),
    ("[D", LogCategory::Debug),
    ("[I", LogCategory::Info),
    ("[W", LogCategory::Warning),
];

/// Classify one raw line.
///
/// Info lines whose last `" : "` segment opens a progress token carry the
/// parsed update; a token that fails to parse leaves an ordinary Info line.
pub fn classify(line: &str) -> LogLine {
    let category = MARKERS
        .iter()
        .find(|(marker, _)| line.starts_with(*marker))
        .map(|(_, category)| *category)
        .unwrap_or(LogCategory::Plain);

    let progress = match category {
        LogCategory::Info => line
            .rsplit(PROGRESS_SEGMENT_DELIMITER)
            .next()
            .filter(|segment| segment.starts_with(PROGRESS_TOKEN_OPENER))
            .and_then(parse_progress_token),
        LogCategory::Error | LogCategory::Debug | LogCategory::Warning | LogCategory::Plain => None,
    };

    LogLine {
        text: line.to_string(),
        category,
        progress,
    }
}
