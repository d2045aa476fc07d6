//! Log line types produced by the line classifier.

use serde::{Deserialize, Serialize};

/// Semantic category of one log line, derived from its prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogCategory {
    /// Line starts with `[E`.
    Error,
    /// Line starts with `[D`.
    Debug,
    /// Line starts with `[I`.
    Info,
    /// Line starts with `[W`.
    Warning,
    /// Anything else.
    Plain,
}

impl LogCategory {
    /// Display class used by the web panel for this category.
    pub fn css_class(&self) -> Option<&'static str> {
        match self {
            LogCategory::Error => Some("text-danger"),
            LogCategory::Debug => Some("text-muted"),
            LogCategory::Info => Some("text-info"),
            LogCategory::Warning => Some("text-warning"),
            LogCategory::Plain => None,
        }
    }
}

/// A progress update parsed from a `[# ... #]` token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressUpdate {
    /// Percent as received. Never clamped, may exceed 100.
    pub percent: f64,
    /// Percent exactly as written in the token, e.g. `05`.
    pub percent_text: String,
    /// Target indicator; `None` addresses the default bar.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element_id: Option<String>,
    /// Style tag such as `info` or `danger`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style_type: Option<String>,
    /// Free-text label shown next to the bar.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// One classified line of the job log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogLine {
    pub text: String,
    pub category: LogCategory,
    /// Present only for Info lines carrying a valid progress token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<ProgressUpdate>,
}

impl LogLine {
    pub fn is_progress(&self) -> bool {
        self.progress.is_some()
    }
}
