//! Parser for progress tokens embedded in info lines.
//!
//! Jobs report progress by logging info lines whose last `" : "` segment looks
//! like `[# 42% imgcopy info #] Copying image`: a percent, an optional target
//! element id, an optional style type, and a label.

use jobwatch_types::ProgressUpdate;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::trace;

/// Literal that opens a progress token.
pub const PROGRESS_TOKEN_OPENER: &str = "[#";

/// Token grammar. The percent group allows up to four digits or dots; id and
/// type are optional bare words; the label is letters, digits, whitespace
/// and dots.
static PROGRESS_TOKEN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\[#\s?([0-9.]{1,4})%\s?(\w+)?\s?(\w+)?\s?#\]\s?([\w\s.]*)")
        .expect("Invalid progress token regex")
});

/// Parse a progress token segment.
///
/// Returns `None` when the segment does not open with `[#`, the percent group
/// does not match, or the percent text is not a decimal number. Missing id,
/// type or label are reported as `None` fields.
pub fn parse_progress_token(segment: &str) -> Option<ProgressUpdate> {
    if !segment.starts_with(PROGRESS_TOKEN_OPENER) {
        return None;
    }

    let caps = PROGRESS_TOKEN_RE.captures(segment)?;
    let percent_text = caps.get(1)?.as_str();
    let percent = match percent_text.parse::<f64>() {
        Ok(p) => p,
        Err(_) => {
            trace!(target: "jobwatch::parser", "Rejected progress percent {:?}", percent_text);
            return None;
        }
    };

    let word = |i: usize| caps.get(i).map(|m| m.as_str().to_string());
    let message = caps
        .get(4)
        .map(|m| m.as_str().trim())
        .filter(|m| !m.is_empty())
        .map(str::to_string);

    Some(ProgressUpdate {
        percent,
        percent_text: percent_text.to_string(),
        element_id: word(2),
        style_type: word(3),
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_token() {
        let update = parse_progress_token("[# 42% bar1 danger #] halfway there").unwrap();
        assert_eq!(update.percent, 42.0);
        assert_eq!(update.element_id.as_deref(), Some("bar1"));
        assert_eq!(update.style_type.as_deref(), Some("danger"));
        assert_eq!(update.message.as_deref(), Some("halfway there"));
    }

    #[test]
    fn test_plain_text_is_rejected() {
        assert!(parse_progress_token("just text").is_none());
    }

    #[test]
    fn test_id_without_type() {
        let update = parse_progress_token("[# 7% imgcopy #] Copying image").unwrap();
        assert_eq!(update.element_id.as_deref(), Some("imgcopy"));
        assert!(update.style_type.is_none());
        assert_eq!(update.message.as_deref(), Some("Copying image"));
    }

    #[test]
    fn test_no_id_no_type() {
        let update = parse_progress_token("[# 10% #] starting").unwrap();
        assert!(update.element_id.is_none());
        assert!(update.style_type.is_none());
        assert_eq!(update.message.as_deref(), Some("starting"));
    }

    #[test]
    fn test_missing_message() {
        let update = parse_progress_token("[# 99% #]").unwrap();
        assert_eq!(update.percent, 99.0);
        assert!(update.message.is_none());
    }

    #[test]
    fn test_fractional_percent() {
        let update = parse_progress_token("[# 12.5% copy info #] Copying image").unwrap();
        assert_eq!(update.percent, 12.5);
    }

    #[test]
    fn test_percent_text_is_kept_verbatim() {
        let update = parse_progress_token("[# 05% #] warming up").unwrap();
        assert_eq!(update.percent, 5.0);
        assert_eq!(update.percent_text, "05");

        let update = parse_progress_token("[# 7.% #] odd").unwrap();
        assert_eq!(update.percent, 7.0);
        assert_eq!(update.percent_text, "7.");
    }

    #[test]
    fn test_percent_is_not_clamped() {
        let update = parse_progress_token("[# 9999% #] overshoot").unwrap();
        assert_eq!(update.percent, 9999.0);
    }

    #[test]
    fn test_percent_longer_than_four_chars_is_rejected() {
        assert!(parse_progress_token("[# 100.0% imgcopy info #] Image copied").is_none());
    }

    #[test]
    fn test_non_numeric_percent_is_rejected() {
        assert!(parse_progress_token("[# 1.2.% #] bad").is_none());
        assert!(parse_progress_token("[# ...% #] bad").is_none());
    }

    #[test]
    fn test_missing_percent_sign_is_rejected() {
        assert!(parse_progress_token("[# 42 bar1 #] nope").is_none());
    }

    #[test]
    fn test_message_stops_at_punctuation() {
        let update = parse_progress_token("[# 50% #] step 2.1: copying").unwrap();
        assert_eq!(update.message.as_deref(), Some("step 2.1"));
    }
}
