//! Progress board: the set of indicators seen during a session.

use jobwatch_types::{ProgressIndicator, ProgressUpdate, DEFAULT_INDICATOR_ID, STYLE_CLASS_PREFIX};
use std::collections::HashMap;
use tracing::debug;

/// Result of applying one update to the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardChange {
    /// Position of the changed indicator in creation order.
    pub index: usize,
    /// True when the update introduced a new element id.
    pub created: bool,
}

/// Owns one indicator per element id, in the order ids were first seen.
///
/// The default indicator exists from the start and stays hidden until an
/// update without an element id reaches it. Indicators are never removed.
#[derive(Debug, Clone)]
pub struct ProgressBoard {
    indicators: Vec<ProgressIndicator>,
    by_id: HashMap<String, usize>,
}

impl Default for ProgressBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressBoard {
    pub fn new() -> Self {
        let mut by_id = HashMap::new();
        by_id.insert(DEFAULT_INDICATOR_ID.to_string(), 0);
        Self {
            indicators: vec![ProgressIndicator::template(DEFAULT_INDICATOR_ID)],
            by_id,
        }
    }

    /// Apply an update, creating its indicator on first sight.
    pub fn apply(&mut self, update: &ProgressUpdate) -> BoardChange {
        let key = update.element_id.as_deref().unwrap_or(DEFAULT_INDICATOR_ID);

        let (index, created) = match self.by_id.get(key) {
            Some(&index) => (index, false),
            None => {
                let index = self.indicators.len();
                self.indicators.push(ProgressIndicator::template(key));
                self.by_id.insert(key.to_string(), index);
                debug!(target: "jobwatch::board", "Created indicator {} at row {}", key, index);
                (index, true)
            }
        };

        let indicator = &mut self.indicators[index];
        indicator.percent = update.percent;
        indicator.percent_text.clone_from(&update.percent_text);
        indicator.message = update.message.clone();
        if let Some(style_type) = &update.style_type {
            indicator.add_style_class(format!("{}{}", STYLE_CLASS_PREFIX, style_type));
        }
        indicator.visible = true;

        BoardChange { index, created }
    }

    pub fn get(&self, element_id: &str) -> Option<&ProgressIndicator> {
        self.by_id.get(element_id).map(|&i| &self.indicators[i])
    }

    pub fn indicator(&self, index: usize) -> Option<&ProgressIndicator> {
        self.indicators.get(index)
    }

    pub fn default_indicator(&self) -> &ProgressIndicator {
        &self.indicators[0]
    }

    /// All indicators in creation order, the default one first.
    pub fn indicators(&self) -> &[ProgressIndicator] {
        &self.indicators
    }

    pub fn len(&self) -> usize {
        self.indicators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indicators.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn update(percent: f64, id: Option<&str>, style: Option<&str>, msg: &str) -> ProgressUpdate {
        ProgressUpdate {
            percent,
            percent_text: percent.to_string(),
            element_id: id.map(str::to_string),
            style_type: style.map(str::to_string),
            message: Some(msg.to_string()),
        }
    }

    #[test]
    fn test_new_board_has_hidden_default() {
        let board = ProgressBoard::new();
        assert_eq!(board.len(), 1);
        assert!(!board.is_empty());
        assert!(board.default_indicator().is_default());
        assert!(!board.default_indicator().visible);
    }

    #[test]
    fn test_same_id_updates_in_place_and_accumulates_styles() {
        let mut board = ProgressBoard::new();
        let first = board.apply(&update(10.0, Some("bar1"), Some("info"), "start"));
        let second = board.apply(&update(60.0, Some("bar1"), Some("danger"), "later"));

        assert!(first.created);
        assert!(!second.created);
        assert_eq!(first.index, second.index);
        assert_eq!(board.len(), 2);

        let bar = board.get("bar1").unwrap();
        assert_eq!(bar.percent, 60.0);
        assert_eq!(bar.message.as_deref(), Some("later"));
        assert_eq!(bar.style_classes, vec!["progress-bar-info", "progress-bar-danger"]);
        assert!(bar.visible);
    }

    #[test]
    fn test_missing_id_targets_default() {
        let mut board = ProgressBoard::new();
        board.apply(&update(5.0, Some("a"), None, "a"));
        board.apply(&update(6.0, Some("b"), None, "b"));
        let change = board.apply(&update(70.0, None, None, "main"));

        assert_eq!(change.index, 0);
        assert!(!change.created);
        assert_eq!(board.len(), 3);
        assert_eq!(board.default_indicator().percent, 70.0);
        assert!(board.default_indicator().visible);
    }

    #[test]
    fn test_new_indicator_starts_from_template() {
        let mut board = ProgressBoard::new();
        board.apply(&update(50.0, None, Some("success"), "main"));
        board.apply(&update(1.0, Some("other"), None, "other"));

        let other = board.get("other").unwrap();
        assert!(other.style_classes.is_empty());
        assert_eq!(other.element_id, "other");
    }

    #[test]
    fn test_creation_order_is_kept() {
        let mut board = ProgressBoard::new();
        board.apply(&update(1.0, Some("zeta"), None, "z"));
        board.apply(&update(1.0, Some("alpha"), None, "a"));
        let ids: Vec<_> = board.indicators().iter().map(|i| i.element_id.as_str()).collect();
        assert_eq!(ids, vec!["progress-bar", "zeta", "alpha"]);
    }

    #[test]
    fn test_message_is_replaced_even_when_absent() {
        let mut board = ProgressBoard::new();
        board.apply(&update(1.0, None, None, "first"));
        board.apply(&ProgressUpdate {
            percent: 2.0,
            percent_text: "2".into(),
            element_id: None,
            style_type: None,
            message: None,
        });
        assert!(board.default_indicator().message.is_none());
    }
}
