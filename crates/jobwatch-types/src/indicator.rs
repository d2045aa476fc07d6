//! Progress indicator state and its rendered view.

use serde::{Deserialize, Serialize};

/// Key of the primary indicator, used when an update names no element.
pub const DEFAULT_INDICATOR_ID: &str = "progress-bar";

/// Prefix applied to a style type to form its style class.
pub const STYLE_CLASS_PREFIX: &str = "progress-bar-";

/// A named progress bar tracked for the lifetime of a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressIndicator {
    pub element_id: String,
    pub percent: f64,
    /// Percent as written by the job; the label shows this verbatim.
    pub percent_text: String,
    pub message: Option<String>,
    /// Style classes in the order they were first applied.
    pub style_classes: Vec<String>,
    pub visible: bool,
}

impl ProgressIndicator {
    /// A hidden, empty indicator with the shape of the default row.
    pub fn template(element_id: impl Into<String>) -> Self {
        Self {
            element_id: element_id.into(),
            percent: 0.0,
            percent_text: "0".to_string(),
            message: None,
            style_classes: Vec::new(),
            visible: false,
        }
    }

    pub fn is_default(&self) -> bool {
        self.element_id == DEFAULT_INDICATOR_ID
    }

    /// Adds a style class unless the indicator already carries it.
    pub fn add_style_class(&mut self, class: String) -> bool {
        if self.style_classes.contains(&class) {
            return false;
        }
        self.style_classes.push(class);
        true
    }

    /// Element id of the bar on the rendering surface.
    pub fn bar_id(&self) -> String {
        if self.is_default() {
            DEFAULT_INDICATOR_ID.to_string()
        } else {
            format!("__{}", self.element_id)
        }
    }

    pub fn view(&self) -> IndicatorView {
        let bar_id = self.bar_id();
        IndicatorView {
            message_id: format!("{}-message", bar_id),
            bar_id,
            percent_width: format!("{}%", self.percent.clamp(0.0, 100.0)),
            aria_value: self.percent,
            label: format!("{}%", self.percent_text),
            message_text: self.message.clone().unwrap_or_default(),
            style_classes: self.style_classes.clone(),
            visible: self.visible,
        }
    }
}

/// What a rendering surface needs to draw one indicator row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorView {
    pub bar_id: String,
    pub message_id: String,
    /// Bar width, clamped to `0%..=100%`.
    pub percent_width: String,
    /// Raw percent as received.
    pub aria_value: f64,
    pub label: String,
    pub message_text: String,
    pub style_classes: Vec<String>,
    pub visible: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_view_ids() {
        let view = ProgressIndicator::template(DEFAULT_INDICATOR_ID).view();
        assert_eq!(view.bar_id, "progress-bar");
        assert_eq!(view.message_id, "progress-bar-message");
        assert!(!view.visible);
    }

    #[test]
    fn test_named_view_ids() {
        let view = ProgressIndicator::template("imgcopy").view();
        assert_eq!(view.bar_id, "__imgcopy");
        assert_eq!(view.message_id, "__imgcopy-message");
    }

    #[test]
    fn test_width_is_clamped_but_label_is_not() {
        let mut indicator = ProgressIndicator::template("x");
        indicator.percent = 250.0;
        indicator.percent_text = "250".into();
        let view = indicator.view();
        assert_eq!(view.percent_width, "100%");
        assert_eq!(view.label, "250%");
        assert_eq!(view.aria_value, 250.0);
    }

    #[test]
    fn test_fractional_label() {
        let mut indicator = ProgressIndicator::template("x");
        indicator.percent = 42.5;
        indicator.percent_text = "42.5".into();
        assert_eq!(indicator.view().label, "42.5%");
    }

    #[test]
    fn test_label_keeps_leading_zero() {
        let mut indicator = ProgressIndicator::template("x");
        indicator.percent = 5.0;
        indicator.percent_text = "05".into();
        let view = indicator.view();
        assert_eq!(view.label, "05%");
        assert_eq!(view.percent_width, "5%");
        assert_eq!(view.aria_value, 5.0);
    }

    #[test]
    fn test_template_label() {
        assert_eq!(ProgressIndicator::template("x").view().label, "0%");
    }

    #[test]
    fn test_style_classes_deduplicate() {
        let mut indicator = ProgressIndicator::template("x");
        assert!(indicator.add_style_class("progress-bar-info".into()));
        assert!(!indicator.add_style_class("progress-bar-info".into()));
        assert!(indicator.add_style_class("progress-bar-danger".into()));
        assert_eq!(indicator.style_classes.len(), 2);
    }
}
