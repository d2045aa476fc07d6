//! The job log display.
//!
//! [`Terminal`] receives transport events in arrival order, splits text into
//! lines, classifies each one, feeds progress tokens to its [`ProgressBoard`]
//! and hands the results to a [`RenderSurface`].

use crate::board::ProgressBoard;
use crate::classifier::classify;
use jobwatch_types::{IndicatorView, LogLine};
use tracing::{debug, trace};

/// Line appended when the log stream connects.
pub const CONNECTED_LINE: &str = "[Info] Websocket connected. Listening for messages...";

/// Line appended when the log stream closes.
pub const CLOSED_LINE: &str = "[Error] Websocket connection closed.";

/// Where classified lines and indicator rows are drawn.
pub trait RenderSurface {
    /// Append one line to the log display.
    fn append_line(&mut self, line: &LogLine);

    /// Draw or redraw an indicator row. `created` is true the first time an
    /// element id is seen.
    fn render_indicator(&mut self, view: &IndicatorView, created: bool);
}

/// Events produced by the log transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    Connected,
    Message(String),
    Error(String),
    Closed,
}

/// Log display state for one job page.
pub struct Terminal<S> {
    board: ProgressBoard,
    surface: S,
    lines_seen: u64,
}

impl<S: RenderSurface> Terminal<S> {
    pub fn new(surface: S) -> Self {
        Self {
            board: ProgressBoard::new(),
            surface,
            lines_seen: 0,
        }
    }

    /// Handle one transport event.
    pub fn handle(&mut self, event: TransportEvent) {
        match event {
            TransportEvent::Connected => self.push_line(CONNECTED_LINE),
            TransportEvent::Message(text) => self.push_text(&text),
            TransportEvent::Error(error) => self.push_line(&format!("[Error] {}", error)),
            TransportEvent::Closed => self.push_line(CLOSED_LINE),
        }
    }

    /// Split a message into lines and process each one in order.
    ///
    /// Carriage returns are stripped and a trailing newline does not produce
    /// an empty line.
    pub fn push_text(&mut self, text: &str) {
        let text = text.strip_suffix('\n').unwrap_or(text);
        for raw in text.split('\n') {
            let line = raw.replace('\r', "");
            self.push_line(&line);
        }
    }

    /// Process a single line that contains no newline.
    pub fn push_line(&mut self, raw: &str) {
        let line = classify(raw);
        self.lines_seen += 1;
        trace!(
            target: "jobwatch::parser",
            "Line {} classified as {:?}",
            self.lines_seen,
            line.category
        );

        if let Some(update) = &line.progress {
            let change = self.board.apply(update);
            if let Some(indicator) = self.board.indicator(change.index) {
                debug!(
                    target: "jobwatch::board",
                    "Indicator {} at {}%",
                    indicator.element_id,
                    indicator.percent
                );
                self.surface.render_indicator(&indicator.view(), change.created);
            }
        }

        self.surface.append_line(&line);
    }

    pub fn board(&self) -> &ProgressBoard {
        &self.board
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn lines_seen(&self) -> u64 {
        self.lines_seen
    }
}
