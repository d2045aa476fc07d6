//! Console rendering of the job log and its progress bars.

use console::style;
use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use jobwatch_core::RenderSurface;
use jobwatch_types::{IndicatorView, JobResponse, JobStatus, LogCategory, LogLine};
use std::collections::HashMap;
use tracing::debug;

/// Bars are drawn in tenths of a percent.
const BAR_SCALE: f64 = 10.0;

/// Style a log line by category.
pub fn style_line(line: &LogLine) -> String {
    let text = line.text.as_str();
    match line.category {
        LogCategory::Error => style(text).red().to_string(),
        LogCategory::Debug => style(text).dim().to_string(),
        LogCategory::Info => style(text).cyan().to_string(),
        LogCategory::Warning => style(text).yellow().to_string(),
        LogCategory::Plain => text.to_string(),
    }
}

/// Bar color for the most recently added style class.
fn bar_color(style_classes: &[String]) -> &'static str {
    let latest = style_classes
        .last()
        .and_then(|class| class.rsplit('-').next())
        .unwrap_or_default();
    match latest {
        "danger" => "red",
        "warning" => "yellow",
        "success" => "green",
        "info" => "cyan",
        _ => "blue",
    }
}

fn bar_style(color: &str) -> ProgressStyle {
    let template = format!("{{prefix:>14}} [{{bar:40.{}/white}}] {{msg}}", color);
    ProgressStyle::with_template(&template)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=> ")
}

/// Terminal surface: colored log lines on stdout plus one live bar per
/// indicator. When stdout is not a terminal the bars are hidden and each
/// indicator update is printed as a line instead.
pub struct ConsoleSurface {
    multi: MultiProgress,
    bars: HashMap<String, ProgressBar>,
    show_progress_lines: bool,
}

impl ConsoleSurface {
    pub fn new(show_progress_lines: bool) -> Self {
        Self::with_target(ProgressDrawTarget::stdout(), show_progress_lines)
    }

    pub fn with_target(target: ProgressDrawTarget, show_progress_lines: bool) -> Self {
        Self {
            multi: MultiProgress::with_draw_target(target),
            bars: HashMap::new(),
            show_progress_lines,
        }
    }

    /// A handle that prints job status above the bars.
    pub fn status_printer(&self) -> StatusPrinter {
        StatusPrinter {
            multi: self.multi.clone(),
        }
    }

    pub fn bar(&self, bar_id: &str) -> Option<&ProgressBar> {
        self.bars.get(bar_id)
    }

    /// Finish every bar, leaving its last state on screen.
    pub fn finish(&self) {
        for bar in self.bars.values() {
            bar.abandon();
        }
    }

    fn print(&self, text: &str) {
        print_above(&self.multi, text);
    }
}

impl RenderSurface for ConsoleSurface {
    fn append_line(&mut self, line: &LogLine) {
        if line.is_progress() && !self.show_progress_lines {
            return;
        }
        self.print(&style_line(line));
    }

    fn render_indicator(&mut self, view: &IndicatorView, created: bool) {
        let bar = self.bars.entry(view.bar_id.clone()).or_insert_with(|| {
            let bar = self.multi.add(ProgressBar::new((100.0 * BAR_SCALE) as u64));
            bar.set_prefix(view.bar_id.trim_start_matches("__").to_string());
            bar
        });

        if created {
            debug!(target: "jobwatch::board", "Drawing new bar {}", view.bar_id);
        }
        bar.set_style(bar_style(bar_color(&view.style_classes)));
        bar.set_position((view.aria_value.clamp(0.0, 100.0) * BAR_SCALE).round() as u64);
        bar.set_message(format!("{:>6} {}", view.label, view.message_text));

        if self.multi.is_hidden() {
            println!("{} {} {}", view.bar_id, view.label, view.message_text);
        }
    }
}

/// Prints poll results without tearing the progress bars.
#[derive(Clone)]
pub struct StatusPrinter {
    multi: MultiProgress,
}

impl StatusPrinter {
    pub fn print_status(&self, response: &JobResponse) {
        print_above(&self.multi, &status_text(response));
    }
}

/// One-line summary of a job response.
pub fn status_text(response: &JobResponse) -> String {
    let status = response.status.as_deref().unwrap_or("unknown");
    let value = match response.status_value {
        Some(value) => match JobStatus::from_value(value) {
            Some(known) if known.label() != status => format!(" ({}, {})", value, known.label()),
            _ => format!(" ({})", value),
        },
        None => String::new(),
    };
    format!("{} {}{}", style("Job status:").bold(), status, value)
}

fn print_above(multi: &MultiProgress, text: &str) {
    if multi.is_hidden() {
        println!("{}", text);
    } else if let Err(e) = multi.println(text) {
        debug!(target: "jobwatch::stream", "Console write failed: {}", e);
    }
}
