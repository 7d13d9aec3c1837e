//! View-model: the client's whole UI state in one value.
//!
//! [`Controls`] are the inputs a user fills in (query, `k`, max pages, file
//! selection); the rest of [`ViewModel`] is what handlers write back (status
//! line, results panel, upload log). Handlers never reach for global state;
//! they get the view-model through the controller.

use serde::Serialize;
use std::path::PathBuf;

use crate::models::SearchResponse;
use crate::render::{render_results_html, render_results_text, terminal_safe};

/// User inputs.
///
/// Numeric inputs are kept as entered text; an empty value means "use the
/// configured default" when a handler builds its request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Controls {
    pub query: String,
    pub k: String,
    pub max_pages: String,
    pub files: Vec<PathBuf>,
}

/// Contents of the results container.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ResultsPanel {
    /// Nothing shown: initial state, and after a reset.
    #[default]
    Empty,
    /// The payload of the most recent completed search.
    Rendered(SearchResponse),
}

/// How the results panel is printed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Html,
    Json,
}

impl ResultsPanel {
    pub fn is_empty(&self) -> bool {
        matches!(self, ResultsPanel::Empty)
    }

    /// Render the panel. An [`Empty`](ResultsPanel::Empty) panel renders as
    /// the empty string.
    pub fn render(&self, format: OutputFormat) -> String {
        match self {
            ResultsPanel::Empty => String::new(),
            ResultsPanel::Rendered(data) => match format {
                OutputFormat::Text => render_results_text(data),
                OutputFormat::Html => render_results_html(data),
                OutputFormat::Json => render_json(data),
            },
        }
    }
}

fn render_json<T: Serialize>(data: &T) -> String {
    serde_json::to_string_pretty(data).unwrap_or_default()
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewModel {
    pub controls: Controls,
    pub status: String,
    pub results: ResultsPanel,
    /// Newline-terminated log lines, or a single validation message.
    pub upload_log: String,
}

impl ViewModel {
    pub fn append_log_line(&mut self, line: &str) {
        self.upload_log.push_str(line);
        self.upload_log.push('\n');
    }

    /// Log lines, without the trailing empty entry.
    pub fn log_lines(&self) -> Vec<&str> {
        self.upload_log.lines().collect()
    }

    /// Printable report: the requested panels (when non-empty), then the
    /// status line last. Log and status text can carry server-supplied
    /// strings, so each line goes through [`terminal_safe`].
    pub fn report(&self, sections: Sections, format: OutputFormat) -> String {
        let mut parts: Vec<String> = Vec::new();
        if sections.upload_log && !self.upload_log.is_empty() {
            let lines: Vec<String> = self.log_lines().into_iter().map(terminal_safe).collect();
            parts.push(lines.join("\n").trim_end().to_string());
        }
        if sections.results && !self.results.is_empty() {
            parts.push(self.results.render(format));
        }
        if !self.status.is_empty() {
            parts.push(terminal_safe(&self.status));
        }
        let mut out = parts.join("\n");
        if !out.is_empty() {
            out.push('\n');
        }
        out
    }
}

/// Which panels [`ViewModel::report`] includes besides the status line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Sections {
    pub upload_log: bool,
    pub results: bool,
}

impl Sections {
    pub const STATUS_ONLY: Sections = Sections {
        upload_log: false,
        results: false,
    };
    pub const LOG: Sections = Sections {
        upload_log: true,
        results: false,
    };
    pub const RESULTS: Sections = Sections {
        upload_log: false,
        results: true,
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SearchResultItem;

    #[test]
    fn empty_panel_renders_nothing() {
        assert_eq!(ResultsPanel::Empty.render(OutputFormat::Html), "");
        assert_eq!(ResultsPanel::Empty.render(OutputFormat::Text), "");
    }

    #[test]
    fn rendered_panel_with_no_hits_shows_placeholder() {
        let panel = ResultsPanel::Rendered(SearchResponse::default());
        assert_eq!(panel.render(OutputFormat::Text), "No results.");
        assert!(!panel.is_empty());
    }

    #[test]
    fn json_format_round_trips_payload() {
        let data = SearchResponse {
            results: Some(vec![SearchResultItem {
                filename: "a.pdf".into(),
                score: 0.25,
                doc_id: "1".into(),
                snippet: "s".into(),
            }]),
        };
        let out = ResultsPanel::Rendered(data).render(OutputFormat::Json);
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["results"][0]["filename"], "a.pdf");
    }

    #[test]
    fn log_lines_split() {
        let mut vm = ViewModel::default();
        vm.append_log_line("one");
        vm.append_log_line("two");
        assert_eq!(vm.upload_log, "one\ntwo\n");
        assert_eq!(vm.log_lines(), vec!["one", "two"]);
    }

    #[test]
    fn report_puts_status_last() {
        let mut vm = ViewModel::default();
        vm.append_log_line("Uploaded: a.pdf (chars=3)");
        vm.results = ResultsPanel::Rendered(SearchResponse::default());
        vm.status = "Done.".into();

        assert_eq!(
            vm.report(Sections::LOG, OutputFormat::Text),
            "Uploaded: a.pdf (chars=3)\nDone.\n"
        );
        assert_eq!(
            vm.report(Sections::RESULTS, OutputFormat::Text),
            "No results.\nDone.\n"
        );
        assert_eq!(vm.report(Sections::STATUS_ONLY, OutputFormat::Text), "Done.\n");
    }

    #[test]
    fn report_strips_control_characters() {
        let mut vm = ViewModel::default();
        vm.append_log_line("Uploaded: x\u{1b}[2J.pdf (chars=3)");
        vm.status = "Error: bad\r\u{7}body".into();
        assert_eq!(
            vm.report(Sections::LOG, OutputFormat::Text),
            "Uploaded: x[2J.pdf (chars=3)\nError: bad body\n"
        );
    }

    #[test]
    fn report_of_blank_view_is_empty() {
        let vm = ViewModel::default();
        assert_eq!(
            vm.report(
                Sections {
                    upload_log: true,
                    results: true
                },
                OutputFormat::Html
            ),
            ""
        );
    }
}
