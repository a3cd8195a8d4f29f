//! Output handling for smarthome-cli (human-readable text or JSON)

use clap::ValueEnum;
use colored::Colorize;
use serde::Serialize;
use tabled::builder::Builder;
use tabled::settings::{Alignment, Padding, Style, Width};

/// Width of section separators
const RULE_WIDTH: usize = 60;

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text (default)
    #[default]
    Text,
    /// JSON: one document per event, pretty documents for REST responses
    Json,
}

/// Receives what the event stream consumer produces
pub trait EventSink {
    /// One rendered line of an event
    fn event_line(&mut self, line: &str);

    /// A recoverable problem with a single line or event
    fn warning(&mut self, message: &str);
}

/// Context for output rendering
pub struct OutputContext {
    pub format: OutputFormat,
}

impl OutputContext {
    pub fn new(format: OutputFormat, no_color: bool) -> Self {
        if no_color {
            colored::control::set_override(false);
        }
        Self { format }
    }

    /// Whether human-readable decoration (headings, hints) should be printed
    pub fn is_text(&self) -> bool {
        self.format == OutputFormat::Text
    }

    /// Print a success message
    pub fn success(&self, msg: &str) {
        if self.is_text() {
            println!("{}", msg.green());
        }
    }

    /// Print an info message
    pub fn info(&self, msg: &str) {
        if self.is_text() {
            println!("{}", msg);
        }
    }

    /// Print a warning message
    pub fn warn(&self, msg: &str) {
        eprintln!("{}", msg.yellow());
    }

    /// Print an error message
    pub fn error(&self, msg: &str) {
        eprintln!("{}", msg.red());
    }

    /// Print a section heading framed by rules
    pub fn heading(&self, title: &str) {
        if self.is_text() {
            let rule = "=".repeat(RULE_WIDTH);
            println!("\n{}", rule);
            println!("{}", title.bold());
            println!("{}", rule);
        }
    }

    /// Print the start-up banner
    pub fn banner(&self, title: &str) {
        if self.is_text() {
            println!("\n{}\n", banner_text(title));
        }
    }

    /// Print a value as pretty JSON (JSON mode only)
    pub fn print_json<T: Serialize>(&self, value: &T) {
        if self.format == OutputFormat::Json {
            println!(
                "{}",
                serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
            );
        }
    }
}

impl EventSink for &OutputContext {
    fn event_line(&mut self, line: &str) {
        println!("{}", line);
    }

    fn warning(&mut self, message: &str) {
        self.warn(message);
    }
}

/// `title` centered in a double-line box as wide as the section rules
///
/// Width is measured in terminal columns, so wide glyphs such as emoji keep
/// the right border aligned.
fn banner_text(title: &str) -> String {
    let mut builder = Builder::default();
    builder.push_record([title]);

    let mut table = builder.build();
    table
        .with(Style::extended())
        .with(Padding::new(0, 0, 1, 1))
        .with(Alignment::center())
        .with(Width::increase(RULE_WIDTH));
    table.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_banner_lines_share_one_width() {
        let banner = banner_text("SmartHome");
        let widths: Vec<usize> = banner.lines().map(|l| l.chars().count()).collect();
        assert_eq!(widths, vec![RULE_WIDTH; 5]);
        assert!(banner.lines().nth(2).unwrap().contains("SmartHome"));
    }

    #[test]
    fn test_banner_measures_wide_glyphs() {
        let banner = banner_text("🏠 SmartHome");
        let lines: Vec<&str> = banner.lines().collect();

        assert!(lines[0].starts_with('╔'));
        assert!(lines[2].ends_with('║'));
        // 🏠 fills two columns, so the title row holds one char fewer
        assert_eq!(lines[2].chars().count(), RULE_WIDTH - 1);
        assert_eq!(lines[4].chars().count(), RULE_WIDTH);
    }

    #[test]
    fn test_default_format_is_text() {
        let ctx = OutputContext::new(OutputFormat::default(), true);
        assert!(ctx.is_text());
    }
}
