//! Human-readable text output formatter

use super::OutputFormatter;
use crate::diagnostic::{Diagnostic, Severity};
use crate::engine::LintResult;
use colored::*;
use std::path::Path;

/// Text formatter with optional color support
pub struct TextFormatter {
    /// Enable colored output
    pub colored: bool,

    /// Show the offending source line
    pub show_source: bool,

    /// Show help text
    pub show_help: bool,

    /// Show summary line
    pub show_stats: bool,
}

impl Default for TextFormatter {
    fn default() -> Self {
        Self {
            colored: true,
            show_source: true,
            show_help: false,
            show_stats: true,
        }
    }
}

impl TextFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Disable colors
    pub fn without_color(mut self) -> Self {
        self.colored = false;
        self
    }

    pub fn with_help(mut self, show: bool) -> Self {
        self.show_help = show;
        self
    }

    pub fn with_stats(mut self, show: bool) -> Self {
        self.show_stats = show;
        self
    }

    fn severity_str(&self, severity: Severity) -> ColoredString {
        let s = format!("{}", severity);
        if !self.colored {
            return s.normal();
        }
        match severity {
            Severity::Error => s.red().bold(),
            Severity::Warning => s.yellow().bold(),
            Severity::Info => s.blue(),
        }
    }

    fn gutter(&self, s: &str) -> String {
        if self.colored {
            s.blue().to_string()
        } else {
            s.to_string()
        }
    }

    fn count(&self, n: usize, singular: &str, plural: &str, color: Color) -> Option<String> {
        if n == 0 {
            return None;
        }
        let s = format!("{} {}", n, if n == 1 { singular } else { plural });
        Some(if self.colored {
            s.color(color).to_string()
        } else {
            s
        })
    }
}

impl OutputFormatter for TextFormatter {
    fn format(&self, result: &LintResult) -> String {
        let mut output = String::new();

        // Group diagnostics by file, keeping first-seen order
        let mut by_file: Vec<(&Path, Vec<&Diagnostic>)> = Vec::new();
        for diag in &result.diagnostics {
            let file = diag.location.file.as_path();
            match by_file.iter_mut().find(|(f, _)| *f == file) {
                Some((_, diags)) => diags.push(diag),
                None => by_file.push((file, vec![diag])),
            }
        }

        for (file, diagnostics) in &by_file {
            if self.colored {
                output.push_str(&format!("{}\n", file.display().to_string().underline()));
            } else {
                output.push_str(&format!("{}\n", file.display()));
            }

            for diag in diagnostics {
                output.push_str(&self.format_diagnostic(diag));
                output.push('\n');
            }
        }

        if self.show_stats {
            output.push_str(&format!(
                "{} {} processed",
                result.files_processed,
                if result.files_processed == 1 {
                    "file"
                } else {
                    "files"
                }
            ));

            let counts: Vec<String> = [
                self.count(result.error_count, "error", "errors", Color::Red),
                self.count(result.warning_count, "warning", "warnings", Color::Yellow),
                self.count(result.info_count, "info", "infos", Color::Blue),
            ]
            .into_iter()
            .flatten()
            .collect();

            if !counts.is_empty() {
                output.push_str(&format!(": {}", counts.join(", ")));
            }
            output.push('\n');

            output.push_str(&format!(
                "Finished in {:.2}s\n",
                result.duration.as_secs_f64()
            ));
        }

        output
    }

    fn format_diagnostic(&self, diag: &Diagnostic) -> String {
        let mut output = String::new();

        output.push_str(&format!(
            "{}:{}:{}: {}[{}]: {}\n",
            diag.location.file.display(),
            diag.location.line,
            diag.location.column,
            self.severity_str(diag.severity),
            if self.colored {
                diag.rule_id.cyan().to_string()
            } else {
                diag.rule_id.clone()
            },
            diag.message
        ));

        if self.show_source {
            if let Some(source) = &diag.source_line {
                let line_num = format!("{:>4}", diag.location.line);
                output.push_str(&format!(
                    "{} {} {}\n",
                    self.gutter(&line_num),
                    self.gutter("|"),
                    source
                ));

                if diag.location.column > 0 {
                    let padding = " ".repeat(diag.location.column - 1);
                    let width = source
                        .chars()
                        .skip(diag.location.column - 1)
                        .count()
                        .min(diag.location.length)
                        .max(1);
                    let underline = "^".repeat(width);
                    output.push_str(&format!(
                        "     {} {}{}\n",
                        self.gutter("|"),
                        padding,
                        if self.colored {
                            underline.red().to_string()
                        } else {
                            underline
                        }
                    ));
                }
            }
        }

        if self.show_help {
            if let Some(help) = &diag.help {
                output.push_str(&format!("     {} help: {}\n", self.gutter("="), help));
            }
        }

        output
    }
}
