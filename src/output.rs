//! Output and reporting
//!
//! Formats checked records either as a per-file summary or as rendered
//! XML, HTML or text for each valid record.

use std::time::Duration;

use crate::cli::{OutputFormat, VerbosityLevel};
use crate::component::Component;
use crate::error::Result;
use crate::validator::{FileValidationResult, ValidationResults, ValidationStatus};

pub struct Output {
    verbosity: VerbosityLevel,
    format: OutputFormat,
    show_colors: bool,
}

impl Output {
    pub fn new(verbosity: VerbosityLevel, format: OutputFormat) -> Self {
        Self {
            verbosity,
            format,
            show_colors: atty::is(atty::Stream::Stdout),
        }
    }

    pub fn with_colors(mut self, show_colors: bool) -> Self {
        self.show_colors = show_colors;
        self
    }

    fn colorize(&self, text: &str, color: &str) -> String {
        if self.show_colors {
            format!("\x1b[{}m{}\x1b[0m", color, text)
        } else {
            text.to_string()
        }
    }

    pub fn format_results(&self, results: &ValidationResults) -> Result<String> {
        match self.format {
            OutputFormat::Summary => Ok(self.format_report(results)),
            format => self.format_records(results, format),
        }
    }

    fn format_report(&self, results: &ValidationResults) -> String {
        let mut output = String::new();

        match self.verbosity {
            VerbosityLevel::Quiet => {
                for file_result in &results.file_results {
                    if !file_result.status.is_valid() {
                        output.push_str(&self.format_file_result(file_result));
                        output.push('\n');
                    }
                }
            }
            VerbosityLevel::Normal | VerbosityLevel::Verbose | VerbosityLevel::Debug => {
                for file_result in &results.file_results {
                    let has_warnings = !file_result.warnings().is_empty();
                    if !file_result.status.is_valid()
                        || has_warnings
                        || self.verbosity >= VerbosityLevel::Verbose
                    {
                        output.push_str(&self.format_file_result(file_result));
                        output.push('\n');
                    }
                }
                output.push_str(&self.format_summary(results));
            }
        }

        output
    }

    /// Rendered records, with a status line for each file that failed
    fn format_records(&self, results: &ValidationResults, format: OutputFormat) -> Result<String> {
        let mut output = String::new();
        for file_result in &results.file_results {
            match &file_result.record {
                Some(record) => {
                    let rendered = match format {
                        OutputFormat::Xml => record.to_xml()?,
                        OutputFormat::Html => record.to_html(),
                        OutputFormat::Text | OutputFormat::Summary => record.to_text(),
                    };
                    if self.verbosity >= VerbosityLevel::Verbose {
                        output.push_str(&format!("# {}\n", file_result.path.display()));
                    }
                    output.push_str(&rendered);
                    if !rendered.ends_with('\n') {
                        output.push('\n');
                    }
                }
                None => {
                    output.push_str(&self.format_file_result(file_result));
                    output.push('\n');
                }
            }
        }
        Ok(output)
    }

    pub fn format_file_result(&self, result: &FileValidationResult) -> String {
        let path_display = result.path.display();
        let duration_str = format_duration(result.duration);
        let version = result
            .version
            .map(|version| format!(" [DDMS {}]", version))
            .unwrap_or_default();

        match &result.status {
            ValidationStatus::Valid => {
                let warnings = result.warnings();
                let mut output = format!(
                    "{}  {}{} ({})",
                    self.colorize("✓ VALID", "32"),
                    path_display,
                    version,
                    duration_str
                );
                if !warnings.is_empty() {
                    output.push_str(&format!(
                        " - {} warning{}",
                        warnings.len(),
                        if warnings.len() == 1 { "" } else { "s" }
                    ));
                    for warning in warnings {
                        output.push_str(&format!("\n    {}", warning));
                    }
                }
                output
            }
            ValidationStatus::Invalid { message } => {
                format!(
                    "{}  {}{} ({})\n    {}",
                    self.colorize("✗ INVALID", "31"),
                    path_display,
                    version,
                    duration_str,
                    message
                )
            }
            ValidationStatus::Error { message } => {
                format!(
                    "{}  {} ({}) - {}",
                    self.colorize("⚠ ERROR", "33"),
                    path_display,
                    duration_str,
                    message
                )
            }
        }
    }

    fn format_summary(&self, results: &ValidationResults) -> String {
        let mut output = String::new();
        output.push_str("Record Summary:\n");
        output.push_str(&format!("  Total files: {}\n", results.total_files));
        output.push_str(&format!(
            "  {} {}\n",
            self.colorize("Valid:", "32"),
            results.valid_files
        ));

        if results.warned_files > 0 {
            output.push_str(&format!(
                "  {} {}\n",
                self.colorize("With warnings:", "36"),
                results.warned_files
            ));
        }
        if results.invalid_files > 0 {
            output.push_str(&format!(
                "  {} {}\n",
                self.colorize("Invalid:", "31"),
                results.invalid_files
            ));
        }
        if results.error_files > 0 {
            output.push_str(&format!(
                "  {} {}\n",
                self.colorize("Errors:", "33"),
                results.error_files
            ));
        }

        output.push_str(&format!("  Success rate: {:.1}%\n", results.success_rate()));
        if self.verbosity == VerbosityLevel::Debug {
            output.push_str(&format!(
                "  Duration: {}\n",
                format_duration(results.total_duration)
            ));
        }

        output
    }
}

fn format_duration(duration: Duration) -> String {
    let total_secs = duration.as_secs_f64();
    if total_secs < 1.0 {
        format!("{:.0}ms", duration.as_millis())
    } else if total_secs < 60.0 {
        format!("{:.2}s", total_secs)
    } else {
        let mins = (total_secs / 60.0) as u64;
        let secs = total_secs % 60.0;
        format!("{}m{:.1}s", mins, secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DdmsError;
    use crate::validation::ValidationMessage;
    use crate::version::SchemaVersion;
    use std::path::PathBuf;

    fn create_test_results() -> ValidationResults {
        ValidationResults::aggregate(vec![
            FileValidationResult::invalid(
                PathBuf::from("bad.xml"),
                SchemaVersion::V5_0,
                ValidationMessage::error("At least one name must exist.", "/ddms:resource/ddms:creator/ddms:person"),
                Duration::from_millis(3),
            ),
            FileValidationResult::error(
                PathBuf::from("broken.xml"),
                DdmsError::Xml("unexpected end of stream".to_string()),
                Duration::from_millis(1),
            ),
        ])
    }

    #[test]
    fn test_output_summary() {
        let output = Output::new(VerbosityLevel::Normal, OutputFormat::Summary).with_colors(false);
        let formatted = output.format_results(&create_test_results()).unwrap();

        assert!(formatted.contains("Record Summary:"));
        assert!(formatted.contains("Total files: 2"));
        assert!(formatted.contains("Invalid: 1"));
        assert!(formatted.contains("Errors: 1"));
        assert!(formatted.contains(
            "Error at /ddms:resource/ddms:creator/ddms:person: At least one name must exist."
        ));
    }

    #[test]
    fn test_quiet_omits_summary() {
        let output = Output::new(VerbosityLevel::Quiet, OutputFormat::Summary).with_colors(false);
        let formatted = output.format_results(&create_test_results()).unwrap();

        assert!(!formatted.contains("Record Summary:"));
        assert!(formatted.contains("✗ INVALID  bad.xml [DDMS 5.0]"));
        assert!(formatted.contains("⚠ ERROR  broken.xml"));
    }

    #[test]
    fn test_rendered_format_lists_failures() {
        let output = Output::new(VerbosityLevel::Normal, OutputFormat::Xml).with_colors(false);
        let formatted = output.format_results(&create_test_results()).unwrap();

        assert!(!formatted.contains("Record Summary:"));
        assert!(formatted.contains("bad.xml"));
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_millis(250)), "250ms");
        assert_eq!(format_duration(Duration::from_millis(2500)), "2.50s");
        assert_eq!(format_duration(Duration::from_secs(90)), "1m30.0s");
    }
}
