use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Verbosity levels for output
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum VerbosityLevel {
    /// Only show invalid files
    Quiet,
    /// Show the summary and invalid files
    #[default]
    Normal,
    /// Also show warnings on valid files
    Verbose,
    /// Show all available debugging information
    Debug,
}

/// How each record is printed
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One line per file plus totals
    Summary,
    /// Canonical XML of each valid record
    Xml,
    /// HTML meta tags of each valid record
    Html,
    /// `name = value` lines of each valid record
    Text,
}

/// Validate and render DDMS metadata records
#[derive(Parser, Debug, Clone)]
#[command(name = "ddms-records")]
#[command(about = "Validate DDMS resource records and render them as XML, HTML or text")]
#[command(version)]
pub struct Cli {
    /// Path to scan for record files (directory or file)
    #[arg(help = "Directory or file containing records")]
    pub path: PathBuf,

    /// Schema version used to read records
    #[arg(
        short = 's',
        long = "schema-version",
        help = "DDMS version (2.0, 3.0, 3.1, 4.0.1, 4.1, 5.0); detected from the record when omitted"
    )]
    pub schema_version: Option<String>,

    /// Output format
    #[arg(short = 'f', long = "format", value_enum)]
    pub format: Option<OutputFormat>,

    /// File extensions to process (comma-separated)
    #[arg(
        short = 'e',
        long = "extensions",
        help = "File extensions to process (e.g., 'xml,ddms')"
    )]
    pub extensions: Option<String>,

    /// Configuration file (TOML or JSON)
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Directory holding controlled vocabulary files for every version
    #[arg(long = "vocab-location")]
    pub vocab_location: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short = 'v', long = "verbose", help = "Enable verbose output")]
    pub verbose: bool,

    /// Enable quiet mode (invalid files only)
    #[arg(
        short = 'q',
        long = "quiet",
        help = "Quiet mode",
        conflicts_with_all = ["verbose", "debug"]
    )]
    pub quiet: bool,

    /// Debug output: timings in the summary and debug logging
    #[arg(short = 'd', long = "debug")]
    pub debug: bool,

    /// Maximum number of directory levels to descend below the path
    #[arg(long = "max-depth")]
    pub max_depth: Option<usize>,

    /// Follow symbolic links while scanning directories
    #[arg(long = "follow-symlinks")]
    pub follow_symlinks: bool,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    pub fn get_extensions(&self) -> Option<Vec<String>> {
        self.extensions.as_ref().map(|extensions| {
            extensions
                .split(',')
                .map(|s| s.trim().trim_start_matches('.').to_string())
                .filter(|s| !s.is_empty())
                .collect()
        })
    }

    pub fn validate(&self) -> Result<(), String> {
        if !self.path.exists() {
            return Err(format!("Path does not exist: {}", self.path.display()));
        }
        if let Some(location) = &self.vocab_location
            && !location.is_dir()
        {
            return Err(format!(
                "Vocabulary location is not a directory: {}",
                location.display()
            ));
        }
        Ok(())
    }

    pub fn verbosity(&self) -> VerbosityLevel {
        if self.quiet {
            VerbosityLevel::Quiet
        } else if self.debug {
            VerbosityLevel::Debug
        } else if self.verbose {
            VerbosityLevel::Verbose
        } else {
            VerbosityLevel::Normal
        }
    }
}
