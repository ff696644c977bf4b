use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use ddms_records::cli::{Cli, OutputFormat, VerbosityLevel};
use ddms_records::config::ConfigManager;
use ddms_records::context::RecordContext;
use ddms_records::file_discovery::FileDiscovery;
use ddms_records::output::Output;
use ddms_records::validator::RecordValidator;

fn init_tracing(verbosity: VerbosityLevel) {
    let default_level = match verbosity {
        VerbosityLevel::Quiet => "error",
        VerbosityLevel::Normal => "warn",
        VerbosityLevel::Verbose => "info",
        VerbosityLevel::Debug => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse_args();
    init_tracing(cli.verbosity());

    if let Err(e) = cli.validate() {
        anyhow::bail!(e);
    }

    let config = ConfigManager::load_config(&cli).context("Failed to load configuration")?;
    let ctx = RecordContext::from_config(&config).context("Failed to build record context")?;

    let report = ctx.vocabulary().load_all(ctx.version());
    tracing::info!(
        location = %report.location,
        loaded = report.loaded.len(),
        skipped = report.skipped.len(),
        "Controlled vocabularies loaded"
    );

    let files = FileDiscovery::new()
        .with_extensions(config.files.extensions.clone())
        .with_max_depth(cli.max_depth)
        .with_follow_symlinks(cli.follow_symlinks)
        .discover_files(&cli.path)
        .with_context(|| format!("Failed to scan {}", cli.path.display()))?;
    tracing::debug!(count = files.len(), "Discovered record files");

    let validator = if cli.schema_version.is_some() {
        RecordValidator::pinned(ctx)
    } else {
        RecordValidator::new(ctx)
    };
    let results = validator.validate_files(&files);

    let verbosity = if config.output.quiet {
        VerbosityLevel::Quiet
    } else if cli.debug {
        VerbosityLevel::Debug
    } else if config.output.verbose {
        VerbosityLevel::Verbose
    } else {
        VerbosityLevel::Normal
    };
    let format: OutputFormat = config.output.format.into();
    let output = Output::new(verbosity, format);
    print!("{}", output.format_results(&results)?);

    if results.has_errors() {
        std::process::exit(1);
    }
    Ok(())
}
