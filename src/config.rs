use crate::cli::{Cli, OutputFormat};
use crate::version::{SchemaVersion, Space};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Trait for abstracting environment variable access
pub trait EnvProvider {
    fn get(&self, key: &str) -> Option<String>;
}

/// System environment variable provider for production use
pub struct SystemEnvProvider;

impl EnvProvider for SystemEnvProvider {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlParsing(#[from] toml::de::Error),

    #[error("JSON parsing error: {0}")]
    JsonParsing(#[from] serde_json::Error),

    #[error("Configuration validation error: {0}")]
    Validation(String),

    #[error("Environment variable error: {0}")]
    Environment(String),

    #[error("Unsupported configuration file format: {0}")]
    UnsupportedFormat(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub schema: SchemaConfig,
    pub prefixes: PrefixConfig,
    pub vocabulary: VocabularyConfig,
    pub output: OutputConfig,
    pub files: FileConfig,
}

/// Schema selection
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SchemaConfig {
    /// Version used when none is given on the command line
    pub default_version: String,
}

/// Namespace prefixes used when constructing components
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PrefixConfig {
    pub ddms: String,
    pub gml: String,
    pub ism: String,
    pub ntk: String,
    pub xlink: String,
}

/// Controlled vocabulary sources
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct VocabularyConfig {
    /// Properties of the form `"<version>.vocab.location" = "<dir>"`
    pub locations: BTreeMap<String, String>,
    /// Maximum number of parsed vocabularies kept in memory
    pub max_entries: u64,
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OutputConfig {
    /// Output format
    pub format: OutputFormatConfig,
    /// Verbose output
    pub verbose: bool,
    /// Quiet mode (errors only)
    pub quiet: bool,
}

/// File processing configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FileConfig {
    /// File extensions to process
    pub extensions: Vec<String>,
}

/// Output format configuration (serializable version of CLI OutputFormat)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormatConfig {
    Summary,
    Xml,
    Html,
    Text,
}

impl From<OutputFormat> for OutputFormatConfig {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Summary => OutputFormatConfig::Summary,
            OutputFormat::Xml => OutputFormatConfig::Xml,
            OutputFormat::Html => OutputFormatConfig::Html,
            OutputFormat::Text => OutputFormatConfig::Text,
        }
    }
}

impl From<OutputFormatConfig> for OutputFormat {
    fn from(format: OutputFormatConfig) -> Self {
        match format {
            OutputFormatConfig::Summary => OutputFormat::Summary,
            OutputFormatConfig::Xml => OutputFormat::Xml,
            OutputFormatConfig::Html => OutputFormat::Html,
            OutputFormatConfig::Text => OutputFormat::Text,
        }
    }
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            default_version: SchemaVersion::latest().to_string(),
        }
    }
}

impl Default for PrefixConfig {
    fn default() -> Self {
        Self {
            ddms: Space::Ddms.default_prefix().to_string(),
            gml: Space::Gml.default_prefix().to_string(),
            ism: Space::Ism.default_prefix().to_string(),
            ntk: Space::Ntk.default_prefix().to_string(),
            xlink: Space::Xlink.default_prefix().to_string(),
        }
    }
}

impl PrefixConfig {
    pub fn prefix(&self, space: Space) -> &str {
        match space {
            Space::Ddms => &self.ddms,
            Space::Gml => &self.gml,
            Space::Ism => &self.ism,
            Space::Ntk => &self.ntk,
            Space::Xlink => &self.xlink,
        }
    }
}

impl Default for VocabularyConfig {
    fn default() -> Self {
        Self {
            locations: BTreeMap::new(),
            max_entries: 64,
        }
    }
}

const LOCATION_SUFFIX: &str = ".vocab.location";

impl VocabularyConfig {
    /// Property name holding the vocabulary location of a version
    pub fn location_key(version: SchemaVersion) -> String {
        format!("{}{}", version, LOCATION_SUFFIX)
    }

    /// The property name a key stands for once its version alias is resolved,
    /// so `"4.0.vocab.location"` and `"4.0.1.vocab.location"` are one property
    pub fn canonical_key(key: &str) -> Option<String> {
        let version = key.strip_suffix(LOCATION_SUFFIX)?;
        SchemaVersion::resolve(version).ok().map(Self::location_key)
    }

    pub fn location_for(&self, version: SchemaVersion) -> Option<&str> {
        let wanted = Self::location_key(version);
        self.locations
            .iter()
            .find(|(key, _)| Self::canonical_key(key).as_deref() == Some(wanted.as_str()))
            .map(|(_, location)| location.as_str())
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormatConfig::Summary,
            verbose: false,
            quiet: false,
        }
    }
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            extensions: vec!["xml".to_string()],
        }
    }
}

/// Configuration manager for loading and merging configurations
pub struct ConfigManager;

impl ConfigManager {
    /// Load configuration with precedence: file -> environment -> CLI
    pub fn load_config(cli: &Cli) -> Result<Config> {
        let mut config = Config::default();

        if let Some(config_path) = &cli.config {
            config = Self::load_from_file(config_path)?;
        } else if let Some(found_config) = Self::find_config_file()? {
            config = found_config;
        }

        config = Self::apply_environment_overrides(config)?;
        config = Self::merge_with_cli(config, cli);

        Self::validate_config(&config)?;

        Ok(config)
    }

    /// Load configuration from a file (TOML or JSON)
    pub fn load_from_file(path: &Path) -> Result<Config> {
        let content = std::fs::read_to_string(path)?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Ok(toml::from_str(&content)?),
            Some("json") => Ok(serde_json::from_str(&content)?),
            Some(ext) => Err(ConfigError::UnsupportedFormat(ext.to_string())),
            None => {
                // Try to parse as TOML first, then JSON
                if let Ok(config) = toml::from_str::<Config>(&content) {
                    Ok(config)
                } else {
                    Ok(serde_json::from_str(&content)?)
                }
            }
        }
    }

    /// Find configuration file in standard locations
    pub fn find_config_file() -> Result<Option<Config>> {
        let config_names = [
            "ddms-records.toml",
            "ddms-records.json",
            ".ddms-records.toml",
            ".ddms-records.json",
        ];

        for name in &config_names {
            let path = PathBuf::from(name);
            if path.exists() {
                return Ok(Some(Self::load_from_file(&path)?));
            }
        }

        if let Some(config_dir) = dirs::config_dir() {
            let app_config_dir = config_dir.join("ddms-records");
            for name in &config_names {
                let path = app_config_dir.join(name);
                if path.exists() {
                    return Ok(Some(Self::load_from_file(&path)?));
                }
            }
        }

        Ok(None)
    }

    /// Apply environment variable overrides using the system environment
    pub fn apply_environment_overrides(config: Config) -> Result<Config> {
        Self::apply_environment_overrides_with(&SystemEnvProvider, config)
    }

    /// Apply environment variable overrides with a custom environment provider
    pub fn apply_environment_overrides_with(
        env: &impl EnvProvider,
        mut config: Config,
    ) -> Result<Config> {
        if let Some(version) = env.get("DDMS_DEFAULT_VERSION") {
            config.schema.default_version = version;
        }

        // One location for every version, then per-version overrides
        if let Some(location) = env.get("DDMS_VOCAB_LOCATION") {
            for version in SchemaVersion::all() {
                config
                    .vocabulary
                    .locations
                    .insert(VocabularyConfig::location_key(*version), location.clone());
            }
        }
        for version in SchemaVersion::all() {
            let var = format!(
                "DDMS_VOCAB_LOCATION_{}",
                version.as_str().replace('.', "_")
            );
            if let Some(location) = env.get(&var) {
                config
                    .vocabulary
                    .locations
                    .insert(VocabularyConfig::location_key(*version), location);
            }
        }

        if let Some(max_entries) = env.get("DDMS_VOCAB_MAX_ENTRIES") {
            config.vocabulary.max_entries = max_entries.parse().map_err(|_| {
                ConfigError::Environment(format!(
                    "Invalid DDMS_VOCAB_MAX_ENTRIES value: {}",
                    max_entries
                ))
            })?;
        }

        for space in Space::ALL {
            let var = format!("DDMS_PREFIX_{}", space.default_prefix().to_uppercase());
            if let Some(prefix) = env.get(&var) {
                match space {
                    Space::Ddms => config.prefixes.ddms = prefix,
                    Space::Gml => config.prefixes.gml = prefix,
                    Space::Ism => config.prefixes.ism = prefix,
                    Space::Ntk => config.prefixes.ntk = prefix,
                    Space::Xlink => config.prefixes.xlink = prefix,
                }
            }
        }

        if let Some(verbose) = env.get("DDMS_VERBOSE") {
            config.output.verbose = verbose.parse().map_err(|_| {
                ConfigError::Environment(format!("Invalid DDMS_VERBOSE value: {}", verbose))
            })?;
        }

        if let Some(quiet) = env.get("DDMS_QUIET") {
            config.output.quiet = quiet.parse().map_err(|_| {
                ConfigError::Environment(format!("Invalid DDMS_QUIET value: {}", quiet))
            })?;
        }

        if let Some(format) = env.get("DDMS_FORMAT") {
            config.output.format = match format.to_lowercase().as_str() {
                "summary" => OutputFormatConfig::Summary,
                "xml" => OutputFormatConfig::Xml,
                "html" => OutputFormatConfig::Html,
                "text" => OutputFormatConfig::Text,
                _ => {
                    return Err(ConfigError::Environment(format!(
                        "Invalid DDMS_FORMAT value: {}",
                        format
                    )));
                }
            };
        }

        if let Some(extensions) = env.get("DDMS_EXTENSIONS") {
            config.files.extensions = extensions
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        Ok(config)
    }

    /// Merge CLI arguments with configuration (CLI takes precedence)
    pub fn merge_with_cli(mut config: Config, cli: &Cli) -> Config {
        if let Some(version) = &cli.schema_version {
            config.schema.default_version = version.clone();
        }
        if let Some(location) = &cli.vocab_location {
            let location = location.display().to_string();
            for version in SchemaVersion::all() {
                config
                    .vocabulary
                    .locations
                    .insert(VocabularyConfig::location_key(*version), location.clone());
            }
        }
        if let Some(format) = cli.format {
            config.output.format = format.into();
        }
        if cli.verbose {
            config.output.verbose = true;
        }
        if cli.quiet {
            config.output.quiet = true;
        }
        if let Some(extensions) = cli.get_extensions() {
            config.files.extensions = extensions;
        }

        config
    }

    /// Validate configuration values
    pub fn validate_config(config: &Config) -> Result<()> {
        SchemaVersion::resolve(&config.schema.default_version).map_err(|_| {
            ConfigError::Validation(format!(
                "Unsupported default schema version: {}",
                config.schema.default_version
            ))
        })?;

        let mut configured = HashSet::new();
        for key in config.vocabulary.locations.keys() {
            let canonical = VocabularyConfig::canonical_key(key).ok_or_else(|| {
                ConfigError::Validation(format!("Unknown vocabulary property: {}", key))
            })?;
            if !configured.insert(canonical.clone()) {
                return Err(ConfigError::Validation(format!(
                    "Vocabulary property {} is set more than once",
                    canonical
                )));
            }
        }

        if config.vocabulary.max_entries == 0 {
            return Err(ConfigError::Validation(
                "Vocabulary cache size must be greater than 0".to_string(),
            ));
        }

        let mut prefixes = HashSet::new();
        for space in Space::ALL {
            let prefix = config.prefixes.prefix(space);
            if !crate::validation::is_ncname(prefix) {
                return Err(ConfigError::Validation(format!(
                    "Invalid namespace prefix: {}",
                    prefix
                )));
            }
            if !prefixes.insert(prefix) {
                return Err(ConfigError::Validation(format!(
                    "Duplicate namespace prefix: {}",
                    prefix
                )));
            }
        }

        if config.output.verbose && config.output.quiet {
            return Err(ConfigError::Validation(
                "Cannot enable both verbose and quiet modes".to_string(),
            ));
        }

        if config.files.extensions.is_empty() {
            return Err(ConfigError::Validation(
                "At least one file extension must be specified".to_string(),
            ));
        }

        for ext in &config.files.extensions {
            if ext.contains('/') || ext.contains('\\') || ext.contains('.') {
                return Err(ConfigError::Validation(format!(
                    "Invalid file extension: {}",
                    ext
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    struct MockEnv(HashMap<&'static str, &'static str>);

    impl EnvProvider for MockEnv {
        fn get(&self, key: &str) -> Option<String> {
            self.0.get(key).map(|value| value.to_string())
        }
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert_eq!(config.schema.default_version, "5.0");
        assert_eq!(config.prefixes.ddms, "ddms");
        assert!(ConfigManager::validate_config(&config).is_ok());
    }

    #[test]
    fn test_load_toml_with_vocabulary_locations() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("ddms-records.toml");
        std::fs::write(
            &path,
            r#"
[schema]
default_version = "3.1"

[prefixes]
ddms = "d"

[vocabulary.locations]
"3.1.vocab.location" = "/opt/cve"
"#,
        )
        .unwrap();

        let config = ConfigManager::load_from_file(&path).unwrap();
        assert_eq!(config.schema.default_version, "3.1");
        assert_eq!(config.prefixes.ddms, "d");
        assert_eq!(config.prefixes.ism, "ism");
        assert_eq!(
            config.vocabulary.location_for(SchemaVersion::V3_1),
            Some("/opt/cve")
        );
        assert_eq!(config.vocabulary.location_for(SchemaVersion::V3_0), None);
    }

    #[test]
    fn test_load_json() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("ddms-records.json");
        std::fs::write(&path, r#"{"output": {"format": "text"}}"#).unwrap();

        let config = ConfigManager::load_from_file(&path).unwrap();
        assert_eq!(config.output.format, OutputFormatConfig::Text);
    }

    #[test]
    fn test_unsupported_extension() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("ddms-records.yaml");
        std::fs::write(&path, "schema: {}").unwrap();

        match ConfigManager::load_from_file(&path) {
            Err(ConfigError::UnsupportedFormat(ext)) => assert_eq!(ext, "yaml"),
            other => panic!("Expected UnsupportedFormat, got {:?}", other),
        }
    }

    #[test]
    fn test_environment_overrides() {
        let env = MockEnv(HashMap::from([
            ("DDMS_DEFAULT_VERSION", "4.1"),
            ("DDMS_VOCAB_LOCATION", "/srv/cve"),
            ("DDMS_VOCAB_LOCATION_2_0", "/srv/cve-old"),
            ("DDMS_PREFIX_ISM", "icism"),
            ("DDMS_FORMAT", "html"),
        ]));

        let config =
            ConfigManager::apply_environment_overrides_with(&env, Config::default()).unwrap();
        assert_eq!(config.schema.default_version, "4.1");
        assert_eq!(
            config.vocabulary.location_for(SchemaVersion::V5_0),
            Some("/srv/cve")
        );
        assert_eq!(
            config.vocabulary.location_for(SchemaVersion::V2_0),
            Some("/srv/cve-old")
        );
        assert_eq!(config.prefixes.ism, "icism");
        assert_eq!(config.output.format, OutputFormatConfig::Html);
    }

    #[test]
    fn test_invalid_environment_value() {
        let env = MockEnv(HashMap::from([("DDMS_VOCAB_MAX_ENTRIES", "lots")]));
        assert!(matches!(
            ConfigManager::apply_environment_overrides_with(&env, Config::default()),
            Err(ConfigError::Environment(_))
        ));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.schema.default_version = "1.0".to_string();
        assert!(ConfigManager::validate_config(&config).is_err());

        let mut config = Config::default();
        config
            .vocabulary
            .locations
            .insert("vocab.location".to_string(), "/x".to_string());
        assert!(ConfigManager::validate_config(&config).is_err());

        let mut config = Config::default();
        config.prefixes.gml = "1gml".to_string();
        assert!(ConfigManager::validate_config(&config).is_err());

        let mut config = Config::default();
        config.prefixes.ntk = config.prefixes.ism.clone();
        let err = ConfigManager::validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("Duplicate namespace prefix"));

        let mut config = Config::default();
        config.output.verbose = true;
        config.output.quiet = true;
        assert!(ConfigManager::validate_config(&config).is_err());
    }

    #[test]
    fn test_version_alias_in_location_key() {
        let mut config = Config::default();
        config
            .vocabulary
            .locations
            .insert("4.0.vocab.location".to_string(), "/opt/cve".to_string());
        assert!(ConfigManager::validate_config(&config).is_ok());
        assert_eq!(
            config.vocabulary.location_for(SchemaVersion::V4_0_1),
            Some("/opt/cve")
        );

        config
            .vocabulary
            .locations
            .insert("4.0.1.vocab.location".to_string(), "/opt/other".to_string());
        let err = ConfigManager::validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("set more than once"));
    }

    #[test]
    fn test_cli_takes_precedence() {
        use clap::Parser;

        let cli = Cli::try_parse_from([
            "ddms-records",
            "records",
            "--schema-version",
            "3.0",
            "--format",
            "xml",
            "--extensions",
            "ddms",
            "--vocab-location",
            "/opt/cve",
            "-q",
        ])
        .unwrap();

        let config = ConfigManager::merge_with_cli(Config::default(), &cli);
        assert_eq!(config.schema.default_version, "3.0");
        assert_eq!(config.output.format, OutputFormatConfig::Xml);
        assert_eq!(config.files.extensions, vec!["ddms".to_string()]);
        assert!(config.output.quiet);
        for version in SchemaVersion::all() {
            assert_eq!(config.vocabulary.location_for(*version), Some("/opt/cve"));
        }
        assert!(ConfigManager::validate_config(&config).is_ok());
    }
}
