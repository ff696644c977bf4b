use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::component::Component;
use crate::context::RecordContext;
use crate::error::DdmsError;
use crate::node::ComponentNode;
use crate::resource::Resource;
use crate::validation::ValidationMessage;
use crate::version::SchemaVersion;

/// Status of a single record file
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationStatus {
    /// The record was built; warnings may still be attached
    Valid,
    /// A structural rule was broken
    Invalid { message: ValidationMessage },
    /// The file could not be read or is not well-formed XML
    Error { message: String },
}

impl ValidationStatus {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationStatus::Valid)
    }

    pub fn is_invalid(&self) -> bool {
        matches!(self, ValidationStatus::Invalid { .. })
    }

    pub fn is_error(&self) -> bool {
        matches!(self, ValidationStatus::Error { .. })
    }
}

/// Result of checking a single file
#[derive(Debug, Clone)]
pub struct FileValidationResult {
    pub path: PathBuf,
    pub status: ValidationStatus,
    /// Version the record was read under, once known
    pub version: Option<SchemaVersion>,
    pub duration: Duration,
    /// The built record, for valid files
    pub record: Option<Resource>,
}

impl FileValidationResult {
    pub fn valid(path: PathBuf, record: Resource, duration: Duration) -> Self {
        Self {
            path,
            status: ValidationStatus::Valid,
            version: Some(record.version()),
            duration,
            record: Some(record),
        }
    }

    pub fn invalid(
        path: PathBuf,
        version: SchemaVersion,
        message: ValidationMessage,
        duration: Duration,
    ) -> Self {
        Self {
            path,
            status: ValidationStatus::Invalid { message },
            version: Some(version),
            duration,
            record: None,
        }
    }

    pub fn error(path: PathBuf, error: DdmsError, duration: Duration) -> Self {
        Self {
            path,
            status: ValidationStatus::Error {
                message: error.to_string(),
            },
            version: None,
            duration,
            record: None,
        }
    }

    /// Warnings gathered while building the record
    pub fn warnings(&self) -> &[ValidationMessage] {
        self.record
            .as_ref()
            .map(|record| record.warnings())
            .unwrap_or(&[])
    }
}

/// Aggregated results of checking multiple files
#[derive(Debug, Clone)]
pub struct ValidationResults {
    pub total_files: usize,
    pub valid_files: usize,
    pub invalid_files: usize,
    pub error_files: usize,
    /// Valid files that carry at least one warning
    pub warned_files: usize,
    pub total_duration: Duration,
    pub file_results: Vec<FileValidationResult>,
}

impl ValidationResults {
    /// Aggregate individual file results into summary
    pub fn aggregate(file_results: Vec<FileValidationResult>) -> Self {
        let mut valid_files = 0;
        let mut invalid_files = 0;
        let mut error_files = 0;
        let mut warned_files = 0;
        let mut total_duration = Duration::ZERO;

        for result in &file_results {
            match result.status {
                ValidationStatus::Valid => {
                    valid_files += 1;
                    if !result.warnings().is_empty() {
                        warned_files += 1;
                    }
                }
                ValidationStatus::Invalid { .. } => invalid_files += 1,
                ValidationStatus::Error { .. } => error_files += 1,
            }
            total_duration += result.duration;
        }

        Self {
            total_files: file_results.len(),
            valid_files,
            invalid_files,
            error_files,
            warned_files,
            total_duration,
            file_results,
        }
    }

    /// Check if all files produced a record
    pub fn all_valid(&self) -> bool {
        self.valid_files == self.total_files && self.total_files > 0
    }

    /// Check if any file failed
    pub fn has_errors(&self) -> bool {
        self.error_files > 0 || self.invalid_files > 0
    }

    /// Get success rate as a percentage
    pub fn success_rate(&self) -> f64 {
        if self.total_files == 0 {
            0.0
        } else {
            (self.valid_files as f64 / self.total_files as f64) * 100.0
        }
    }
}

/// Reads record files and builds them as resources
#[derive(Debug, Clone)]
pub struct RecordValidator {
    ctx: RecordContext,
    /// Read every record under the context version instead of its own namespace
    pinned: bool,
}

impl RecordValidator {
    /// Validator that picks the version from each record's namespace, falling
    /// back to the context version for unknown namespaces
    pub fn new(ctx: RecordContext) -> Self {
        Self { ctx, pinned: false }
    }

    /// Validator that reads every record under the context version
    pub fn pinned(ctx: RecordContext) -> Self {
        Self { ctx, pinned: true }
    }

    pub fn context(&self) -> &RecordContext {
        &self.ctx
    }

    fn context_for(&self, node: &ComponentNode) -> RecordContext {
        if self.pinned {
            return self.ctx.clone();
        }
        match SchemaVersion::for_namespace(node.name().namespace()) {
            Some(version) => self.ctx.with_version(version),
            None => self.ctx.clone(),
        }
    }

    /// Check one record held in memory
    pub fn validate_str(&self, path: &Path, xml: &str) -> FileValidationResult {
        let start = Instant::now();
        let node = match ComponentNode::parse(xml) {
            Ok(node) => node,
            Err(e) => return FileValidationResult::error(path.to_path_buf(), e, start.elapsed()),
        };

        let ctx = self.context_for(&node);
        match Resource::from_node(&node, &ctx) {
            Ok(record) => {
                tracing::debug!(path = %path.display(), version = %ctx.version(), "Record is valid");
                FileValidationResult::valid(path.to_path_buf(), record, start.elapsed())
            }
            Err(DdmsError::Invalid(message)) => {
                tracing::debug!(path = %path.display(), %message, "Record is invalid");
                FileValidationResult::invalid(
                    path.to_path_buf(),
                    ctx.version(),
                    message,
                    start.elapsed(),
                )
            }
            Err(e) => FileValidationResult::error(path.to_path_buf(), e, start.elapsed()),
        }
    }

    /// Check one record file
    pub fn validate_file(&self, path: &Path) -> FileValidationResult {
        let start = Instant::now();
        match std::fs::read_to_string(path) {
            Ok(xml) => {
                let mut result = self.validate_str(path, &xml);
                result.duration = start.elapsed();
                result
            }
            Err(e) => FileValidationResult::error(path.to_path_buf(), e.into(), start.elapsed()),
        }
    }

    /// Check every file, in order
    pub fn validate_files(&self, paths: &[PathBuf]) -> ValidationResults {
        let results = paths.iter().map(|path| self.validate_file(path)).collect();
        ValidationResults::aggregate(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DDMS_50: &str = "urn:us:mil:ces:metadata:ddms:5";

    fn record(namespace: &str, body: &str) -> String {
        format!(
            r#"<ddms:resource xmlns:ddms="{namespace}" xmlns:ism="urn:us:gov:ic:ism" ism:resourceElement="true" ism:createDate="2010-01-21" ism:DESVersion="9" ism:classification="U" ism:ownerProducer="USA">{body}</ddms:resource>"#
        )
    }

    fn valid_body() -> &'static str {
        r#"<ddms:metacardInfo/>"#
    }

    #[test]
    fn test_malformed_xml_is_error() {
        let validator = RecordValidator::new(RecordContext::for_version(SchemaVersion::V5_0));
        let result = validator.validate_str(Path::new("broken.xml"), "<ddms:resource");
        assert!(result.status.is_error());
        assert!(result.record.is_none());
    }

    #[test]
    fn test_structural_failure_is_invalid() {
        let validator = RecordValidator::new(RecordContext::for_version(SchemaVersion::V5_0));
        let xml = record(DDMS_50, valid_body());
        let result = validator.validate_str(Path::new("bad.xml"), &xml);

        match &result.status {
            ValidationStatus::Invalid { message } => {
                assert_eq!(message.locator(), "/ddms:resource");
            }
            other => panic!("Expected Invalid, got {:?}", other),
        }
        assert_eq!(result.version, Some(SchemaVersion::V5_0));
    }

    #[test]
    fn test_version_detected_from_namespace() {
        let validator = RecordValidator::new(RecordContext::for_version(SchemaVersion::V5_0));
        let xml = r#"<ddms:Resource xmlns:ddms="http://metadata.dod.mil/mdr/ns/DDMS/2.0/"/>"#;
        let result = validator.validate_str(Path::new("old.xml"), xml);
        assert_eq!(result.version, Some(SchemaVersion::V2_0));
    }

    #[test]
    fn test_pinned_version_is_used() {
        let validator = RecordValidator::pinned(RecordContext::for_version(SchemaVersion::V5_0));
        let xml = r#"<ddms:Resource xmlns:ddms="http://metadata.dod.mil/mdr/ns/DDMS/2.0/"/>"#;
        let result = validator.validate_str(Path::new("old.xml"), xml);
        assert!(result.status.is_invalid());
        assert_eq!(result.version, Some(SchemaVersion::V5_0));
    }

    #[test]
    fn test_missing_file_is_error() {
        let validator = RecordValidator::new(RecordContext::for_version(SchemaVersion::V5_0));
        let result = validator.validate_file(Path::new("/nonexistent/record.xml"));
        assert!(result.status.is_error());
    }

    #[test]
    fn test_aggregate_counts() {
        let validator = RecordValidator::new(RecordContext::for_version(SchemaVersion::V5_0));
        let results = ValidationResults::aggregate(vec![
            validator.validate_str(Path::new("a.xml"), "<broken"),
            validator.validate_str(Path::new("b.xml"), &record(DDMS_50, valid_body())),
        ]);

        assert_eq!(results.total_files, 2);
        assert_eq!(results.error_files, 1);
        assert_eq!(results.invalid_files, 1);
        assert_eq!(results.valid_files, 0);
        assert!(results.has_errors());
        assert!(!results.all_valid());
        assert_eq!(results.success_rate(), 0.0);
    }
}
