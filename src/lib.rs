//! # ddms-records Library
//!
//! Versioned DDMS metadata records: immutable, validated components that can
//! be parsed from XML, constructed from typed values, edited through mutable
//! builders, and rendered back to XML, HTML meta tags or plain text.
//!
//! Every operation takes an explicit [`RecordContext`] carrying the schema
//! version, the controlled vocabulary store and the namespace prefixes.

pub mod builder;
pub mod catalog;
pub mod cli;
pub mod component;
pub mod config;
pub mod context;
pub mod error;
pub mod file_discovery;
pub mod leaf;
pub mod node;
pub mod output;
pub mod render;
pub mod resource;
pub mod security;
pub mod validation;
pub mod validator;
pub mod version;
pub mod vocabulary;

pub use builder::{Builder, BuilderList};
pub use cli::{Cli, OutputFormat, VerbosityLevel};
pub use component::{Component, ElementDef};
pub use config::{Config, ConfigError, ConfigManager};
pub use context::RecordContext;
pub use error::{DdmsError, Result, VocabularyError};
pub use file_discovery::FileDiscovery;
pub use leaf::{TextComponent, TextComponentBuilder};
pub use node::{ComponentNode, QName};
pub use output::Output;
pub use resource::{Resource, ResourceBuilder, ResourceHeader, TopLevel};
pub use security::{Security, SecurityAttributes, SecurityAttributesBuilder};
pub use validation::{MessageKind, ValidationMessage};
pub use validator::{FileValidationResult, RecordValidator, ValidationResults, ValidationStatus};
pub use version::{SchemaVersion, Space};
pub use vocabulary::{LoadReport, Vocabulary, VocabularyStore};
