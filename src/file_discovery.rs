use crate::error::Result;
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};

/// Record file discovery over a file or directory tree
#[derive(Debug, Clone)]
pub struct FileDiscovery {
    /// File extensions to include (e.g., ["xml"])
    extensions: Vec<String>,
    /// Maximum depth for directory traversal (None = unlimited)
    max_depth: Option<usize>,
    /// Follow symbolic links
    follow_symlinks: bool,
}

impl FileDiscovery {
    pub fn new() -> Self {
        Self {
            extensions: vec!["xml".to_string()],
            max_depth: None,
            follow_symlinks: false,
        }
    }

    /// Set file extensions to discover
    pub fn with_extensions(mut self, extensions: Vec<String>) -> Self {
        self.extensions = extensions
            .into_iter()
            .map(|extension| extension.to_lowercase())
            .collect();
        self
    }

    /// Set maximum traversal depth, counted from the files directly under the root
    pub fn with_max_depth(mut self, depth: Option<usize>) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn with_follow_symlinks(mut self, follow: bool) -> Self {
        self.follow_symlinks = follow;
        self
    }

    /// Discover files in the given path (file or directory), sorted by path
    pub fn discover_files(&self, path: &Path) -> Result<Vec<PathBuf>> {
        let metadata = std::fs::metadata(path)?;

        if metadata.is_file() {
            if self.should_process(path) {
                return Ok(vec![path.to_path_buf()]);
            }
            return Ok(Vec::new());
        }

        let mut walker = WalkBuilder::new(path);
        walker
            .standard_filters(false)
            .hidden(true)
            .follow_links(self.follow_symlinks)
            .max_depth(self.max_depth.map(|depth| depth + 1));

        let mut files = Vec::new();
        for entry in walker.build() {
            match entry {
                Ok(entry) => {
                    if entry.file_type().is_some_and(|ft| ft.is_file())
                        && self.should_process(entry.path())
                    {
                        files.push(entry.into_path());
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Skipping unreadable entry");
                }
            }
        }

        files.sort();
        Ok(files)
    }

    /// Check if a file should be processed based on its extension
    pub fn should_process(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|extension| self.extensions.contains(&extension.to_lowercase()))
    }
}

impl Default for FileDiscovery {
    fn default() -> Self {
        Self::new()
    }
}
