use std::collections::HashSet;
use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Component, Path, PathBuf};

use tracing::{debug, info};
use walkdir::WalkDir;

use crate::config::OutputConfig;
use crate::error::{DocgenError, Result};
use super::renderer::GENERATED_MARKER;

/// Persists rendered documents into a category-partitioned tree.
///
/// Category directories and index documents are initialized once per run;
/// the set of initialized categories lives as long as the writer.
pub struct OutputWriter {
    root: PathBuf,
    extension: String,
    index_file_name: String,
    initialized: HashSet<String>,
}

impl OutputWriter {
    pub fn new(root: &Path, config: &OutputConfig) -> Self {
        Self {
            root: root.to_path_buf(),
            extension: config.extension.trim_start_matches('.').to_string(),
            index_file_name: config.index_file_name.clone(),
            initialized: HashSet::new(),
        }
    }

    /// Write `<category>/<file_name>.<ext>`, overwriting unconditionally.
    ///
    /// `index_content` is only called when the category index does not exist yet.
    pub fn write<F>(&mut self, category: &str, file_name: &str, content: &str, index_content: F) -> Result<PathBuf>
    where
        F: FnOnce() -> Result<String>,
    {
        let category_dir = self.ensure_category(category, index_content)?;
        let path = category_dir.join(format!("{}.{}", file_name, self.extension));
        std::fs::write(&path, content).map_err(|e| DocgenError::fs("write", &path, e))?;
        debug!("Wrote {}", path.display());
        Ok(path)
    }

    fn ensure_category<F>(&mut self, category: &str, index_content: F) -> Result<PathBuf>
    where
        F: FnOnce() -> Result<String>,
    {
        let category_dir = self.root.join(validate_category(category)?);
        if self.initialized.contains(category) {
            return Ok(category_dir);
        }

        std::fs::create_dir_all(&category_dir)
            .map_err(|e| DocgenError::fs("create directory", &category_dir, e))?;

        let index_path = category_dir.join(format!("{}.{}", self.index_file_name, self.extension));
        if !index_path.exists() {
            let content = index_content()?;
            // create_new keeps a concurrently created index intact
            match OpenOptions::new().write(true).create_new(true).open(&index_path) {
                Ok(mut file) => {
                    file.write_all(content.as_bytes())
                        .map_err(|e| DocgenError::fs("write", &index_path, e))?;
                    debug!("Created category index {}", index_path.display());
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {}
                Err(e) => return Err(DocgenError::fs("create", &index_path, e)),
            }
        }

        self.initialized.insert(category.to_string());
        Ok(category_dir)
    }
}

/// Categories become relative directories and may not escape the output root
fn validate_category(category: &str) -> Result<&Path> {
    let path = Path::new(category);
    let valid = !category.trim().is_empty()
        && path.components().all(|c| matches!(c, Component::Normal(_)));
    if valid {
        Ok(path)
    } else {
        Err(DocgenError::Output(format!("invalid category `{}`", category)))
    }
}

/// Delete every file under `root` that carries the generated marker.
///
/// Files without the marker (hand-written pages) and non-UTF-8 files are left
/// alone. A missing root is not an error. Returns the number of deleted files.
pub fn delete_generated(root: &Path) -> Result<usize> {
    if !root.exists() {
        return Ok(0);
    }

    let mut deleted = 0;
    for entry in WalkDir::new(root) {
        let entry = entry.map_err(|e| DocgenError::FileSystem(e.to_string()))?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::InvalidData => continue,
            Err(e) => return Err(DocgenError::fs("read", path, e)),
        };

        if content.contains(GENERATED_MARKER) {
            std::fs::remove_file(path).map_err(|e| DocgenError::fs("delete", path, e))?;
            deleted += 1;
        }
    }

    info!("Removed {} previously generated files from {}", deleted, root.display());
    Ok(deleted)
}
