use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{DocgenError, Result};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Project layout
    pub project: ProjectConfig,

    /// Source code parsing configuration
    pub parsing: ParsingConfig,

    /// Output settings
    pub output: OutputConfig,

    /// Template customization
    pub templates: TemplateConfig,

    /// Watch mode settings
    pub watch: WatchConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    /// Root that provenance paths are reported relative to
    pub source_root: PathBuf,

    /// Source directories scanned when no paths are given
    pub source_dirs: Vec<PathBuf>,

    /// Additional ignore globs applied on top of .gitignore
    pub ignore_patterns: Vec<String>,

    /// Documentation output directory
    pub docs_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ParsingConfig {
    /// File extensions to parse
    pub file_extensions: Vec<String>,

    /// Maximum file size to parse (in bytes)
    pub max_file_size: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Extension of generated documents
    pub extension: String,

    /// File name (without extension) of the per-category index document
    pub index_file_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct TemplateConfig {
    /// Directory holding `declaration.md` / `category_index.md` overrides
    pub template_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    /// Polling interval per watched file
    pub poll_interval_ms: u64,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            source_root: PathBuf::from("."),
            source_dirs: vec![PathBuf::from("src")],
            ignore_patterns: vec![
                "node_modules/".to_string(),
                ".git/".to_string(),
                "*.spec.ts".to_string(),
            ],
            docs_dir: PathBuf::from("docs/content/docs/typescript-api"),
        }
    }
}

impl Default for ParsingConfig {
    fn default() -> Self {
        Self {
            file_extensions: vec!["ts".to_string()],
            max_file_size: 1024 * 1024, // 1MB
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            extension: "md".to_string(),
            index_file_name: "_index".to_string(),
        }
    }
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self { poll_interval_ms: 1000 }
    }
}

impl Config {
    /// Load configuration from file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| DocgenError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| DocgenError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load configuration with fallback to default
    pub fn load_or_default<P: AsRef<Path>>(path: Option<P>) -> Result<Self> {
        match path {
            Some(p) => {
                if p.as_ref().exists() {
                    Self::load(p)
                } else {
                    Ok(Self::default())
                }
            }
            None => {
                let candidates = ["Tsdocgen.toml", "tsdocgen.toml", ".tsdocgen.toml"];

                for candidate in &candidates {
                    if Path::new(candidate).exists() {
                        return Self::load(candidate);
                    }
                }

                Ok(Self::default())
            }
        }
    }

    fn validate(&self) -> Result<()> {
        if self.output.extension.trim().is_empty() {
            return Err(DocgenError::Config("output.extension must not be empty".to_string()));
        }
        if self.watch.poll_interval_ms == 0 {
            return Err(DocgenError::Config("watch.poll_interval_ms must be positive".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tsdocgen.toml");
        std::fs::write(&path, "[watch]\npoll_interval_ms = 250\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.watch.poll_interval_ms, 250);
        assert_eq!(config.output.extension, "md");
        assert_eq!(config.parsing.file_extensions, vec!["ts".to_string()]);
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tsdocgen.toml");
        std::fs::write(&path, "[output\nextension = ").unwrap();

        assert!(matches!(Config::load(&path), Err(DocgenError::Config(_))));
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tsdocgen.toml");
        let mut config = Config::default();
        config.output.extension = "markdown".to_string();
        config.save(&path).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded.output.extension, "markdown");
        assert_eq!(loaded.watch.poll_interval_ms, 1000);
    }

    #[test]
    fn test_missing_explicit_path_falls_back() {
        let config = Config::load_or_default(Some("/definitely/not/here.toml")).unwrap();
        assert_eq!(config.output.index_file_name, "_index");
    }
}
