use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use tsdocgen::config::Config;
use tsdocgen::core::{category_listing, DeclarationKind, Engine, SharedTypeIndex, TypeReferenceIndex};

#[derive(Parser)]
#[command(name = "tsdocgen")]
#[command(about = "Generate reference docs from tagged TypeScript declarations")]
#[command(version)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a default configuration file
    Init {
        /// Target directory (defaults to current directory)
        #[arg(short, long)]
        path: Option<PathBuf>,
    },

    /// Generate documentation
    Generate {
        /// Source files or directories (defaults to project.source_dirs)
        sources: Vec<PathBuf>,

        /// Output directory for documentation
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Keep running and regenerate files as they change
        #[arg(short, long)]
        watch: bool,
    },

    /// List documented declarations by category without writing anything
    List {
        /// Source files or directories (defaults to project.source_dirs)
        sources: Vec<PathBuf>,

        /// Print the records as JSON
        #[arg(long)]
        json: bool,
    },
}

impl Cli {
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Init { path } => {
                let target = path.unwrap_or_else(|| PathBuf::from(".")).join("tsdocgen.toml");
                if target.exists() {
                    bail!("{} already exists", target.display());
                }
                Config::default().save(&target)?;
                info!("Wrote {}", target.display());
                Ok(())
            }
            Commands::Generate { sources, output, watch } => {
                let engine = Engine::new(self.config.as_deref())?;
                let files = resolve_sources(&engine, sources)?;
                let output = output.unwrap_or_else(|| engine.config().project.docs_dir.clone());

                let mut index = TypeReferenceIndex::new();
                let report = engine.generate(&files, &output, &mut index)?;

                if watch {
                    let engine = Arc::new(engine);
                    return engine
                        .watch(files, output, SharedTypeIndex::new(index))
                        .await
                        .context("watch mode failed");
                }

                if !report.is_success() {
                    bail!("{} of {} files failed", report.failures.len(), files.len());
                }
                Ok(())
            }
            Commands::List { sources, json } => {
                let engine = Engine::new(self.config.as_deref())?;
                let files = resolve_sources(&engine, sources)?;

                let mut index = TypeReferenceIndex::new();
                let mut declarations = Vec::new();
                for file in &files {
                    let extracted = engine
                        .extract_file(file, &mut index)
                        .with_context(|| format!("failed to extract {}", file.display()))?;
                    declarations.extend(extracted);
                }

                let listing = category_listing(&declarations);
                if json {
                    println!("{}", serde_json::to_string_pretty(&listing)?);
                    return Ok(());
                }

                for (category, entries) in listing {
                    println!("{}", category);
                    for declaration in entries {
                        let kind = match declaration.kind {
                            DeclarationKind::Interface { .. } => "interface",
                            DeclarationKind::TypeAlias { .. } => "type",
                        };
                        println!(
                            "  {:>4}  {:<9} {}  ({}:{})",
                            declaration.info.weight,
                            kind,
                            declaration.info.title,
                            declaration.info.source_file.display(),
                            declaration.info.source_line
                        );
                    }
                }
                Ok(())
            }
        }
    }
}

fn resolve_sources(engine: &Engine, sources: Vec<PathBuf>) -> Result<Vec<PathBuf>> {
    let inputs = if sources.is_empty() {
        engine.config().project.source_dirs.clone()
    } else {
        sources
    };
    let files = engine.discover_sources(&inputs)?;
    if files.is_empty() {
        bail!("no source files found");
    }
    Ok(files)
}
