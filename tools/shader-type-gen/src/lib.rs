//! HLSL header generator library
//!
//! Scans Rust sources for `#[generate_hlsl]` structs and writes one HLSL
//! header next to each source file that declares any (`light.rs` ->
//! `light.rs.hlsl`). A struct that fails to generate is reported and left
//! out; it never stops the rest of the batch.

pub mod config;
pub mod parser;
pub mod writer;

use anyhow::{Context, Result};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use shader_types::{GeneratedType, GenerationFailure, StructureDescription};

pub use config::Config;
use parser::{ParsedFile, TypeIndex};

/// File stems that do not add a module path segment
const MODULE_ROOTS: &[&str] = &["lib", "main", "mod"];

/// A Rust source file and the module path it declares
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    pub module_path: Vec<String>,
}

/// Generation result for one source file
#[derive(Debug, Clone)]
pub struct FileOutput {
    pub source: PathBuf,
    pub output: PathBuf,
    /// Header text; `None` when no struct of the file generated
    pub contents: Option<String>,
    pub generated: usize,
    pub failures: Vec<GenerationFailure>,
}

/// Outcome of a generate run
#[derive(Debug, Default)]
pub struct Report {
    pub written: Vec<PathBuf>,
    pub failures: Vec<GenerationFailure>,
}

/// Outcome of generating from a JSON description file
#[derive(Debug, Default)]
pub struct JsonOutput {
    /// Concatenated documents of every generated structure
    pub text: String,
    pub generated: usize,
    pub failures: Vec<GenerationFailure>,
}

/// Collect the Rust files named by the configured sources, sorted by path
pub fn find_sources(config: &Config) -> Result<Vec<SourceFile>> {
    let mut sources = Vec::new();

    for root in &config.sources {
        if root.is_file() {
            let file_name = root.file_name().map(PathBuf::from).unwrap_or_default();
            sources.push(SourceFile {
                path: root.clone(),
                module_path: module_path(&config.crate_name, &file_name),
            });
        } else if root.is_dir() {
            let walker = WalkDir::new(root)
                .sort_by_file_name()
                .into_iter()
                .filter_entry(|entry| entry.file_name() != "target");
            for entry in walker {
                let entry = entry
                    .with_context(|| format!("Failed to scan {}", root.display()))?;
                let path = entry.path();
                if !entry.file_type().is_file()
                    || path.extension().and_then(|e| e.to_str()) != Some("rs")
                {
                    continue;
                }
                let relative = path.strip_prefix(root).unwrap_or(path);
                sources.push(SourceFile {
                    path: path.to_path_buf(),
                    module_path: module_path(&config.crate_name, relative),
                });
            }
        } else {
            anyhow::bail!("Source path {} does not exist", root.display());
        }
    }

    sources.sort_by(|a, b| a.path.cmp(&b.path));
    sources.dedup_by(|a, b| a.path == b.path);
    Ok(sources)
}

/// Module path for a file relative to its source root: `lighting/probe.rs` ->
/// `[crate, lighting, probe]`
pub fn module_path(crate_name: &str, relative: &Path) -> Vec<String> {
    let mut segments = vec![crate_name.to_string()];

    if let Some(parent) = relative.parent() {
        segments.extend(
            parent
                .components()
                .map(|c| c.as_os_str().to_string_lossy().to_string()),
        );
    }

    if let Some(stem) = relative.file_stem().and_then(|s| s.to_str()) {
        if !MODULE_ROOTS.contains(&stem) {
            segments.push(stem.to_string());
        }
    }

    segments
}

/// Output path for a source file: `light.rs` -> `light.rs.hlsl`
pub fn output_path(source: &Path, extension: &str) -> PathBuf {
    let mut name = source.file_name().unwrap_or_default().to_os_string();
    name.push(".");
    name.push(extension);
    source.with_file_name(name)
}

/// Parse every source file
pub fn parse_sources(config: &Config, sources: &[SourceFile]) -> Result<Vec<ParsedFile>> {
    sources
        .par_iter()
        .map(|source| parser::parse_file(&source.path, &source.module_path, config.default_packing))
        .collect()
}

/// Generate the header of every source file declaring at least one target
///
/// Nothing is written to disk.
pub fn build_outputs(config: &Config) -> Result<Vec<FileOutput>> {
    let sources = find_sources(config)?;
    let parsed = parse_sources(config, &sources)?;
    let index = TypeIndex::new(&parsed);

    tracing::info!("Scanned {} source files", parsed.len());

    parsed
        .par_iter()
        .filter(|file| file.targets().next().is_some())
        .map(|file| render_file(file, &index, &config.extension))
        .collect()
}

fn render_file(file: &ParsedFile, index: &TypeIndex, extension: &str) -> Result<FileOutput> {
    let descriptions: Vec<StructureDescription> =
        file.targets().map(|target| index.resolve(target)).collect();

    let mut generated: Vec<GeneratedType> = Vec::new();
    let mut failures = Vec::new();
    for result in shader_types::generate_batch(&descriptions) {
        match result {
            Ok(ty) => generated.push(ty),
            Err(failure) => failures.push(failure),
        }
    }

    let output = output_path(&file.path, extension);
    let contents = if generated.is_empty() {
        None
    } else {
        let source_name = file_name(&file.path);
        let output_name = file_name(&output);
        Some(
            writer::render_header(&source_name, &output_name, &generated)
                .with_context(|| format!("Failed to render header for {}", file.path.display()))?,
        )
    };

    Ok(FileOutput {
        source: file.path.clone(),
        output,
        contents,
        generated: generated.len(),
        failures,
    })
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_default()
}

fn report_failures(failures: &[GenerationFailure]) {
    for failure in failures {
        for message in failure.messages() {
            tracing::error!("{}", message);
        }
    }
}

/// Generate and write all headers
pub fn generate(config: &Config) -> Result<Report> {
    let mut report = Report::default();

    for file in build_outputs(config)? {
        report_failures(&file.failures);
        report.failures.extend(file.failures);

        let Some(contents) = file.contents else {
            tracing::warn!("Nothing generated for {}", file.source.display());
            continue;
        };

        std::fs::write(&file.output, contents)
            .with_context(|| format!("Failed to write {}", file.output.display()))?;
        tracing::info!(
            "Generated {} ({} structs)",
            file.output.display(),
            file.generated
        );
        report.written.push(file.output);
    }

    Ok(report)
}

/// Check that headers on disk match freshly generated ones
pub fn check(config: &Config) -> Result<bool> {
    let mut in_sync = true;

    for file in build_outputs(config)? {
        if !file.failures.is_empty() {
            report_failures(&file.failures);
            in_sync = false;
        }

        let Some(fresh) = file.contents else {
            continue;
        };

        match std::fs::read_to_string(&file.output) {
            Ok(existing) if existing == fresh => {
                tracing::info!("✓ In sync: {}", file.output.display());
            }
            Ok(_) => {
                tracing::warn!("✗ Out of sync: {}", file.output.display());
                in_sync = false;
            }
            Err(_) => {
                tracing::warn!("✗ Missing: {}", file.output.display());
                in_sync = false;
            }
        }
    }

    Ok(in_sync)
}

/// Generate from a JSON array of structure descriptions
pub fn generate_from_json(path: &Path) -> Result<JsonOutput> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let descriptions: Vec<StructureDescription> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse structure descriptions in {}", path.display()))?;

    Ok(generate_descriptions(&descriptions))
}

/// Generate every description, concatenating the successful documents
pub fn generate_descriptions(descriptions: &[StructureDescription]) -> JsonOutput {
    let mut output = JsonOutput::default();

    for result in shader_types::generate_batch(descriptions) {
        match result {
            Ok(ty) => {
                output.text.push_str(&ty.emit());
                output.generated += 1;
            }
            Err(failure) => output.failures.push(failure),
        }
    }

    output
}
