//! Archive sources: named uploads or files on disk.
//!
//! When no archive is given explicitly, the configured assets directory is
//! scanned for packages matching `ingest.include_globs`.

use anyhow::{bail, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::IngestConfig;

/// One survey archive to ingest.
#[derive(Debug, Clone)]
pub enum ArchiveSource {
    /// An in-memory package, optionally carrying its upload name.
    Upload { name: Option<String>, bytes: Vec<u8> },
    /// A package on disk, read when it is ingested.
    Path(PathBuf),
}

impl ArchiveSource {
    pub fn upload(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        ArchiveSource::Upload {
            name: Some(name.into()),
            bytes,
        }
    }

    pub fn unnamed(bytes: Vec<u8>) -> Self {
        ArchiveSource::Upload { name: None, bytes }
    }

    /// The declared archive name, if there is one.
    pub fn name(&self) -> Option<String> {
        match self {
            ArchiveSource::Upload { name, .. } => name.clone(),
            ArchiveSource::Path(path) => path
                .file_name()
                .map(|n| n.to_string_lossy().to_string()),
        }
    }

    /// Survey identifier for the source at `position` in the input list.
    pub fn survey_id(&self, position: usize) -> String {
        survey_id(self.name().as_deref(), position)
    }
}

/// The archive name without its `.zip` suffix, or `Survey_<position+1>`
/// when there is no usable name.
pub fn survey_id(name: Option<&str>, position: usize) -> String {
    let stem = name.map(strip_zip_suffix).filter(|s| !s.is_empty());
    match stem {
        Some(stem) => stem.to_string(),
        None => format!("Survey_{}", position + 1),
    }
}

fn strip_zip_suffix(name: &str) -> &str {
    const SUFFIX: &str = ".zip";
    match name.len().checked_sub(SUFFIX.len()) {
        Some(cut) if name.get(cut..).is_some_and(|s| s.eq_ignore_ascii_case(SUFFIX)) => {
            &name[..cut]
        }
        _ => name,
    }
}

/// Resolve CLI arguments into sources. Files are taken as-is, directories
/// are scanned, and an empty list falls back to the assets directory.
pub fn resolve(paths: &[PathBuf], config: &IngestConfig) -> Result<Vec<ArchiveSource>> {
    if paths.is_empty() {
        return scan_assets(config);
    }
    let mut sources = Vec::new();
    for path in paths {
        if path.is_dir() {
            sources.extend(scan_dir(path, config)?);
        } else {
            sources.push(ArchiveSource::Path(path.clone()));
        }
    }
    Ok(sources)
}

pub fn scan_assets(config: &IngestConfig) -> Result<Vec<ArchiveSource>> {
    let root = &config.assets_dir;
    if !root.is_dir() {
        bail!(
            "No archives given and no assets found: {} is not a directory",
            root.display()
        );
    }
    scan_dir(root, config)
}

/// Archive files under `root` matching the include globs, sorted by
/// relative path.
pub fn scan_dir(root: &Path, config: &IngestConfig) -> Result<Vec<ArchiveSource>> {
    let include_set = build_globset(&config.include_globs)?;

    let mut walker = WalkDir::new(root);
    if !config.recursive {
        walker = walker.max_depth(1);
    }

    let mut found = Vec::new();
    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        let relative = path.strip_prefix(root).unwrap_or(path);
        let rel_str = relative.to_string_lossy().to_string();
        if !include_set.is_match(&rel_str) {
            continue;
        }
        found.push((rel_str, path.to_path_buf()));
    }

    // Sort for deterministic survey order
    found.sort_by(|a, b| a.0.cmp(&b.0));
    tracing::debug!(root = %root.display(), archives = found.len(), "scanned archive directory");

    Ok(found
        .into_iter()
        .map(|(_, path)| ArchiveSource::Path(path))
        .collect())
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern)?);
    }
    Ok(builder.build()?)
}
