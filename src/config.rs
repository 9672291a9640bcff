use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub ingest: IngestConfig,
    #[serde(default)]
    pub render: RenderConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct IngestConfig {
    #[serde(default = "default_assets_dir")]
    pub assets_dir: PathBuf,
    #[serde(default = "default_include_globs")]
    pub include_globs: Vec<String>,
    #[serde(default)]
    pub recursive: bool,
    #[serde(default = "default_image_extensions")]
    pub image_extensions: Vec<String>,
    #[serde(default = "default_max_entry_bytes")]
    pub max_entry_bytes: u64,
    /// Drop records that lack a frame (detections) or magnitude (roughness).
    #[serde(default)]
    pub require_complete: bool,
    #[serde(default)]
    pub unknown_class: UnknownClassPolicy,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            assets_dir: default_assets_dir(),
            include_globs: default_include_globs(),
            recursive: false,
            image_extensions: default_image_extensions(),
            max_entry_bytes: default_max_entry_bytes(),
            require_complete: false,
            unknown_class: UnknownClassPolicy::default(),
        }
    }
}

fn default_assets_dir() -> PathBuf {
    PathBuf::from("assets")
}
fn default_include_globs() -> Vec<String> {
    vec!["*.zip".to_string()]
}
fn default_image_extensions() -> Vec<String> {
    vec!["jpg".to_string()]
}
fn default_max_entry_bytes() -> u64 {
    64 * 1024 * 1024
}

/// What to do with a detection whose class code is not a known category.
#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum UnknownClassPolicy {
    /// Exclude the record and report it.
    #[default]
    Reject,
    /// Keep the record under an `Unknown (class N)` label.
    Label,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RenderConfig {
    #[serde(default = "default_popup_width")]
    pub popup_width: u32,
    #[serde(default = "default_zoom_start")]
    pub zoom_start: u8,
    #[serde(default = "default_min_zoom")]
    pub min_zoom: u8,
    #[serde(default = "default_max_zoom")]
    pub max_zoom: u8,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            popup_width: default_popup_width(),
            zoom_start: default_zoom_start(),
            min_zoom: default_min_zoom(),
            max_zoom: default_max_zoom(),
        }
    }
}

fn default_popup_width() -> u32 {
    600
}
fn default_zoom_start() -> u8 {
    16
}
fn default_min_zoom() -> u8 {
    2
}
fn default_max_zoom() -> u8 {
    30
}

impl IngestConfig {
    /// True when `name` ends in one of the configured image extensions.
    pub fn is_image(&self, name: &str) -> bool {
        self.strip_image_extension(name).is_some()
    }

    /// `name` without its image extension, or `None` if it is not an image.
    pub fn strip_image_extension<'a>(&self, name: &'a str) -> Option<&'a str> {
        self.image_extensions.iter().find_map(|ext| {
            let dot = name.len().checked_sub(ext.len() + 1)?;
            let stem = name.get(..dot)?;
            let found = name.get(dot..)?.strip_prefix('.')?;
            found.eq_ignore_ascii_case(ext).then_some(stem)
        })
    }
}

/// Load the configuration at `path`, falling back to defaults when the
/// file does not exist.
pub fn load_or_default(path: &Path) -> Result<Config> {
    if path.exists() {
        load_config(path)
    } else {
        tracing::debug!(path = %path.display(), "config file not found, using defaults");
        Ok(Config::default())
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    validate(&config)?;
    Ok(config)
}

fn validate(config: &Config) -> Result<()> {
    let ingest = &config.ingest;
    if ingest.image_extensions.is_empty() {
        anyhow::bail!("ingest.image_extensions must not be empty");
    }
    if let Some(bad) = ingest
        .image_extensions
        .iter()
        .find(|e| e.is_empty() || e.contains('.'))
    {
        anyhow::bail!(
            "ingest.image_extensions entries must be bare extensions without dots, got '{}'",
            bad
        );
    }
    if ingest.max_entry_bytes == 0 {
        anyhow::bail!("ingest.max_entry_bytes must be > 0");
    }
    for pattern in &ingest.include_globs {
        globset::Glob::new(pattern)
            .with_context(|| format!("ingest.include_globs: invalid glob '{}'", pattern))?;
    }

    let render = &config.render;
    if render.popup_width == 0 {
        anyhow::bail!("render.popup_width must be > 0");
    }
    if !(render.min_zoom..=render.max_zoom).contains(&render.zoom_start) {
        anyhow::bail!(
            "render.zoom_start ({}) must lie within [min_zoom, max_zoom] = [{}, {}]",
            render.zoom_start,
            render.min_zoom,
            render.max_zoom
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn empty_file_uses_defaults() {
        let cfg: Config = toml::from_str("").unwrap();
        assert_eq!(cfg.ingest.include_globs, vec!["*.zip"]);
        assert_eq!(cfg.ingest.unknown_class, UnknownClassPolicy::Reject);
        assert!(!cfg.ingest.require_complete);
        assert_eq!(cfg.render.popup_width, 600);
        assert_eq!(cfg.render.zoom_start, 16);
    }

    #[test]
    fn parses_policy_and_flags() {
        let cfg: Config = toml::from_str(
            r#"
[ingest]
require_complete = true
unknown_class = "label"
image_extensions = ["jpg", "jpeg"]
"#,
        )
        .unwrap();
        assert!(cfg.ingest.require_complete);
        assert_eq!(cfg.ingest.unknown_class, UnknownClassPolicy::Label);
        assert!(cfg.ingest.is_image("frames/a.JPEG"));
    }

    #[test]
    fn rejects_inverted_zoom_range() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("roadscan.toml");
        fs::write(&path, "[render]\nzoom_start = 40\n").unwrap();
        let err = load_config(&path).unwrap_err();
        assert!(err.to_string().contains("zoom_start"));
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let tmp = TempDir::new().unwrap();
        let cfg = load_or_default(&tmp.path().join("absent.toml")).unwrap();
        assert_eq!(cfg.ingest.max_entry_bytes, 64 * 1024 * 1024);
    }

    #[test]
    fn strips_image_extension_case_insensitively() {
        let ingest = IngestConfig::default();
        assert_eq!(ingest.strip_image_extension("img_007.JPG"), Some("img_007"));
        assert_eq!(ingest.strip_image_extension("img_007.png"), None);
        assert_eq!(ingest.strip_image_extension("jpg"), None);
        assert_eq!(ingest.strip_image_extension("notes_jpg"), None);
    }
}
