//! Query commands: GeoJSON export, tables and frame image extraction.
//!
//! Each command ingests the archives, applies the survey/category
//! selection, and hands the result to the presentation layer. Empty
//! selections surface as an error message rather than an empty map.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::filter::{self, Selection};
use crate::geo;
use crate::matcher::FrameMatcher;
use crate::models::Dataset;
use crate::pipeline;
use crate::progress::IngestProgressReporter;
use crate::render::{self, MapView};

/// Survey and category choices from the command line.
#[derive(Debug, Clone, Default)]
pub struct SelectionArgs {
    pub surveys: Vec<String>,
    pub hide_detections: bool,
    pub hide_roughness: bool,
}

impl SelectionArgs {
    pub fn selection(&self, dataset: &Dataset) -> Selection {
        let mut selection = Selection::all(dataset).with_surveys(self.surveys.iter().cloned());
        selection.show_detections = !self.hide_detections;
        selection.show_roughness = !self.hide_roughness;
        selection
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum TableKind {
    Detections,
    Roughness,
}

/// Write the visible markers and map view as GeoJSON to `output`, or to
/// stdout when `output` is `None`.
pub fn run_export(
    config: &Config,
    archives: &[PathBuf],
    args: &SelectionArgs,
    output: Option<&Path>,
    progress: &dyn IngestProgressReporter,
) -> Result<()> {
    let (dataset, images) =
        pipeline::ingest_paths(archives, &config.ingest, progress)?.into_dataset()?;
    let visible = filter::apply(&dataset, &args.selection(&dataset));
    let center = geo::centroid(&visible)?;

    let matcher = FrameMatcher::new(&images, &config.ingest);
    let mut markers = render::detection_markers(&visible.detections, &matcher, &config.render);
    markers.extend(render::roughness_markers(&visible.roughness));

    let view = MapView::new(center, &config.render);
    let json = serde_json::to_string_pretty(&render::to_geojson(&view, &markers))?;

    match output {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, &json)?;
            eprintln!(
                "Exported {} detections, {} roughness points to {}",
                visible.detections.len(),
                visible.roughness.len(),
                path.display()
            );
        }
        None => {
            println!("{}", json);
        }
    }
    Ok(())
}

pub fn run_table(
    config: &Config,
    archives: &[PathBuf],
    kind: TableKind,
    surveys: &[String],
    progress: &dyn IngestProgressReporter,
) -> Result<()> {
    let (dataset, _) =
        pipeline::ingest_paths(archives, &config.ingest, progress)?.into_dataset()?;
    let args = SelectionArgs {
        surveys: surveys.to_vec(),
        ..SelectionArgs::default()
    };
    let visible = filter::apply(&dataset, &args.selection(&dataset));

    let table = match kind {
        TableKind::Detections => render::detection_table(&visible.detections),
        TableKind::Roughness => render::roughness_table(&visible.roughness),
    };
    print!("{}", table);
    Ok(())
}

/// Write the image matched to `frame` of `survey` to `output`.
pub fn run_image(
    config: &Config,
    archives: &[PathBuf],
    survey: &str,
    frame: u64,
    output: &Path,
    progress: &dyn IngestProgressReporter,
) -> Result<()> {
    let ingestion = pipeline::ingest_paths(archives, &config.ingest, progress)?;
    let matcher = FrameMatcher::new(&ingestion.images, &config.ingest);
    let (name, bytes) = matcher
        .find(survey, frame)
        .with_context(|| format!("No image for frame {} in survey '{}'", frame, survey))?;

    std::fs::write(output, bytes)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    eprintln!("{} -> {}", name, output.display());
    Ok(())
}
