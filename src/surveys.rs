//! Per-survey overview of an ingestion run.
//!
//! Used by `roadscan surveys` to show what each archive contributed and
//! which archives could not be read.

use anyhow::Result;
use std::path::PathBuf;

use crate::config::Config;
use crate::pipeline::{self, Ingestion};
use crate::progress::IngestProgressReporter;

/// Counts shown for one survey.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurveySummary {
    pub survey: String,
    pub detections: usize,
    pub roughness: usize,
    pub images: usize,
    pub error: Option<String>,
}

/// One row per source, in input order. Counts are of normalized records.
/// Failed sources keep their row.
pub fn summarize(ingestion: &Ingestion) -> Vec<SurveySummary> {
    let dataset = ingestion.dataset.as_ref().ok();
    let mut rows: Vec<SurveySummary> = Vec::with_capacity(ingestion.sources.len());

    for report in &ingestion.sources {
        let row = match &report.outcome {
            Ok(_) => SurveySummary {
                survey: report.survey.clone(),
                detections: dataset.map_or(0, |d| {
                    d.detections.iter().filter(|r| r.survey == report.survey).count()
                }),
                roughness: dataset.map_or(0, |d| {
                    d.roughness.iter().filter(|r| r.survey == report.survey).count()
                }),
                images: ingestion.images.count_for(&report.survey),
                error: None,
            },
            Err(e) => SurveySummary {
                survey: report.survey.clone(),
                detections: 0,
                roughness: 0,
                images: 0,
                error: Some(e.to_string()),
            },
        };
        rows.push(row);
    }
    rows
}

pub fn run_surveys(
    config: &Config,
    archives: &[PathBuf],
    progress: &dyn IngestProgressReporter,
) -> Result<()> {
    let ingestion = pipeline::ingest_paths(archives, &config.ingest, progress)?;
    let rows = summarize(&ingestion);

    println!(
        "{:<32} {:>10} {:>10} {:>8}   {}",
        "SURVEY", "DETECTIONS", "ROUGHNESS", "IMAGES", "STATUS"
    );
    println!("{}", "-".repeat(76));
    for row in &rows {
        let status = match &row.error {
            Some(_) => "FAILED",
            None => "OK",
        };
        println!(
            "{:<32} {:>10} {:>10} {:>8}   {}",
            row.survey, row.detections, row.roughness, row.images, status
        );
    }

    if let Err(e) = &ingestion.dataset {
        anyhow::bail!("{}", e);
    }
    Ok(())
}
