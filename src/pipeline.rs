//! Ingestion entry point and the per-session pipeline context.
//!
//! ```text
//! sources ──▶ merge ──▶ normalize ──▶ Dataset ──▶ filter ──▶ geo
//!               │                                   ▲
//!               └──▶ ImageCache ──▶ FrameMatcher ───┘ (per marker)
//! ```
//!
//! A [`Session`] is created when ingestion starts and owns everything the
//! later stages read: the merged raw records and the image cache. Nothing
//! is persisted across sessions.

use crate::config::IngestConfig;
use crate::error::{Result, SurveyError};
use crate::images::ImageCache;
use crate::merge::{self, MergedRecords, SourceReport};
use crate::models::Dataset;
use crate::normalize::{self, RecordIssue};
use crate::progress::IngestProgressReporter;
use crate::sources::ArchiveSource;

/// State accumulated while ingesting one batch of archives.
#[derive(Debug, Default)]
pub struct Session {
    pub images: ImageCache,
    pub merged: MergedRecords,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Everything ingestion produced, including what went wrong.
#[derive(Debug)]
pub struct Ingestion {
    pub images: ImageCache,
    pub sources: Vec<SourceReport>,
    pub issues: Vec<RecordIssue>,
    /// The normalized records, or `NoData` when none survived.
    pub dataset: Result<Dataset>,
}

impl Ingestion {
    pub fn failed_sources(&self) -> impl Iterator<Item = (&str, &SurveyError)> {
        self.sources.iter().filter_map(|report| match &report.outcome {
            Ok(_) => None,
            Err(e) => Some((report.survey.as_str(), e)),
        })
    }

    /// The dataset, or the empty-state error to show instead.
    pub fn into_dataset(self) -> Result<(Dataset, ImageCache)> {
        let dataset = self.dataset?;
        Ok((dataset, self.images))
    }
}

/// Read, merge and normalize `sources`.
pub fn ingest(
    sources: &[ArchiveSource],
    config: &IngestConfig,
    progress: &dyn IngestProgressReporter,
) -> Ingestion {
    let mut session = Session::new();
    let reports = merge::merge_sources(sources, &mut session, config, progress);

    let mut issues = Vec::new();
    let dataset = normalize::normalize(&session.merged, config, &mut issues);

    Ingestion {
        images: session.images,
        sources: reports,
        issues,
        dataset,
    }
}

/// Resolve CLI archive arguments and ingest them, printing per-source
/// failures on stderr. Used by every CLI command.
pub fn ingest_paths(
    paths: &[std::path::PathBuf],
    config: &IngestConfig,
    progress: &dyn IngestProgressReporter,
) -> anyhow::Result<Ingestion> {
    if paths.is_empty() {
        progress.report(crate::progress::IngestProgressEvent::Discovering {
            root: config.assets_dir.display().to_string(),
        });
    }
    let sources = crate::sources::resolve(paths, config)?;
    if sources.is_empty() {
        anyhow::bail!("No survey archives found");
    }

    let ingestion = ingest(&sources, config, progress);
    for (survey, error) in ingestion.failed_sources() {
        eprintln!("Failed to read {}: {}", survey, error);
    }
    if !ingestion.issues.is_empty() {
        eprintln!(
            "Warning: {} record(s) dropped during normalization (set RUST_LOG=warn for details)",
            ingestion.issues.len()
        );
    }
    Ok(ingestion)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::tests::zip_bytes;
    use crate::progress::NoProgress;

    #[test]
    fn record_counts_add_up_across_archives() {
        let a = zip_bytes(&[(
            "metadata.json",
            r#"{"detections":[{"frame":1,"latitude":1,"longitude":1,"class":0},
                              {"frame":2,"longitude":1,"class":0}],
                "roughness":[{"latitude":1,"longitude":1,"magnitude_xy":2.0}]}"#,
        )]);
        let b = zip_bytes(&[(
            "metadata.json",
            r#"{"detections":[{"frame":1,"latitude":2,"longitude":2,"class":1}],
                "roughness":[{"latitude":2,"longitude":2,"magnitude_xy":1.0},
                             {"latitude":null,"longitude":2,"magnitude_xy":1.0}]}"#,
        )]);
        let ingestion = ingest(
            &[ArchiveSource::upload("a.zip", a), ArchiveSource::upload("b.zip", b)],
            &IngestConfig::default(),
            &NoProgress,
        );

        let merged: usize = ingestion
            .sources
            .iter()
            .map(|r| {
                let counts = r.outcome.as_ref().unwrap();
                counts.detections + counts.roughness
            })
            .sum();
        let dataset = ingestion.dataset.as_ref().unwrap();
        let kept = dataset.detections.len() + dataset.roughness.len();
        assert_eq!(kept, merged - ingestion.issues.len());
        assert_eq!(kept, 4);
    }

    #[test]
    fn all_sources_failing_is_no_data() {
        let ingestion = ingest(
            &[ArchiveSource::unnamed(b"not a zip".to_vec())],
            &IngestConfig::default(),
            &NoProgress,
        );
        assert_eq!(ingestion.failed_sources().count(), 1);
        assert!(matches!(ingestion.into_dataset(), Err(SurveyError::NoData)));
    }
}
