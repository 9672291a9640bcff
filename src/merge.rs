//! Merging survey archives into unified record sequences.
//!
//! Each source is read inside its own error boundary: a missing
//! `metadata.json` or a corrupt package is reported for that source and
//! the remaining sources are still ingested. Records are appended in input
//! order, then archive order.

use std::collections::BTreeSet;
use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek};

use crate::archive::ArchiveReader;
use crate::config::IngestConfig;
use crate::error::{Result, SurveyError};
use crate::images;
use crate::models::{RawDetection, RawRoughness};
use crate::pipeline::Session;
use crate::progress::{IngestProgressEvent, IngestProgressReporter};
use crate::sources::ArchiveSource;

/// Raw records of every ingested archive, tagged with their survey.
#[derive(Debug, Clone, Default)]
pub struct MergedRecords {
    pub detections: Vec<RawDetection>,
    pub roughness: Vec<RawRoughness>,
}

/// What one archive contributed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SourceCounts {
    pub detections: usize,
    pub roughness: usize,
    pub images: usize,
}

/// Outcome of ingesting one source.
#[derive(Debug)]
pub struct SourceReport {
    /// Position in the input list.
    pub position: usize,
    pub survey: String,
    pub outcome: Result<SourceCounts>,
}

/// Ingest every source into `session`, in order. Never fails as a whole;
/// per-source failures are in the returned reports.
///
/// Every source gets its own survey id. A name already taken by an earlier
/// source is suffixed `_2`, `_3`, ... so archives never share images.
pub fn merge_sources(
    sources: &[ArchiveSource],
    session: &mut Session,
    config: &IngestConfig,
    progress: &dyn IngestProgressReporter,
) -> Vec<SourceReport> {
    let total = sources.len() as u64;
    let mut reports = Vec::with_capacity(sources.len());
    let mut taken = BTreeSet::new();

    for (position, source) in sources.iter().enumerate() {
        let survey = unique_id(source.survey_id(position), &mut taken);
        progress.report(IngestProgressEvent::Reading {
            survey: survey.clone(),
            n: position as u64 + 1,
            total,
        });

        let outcome = merge_source(source, &survey, session, config);
        match &outcome {
            Ok(counts) => tracing::info!(
                survey = %survey,
                detections = counts.detections,
                roughness = counts.roughness,
                images = counts.images,
                "ingested archive"
            ),
            Err(e) => tracing::warn!(survey = %survey, error = %e, "failed to read archive"),
        }
        reports.push(SourceReport {
            position,
            survey,
            outcome,
        });
    }

    let failed = reports.iter().filter(|r| r.outcome.is_err()).count() as u64;
    progress.report(IngestProgressEvent::Finished {
        ingested: total - failed,
        failed,
    });
    reports
}

fn unique_id(base: String, taken: &mut BTreeSet<String>) -> String {
    let mut id = base.clone();
    let mut n = 2;
    while taken.contains(&id) {
        id = format!("{}_{}", base, n);
        n += 1;
    }
    taken.insert(id.clone());
    id
}

fn merge_source(
    source: &ArchiveSource,
    survey: &str,
    session: &mut Session,
    config: &IngestConfig,
) -> Result<SourceCounts> {
    match source {
        ArchiveSource::Upload { bytes, .. } => {
            merge_archive(survey, Cursor::new(bytes.as_slice()), session, config)
        }
        ArchiveSource::Path(path) => {
            let file = File::open(path)
                .map_err(|e| SurveyError::corrupt(survey, format!("{}: {}", path.display(), e)))?;
            merge_archive(survey, BufReader::new(file), session, config)
        }
    }
}

fn merge_archive<R: Read + Seek>(
    survey: &str,
    reader: R,
    session: &mut Session,
    config: &IngestConfig,
) -> Result<SourceCounts> {
    let mut archive = ArchiveReader::open(survey, reader, config)?;
    let mut contents = archive.read(config)?;
    let images = images::index_archive(&mut session.images, &mut archive, &contents.image_names)?;

    for detection in &mut contents.detections {
        detection.survey = survey.to_string();
    }
    for roughness in &mut contents.roughness {
        roughness.survey = survey.to_string();
    }

    let counts = SourceCounts {
        detections: contents.detections.len(),
        roughness: contents.roughness.len(),
        images,
    };
    session.merged.detections.append(&mut contents.detections);
    session.merged.roughness.append(&mut contents.roughness);
    Ok(counts)
}
