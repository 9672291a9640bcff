//! Conversion of merged raw records into the typed, labeled model.
//!
//! Records that cannot be placed on a map are dropped and reported as
//! [`RecordIssue`]s; nothing is silently discarded.

use std::fmt;

use serde_json::Value;

use crate::config::{IngestConfig, UnknownClassPolicy};
use crate::error::{Result, SurveyError};
use crate::merge::MergedRecords;
use crate::models::{Category, Dataset, DetectionRecord, RawDetection, RawRoughness, RoughnessRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Detection,
    Roughness,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IssueKind {
    /// Latitude or longitude absent or not a number.
    MissingCoordinates,
    /// A required field is absent or has the wrong type.
    MissingField(&'static str),
    /// Class code outside the known enumeration (rejected).
    UnknownCategory(i64),
}

/// A record excluded during normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordIssue {
    pub survey: String,
    pub record: RecordKind,
    /// Position in the unified detection or roughness sequence.
    pub index: usize,
    pub kind: IssueKind,
}

impl fmt::Display for RecordIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let record = match self.record {
            RecordKind::Detection => "detection",
            RecordKind::Roughness => "roughness",
        };
        write!(f, "{}: {} #{}: ", self.survey, record, self.index)?;
        match &self.kind {
            IssueKind::MissingCoordinates => f.write_str("missing or non-numeric coordinates"),
            IssueKind::MissingField(field) => write!(f, "missing or invalid {}", field),
            IssueKind::UnknownCategory(code) => {
                write!(f, "{}", SurveyError::UnknownCategoryCode { code: *code })
            }
        }
    }
}

/// Validate and label merged records.
///
/// Dropped records are pushed onto `issues`. Fails with `NoData` when no
/// detection and no roughness record survives.
pub fn normalize(
    merged: &MergedRecords,
    config: &IngestConfig,
    issues: &mut Vec<RecordIssue>,
) -> Result<Dataset> {
    let mut dataset = Dataset::default();
    let first_issue = issues.len();

    for (index, raw) in merged.detections.iter().enumerate() {
        match detection(raw, config) {
            Ok(record) => dataset.detections.push(record),
            Err(kind) => issues.push(RecordIssue {
                survey: raw.survey.clone(),
                record: RecordKind::Detection,
                index,
                kind,
            }),
        }
    }

    for (index, raw) in merged.roughness.iter().enumerate() {
        match roughness(raw, config) {
            Ok(record) => dataset.roughness.push(record),
            Err(kind) => issues.push(RecordIssue {
                survey: raw.survey.clone(),
                record: RecordKind::Roughness,
                index,
                kind,
            }),
        }
    }

    for issue in &issues[first_issue..] {
        tracing::warn!("dropped {}", issue);
    }

    if dataset.is_empty() {
        return Err(SurveyError::NoData);
    }
    Ok(dataset)
}

fn detection(raw: &RawDetection, config: &IngestConfig) -> std::result::Result<DetectionRecord, IssueKind> {
    let (latitude, longitude) =
        coordinates(&raw.latitude, &raw.longitude).ok_or(IssueKind::MissingCoordinates)?;

    let code = whole_number(&raw.class).ok_or(IssueKind::MissingField("class"))?;
    let category = match Category::from_code(code) {
        Ok(category) => category,
        Err(_) if config.unknown_class == UnknownClassPolicy::Label => Category::Unknown(code),
        Err(_) => return Err(IssueKind::UnknownCategory(code)),
    };

    let frame = frame_number(&raw.frame);
    if frame.is_none() && config.require_complete {
        return Err(IssueKind::MissingField("frame"));
    }

    Ok(DetectionRecord {
        survey: raw.survey.clone(),
        frame,
        latitude,
        longitude,
        category,
    })
}

fn roughness(raw: &RawRoughness, config: &IngestConfig) -> std::result::Result<RoughnessRecord, IssueKind> {
    let (latitude, longitude) =
        coordinates(&raw.latitude, &raw.longitude).ok_or(IssueKind::MissingCoordinates)?;

    let magnitude = number(&raw.magnitude_xy);
    if magnitude.is_none() && config.require_complete {
        return Err(IssueKind::MissingField("magnitude_xy"));
    }

    Ok(RoughnessRecord {
        survey: raw.survey.clone(),
        latitude,
        longitude,
        magnitude,
    })
}

fn coordinates(latitude: &Option<Value>, longitude: &Option<Value>) -> Option<(f64, f64)> {
    Some((number(latitude)?, number(longitude)?))
}

fn number(value: &Option<Value>) -> Option<f64> {
    value.as_ref()?.as_f64().filter(|n| n.is_finite())
}

/// Non-negative integers over the full `u64` range, or integral floats.
fn frame_number(value: &Option<Value>) -> Option<u64> {
    if let Some(n) = value.as_ref()?.as_u64() {
        return Some(n);
    }
    whole_number(value).and_then(|n| u64::try_from(n).ok())
}

/// Integers, or floats with no fractional part (`7.0`).
fn whole_number(value: &Option<Value>) -> Option<i64> {
    let value = value.as_ref()?;
    if let Some(n) = value.as_i64() {
        return Some(n);
    }
    let n = value.as_f64()?;
    (n.fract() == 0.0 && n >= i64::MIN as f64 && n < i64::MAX as f64).then_some(n as i64)
}
