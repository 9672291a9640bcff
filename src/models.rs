//! Core data models used throughout roadscan.
//!
//! Raw records mirror the loosely-typed entries of an archive's
//! `metadata.json`; typed records are what survives normalization.

use std::borrow::Cow;
use std::collections::BTreeSet;
use std::fmt;

use serde::Deserialize;
use serde_json::Value;

use crate::error::SurveyError;

/// The parsed `metadata.json` document of one archive.
///
/// Both lists are optional; an absent or `null` list reads as empty.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MetadataDocument {
    #[serde(default)]
    detections: Option<Vec<RawDetection>>,
    #[serde(default)]
    roughness: Option<Vec<RawRoughness>>,
}

impl MetadataDocument {
    pub fn into_parts(self) -> (Vec<RawDetection>, Vec<RawRoughness>) {
        (
            self.detections.unwrap_or_default(),
            self.roughness.unwrap_or_default(),
        )
    }
}

/// A detection entry as it appears in the archive, before validation.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawDetection {
    #[serde(default)]
    pub frame: Option<Value>,
    #[serde(default)]
    pub latitude: Option<Value>,
    #[serde(default)]
    pub longitude: Option<Value>,
    #[serde(default)]
    pub class: Option<Value>,
    /// Owning survey, assigned at merge time.
    #[serde(skip)]
    pub survey: String,
}

/// A roughness entry as it appears in the archive, before validation.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawRoughness {
    #[serde(default)]
    pub latitude: Option<Value>,
    #[serde(default)]
    pub longitude: Option<Value>,
    #[serde(default)]
    pub magnitude_xy: Option<Value>,
    #[serde(skip)]
    pub survey: String,
}

/// Road-defect category of a detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    LongitudinalCrack,
    TransverseCrack,
    AlligatorCrack,
    Pothole,
    /// A code outside the known enumeration, kept only under the
    /// `label` policy.
    Unknown(i64),
}

impl Category {
    /// Resolve a class code. Codes outside `0..=3` are an error.
    pub fn from_code(code: i64) -> Result<Self, SurveyError> {
        match code {
            0 => Ok(Category::LongitudinalCrack),
            1 => Ok(Category::TransverseCrack),
            2 => Ok(Category::AlligatorCrack),
            3 => Ok(Category::Pothole),
            other => Err(SurveyError::UnknownCategoryCode { code: other }),
        }
    }

    pub fn code(&self) -> i64 {
        match self {
            Category::LongitudinalCrack => 0,
            Category::TransverseCrack => 1,
            Category::AlligatorCrack => 2,
            Category::Pothole => 3,
            Category::Unknown(code) => *code,
        }
    }

    pub fn label(&self) -> Cow<'static, str> {
        match self {
            Category::LongitudinalCrack => Cow::Borrowed("Longitudinal Crack (D00)"),
            Category::TransverseCrack => Cow::Borrowed("Transverse Crack (D10)"),
            Category::AlligatorCrack => Cow::Borrowed("Alligator Crack (D20)"),
            Category::Pothole => Cow::Borrowed("Pothole (D40)"),
            Category::Unknown(code) => Cow::Owned(format!("Unknown (class {})", code)),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

/// A geolocated, labeled detection.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectionRecord {
    pub survey: String,
    /// `None` only when partial data is tolerated and the frame was absent.
    pub frame: Option<u64>,
    pub latitude: f64,
    pub longitude: f64,
    pub category: Category,
}

/// A geolocated ride-roughness sample.
#[derive(Debug, Clone, PartialEq)]
pub struct RoughnessRecord {
    pub survey: String,
    pub latitude: f64,
    pub longitude: f64,
    pub magnitude: Option<f64>,
}

/// The unified, survey-tagged record collections.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    pub detections: Vec<DetectionRecord>,
    pub roughness: Vec<RoughnessRecord>,
}

impl Dataset {
    pub fn is_empty(&self) -> bool {
        self.detections.is_empty() && self.roughness.is_empty()
    }

    /// Sorted identifiers of every survey that owns at least one record.
    pub fn survey_ids(&self) -> BTreeSet<String> {
        self.detections
            .iter()
            .map(|d| d.survey.clone())
            .chain(self.roughness.iter().map(|r| r.survey.clone()))
            .collect()
    }

    /// All `(latitude, longitude)` pairs, detections first.
    pub fn coordinates(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.detections
            .iter()
            .map(|d| (d.latitude, d.longitude))
            .chain(self.roughness.iter().map(|r| (r.latitude, r.longitude)))
    }
}
