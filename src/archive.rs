//! Read access to a single survey archive.
//!
//! An archive is a zip container with a `metadata.json` document at its
//! root and any number of frame images at any depth. Reading is pure: the
//! image payloads are pulled into the session cache by [`crate::images`].

use std::io::{Read, Seek};

use zip::result::ZipError;
use zip::ZipArchive;

use crate::config::IngestConfig;
use crate::error::{Result, SurveyError};
use crate::models::{MetadataDocument, RawDetection, RawRoughness};

/// Name of the metadata document at the archive root.
pub const METADATA_FILE: &str = "metadata.json";

/// Everything [`ArchiveReader::read`] pulls out of an archive.
#[derive(Debug, Clone, Default)]
pub struct ArchiveContents {
    pub detections: Vec<RawDetection>,
    pub roughness: Vec<RawRoughness>,
    /// Entry names carrying a recognized image extension, in archive order.
    pub image_names: Vec<String>,
}

/// An open survey archive.
pub struct ArchiveReader<R: Read + Seek> {
    survey: String,
    archive: ZipArchive<R>,
    max_entry_bytes: u64,
}

impl<R: Read + Seek> ArchiveReader<R> {
    /// Open the container. Fails with `ArchiveCorrupt` if it is not a
    /// readable zip.
    pub fn open(survey: &str, reader: R, config: &IngestConfig) -> Result<Self> {
        let archive = ZipArchive::new(reader).map_err(|e| SurveyError::corrupt(survey, e))?;
        Ok(Self {
            survey: survey.to_string(),
            archive,
            max_entry_bytes: config.max_entry_bytes,
        })
    }

    pub fn survey(&self) -> &str {
        &self.survey
    }

    /// Parse `metadata.json`.
    pub fn read_metadata(&mut self) -> Result<MetadataDocument> {
        if !self.has_entry(METADATA_FILE) {
            return Err(SurveyError::MissingMetadata {
                survey: self.survey.clone(),
            });
        }
        let bytes = self.read_entry(METADATA_FILE)?;
        serde_json::from_slice(&bytes)
            .map_err(|e| SurveyError::corrupt(&self.survey, format!("{}: {}", METADATA_FILE, e)))
    }

    /// Names of all entries with a recognized image extension.
    pub fn image_names(&self, config: &IngestConfig) -> Vec<String> {
        self.archive
            .file_names()
            .filter(|name| !name.ends_with('/') && config.is_image(name))
            .map(|name| name.to_string())
            .collect()
    }

    /// Read the metadata lists and enumerate the image entries.
    pub fn read(&mut self, config: &IngestConfig) -> Result<ArchiveContents> {
        let (detections, roughness) = self.read_metadata()?.into_parts();
        let image_names = self.image_names(config);
        tracing::debug!(
            survey = %self.survey,
            detections = detections.len(),
            roughness = roughness.len(),
            images = image_names.len(),
            "read archive metadata"
        );
        Ok(ArchiveContents {
            detections,
            roughness,
            image_names,
        })
    }

    /// Read one entry in full, bounded by `max_entry_bytes`.
    pub fn read_entry(&mut self, name: &str) -> Result<Vec<u8>> {
        let limit = self.max_entry_bytes;
        let entry = self.archive.by_name(name).map_err(|e| match e {
            ZipError::FileNotFound => SurveyError::corrupt(&self.survey, format!("{}: not found", name)),
            other => SurveyError::corrupt(&self.survey, format!("{}: {}", name, other)),
        })?;
        let mut out = Vec::new();
        entry
            .take(limit + 1)
            .read_to_end(&mut out)
            .map_err(|e| SurveyError::corrupt(&self.survey, format!("{}: {}", name, e)))?;
        if out.len() as u64 > limit {
            return Err(SurveyError::corrupt(
                &self.survey,
                format!("{} exceeds size limit ({} bytes)", name, limit),
            ));
        }
        Ok(out)
    }

    fn has_entry(&self, name: &str) -> bool {
        self.archive.index_for_name(name).is_some()
    }
}
