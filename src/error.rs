//! Error kinds raised by the ingestion and query pipeline.
//!
//! Per-source kinds ([`SurveyError::MissingMetadata`],
//! [`SurveyError::ArchiveCorrupt`]) are caught at the merge boundary and
//! reported per archive. [`SurveyError::NoData`] and
//! [`SurveyError::NoCoordinates`] are empty states for the caller to display.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, SurveyError>;

#[derive(Error, Debug)]
pub enum SurveyError {
    /// The archive has no `metadata.json` at its root.
    #[error("{survey}: archive has no metadata.json")]
    MissingMetadata { survey: String },

    /// The container or the metadata document could not be read.
    #[error("{survey}: archive is corrupt: {reason}")]
    ArchiveCorrupt { survey: String, reason: String },

    /// A detection class code outside the known enumeration.
    #[error("unknown detection class code {code}")]
    UnknownCategoryCode { code: i64 },

    #[error("no valid detection or roughness data found in any archive")]
    NoData,

    #[error("no valid coordinates found after filtering")]
    NoCoordinates,
}

impl SurveyError {
    pub(crate) fn corrupt(survey: &str, reason: impl std::fmt::Display) -> Self {
        SurveyError::ArchiveCorrupt {
            survey: survey.to_string(),
            reason: reason.to_string(),
        }
    }

    /// True for the kinds that only affect a single archive.
    pub fn is_per_source(&self) -> bool {
        matches!(
            self,
            SurveyError::MissingMetadata { .. } | SurveyError::ArchiveCorrupt { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn per_source_kinds() {
        assert!(SurveyError::MissingMetadata { survey: "S1".into() }.is_per_source());
        assert!(SurveyError::corrupt("S1", "bad header").is_per_source());
        assert!(!SurveyError::NoData.is_per_source());
        assert!(!SurveyError::UnknownCategoryCode { code: 7 }.is_per_source());
    }

    #[test]
    fn messages_name_the_survey() {
        let err = SurveyError::corrupt("north", "invalid Zip archive");
        assert_eq!(err.to_string(), "north: archive is corrupt: invalid Zip archive");
    }
}
