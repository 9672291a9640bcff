//! Associates detections with their frame image.
//!
//! Archives name frames with an unknown prefix and a possibly zero-padded
//! numeric suffix (`img_007.jpg`, `frame-7.JPG`, `0000007.jpg`). The frame
//! key of a file is the run of digits at the end of its stem; a file
//! matches frame `n` when that run reads as the integer `n`. Comparing
//! numerically rather than by string suffix keeps `img_112.jpg` from
//! matching frame 12.

use crate::config::IngestConfig;
use crate::images::ImageCache;
use crate::models::DetectionRecord;

/// Frame number encoded at the end of an image filename, if any.
///
/// `filename` may be a full entry path; only the basename is inspected.
pub fn frame_key(filename: &str, config: &IngestConfig) -> Option<u64> {
    let basename = filename.rsplit('/').next().unwrap_or(filename);
    let stem = config.strip_image_extension(basename)?;
    let digits_start = stem
        .char_indices()
        .rev()
        .take_while(|(_, c)| c.is_ascii_digit())
        .last()
        .map(|(i, _)| i)?;
    stem[digits_start..].parse().ok()
}

/// Looks up cached frame images for detections.
#[derive(Clone, Copy)]
pub struct FrameMatcher<'a> {
    cache: &'a ImageCache,
    config: &'a IngestConfig,
}

impl<'a> FrameMatcher<'a> {
    pub fn new(cache: &'a ImageCache, config: &'a IngestConfig) -> Self {
        Self { cache, config }
    }

    /// First image of `survey` (in filename order) whose frame key equals
    /// `frame`. Never looks outside `survey`.
    pub fn find(&self, survey: &str, frame: u64) -> Option<(&'a str, &'a [u8])> {
        let config = self.config;
        self.cache
            .survey_images(survey)
            .find(|(name, _)| frame_key(name, config) == Some(frame))
    }

    /// The image for a detection, or `None` when the detection has no
    /// frame or nothing matches.
    pub fn for_detection(&self, detection: &DetectionRecord) -> Option<(&'a str, &'a [u8])> {
        let frame = detection.frame?;
        self.find(&detection.survey, frame)
    }
}
