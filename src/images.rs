//! Session-lifetime cache of frame images.
//!
//! Keys are `(survey, filename)` where `filename` is the full entry path
//! inside the archive. The cache only grows; re-reading an archive
//! overwrites entries with the same bytes.

use std::collections::BTreeMap;
use std::io::{Read, Seek};
use std::ops::Bound;

use crate::archive::ArchiveReader;
use crate::error::Result;

/// Composite cache key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ImageKey {
    pub survey: String,
    pub filename: String,
}

impl ImageKey {
    pub fn new(survey: impl Into<String>, filename: impl Into<String>) -> Self {
        Self {
            survey: survey.into(),
            filename: filename.into(),
        }
    }
}

/// Frame images keyed by `(survey, filename)`, ordered by key.
#[derive(Debug, Clone, Default)]
pub struct ImageCache {
    entries: BTreeMap<ImageKey, Vec<u8>>,
}

impl ImageCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: ImageKey, bytes: Vec<u8>) {
        self.entries.insert(key, bytes);
    }

    pub fn get(&self, survey: &str, filename: &str) -> Option<&[u8]> {
        self.entries
            .get(&ImageKey::new(survey, filename))
            .map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Images of one survey, ordered by filename.
    pub fn survey_images<'a>(&'a self, survey: &str) -> impl Iterator<Item = (&'a str, &'a [u8])> + 'a {
        let survey = survey.to_string();
        let start = ImageKey::new(survey.clone(), String::new());
        self.entries
            .range((Bound::Included(start), Bound::Unbounded))
            .take_while(move |(key, _)| key.survey == survey)
            .map(|(key, bytes)| (key.filename.as_str(), bytes.as_slice()))
    }

    pub fn count_for(&self, survey: &str) -> usize {
        self.survey_images(survey).count()
    }
}

/// Read every image entry named in `image_names` and add it to the cache
/// under the reader's survey.
///
/// All payloads are read before any is inserted, so a failing archive
/// leaves the cache untouched. Returns the number of images indexed.
pub fn index_archive<R: Read + Seek>(
    cache: &mut ImageCache,
    reader: &mut ArchiveReader<R>,
    image_names: &[String],
) -> Result<usize> {
    let mut staged = Vec::with_capacity(image_names.len());
    for name in image_names {
        let bytes = reader.read_entry(name)?;
        staged.push((ImageKey::new(reader.survey(), name.as_str()), bytes));
    }
    let count = staged.len();
    for (key, bytes) in staged {
        cache.insert(key, bytes);
    }
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::tests::zip_bytes;
    use crate::config::IngestConfig;
    use std::io::Cursor;

    #[test]
    fn survey_images_stay_within_their_survey() {
        let mut cache = ImageCache::new();
        cache.insert(ImageKey::new("A", "b.jpg"), b"ab".to_vec());
        cache.insert(ImageKey::new("A", "a.jpg"), b"aa".to_vec());
        cache.insert(ImageKey::new("AB", "a.jpg"), b"x".to_vec());
        cache.insert(ImageKey::new("B", "a.jpg"), b"ba".to_vec());

        let names: Vec<_> = cache.survey_images("A").map(|(n, _)| n).collect();
        assert_eq!(names, vec!["a.jpg", "b.jpg"]);
        assert_eq!(cache.count_for("B"), 1);
        assert_eq!(cache.count_for("C"), 0);
    }

    #[test]
    fn indexing_twice_is_idempotent() {
        let bytes = zip_bytes(&[("metadata.json", "{}"), ("f/img_001.jpg", "one")]);
        let config = IngestConfig::default();
        let mut cache = ImageCache::new();
        for _ in 0..2 {
            let mut reader =
                ArchiveReader::open("S1", Cursor::new(bytes.as_slice()), &config).unwrap();
            let names = reader.image_names(&config);
            assert_eq!(index_archive(&mut cache, &mut reader, &names).unwrap(), 1);
        }
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("S1", "f/img_001.jpg"), Some(&b"one"[..]));
    }

    #[test]
    fn failed_read_leaves_cache_untouched() {
        let bytes = zip_bytes(&[("metadata.json", "{}"), ("a.jpg", "ok")]);
        let config = IngestConfig::default();
        let mut reader = ArchiveReader::open("S1", Cursor::new(bytes.as_slice()), &config).unwrap();
        let mut cache = ImageCache::new();
        let names = vec!["a.jpg".to_string(), "missing.jpg".to_string()];
        assert!(index_archive(&mut cache, &mut reader, &names).is_err());
        assert!(cache.is_empty());
    }
}
