//! Survey and category visibility filtering.

use std::collections::BTreeSet;

use crate::models::Dataset;

/// Which surveys and which record categories are visible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub surveys: BTreeSet<String>,
    pub show_detections: bool,
    pub show_roughness: bool,
}

impl Selection {
    /// Every survey in `dataset`, both categories shown.
    pub fn all(dataset: &Dataset) -> Self {
        Self {
            surveys: dataset.survey_ids(),
            show_detections: true,
            show_roughness: true,
        }
    }

    /// Restrict to the given surveys, or keep all of them when `surveys`
    /// is empty.
    pub fn with_surveys<I, S>(mut self, surveys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let chosen: BTreeSet<String> = surveys.into_iter().map(Into::into).collect();
        if !chosen.is_empty() {
            self.surveys = chosen;
        }
        self
    }
}

/// Records whose survey is selected; a hidden category comes back empty.
pub fn apply(dataset: &Dataset, selection: &Selection) -> Dataset {
    let detections = if selection.show_detections {
        dataset
            .detections
            .iter()
            .filter(|d| selection.surveys.contains(&d.survey))
            .cloned()
            .collect()
    } else {
        Vec::new()
    };

    let roughness = if selection.show_roughness {
        dataset
            .roughness
            .iter()
            .filter(|r| selection.surveys.contains(&r.survey))
            .cloned()
            .collect()
    } else {
        Vec::new()
    };

    Dataset {
        detections,
        roughness,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, DetectionRecord, RoughnessRecord};

    fn dataset() -> Dataset {
        let detection = |survey: &str, frame| DetectionRecord {
            survey: survey.to_string(),
            frame: Some(frame),
            latitude: 10.0,
            longitude: 20.0,
            category: Category::AlligatorCrack,
        };
        let roughness = |survey: &str| RoughnessRecord {
            survey: survey.to_string(),
            latitude: 10.0,
            longitude: 20.2,
            magnitude: Some(1.5),
        };
        Dataset {
            detections: vec![detection("A", 1), detection("B", 1), detection("A", 2)],
            roughness: vec![roughness("B"), roughness("C")],
        }
    }

    #[test]
    fn restricts_to_selected_surveys() {
        let data = dataset();
        let selection = Selection::all(&data).with_surveys(["A"]);
        let filtered = apply(&data, &selection);
        assert_eq!(filtered.detections.len(), 2);
        assert!(filtered.detections.iter().all(|d| d.survey == "A"));
        assert!(filtered.roughness.is_empty());
    }

    #[test]
    fn is_idempotent() {
        let data = dataset();
        let selection = Selection::all(&data).with_surveys(["B", "C"]);
        let once = apply(&data, &selection);
        assert_eq!(apply(&once, &selection), once);
    }

    #[test]
    fn hidden_category_is_empty_and_restorable() {
        let data = dataset();
        let shown = Selection::all(&data);
        let hidden = Selection {
            show_roughness: false,
            ..shown.clone()
        };
        assert!(apply(&data, &hidden).roughness.is_empty());
        assert_eq!(apply(&data, &hidden).detections.len(), 3);
        assert_eq!(apply(&data, &shown).roughness, data.roughness);
    }

    #[test]
    fn empty_survey_list_keeps_everything() {
        let data = dataset();
        let selection = Selection::all(&data).with_surveys(Vec::<String>::new());
        assert_eq!(apply(&data, &selection), data);
    }

    #[test]
    fn unknown_survey_selects_nothing() {
        let data = dataset();
        let selection = Selection::all(&data).with_surveys(["Z"]);
        assert!(apply(&data, &selection).is_empty());
    }
}
