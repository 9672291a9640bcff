//! End-to-end pipeline scenarios through the library API.
//!
//! Archives are built in memory with `zip::ZipWriter`; nothing touches the
//! filesystem.

use std::io::{Cursor, Write};

use roadscan::config::IngestConfig;
use roadscan::error::SurveyError;
use roadscan::filter::{self, Selection};
use roadscan::geo::{self, BoundingBox};
use roadscan::matcher::FrameMatcher;
use roadscan::pipeline::ingest;
use roadscan::progress::NoProgress;
use roadscan::sources::ArchiveSource;

fn archive(entries: &[(&str, &str)]) -> Vec<u8> {
    let mut buf = Vec::new();
    {
        let mut zip = zip::ZipWriter::new(Cursor::new(&mut buf));
        for (name, contents) in entries {
            zip.start_file(*name, zip::write::SimpleFileOptions::default())
                .unwrap();
            zip.write_all(contents.as_bytes()).unwrap();
        }
        zip.finish().unwrap();
    }
    buf
}

fn two_surveys() -> Vec<ArchiveSource> {
    vec![
        ArchiveSource::upload(
            "A.zip",
            archive(&[
                (
                    "metadata.json",
                    r#"{"detections":[{"frame":7,"latitude":10.0,"longitude":20.0,"class":0}]}"#,
                ),
                ("img_007.jpg", "survey-a-frame-7"),
            ]),
        ),
        ArchiveSource::upload(
            "B.zip",
            archive(&[
                (
                    "metadata.json",
                    r#"{"roughness":[{"latitude":10.0,"longitude":20.2,"magnitude_xy":1.5}]}"#,
                ),
                ("img_007.jpg", "survey-b-frame-7"),
            ]),
        ),
    ]
}

#[test]
fn two_archives_merge_and_center_between_them() {
    let ingestion = ingest(&two_surveys(), &IngestConfig::default(), &NoProgress);
    let (dataset, _) = ingestion.into_dataset().unwrap();

    assert_eq!(dataset.detections.len(), 1);
    assert_eq!(dataset.roughness.len(), 1);
    assert_eq!(dataset.detections[0].survey, "A");
    assert_eq!(dataset.roughness[0].survey, "B");

    let visible = filter::apply(&dataset, &Selection::all(&dataset));
    let center = geo::centroid(&visible).unwrap();
    assert!((center.latitude - 10.0).abs() < 1e-9);
    assert!((center.longitude - 20.1).abs() < 1e-9);
    assert!(BoundingBox::of(&visible).unwrap().contains(center, 1e-9));
}

#[test]
fn missing_metadata_only_fails_that_source() {
    let mut sources = two_surveys();
    sources.insert(
        1,
        ArchiveSource::upload("no_meta.zip", archive(&[("img_001.jpg", "x")])),
    );
    let ingestion = ingest(&sources, &IngestConfig::default(), &NoProgress);

    let failed: Vec<_> = ingestion.failed_sources().collect();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].0, "no_meta");
    assert!(matches!(failed[0].1, SurveyError::MissingMetadata { .. }));

    let dataset = ingestion.dataset.as_ref().unwrap();
    assert_eq!(dataset.detections.len() + dataset.roughness.len(), 2);
    assert_eq!(ingestion.images.count_for("no_meta"), 0);
}

#[test]
fn matcher_stays_inside_the_detection_survey() {
    let config = IngestConfig::default();
    let ingestion = ingest(&two_surveys(), &config, &NoProgress);
    let (dataset, images) = ingestion.into_dataset().unwrap();
    let matcher = FrameMatcher::new(&images, &config);

    let (_, bytes) = matcher.for_detection(&dataset.detections[0]).unwrap();
    assert_eq!(bytes, b"survey-a-frame-7");
}

#[test]
fn frame_twelve_does_not_pick_up_frame_one_hundred_twelve() {
    let config = IngestConfig::default();
    let sources = vec![ArchiveSource::upload(
        "S1.zip",
        archive(&[
            (
                "metadata.json",
                r#"{"detections":[{"frame":12,"latitude":1.0,"longitude":1.0,"class":1}]}"#,
            ),
            ("img_112.jpg", "frame-112"),
        ]),
    )];
    let (dataset, images) = ingest(&sources, &config, &NoProgress)
        .into_dataset()
        .unwrap();
    let matcher = FrameMatcher::new(&images, &config);
    assert!(matcher.for_detection(&dataset.detections[0]).is_none());
}

#[test]
fn reprocessing_yields_identical_results() {
    let sources = vec![
        ArchiveSource::unnamed(archive(&[(
            "metadata.json",
            r#"{"detections":[{"frame":1,"latitude":1.0,"longitude":1.0,"class":2}]}"#,
        )])),
        ArchiveSource::unnamed(archive(&[(
            "metadata.json",
            r#"{"detections":[{"frame":1,"latitude":2.0,"longitude":2.0,"class":3}]}"#,
        )])),
    ];
    let first = ingest(&sources, &IngestConfig::default(), &NoProgress);
    let second = ingest(&sources, &IngestConfig::default(), &NoProgress);

    let ids = |i: &roadscan::pipeline::Ingestion| -> Vec<String> {
        i.sources.iter().map(|r| r.survey.clone()).collect()
    };
    assert_eq!(ids(&first), vec!["Survey_1", "Survey_2"]);
    assert_eq!(ids(&first), ids(&second));
    assert_eq!(
        first.dataset.as_ref().unwrap(),
        second.dataset.as_ref().unwrap()
    );
}

#[test]
fn hiding_and_restoring_roughness() {
    let (dataset, _) = ingest(&two_surveys(), &IngestConfig::default(), &NoProgress)
        .into_dataset()
        .unwrap();
    let shown = Selection::all(&dataset);
    let hidden = Selection {
        show_roughness: false,
        ..shown.clone()
    };

    assert!(filter::apply(&dataset, &hidden).roughness.is_empty());
    assert_eq!(
        filter::apply(&dataset, &shown).roughness,
        dataset.roughness
    );

    let only_b = Selection::all(&dataset).with_surveys(["B"]);
    let only_b_hidden = Selection {
        show_roughness: false,
        ..only_b
    };
    let visible = filter::apply(&dataset, &only_b_hidden);
    assert!(visible.is_empty());
    assert!(matches!(
        geo::centroid(&visible),
        Err(SurveyError::NoCoordinates)
    ));
}

#[test]
fn same_named_archives_keep_their_own_frames() {
    let config = IngestConfig::default();
    let sources = vec![
        ArchiveSource::upload(
            "route.zip",
            archive(&[
                (
                    "metadata.json",
                    r#"{"detections":[{"frame":7,"latitude":1.0,"longitude":1.0,"class":0}]}"#,
                ),
                ("img_007.jpg", "archive-one"),
            ]),
        ),
        ArchiveSource::upload(
            "route.zip",
            archive(&[
                (
                    "metadata.json",
                    r#"{"detections":[{"frame":7,"latitude":2.0,"longitude":2.0,"class":1}]}"#,
                ),
                ("img_007.jpg", "archive-two"),
            ]),
        ),
    ];
    let (dataset, images) = ingest(&sources, &config, &NoProgress)
        .into_dataset()
        .unwrap();
    let matcher = FrameMatcher::new(&images, &config);

    assert_eq!(dataset.survey_ids().len(), 2);
    let frames: Vec<_> = dataset
        .detections
        .iter()
        .map(|d| matcher.for_detection(d).unwrap().1)
        .collect();
    assert_eq!(frames, vec![&b"archive-one"[..], &b"archive-two"[..]]);
}
