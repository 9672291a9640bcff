//! # roadscan
//!
//! Merges archived road-survey packages (defect detections, ride-roughness
//! samples and frame images) into one geotagged dataset for inspection.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐   ┌──────────────────┐   ┌─────────────┐
//! │  Archives   │──▶│ Merge+Normalize  │──▶│   Dataset   │
//! │ (zip files) │   │ survey tagging   │   │ det + rough │
//! └──────┬──────┘   └──────────────────┘   └──────┬──────┘
//!        │                                        │ filter
//!        ▼                                        ▼
//!  ┌────────────┐   frame lookup          ┌──────────────┐
//!  │ ImageCache │◀────────────────────────│ Markers/View │──▶ GeoJSON, tables
//!  └────────────┘                         └──────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! roadscan surveys                          # scan ./assets for *.zip
//! roadscan export north.zip south.zip -o map.geojson
//! roadscan export --survey north --no-roughness
//! roadscan table detections assets/
//! roadscan image --survey north --frame 7 -o frame7.jpg
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`error`] | `SurveyError` kinds and the crate `Result` alias |
//! | [`models`] | Raw and typed record types |
//! | [`sources`] | Archive sources and asset scanning |
//! | [`archive`] | Reading one survey archive |
//! | [`images`] | Session image cache |
//! | [`merge`] | Merging archives with per-source error reports |
//! | [`normalize`] | Validation and labeling |
//! | [`matcher`] | Frame-to-image matching |
//! | [`filter`] | Survey and category selection |
//! | [`geo`] | Map-center aggregation |
//! | [`render`] | Markers, popups, GeoJSON and tables |
//! | [`pipeline`] | Session context and ingestion entry point |
//! | [`progress`] | Ingestion progress on stderr (human, JSON, off) |
//! | [`surveys`] | `roadscan surveys` summary table |
//! | [`export`] | `roadscan export`, `table` and `image` commands |

pub mod archive;
pub mod config;
pub mod error;
pub mod export;
pub mod filter;
pub mod geo;
pub mod images;
pub mod matcher;
pub mod merge;
pub mod models;
pub mod normalize;
pub mod pipeline;
pub mod progress;
pub mod render;
pub mod sources;
pub mod surveys;
