//! Hand-off to the map and table presentation layer.
//!
//! Records become point [`Marker`]s with a label, an icon category and
//! popup HTML; detection popups inline their frame image as a base64 data
//! URI when one is found. Markers and the initial [`MapView`] are
//! serialized as a GeoJSON `FeatureCollection`.

use base64::Engine;
use serde::Serialize;
use serde_json::{json, Value};

use crate::config::RenderConfig;
use crate::geo::Centroid;
use crate::matcher::FrameMatcher;
use crate::models::{DetectionRecord, RoughnessRecord};

/// Image lookup keyed by `(survey, frame)`.
pub trait FrameImages {
    /// Filename and bytes of the frame's image, if one is cached.
    fn frame_image(&self, survey: &str, frame: u64) -> Option<(&str, &[u8])>;
}

impl FrameImages for FrameMatcher<'_> {
    fn frame_image(&self, survey: &str, frame: u64) -> Option<(&str, &[u8])> {
        self.find(survey, frame)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerIcon {
    Detection,
    Roughness,
}

impl MarkerIcon {
    pub fn color(&self) -> &'static str {
        match self {
            MarkerIcon::Detection => "red",
            MarkerIcon::Roughness => "orange",
        }
    }

    /// Font Awesome glyph name.
    pub fn glyph(&self) -> &'static str {
        match self {
            MarkerIcon::Detection => "exclamation-triangle",
            MarkerIcon::Roughness => "car",
        }
    }

    /// Name of the toggleable map layer.
    pub fn layer(&self) -> &'static str {
        match self {
            MarkerIcon::Detection => "Detections",
            MarkerIcon::Roughness => "Roughness",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub latitude: f64,
    pub longitude: f64,
    pub label: String,
    pub survey: String,
    pub icon: MarkerIcon,
    pub popup_html: String,
    pub frame: Option<u64>,
    /// Archive entry of the matched frame image.
    pub image: Option<String>,
    pub magnitude: Option<f64>,
}

/// Initial map state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MapView {
    pub center: Centroid,
    pub zoom_start: u8,
    pub min_zoom: u8,
    pub max_zoom: u8,
}

impl MapView {
    pub fn new(center: Centroid, config: &RenderConfig) -> Self {
        Self {
            center,
            zoom_start: config.zoom_start,
            min_zoom: config.min_zoom,
            max_zoom: config.max_zoom,
        }
    }
}

fn coordinates_html(latitude: f64, longitude: f64) -> String {
    format!("<b>Coordinates:</b> {:.5}, {:.5}<br>", latitude, longitude)
}

pub fn detection_markers(
    detections: &[DetectionRecord],
    images: &dyn FrameImages,
    config: &RenderConfig,
) -> Vec<Marker> {
    detections
        .iter()
        .map(|d| {
            let found = d
                .frame
                .and_then(|frame| images.frame_image(&d.survey, frame));
            let mut popup_html = coordinates_html(d.latitude, d.longitude);
            match found {
                Some((_, bytes)) => {
                    let b64 = base64::engine::general_purpose::STANDARD.encode(bytes);
                    popup_html.push_str(&format!(
                        "<img src=\"data:image/jpeg;base64,{}\" width=\"{}\">",
                        b64, config.popup_width
                    ));
                }
                None => popup_html.push_str("<i>(Image missing)</i>"),
            }
            Marker {
                latitude: d.latitude,
                longitude: d.longitude,
                label: d.category.label().into_owned(),
                survey: d.survey.clone(),
                icon: MarkerIcon::Detection,
                popup_html,
                frame: d.frame,
                image: found.map(|(name, _)| name.to_string()),
                magnitude: None,
            }
        })
        .collect()
}

pub fn roughness_markers(roughness: &[RoughnessRecord]) -> Vec<Marker> {
    roughness
        .iter()
        .map(|r| {
            let magnitude = match r.magnitude {
                Some(m) => format!("{:.2}", m),
                None => "n/a".to_string(),
            };
            Marker {
                latitude: r.latitude,
                longitude: r.longitude,
                label: "Roughness".to_string(),
                survey: r.survey.clone(),
                icon: MarkerIcon::Roughness,
                popup_html: format!(
                    "{}<b>Magnitude:</b> {}",
                    coordinates_html(r.latitude, r.longitude),
                    magnitude
                ),
                frame: None,
                image: None,
                magnitude: r.magnitude,
            }
        })
        .collect()
}

/// GeoJSON `FeatureCollection` of `markers`, with the map view in a
/// top-level `view` member. Coordinates are `[longitude, latitude]`.
pub fn to_geojson(view: &MapView, markers: &[Marker]) -> Value {
    let features: Vec<Value> = markers
        .iter()
        .map(|m| {
            json!({
                "type": "Feature",
                "geometry": {
                    "type": "Point",
                    "coordinates": [m.longitude, m.latitude]
                },
                "properties": {
                    "layer": m.icon.layer(),
                    "survey": m.survey,
                    "label": m.label,
                    "icon": m.icon.glyph(),
                    "color": m.icon.color(),
                    "popup": m.popup_html,
                    "frame": m.frame,
                    "image": m.image,
                    "magnitude": m.magnitude
                }
            })
        })
        .collect();

    json!({
        "type": "FeatureCollection",
        "view": view,
        "features": features
    })
}

pub fn detection_table(detections: &[DetectionRecord]) -> String {
    if detections.is_empty() {
        return "No detections data to display.\n".to_string();
    }
    let mut out = format!("{:>12} {:>12}   {}\n", "latitude", "longitude", "class");
    for d in detections {
        out.push_str(&format!(
            "{:>12.6} {:>12.6}   {}\n",
            d.latitude, d.longitude, d.category
        ));
    }
    out
}

pub fn roughness_table(roughness: &[RoughnessRecord]) -> String {
    if roughness.is_empty() {
        return "No roughness data to display.\n".to_string();
    }
    let mut out = format!("{:>12} {:>12} {:>12}\n", "latitude", "longitude", "magnitude_xy");
    for r in roughness {
        let magnitude = match r.magnitude {
            Some(m) => format!("{:.2}", m),
            None => "n/a".to_string(),
        };
        out.push_str(&format!(
            "{:>12.6} {:>12.6} {:>12}\n",
            r.latitude, r.longitude, magnitude
        ));
    }
    out
}
