//! Map-center aggregation over the visible records.
//!
//! The centroid is the plain arithmetic mean of all visible latitudes and
//! longitudes, detections and roughness combined. It is only used as the
//! initial map center.

use serde::Serialize;

use crate::error::{Result, SurveyError};
use crate::models::Dataset;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Centroid {
    pub latitude: f64,
    pub longitude: f64,
}

/// Mean of every coordinate in `dataset`. Fails with `NoCoordinates` when
/// there is nothing to average.
pub fn centroid(dataset: &Dataset) -> Result<Centroid> {
    let (mut lat_sum, mut lon_sum, mut count) = (0.0_f64, 0.0_f64, 0usize);
    for (latitude, longitude) in dataset.coordinates() {
        lat_sum += latitude;
        lon_sum += longitude;
        count += 1;
    }
    if count == 0 {
        return Err(SurveyError::NoCoordinates);
    }
    Ok(Centroid {
        latitude: lat_sum / count as f64,
        longitude: lon_sum / count as f64,
    })
}

/// Axis-aligned extent of a set of coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoundingBox {
    pub min_latitude: f64,
    pub min_longitude: f64,
    pub max_latitude: f64,
    pub max_longitude: f64,
}

impl BoundingBox {
    pub fn of(dataset: &Dataset) -> Option<Self> {
        dataset.coordinates().fold(None, |acc, (lat, lon)| {
            Some(match acc {
                None => BoundingBox {
                    min_latitude: lat,
                    min_longitude: lon,
                    max_latitude: lat,
                    max_longitude: lon,
                },
                Some(b) => BoundingBox {
                    min_latitude: b.min_latitude.min(lat),
                    min_longitude: b.min_longitude.min(lon),
                    max_latitude: b.max_latitude.max(lat),
                    max_longitude: b.max_longitude.max(lon),
                },
            })
        })
    }

    /// Containment with `tolerance` slack on every side.
    pub fn contains(&self, point: Centroid, tolerance: f64) -> bool {
        point.latitude >= self.min_latitude - tolerance
            && point.latitude <= self.max_latitude + tolerance
            && point.longitude >= self.min_longitude - tolerance
            && point.longitude <= self.max_longitude + tolerance
    }
}
