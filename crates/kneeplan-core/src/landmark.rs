use crate::error::{PlanningError, Result};
use nalgebra::Point3;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Anatomical landmarks picked on the femur surface.
///
/// Declaration order is the order in which a full pipeline run checks for
/// missing landmarks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LandmarkKey {
    FemurCenter,
    HipCenter,
    FemurProximalCanal,
    FemurDistalCanal,
    MedialEpicondyle,
    LateralEpicondyle,
    DistalMedialPoint,
    DistalLateralPoint,
    PosteriorMedialPoint,
    PosteriorLateralPoint,
}

impl LandmarkKey {
    pub const ALL: [LandmarkKey; 10] = [
        LandmarkKey::FemurCenter,
        LandmarkKey::HipCenter,
        LandmarkKey::FemurProximalCanal,
        LandmarkKey::FemurDistalCanal,
        LandmarkKey::MedialEpicondyle,
        LandmarkKey::LateralEpicondyle,
        LandmarkKey::DistalMedialPoint,
        LandmarkKey::DistalLateralPoint,
        LandmarkKey::PosteriorMedialPoint,
        LandmarkKey::PosteriorLateralPoint,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            LandmarkKey::FemurCenter => "femur-center",
            LandmarkKey::HipCenter => "hip-center",
            LandmarkKey::FemurProximalCanal => "femur-proximal-canal",
            LandmarkKey::FemurDistalCanal => "femur-distal-canal",
            LandmarkKey::MedialEpicondyle => "medial-epicondyle",
            LandmarkKey::LateralEpicondyle => "lateral-epicondyle",
            LandmarkKey::DistalMedialPoint => "distal-medial-point",
            LandmarkKey::DistalLateralPoint => "distal-lateral-point",
            LandmarkKey::PosteriorMedialPoint => "posterior-medial-point",
            LandmarkKey::PosteriorLateralPoint => "posterior-lateral-point",
        }
    }
}

impl fmt::Display for LandmarkKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LandmarkKey {
    type Err = PlanningError;

    fn from_str(s: &str) -> Result<Self> {
        let needle = s.trim();
        LandmarkKey::ALL
            .into_iter()
            .find(|key| key.as_str().eq_ignore_ascii_case(needle))
            .ok_or_else(|| PlanningError::UnknownLandmark(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub key: LandmarkKey,
    pub position: Point3<f64>,
}

/// Registry of the most recent position picked for each landmark.
///
/// No anatomical plausibility checks happen here; whatever the picking layer
/// reports is stored as-is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LandmarkStore {
    points: BTreeMap<LandmarkKey, Point3<f64>>,
}

impl LandmarkStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces the position for `key`, returning the previous one.
    pub fn set(&mut self, key: LandmarkKey, position: Point3<f64>) -> Option<Point3<f64>> {
        self.points.insert(key, position)
    }

    pub fn get(&self, key: LandmarkKey) -> Result<Point3<f64>> {
        self.points
            .get(&key)
            .copied()
            .ok_or(PlanningError::NotFound(key))
    }

    pub fn contains(&self, key: LandmarkKey) -> bool {
        self.points.contains_key(&key)
    }

    pub fn clear(&mut self, key: LandmarkKey) -> Option<Point3<f64>> {
        self.points.remove(&key)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// First key of `required` (in the given order) that has no position.
    pub fn first_missing(&self, required: &[LandmarkKey]) -> Option<LandmarkKey> {
        required.iter().copied().find(|key| !self.contains(*key))
    }

    pub fn iter(&self) -> impl Iterator<Item = Landmark> + '_ {
        self.points.iter().map(|(key, position)| Landmark {
            key: *key,
            position: *position,
        })
    }
}

impl FromIterator<Landmark> for LandmarkStore {
    fn from_iter<I: IntoIterator<Item = Landmark>>(iter: I) -> Self {
        let mut store = Self::new();
        for landmark in iter {
            store.set(landmark.key, landmark.position);
        }
        store
    }
}
