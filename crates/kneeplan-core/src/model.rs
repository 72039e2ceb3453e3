use crate::error::Result;
use crate::geom::{
    self, direction_between, rotate_around_world_axis, MathPlane, Rotation,
};
use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Directed line through two landmarks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Axis {
    pub origin: Point3<f64>,
    /// Unit direction from the second source point towards `origin`.
    pub direction: Vector3<f64>,
    pub length: f64,
}

impl Axis {
    /// Axis with `origin = a` and `direction = normalize(a - b)`.
    pub fn through(a: Point3<f64>, b: Point3<f64>, what: &str) -> Result<Self> {
        Ok(Self {
            origin: a,
            direction: direction_between(&a, &b, what)?,
            length: (a - b).norm(),
        })
    }

    /// The second source point.
    pub fn far_point(&self) -> Point3<f64> {
        self.origin - self.direction * self.length
    }

    pub fn segment(&self) -> Segment {
        Segment::new(self.origin, self.far_point())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub start: Point3<f64>,
    pub end: Point3<f64>,
}

impl Segment {
    pub fn new(start: Point3<f64>, end: Point3<f64>) -> Self {
        Self { start, end }
    }

    pub fn length(&self) -> f64 {
        (self.end - self.start).norm()
    }

    pub fn midpoint(&self) -> Point3<f64> {
        geom::midpoint(&self.start, &self.end)
    }

    /// Unit direction from `start` to `end`.
    pub fn direction(&self, what: &str) -> Result<Vector3<f64>> {
        direction_between(&self.end, &self.start, what)
    }
}

/// Finite square cutting plane. At rest it lies in local XY with its normal
/// along local +Z; `orientation` carries every rotation applied since.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Plane {
    pub position: Point3<f64>,
    pub orientation: Rotation,
}

impl Plane {
    pub fn canonical(position: Point3<f64>) -> Self {
        Self {
            position,
            orientation: Rotation::identity(),
        }
    }

    pub fn normal(&self) -> Vector3<f64> {
        self.orientation * Vector3::z()
    }

    pub fn with_position(self, position: Point3<f64>) -> Self {
        Self { position, ..self }
    }

    pub fn with_orientation(self, orientation: Rotation) -> Self {
        Self {
            orientation,
            ..self
        }
    }

    pub fn rotated_on_world_axis(self, axis: &Vector3<f64>, angle: f64) -> Result<Self> {
        Ok(self.with_orientation(rotate_around_world_axis(&self.orientation, axis, angle)?))
    }

    /// Rotates the plane so that its normal points along `target`.
    pub fn aligned_to(self, target: &Vector3<f64>) -> Result<Self> {
        let delta = geom::align_rotation(&self.normal(), target)?;
        Ok(self.with_orientation(delta * self.orientation))
    }

    pub fn math_plane(&self) -> MathPlane {
        MathPlane {
            normal: self.normal(),
            point: self.position,
        }
    }

    pub fn project_point(&self, point: &Point3<f64>) -> Point3<f64> {
        self.math_plane().project_point(point)
    }

    /// World-space corners of the square with side `size`, counter-clockwise
    /// when seen from the normal side.
    pub fn corners(&self, size: f64) -> [Point3<f64>; 4] {
        let h = size * 0.5;
        [(-h, -h), (h, -h), (h, h), (-h, h)]
            .map(|(x, y)| self.position + self.orientation * Vector3::new(x, y, 0.0))
    }
}

pub fn project_point_onto_plane(plane: &Plane, point: &Point3<f64>) -> Point3<f64> {
    plane.project_point(point)
}

/// World-space clipping surface for the bone mesh.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClipSurface {
    pub point: Point3<f64>,
    /// Points away from the bone that is kept.
    pub normal: Vector3<f64>,
}

impl ClipSurface {
    pub fn from_resection_plane(plane: &Plane) -> Self {
        Self {
            point: plane.position,
            normal: -plane.normal(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Entity {
    Point { position: Point3<f64> },
    Axis(Axis),
    Segment(Segment),
    Plane(Plane),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EntityKey {
    MechanicalAxis,
    AnatomicalAxis,
    TransEpicondylarAxis,
    PosteriorCondylarAxis,
    MechanicalPerpendicularPlane,
    ProjectedMedialEpicondyle,
    ProjectedLateralEpicondyle,
    ProjectedTea,
    AnteriorPoint,
    AnteriorLine,
    LateralLinePoint,
    LateralProjectedPoint,
    LateralLine,
    VarusValgusPlane,
    FlexionExtensionPlane,
    DistalMedialPlane,
    DistalResectionPlane,
    MedialMeasurementLine,
    LateralMeasurementPoint,
    LateralMeasurementLine,
}

impl EntityKey {
    pub const ALL: [EntityKey; 20] = [
        EntityKey::MechanicalAxis,
        EntityKey::AnatomicalAxis,
        EntityKey::TransEpicondylarAxis,
        EntityKey::PosteriorCondylarAxis,
        EntityKey::MechanicalPerpendicularPlane,
        EntityKey::ProjectedMedialEpicondyle,
        EntityKey::ProjectedLateralEpicondyle,
        EntityKey::ProjectedTea,
        EntityKey::AnteriorPoint,
        EntityKey::AnteriorLine,
        EntityKey::LateralLinePoint,
        EntityKey::LateralProjectedPoint,
        EntityKey::LateralLine,
        EntityKey::VarusValgusPlane,
        EntityKey::FlexionExtensionPlane,
        EntityKey::DistalMedialPlane,
        EntityKey::DistalResectionPlane,
        EntityKey::MedialMeasurementLine,
        EntityKey::LateralMeasurementPoint,
        EntityKey::LateralMeasurementLine,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            EntityKey::MechanicalAxis => "mechanical-axis",
            EntityKey::AnatomicalAxis => "anatomical-axis",
            EntityKey::TransEpicondylarAxis => "trans-epicondylar-axis",
            EntityKey::PosteriorCondylarAxis => "posterior-condylar-axis",
            EntityKey::MechanicalPerpendicularPlane => "mechanical-perpendicular-plane",
            EntityKey::ProjectedMedialEpicondyle => "projected-medial-epicondyle",
            EntityKey::ProjectedLateralEpicondyle => "projected-lateral-epicondyle",
            EntityKey::ProjectedTea => "projected-tea",
            EntityKey::AnteriorPoint => "anterior-point",
            EntityKey::AnteriorLine => "anterior-line",
            EntityKey::LateralLinePoint => "lateral-line-point",
            EntityKey::LateralProjectedPoint => "lateral-projected-point",
            EntityKey::LateralLine => "lateral-line",
            EntityKey::VarusValgusPlane => "varus-valgus-plane",
            EntityKey::FlexionExtensionPlane => "flexion-extension-plane",
            EntityKey::DistalMedialPlane => "distal-medial-plane",
            EntityKey::DistalResectionPlane => "distal-resection-plane",
            EntityKey::MedialMeasurementLine => "medial-measurement-line",
            EntityKey::LateralMeasurementPoint => "lateral-measurement-point",
            EntityKey::LateralMeasurementLine => "lateral-measurement-line",
        }
    }
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
