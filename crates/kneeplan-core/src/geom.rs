use crate::error::{PlanningError, Result};
use nalgebra::{Point3, Unit, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Accumulated orientation of a plane, composed in world space.
pub type Rotation = UnitQuaternion<f64>;

/// Vectors shorter than this are treated as zero length.
pub const LENGTH_EPSILON: f64 = 1e-9;

/// Angles below this (radians) are treated as already aligned.
pub const ANGLE_EPSILON: f64 = 1e-7;

pub fn normalized(v: &Vector3<f64>, what: &str) -> Result<Vector3<f64>> {
    let norm = v.norm();
    if !norm.is_finite() || norm < LENGTH_EPSILON {
        return Err(PlanningError::degenerate(format!("{what} has zero length")));
    }
    Ok(v / norm)
}

/// Unit direction pointing from `b` to `a`.
pub fn direction_between(a: &Point3<f64>, b: &Point3<f64>, what: &str) -> Result<Vector3<f64>> {
    normalized(&(a - b), what)
}

/// Angle in `[0, π]` between two non-zero vectors.
pub fn angle_between(v1: &Vector3<f64>, v2: &Vector3<f64>) -> Result<f64> {
    let n1 = v1.norm();
    let n2 = v2.norm();
    if n1 < LENGTH_EPSILON || n2 < LENGTH_EPSILON {
        return Err(PlanningError::degenerate("angle requested for a zero-length vector"));
    }
    let cos = (v1.dot(v2) / (n1 * n2)).clamp(-1.0, 1.0);
    Ok(cos.acos())
}

/// Normal of the plane through three points: `normalize((p1 - p2) x (p2 - p3))`.
pub fn plane_normal_from_three_points(
    p1: &Point3<f64>,
    p2: &Point3<f64>,
    p3: &Point3<f64>,
) -> Result<Vector3<f64>> {
    let cross = (p1 - p2).cross(&(p2 - p3));
    if cross.norm() < LENGTH_EPSILON {
        return Err(PlanningError::degenerate("plane points are collinear"));
    }
    Ok(cross.normalize())
}

/// Composes a right-handed rotation of `angle` radians about the world `axis`
/// onto `rotation`. The axis does not need to be normalized.
pub fn rotate_around_world_axis(rotation: &Rotation, axis: &Vector3<f64>, angle: f64) -> Result<Rotation> {
    let axis = Unit::try_new(*axis, LENGTH_EPSILON)
        .ok_or_else(|| PlanningError::degenerate("rotation axis has zero length"))?;
    Ok(UnitQuaternion::from_axis_angle(&axis, angle) * *rotation)
}

/// Rotates `v` about `axis` by `angle` radians.
pub fn rotate_vector(v: &Vector3<f64>, axis: &Vector3<f64>, angle: f64) -> Result<Vector3<f64>> {
    Ok(rotate_around_world_axis(&Rotation::identity(), axis, angle)?.transform_vector(v))
}

/// World-space rotation that turns `current` onto `target`.
///
/// Already-aligned vectors yield the identity. Opposite vectors are turned by
/// π about an axis perpendicular to `current`.
pub fn align_rotation(current: &Vector3<f64>, target: &Vector3<f64>) -> Result<Rotation> {
    let angle = angle_between(current, target)?;
    if angle < ANGLE_EPSILON {
        return Ok(Rotation::identity());
    }
    let axis = if PI - angle < ANGLE_EPSILON {
        perpendicular_to(current)?
    } else {
        current.cross(target)
    };
    rotate_around_world_axis(&Rotation::identity(), &axis, angle)
}

fn perpendicular_to(v: &Vector3<f64>) -> Result<Vector3<f64>> {
    let v = normalized(v, "alignment normal")?;
    let helper = if v.z.abs() < 0.9 {
        Vector3::z()
    } else {
        Vector3::y()
    };
    normalized(&helper.cross(&v), "perpendicular helper axis")
}

/// Infinite plane given by a unit normal and a point on it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MathPlane {
    pub normal: Vector3<f64>,
    pub point: Point3<f64>,
}

impl MathPlane {
    pub fn from_normal_and_point(normal: &Vector3<f64>, point: Point3<f64>) -> Result<Self> {
        Ok(Self {
            normal: normalized(normal, "plane normal")?,
            point,
        })
    }

    /// Signed distance of `p` along the normal.
    pub fn signed_distance(&self, p: &Point3<f64>) -> f64 {
        self.normal.dot(&(p - self.point))
    }

    pub fn project_point(&self, p: &Point3<f64>) -> Point3<f64> {
        p - self.normal * self.signed_distance(p)
    }
}

pub fn midpoint(a: &Point3<f64>, b: &Point3<f64>) -> Point3<f64> {
    nalgebra::center(a, b)
}
