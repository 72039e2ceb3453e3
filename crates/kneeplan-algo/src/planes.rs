use crate::structs::{FemurAxes, OffsetState};
use kneeplan_core::geom::Rotation;
use kneeplan_core::model::{ClipSurface, Plane};
use kneeplan_core::Result;
use nalgebra::Point3;

/// Plane through femur-center whose normal follows the mechanical axis.
pub fn mechanical_perpendicular_plane(axes: &FemurAxes) -> Result<Plane> {
    Plane::canonical(axes.femur_center()).aligned_to(&axes.mechanical.direction)
}

/// Copy of `source` with `adjustment` composed onto its orientation.
pub fn duplicate_rotated(source: &Plane, adjustment: &Rotation) -> Plane {
    source.with_orientation(*adjustment * source.orientation)
}

pub fn varus_valgus_plane(mechanical: &Plane, offsets: &OffsetState) -> Plane {
    duplicate_rotated(mechanical, &offsets.varus_valgus_rotation)
}

/// Duplicate of the varus-valgus plane with the flexion-extension tilt applied
/// on top. Right after a varus-valgus change that tilt is the identity.
pub fn flexion_extension_plane(varus_valgus: &Plane, offsets: &OffsetState) -> Plane {
    duplicate_rotated(varus_valgus, &offsets.flexion_extension_rotation)
}

/// Plane through the distal-medial point, parallel to `flexion_extension`.
pub fn distal_medial_plane(distal_medial_point: Point3<f64>, flexion_extension: &Plane) -> Result<Plane> {
    Plane::canonical(distal_medial_point).aligned_to(&flexion_extension.normal())
}

/// The cut: oriented like `flexion_extension`, pushed `depth_mm` into the bone
/// from the distal-medial point against the distal-medial normal.
pub fn distal_resection_plane(
    distal_medial_point: Point3<f64>,
    distal_medial: &Plane,
    flexion_extension: &Plane,
    depth_mm: f64,
) -> Plane {
    let position = distal_medial_point - distal_medial.normal() * depth_mm;
    Plane {
        position,
        orientation: flexion_extension.orientation,
    }
}

pub fn clip_surface(resection: &Plane) -> ClipSurface {
    ClipSurface::from_resection_plane(resection)
}
