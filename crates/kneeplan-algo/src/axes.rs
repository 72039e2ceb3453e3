use crate::structs::{FemurAxes, LateralLine, ProjectedTea, ReferenceLine};
use kneeplan_core::geom::{direction_between, normalized, rotate_vector};
use kneeplan_core::landmark::{LandmarkKey, LandmarkStore};
use kneeplan_core::model::{Axis, Plane};
use kneeplan_core::Result;
use std::f64::consts::FRAC_PI_2;

/// Axis from `b` towards `a`, anchored at `a`.
pub fn derive_axis(store: &LandmarkStore, a: LandmarkKey, b: LandmarkKey) -> Result<Axis> {
    let pa = store.get(a)?;
    let pb = store.get(b)?;
    Axis::through(pa, pb, &format!("axis {a} -> {b}"))
}

pub fn derive_femur_axes(store: &LandmarkStore) -> Result<FemurAxes> {
    Ok(FemurAxes {
        mechanical: derive_axis(store, LandmarkKey::FemurCenter, LandmarkKey::HipCenter)?,
        anatomical: derive_axis(
            store,
            LandmarkKey::FemurProximalCanal,
            LandmarkKey::FemurDistalCanal,
        )?,
        trans_epicondylar: derive_axis(
            store,
            LandmarkKey::MedialEpicondyle,
            LandmarkKey::LateralEpicondyle,
        )?,
        posterior_condylar: derive_axis(
            store,
            LandmarkKey::PosteriorMedialPoint,
            LandmarkKey::PosteriorLateralPoint,
        )?,
    })
}

/// Epicondyles dropped onto the plane perpendicular to the mechanical axis.
pub fn project_tea(axes: &FemurAxes, mechanical_plane: &Plane) -> ProjectedTea {
    let tea = axes.trans_epicondylar;
    ProjectedTea {
        medial: mechanical_plane.project_point(&tea.origin),
        lateral: mechanical_plane.project_point(&tea.far_point()),
    }
}

/// Anterior reference line: the projected TEA turned 90° about the mechanical
/// axis, `length` millimetres out from femur-center.
pub fn anterior_line(axes: &FemurAxes, projected: &ProjectedTea, length: f64) -> Result<ReferenceLine> {
    let tea_dir = direction_between(&projected.medial, &projected.lateral, "projected TEA")?;
    let anterior_dir = rotate_vector(&tea_dir, &axes.mechanical.direction, FRAC_PI_2)?;
    let femur_center = axes.femur_center();
    Ok(ReferenceLine::from_femur_center(
        femur_center,
        femur_center + anterior_dir * length,
    ))
}

/// Lateral reference line: perpendicular to both the anterior line and the
/// hip-ward mechanical direction, projected onto the mechanical-perpendicular
/// plane.
pub fn lateral_line(
    axes: &FemurAxes,
    anterior: &ReferenceLine,
    mechanical_plane: &Plane,
    length: f64,
) -> Result<LateralLine> {
    let femur_center = axes.femur_center();
    let anterior_dir = anterior.direction()?;
    let hipward = -axes.mechanical.direction;
    let lateral_dir = normalized(&anterior_dir.cross(&hipward), "lateral direction")?;
    let construction_point = femur_center + lateral_dir * length;
    let projected = mechanical_plane.project_point(&construction_point);
    Ok(LateralLine {
        construction_point,
        projected: ReferenceLine::from_femur_center(femur_center, projected),
    })
}
