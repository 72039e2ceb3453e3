use crate::axes;
use crate::measurement;
use crate::planes;
use crate::planner::PlannerConfig;
use crate::schedule::Step;
use crate::structs::{Derived, OffsetState};
use kneeplan_core::landmark::{LandmarkKey, LandmarkStore};
use kneeplan_core::{PlanningError, Result};
use log::debug;

/// Read-only inputs shared by every step of one run.
pub struct StepContext<'a> {
    pub landmarks: &'a LandmarkStore,
    pub cfg: &'a PlannerConfig,
    pub offsets: &'a OffsetState,
}

/// Runs `steps` in order against `derived`, stopping at the first failure.
///
/// Callers pass a scratch copy and commit it only when this returns `Ok`.
pub fn run_steps(ctx: &StepContext<'_>, steps: &[Step], derived: &mut Derived) -> Result<()> {
    for step in steps {
        debug!("running derivation step {step:?}");
        run_step(ctx, *step, derived)?;
    }
    Ok(())
}

fn run_step(ctx: &StepContext<'_>, step: Step, d: &mut Derived) -> Result<()> {
    match step {
        Step::Axes => {
            d.axes = Some(axes::derive_femur_axes(ctx.landmarks)?);
        }
        Step::MechanicalPlane => {
            let femur_axes = need(d.axes)?;
            d.mechanical_plane = Some(planes::mechanical_perpendicular_plane(&femur_axes)?);
        }
        Step::ProjectedTea => {
            d.projected_tea = Some(axes::project_tea(&need(d.axes)?, &need(d.mechanical_plane)?));
        }
        Step::AnteriorLine => {
            d.anterior = Some(axes::anterior_line(
                &need(d.axes)?,
                &need(d.projected_tea)?,
                ctx.cfg.construction_length_mm,
            )?);
        }
        Step::LateralLine => {
            d.lateral = Some(axes::lateral_line(
                &need(d.axes)?,
                &need(d.anterior)?,
                &need(d.mechanical_plane)?,
                ctx.cfg.construction_length_mm,
            )?);
        }
        Step::VarusValgusPlane => {
            d.varus_valgus_plane = Some(planes::varus_valgus_plane(
                &need(d.mechanical_plane)?,
                ctx.offsets,
            ));
        }
        Step::FlexionExtensionPlane => {
            d.flexion_extension_plane = Some(planes::flexion_extension_plane(
                &need(d.varus_valgus_plane)?,
                ctx.offsets,
            ));
        }
        Step::DistalMedialPlane => {
            let point = ctx.landmarks.get(LandmarkKey::DistalMedialPoint)?;
            d.distal_medial_plane = Some(planes::distal_medial_plane(
                point,
                &need(d.flexion_extension_plane)?,
            )?);
        }
        Step::DistalResectionPlane => {
            let point = ctx.landmarks.get(LandmarkKey::DistalMedialPoint)?;
            let resection = planes::distal_resection_plane(
                point,
                &need(d.distal_medial_plane)?,
                &need(d.flexion_extension_plane)?,
                ctx.offsets.resection_depth_mm,
            );
            d.distal_resection_plane = Some(resection);
            d.clip_surface = Some(planes::clip_surface(&resection));
        }
        Step::Measurements => {
            let resection = need(d.distal_resection_plane)?;
            d.clearances = Some(measurement::resection_clearances(ctx.landmarks, &resection)?);
        }
    }
    Ok(())
}

fn need<T: Copy>(slot: Option<T>) -> Result<T> {
    slot.ok_or(PlanningError::PipelineNotInitialized)
}
