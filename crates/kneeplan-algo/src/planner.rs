use crate::pipeline::{run_steps, StepContext};
use crate::schedule::{downstream_of, Input, Step};
use crate::structs::{Derived, OffsetState};
use kneeplan_core::geom::rotate_around_world_axis;
use kneeplan_core::landmark::{LandmarkKey, LandmarkStore};
use kneeplan_core::model::{ClipSurface, Entity, EntityKey};
use kneeplan_core::report::{DisplayToggles, PlanSnapshot, ResectionClearances};
use kneeplan_core::{PlanningError, Result};
use log::{info, warn};
use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Landmarks a full run needs, in the order they are checked.
pub const REQUIRED_LANDMARKS: [LandmarkKey; 10] = LandmarkKey::ALL;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannerConfig {
    pub default_resection_depth_mm: f64,
    /// Length of the anterior and lateral construction lines. Only fixes
    /// directions; it is not a measurement.
    pub construction_length_mm: f64,
    /// Side of the square drawn for each plane.
    pub plane_size_mm: f64,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            default_resection_depth_mm: 10.0,
            construction_length_mm: 10.0,
            plane_size_mm: 100.0,
        }
    }
}

/// One planning session: its landmarks, offsets and everything derived from
/// them.
///
/// Every mutating call either completes the whole re-derivation or leaves the
/// session untouched.
#[derive(Debug, Clone)]
pub struct Planner {
    cfg: PlannerConfig,
    landmarks: LandmarkStore,
    offsets: OffsetState,
    derived: Derived,
    initialized: bool,
    stale: bool,
    display: DisplayToggles,
}

impl Planner {
    pub fn new(cfg: PlannerConfig) -> Self {
        Self::with_landmarks(cfg, LandmarkStore::new())
    }

    pub fn with_landmarks(cfg: PlannerConfig, landmarks: LandmarkStore) -> Self {
        let offsets = OffsetState::new(cfg.default_resection_depth_mm);
        Self {
            cfg,
            landmarks,
            offsets,
            derived: Derived::default(),
            initialized: false,
            stale: false,
            display: DisplayToggles::default(),
        }
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.cfg
    }

    pub fn landmarks(&self) -> &LandmarkStore {
        &self.landmarks
    }

    pub fn landmark(&self, key: LandmarkKey) -> Result<Point3<f64>> {
        self.landmarks.get(key)
    }

    /// Records a picked landmark. Derived geometry is not refreshed until the
    /// next [`Planner::run_full_pipeline`]; until then [`Planner::is_stale`]
    /// reports `true`.
    pub fn set_landmark(&mut self, key: LandmarkKey, position: Point3<f64>) {
        self.landmarks.set(key, position);
        if self.initialized {
            self.stale = true;
        }
    }

    pub fn clear_landmark(&mut self, key: LandmarkKey) -> Option<Point3<f64>> {
        let previous = self.landmarks.clear(key);
        if previous.is_some() && self.initialized {
            self.stale = true;
        }
        previous
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn is_stale(&self) -> bool {
        self.stale
    }

    pub fn offsets(&self) -> &OffsetState {
        &self.offsets
    }

    pub fn derived(&self) -> &Derived {
        &self.derived
    }

    /// Derives every axis, plane and measurement from the landmarks.
    ///
    /// Angular offsets start over from zero; the resection depth is kept.
    pub fn run_full_pipeline(&mut self) -> Result<()> {
        if let Some(key) = self.landmarks.first_missing(&REQUIRED_LANDMARKS) {
            warn!("full pipeline run rejected: landmark {key} is not set");
            return Err(PlanningError::MissingLandmark { key });
        }

        let mut offsets = self.offsets.clone();
        offsets.reset_angles();
        let mut derived = Derived::default();
        self.derive(&Step::ORDER, &offsets, &mut derived)?;

        self.offsets = offsets;
        self.derived = derived;
        self.initialized = true;
        self.stale = false;
        info!(
            "planning pipeline derived {} entities (resection depth {} mm)",
            self.derived.entities().len(),
            self.offsets.resection_depth_mm
        );
        Ok(())
    }

    /// Tilts the varus-valgus plane about the anterior reference line.
    ///
    /// The flexion-extension plane is duplicated afresh from the tilted
    /// varus-valgus plane, so any earlier flexion-extension tilt is dropped and
    /// its counter returns to zero.
    pub fn adjust_varus_valgus(&mut self, delta_degrees: i32) -> Result<()> {
        self.ensure_initialized()?;
        let axis = self.anterior_direction()?;
        let mut offsets = self.offsets.clone();
        offsets.varus_valgus_degrees =
            checked_degrees(offsets.varus_valgus_degrees, delta_degrees, "varus/valgus")?;
        offsets.varus_valgus_rotation = rotate_around_world_axis(
            &offsets.varus_valgus_rotation,
            &axis,
            f64::from(delta_degrees).to_radians(),
        )?;
        if offsets.flexion_extension_degrees != 0 {
            info!(
                "varus/valgus change drops flexion/extension tilt of {}°",
                offsets.flexion_extension_degrees
            );
        }
        offsets.reset_flexion_extension();
        self.rederive(Input::VarusValgus, offsets)?;
        info!("varus/valgus now {}°", self.offsets.varus_valgus_degrees);
        Ok(())
    }

    /// Tilts the flexion-extension plane about the lateral reference line.
    pub fn adjust_flexion_extension(&mut self, delta_degrees: i32) -> Result<()> {
        self.ensure_initialized()?;
        let axis = self.lateral_direction()?;
        let mut offsets = self.offsets.clone();
        offsets.flexion_extension_degrees = checked_degrees(
            offsets.flexion_extension_degrees,
            delta_degrees,
            "flexion/extension",
        )?;
        offsets.flexion_extension_rotation = rotate_around_world_axis(
            &offsets.flexion_extension_rotation,
            &axis,
            f64::from(delta_degrees).to_radians(),
        )?;
        self.rederive(Input::FlexionExtension, offsets)?;
        info!("flexion/extension now {}°", self.offsets.flexion_extension_degrees);
        Ok(())
    }

    pub fn adjust_resection_depth(&mut self, delta_mm: f64) -> Result<()> {
        self.ensure_initialized()?;
        let depth = self.offsets.resection_depth_mm + delta_mm;
        if !delta_mm.is_finite() || !depth.is_finite() {
            warn!("resection depth change of {delta_mm} mm rejected");
            return Err(PlanningError::InvalidOffset(format!(
                "resection depth change must be finite, got {delta_mm} mm"
            )));
        }
        let mut offsets = self.offsets.clone();
        offsets.resection_depth_mm = depth;
        self.rederive(Input::ResectionDepth, offsets)?;
        info!("distal resection now {} mm", self.offsets.resection_depth_mm);
        Ok(())
    }

    /// Current medial/lateral clearance against the resection plane.
    pub fn compute_resection_clearances(&self) -> Result<ResectionClearances> {
        self.ensure_initialized()?;
        let resection = self
            .derived
            .distal_resection_plane
            .ok_or(PlanningError::PipelineNotInitialized)?;
        crate::measurement::resection_clearances(&self.landmarks, &resection)
    }

    pub fn entity(&self, key: EntityKey) -> Option<Entity> {
        self.derived.entity(key)
    }

    pub fn entities(&self) -> BTreeMap<EntityKey, Entity> {
        self.derived.entities()
    }

    /// The single active resection clip surface, if the pipeline has run.
    pub fn clip_surface(&self) -> Option<ClipSurface> {
        self.derived.clip_surface
    }

    pub fn display(&self) -> DisplayToggles {
        self.display
    }

    pub fn set_resection_clipping(&mut self, enabled: bool) {
        self.display.resection_clipping = enabled;
    }

    pub fn set_tibia_visible(&mut self, visible: bool) {
        self.display.tibia_visible = visible;
    }

    pub fn plane_outlines(&self) -> BTreeMap<EntityKey, [Point3<f64>; 4]> {
        self.entities()
            .into_iter()
            .filter_map(|(key, entity)| match entity {
                Entity::Plane(plane) => Some((key, plane.corners(self.cfg.plane_size_mm))),
                _ => None,
            })
            .collect()
    }

    pub fn snapshot(&self) -> PlanSnapshot {
        PlanSnapshot {
            landmarks: self.landmarks.clone(),
            offsets: self.offsets.summary(),
            stale: self.stale,
            entities: self.entities(),
            plane_outlines: self.plane_outlines(),
            clip_surface: self.clip_surface(),
            clearances: self.derived.clearances.map(|c| c.report()),
            display: self.display,
        }
    }

    fn ensure_initialized(&self) -> Result<()> {
        if self.initialized {
            Ok(())
        } else {
            warn!("adjustment rejected: planning pipeline has not run yet");
            Err(PlanningError::PipelineNotInitialized)
        }
    }

    fn anterior_direction(&self) -> Result<Vector3<f64>> {
        self.derived
            .anterior
            .ok_or(PlanningError::PipelineNotInitialized)?
            .direction()
    }

    fn lateral_direction(&self) -> Result<Vector3<f64>> {
        self.derived
            .lateral
            .ok_or(PlanningError::PipelineNotInitialized)?
            .projected
            .direction()
    }

    /// Re-runs the steps downstream of `changed` with `offsets`, committing
    /// both only on success.
    fn rederive(&mut self, changed: Input, offsets: OffsetState) -> Result<()> {
        let steps = downstream_of(changed);
        let mut derived = self.derived.clone();
        self.derive(&steps, &offsets, &mut derived)?;
        self.offsets = offsets;
        self.derived = derived;
        Ok(())
    }

    fn derive(&self, steps: &[Step], offsets: &OffsetState, derived: &mut Derived) -> Result<()> {
        let ctx = StepContext {
            landmarks: &self.landmarks,
            cfg: &self.cfg,
            offsets,
        };
        run_steps(&ctx, steps, derived).inspect_err(|err| {
            warn!("derivation aborted, keeping previous plan: {err}");
        })
    }
}

fn checked_degrees(current: i32, delta: i32, what: &str) -> Result<i32> {
    current.checked_add(delta).ok_or_else(|| {
        warn!("{what} change of {delta}° rejected");
        PlanningError::InvalidOffset(format!("{what} offset out of range: {current}° + {delta}°"))
    })
}

impl Default for Planner {
    fn default() -> Self {
        Self::new(PlannerConfig::default())
    }
}
