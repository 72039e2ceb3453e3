use kneeplan_core::geom::Rotation;
use kneeplan_core::model::{Axis, ClipSurface, Entity, EntityKey, Plane, Segment};
use kneeplan_core::report::{OffsetSummary, ResectionClearances};
use kneeplan_core::Result;
use nalgebra::{Point3, Vector3};
use std::collections::BTreeMap;

/// Clinician-adjustable offsets.
///
/// The degree counters are what the UI shows; the rotations are the angular
/// adjustments composed in world space, which is what the planes consume. The
/// flexion-extension rotation is relative to the varus-valgus plane it was last
/// duplicated from.
#[derive(Debug, Clone, PartialEq)]
pub struct OffsetState {
    pub varus_valgus_degrees: i32,
    pub flexion_extension_degrees: i32,
    pub resection_depth_mm: f64,
    pub varus_valgus_rotation: Rotation,
    pub flexion_extension_rotation: Rotation,
}

impl OffsetState {
    pub fn new(resection_depth_mm: f64) -> Self {
        Self {
            varus_valgus_degrees: 0,
            flexion_extension_degrees: 0,
            resection_depth_mm,
            varus_valgus_rotation: Rotation::identity(),
            flexion_extension_rotation: Rotation::identity(),
        }
    }

    pub fn reset_angles(&mut self) {
        self.varus_valgus_degrees = 0;
        self.varus_valgus_rotation = Rotation::identity();
        self.reset_flexion_extension();
    }

    pub fn reset_flexion_extension(&mut self) {
        self.flexion_extension_degrees = 0;
        self.flexion_extension_rotation = Rotation::identity();
    }

    pub fn summary(&self) -> OffsetSummary {
        OffsetSummary {
            varus_valgus_degrees: self.varus_valgus_degrees,
            flexion_extension_degrees: self.flexion_extension_degrees,
            resection_depth_mm: self.resection_depth_mm,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FemurAxes {
    /// Origin at femur-center, pointing away from hip-center.
    pub mechanical: Axis,
    pub anatomical: Axis,
    /// origin at the medial epicondyle
    pub trans_epicondylar: Axis,
    pub posterior_condylar: Axis,
}

impl FemurAxes {
    pub fn femur_center(&self) -> Point3<f64> {
        self.mechanical.origin
    }

    pub fn hip_center(&self) -> Point3<f64> {
        self.mechanical.far_point()
    }
}

/// Epicondyles projected onto the mechanical-perpendicular plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectedTea {
    pub medial: Point3<f64>,
    pub lateral: Point3<f64>,
}

impl ProjectedTea {
    pub fn segment(&self) -> Segment {
        Segment::new(self.medial, self.lateral)
    }
}

/// A construction line starting at femur-center.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReferenceLine {
    pub line: Segment,
}

impl ReferenceLine {
    pub fn from_femur_center(femur_center: Point3<f64>, point: Point3<f64>) -> Self {
        Self {
            line: Segment::new(femur_center, point),
        }
    }

    pub fn point(&self) -> Point3<f64> {
        self.line.end
    }

    pub fn direction(&self) -> Result<Vector3<f64>> {
        self.line.direction("reference line")
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LateralLine {
    /// Construction point before projection onto the mechanical-perpendicular
    /// plane.
    pub construction_point: Point3<f64>,
    pub projected: ReferenceLine,
}

/// Everything the pipeline has derived so far. Slots stay `None` until their
/// step has run once.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Derived {
    pub axes: Option<FemurAxes>,
    pub mechanical_plane: Option<Plane>,
    pub projected_tea: Option<ProjectedTea>,
    pub anterior: Option<ReferenceLine>,
    pub lateral: Option<LateralLine>,
    pub varus_valgus_plane: Option<Plane>,
    pub flexion_extension_plane: Option<Plane>,
    pub distal_medial_plane: Option<Plane>,
    pub distal_resection_plane: Option<Plane>,
    pub clip_surface: Option<ClipSurface>,
    pub clearances: Option<ResectionClearances>,
}

impl Derived {
    pub fn entity(&self, key: EntityKey) -> Option<Entity> {
        let point = |position: Point3<f64>| Entity::Point { position };
        match key {
            EntityKey::MechanicalAxis => self.axes.map(|a| Entity::Axis(a.mechanical)),
            EntityKey::AnatomicalAxis => self.axes.map(|a| Entity::Axis(a.anatomical)),
            EntityKey::TransEpicondylarAxis => self.axes.map(|a| Entity::Axis(a.trans_epicondylar)),
            EntityKey::PosteriorCondylarAxis => {
                self.axes.map(|a| Entity::Axis(a.posterior_condylar))
            }
            EntityKey::MechanicalPerpendicularPlane => self.mechanical_plane.map(Entity::Plane),
            EntityKey::ProjectedMedialEpicondyle => self.projected_tea.map(|p| point(p.medial)),
            EntityKey::ProjectedLateralEpicondyle => self.projected_tea.map(|p| point(p.lateral)),
            EntityKey::ProjectedTea => self.projected_tea.map(|p| Entity::Segment(p.segment())),
            EntityKey::AnteriorPoint => self.anterior.map(|l| point(l.point())),
            EntityKey::AnteriorLine => self.anterior.map(|l| Entity::Segment(l.line)),
            EntityKey::LateralLinePoint => self.lateral.map(|l| point(l.construction_point)),
            EntityKey::LateralProjectedPoint => self.lateral.map(|l| point(l.projected.point())),
            EntityKey::LateralLine => self.lateral.map(|l| Entity::Segment(l.projected.line)),
            EntityKey::VarusValgusPlane => self.varus_valgus_plane.map(Entity::Plane),
            EntityKey::FlexionExtensionPlane => self.flexion_extension_plane.map(Entity::Plane),
            EntityKey::DistalMedialPlane => self.distal_medial_plane.map(Entity::Plane),
            EntityKey::DistalResectionPlane => self.distal_resection_plane.map(Entity::Plane),
            EntityKey::MedialMeasurementLine => {
                self.clearances.map(|c| Entity::Segment(c.medial_line))
            }
            EntityKey::LateralMeasurementPoint => {
                self.clearances.map(|c| point(c.lateral_projected_point()))
            }
            EntityKey::LateralMeasurementLine => {
                self.clearances.map(|c| Entity::Segment(c.lateral_line))
            }
        }
    }

    pub fn entities(&self) -> BTreeMap<EntityKey, Entity> {
        EntityKey::ALL
            .iter()
            .filter_map(|key| self.entity(*key).map(|entity| (*key, entity)))
            .collect()
    }
}
