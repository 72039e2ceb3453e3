use crate::landmark::LandmarkStore;
use crate::model::{ClipSurface, Entity, EntityKey, Segment};
use nalgebra::Point3;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Distances from the distal condyle points to the resection plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResectionClearances {
    pub medial_mm: f64,
    pub lateral_mm: f64,
    /// From the distal-medial point to the resection plane position.
    pub medial_line: Segment,
    /// From the distal-lateral point to its projection on the resection plane.
    pub lateral_line: Segment,
}

impl ResectionClearances {
    pub fn lateral_projected_point(&self) -> Point3<f64> {
        self.lateral_line.end
    }

    pub fn medial_label(&self) -> String {
        format_mm(self.medial_mm)
    }

    pub fn lateral_label(&self) -> String {
        format_mm(self.lateral_mm)
    }

    pub fn report(&self) -> ClearanceReport {
        ClearanceReport {
            medial_mm: self.medial_mm,
            lateral_mm: self.lateral_mm,
            medial_label: self.medial_label(),
            lateral_label: self.lateral_label(),
            medial_label_anchor: self.medial_line.midpoint(),
            lateral_label_anchor: self.lateral_line.midpoint(),
        }
    }
}

/// Rounds to hundredths and drops trailing zeros: `10.0` -> `"10 mm"`,
/// `8.254` -> `"8.25 mm"`.
pub fn format_mm(value: f64) -> String {
    let rounded = round_hundredths(value.abs());
    format!("{rounded} mm")
}

/// Rounds to two decimals on the exact binary value, so `0.015` (stored just
/// below the tie) gives `0.01`. Exact ties round away from zero.
pub fn round_hundredths(value: f64) -> f64 {
    let magnitude = value.abs();
    let thousandths = (magnitude * 1000.0).round();
    let exact_tie = thousandths % 10.0 == 5.0
        && thousandths % 125.0 == 0.0
        && thousandths / 1000.0 == magnitude;
    let text = if exact_tie {
        format!("{:.2}", (thousandths + 5.0) / 1000.0)
    } else {
        format!("{magnitude:.2}")
    };
    let rounded = text.parse::<f64>().unwrap_or(magnitude);
    // avoid printing "-0"
    if rounded == 0.0 {
        0.0
    } else {
        rounded.copysign(value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClearanceReport {
    pub medial_mm: f64,
    pub lateral_mm: f64,
    pub medial_label: String,
    pub lateral_label: String,
    pub medial_label_anchor: Point3<f64>,
    pub lateral_label_anchor: Point3<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OffsetSummary {
    pub varus_valgus_degrees: i32,
    pub flexion_extension_degrees: i32,
    pub resection_depth_mm: f64,
}

/// Renderer toggles carried alongside the plan. They never affect geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayToggles {
    pub resection_clipping: bool,
    pub tibia_visible: bool,
}

impl Default for DisplayToggles {
    fn default() -> Self {
        Self {
            resection_clipping: false,
            tibia_visible: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanSnapshot {
    pub landmarks: LandmarkStore,
    pub offsets: OffsetSummary,
    pub stale: bool,
    pub entities: BTreeMap<EntityKey, Entity>,
    /// World-space corners of every derived plane, for drawing.
    pub plane_outlines: BTreeMap<EntityKey, [Point3<f64>; 4]>,
    pub clip_surface: Option<ClipSurface>,
    pub clearances: Option<ClearanceReport>,
    pub display: DisplayToggles,
}
