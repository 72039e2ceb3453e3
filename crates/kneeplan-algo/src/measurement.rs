use kneeplan_core::landmark::{LandmarkKey, LandmarkStore};
use kneeplan_core::model::{project_point_onto_plane, Plane, Segment};
use kneeplan_core::report::ResectionClearances;
use kneeplan_core::Result;

/// Medial and lateral condyle clearance to the resection plane.
///
/// The distal-medial point sits on the line the resection plane was pushed
/// along, so the medial value is a point-to-point distance. The lateral value
/// goes through the orthogonal projection.
pub fn resection_clearances(store: &LandmarkStore, resection: &Plane) -> Result<ResectionClearances> {
    let medial = store.get(LandmarkKey::DistalMedialPoint)?;
    let lateral = store.get(LandmarkKey::DistalLateralPoint)?;

    let medial_line = Segment::new(medial, resection.position);
    let lateral_line = Segment::new(lateral, project_point_onto_plane(resection, &lateral));

    Ok(ResectionClearances {
        medial_mm: medial_line.length(),
        lateral_mm: lateral_line.length(),
        medial_line,
        lateral_line,
    })
}
