mod common;

use approx::assert_relative_eq;
use common::{femur_landmarks, planned, planner_with_landmarks};
use kneeplan_algo::axes::derive_axis;
use kneeplan_algo::{Planner, PlannerConfig};
use kneeplan_core::landmark::{LandmarkKey, LandmarkStore};
use kneeplan_core::model::{Entity, EntityKey, Plane};
use kneeplan_core::PlanningError;
use nalgebra::{Point3, Vector3};

fn plane(planner: &Planner, key: EntityKey) -> Plane {
    match planner.entity(key) {
        Some(Entity::Plane(plane)) => plane,
        other => panic!("{key} is not a plane: {other:?}"),
    }
}

fn point(planner: &Planner, key: EntityKey) -> Point3<f64> {
    match planner.entity(key) {
        Some(Entity::Point { position }) => position,
        other => panic!("{key} is not a point: {other:?}"),
    }
}

#[test]
fn mechanical_axis_points_from_hip_to_femur_center() {
    let mut store = LandmarkStore::new();
    store.set(LandmarkKey::FemurCenter, Point3::new(0.0, 0.0, 0.0));
    store.set(LandmarkKey::HipCenter, Point3::new(0.0, -400.0, 0.0));

    let axis = derive_axis(&store, LandmarkKey::FemurCenter, LandmarkKey::HipCenter).unwrap();
    assert_relative_eq!(Vector3::new(0.0, 1.0, 0.0), axis.direction, epsilon = 1e-12);
    assert_relative_eq!(400.0, axis.length);
    assert_relative_eq!(Point3::new(0.0, -400.0, 0.0), axis.far_point(), epsilon = 1e-9);

    let err = derive_axis(&store, LandmarkKey::FemurCenter, LandmarkKey::MedialEpicondyle).unwrap_err();
    assert_eq!(PlanningError::NotFound(LandmarkKey::MedialEpicondyle), err);
}

#[test]
fn full_run_derives_every_entity() {
    let planner = planned();

    assert!(planner.is_initialized());
    assert!(!planner.is_stale());
    assert_eq!(EntityKey::ALL.len(), planner.entities().len());
    assert!(planner.clip_surface().is_some());
}

#[test]
fn reference_planes_follow_the_mechanical_axis() {
    let planner = planned();

    let mechanical = plane(&planner, EntityKey::MechanicalPerpendicularPlane);
    assert_relative_eq!(Point3::origin(), mechanical.position);
    assert_relative_eq!(Vector3::z(), mechanical.normal(), epsilon = 1e-9);

    let vv = plane(&planner, EntityKey::VarusValgusPlane);
    let fe = plane(&planner, EntityKey::FlexionExtensionPlane);
    assert_eq!(mechanical, vv);
    assert_eq!(vv.orientation, fe.orientation);

    let distal_medial = plane(&planner, EntityKey::DistalMedialPlane);
    assert_relative_eq!(Point3::new(-25.0, 5.0, 20.0), distal_medial.position);
    assert_relative_eq!(fe.normal(), distal_medial.normal(), epsilon = 1e-9);
}

#[test]
fn construction_lines_span_the_transverse_plane() {
    let planner = planned();

    assert_relative_eq!(
        Point3::new(-40.0, 0.0, 0.0),
        point(&planner, EntityKey::ProjectedMedialEpicondyle),
        epsilon = 1e-9
    );
    assert_relative_eq!(
        Point3::new(40.0, 0.0, 0.0),
        point(&planner, EntityKey::ProjectedLateralEpicondyle),
        epsilon = 1e-9
    );
    // projected TEA (-X) turned a quarter about +Z
    assert_relative_eq!(
        Point3::new(0.0, -10.0, 0.0),
        point(&planner, EntityKey::AnteriorPoint),
        epsilon = 1e-9
    );
    assert_relative_eq!(
        Point3::new(10.0, 0.0, 0.0),
        point(&planner, EntityKey::LateralLinePoint),
        epsilon = 1e-9
    );
    assert_relative_eq!(
        Point3::new(10.0, 0.0, 0.0),
        point(&planner, EntityKey::LateralProjectedPoint),
        epsilon = 1e-9
    );
}

#[test]
fn resection_plane_sits_below_distal_medial_point() {
    let planner = planned();

    let resection = plane(&planner, EntityKey::DistalResectionPlane);
    assert_relative_eq!(Point3::new(-25.0, 5.0, 10.0), resection.position, epsilon = 1e-9);

    let clip = planner.clip_surface().unwrap();
    assert_relative_eq!(resection.position, clip.point);
    assert_relative_eq!(Vector3::new(0.0, 0.0, -1.0), clip.normal, epsilon = 1e-9);

    let clearances = planner.compute_resection_clearances().unwrap();
    assert_relative_eq!(10.0, clearances.medial_mm, epsilon = 1e-9);
    assert_relative_eq!(8.0, clearances.lateral_mm, epsilon = 1e-9);
    assert_eq!("10 mm", clearances.medial_label());
    assert_eq!("8 mm", clearances.lateral_label());
    assert_relative_eq!(
        Point3::new(25.0, 5.0, 10.0),
        clearances.lateral_projected_point(),
        epsilon = 1e-9
    );
}

#[test]
fn distal_medial_origin_with_unit_normal() {
    let mut planner = planner_with_landmarks();
    planner.set_landmark(LandmarkKey::DistalMedialPoint, Point3::origin());
    planner.run_full_pipeline().unwrap();

    assert_relative_eq!(
        Vector3::z(),
        plane(&planner, EntityKey::DistalMedialPlane).normal(),
        epsilon = 1e-9
    );
    let resection = plane(&planner, EntityKey::DistalResectionPlane);
    assert_relative_eq!(-10.0, resection.position.z, epsilon = 1e-9);
    let clearances = planner.compute_resection_clearances().unwrap();
    assert_eq!(10.00, (clearances.medial_mm * 100.0).round() / 100.0);
}

#[test]
fn missing_landmark_is_named_and_nothing_is_derived() {
    let mut planner = Planner::default();
    for (key, position) in femur_landmarks() {
        if key != LandmarkKey::DistalLateralPoint {
            planner.set_landmark(key, position);
        }
    }

    let err = planner.run_full_pipeline().unwrap_err();
    assert_eq!(
        PlanningError::MissingLandmark {
            key: LandmarkKey::DistalLateralPoint
        },
        err
    );
    assert!(!planner.is_initialized());
    assert!(planner.entities().is_empty());
    assert!(planner.clip_surface().is_none());
}

#[test]
fn first_missing_landmark_in_vocabulary_order_is_reported() {
    let mut planner = planner_with_landmarks();
    planner.clear_landmark(LandmarkKey::PosteriorMedialPoint);
    planner.clear_landmark(LandmarkKey::HipCenter);

    assert_eq!(
        PlanningError::MissingLandmark {
            key: LandmarkKey::HipCenter
        },
        planner.run_full_pipeline().unwrap_err()
    );
}

#[test]
fn degenerate_landmarks_keep_the_previous_plan() {
    let mut planner = planned();
    let before = planner.snapshot();

    // both epicondyles on the mechanical axis: their projections coincide
    planner.set_landmark(LandmarkKey::MedialEpicondyle, Point3::new(0.0, 0.0, 10.0));
    planner.set_landmark(LandmarkKey::LateralEpicondyle, Point3::new(0.0, 0.0, 30.0));
    assert!(planner.is_stale());

    let err = planner.run_full_pipeline().unwrap_err();
    assert!(matches!(err, PlanningError::DegenerateGeometry(_)));
    assert_eq!(before.entities, planner.snapshot().entities);
    assert_eq!(before.clip_surface, planner.clip_surface());
    assert!(planner.is_stale());
}

#[test]
fn coincident_hip_and_femur_center_is_degenerate() {
    let mut planner = planner_with_landmarks();
    planner.set_landmark(LandmarkKey::HipCenter, Point3::origin());

    let err = planner.run_full_pipeline().unwrap_err();
    assert!(matches!(err, PlanningError::DegenerateGeometry(_)));
    assert!(planner.entities().is_empty());
}

#[test]
fn mechanical_axis_opposite_the_rest_normal() {
    let mut planner = planner_with_landmarks();
    planner.set_landmark(LandmarkKey::HipCenter, Point3::new(0.0, 0.0, 400.0));
    planner.run_full_pipeline().unwrap();

    let mechanical = plane(&planner, EntityKey::MechanicalPerpendicularPlane);
    assert_relative_eq!(Vector3::new(0.0, 0.0, -1.0), mechanical.normal(), epsilon = 1e-9);
    let resection = plane(&planner, EntityKey::DistalResectionPlane);
    assert_relative_eq!(30.0, resection.position.z, epsilon = 1e-9);
}

#[test]
fn rerun_replaces_entities_in_place() {
    let mut planner = planned();
    planner.set_landmark(LandmarkKey::DistalMedialPoint, Point3::new(-25.0, 5.0, 24.0));
    assert!(planner.is_stale());
    planner.run_full_pipeline().unwrap();

    assert!(!planner.is_stale());
    assert_eq!(EntityKey::ALL.len(), planner.entities().len());
    assert_relative_eq!(14.0, planner.clip_surface().unwrap().point.z, epsilon = 1e-9);
}

#[test]
fn snapshot_carries_outlines_and_labels() {
    let mut planner = Planner::new(PlannerConfig {
        plane_size_mm: 60.0,
        ..PlannerConfig::default()
    });
    for (key, position) in femur_landmarks() {
        planner.set_landmark(key, position);
    }
    planner.run_full_pipeline().unwrap();
    planner.set_resection_clipping(true);

    let snapshot = planner.snapshot();
    assert_eq!(5, snapshot.plane_outlines.len());
    let corners = snapshot.plane_outlines[&EntityKey::DistalResectionPlane];
    assert_relative_eq!(60.0, (corners[1] - corners[0]).norm(), epsilon = 1e-9);

    let clearances = snapshot.clearances.unwrap();
    assert_eq!("10 mm", clearances.medial_label);
    assert_relative_eq!(Point3::new(-25.0, 5.0, 15.0), clearances.medial_label_anchor, epsilon = 1e-9);
    assert!(snapshot.display.resection_clipping);
    assert!(snapshot.display.tibia_visible);
    assert_eq!(10, snapshot.landmarks.len());
}
