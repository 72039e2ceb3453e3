#![allow(dead_code)]

use kneeplan_algo::{Planner, PlannerConfig};
use kneeplan_core::landmark::LandmarkKey;
use nalgebra::Point3;

/// A right femur laid out along the world axes: the mechanical axis points
/// along +Z, the epicondyles sit on the X axis and the distal points lie
/// 20 mm (medial) and 18 mm (lateral) beyond femur-center.
pub fn femur_landmarks() -> Vec<(LandmarkKey, Point3<f64>)> {
    vec![
        (LandmarkKey::FemurCenter, Point3::new(0.0, 0.0, 0.0)),
        (LandmarkKey::HipCenter, Point3::new(0.0, 0.0, -400.0)),
        (LandmarkKey::FemurProximalCanal, Point3::new(0.0, 2.0, -150.0)),
        (LandmarkKey::FemurDistalCanal, Point3::new(0.0, 1.0, -40.0)),
        (LandmarkKey::MedialEpicondyle, Point3::new(-40.0, 0.0, 10.0)),
        (LandmarkKey::LateralEpicondyle, Point3::new(40.0, 0.0, 10.0)),
        (LandmarkKey::DistalMedialPoint, Point3::new(-25.0, 5.0, 20.0)),
        (LandmarkKey::DistalLateralPoint, Point3::new(25.0, 5.0, 18.0)),
        (LandmarkKey::PosteriorMedialPoint, Point3::new(-22.0, 30.0, 12.0)),
        (LandmarkKey::PosteriorLateralPoint, Point3::new(22.0, 30.0, 12.0)),
    ]
}

pub fn planner_with_landmarks() -> Planner {
    let mut planner = Planner::new(PlannerConfig::default());
    // reverse order on purpose: the store must not care
    for (key, position) in femur_landmarks().into_iter().rev() {
        planner.set_landmark(key, position);
    }
    planner
}

pub fn planned() -> Planner {
    let mut planner = planner_with_landmarks();
    planner.run_full_pipeline().unwrap();
    planner
}
