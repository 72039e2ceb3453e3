//! Derivation steps and the inputs they depend on.
//!
//! Every step declares what it reads. When an input changes, only the steps
//! that transitively read it are re-run, always in [`Step::ORDER`].

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Input {
    Landmarks,
    VarusValgus,
    FlexionExtension,
    ResectionDepth,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Step {
    Axes,
    MechanicalPlane,
    ProjectedTea,
    AnteriorLine,
    LateralLine,
    VarusValgusPlane,
    FlexionExtensionPlane,
    DistalMedialPlane,
    DistalResectionPlane,
    Measurements,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dependency {
    Input(Input),
    Step(Step),
}

impl Step {
    /// Topological order: every step comes after everything it reads.
    pub const ORDER: [Step; 10] = [
        Step::Axes,
        Step::MechanicalPlane,
        Step::ProjectedTea,
        Step::AnteriorLine,
        Step::LateralLine,
        Step::VarusValgusPlane,
        Step::FlexionExtensionPlane,
        Step::DistalMedialPlane,
        Step::DistalResectionPlane,
        Step::Measurements,
    ];

    pub fn reads(self) -> &'static [Dependency] {
        use Dependency as D;
        match self {
            Step::Axes => &[D::Input(Input::Landmarks)],
            Step::MechanicalPlane => &[D::Step(Step::Axes)],
            Step::ProjectedTea => &[D::Step(Step::Axes), D::Step(Step::MechanicalPlane)],
            Step::AnteriorLine => &[D::Step(Step::Axes), D::Step(Step::ProjectedTea)],
            // Projected onto the varus-valgus plane as first duplicated, which is
            // the mechanical plane itself. Later offsets do not move this line.
            Step::LateralLine => &[
                D::Step(Step::Axes),
                D::Step(Step::MechanicalPlane),
                D::Step(Step::AnteriorLine),
            ],
            Step::VarusValgusPlane => &[
                D::Step(Step::MechanicalPlane),
                D::Input(Input::VarusValgus),
            ],
            Step::FlexionExtensionPlane => &[
                D::Step(Step::VarusValgusPlane),
                D::Input(Input::FlexionExtension),
            ],
            Step::DistalMedialPlane => &[
                D::Input(Input::Landmarks),
                D::Step(Step::FlexionExtensionPlane),
            ],
            Step::DistalResectionPlane => &[
                D::Input(Input::Landmarks),
                D::Step(Step::FlexionExtensionPlane),
                D::Step(Step::DistalMedialPlane),
                D::Input(Input::ResectionDepth),
            ],
            Step::Measurements => &[
                D::Input(Input::Landmarks),
                D::Step(Step::DistalResectionPlane),
            ],
        }
    }
}

/// Steps that must be re-run after `changed` was modified, in execution order.
pub fn downstream_of(changed: Input) -> Vec<Step> {
    let mut dirty: Vec<Step> = Vec::new();
    for step in Step::ORDER {
        let affected = step.reads().iter().any(|dep| match dep {
            Dependency::Input(input) => *input == changed,
            Dependency::Step(upstream) => dirty.contains(upstream),
        });
        if affected {
            dirty.push(step);
        }
    }
    dirty
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_respects_declared_reads() {
        for (idx, step) in Step::ORDER.iter().enumerate() {
            for dep in step.reads() {
                if let Dependency::Step(upstream) = dep {
                    let pos = Step::ORDER.iter().position(|s| s == upstream).unwrap();
                    assert!(pos < idx, "{step:?} runs before {upstream:?}");
                }
            }
        }
    }

    #[test]
    fn landmark_change_reruns_everything() {
        assert_eq!(Step::ORDER.to_vec(), downstream_of(Input::Landmarks));
    }

    #[test]
    fn varus_valgus_reruns_planes_from_step_three() {
        assert_eq!(
            vec![
                Step::VarusValgusPlane,
                Step::FlexionExtensionPlane,
                Step::DistalMedialPlane,
                Step::DistalResectionPlane,
                Step::Measurements,
            ],
            downstream_of(Input::VarusValgus)
        );
    }

    #[test]
    fn flexion_extension_skips_varus_valgus_plane() {
        assert_eq!(
            vec![
                Step::FlexionExtensionPlane,
                Step::DistalMedialPlane,
                Step::DistalResectionPlane,
                Step::Measurements,
            ],
            downstream_of(Input::FlexionExtension)
        );
    }

    #[test]
    fn resection_depth_only_moves_the_cut() {
        assert_eq!(
            vec![Step::DistalResectionPlane, Step::Measurements],
            downstream_of(Input::ResectionDepth)
        );
    }
}
