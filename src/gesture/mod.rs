//! Per-frame gesture classification over pose keypoints.
//!
//! Every call is a pure function of the keypoints it is handed and the
//! gesture being tested; there is no state carried between frames.

use crate::{
    error::Error,
    pose::{Keypoint, Pose},
};
use std::{fmt, str::FromStr};
use tracing::trace;

mod detectors;
mod set;

pub use set::GestureSet;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GestureType {
    RubHands,
    ScrubHead,
    ScrubArms,
    ScrubArmpits,
    ScrubButt,
}

impl GestureType {
    pub const ALL: [GestureType; 5] = [
        GestureType::RubHands,
        GestureType::ScrubHead,
        GestureType::ScrubArms,
        GestureType::ScrubArmpits,
        GestureType::ScrubButt,
    ];

    pub fn tag(self) -> &'static str {
        match self {
            Self::RubHands => "rub-hands",
            Self::ScrubHead => "scrub-head",
            Self::ScrubArms => "scrub-arms",
            Self::ScrubArmpits => "scrub-armpits",
            Self::ScrubButt => "scrub-butt",
        }
    }
}

impl fmt::Display for GestureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for GestureType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|gesture| gesture.tag() == s)
            .ok_or_else(|| Error::UnknownGesture(s.to_owned()))
    }
}

/// The verdict for one frame.
///
/// `gesture` is set whenever the geometric test passed, whatever the
/// confidence; `is_active` additionally requires the confidence gate.
#[derive(Debug, Copy, Clone, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GestureAnalysis {
    pub is_active: bool,
    pub confidence: f32,
    pub gesture: Option<GestureType>,
}

impl GestureAnalysis {
    pub const fn inactive() -> Self {
        Self {
            is_active: false,
            confidence: 0.0,
            gesture: None,
        }
    }
}

impl Default for GestureAnalysis {
    fn default() -> Self {
        Self::inactive()
    }
}

/// Pixel-space thresholds. These are tuned for one camera framing and do
/// not scale with the size of the body in frame.
#[derive(Debug, Copy, Clone, PartialEq, structopt::StructOpt)]
pub struct Thresholds {
    /// Maximum wrist-to-wrist distance for rub-hands, in pixels.
    #[structopt(long, default_value = "100")]
    pub rub_hands_px: f32,

    /// Maximum wrist-to-nose distance for scrub-head, in pixels.
    #[structopt(long, default_value = "150")]
    pub scrub_head_px: f32,

    /// Maximum wrist-to-opposite-shoulder distance for scrub-arms, in pixels.
    #[structopt(long, default_value = "120")]
    pub scrub_arms_px: f32,

    /// Maximum wrist-to-hip distance for scrub-butt, in pixels.
    #[structopt(long, default_value = "200")]
    pub scrub_butt_px: f32,

    /// Confidence a matched gesture must exceed to count as active.
    #[structopt(long, default_value = "0.3")]
    pub activation: f32,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            rub_hands_px: 100.0,
            scrub_head_px: 150.0,
            scrub_arms_px: 120.0,
            scrub_butt_px: 200.0,
            activation: 0.3,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct Classifier {
    set: GestureSet,
    thresholds: Thresholds,
}

impl Classifier {
    pub fn new(set: GestureSet, thresholds: Thresholds) -> Self {
        Self { set, thresholds }
    }

    pub fn gesture_set(&self) -> GestureSet {
        self.set
    }

    pub fn supports(&self, gesture: GestureType) -> bool {
        self.set.contains(gesture)
    }

    /// Classify one frame's keypoints against `target`.
    ///
    /// Missing landmarks and gestures outside the active set both produce
    /// [`GestureAnalysis::inactive`].
    pub fn classify(&self, keypoints: &[Keypoint], target: GestureType) -> GestureAnalysis {
        if !self.supports(target) {
            trace!(message = "gesture not in active set", gesture = %target, set = %self.set);
            return GestureAnalysis::inactive();
        }

        let thresholds = &self.thresholds;
        let shape = match target {
            GestureType::RubHands => detectors::rub_hands(keypoints, thresholds),
            GestureType::ScrubHead => detectors::scrub_head(keypoints, thresholds),
            GestureType::ScrubArms => detectors::scrub_arms(keypoints, thresholds),
            GestureType::ScrubArmpits => detectors::scrub_armpits(keypoints),
            GestureType::ScrubButt => detectors::scrub_butt(keypoints, thresholds),
        };

        let analysis = match shape {
            Some(detectors::Shape {
                matched,
                confidence,
            }) => GestureAnalysis {
                is_active: matched && confidence > thresholds.activation,
                confidence,
                gesture: if matched { Some(target) } else { None },
            },
            None => GestureAnalysis::inactive(),
        };

        trace!(
            gesture = %target,
            is_active = analysis.is_active,
            confidence = analysis.confidence,
            matched = analysis.gesture.is_some()
        );

        analysis
    }

    /// Classify the primary (first) pose of a frame.
    pub fn analyze(&self, poses: &[Pose], target: Option<GestureType>) -> GestureAnalysis {
        match (poses.first(), target) {
            (Some(pose), Some(target)) => self.classify(&pose.keypoints, target),
            _ => GestureAnalysis::inactive(),
        }
    }
}

/// Classify with the default gesture set and thresholds.
pub fn classify(keypoints: &[Keypoint], target: GestureType) -> GestureAnalysis {
    Classifier::default().classify(keypoints, target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pose::KeypointKind::{self, *};
    use assert_approx_eq::assert_approx_eq;

    fn kp(kind: KeypointKind, x: f32, y: f32, score: f32) -> Keypoint {
        Keypoint::new(kind, x, y, score).unwrap()
    }

    mod rub_hands_tests {
        use super::*;

        #[test]
        fn close_wrists() {
            let keypoints = [
                kp(LeftWrist, 100.0, 100.0, 0.9),
                kp(RightWrist, 150.0, 100.0, 0.9),
            ];
            assert_eq!(
                classify(&keypoints, GestureType::RubHands),
                GestureAnalysis {
                    is_active: true,
                    confidence: 0.9,
                    gesture: Some(GestureType::RubHands),
                }
            );
        }

        #[test]
        fn far_wrists() {
            let keypoints = [
                kp(LeftWrist, 0.0, 0.0, 0.9),
                kp(RightWrist, 300.0, 300.0, 0.9),
            ];
            assert_eq!(
                classify(&keypoints, GestureType::RubHands),
                GestureAnalysis {
                    is_active: false,
                    confidence: 0.9,
                    gesture: None,
                }
            );
        }

        #[test]
        fn confidence_is_weakest_wrist() {
            let keypoints = [
                kp(LeftWrist, 100.0, 100.0, 0.8),
                kp(RightWrist, 120.0, 100.0, 0.25),
            ];
            let analysis = classify(&keypoints, GestureType::RubHands);
            assert_approx_eq!(analysis.confidence, 0.25);
            assert_eq!(analysis.gesture, Some(GestureType::RubHands));
            assert!(!analysis.is_active);
        }

        #[test]
        fn exactly_at_threshold_does_not_match() {
            let keypoints = [
                kp(LeftWrist, 0.0, 0.0, 0.9),
                kp(RightWrist, 100.0, 0.0, 0.9),
            ];
            assert_eq!(classify(&keypoints, GestureType::RubHands).gesture, None);
        }

        #[test]
        fn missing_wrist() {
            let keypoints = [kp(LeftWrist, 100.0, 100.0, 0.9)];
            assert_eq!(
                classify(&keypoints, GestureType::RubHands),
                GestureAnalysis::inactive()
            );
        }
    }

    mod scrub_head_tests {
        use super::*;

        #[test]
        fn one_wrist_near_nose() {
            let keypoints = [kp(Nose, 100.0, 100.0, 0.9), kp(LeftWrist, 120.0, 110.0, 0.5)];
            assert_eq!(
                classify(&keypoints, GestureType::ScrubHead),
                GestureAnalysis {
                    is_active: true,
                    confidence: 0.5,
                    gesture: Some(GestureType::ScrubHead),
                }
            );
        }

        #[test]
        fn confidence_is_strongest_wrist_even_if_far() {
            let keypoints = [
                kp(Nose, 100.0, 100.0, 0.9),
                kp(LeftWrist, 120.0, 110.0, 0.4),
                kp(RightWrist, 900.0, 900.0, 0.95),
            ];
            let analysis = classify(&keypoints, GestureType::ScrubHead);
            assert_approx_eq!(analysis.confidence, 0.95);
            assert!(analysis.is_active);
        }

        #[test]
        fn no_wrists() {
            let keypoints = [kp(Nose, 100.0, 100.0, 0.9)];
            assert_eq!(
                classify(&keypoints, GestureType::ScrubHead),
                GestureAnalysis::inactive()
            );
        }

        #[test]
        fn missing_nose() {
            let keypoints = [
                kp(LeftWrist, 100.0, 100.0, 0.9),
                kp(RightWrist, 100.0, 100.0, 0.9),
            ];
            assert_eq!(
                classify(&keypoints, GestureType::ScrubHead),
                GestureAnalysis::inactive()
            );
        }
    }

    mod scrub_arms_tests {
        use super::*;

        fn body(left_wrist: (f32, f32), right_wrist: (f32, f32)) -> Vec<Keypoint> {
            vec![
                kp(LeftShoulder, 400.0, 200.0, 0.9),
                kp(RightShoulder, 200.0, 200.0, 0.9),
                kp(LeftWrist, left_wrist.0, left_wrist.1, 0.6),
                kp(RightWrist, right_wrist.0, right_wrist.1, 0.7),
            ]
        }

        #[test]
        fn left_wrist_on_right_shoulder() {
            let analysis = classify(&body((210.0, 230.0), (150.0, 500.0)), GestureType::ScrubArms);
            assert!(analysis.is_active);
            assert_approx_eq!(analysis.confidence, 0.6);
        }

        #[test]
        fn right_wrist_on_left_shoulder() {
            let analysis = classify(&body((400.0, 500.0), (390.0, 240.0)), GestureType::ScrubArms);
            assert_eq!(analysis.gesture, Some(GestureType::ScrubArms));
        }

        #[test]
        fn wrists_on_own_shoulders_do_not_count() {
            let analysis = classify(&body((400.0, 260.0), (200.0, 260.0)), GestureType::ScrubArms);
            assert_eq!(analysis.gesture, None);
            assert!(!analysis.is_active);
        }

        #[test]
        fn missing_shoulder() {
            let mut keypoints = body((210.0, 230.0), (150.0, 500.0));
            keypoints.retain(|keypoint| keypoint.kind != Some(LeftShoulder));
            assert_eq!(
                classify(&keypoints, GestureType::ScrubArms),
                GestureAnalysis::inactive()
            );
        }
    }

    mod scrub_armpits_tests {
        use super::*;

        #[test]
        fn raised_hand() {
            let keypoints = [
                kp(LeftShoulder, 300.0, 200.0, 0.9),
                kp(RightShoulder, 200.0, 200.0, 0.9),
                kp(LeftWrist, 320.0, 150.0, 0.2),
                kp(RightWrist, 180.0, 400.0, 0.8),
            ];
            let analysis = classify(&keypoints, GestureType::ScrubArmpits);
            assert!(analysis.is_active);
            assert_approx_eq!(analysis.confidence, 0.8);
        }

        #[test]
        fn both_hands_lowered() {
            let keypoints = [
                kp(LeftShoulder, 300.0, 200.0, 0.9),
                kp(RightShoulder, 200.0, 200.0, 0.9),
                kp(LeftWrist, 320.0, 400.0, 0.6),
                kp(RightWrist, 180.0, 400.0, 0.7),
            ];
            let analysis = classify(&keypoints, GestureType::ScrubArmpits);
            assert_eq!(
                analysis,
                GestureAnalysis {
                    is_active: false,
                    confidence: 0.7,
                    gesture: None,
                }
            );
        }
    }

    mod scrub_butt_tests {
        use super::*;

        fn body(left_wrist: (f32, f32), right_wrist: (f32, f32)) -> Vec<Keypoint> {
            vec![
                kp(LeftShoulder, 300.0, 200.0, 0.9),
                kp(RightShoulder, 200.0, 200.0, 0.9),
                kp(LeftHip, 290.0, 450.0, 0.9),
                kp(RightHip, 210.0, 450.0, 0.9),
                kp(LeftWrist, left_wrist.0, left_wrist.1, 0.5),
                kp(RightWrist, right_wrist.0, right_wrist.1, 0.35),
            ]
        }

        #[test]
        fn hands_behind_hips() {
            let analysis = classify(&body((320.0, 480.0), (180.0, 480.0)), GestureType::ScrubButt);
            assert_eq!(
                analysis,
                GestureAnalysis {
                    is_active: true,
                    confidence: 0.5,
                    gesture: Some(GestureType::ScrubButt),
                }
            );
        }

        #[test]
        fn hands_raised_above_shoulders() {
            // near a hip is not enough when neither hand is below its shoulder
            let mut keypoints = body((320.0, 100.0), (180.0, 100.0));
            for keypoint in keypoints.iter_mut() {
                if keypoint.kind == Some(LeftHip) || keypoint.kind == Some(RightHip) {
                    *keypoint = Keypoint::new(keypoint.kind.unwrap(), 250.0, 150.0, 0.9).unwrap();
                }
            }
            assert_eq!(classify(&keypoints, GestureType::ScrubButt).gesture, None);
        }

        #[test]
        fn hands_lowered_but_far_from_hips() {
            let analysis = classify(&body((900.0, 900.0), (-600.0, 900.0)), GestureType::ScrubButt);
            assert_eq!(analysis.gesture, None);
            assert_approx_eq!(analysis.confidence, 0.5);
        }

        #[test]
        fn missing_hip() {
            let mut keypoints = body((320.0, 480.0), (180.0, 480.0));
            keypoints.retain(|keypoint| keypoint.kind != Some(RightHip));
            assert_eq!(
                classify(&keypoints, GestureType::ScrubButt),
                GestureAnalysis::inactive()
            );
        }
    }

    mod classifier_tests {
        use super::*;

        fn rubbing() -> Vec<Keypoint> {
            vec![
                kp(LeftWrist, 100.0, 100.0, 0.9),
                kp(RightWrist, 150.0, 100.0, 0.9),
            ]
        }

        #[test]
        fn gesture_outside_set_is_inactive() {
            let classifier = Classifier::new(GestureSet::Shower, Thresholds::default());
            assert_eq!(
                classifier.classify(&rubbing(), GestureType::RubHands),
                GestureAnalysis::inactive()
            );
        }

        #[test]
        fn custom_activation() {
            let thresholds = Thresholds {
                activation: 0.95,
                ..Thresholds::default()
            };
            let classifier = Classifier::new(GestureSet::All, thresholds);
            let analysis = classifier.classify(&rubbing(), GestureType::RubHands);
            assert!(!analysis.is_active);
            assert_eq!(analysis.gesture, Some(GestureType::RubHands));
        }

        #[test]
        fn analyze_uses_first_pose() {
            let classifier = Classifier::default();
            let poses = vec![
                Pose::new(rubbing()),
                Pose::new(vec![
                    kp(LeftWrist, 0.0, 0.0, 0.9),
                    kp(RightWrist, 500.0, 0.0, 0.9),
                ]),
            ];
            assert!(classifier.analyze(&poses, Some(GestureType::RubHands)).is_active);
        }

        #[test]
        fn analyze_without_poses_or_target() {
            let classifier = Classifier::default();
            assert_eq!(
                classifier.analyze(&[], Some(GestureType::RubHands)),
                GestureAnalysis::inactive()
            );
            assert_eq!(
                classifier.analyze(&[Pose::new(rubbing())], None),
                GestureAnalysis::inactive()
            );
        }

        #[test]
        fn tags_round_trip() {
            for gesture in GestureType::ALL.iter().copied() {
                assert_eq!(gesture.tag().parse::<GestureType>().unwrap(), gesture);
            }
            assert!("scrub-feet".parse::<GestureType>().is_err());
        }

        #[test]
        fn analysis_serializes_like_the_app_store() {
            let analysis = GestureAnalysis {
                is_active: true,
                confidence: 0.5,
                gesture: Some(GestureType::ScrubHead),
            };
            assert_eq!(
                serde_json::to_string(&analysis).unwrap(),
                r#"{"isActive":true,"confidence":0.5,"gesture":"scrub-head"}"#
            );
            assert_eq!(
                serde_json::to_string(&GestureAnalysis::inactive()).unwrap(),
                r#"{"isActive":false,"confidence":0.0,"gesture":null}"#
            );
        }
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        fn keypoint() -> impl Strategy<Value = Keypoint> {
            (
                0usize..crate::pose::NUM_KEYPOINTS,
                -1000.0f32..1000.0,
                -1000.0f32..1000.0,
                0.0f32..=1.0,
            )
                .prop_map(|(idx, x, y, score)| {
                    kp(KeypointKind::from_idx(idx).unwrap(), x, y, score)
                })
        }

        fn gesture() -> impl Strategy<Value = GestureType> {
            (0usize..GestureType::ALL.len()).prop_map(|idx| GestureType::ALL[idx])
        }

        proptest! {
            #[test]
            fn prop_verdict_is_consistent(
                keypoints in prop::collection::vec(keypoint(), 0..24),
                target in gesture(),
            ) {
                let analysis = classify(&keypoints, target);

                prop_assert!((0.0..=1.0).contains(&analysis.confidence));
                prop_assert!(analysis.gesture.is_none() || analysis.gesture == Some(target));
                if analysis.is_active {
                    prop_assert_eq!(analysis.gesture, Some(target));
                    prop_assert!(analysis.confidence > 0.3);
                }
                prop_assert_eq!(classify(&keypoints, target), analysis);
            }

            #[test]
            fn prop_no_wrists_never_matches(
                keypoints in prop::collection::vec(keypoint(), 0..24),
                target in gesture(),
            ) {
                let keypoints: Vec<_> = keypoints
                    .into_iter()
                    .filter(|keypoint| {
                        keypoint.kind != Some(LeftWrist) && keypoint.kind != Some(RightWrist)
                    })
                    .collect();
                let analysis = classify(&keypoints, target);
                prop_assert_eq!(analysis.gesture, None);
                prop_assert!(!analysis.is_active);
            }
        }
    }
}
