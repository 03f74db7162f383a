use crate::{error::Error, point::Point};
use num_traits::{FromPrimitive, ToPrimitive};
use std::{fmt, str::FromStr};

/// Body landmarks in the order single-pose estimators emit them.
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, Hash, num_derive::FromPrimitive, num_derive::ToPrimitive,
)]
pub enum KeypointKind {
    Nose,
    LeftEye,
    RightEye,
    LeftEar,
    RightEar,
    LeftShoulder,
    RightShoulder,
    LeftElbow,
    RightElbow,
    LeftWrist,
    RightWrist,
    LeftHip,
    RightHip,
    LeftKnee,
    RightKnee,
    LeftAnkle,
    RightAnkle,
}

pub const NUM_KEYPOINTS: usize = 17;

impl KeypointKind {
    pub fn from_idx(idx: usize) -> Result<Self, Error> {
        Self::from_usize(idx).ok_or(Error::ConvertUSizeToKeypointKind(idx))
    }

    pub fn idx(self) -> usize {
        // fieldless enum, discriminants are 0..NUM_KEYPOINTS
        self.to_usize().unwrap_or_default()
    }

    /// The snake_case name estimators attach to this landmark.
    pub fn name(self) -> &'static str {
        constants::NAMES[self.idx()]
    }
}

impl fmt::Display for KeypointKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Names that are not one of the seventeen landmarks are not an error:
/// estimators may emit extra points, and those are carried with `kind: None`.
impl FromStr for KeypointKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        constants::NAMES
            .iter()
            .position(|&name| name == s)
            .and_then(Self::from_usize)
            .ok_or(())
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct Keypoint {
    pub kind: Option<KeypointKind>,
    pub point: Point,
    pub score: f32,
}

impl Keypoint {
    pub fn new(kind: KeypointKind, x: f32, y: f32, score: f32) -> Result<Self, Error> {
        Ok(Self {
            kind: Some(kind),
            point: Point::new(x, y)?,
            score,
        })
    }

    /// Build a keypoint from an estimator-supplied name.
    pub fn named(name: &str, x: f32, y: f32, score: f32) -> Result<Self, Error> {
        Ok(Self {
            kind: name.parse().ok(),
            point: Point::new(x, y)?,
            score,
        })
    }
}

/// Find a landmark by kind in an unordered keypoint collection.
///
/// The first match wins; keypoints with an unrecognized name never match.
pub fn find(keypoints: &[Keypoint], kind: KeypointKind) -> Option<&Keypoint> {
    keypoints
        .iter()
        .find(|keypoint| keypoint.kind == Some(kind))
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Pose {
    pub keypoints: Vec<Keypoint>,
    pub score: Option<f32>,
}

impl Pose {
    pub fn new(keypoints: Vec<Keypoint>) -> Self {
        Self {
            keypoints,
            score: None,
        }
    }

    pub fn get(&self, kind: KeypointKind) -> Option<&Keypoint> {
        find(&self.keypoints, kind)
    }
}

pub mod constants {
    use super::NUM_KEYPOINTS;

    pub const NAMES: [&str; NUM_KEYPOINTS] = [
        "nose",
        "left_eye",
        "right_eye",
        "left_ear",
        "right_ear",
        "left_shoulder",
        "right_shoulder",
        "left_elbow",
        "right_elbow",
        "left_wrist",
        "right_wrist",
        "left_hip",
        "right_hip",
        "left_knee",
        "right_knee",
        "left_ankle",
        "right_ankle",
    ];
}
