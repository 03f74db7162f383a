use crate::{
    error::Error,
    pose::{Keypoint, Pose},
};
use serde::Deserialize;

/// One landmark as a pose-detection model reports it.
///
/// A keypoint without a `score` is read as score 0.0, so any gesture that
/// needs it decodes normally but can never pass the activation cutoff.
#[derive(Debug, Deserialize)]
struct NamedKeypoint {
    #[serde(default)]
    name: Option<String>,
    x: f32,
    y: f32,
    #[serde(default)]
    score: Option<f32>,
}

#[derive(Debug, Deserialize)]
struct NamedPose {
    keypoints: Vec<NamedKeypoint>,
    #[serde(default)]
    score: Option<f32>,
}

/// Decodes a JSON array of poses, each carrying a list of
/// `{name, x, y, score}` keypoints in pixel space.
#[derive(Debug, Clone, Copy, Default, structopt::StructOpt)]
pub struct Decoder {}

impl super::Decoder for Decoder {
    fn decode(&self, record: &str) -> Result<Vec<Pose>, Error> {
        let poses: Vec<NamedPose> = serde_json::from_str(record).map_err(Error::ParseRecord)?;

        poses
            .into_iter()
            .map(|pose| {
                let keypoints = pose
                    .keypoints
                    .into_iter()
                    .map(|NamedKeypoint { name, x, y, score }| {
                        // unnamed points are kept but can never satisfy a lookup
                        Keypoint::named(
                            name.as_deref().unwrap_or_default(),
                            x,
                            y,
                            score.unwrap_or_default(),
                        )
                    })
                    .collect::<Result<Vec<_>, Error>>()?;
                Ok(Pose {
                    keypoints,
                    score: pose.score,
                })
            })
            .collect()
    }
}
