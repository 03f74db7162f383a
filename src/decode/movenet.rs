use crate::{
    error::Error,
    point::Point,
    pose::{Keypoint, KeypointKind, Pose, NUM_KEYPOINTS},
};
use ndarray::{s, Array3, ArrayView3, Axis};

const DEFAULT_FRAME_WIDTH: &str = "640";
const DEFAULT_FRAME_HEIGHT: &str = "480";

/// Decodes MoveNet keypoint output: a `[poses][17][3]` JSON array of
/// `[y, x, score]` rows normalized to the unit square.
#[derive(Debug, Clone, Copy, structopt::StructOpt)]
pub struct Decoder {
    /// Width in pixels of the frame the estimator saw.
    #[structopt(short = "-W", long, default_value = DEFAULT_FRAME_WIDTH)]
    pub frame_width: u16,
    /// Height in pixels of the frame the estimator saw.
    #[structopt(short = "-H", long, default_value = DEFAULT_FRAME_HEIGHT)]
    pub frame_height: u16,
}

impl Default for Decoder {
    fn default() -> Self {
        Self {
            frame_width: 640,
            frame_height: 480,
        }
    }
}

fn to_array(nested: Vec<Vec<Vec<f32>>>) -> Result<Array3<f32>, Error> {
    let nposes = nested.len();
    let mut flat = Vec::with_capacity(nposes * NUM_KEYPOINTS * 3);

    for (pose_i, pose) in nested.into_iter().enumerate() {
        if pose.len() != NUM_KEYPOINTS {
            return Err(Error::MovenetShape(NUM_KEYPOINTS, vec![nposes, pose.len()]));
        }
        for row in pose {
            if row.len() != 3 {
                return Err(Error::RaggedMovenetPose(pose_i));
            }
            flat.extend(row);
        }
    }

    Array3::from_shape_vec((nposes, NUM_KEYPOINTS, 3), flat).map_err(Error::ConstructArray)
}

impl Decoder {
    fn reconstruct(&self, keypoints: ArrayView3<f32>) -> Result<Vec<Pose>, Error> {
        let width = f32::from(self.frame_width);
        let height = f32::from(self.frame_height);

        // single-pose models carry no pose score, use the mean keypoint score
        let pose_scores = keypoints.slice(s![.., .., 2]).mean_axis(Axis(1));

        let mut poses = Vec::with_capacity(keypoints.len_of(Axis(0)));

        for (pose_i, pose) in keypoints.axis_iter(Axis(0)).enumerate() {
            let mut keypoint_list = Vec::with_capacity(NUM_KEYPOINTS);

            for (point_i, row) in pose.axis_iter(Axis(0)).enumerate() {
                keypoint_list.push(Keypoint {
                    kind: Some(KeypointKind::from_idx(point_i)?),
                    point: Point::new(row[1], row[0])?.scaled(width, height),
                    score: row[2],
                });
            }

            poses.push(Pose {
                keypoints: keypoint_list,
                score: pose_scores.as_ref().map(|scores| scores[pose_i]),
            });
        }

        Ok(poses)
    }
}

impl super::Decoder for Decoder {
    fn decode(&self, record: &str) -> Result<Vec<Pose>, Error> {
        let nested: Vec<Vec<Vec<f32>>> =
            serde_json::from_str(record).map_err(Error::ParseRecord)?;
        let keypoints = to_array(nested)?;
        self.reconstruct(keypoints.view())
    }
}
