//! Turn one frame of recorded pose-estimator output into [`Pose`]s.

use crate::{error::Error, pose::Pose};

pub trait Decoder {
    /// Decode a single frame's record into a Vec of Pose.
    fn decode(&self, record: &str) -> Result<Vec<Pose>, Error>;
}

pub mod movenet;
pub mod named;

#[derive(Debug, Clone, Copy, structopt::StructOpt)]
pub enum Decode {
    /// Decode poses with named keypoints already in pixel coordinates
    Named(named::Decoder),
    /// Decode raw MoveNet keypoint tensors of normalized [y, x, score] rows
    Movenet(movenet::Decoder),
}

impl Default for Decode {
    fn default() -> Self {
        Self::Named(named::Decoder::default())
    }
}

impl Decoder for Decode {
    fn decode(&self, record: &str) -> Result<Vec<Pose>, Error> {
        match self {
            Self::Named(d) => d.decode(record),
            Self::Movenet(d) => d.decode(record),
        }
    }
}
