pub mod decode;
pub mod error;
pub mod estimator;
pub mod gesture;
pub mod point;
pub mod pipeline;
pub mod pose;
pub mod routine;

pub use error::Error;
pub use gesture::{classify, Classifier, GestureAnalysis, GestureSet, GestureType, Thresholds};
pub use pose::{Keypoint, KeypointKind, Pose};
