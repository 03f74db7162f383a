use crate::gesture::GestureType;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to construct NotNan from f32: {1}")]
    ConstructNotNan(#[source] ordered_float::FloatIsNan, f32),

    #[error("failed to convert usize value to keypoint kind: {0}")]
    ConvertUSizeToKeypointKind(usize),

    #[error("failed to parse estimator output as JSON")]
    ParseRecord(#[source] serde_json::Error),

    #[error("failed to construct array from movenet output")]
    ConstructArray(#[source] ndarray::ShapeError),

    #[error("expected movenet keypoints with shape (_, {0}, 3), got {1:?}")]
    MovenetShape(usize, Vec<usize>),

    #[error("movenet pose {0} has a ragged keypoint row")]
    RaggedMovenetPose(usize),

    #[error("unknown gesture: {0}")]
    UnknownGesture(String),

    #[error("unknown gesture set: {0}")]
    UnknownGestureSet(String),

    #[error("gesture {0} is not part of the active gesture set")]
    UnsupportedRoutineStep(GestureType),

    #[error("failed to initialize pose estimator: {0}")]
    InitializeEstimator(String),

    #[error("frame updates receiver hung up")]
    UpdatesClosed,
}
