use super::Thresholds;
use crate::pose::{find, Keypoint, KeypointKind::*};

/// Outcome of a purely geometric test. `None` from a detector means a
/// required landmark was missing and nothing was evaluated.
#[derive(Debug, Copy, Clone, PartialEq)]
pub(super) struct Shape {
    pub(super) matched: bool,
    pub(super) confidence: f32,
}

fn within(a: &Keypoint, b: &Keypoint, max_px: f32) -> bool {
    a.point.distance(b.point) < max_px
}

fn above(a: &Keypoint, b: &Keypoint) -> bool {
    a.point.is_above(b.point)
}

fn below(a: &Keypoint, b: &Keypoint) -> bool {
    a.point.is_below(b.point)
}

pub(super) fn rub_hands(keypoints: &[Keypoint], thresholds: &Thresholds) -> Option<Shape> {
    let left_wrist = find(keypoints, LeftWrist)?;
    let right_wrist = find(keypoints, RightWrist)?;

    Some(Shape {
        matched: within(left_wrist, right_wrist, thresholds.rub_hands_px),
        confidence: left_wrist.score.min(right_wrist.score),
    })
}

/// Only the nose is required; either wrist near it is enough.
pub(super) fn scrub_head(keypoints: &[Keypoint], thresholds: &Thresholds) -> Option<Shape> {
    let nose = find(keypoints, Nose)?;
    let wrists = [find(keypoints, LeftWrist), find(keypoints, RightWrist)];

    let matched = wrists
        .iter()
        .flatten()
        .any(|wrist| within(wrist, nose, thresholds.scrub_head_px));
    let confidence = wrists
        .iter()
        .flatten()
        .map(|wrist| wrist.score)
        .fold(0.0, f32::max);

    Some(Shape {
        matched,
        confidence,
    })
}

/// A wrist on the opposite shoulder.
pub(super) fn scrub_arms(keypoints: &[Keypoint], thresholds: &Thresholds) -> Option<Shape> {
    let left_wrist = find(keypoints, LeftWrist)?;
    let right_wrist = find(keypoints, RightWrist)?;
    let left_shoulder = find(keypoints, LeftShoulder)?;
    let right_shoulder = find(keypoints, RightShoulder)?;

    let max_px = thresholds.scrub_arms_px;
    Some(Shape {
        matched: within(left_wrist, right_shoulder, max_px)
            || within(right_wrist, left_shoulder, max_px),
        confidence: left_wrist.score.min(right_wrist.score),
    })
}

/// A hand raised above its own shoulder.
pub(super) fn scrub_armpits(keypoints: &[Keypoint]) -> Option<Shape> {
    let left_wrist = find(keypoints, LeftWrist)?;
    let right_wrist = find(keypoints, RightWrist)?;
    let left_shoulder = find(keypoints, LeftShoulder)?;
    let right_shoulder = find(keypoints, RightShoulder)?;

    Some(Shape {
        matched: above(left_wrist, left_shoulder) || above(right_wrist, right_shoulder),
        confidence: left_wrist.score.max(right_wrist.score),
    })
}

/// A hand lowered below its shoulder and close to either hip.
pub(super) fn scrub_butt(keypoints: &[Keypoint], thresholds: &Thresholds) -> Option<Shape> {
    let left_wrist = find(keypoints, LeftWrist)?;
    let right_wrist = find(keypoints, RightWrist)?;
    let left_hip = find(keypoints, LeftHip)?;
    let right_hip = find(keypoints, RightHip)?;
    let left_shoulder = find(keypoints, LeftShoulder)?;
    let right_shoulder = find(keypoints, RightShoulder)?;

    let hands_lowered = below(left_wrist, left_shoulder) || below(right_wrist, right_shoulder);

    let max_px = thresholds.scrub_butt_px;
    let near_hips = [left_wrist, right_wrist]
        .iter()
        .any(|wrist| within(wrist, left_hip, max_px) || within(wrist, right_hip, max_px));

    Some(Shape {
        matched: hands_lowered && near_hips,
        confidence: left_wrist.score.max(right_wrist.score),
    })
}
