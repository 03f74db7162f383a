//! The classification stage of the frame loop: pull recorded frames off a
//! channel, estimate poses, classify, advance the routine, push updates.

use crate::{
    error::Error,
    estimator::PoseEstimator,
    gesture::{Classifier, GestureAnalysis, GestureType},
    routine::{Routine, RoutineEvent},
};
use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        mpsc::{Receiver, RecvTimeoutError, Sender},
    },
    time::Duration,
};
use tracing::warn;

/// How long a wait for the next frame lasts before `running` is checked again.
pub const POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct FrameReport {
    pub frame: usize,
    pub target: Option<GestureType>,
    pub analysis: GestureAnalysis,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Update {
    pub report: FrameReport,
    pub event: RoutineEvent,
    /// Human-readable routine status after this frame.
    pub message: String,
}

pub fn step_message(routine: &Routine) -> String {
    match routine.current_step() {
        Some(step) => format!(
            "{}: {}/{} frames",
            step.gesture,
            routine.frames(),
            step.required_frames
        ),
        None => "routine finished".to_owned(),
    }
}

/// Drives one classifier over incoming frames.
///
/// With a fixed `target` every frame is tested against it and the routine is
/// left alone; otherwise the routine picks the target and is advanced.
pub struct Stage<'a, E> {
    pub estimator: &'a E,
    pub classifier: Classifier,
    pub target: Option<GestureType>,
    pub routine: &'a mut Routine,
}

impl<'a, E> Stage<'a, E>
where
    E: PoseEstimator,
{
    fn walks_routine(&self) -> bool {
        self.target.is_none()
    }

    /// Run until `running` is cleared, the frame sender hangs up, or the
    /// routine finishes. Returns the number of frames that failed to decode.
    pub fn run(
        &mut self,
        running: &AtomicBool,
        frames: &Receiver<(usize, String)>,
        updates: &Sender<Update>,
    ) -> Result<usize, Error> {
        let mut dropped = 0_usize;

        while running.load(Ordering::SeqCst) {
            let (frame, record) = match frames.recv_timeout(POLL_INTERVAL) {
                Ok(next) => next,
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => break,
            };
            if record.is_empty() {
                continue;
            }

            let poses = match self.estimator.estimate(&record) {
                Ok(poses) => poses,
                Err(e) => {
                    warn!(message = "dropping frame", frame, error = %e);
                    dropped += 1;
                    continue;
                }
            };

            let target = self.target.or_else(|| self.routine.current_gesture());
            let analysis = self.classifier.analyze(&poses, target);
            let event = if self.walks_routine() {
                self.routine.observe(&analysis)
            } else {
                RoutineEvent::Idle
            };

            let update = Update {
                report: FrameReport {
                    frame,
                    target,
                    analysis,
                },
                event,
                message: step_message(self.routine),
            };
            updates.send(update).map_err(|_| Error::UpdatesClosed)?;

            if self.walks_routine() && self.routine.is_finished() {
                running.store(false, Ordering::SeqCst);
            }
        }

        Ok(dropped)
    }
}
