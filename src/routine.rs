//! The step sequence a user works through: each step names a gesture and
//! how many active frames it takes to finish it.

use crate::{
    error::Error,
    gesture::{GestureAnalysis, GestureSet, GestureType},
};
use tracing::{debug, info};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Step {
    pub gesture: GestureType,
    pub required_frames: usize,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RoutineEvent {
    /// The frame did not count toward the current step.
    Idle,
    Progress { gesture: GestureType, frames: usize },
    StepCompleted { gesture: GestureType },
    Finished,
}

#[derive(Debug, Clone)]
pub struct Routine {
    steps: Vec<Step>,
    current: usize,
    frames: usize,
}

impl Routine {
    pub fn new(steps: Vec<Step>) -> Self {
        Self {
            steps,
            current: 0,
            frames: 0,
        }
    }

    /// One step per gesture in `set`, in the set's order.
    pub fn for_set(set: GestureSet, required_frames: usize) -> Self {
        Self::new(
            set.gestures()
                .iter()
                .map(|&gesture| Step {
                    gesture,
                    required_frames,
                })
                .collect(),
        )
    }

    /// Check that every step can be classified by a classifier using `set`.
    pub fn validate(&self, set: GestureSet) -> Result<(), Error> {
        match self.steps.iter().find(|step| !set.contains(step.gesture)) {
            Some(step) => Err(Error::UnsupportedRoutineStep(step.gesture)),
            None => Ok(()),
        }
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn current_step(&self) -> Option<&Step> {
        self.steps.get(self.current)
    }

    /// The gesture the classifier should be testing for right now.
    pub fn current_gesture(&self) -> Option<GestureType> {
        self.current_step().map(|step| step.gesture)
    }

    /// Active frames accumulated toward the current step.
    pub fn frames(&self) -> usize {
        self.frames
    }

    pub fn is_finished(&self) -> bool {
        self.current >= self.steps.len()
    }

    /// Feed one frame's analysis. Only an active analysis for the current
    /// step's gesture moves the routine forward.
    pub fn observe(&mut self, analysis: &GestureAnalysis) -> RoutineEvent {
        let step = match self.current_step() {
            Some(&step) => step,
            None => return RoutineEvent::Finished,
        };

        if !(analysis.is_active && analysis.gesture == Some(step.gesture)) {
            return RoutineEvent::Idle;
        }

        self.frames += 1;
        debug!(gesture = %step.gesture, frames = self.frames, required = step.required_frames);

        if self.frames < step.required_frames {
            return RoutineEvent::Progress {
                gesture: step.gesture,
                frames: self.frames,
            };
        }

        info!(message = "step completed", gesture = %step.gesture);
        self.current += 1;
        self.frames = 0;
        RoutineEvent::StepCompleted {
            gesture: step.gesture,
        }
    }
}
