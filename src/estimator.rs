use crate::{
    decode::{Decode, Decoder},
    error::Error,
    pose::Pose,
};
use once_cell::sync::OnceCell;
use std::{sync::Arc, time::Instant};
use tracing::{error, info};

/// Something that turns one frame into zero or more poses.
pub trait PoseEstimator {
    fn estimate(&self, frame: &str) -> Result<Vec<Pose>, Error>;
}

/// Replays recorded estimator output, one record per frame.
impl PoseEstimator for Decode {
    fn estimate(&self, frame: &str) -> Result<Vec<Pose>, Error> {
        self.decode(frame)
    }
}

/// An estimator that is built on first use.
///
/// The first caller of [`LazyEstimator::get`] runs the initializer; callers
/// arriving while it runs block until it finishes and then share its
/// result. A failed initialization is not cached, so the next `get` retries.
pub struct LazyEstimator<E> {
    init: Box<dyn Fn() -> Result<E, Error> + Send + Sync>,
    estimator: OnceCell<Arc<E>>,
}

impl<E> LazyEstimator<E> {
    pub fn new<F>(init: F) -> Self
    where
        F: Fn() -> Result<E, Error> + Send + Sync + 'static,
    {
        Self {
            init: Box::new(init),
            estimator: OnceCell::new(),
        }
    }

    pub fn get(&self) -> Result<Arc<E>, Error> {
        self.estimator
            .get_or_try_init(|| {
                let start = Instant::now();
                let estimator = (self.init)()?;
                info!(
                    message = "pose estimator ready",
                    elapsed_ms = start.elapsed().as_millis() as u64
                );
                Ok(Arc::new(estimator))
            })
            .map(Arc::clone)
    }

    /// Initialize ahead of the first frame. Failures are logged, not returned;
    /// the next [`get`](Self::get) tries again.
    pub fn preload(&self) {
        if self.is_loaded() {
            return;
        }
        if let Err(e) = self.get() {
            error!(message = "failed to preload pose estimator", error = %e);
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.estimator.get().is_some()
    }

    /// Release the loaded estimator; the next `get` builds a fresh one.
    pub fn dispose(&mut self) -> Option<Arc<E>> {
        self.estimator.take()
    }
}

impl<E> PoseEstimator for LazyEstimator<E>
where
    E: PoseEstimator,
{
    fn estimate(&self, frame: &str) -> Result<Vec<Pose>, Error> {
        self.get()?.estimate(frame)
    }
}
