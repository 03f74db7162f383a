use anyhow::{Context, Result};
use groom_pose::{
    decode::Decode,
    estimator::LazyEstimator,
    pipeline::{Stage, Update},
    routine::{Routine, RoutineEvent, Step},
    Classifier, GestureSet, GestureType, Thresholds,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::{
    fs::File,
    io::{self, BufRead, BufReader, Write},
    path::PathBuf,
    sync::{
        atomic::{AtomicBool, Ordering},
        mpsc::{channel, Receiver},
        Arc,
    },
    time::{Duration, Instant},
};
use structopt::StructOpt;
use tracing::{debug, info, warn};
use tracing_subscriber::layer::SubscriberExt;

#[derive(structopt::StructOpt)]
struct Opt {
    /// Recorded pose-estimator output, one JSON record per frame. Reads stdin when omitted.
    #[structopt(short, long)]
    input: Option<PathBuf>,

    /// Gestures the classifier evaluates: tutorial, shower or all.
    #[structopt(short, long, default_value = "all")]
    gesture_set: GestureSet,

    /// Test this gesture on every frame instead of walking through a routine.
    #[structopt(short, long)]
    target: Option<GestureType>,

    /// Active frames needed to finish each routine step.
    #[structopt(short = "-n", long, default_value = "30")]
    routine_frames: usize,

    /// Comma-separated routine steps. Defaults to every gesture in the set.
    #[structopt(long, use_delimiter = true)]
    steps: Vec<GestureType>,

    #[structopt(flatten)]
    thresholds: Thresholds,

    #[structopt(short, long, default_value = "info", env = "RUST_LOG")]
    log_level: tracing_subscriber::filter::EnvFilter,

    #[structopt(short, long)]
    show_progress: bool,

    #[structopt(subcommand)]
    decoder: Option<Decode>,
}

fn open_input(path: Option<&PathBuf>) -> Result<Box<dyn BufRead + Send>> {
    Ok(match path {
        Some(path) => Box::new(BufReader::new(
            File::open(path).with_context(|| format!("failed to open {}", path.display()))?,
        )),
        None => Box::new(BufReader::new(io::stdin())),
    })
}

fn build_routine(opt: &Opt) -> Routine {
    if opt.steps.is_empty() {
        return Routine::for_set(opt.gesture_set, opt.routine_frames);
    }
    Routine::new(
        opt.steps
            .iter()
            .map(|&gesture| Step {
                gesture,
                required_frames: opt.routine_frames,
            })
            .collect(),
    )
}

fn write_reports(updates: Receiver<Update>, pb_step: Option<&ProgressBar>) -> Result<usize> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut nframes = 0_usize;

    while let Ok(Update {
        report,
        event,
        message,
    }) = updates.recv()
    {
        serde_json::to_writer(&mut out, &report).context("failed writing report")?;
        writeln!(out).context("failed writing report")?;
        nframes += 1;

        match event {
            RoutineEvent::StepCompleted { gesture } => {
                info!(message = "step done", %gesture, frame = report.frame)
            }
            RoutineEvent::Progress { .. } | RoutineEvent::Idle | RoutineEvent::Finished => {
                debug!(frame = report.frame, is_active = report.analysis.is_active)
            }
        }

        if let Some(pb_step) = pb_step {
            pb_step.set_prefix(format!("frame {}", report.frame));
            pb_step.set_message(message);
            pb_step.inc(1);
        }
    }

    if let Some(pb_step) = pb_step {
        pb_step.finish();
    }
    out.flush().context("failed flushing reports")?;
    Ok(nframes)
}

fn main() -> Result<()> {
    let opt = Opt::from_args();
    let mut routine = build_routine(&opt);

    tracing::subscriber::set_global_default(
        tracing_subscriber::registry()
            .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
            .with(opt.log_level),
    )?;

    let classifier = Classifier::new(opt.gesture_set, opt.thresholds);
    let target = opt.target;

    match target {
        Some(target) => {
            if !classifier.supports(target) {
                warn!(
                    message = "target is outside the gesture set, every frame will be inactive",
                    gesture = %target,
                    set = %opt.gesture_set
                );
            }
        }
        None => {
            let gesture_set = opt.gesture_set;
            routine
                .validate(classifier.gesture_set())
                .with_context(|| format!("invalid routine for gesture set {}", gesture_set))?
        }
    }

    info!(
        message = "starting",
        set = %opt.gesture_set,
        steps = routine.steps().len(),
        gesture = ?target
    );

    let decoder = opt.decoder.unwrap_or_default();
    let estimator = Arc::new(LazyEstimator::new(move || Ok(decoder)));

    let running = Arc::new(AtomicBool::new(true));
    let running_ctrl_c = running.clone();

    ctrlc::set_handler(move || {
        running_ctrl_c.store(false, Ordering::SeqCst);
    })
    .context("failed setting Ctrl-C handler")?;

    let pb_step = if opt.show_progress {
        Some(
            ProgressBar::new_spinner().with_style(
                ProgressStyle::default_spinner()
                    .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
                    .template("{prefix:.bold.dim} {spinner} {wide_msg}"),
            ),
        )
    } else {
        None
    };

    let mut input = open_input(opt.input.as_ref())?;
    let (frames_tx, frames_rx) = channel();
    let (updates_tx, updates_rx) = channel();

    // stdin reads can block past Ctrl-C, so the reader is not joined
    std::thread::spawn(move || {
        let mut line = String::new();
        let mut frame = 0_usize;
        loop {
            line.clear();
            match input.read_line(&mut line) {
                Ok(0) => break,
                Ok(_) => {
                    if frames_tx.send((frame, line.trim().to_owned())).is_err() {
                        break;
                    }
                    frame += 1;
                }
                Err(e) => {
                    warn!(message = "failed reading frame", error = %e);
                    break;
                }
            }
        }
    });

    let start = Instant::now();

    crossbeam::thread::scope(|scope| {
        let estimator_preload = estimator.clone();
        scope.spawn(move |_| estimator_preload.preload());

        let running_classify = running.clone();
        let classify = scope.spawn(move |_| {
            Stage {
                estimator: &*estimator,
                classifier,
                target,
                routine: &mut routine,
            }
            .run(&running_classify, &frames_rx, &updates_tx)
        });

        let running_report = running.clone();
        let report = scope.spawn(move |_| {
            let written = write_reports(updates_rx, pb_step.as_ref());
            if written.is_err() {
                running_report.store(false, Ordering::SeqCst);
            }
            written
        });

        let nframes = report
            .join()
            .map_err(|_| anyhow::anyhow!("report thread panicked"))??;
        let dropped = classify
            .join()
            .map_err(|_| anyhow::anyhow!("classifier thread panicked"))??;

        let elapsed = start.elapsed().max(Duration::from_micros(1));
        info!(
            message = "done",
            frames = nframes,
            dropped,
            fps = nframes as f64 / elapsed.as_secs_f64()
        );
        Ok(())
    })
    .map_err(|_| anyhow::anyhow!("pipeline thread panicked"))?
}
