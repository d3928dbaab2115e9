// src/processing/mod.rs
//! Simulated editing pipeline: walks the stage catalog on a timer, drives the progress
//! widget, and finally hands the user a (placeholder) finished video.

use crate::conversation::state::{ConversationState, Role, SharedSession};
use crate::presentation::{Presenter, ProcessingView, ViewError};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

pub mod stages;

use stages::{ProcessingRun, StageVisual, Step, PROCESSING_STAGES};

/// Shortest tick the timer accepts; zero periods are raised to this
pub const MIN_TICK_PERIOD: Duration = Duration::from_millis(1);

pub const COMPLETION_STATUS: &str = "✅ Video Editing Complete!";

pub const RESULT_MESSAGE: &str = "Your Viral Video is ready! 🎉\n\n\
    ➡️ Click to View Final Edit | ⬇️ Download Video (MP4)";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulatorConfig {
    pub tick_period: Duration,
    /// Pause between hitting 100% and posting the result message
    pub final_delay: Duration,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            tick_period: Duration::from_millis(800),
            final_delay: Duration::from_millis(1000),
        }
    }
}

/// Spawned timer task; dropping it stops the task
struct ScheduledTask {
    run_id: u64,
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl Drop for ScheduledTask {
    fn drop(&mut self) {
        self.cancel.cancel();
        self.handle.abort();
    }
}

/// Owns at most one processing run at a time
pub struct ProcessingSimulator {
    config: SimulatorConfig,
    presenter: Arc<dyn Presenter>,
    session: SharedSession,
    /// Id of the run allowed to touch the view. Ticks apply their effects while holding it,
    /// so a superseded run can never interleave with a newer one.
    generation: Arc<Mutex<u64>>,
    task: Option<ScheduledTask>,
}

impl ProcessingSimulator {
    pub fn new(config: SimulatorConfig, presenter: Arc<dyn Presenter>, session: SharedSession) -> Self {
        Self {
            config,
            presenter,
            session,
            generation: Arc::new(Mutex::new(0)),
            task: None,
        }
    }

    /// Start a fresh run, cancelling any run already in progress
    pub fn start(&mut self) -> Result<(), ViewError> {
        self.cancel();

        let (run_id, view) = {
            let mut generation = lock_generation(&self.generation);
            *generation += 1;
            let view = self.presenter.render_processing_view(PROCESSING_STAGES)?;
            (*generation, view)
        };

        let mut run = ProcessingRun::new(PROCESSING_STAGES);
        run.begin();

        let cancel = CancellationToken::new();
        let driver = RunDriver {
            run_id,
            run,
            view,
            config: self.config,
            generation: self.generation.clone(),
            presenter: self.presenter.clone(),
            session: self.session.clone(),
            cancel: cancel.clone(),
        };
        let handle = tokio::spawn(driver.drive());

        tracing::info!("🎬 Started processing run {} ({} stages)", run_id, PROCESSING_STAGES.len());
        self.task = Some(ScheduledTask { run_id, cancel, handle });
        Ok(())
    }

    /// Stop the current run, if any. Its pending ticks and result message are discarded.
    pub fn cancel(&mut self) {
        let mut generation = lock_generation(&self.generation);
        *generation += 1;
        if let Some(task) = self.task.take() {
            tracing::debug!("⏹️ Cancelled processing run {}", task.run_id);
        }
    }

    pub fn is_running(&self) -> bool {
        self.task
            .as_ref()
            .map_or(false, |task| !task.handle.is_finished())
    }
}

fn lock_generation(generation: &Mutex<u64>) -> std::sync::MutexGuard<'_, u64> {
    generation.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

struct RunDriver {
    run_id: u64,
    run: ProcessingRun,
    view: Box<dyn ProcessingView>,
    config: SimulatorConfig,
    generation: Arc<Mutex<u64>>,
    presenter: Arc<dyn Presenter>,
    session: SharedSession,
    cancel: CancellationToken,
}

impl RunDriver {
    async fn drive(mut self) {
        let period = self.config.tick_period.max(MIN_TICK_PERIOD);
        let mut ticker = tokio::time::interval_at(Instant::now() + period, period);

        loop {
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return,
                _ = ticker.tick() => {}
            }

            let outcome = {
                let generation = lock_generation(&self.generation);
                if *generation != self.run_id {
                    return;
                }
                apply_step(&mut self.run, self.view.as_mut())
            };

            match outcome {
                Ok(false) => continue,
                Ok(true) => break,
                Err(e) => {
                    tracing::warn!("Processing run {} stopped: {}", self.run_id, e);
                    return;
                }
            }
        }

        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => return,
            _ = tokio::time::sleep(self.config.final_delay) => {}
        }

        let mut session = self.session.lock().await;
        let generation = lock_generation(&self.generation);
        if *generation != self.run_id {
            return;
        }
        session.record(Role::Assistant, RESULT_MESSAGE);
        session.transition(ConversationState::Finished);
        self.presenter.append_assistant_message(RESULT_MESSAGE);
        tracing::info!("✅ Processing run {} finished", self.run_id);
    }
}

/// One tick's view updates. `Ok(true)` once the bar has reached 100%.
fn apply_step(run: &mut ProcessingRun, view: &mut dyn ProcessingView) -> Result<bool, ViewError> {
    match run.step() {
        Some(Step::Activate { completed, index, stage }) => {
            if let Some(previous) = completed {
                view.update_stage(previous, StageVisual::Completed)?;
            }
            view.update_stage(index, StageVisual::Active)?;
            view.update_progress(stage.target_progress, &format!("🎬 {}", stage.label))?;
            Ok(false)
        }
        Some(Step::Finish { completed }) => {
            if let Some(previous) = completed {
                view.update_stage(previous, StageVisual::Completed)?;
            }
            view.update_progress(100, COMPLETION_STATUS)?;
            Ok(true)
        }
        None => Ok(true),
    }
}
