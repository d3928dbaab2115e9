// src/processing/stages.rs
//! Static stage catalog and the step logic of a single processing run

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProcessingStage {
    pub label: &'static str,
    /// Percent shown while this stage is active
    pub target_progress: u8,
}

/// Targets are strictly increasing and end at 99; 100 is reserved for completion.
pub const PROCESSING_STAGES: &[ProcessingStage] = &[
    ProcessingStage { label: "Analyzing speech patterns and video content...", target_progress: 5 },
    ProcessingStage { label: "Removing background noise and silence...", target_progress: 14 },
    ProcessingStage { label: "Applying selected viral template style...", target_progress: 23 },
    ProcessingStage { label: "Generating dynamic captions...", target_progress: 38 },
    ProcessingStage { label: "Synchronizing with background music...", target_progress: 48 },
    ProcessingStage { label: "Inserting B-roll and visual transitions...", target_progress: 62 },
    ProcessingStage { label: "Optimizing color grading and quality...", target_progress: 68 },
    ProcessingStage { label: "Creating viral hooks and callouts...", target_progress: 78 },
    ProcessingStage { label: "Preparing clips for Instagram Reels...", target_progress: 88 },
    ProcessingStage { label: "Final quality check and rendering...", target_progress: 99 },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StageVisual {
    Pending,
    Active,
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    Idle,
    /// `None` is the position before the first stage
    Running { cursor: Option<usize> },
    Completed,
}

/// What one tick did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Activate {
        completed: Option<usize>,
        index: usize,
        stage: ProcessingStage,
    },
    Finish {
        completed: Option<usize>,
    },
}

/// Cursor over the stage catalog for one run
#[derive(Debug, Clone)]
pub struct ProcessingRun {
    stages: &'static [ProcessingStage],
    phase: RunPhase,
}

impl ProcessingRun {
    pub fn new(stages: &'static [ProcessingStage]) -> Self {
        Self {
            stages,
            phase: RunPhase::Idle,
        }
    }

    pub fn stages(&self) -> &'static [ProcessingStage] {
        self.stages
    }

    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    pub fn begin(&mut self) {
        self.phase = RunPhase::Running { cursor: None };
    }

    /// Advance by one tick. Returns `None` unless the run is in progress.
    pub fn step(&mut self) -> Option<Step> {
        let cursor = match self.phase {
            RunPhase::Running { cursor } => cursor,
            RunPhase::Idle | RunPhase::Completed => return None,
        };

        let next = cursor.map_or(0, |c| c + 1);
        match self.stages.get(next) {
            Some(stage) => {
                self.phase = RunPhase::Running { cursor: Some(next) };
                Some(Step::Activate {
                    completed: cursor,
                    index: next,
                    stage: *stage,
                })
            }
            None => {
                self.phase = RunPhase::Completed;
                Some(Step::Finish { completed: cursor })
            }
        }
    }
}
