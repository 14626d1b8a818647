use std::fmt;
use std::path::{Path, PathBuf};

/// Lifecycle state of a job.
///
/// `Pending → Running → {Succeeded, Failed, Cancelled}`. The three terminal states are
/// final; a job never leaves them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum JobState {
    #[default]
    Pending,
    Running,
    Succeeded,
    Failed,
    Cancelled,
}

impl JobState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            JobState::Succeeded | JobState::Failed | JobState::Cancelled
        )
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            JobState::Pending => "pending",
            JobState::Running => "running",
            JobState::Succeeded => "succeeded",
            JobState::Failed => "failed",
            JobState::Cancelled => "cancelled",
        };
        f.write_str(label)
    }
}

/// The terminal result of a job: its final state and the process exit code.
///
/// `exit_code` is `None` when the process was terminated by a signal (including a
/// cancellation kill) or its status could not be collected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JobOutcome {
    pub state: JobState,
    pub exit_code: Option<i32>,
}

impl JobOutcome {
    /// Outcome of a process that exited on its own: `Succeeded` iff the exit code is zero.
    pub fn from_exit_code(exit_code: Option<i32>) -> Self {
        let state = if exit_code == Some(0) {
            JobState::Succeeded
        } else {
            JobState::Failed
        };
        Self { state, exit_code }
    }

    pub fn cancelled(exit_code: Option<i32>) -> Self {
        Self {
            state: JobState::Cancelled,
            exit_code,
        }
    }

    pub fn is_success(&self) -> bool {
        self.state == JobState::Succeeded
    }
}

/// One supervised run of the external program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub input_path: PathBuf,
    pub working_dir: PathBuf,
    /// The log file the program is expected to write, `<working_dir>/<stem>.<ext>`.
    pub log_path: PathBuf,
    state: JobState,
    exit_code: Option<i32>,
}

impl Job {
    pub(crate) fn new(input_path: &Path, working_dir: &Path, log_path: PathBuf) -> Self {
        Self {
            input_path: input_path.to_path_buf(),
            working_dir: working_dir.to_path_buf(),
            log_path,
            state: JobState::Pending,
            exit_code: None,
        }
    }

    /// The job name, taken from the input artifact's file stem.
    pub fn name(&self) -> String {
        self.input_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    pub fn state(&self) -> JobState {
        self.state
    }

    /// The exit code, present only once the job is in a terminal state.
    pub fn exit_code(&self) -> Option<i32> {
        self.exit_code
    }

    pub(crate) fn mark_running(&mut self) {
        if self.state == JobState::Pending {
            self.state = JobState::Running;
        }
    }

    pub(crate) fn finish(&mut self, outcome: JobOutcome) {
        if self.state.is_terminal() {
            return;
        }
        self.state = outcome.state;
        self.exit_code = outcome.exit_code;
    }
}
