use super::command::Invocation;
use super::config::RunnerConfig;
use super::error::JobError;
use super::job::{Job, JobOutcome, JobState};
use super::sink::{self, LogSink, LogSource, LogStream};
use crate::core::io::text::{decode_text, strip_line_ending};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Child;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

// Upper bound on waiting for the readers to reach end-of-file after the process exits.
// A grandchild that inherited the pipes can keep them open indefinitely.
const READER_DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Supervises at most one running external process at a time.
///
/// The runner owns the tracked [`Job`]; starting a new job replaces the previous one once
/// it has reached a terminal state.
pub struct JobRunner {
    config: RunnerConfig,
    current: Mutex<Option<Arc<Mutex<Job>>>>,
}

impl JobRunner {
    pub fn new(config: RunnerConfig) -> Self {
        Self {
            config,
            current: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// A snapshot of the most recently started job, if any.
    pub fn current_job(&self) -> Option<Job> {
        lock(&self.current).as_ref().map(|job| lock(job).clone())
    }

    /// Launches the program on `input_path` with `working_dir` as its root directory.
    ///
    /// Must be called from within a Tokio runtime: the supervisor and the two output
    /// readers are spawned as tasks on it.
    ///
    /// # Errors
    ///
    /// - [`JobError::AlreadyRunning`] if the previously started job has not finished.
    /// - [`JobError::InvalidInput`] if `input_path` has no file name.
    /// - [`JobError::Launch`] if the process cannot be spawned (missing runtime or
    ///   executable, permission denied).
    pub fn start(&self, input_path: &Path, working_dir: &Path) -> Result<JobHandle, JobError> {
        let mut current = lock(&self.current);
        if let Some(job) = current.as_ref() {
            let job = lock(job);
            if !job.state().is_terminal() {
                return Err(JobError::AlreadyRunning {
                    input: job.input_path.clone(),
                });
            }
        }

        let launcher = self.config.launcher.for_job();
        let invocation = Invocation::build(&launcher, input_path, working_dir)?;
        let log_path = self.log_path_for(input_path, &invocation.current_dir);
        let mut job = Job::new(input_path, &invocation.current_dir, log_path.clone());

        let command_line = invocation.to_string();
        info!("Starting job with command: {}", command_line);
        debug!("Working directory: {:?}, expected log: {:?}", invocation.current_dir, log_path);

        let mut child = invocation
            .to_job_command()
            .spawn()
            .map_err(|source| JobError::Launch {
                program: invocation.program.display().to_string(),
                source,
            })?;
        job.mark_running();

        let job = Arc::new(Mutex::new(job));
        *current = Some(Arc::clone(&job));
        drop(current);

        let (log_sink, stream) = sink::channel();
        let readers = [
            spawn_reader(child.stdout.take(), LogSource::Stdout, log_sink.clone()),
            spawn_reader(child.stderr.take(), LogSource::Stderr, log_sink.clone()),
        ];
        let (cancel_tx, cancel_rx) = watch::channel(false);
        let (outcome_tx, outcome_rx) = watch::channel(None);

        let supervisor = Supervisor {
            child,
            readers,
            sink: log_sink,
            job: Arc::clone(&job),
            log_path,
            container_kill: Invocation::container_kill(&launcher),
            cancel_rx,
            outcome_tx,
        };
        tokio::spawn(supervisor.run());

        Ok(JobHandle {
            job,
            stream: Mutex::new(Some(stream)),
            cancel_tx,
            outcome_rx,
            command_line,
        })
    }

    fn log_path_for(&self, input_path: &Path, working_dir: &Path) -> PathBuf {
        let stem = input_path.file_stem().unwrap_or_default().to_string_lossy();
        working_dir.join(format!("{}.{}", stem, self.config.log_extension))
    }
}

/// The caller's view of a started job.
pub struct JobHandle {
    job: Arc<Mutex<Job>>,
    stream: Mutex<Option<LogStream>>,
    cancel_tx: watch::Sender<bool>,
    outcome_rx: watch::Receiver<Option<JobOutcome>>,
    command_line: String,
}

impl JobHandle {
    /// A snapshot of the job's current state.
    pub fn job(&self) -> Job {
        lock(&self.job).clone()
    }

    pub fn command_line(&self) -> &str {
        &self.command_line
    }

    /// Takes the job's event stream. It can be taken only once.
    ///
    /// # Errors
    ///
    /// Returns [`JobError::StreamTaken`] on every call after the first.
    pub fn stream(&self) -> Result<LogStream, JobError> {
        lock(&self.stream).take().ok_or(JobError::StreamTaken)
    }

    pub fn is_finished(&self) -> bool {
        self.outcome_rx.borrow().is_some()
    }

    /// Forcibly terminates the job and waits until it reaches a terminal state.
    ///
    /// Idempotent: calling it again, or after the process already exited, returns without
    /// side effects. Events enqueued before the kill remain readable from the stream.
    pub async fn cancel(&self) {
        if self.is_finished() {
            return;
        }
        self.cancel_tx.send_replace(true);
        self.wait().await;
    }

    /// Waits for the terminal outcome. Every call returns the same outcome.
    pub async fn wait(&self) -> JobOutcome {
        let mut outcome_rx = self.outcome_rx.clone();
        let published = outcome_rx.wait_for(Option::is_some).await.map(|o| *o);
        match published {
            Ok(Some(outcome)) => outcome,
            _ => {
                error!("Job supervisor ended without publishing an outcome.");
                JobOutcome::from_exit_code(None)
            }
        }
    }
}

struct Supervisor {
    child: Child,
    readers: [JoinHandle<()>; 2],
    sink: LogSink,
    job: Arc<Mutex<Job>>,
    log_path: PathBuf,
    container_kill: Option<Invocation>,
    cancel_rx: watch::Receiver<bool>,
    outcome_tx: watch::Sender<Option<JobOutcome>>,
}

impl Supervisor {
    async fn run(mut self) {
        let exit = tokio::select! {
            status = self.child.wait() => Some(status),
            _ = cancel_requested(&mut self.cancel_rx) => None,
        };

        let outcome = match exit {
            Some(status) => {
                self.drain_readers().await;
                match status {
                    Ok(status) => {
                        self.append_log_file().await;
                        JobOutcome::from_exit_code(status.code())
                    }
                    Err(e) => {
                        error!("Failed to collect the job's exit status: {}", e);
                        JobOutcome::from_exit_code(None)
                    }
                }
            }
            None => self.terminate().await,
        };

        self.sink.close();
        lock(&self.job).finish(outcome);
        match outcome.state {
            JobState::Succeeded => info!("Job completed successfully."),
            JobState::Cancelled => info!("Job cancelled."),
            _ => warn!("Job failed with exit code {:?}.", outcome.exit_code),
        }
        self.outcome_tx.send_replace(Some(outcome));
    }

    async fn terminate(&mut self) -> JobOutcome {
        info!("Cancellation requested; killing the job process group.");
        self.kill_process_group();
        if let Some(kill) = &self.container_kill {
            debug!("Stopping container with: {}", kill);
            match kill.to_command().status().await {
                Ok(status) if status.success() => {}
                Ok(status) => warn!("'{}' exited with {}", kill, status),
                Err(e) => warn!("Failed to run '{}': {}", kill, e),
            }
        }
        let status = self.child.wait().await;
        for reader in &self.readers {
            reader.abort();
        }
        let exit_code = status.ok().and_then(|s| s.code());
        JobOutcome::cancelled(exit_code)
    }

    #[cfg(unix)]
    fn kill_process_group(&mut self) {
        use nix::sys::signal::{Signal, killpg};
        use nix::unistd::Pid;

        // The child leads its own group, so its pid is the group id.
        let Some(pid) = self.child.id() else {
            return;
        };
        match i32::try_from(pid) {
            Ok(pgid) => {
                if let Err(e) = killpg(Pid::from_raw(pgid), Signal::SIGKILL) {
                    warn!("Failed to signal process group {}: {}", pgid, e);
                    self.kill_child();
                }
            }
            Err(_) => self.kill_child(),
        }
    }

    #[cfg(not(unix))]
    fn kill_process_group(&mut self) {
        self.kill_child();
    }

    fn kill_child(&mut self) {
        if let Err(e) = self.child.start_kill() {
            warn!("Failed to signal the job process: {}", e);
        }
    }

    async fn drain_readers(&mut self) {
        for reader in &mut self.readers {
            match tokio::time::timeout(READER_DRAIN_TIMEOUT, &mut *reader).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => warn!("Output reader task failed: {}", e),
                Err(_) => {
                    warn!("Output stream still open after the job exited; closing it.");
                    reader.abort();
                }
            }
        }
    }

    async fn append_log_file(&self) {
        if !self.log_path.is_file() {
            debug!("No log file at {:?}", self.log_path);
            return;
        }
        match tokio::fs::read(&self.log_path).await {
            Ok(bytes) => {
                self.sink.push(LogSource::LogFile, decode_text(bytes));
            }
            Err(e) => warn!("Failed to read log file {:?}: {}", self.log_path, e),
        }
    }
}

async fn cancel_requested(cancel_rx: &mut watch::Receiver<bool>) {
    if cancel_rx.wait_for(|cancelled| *cancelled).await.is_err() {
        // The handle was dropped without cancelling; the job runs to completion.
        std::future::pending::<()>().await;
    }
}

fn spawn_reader<R>(stream: Option<R>, source: LogSource, sink: LogSink) -> JoinHandle<()>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let Some(stream) = stream else {
            return;
        };
        let mut reader = BufReader::new(stream);
        let mut buffer = Vec::new();
        loop {
            match reader.read_until(b'\n', &mut buffer).await {
                Ok(0) => break,
                Ok(_) => {
                    let mut line = decode_text(std::mem::take(&mut buffer));
                    strip_line_ending(&mut line);
                    sink.push(source, line);
                }
                Err(e) => {
                    warn!("Failed to read job {}: {}", source, e);
                    break;
                }
            }
        }
    })
}
