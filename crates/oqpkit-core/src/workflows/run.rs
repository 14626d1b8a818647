use crate::engine::error::JobError;
use crate::engine::job::{Job, JobOutcome};
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::runner::JobRunner;
use crate::engine::sink::LogStream;
use std::future::Future;
use std::path::Path;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, instrument};

#[derive(Debug, Clone)]
pub struct JobReport {
    pub job: Job,
    pub outcome: JobOutcome,
    /// Number of [`Progress::Output`] events forwarded to the reporter.
    pub events_delivered: usize,
}

/// Runs one job to completion, forwarding its output to `reporter`.
///
/// The event stream is drained on the runner's `drain_interval` tick. When
/// `cancel_signal` resolves, the job is killed and the workflow still returns normally
/// with a `Cancelled` outcome. Every event enqueued before termination is delivered
/// before [`Progress::JobFinished`].
///
/// # Errors
///
/// Returns the [`JobError`] from [`JobRunner::start`] if the job cannot be launched.
/// A job that runs and fails is not an error; inspect [`JobReport::outcome`].
#[instrument(skip_all, name = "run_workflow", fields(input = %input_path.display()))]
pub async fn run<F>(
    runner: &JobRunner,
    input_path: &Path,
    working_dir: &Path,
    reporter: &ProgressReporter<'_>,
    cancel_signal: F,
) -> Result<JobReport, JobError>
where
    F: Future<Output = ()>,
{
    let handle = runner.start(input_path, working_dir)?;
    let mut stream = handle.stream()?;
    reporter.report(Progress::JobStarted {
        command: handle.command_line().to_string(),
    });

    let mut ticker = tokio::time::interval(runner.config().drain_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    tokio::pin!(cancel_signal);
    let mut cancel_armed = true;
    let mut events_delivered = 0;

    let outcome = loop {
        tokio::select! {
            outcome = handle.wait() => break outcome,
            _ = &mut cancel_signal, if cancel_armed => {
                cancel_armed = false;
                info!("Cancellation signal received.");
                reporter.report(Progress::CancelRequested);
                handle.cancel().await;
            }
            _ = ticker.tick() => {
                events_delivered += forward_pending(&mut stream, reporter);
            }
        }
    };
    events_delivered += forward_pending(&mut stream, reporter);
    debug!("Delivered {} output event(s).", events_delivered);

    reporter.report(Progress::JobFinished(outcome));
    Ok(JobReport {
        job: handle.job(),
        outcome,
        events_delivered,
    })
}

fn forward_pending(stream: &mut LogStream, reporter: &ProgressReporter) -> usize {
    let events = stream.drain();
    let count = events.len();
    for event in events {
        reporter.report(Progress::Output(event));
    }
    count
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::engine::config::{Launcher, RunnerConfigBuilder};
    use crate::engine::job::JobState;
    use crate::engine::sink::LogSource;
    use std::path::PathBuf;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    fn sh_runner() -> JobRunner {
        let config = RunnerConfigBuilder::new()
            .launcher(Launcher::Direct {
                program: PathBuf::from("sh"),
                args: vec![],
            })
            .drain_interval(Duration::from_millis(5))
            .build()
            .unwrap();
        JobRunner::new(config)
    }

    fn recording_reporter(log: Arc<Mutex<Vec<Progress>>>) -> ProgressReporter<'static> {
        ProgressReporter::with_callback(Box::new(move |p: Progress| log.lock().unwrap().push(p)))
    }

    #[tokio::test]
    async fn run_forwards_all_output_between_start_and_finish() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("job.sh");
        std::fs::write(&script, "echo one\necho two >&2\necho three\nexit 0\n").unwrap();
        let runner = sh_runner();
        let log = Arc::new(Mutex::new(Vec::new()));
        let reporter = recording_reporter(log.clone());

        let report = run(
            &runner,
            &script,
            dir.path(),
            &reporter,
            std::future::pending(),
        )
        .await
        .unwrap();

        assert_eq!(report.outcome.state, JobState::Succeeded);
        assert_eq!(report.events_delivered, 3);
        assert_eq!(report.job.state(), JobState::Succeeded);

        let log = log.lock().unwrap();
        assert!(matches!(log.first(), Some(Progress::JobStarted { .. })));
        assert!(matches!(log.last(), Some(Progress::JobFinished(o)) if o.is_success()));
        let outputs: Vec<_> = log
            .iter()
            .filter_map(|p| match p {
                Progress::Output(e) => Some(e),
                _ => None,
            })
            .collect();
        assert_eq!(outputs.len(), 3);
        assert!(outputs.windows(2).all(|w| w[0].sequence < w[1].sequence));
        assert!(outputs.iter().any(|e| e.source == LogSource::Stderr && e.text == "two"));
    }

    #[tokio::test]
    async fn run_cancels_job_when_signal_fires() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("long.sh");
        std::fs::write(&script, "echo started\nexec sleep 30\n").unwrap();
        let runner = sh_runner();
        let log = Arc::new(Mutex::new(Vec::new()));
        let reporter = recording_reporter(log.clone());

        let report = tokio::time::timeout(
            Duration::from_secs(10),
            run(
                &runner,
                &script,
                dir.path(),
                &reporter,
                tokio::time::sleep(Duration::from_millis(300)),
            ),
        )
        .await
        .unwrap()
        .unwrap();

        assert_eq!(report.outcome.state, JobState::Cancelled);
        let log = log.lock().unwrap();
        assert!(log.iter().any(|p| matches!(p, Progress::CancelRequested)));
        assert!(
            log.iter()
                .any(|p| matches!(p, Progress::Output(e) if e.text == "started"))
        );
    }

    #[tokio::test]
    async fn run_reports_failed_outcome_without_error() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("fail.sh");
        std::fs::write(&script, "exit 7\n").unwrap();
        let runner = sh_runner();

        let report = run(
            &runner,
            &script,
            dir.path(),
            &ProgressReporter::new(),
            std::future::pending(),
        )
        .await
        .unwrap();

        assert_eq!(report.outcome.state, JobState::Failed);
        assert_eq!(report.outcome.exit_code, Some(7));
        assert_eq!(report.events_delivered, 0);
    }
}
