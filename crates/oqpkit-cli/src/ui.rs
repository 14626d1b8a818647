use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use oqpkit::engine::job::{JobOutcome, JobState};
use oqpkit::engine::progress::{Progress, ProgressCallback};
use oqpkit::engine::sink::{LogEvent, LogSource};
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tracing::warn;

const SPINNER_TICK_MS: u64 = 80;
const RUNNING_MESSAGE: &str = "Running OpenQP job";

#[derive(Debug)]
pub enum UiEvent {
    Progress(Progress),
    Log(String),
}

/// Renders job progress on stderr while printing relayed output above the spinner.
pub struct UiManager {
    mp: MultiProgress,
    state: JobView,
    event_receiver: mpsc::UnboundedReceiver<UiEvent>,
    shutdown_receiver: watch::Receiver<bool>,
    _sentinel_bar: ProgressBar,
}

#[derive(Default)]
struct JobView {
    spinner: Option<ProgressBar>,
    lines_seen: u64,
}

impl UiManager {
    pub fn new() -> (Self, mpsc::UnboundedSender<UiEvent>, watch::Sender<bool>) {
        let (event_sender, event_receiver) = mpsc::unbounded_channel();
        let (shutdown_sender, shutdown_receiver) = watch::channel(false);
        let mp = MultiProgress::new();
        mp.set_draw_target(ProgressDrawTarget::stderr_with_hz(12));
        let _sentinel_bar = mp.add(ProgressBar::hidden());
        let manager = Self {
            mp,
            state: JobView::default(),
            event_receiver,
            shutdown_receiver,
            _sentinel_bar,
        };

        (manager, event_sender, shutdown_sender)
    }

    pub async fn run(mut self) {
        loop {
            tokio::select! {
                Some(event) = self.event_receiver.recv() => {
                    self.handle_event(event);
                }
                result = self.shutdown_receiver.changed() => {
                    if result.is_err() || *self.shutdown_receiver.borrow() {
                        break;
                    }
                }
            }
        }
        // Events sent right before shutdown are still rendered.
        while let Ok(event) = self.event_receiver.try_recv() {
            self.handle_event(event);
        }
        if let Some(spinner) = self.state.spinner.take() {
            spinner.finish_and_clear();
        }
        self._sentinel_bar.finish_and_clear();
    }

    fn handle_event(&mut self, event: UiEvent) {
        match event {
            UiEvent::Log(msg) => {
                self.mp.println(msg).ok();
            }
            UiEvent::Progress(progress) => self.handle_progress(progress),
        }
    }

    fn handle_progress(&mut self, progress: Progress) {
        match progress {
            Progress::JobStarted { command } => {
                if let Some(spinner) = self.state.spinner.take() {
                    spinner.finish_and_clear();
                }
                self.mp.println(format!("$ {}", command)).ok();

                let pb = self.mp.add(ProgressBar::new_spinner());
                pb.enable_steady_tick(Duration::from_millis(SPINNER_TICK_MS));
                pb.set_style(Self::spinner_style());
                pb.set_message(RUNNING_MESSAGE);

                self.state = JobView {
                    spinner: Some(pb),
                    lines_seen: 0,
                };
            }
            Progress::Output(event) => {
                self.print_output(&event);
                self.state.lines_seen += 1;
                if let Some(spinner) = self.state.spinner.as_ref() {
                    spinner.set_message(format!(
                        "{} ({} lines)",
                        RUNNING_MESSAGE, self.state.lines_seen
                    ));
                }
            }
            Progress::CancelRequested => {
                if let Some(spinner) = self.state.spinner.as_ref() {
                    spinner.set_message("Cancelling job...");
                }
            }
            Progress::JobFinished(outcome) => {
                if let Some(spinner) = self.state.spinner.take() {
                    spinner.finish_and_clear();
                }
                self.mp.println(Self::summary(&outcome)).ok();
            }
        }
    }

    fn print_output(&self, event: &LogEvent) {
        match event.source {
            LogSource::Stdout => self.mp.println(&event.text).ok(),
            LogSource::Stderr => self.mp.println(format!("! {}", event.text)).ok(),
            LogSource::LogFile => {
                self.mp.println("--- job log ---").ok();
                self.mp.println(event.text.trim_end()).ok()
            }
        };
    }

    fn summary(outcome: &JobOutcome) -> String {
        match (outcome.state, outcome.exit_code) {
            (JobState::Succeeded, _) => "✓ Job succeeded".to_string(),
            (JobState::Cancelled, _) => "✗ Job cancelled".to_string(),
            (state, Some(code)) => format!("✗ Job {} with exit code {}", state, code),
            (state, None) => format!("✗ Job {} without an exit code", state),
        }
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::with_template("{spinner:.green} {msg} [{elapsed_precise}]")
            .expect("Invalid template")
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
    }
}

#[derive(Clone)]
pub struct CliProgressHandler {
    sender: mpsc::UnboundedSender<UiEvent>,
}

impl CliProgressHandler {
    pub fn new(sender: mpsc::UnboundedSender<UiEvent>) -> Self {
        Self { sender }
    }

    pub fn get_callback(&self) -> ProgressCallback<'static> {
        let sender = self.sender.clone();
        Box::new(move |progress: Progress| {
            if let Err(e) = sender.send(UiEvent::Progress(progress)) {
                warn!("Failed to send progress update to UI channel: {}", e);
            }
        })
    }
}
