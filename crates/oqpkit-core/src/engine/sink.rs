use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender, error::TryRecvError};

/// Where a log event came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogSource {
    Stdout,
    Stderr,
    /// The full contents of the job's log file, appended once after the process exits.
    LogFile,
}

impl fmt::Display for LogSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            LogSource::Stdout => "stdout",
            LogSource::Stderr => "stderr",
            LogSource::LogFile => "log-file",
        };
        f.write_str(label)
    }
}

/// One unit of process output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEvent {
    /// Position in the total order across all sources, assigned by the sink.
    pub sequence: u64,
    pub source: LogSource,
    /// The line (without its line terminator), or the whole file for [`LogSource::LogFile`].
    pub text: String,
}

struct SinkInner {
    next_sequence: u64,
    sender: Option<UnboundedSender<LogEvent>>,
}

/// The producer side of the event relay, shared by the reader tasks of a job.
///
/// Sequence numbers are assigned under the same lock that enqueues the event, so the
/// order in which a consumer receives events always matches their sequence numbers.
#[derive(Clone)]
pub struct LogSink {
    inner: Arc<Mutex<SinkInner>>,
}

/// The consumer side of the event relay.
pub struct LogStream {
    receiver: UnboundedReceiver<LogEvent>,
}

/// Creates a connected sink and stream.
pub fn channel() -> (LogSink, LogStream) {
    let (sender, receiver) = mpsc::unbounded_channel();
    let sink = LogSink {
        inner: Arc::new(Mutex::new(SinkInner {
            next_sequence: 0,
            sender: Some(sender),
        })),
    };
    (sink, LogStream { receiver })
}

impl LogSink {
    /// Enqueues an event and returns its sequence number.
    ///
    /// Returns `None` once the sink is closed; events pushed after closing are discarded.
    pub fn push(&self, source: LogSource, text: String) -> Option<u64> {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        let sequence = inner.next_sequence;
        let sender = inner.sender.as_ref()?;
        let event = LogEvent {
            sequence,
            source,
            text,
        };
        // A dropped stream means nobody is listening; the event is not an error then.
        let _ = sender.send(event);
        inner.next_sequence += 1;
        Some(sequence)
    }

    /// Closes the sink. Consumers still receive everything enqueued before this call.
    pub fn close(&self) {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        inner.sender = None;
    }

    pub fn is_closed(&self) -> bool {
        let inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        inner.sender.is_none()
    }
}

impl LogStream {
    /// Waits for the next event. Returns `None` once the sink is closed and drained.
    pub async fn next(&mut self) -> Option<LogEvent> {
        self.receiver.recv().await
    }

    /// Returns every event enqueued so far without waiting.
    pub fn drain(&mut self) -> Vec<LogEvent> {
        let mut events = Vec::new();
        loop {
            match self.receiver.try_recv() {
                Ok(event) => events.push(event),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn push_assigns_increasing_sequence_numbers() {
        let (sink, mut stream) = channel();
        assert_eq!(sink.push(LogSource::Stdout, "a".into()), Some(0));
        assert_eq!(sink.push(LogSource::Stderr, "b".into()), Some(1));
        assert_eq!(sink.push(LogSource::Stdout, "c".into()), Some(2));
        sink.close();

        let mut received = Vec::new();
        while let Some(event) = stream.next().await {
            received.push(event);
        }
        let sequences: Vec<_> = received.iter().map(|e| e.sequence).collect();
        assert_eq!(sequences, vec![0, 1, 2]);
        assert_eq!(received[1].source, LogSource::Stderr);
        assert_eq!(received[1].text, "b");
    }

    #[test]
    fn push_after_close_is_discarded() {
        let (sink, mut stream) = channel();
        sink.push(LogSource::Stdout, "kept".into());
        sink.close();
        assert!(sink.is_closed());
        assert_eq!(sink.push(LogSource::Stdout, "dropped".into()), None);

        let events = stream.drain();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].text, "kept");
    }

    #[test]
    fn drain_returns_empty_when_nothing_is_enqueued() {
        let (_sink, mut stream) = channel();
        assert!(stream.drain().is_empty());
    }

    #[tokio::test]
    async fn concurrent_producers_yield_total_order() {
        let (sink, mut stream) = channel();
        let mut tasks = Vec::new();
        for source in [LogSource::Stdout, LogSource::Stderr] {
            let sink = sink.clone();
            tasks.push(tokio::spawn(async move {
                for i in 0..200 {
                    sink.push(source, format!("{}", i));
                    tokio::task::yield_now().await;
                }
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }
        sink.close();

        let mut last = None;
        let mut count = 0;
        while let Some(event) = stream.next().await {
            if let Some(prev) = last {
                assert!(event.sequence > prev);
            }
            last = Some(event.sequence);
            count += 1;
        }
        assert_eq!(count, 400);
    }

    #[test]
    fn push_survives_dropped_stream() {
        let (sink, stream) = channel();
        drop(stream);
        assert_eq!(sink.push(LogSource::Stdout, "x".into()), Some(0));
    }
}
