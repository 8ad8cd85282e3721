//! In-memory log capture for one donation session.
//!
//! A [`LogSink`] collects formatted log lines in a shared buffer. The flow
//! installs the sink's [`Dispatch`] as the default subscriber only while it
//! runs, so sessions never touch each other's logs. Events are passed on to
//! the subscriber that was in place when the session was created, so a
//! global console subscriber keeps printing while logs are captured.

use std::io;
use std::sync::{Arc, Mutex};

use tracing::{Dispatch, Event, Subscriber};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

/// Shared buffer of formatted log output.
#[derive(Debug, Clone, Default)]
pub struct LogSink {
    buffer: Arc<Mutex<Vec<u8>>>,
}

/// Hands every event on to another dispatcher.
struct Forward {
    outer: Dispatch,
}

impl<S: Subscriber> Layer<S> for Forward {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if self.outer.enabled(event.metadata()) {
            self.outer.event(event);
        }
    }
}

impl LogSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a subscriber that only writes into this sink.
    pub fn dispatch(&self) -> Dispatch {
        self.dispatch_with(Dispatch::none())
    }

    /// Builds a subscriber that writes plain text lines into this sink and
    /// forwards every event to `outer`.
    pub fn dispatch_with(&self, outer: Dispatch) -> Dispatch {
        let capture = tracing_subscriber::fmt::layer()
            .with_writer(self.clone())
            .with_ansi(false)
            .with_target(false);
        let subscriber = tracing_subscriber::registry()
            .with(capture)
            .with(Forward { outer })
            .with(LevelFilter::DEBUG);
        Dispatch::new(subscriber)
    }

    /// Returns the captured lines.
    pub fn lines(&self) -> Vec<String> {
        self.buffer
            .lock()
            .map(|buffer| {
                String::from_utf8_lossy(&buffer)
                    .lines()
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.lock().map(|b| b.is_empty()).unwrap_or(true)
    }
}

impl io::Write for LogSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut buffer = self
            .buffer
            .lock()
            .map_err(|_| io::Error::other("log buffer poisoned"))?;
        buffer.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogSink {
    type Writer = LogSink;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_captures_only_while_installed() {
        let sink = LogSink::new();
        let dispatch = sink.dispatch();

        tracing::dispatcher::with_default(&dispatch, || {
            tracing::info!(step = 1, "inside session");
        });
        tracing::info!("outside session");

        let lines = sink.lines();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("inside session"));
        assert!(lines[0].contains("step=1"));
    }

    #[test]
    fn test_sessions_are_isolated() {
        let first = LogSink::new();
        let second = LogSink::new();

        tracing::dispatcher::with_default(&first.dispatch(), || tracing::warn!("first"));
        tracing::dispatcher::with_default(&second.dispatch(), || tracing::warn!("second"));

        assert!(first.lines().iter().all(|l| !l.contains("second")));
        assert!(second.lines().iter().all(|l| !l.contains("first")));
    }

    #[test]
    fn test_outer_subscriber_keeps_receiving() {
        let console = LogSink::new();
        let session = LogSink::new();

        tracing::dispatcher::with_default(&console.dispatch(), || {
            let outer = tracing::dispatcher::get_default(Dispatch::clone);
            let inner = session.dispatch_with(outer);
            tracing::dispatcher::with_default(&inner, || tracing::info!("captured twice"));
        });

        assert_eq!(session.lines().len(), 1);
        assert_eq!(console.lines().len(), 1);
        assert!(console.lines()[0].contains("captured twice"));
    }

    #[test]
    fn test_empty_sink() {
        let sink = LogSink::new();
        assert!(sink.is_empty());
        assert!(sink.lines().is_empty());
    }
}
