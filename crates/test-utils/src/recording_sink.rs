use std::sync::Mutex;

use bootstrapper::sink::OutputSink;

/// One call made on a [`RecordingSink`], in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedEvent {
    Message(String),
    Warning(String),
    Output(String),
    Error(String),
}

/// A sink that records every call so tests can assert on them.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<RecordedEvent>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<RecordedEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Captured stdout lines, in order.
    pub fn output_lines(&self) -> Vec<String> {
        self.collect(|e| match e {
            RecordedEvent::Output(l) => Some(l.clone()),
            _ => None,
        })
    }

    /// Captured stderr lines, in order.
    pub fn error_lines(&self) -> Vec<String> {
        self.collect(|e| match e {
            RecordedEvent::Error(l) => Some(l.clone()),
            _ => None,
        })
    }

    pub fn messages(&self) -> Vec<String> {
        self.collect(|e| match e {
            RecordedEvent::Message(m) => Some(m.clone()),
            _ => None,
        })
    }

    pub fn warnings(&self) -> Vec<String> {
        self.collect(|e| match e {
            RecordedEvent::Warning(m) => Some(m.clone()),
            _ => None,
        })
    }

    /// Position of the first message containing `needle`, across all events.
    pub fn position_of_message(&self, needle: &str) -> Option<usize> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .position(|e| matches!(e, RecordedEvent::Message(m) if m.contains(needle)))
    }

    fn collect<F>(&self, f: F) -> Vec<String>
    where
        F: Fn(&RecordedEvent) -> Option<String>,
    {
        self.events.lock().unwrap().iter().filter_map(f).collect()
    }

    fn push(&self, event: RecordedEvent) {
        self.events.lock().unwrap().push(event);
    }
}

impl OutputSink for RecordingSink {
    fn log_message(&self, message: &str) {
        self.push(RecordedEvent::Message(message.to_string()));
    }

    fn log_output(&self, line: &str) {
        self.push(RecordedEvent::Output(line.to_string()));
    }

    fn log_error(&self, line: &str) {
        self.push(RecordedEvent::Error(line.to_string()));
    }

    fn log_warning(&self, message: &str) {
        self.push(RecordedEvent::Warning(message.to_string()));
    }
}
