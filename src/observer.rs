//! Per-step observation of a running machine.
//!
//! After every step the machine hands a read-only [`Snapshot`] to an [`Observer`]. Observers
//! cannot influence execution; they exist for tracing, recording and display only.

use crate::tape::Tape;
use crate::types::Action;
use serde::Serialize;
use std::io::{self, Write};

/// A read-only view of the machine right after a step.
#[derive(Debug, Clone, Copy)]
pub struct Snapshot<'a> {
    /// The 1-based number of the step just taken.
    pub step: usize,
    /// The action just applied.
    pub action: Action,
    /// The state the step was taken from.
    pub state: &'a str,
    /// The state the machine moves into, `None` once halted.
    pub next_state: Option<&'a str>,
    /// The tape after the step.
    pub tape: &'a Tape,
}

impl Snapshot<'_> {
    /// Renders the tape into its cursor line and content line.
    pub fn render(&self) -> (String, String) {
        self.tape.render()
    }
}

/// Receives a snapshot after every step.
pub trait Observer {
    fn observe(&mut self, snapshot: &Snapshot<'_>);
}

/// Ignores every snapshot.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl Observer for NoopObserver {
    fn observe(&mut self, _snapshot: &Snapshot<'_>) {}
}

/// An owned copy of a [`Snapshot`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordedStep {
    pub step: usize,
    pub action: Action,
    pub state: String,
    pub next_state: Option<String>,
    pub head: usize,
    pub cursor_line: String,
    pub tape_line: String,
}

impl From<&Snapshot<'_>> for RecordedStep {
    fn from(snapshot: &Snapshot<'_>) -> Self {
        let (cursor_line, tape_line) = snapshot.render();

        Self {
            step: snapshot.step,
            action: snapshot.action,
            state: snapshot.state.to_string(),
            next_state: snapshot.next_state.map(str::to_string),
            head: snapshot.tape.head(),
            cursor_line,
            tape_line,
        }
    }
}

/// Keeps a copy of every snapshot it sees.
#[derive(Debug, Default, Clone, Serialize)]
pub struct Recorder {
    steps: Vec<RecordedStep>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn steps(&self) -> &[RecordedStep] {
        &self.steps
    }

    /// Returns the actions seen so far, in order.
    pub fn actions(&self) -> Vec<Action> {
        self.steps.iter().map(|s| s.action).collect()
    }

    pub fn into_steps(self) -> Vec<RecordedStep> {
        self.steps
    }
}

impl Observer for Recorder {
    fn observe(&mut self, snapshot: &Snapshot<'_>) {
        self.steps.push(snapshot.into());
    }
}

/// Prints a human-readable trace to any writer:
///
/// ```text
/// >> WRITE
///  *
/// 011
/// ```
///
/// Write errors cannot stop the machine, so the observer keeps the most recent one for the
/// caller to inspect.
#[derive(Debug)]
pub struct WriterObserver<W: Write> {
    writer: W,
    last_error: Option<io::Error>,
}

impl<W: Write> WriterObserver<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            last_error: None,
        }
    }

    /// Returns the most recent write error, if any.
    pub fn last_error(&self) -> Option<&io::Error> {
        self.last_error.as_ref()
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_snapshot(&mut self, snapshot: &Snapshot<'_>) -> io::Result<()> {
        let (cursor_line, tape_line) = snapshot.render();
        writeln!(self.writer, ">> {}", snapshot.action)?;
        writeln!(self.writer, "{}", cursor_line)?;
        writeln!(self.writer, "{}", tape_line)?;
        self.writer.flush()
    }
}

impl<W: Write> Observer for WriterObserver<W> {
    fn observe(&mut self, snapshot: &Snapshot<'_>) {
        if let Err(e) = self.write_snapshot(snapshot) {
            self.last_error = Some(e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(tape: &Tape) -> Snapshot<'_> {
        Snapshot {
            step: 1,
            action: Action::Write,
            state: "q1",
            next_state: Some("q2"),
            tape,
        }
    }

    #[test]
    fn test_recorder_keeps_owned_copies() {
        let tape = Tape::parse("011", 1).unwrap();
        let mut recorder = Recorder::new();

        recorder.observe(&snapshot(&tape));

        let steps = recorder.steps();
        assert_eq!(steps.len(), 1);
        assert_eq!(steps[0].state, "q1");
        assert_eq!(steps[0].next_state.as_deref(), Some("q2"));
        assert_eq!(steps[0].cursor_line, " * ");
        assert_eq!(steps[0].tape_line, "011");
        assert_eq!(recorder.actions(), vec![Action::Write]);
    }

    #[test]
    fn test_writer_observer_format() {
        let tape = Tape::parse("011", 1).unwrap();
        let mut observer = WriterObserver::new(Vec::new());

        observer.observe(&snapshot(&tape));

        assert!(observer.last_error().is_none());
        let output = String::from_utf8(observer.into_inner()).unwrap();
        assert_eq!(output, ">> WRITE\n * \n011\n");
    }

    #[test]
    fn test_writer_observer_keeps_error() {
        struct Broken;

        impl Write for Broken {
            fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
                Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
            }

            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        let tape = Tape::parse("1", 0).unwrap();
        let mut observer = WriterObserver::new(Broken);
        observer.observe(&snapshot(&tape));

        assert_eq!(
            observer.last_error().map(io::Error::kind),
            Some(io::ErrorKind::BrokenPipe)
        );
    }

    #[test]
    fn test_recorded_step_serialization() {
        let tape = Tape::parse("1", 0).unwrap();
        let step = RecordedStep::from(&snapshot(&tape));
        let json = serde_json::to_value(&step).unwrap();

        assert_eq!(json["action"], "Write");
        assert_eq!(json["tape_line"], "1");
    }
}
