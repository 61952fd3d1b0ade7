//! Progress reporting.

use std::cell::RefCell;
use std::io::Write;

/// Receives human-readable status lines from the engine.
///
/// Progress lines are part of the user-facing output and are independent
/// of logging.
pub trait ProgressSink {
    /// Reports one status line.
    fn report(&self, message: &str);
}

impl<P: ProgressSink + ?Sized> ProgressSink for &P {
    fn report(&self, message: &str) {
        (**self).report(message);
    }
}

impl<P: ProgressSink + ?Sized> ProgressSink for Box<P> {
    fn report(&self, message: &str) {
        (**self).report(message);
    }
}

/// Where console progress goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stream {
    Stdout,
    Stderr,
}

/// Prints progress lines to the console.
#[derive(Debug, Clone, Copy)]
pub struct ConsoleProgress {
    stream: Stream,
}

impl ConsoleProgress {
    /// Prints to standard output.
    pub fn stdout() -> Self {
        Self {
            stream: Stream::Stdout,
        }
    }

    /// Prints to standard error, keeping stdout free for reports.
    pub fn stderr() -> Self {
        Self {
            stream: Stream::Stderr,
        }
    }
}

impl Default for ConsoleProgress {
    fn default() -> Self {
        Self::stdout()
    }
}

impl ProgressSink for ConsoleProgress {
    fn report(&self, message: &str) {
        // A closed console must not abort the operation
        let _ = match self.stream {
            Stream::Stdout => writeln!(std::io::stdout().lock(), "{message}"),
            Stream::Stderr => writeln!(std::io::stderr().lock(), "{message}"),
        };
    }
}

/// Discards progress lines.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn report(&self, _message: &str) {}
}

/// Collects progress lines in memory.
#[derive(Debug, Default)]
pub struct BufferProgress {
    lines: RefCell<Vec<String>>,
}

impl BufferProgress {
    /// Creates an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the lines reported so far.
    pub fn lines(&self) -> Vec<String> {
        self.lines.borrow().clone()
    }

    /// Removes and returns the lines reported so far.
    pub fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.lines.borrow_mut())
    }
}

impl ProgressSink for BufferProgress {
    fn report(&self, message: &str) {
        self.lines.borrow_mut().push(message.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffer_collects_lines() {
        let buffer = BufferProgress::new();
        let sink: &dyn ProgressSink = &buffer;
        sink.report("one");
        (&buffer).report("two");

        assert_eq!(buffer.lines(), vec!["one", "two"]);
        assert_eq!(buffer.take().len(), 2);
        assert!(buffer.lines().is_empty());
    }

    #[test]
    fn boxed_sink() {
        let sink: Box<dyn ProgressSink> = Box::new(NoProgress);
        sink.report("ignored");
    }
}
