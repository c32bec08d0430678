//! stdout/stderr abstraction used by processors, with error annotation (§3, §6).
//!
//! Processors never call `println!`/`eprintln!` directly; they write through an
//! `Output` so tests can capture what a command would print and so the host
//! runtime can guarantee an error is written to stderr exactly once.

use crate::error::CommandError;
use std::io::Write;

/// A sink a `Processor` writes user-facing text to.
pub trait Output {
    /// Write a line to the standard output stream.
    fn stdout(&mut self, line: &str);
    /// Write a line to the standard error / warning stream.
    fn stderr(&mut self, line: &str);

    /// Write `err`'s message to stderr, exactly once, per §6's exit semantics.
    fn annotate_error(&mut self, err: &CommandError) {
        self.stderr(&err.to_string());
    }
}

/// An [`Output`] that writes to the process's real stdout/stderr.
#[derive(Default)]
pub struct StdOutput;

impl Output for StdOutput {
    fn stdout(&mut self, line: &str) {
        println!("{line}");
        let _ = std::io::stdout().flush();
    }

    fn stderr(&mut self, line: &str) {
        eprintln!("{line}");
        let _ = std::io::stderr().flush();
    }
}

/// An [`Output`] that records every line written, for use in tests and for the
/// shortcut subsystem's `g`/`l`/`s` commands when a host wants to inspect output
/// rather than print it directly.
#[derive(Debug, Default, Clone)]
pub struct RecordingOutput {
    pub stdout_lines: Vec<String>,
    pub stderr_lines: Vec<String>,
}

impl Output for RecordingOutput {
    fn stdout(&mut self, line: &str) {
        self.stdout_lines.push(line.to_string());
    }

    fn stderr(&mut self, line: &str) {
        self.stderr_lines.push(line.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn annotate_error_writes_stderr_once() {
        let mut output = RecordingOutput::default();
        output.annotate_error(&CommandError::Internal("boom".into()));
        assert_eq!(output.stderr_lines, vec!["internal error: boom"]);
        assert!(output.stdout_lines.is_empty());
    }
}
