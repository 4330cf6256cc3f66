//! Execution of assembled programs by an external awk engine.
//!
//! The engine runs as a single child process. Its stdout and stderr share one
//! pipe, and that combined stream is copied line by line to our writer, so
//! engine diagnostics land wherever the data goes.

use std::io::{self, BufRead, BufReader, Write};
use std::process::{Command, ExitStatus, Stdio};
use tracing::debug;

use crate::error::{EngineError, EngineResult};

/// Input path telling the engine to read standard input.
pub const STDIN_SENTINEL: &str = "-";

/// One engine invocation: `ENGINE [-v NAME=VALUE]... PROGRAM INPUT`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub engine: String,
    pub vars: Vec<String>,
    pub program: String,
    pub input: String,
}

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// The engine exited with this status.
    Exited(i32),
    /// Our output was closed downstream (e.g. `| head`); not an error.
    OutputClosed,
}

impl RunOutcome {
    pub fn exit_code(&self) -> i32 {
        match self {
            RunOutcome::Exited(code) => *code,
            RunOutcome::OutputClosed => 0,
        }
    }
}

/// How streaming stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamEnd {
    /// The reader hit end of stream.
    Finished,
    /// The writer reported a broken pipe.
    Closed,
}

impl Invocation {
    pub fn new(
        engine: impl Into<String>,
        program: impl Into<String>,
        input: impl Into<String>,
    ) -> Self {
        Self {
            engine: engine.into(),
            vars: Vec::new(),
            program: program.into(),
            input: input.into(),
        }
    }

    /// Declare external `NAME=VALUE` variables.
    pub fn with_vars(mut self, vars: Vec<String>) -> Self {
        self.vars = vars;
        self
    }

    /// Engine arguments, excluding the engine itself.
    pub fn args(&self) -> Vec<String> {
        let mut args = Vec::with_capacity(self.vars.len() * 2 + 2);
        for var in &self.vars {
            args.push("-v".to_string());
            args.push(var.clone());
        }
        args.push(self.program.clone());
        args.push(self.input.clone());
        args
    }

    /// The full command line, space separated, for display.
    pub fn command_line(&self) -> String {
        std::iter::once(self.engine.clone())
            .chain(self.args())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Check a `-v` declaration: an awk identifier, `=`, then any value.
pub fn validate_assignment(s: &str) -> Result<String, String> {
    let (name, _) = s
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got '{}'", s))?;
    let mut chars = name.chars();
    let valid_start = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    if !valid_start || !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(format!("'{}' is not a valid awk variable name", name));
    }
    Ok(s.to_string())
}

/// Run `invocation`, streaming the engine's combined stdout and stderr into
/// `out`.
///
/// The child is always reaped before returning. When `out` reports a broken
/// pipe the engine's output pipe is closed, the engine is waited for, and the run
/// counts as [`RunOutcome::OutputClosed`].
pub fn run<W: Write>(invocation: &Invocation, out: &mut W) -> EngineResult<RunOutcome> {
    debug!(command = %invocation.command_line(), "spawning engine");

    let (reader, writer) = io::pipe()?;
    let writer_err = writer.try_clone()?;

    // the Command, and with it our copies of the write end, is dropped at the
    // end of this statement so the reader sees EOF when the engine exits
    let mut child = Command::new(&invocation.engine)
        .args(invocation.args())
        .stdin(Stdio::inherit())
        .stdout(writer)
        .stderr(writer_err)
        .spawn()
        .map_err(|source| EngineError::Spawn {
            engine: invocation.engine.clone(),
            source,
        })?;

    let streamed = stream_lines(BufReader::new(reader), out);
    // the read end is dropped by now, so a still-writing engine sees a
    // closed pipe instead of blocking forever
    let status = child.wait()?;
    debug!(?status, "engine finished");

    match streamed? {
        StreamEnd::Finished => Ok(RunOutcome::Exited(exit_code(status))),
        StreamEnd::Closed => Ok(RunOutcome::OutputClosed),
    }
}

/// Copy `reader` to `out` line by line, normalizing line endings to `\n`.
///
/// Lines are handled as bytes, so non-UTF-8 input passes through untouched.
pub fn stream_lines<R: BufRead, W: Write>(mut reader: R, out: &mut W) -> io::Result<StreamEnd> {
    let mut line = Vec::new();
    let mut count = 0usize;

    loop {
        line.clear();
        if reader.read_until(b'\n', &mut line)? == 0 {
            break;
        }
        if line.last() == Some(&b'\n') {
            line.pop();
        }
        if line.last() == Some(&b'\r') {
            line.pop();
        }
        line.push(b'\n');

        if let Err(e) = out.write_all(&line) {
            return closed_or(e);
        }
        count += 1;
    }

    if let Err(e) = out.flush() {
        return closed_or(e);
    }
    debug!(lines = count, "engine output drained");
    Ok(StreamEnd::Finished)
}

fn closed_or(e: io::Error) -> io::Result<StreamEnd> {
    if e.kind() == io::ErrorKind::BrokenPipe {
        debug!("output closed downstream");
        Ok(StreamEnd::Closed)
    } else {
        Err(e)
    }
}

#[cfg(unix)]
fn exit_code(status: ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;
    status
        .code()
        .or_else(|| status.signal().map(|sig| 128 + sig))
        .unwrap_or(1)
}

#[cfg(not(unix))]
fn exit_code(status: ExitStatus) -> i32 {
    status.code().unwrap_or(1)
}
