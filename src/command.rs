//! External process execution.
//!
//! A thin wrapper over [`std::process::Command`] that runs a program to
//! completion and hands back its exit code plus whatever output was
//! captured. A non-zero exit code is *not* an error here; callers decide
//! whether it is fatal.

use std::ffi::OsStr;
use std::process::{Command, Stdio};

use crate::error::FramepostError;

/// What to do with one of the child's output streams.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StreamMode {
    /// Collect the stream into [`CommandOutput`]. This is the default.
    #[default]
    Capture,
    /// Let the child write straight to this process's stream.
    Inherit,
    /// Throw the output away.
    Discard,
}

impl StreamMode {
    fn to_stdio(self) -> Stdio {
        match self {
            StreamMode::Capture => Stdio::piped(),
            StreamMode::Inherit => Stdio::inherit(),
            StreamMode::Discard => Stdio::null(),
        }
    }
}

/// Result of a finished process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code, or `-1` when the process was terminated by a signal.
    pub code: i32,
    /// Captured standard output (empty unless captured).
    pub stdout: Vec<u8>,
    /// Captured standard error (empty unless captured).
    pub stderr: Vec<u8>,
}

impl CommandOutput {
    /// Returns `true` if the process exited with code 0.
    pub fn success(&self) -> bool {
        self.code == 0
    }

    /// Lossy UTF-8 view of stdout followed by stderr.
    pub fn combined_text(&self) -> String {
        let mut text = String::from_utf8_lossy(&self.stdout).into_owned();
        text.push_str(&String::from_utf8_lossy(&self.stderr));
        text
    }
}

/// Run `program` with `args`, capturing both stdout and stderr.
///
/// # Errors
///
/// Returns [`FramepostError::Spawn`] only if the program could not be
/// started. A program that runs and fails yields `Ok` with a non-zero code.
pub fn run_command<P, I, S>(program: P, args: I) -> Result<CommandOutput, FramepostError>
where
    P: AsRef<OsStr>,
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    run_command_with(program, args, StreamMode::Capture, StreamMode::Capture)
}

/// Run `program` with `args`, choosing how each output stream is handled.
pub fn run_command_with<P, I, S>(
    program: P,
    args: I,
    stdout: StreamMode,
    stderr: StreamMode,
) -> Result<CommandOutput, FramepostError>
where
    P: AsRef<OsStr>,
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let program = program.as_ref();
    let mut command = Command::new(program);
    command
        .args(args)
        .stdin(Stdio::null())
        .stdout(stdout.to_stdio())
        .stderr(stderr.to_stdio());

    log::debug!("Running {:?}", command);

    let output = command.output().map_err(|source| FramepostError::Spawn {
        program: program.to_string_lossy().into_owned(),
        source,
    })?;

    Ok(CommandOutput {
        code: output.status.code().unwrap_or(-1),
        stdout: output.stdout,
        stderr: output.stderr,
    })
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn captures_both_streams_and_exit_code() {
        let output = run_command("sh", ["-c", "printf out; printf err >&2; exit 3"]).unwrap();
        assert_eq!(output.code, 3);
        assert!(!output.success());
        assert_eq!(output.stdout, b"out");
        assert_eq!(output.stderr, b"err");
        assert_eq!(output.combined_text(), "outerr");
    }

    #[test]
    fn discarded_stream_is_empty() {
        let output = run_command_with(
            "sh",
            ["-c", "printf out"],
            StreamMode::Discard,
            StreamMode::Capture,
        )
        .unwrap();
        assert!(output.success());
        assert!(output.stdout.is_empty());
    }

    #[test]
    fn missing_program_is_a_spawn_error() {
        let result = run_command("framepost-no-such-program", Vec::<&str>::new());
        assert!(matches!(result, Err(FramepostError::Spawn { .. })));
    }
}
