//! Launching phpcs / phpcbf over stdin and stdout.
//!
//! The invoker never looks at what the tool printed. Deciding whether the
//! output means "issues", "no issues" or "the tool broke" is the job of
//! [`crate::interpret`].

use std::fmt;
use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};
use std::time::Instant;

use tracing::{debug, info};

use crate::config::{ReportFormat, Settings};
use crate::error::{Result, SnifferError};

/// Marker phpcs recognises on the first stdin line to learn the file path.
pub const INPUT_FILE_MARKER: &str = "phpcs_input_file: ";

/// Which tool to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RunMode {
    /// `phpcs`: report problems.
    Check,
    /// `phpcbf`: rewrite the file.
    Fix,
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunMode::Check => f.write_str("check"),
            RunMode::Fix => f.write_str("fix"),
        }
    }
}

/// A fully resolved argv.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandLine {
    /// Builds argv for `mode`:
    /// `[php] tool [--standard=..] [--report=.. [--report-width=..]] extra..`.
    /// The report flags only apply to check mode.
    pub fn for_mode(mode: RunMode, file_path: &Path, settings: &Settings) -> Self {
        let tool = match mode {
            RunMode::Check => settings.phpcs_path.clone(),
            RunMode::Fix => settings.phpcbf_path.clone(),
        };

        let (program, mut args) = match settings.php_path.as_deref() {
            Some(php) if !php.trim().is_empty() => (php.to_owned(), vec![tool]),
            _ => (tool, Vec::new()),
        };

        if let Some(standard) = settings.standard_for(file_path) {
            args.push(format!("--standard={standard}"));
        }

        if mode == RunMode::Check {
            match (settings.report_format, settings.report_path.as_deref()) {
                (ReportFormat::Plugin, Some(path)) => {
                    args.push(format!("--report={}", path.display()));
                }
                _ => {
                    args.push("--report=full".to_owned());
                    args.push(format!("--report-width={}", settings.report_width));
                }
            }
        }

        args.extend(settings.additional_args.iter().cloned());
        Self { program, args }
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Everything the tool left behind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawOutput {
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    /// `None` when the process was killed by a signal.
    pub exit_code: Option<i32>,
}

/// Builds the bytes written to the tool's stdin.
pub fn stdin_payload(content: &str, file_path: &Path, settings: &Settings) -> String {
    if settings.send_input_path {
        format!("{INPUT_FILE_MARKER}{}\n{content}", file_path.display())
    } else {
        content.to_owned()
    }
}

/// Runs the tool for `mode` on `content` and collects its output.
///
/// stdin is fed from a helper thread while this thread drains stdout and
/// stderr, so large buffers cannot deadlock on full pipes.
///
/// # Errors
///
/// [`SnifferError::ProcessLaunch`] if the binary cannot be started,
/// [`SnifferError::ProcessIo`] if the pipes fail. A non-zero exit status is
/// not an error here.
pub fn invoke(
    mode: RunMode,
    content: &str,
    file_path: &Path,
    settings: &Settings,
) -> Result<RawOutput> {
    let command = CommandLine::for_mode(mode, file_path, settings);
    run_command(&command, stdin_payload(content, file_path, settings))
}

/// Spawns `command`, writes `input` to it, and waits for it to exit.
///
/// # Errors
///
/// See [`invoke`].
pub fn run_command(command: &CommandLine, input: String) -> Result<RawOutput> {
    debug!(%command, "spawning tool");
    let started = Instant::now();
    let program = command.program.clone();

    let mut child = Command::new(&command.program)
        .args(&command.args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|source| SnifferError::ProcessLaunch {
            program: program.clone(),
            source,
        })?;

    let writer = child.stdin.take().map(|mut stdin| {
        std::thread::spawn(move || {
            // Closing stdin on drop signals EOF to the tool.
            stdin.write_all(input.as_bytes())
        })
    });

    let output = child
        .wait_with_output()
        .map_err(|source| SnifferError::ProcessIo {
            program: program.clone(),
            source,
        })?;

    if let Some(writer) = writer {
        match writer.join() {
            Ok(Ok(())) => {}
            // The tool may legitimately stop reading early (e.g. it bailed
            // out on bad arguments); its output still tells the story.
            Ok(Err(e)) if e.kind() == std::io::ErrorKind::BrokenPipe => {
                debug!(%program, "tool closed stdin early");
            }
            Ok(Err(source)) => return Err(SnifferError::ProcessIo { program, source }),
            Err(_) => {
                return Err(SnifferError::ProcessIo {
                    program,
                    source: std::io::Error::other("stdin writer panicked"),
                })
            }
        }
    }

    info!(
        %program,
        exit_code = ?output.status.code(),
        stdout_bytes = output.stdout.len(),
        stderr_bytes = output.stderr.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "tool finished"
    );

    Ok(RawOutput {
        stdout: output.stdout,
        stderr: output.stderr,
        exit_code: output.status.code(),
    })
}
