use super::config::ToolCommand;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;
use thiserror::Error;
use tracing::{debug, trace};

const STDERR_TAIL_LINES: usize = 20;

/// The role an external program plays in the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolKind {
    GeometryConverter,
    QuantumChemistry,
    SurfaceMesher,
}

impl fmt::Display for ToolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ToolKind::GeometryConverter => "geometry converter",
            ToolKind::QuantumChemistry => "quantum-chemistry program",
            ToolKind::SurfaceMesher => "surface mesher",
        })
    }
}

/// A fully resolved command line, run inside `working_dir`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolInvocation {
    pub kind: ToolKind,
    pub program: String,
    pub args: Vec<String>,
    pub working_dir: PathBuf,
}

impl ToolInvocation {
    /// Builds an invocation from a configured command; its extra arguments come first.
    pub fn new<I, S>(kind: ToolKind, command: &ToolCommand, args: I, working_dir: &Path) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut all_args = command.extra_args.clone();
        all_args.extend(args.into_iter().map(Into::into));
        Self {
            kind,
            program: command.program.clone(),
            args: all_args,
            working_dir: working_dir.to_path_buf(),
        }
    }

    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ToolOutput {
    /// Exit code, `None` if the process was terminated by a signal.
    pub status_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Failed to launch the {kind} '{program}': {source}")]
    Spawn {
        kind: ToolKind,
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("The {kind} exited with {status} running '{command}'{}", stderr_suffix(.stderr))]
    Failed {
        kind: ToolKind,
        command: String,
        status: ExitStatusLabel,
        stderr: String,
    },
}

fn stderr_suffix(stderr: &str) -> String {
    if stderr.trim().is_empty() {
        String::new()
    } else {
        format!(":\n{}", stderr.trim_end())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitStatusLabel(pub Option<i32>);

impl fmt::Display for ExitStatusLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(code) => write!(f, "status {}", code),
            None => f.write_str("a signal"),
        }
    }
}

/// Runs external programs on behalf of the pipeline.
///
/// Implementations block until the program exits. A non-zero exit must be reported as
/// [`ToolError::Failed`].
pub trait ToolRunner {
    fn run(&self, invocation: &ToolInvocation) -> Result<ToolOutput, ToolError>;
}

/// Spawns real processes with [`std::process::Command`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemToolRunner;

impl ToolRunner for SystemToolRunner {
    fn run(&self, invocation: &ToolInvocation) -> Result<ToolOutput, ToolError> {
        debug!(
            tool = %invocation.kind,
            dir = %invocation.working_dir.display(),
            "Running: {}",
            invocation.command_line()
        );

        let output = Command::new(&invocation.program)
            .args(&invocation.args)
            .current_dir(&invocation.working_dir)
            .output()
            .map_err(|source| ToolError::Spawn {
                kind: invocation.kind,
                program: invocation.program.clone(),
                source,
            })?;

        let result = ToolOutput {
            status_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };
        trace!(tool = %invocation.kind, "stdout:\n{}", result.stdout);

        if !output.status.success() {
            return Err(ToolError::Failed {
                kind: invocation.kind,
                command: invocation.command_line(),
                status: ExitStatusLabel(result.status_code),
                stderr: tail_lines(&result.stderr, STDERR_TAIL_LINES),
            });
        }
        Ok(result)
    }
}

fn tail_lines(text: &str, n: usize) -> String {
    let lines: Vec<&str> = text.lines().collect();
    lines[lines.len().saturating_sub(n)..].join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extra_args_precede_pipeline_args() {
        let command = ToolCommand::new("psi4").with_extra_args(vec!["-n".into(), "4".into()]);
        let inv = ToolInvocation::new(
            ToolKind::QuantumChemistry,
            &command,
            ["input.dat", "output.dat"],
            Path::new("/tmp/scratch"),
        );
        assert_eq!(inv.args, vec!["-n", "4", "input.dat", "output.dat"]);
        assert_eq!(inv.command_line(), "psi4 -n 4 input.dat output.dat");
    }

    #[test]
    fn missing_program_is_a_spawn_error() {
        let dir = tempfile::tempdir().unwrap();
        let inv = ToolInvocation::new(
            ToolKind::SurfaceMesher,
            &ToolCommand::new("definitely-not-an-installed-program-7f3a"),
            Vec::<String>::new(),
            dir.path(),
        );
        assert!(matches!(
            SystemToolRunner.run(&inv),
            Err(ToolError::Spawn { .. })
        ));
    }

    #[cfg(unix)]
    #[test]
    fn non_zero_exit_is_a_failure_with_stderr() {
        let dir = tempfile::tempdir().unwrap();
        let inv = ToolInvocation::new(
            ToolKind::GeometryConverter,
            &ToolCommand::new("sh"),
            ["-c", "echo bad input >&2; exit 3"],
            dir.path(),
        );
        match SystemToolRunner.run(&inv) {
            Err(ToolError::Failed { status, stderr, .. }) => {
                assert_eq!(status, ExitStatusLabel(Some(3)));
                assert_eq!(stderr, "bad input");
            }
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn successful_run_captures_stdout_in_working_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("marker.txt"), "").unwrap();
        let inv = ToolInvocation::new(
            ToolKind::GeometryConverter,
            &ToolCommand::new("sh"),
            ["-c", "ls"],
            dir.path(),
        );
        let output = SystemToolRunner.run(&inv).unwrap();
        assert_eq!(output.status_code, Some(0));
        assert!(output.stdout.contains("marker.txt"));
    }

    #[test]
    fn tail_keeps_only_the_last_lines() {
        assert_eq!(tail_lines("a\nb\nc\n", 2), "b\nc");
        assert_eq!(tail_lines("a", 5), "a");
    }
}
