//! Whitelisted command execution for package inventory queries

use std::collections::HashSet;
use std::io::{self, Read};
use std::process::{Command, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// PATH handed to every child process
const RESTRICTED_PATH: &str = "/usr/bin:/bin:/usr/sbin:/sbin";

/// Runs whitelisted programs with a cleared environment and a timeout
#[derive(Debug, Clone)]
pub struct CommandExecutor {
    default_timeout: Duration,
    allowed_commands: HashSet<String>,
}

impl CommandExecutor {
    /// Create executor with empty whitelist - must be configured before use
    pub fn new() -> Self {
        Self::with_timeout(Duration::from_secs(5))
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            default_timeout: timeout,
            allowed_commands: HashSet::new(),
        }
    }

    pub fn allow_command(&mut self, command: impl Into<String>) {
        self.allowed_commands.insert(command.into());
    }

    pub fn allow_commands(&mut self, commands: &[&str]) {
        for cmd in commands {
            self.allowed_commands.insert(cmd.to_string());
        }
    }

    pub fn is_allowed(&self, command: &str) -> bool {
        self.allowed_commands.contains(command)
    }

    pub fn default_timeout(&self) -> Duration {
        self.default_timeout
    }

    /// Run `program` and capture its output
    ///
    /// A non-zero exit status is not an error here; callers interpret it.
    pub fn execute(
        &self,
        program: &str,
        args: &[&str],
        timeout: Option<Duration>,
    ) -> Result<CommandOutput, CommandError> {
        if !self.is_allowed(program) {
            return Err(CommandError::SecurityViolation {
                reason: format!("Command '{}' not in whitelist", program),
            });
        }

        let timeout_duration = timeout.unwrap_or(self.default_timeout);
        let start = Instant::now();

        let mut child = Command::new(program)
            .args(args)
            .env_clear()
            .env("PATH", RESTRICTED_PATH)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => CommandError::ProgramNotFound {
                    program: program.to_string(),
                },
                std::io::ErrorKind::PermissionDenied => CommandError::PermissionDenied {
                    program: program.to_string(),
                },
                _ => CommandError::ExecutionFailed {
                    program: program.to_string(),
                    reason: e.to_string(),
                },
            })?;

        // Pipes are drained while waiting so a chatty child never blocks on a full pipe
        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());

        let status = wait_timeout::ChildExt::wait_timeout(&mut child, timeout_duration)
            .map_err(|e| CommandError::ExecutionFailed {
                program: program.to_string(),
                reason: e.to_string(),
            })?;

        let Some(status) = status else {
            let _ = child.kill();
            let _ = child.wait();
            return Err(CommandError::Timeout {
                program: program.to_string(),
                timeout_ms: timeout_duration.as_millis() as u64,
            });
        };

        let collect = |reader: JoinHandle<io::Result<Vec<u8>>>| -> Result<String, CommandError> {
            let bytes = reader
                .join()
                .unwrap_or_else(|_| Err(io::Error::other("output reader panicked")))
                .map_err(|e| CommandError::ExecutionFailed {
                    program: program.to_string(),
                    reason: e.to_string(),
                })?;
            Ok(String::from_utf8_lossy(&bytes).into_owned())
        };

        Ok(CommandOutput {
            stdout: collect(stdout)?,
            stderr: collect(stderr)?,
            exit_code: status.code().unwrap_or(-1),
            duration: start.elapsed(),
        })
    }
}

/// Read a child pipe to the end on its own thread
fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> JoinHandle<io::Result<Vec<u8>>> {
    thread::spawn(move || {
        let mut buffer = Vec::new();
        if let Some(mut pipe) = pipe {
            pipe.read_to_end(&mut buffer)?;
        }
        Ok(buffer)
    })
}

impl Default for CommandExecutor {
    fn default() -> Self {
        Self::new()
    }
}

/// Captured command output
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
    pub duration: Duration,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Non-empty trimmed stdout lines
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.stdout.lines().map(str::trim).filter(|l| !l.is_empty())
    }
}

/// Command execution errors
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("Program not found: {program}")]
    ProgramNotFound { program: String },

    #[error("Execution failed for '{program}': {reason}")]
    ExecutionFailed { program: String, reason: String },

    #[error("Command '{program}' timed out after {timeout_ms}ms")]
    Timeout { program: String, timeout_ms: u64 },

    #[error("Permission denied: {program}")]
    PermissionDenied { program: String },

    #[error("Security violation: {reason}")]
    SecurityViolation { reason: String },
}
