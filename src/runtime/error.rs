use std::fmt;
use std::time::Duration;

/// Structured failure reported by a [`ContainerRuntime`](super::ContainerRuntime).
///
/// The orchestrator wraps these with the id of the service being started
/// (see [`Error::ContainerLaunchFailed`](crate::Error::ContainerLaunchFailed)).
#[derive(Debug)]
pub enum RuntimeError {
    /// Runtime command timed out.
    Timeout { command: String, timeout: Duration },

    /// Runtime command ran but returned non-zero exit.
    CommandFailed {
        command: String,
        stderr: String,
        exit_code: Option<i32>,
    },

    /// Runtime binary couldn't be executed (not in PATH, permission denied).
    ExecFailed {
        command: String,
        source: std::io::Error,
    },

    /// Container doesn't exist (parsed from "No such container" stderr).
    ContainerNotFound { container: String },

    /// Container is running but reports no network address.
    NoAddress { container: String },

    /// Runtime refused the request for a reason of its own.
    Rejected(String),
}

impl RuntimeError {
    /// Create a timeout error.
    pub fn timeout(cmd: impl Into<String>, dur: Duration) -> Self {
        RuntimeError::Timeout {
            command: cmd.into(),
            timeout: dur,
        }
    }

    /// Create a command-failed error from an `std::process::Output`.
    pub fn failed(cmd: impl Into<String>, output: &std::process::Output) -> Self {
        let command = cmd.into();
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        if let Some(container) = stderr.strip_prefix("Error: No such container: ") {
            return RuntimeError::ContainerNotFound {
                container: container.trim().to_string(),
            };
        }
        RuntimeError::CommandFailed {
            command,
            stderr,
            exit_code: output.status.code(),
        }
    }

    /// Create an exec-failed error (binary not found / permission denied).
    pub fn exec_failed(cmd: impl Into<String>, err: std::io::Error) -> Self {
        RuntimeError::ExecFailed {
            command: cmd.into(),
            source: err,
        }
    }

    pub fn rejected(reason: impl Into<String>) -> Self {
        RuntimeError::Rejected(reason.into())
    }
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuntimeError::Timeout { command, timeout } => {
                write!(
                    f,
                    "Timed out running '{}' (exceeded {} seconds)",
                    command,
                    timeout.as_secs()
                )
            }
            RuntimeError::CommandFailed {
                command,
                stderr,
                exit_code,
            } => {
                if let Some(code) = exit_code {
                    write!(f, "'{}' failed (exit code {}): {}", command, code, stderr)
                } else {
                    write!(f, "'{}' failed: {}", command, stderr)
                }
            }
            RuntimeError::ExecFailed { command, source } => {
                write!(f, "Failed to execute '{}': {}", command, source)
            }
            RuntimeError::ContainerNotFound { container } => {
                write!(f, "No such container: {}", container)
            }
            RuntimeError::NoAddress { container } => {
                write!(f, "Container {} has no network address", container)
            }
            RuntimeError::Rejected(reason) => write!(f, "{}", reason),
        }
    }
}

impl std::error::Error for RuntimeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RuntimeError::ExecFailed { source, .. } => Some(source),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_command_failed_with_code() {
        let err = RuntimeError::CommandFailed {
            command: "docker run".to_string(),
            stderr: "pull access denied".to_string(),
            exit_code: Some(125),
        };
        assert_eq!(
            err.to_string(),
            "'docker run' failed (exit code 125): pull access denied"
        );
    }

    #[test]
    fn test_exec_failed_exposes_source() {
        use std::error::Error as _;
        let err = RuntimeError::exec_failed(
            "docker ps",
            std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        );
        assert!(err.source().is_some());
    }
}
