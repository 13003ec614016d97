use std::io::Write;

/// Abstraction over user-facing output.
///
/// Command modules use this trait instead of `println!`/`eprintln!` so that
/// progress chatter can be suppressed when stdout carries JSON.
pub trait UserOutput: Send + Sync {
    /// Informational status message (e.g., "Starting 3 services...")
    fn status(&self, message: &str);

    /// Success message (e.g., "Network is ready")
    fn success(&self, message: &str);

    /// Warning message (e.g., "Failed to remove container")
    fn warning(&self, message: &str);

    /// Error message
    fn error(&self, message: &str);

    /// A blank line separator.
    fn blank(&self);
}

/// Standard CLI output: status to stdout, problems to stderr.
pub struct CliOutput;

impl UserOutput for CliOutput {
    fn status(&self, message: &str) {
        println!("{}", message);
    }

    fn success(&self, message: &str) {
        println!("\x1b[32m{}\x1b[0m", message);
    }

    fn warning(&self, message: &str) {
        eprintln!("\x1b[33m{}\x1b[0m", message);
    }

    fn error(&self, message: &str) {
        eprintln!("\x1b[31m{}\x1b[0m", message);
    }

    fn blank(&self) {
        println!();
        std::io::stdout().flush().ok();
    }
}

/// Output for `--json`: stdout is reserved for the JSON document, so status
/// lines are dropped and problems still go to stderr.
pub struct JsonModeOutput;

impl UserOutput for JsonModeOutput {
    fn status(&self, _message: &str) {}
    fn success(&self, _message: &str) {}

    fn warning(&self, message: &str) {
        eprintln!("{}", message);
    }

    fn error(&self, message: &str) {
        eprintln!("{}", message);
    }

    fn blank(&self) {}
}
