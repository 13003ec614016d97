//! Centralized Docker CLI client.
//!
//! All Docker CLI interactions go through `DockerClient`, which provides
//! consistent timeout handling, error mapping to [`RuntimeError`], and a single
//! point where `Command::new("docker")` is constructed.

use crate::runtime::RuntimeError;
use std::process::Output;
use std::time::Duration;

/// Go template printing every network address of a container, space separated.
const ADDRESS_FORMAT: &str = "{{range .NetworkSettings.Networks}}{{.IPAddress}} {{end}}";

/// Centralized client for Docker CLI operations.
#[derive(Debug, Clone, Default)]
pub struct DockerClient;

impl DockerClient {
    pub fn new() -> Self {
        DockerClient
    }

    /// Run a docker command with a timeout, returning raw Output.
    async fn run(&self, args: &[&str], timeout: Duration) -> Result<Output, RuntimeError> {
        let cmd_str = format!("docker {}", args.join(" "));
        tracing::debug!("Running {}", cmd_str);

        let result = tokio::time::timeout(
            timeout,
            tokio::process::Command::new("docker").args(args).output(),
        )
        .await;

        match result {
            Ok(Ok(output)) => Ok(output),
            Ok(Err(e)) => Err(RuntimeError::exec_failed(cmd_str, e)),
            Err(_) => Err(RuntimeError::timeout(cmd_str, timeout)),
        }
    }

    /// Run a docker command with a timeout, returning Output only if exit 0.
    async fn run_success(&self, args: &[&str], timeout: Duration) -> Result<Output, RuntimeError> {
        let output = self.run(args, timeout).await?;
        if output.status.success() {
            Ok(output)
        } else {
            let cmd_str = format!("docker {}", args.join(" "));
            Err(RuntimeError::failed(cmd_str, &output))
        }
    }

    /// Run a container in detached mode. Returns the container ID on success.
    ///
    /// `args` include everything after `docker` (e.g. `["run", "-d", ...]`).
    pub async fn run_detached(
        &self,
        args: &[String],
        timeout: Duration,
    ) -> Result<String, RuntimeError> {
        let arg_refs: Vec<&str> = args.iter().map(String::as_str).collect();
        let output = self.run_success(&arg_refs, timeout).await?;
        let id = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if id.is_empty() {
            return Err(RuntimeError::rejected("docker run printed no container id"));
        }
        Ok(id)
    }

    /// First non-empty network address of a container.
    pub async fn inspect_address(
        &self,
        container: &str,
        timeout: Duration,
    ) -> Result<String, RuntimeError> {
        let output = self
            .run_success(&["inspect", "-f", ADDRESS_FORMAT, container], timeout)
            .await?;
        parse_first_address(&String::from_utf8_lossy(&output.stdout)).ok_or_else(|| {
            RuntimeError::NoAddress {
                container: container.to_string(),
            }
        })
    }

    /// Force-remove a container. Returns `Ok(())` if container doesn't exist.
    pub async fn rm_force(&self, container: &str, timeout: Duration) -> Result<(), RuntimeError> {
        let output = self.run(&["rm", "-f", container], timeout).await?;
        if output.status.success() {
            return Ok(());
        }
        let stderr = String::from_utf8_lossy(&output.stderr);
        if stderr.contains("No such container") {
            return Ok(());
        }
        Err(RuntimeError::failed("docker rm -f", &output))
    }

    /// Stop a container with a specific grace period, then remove it.
    ///
    /// Returns whether the stop succeeded; removal is attempted either way and
    /// its failure is the error.
    pub async fn stop_and_remove(
        &self,
        container: &str,
        grace_secs: u32,
        timeout: Duration,
    ) -> Result<bool, RuntimeError> {
        let grace = grace_secs.to_string();
        let stopped = match self.run(&["stop", "-t", &grace, container], timeout).await {
            Ok(output) => output.status.success(),
            Err(e) => {
                tracing::debug!("docker stop {} failed: {}", container, e);
                false
            }
        };
        self.rm_force(container, timeout).await?;
        Ok(stopped)
    }

    /// Check if the Docker daemon is healthy.
    pub async fn daemon_healthy(&self, timeout: Duration) -> bool {
        match self
            .run(&["info", "--format", "{{.ServerVersion}}"], timeout)
            .await
        {
            Ok(o) => o.status.success(),
            Err(_) => false,
        }
    }
}

fn parse_first_address(stdout: &str) -> Option<String> {
    stdout.split_whitespace().next().map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_first_address() {
        assert_eq!(
            parse_first_address("172.18.0.4 172.17.0.2 \n"),
            Some("172.18.0.4".to_string())
        );
        assert_eq!(parse_first_address("  \n"), None);
        assert_eq!(parse_first_address(""), None);
    }

    #[tokio::test]
    async fn test_inspect_unknown_container_fails() {
        // Fails with either "no such container" or an exec error without Docker
        let result = DockerClient::new()
            .inspect_address("testnet-nonexistent-container-12345", Duration::from_secs(5))
            .await;
        assert!(result.is_err());
    }
}
