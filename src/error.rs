// Allow unused_assignments at module level because thiserror's generated code
// for struct variants triggers false positive warnings - the fields ARE used
// in the Display impl but rustc's lint pass doesn't see this.
#![allow(unused_assignments)]

use crate::orchestrator::RunningNetwork;
use crate::runtime::RuntimeError;
use crate::service::ServiceId;
use miette::Diagnostic;
use std::io;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration: {0}")]
    #[diagnostic(
        code(testnet::config::validation),
        help("Run `testnet validate` for the resolved start order")
    )]
    Validation(String),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Declared a dependency on {dependency} but no service with this ID has been registered")]
    #[diagnostic(
        code(testnet::graph::invalid_dependency),
        help("Register a service before declaring other services' dependencies on it")
    )]
    InvalidDependency { dependency: ServiceId },

    #[error("Circular dependency detected: {}", .0.join(" -> "))]
    #[diagnostic(
        code(testnet::graph::circular),
        help("Services cannot depend on each other in a cycle. Review the depends_on fields")
    )]
    CyclicDependency(Vec<String>),

    #[error("No free host port left in range {start}-{end}")]
    #[diagnostic(
        code(testnet::port::exhausted),
        help("Widen network.port_range or tear down networks that still hold leases")
    )]
    PortRangeExhausted { start: u16, end: u16 },

    #[error("Failed to launch container for service {service}: {source}")]
    #[diagnostic(
        code(testnet::runtime::launch),
        help("Check that Docker is running with `docker ps` and the image is available locally")
    )]
    ContainerLaunchFailed {
        service: ServiceId,
        #[source]
        source: RuntimeError,
    },

    #[error("Failed to inspect container for service {service}: {source}")]
    #[diagnostic(code(testnet::runtime::inspect))]
    ContainerInspectFailed {
        service: ServiceId,
        #[source]
        source: RuntimeError,
    },

    #[error("Failed to tear down container for service {service}: {source}")]
    #[diagnostic(
        code(testnet::runtime::teardown),
        help("Remove leftover containers with: docker ps -a --filter label=io.testnet.managed=true")
    )]
    ContainerTeardownFailed {
        service: ServiceId,
        /// Host ports still bound by the container, left leased
        ports: Vec<u16>,
        #[source]
        source: RuntimeError,
    },

    #[error("Could not render start command for service {service}: {reason}")]
    CommandRender { service: ServiceId, reason: String },

    #[error("Service {service} failed to start: {cause}")]
    #[diagnostic(
        code(testnet::service::start_failed),
        help("Services started before the failure are still running and were returned with this error")
    )]
    ServiceStartFailed {
        service: ServiceId,
        network: Box<RunningNetwork>,
        #[source]
        cause: Box<Error>,
    },

    #[error("Service not found: {0}")]
    ServiceNotFound(ServiceId),

    #[error("Terminal services never passed their liveness probe: {}",
        .0.iter().map(|id| id.to_string()).collect::<Vec<_>>().join(", ")
    )]
    #[diagnostic(
        code(testnet::readiness::not_ready),
        help("Increase network.readiness.retries or inspect the container logs with `docker logs`")
    )]
    NotReady(Vec<ServiceId>),

    #[error("Multiple errors occurred:\n{}", .0.iter().map(|e| format!("  - {}", e)).collect::<Vec<_>>().join("\n"))]
    Multiple(Vec<Error>),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Returns a helpful suggestion for resolving this error, if available.
    pub fn suggestion(&self) -> Option<String> {
        match self {
            Error::PortRangeExhausted { start, end } => Some(format!(
                "All {} ports in {}-{} are leased. Widen network.port_range in your config.",
                u32::from(*end) - u32::from(*start) + 1,
                start,
                end
            )),
            Error::CyclicDependency(path) => Some(format!(
                "Services cannot depend on each other in a cycle. Review the depends_on fields for: {}",
                path.join(", ")
            )),
            Error::ContainerLaunchFailed { .. } | Error::ContainerInspectFailed { .. } => {
                Some("Check that Docker is running: docker ps".to_string())
            }
            Error::ContainerTeardownFailed { ports, .. } if !ports.is_empty() => Some(format!(
                "Host ports {:?} stay leased until the container is removed. Find it with: docker ps --filter label=io.testnet.managed=true",
                ports
            )),
            Error::ServiceStartFailed { cause, .. } => cause.suggestion(),
            Error::Config(_) | Error::Validation(_) | Error::Yaml(_) => {
                Some("Validate your config with: testnet validate".to_string())
            }
            Error::NotReady(_) => Some(
                "The containers started but did not answer their liveness probe. Check them with: docker logs <container>"
                    .to_string(),
            ),
            _ => None,
        }
    }

    /// Formats the error with its suggestion (if any) for user-friendly display.
    pub fn with_suggestion(&self) -> String {
        match self.suggestion() {
            Some(suggestion) => format!("{}\n\nHint: {}", self, suggestion),
            None => self.to_string(),
        }
    }

    /// The id of the service a failure is attributed to, if any.
    pub fn service_id(&self) -> Option<ServiceId> {
        match self {
            Error::ContainerLaunchFailed { service, .. }
            | Error::ContainerInspectFailed { service, .. }
            | Error::ContainerTeardownFailed { service, .. }
            | Error::CommandRender { service, .. }
            | Error::ServiceStartFailed { service, .. } => Some(*service),
            Error::ServiceNotFound(id) => Some(*id),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_failure_suggestion_comes_from_cause() {
        let err = Error::ServiceStartFailed {
            service: ServiceId::new(1),
            network: Box::default(),
            cause: Box::new(Error::PortRangeExhausted {
                start: 9000,
                end: 9001,
            }),
        };
        let hint = err.suggestion().expect("cause has a hint");
        assert!(hint.contains("All 2 ports"));
        assert_eq!(err.service_id(), Some(ServiceId::new(1)));
    }

    #[test]
    fn test_cycle_message_shows_path() {
        let err = Error::CyclicDependency(vec!["a".into(), "b".into(), "a".into()]);
        assert_eq!(err.to_string(), "Circular dependency detected: a -> b -> a");
    }

    #[test]
    fn test_with_suggestion_without_hint() {
        let err = Error::ServiceNotFound(ServiceId::new(7));
        assert_eq!(err.with_suggestion(), "Service not found: 7");
    }

    #[test]
    fn test_teardown_failure_names_the_held_ports() {
        let err = Error::ContainerTeardownFailed {
            service: ServiceId::new(0),
            ports: vec![20000, 20001],
            source: RuntimeError::rejected("device or resource busy"),
        };
        let hint = err.suggestion().expect("held ports have a hint");
        assert!(hint.contains("[20000, 20001]"));
        assert_eq!(err.service_id(), Some(ServiceId::new(0)));
    }
}
