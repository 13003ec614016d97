use super::{Endpoint, LivenessProbe, ServiceDefinition, ServiceIdentity};
use crate::config::ServiceConfig;
use crate::error::{Error, Result};
use std::collections::BTreeMap;

const DEFAULT_DEPENDENCY_FORMAT: &str = "{{address}}:{{port}}";
const DEFAULT_DEPENDENCY_SEPARATOR: &str = ",";

/// Service definition whose start command comes from a `{{placeholder}}` template.
///
/// Command placeholders:
/// - `{{id}}` - numeric service id
/// - `{{hostname}}` - hostname assigned to the container
/// - `{{dependencies}}` - every dependency rendered with `dependency_format`
///   (placeholders `{{address}}` and `{{port}}`), joined with `dependency_separator`
/// - `{{dependency_probes}}` - JSON array of `{"endpoint", "probe"}` objects
#[derive(Debug, Clone)]
pub struct TemplateService {
    name: String,
    image: String,
    rpc_port: u16,
    ports: Vec<u16>,
    liveness: LivenessProbe,
    command: Vec<String>,
    dependency_format: String,
    dependency_separator: String,
}

impl TemplateService {
    pub fn from_config(name: impl Into<String>, config: &ServiceConfig) -> Self {
        Self {
            name: name.into(),
            image: config.image.clone(),
            rpc_port: config.rpc_port,
            ports: config.ports.clone(),
            liveness: config.liveness.clone(),
            command: config.command.clone(),
            dependency_format: config
                .dependency_format
                .clone()
                .unwrap_or_else(|| DEFAULT_DEPENDENCY_FORMAT.to_string()),
            dependency_separator: config
                .dependency_separator
                .clone()
                .unwrap_or_else(|| DEFAULT_DEPENDENCY_SEPARATOR.to_string()),
        }
    }

    /// Name the service was declared under in the config.
    pub fn name(&self) -> &str {
        &self.name
    }

    fn render_dependencies(
        &self,
        dependencies: &BTreeMap<Endpoint, LivenessProbe>,
    ) -> std::result::Result<String, String> {
        let mut rendered = Vec::with_capacity(dependencies.len());
        for endpoint in dependencies.keys() {
            rendered.push(render_template(&self.dependency_format, |key| match key {
                "address" => Some(endpoint.address.clone()),
                "port" => Some(endpoint.port.to_string()),
                _ => None,
            })?);
        }
        Ok(rendered.join(&self.dependency_separator))
    }
}

impl ServiceDefinition for TemplateService {
    fn image(&self) -> &str {
        &self.image
    }

    fn primary_port(&self) -> u16 {
        self.rpc_port
    }

    fn additional_ports(&self) -> &[u16] {
        &self.ports
    }

    fn liveness_probe(&self) -> LivenessProbe {
        self.liveness.clone()
    }

    fn render_start_command(
        &self,
        identity: &ServiceIdentity,
        dependencies: &BTreeMap<Endpoint, LivenessProbe>,
    ) -> Result<Vec<String>> {
        let to_error = |reason: String| Error::CommandRender {
            service: identity.id,
            reason: format!("service '{}': {}", self.name, reason),
        };

        let joined = self.render_dependencies(dependencies).map_err(to_error)?;
        let probes = serde_json::Value::Array(
            dependencies
                .iter()
                .map(|(endpoint, probe)| {
                    serde_json::json!({ "endpoint": endpoint.to_string(), "probe": probe })
                })
                .collect(),
        )
        .to_string();

        self.command
            .iter()
            .map(|token| {
                render_template(token, |key| match key {
                    "id" => Some(identity.id.to_string()),
                    "hostname" => Some(identity.hostname.clone()),
                    "dependencies" => Some(joined.clone()),
                    "dependency_probes" => Some(probes.clone()),
                    _ => None,
                })
                .map_err(to_error)
            })
            .collect()
    }
}

/// Substitute every `{{key}}` in `template` using `lookup`.
///
/// Fails on unknown keys and on a `{{` without a closing `}}`.
pub(crate) fn render_template<F>(template: &str, lookup: F) -> std::result::Result<String, String>
where
    F: Fn(&str) -> Option<String>,
{
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find("{{") {
        out.push_str(&rest[..open]);
        let after_open = &rest[open + 2..];
        let close = after_open
            .find("}}")
            .ok_or_else(|| format!("unclosed placeholder in '{}'", template))?;
        let key = after_open[..close].trim();
        let value = lookup(key).ok_or_else(|| format!("unknown placeholder '{{{{{}}}}}'", key))?;
        out.push_str(&value);
        rest = &after_open[close + 2..];
    }
    out.push_str(rest);

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::ServiceId;

    fn config(command: &[&str]) -> ServiceConfig {
        ServiceConfig {
            image: "avaplatform/avalanchego:v1.10.0".to_string(),
            rpc_port: 9650,
            ports: vec![9651],
            liveness: LivenessProbe::new("health.getLiveness", serde_json::json!({})),
            command: command.iter().map(|s| s.to_string()).collect(),
            dependency_format: Some("{{address}}:9651".to_string()),
            dependency_separator: None,
            depends_on: Vec::new(),
        }
    }

    fn identity() -> ServiceIdentity {
        ServiceIdentity {
            id: ServiceId::new(2),
            hostname: "node-2".to_string(),
        }
    }

    #[test]
    fn test_render_identity_and_dependencies() {
        let service = TemplateService::from_config(
            "node",
            &config(&[
                "/node",
                "--id={{id}}",
                "--host={{ hostname }}",
                "--bootstrap={{dependencies}}",
            ]),
        );
        let mut deps = BTreeMap::new();
        deps.insert(
            Endpoint::new("172.17.0.3", 9650),
            LivenessProbe::new("health.getLiveness", serde_json::json!({})),
        );
        deps.insert(
            Endpoint::new("172.17.0.2", 9650),
            LivenessProbe::new("health.getLiveness", serde_json::json!({})),
        );

        let command = service.render_start_command(&identity(), &deps).unwrap();
        assert_eq!(
            command,
            vec![
                "/node",
                "--id=2",
                "--host=node-2",
                "--bootstrap=172.17.0.2:9651,172.17.0.3:9651",
            ]
        );
    }

    #[test]
    fn test_render_without_dependencies_gives_empty_list() {
        let service =
            TemplateService::from_config("node", &config(&["--bootstrap={{dependencies}}"]));
        let command = service
            .render_start_command(&identity(), &BTreeMap::new())
            .unwrap();
        assert_eq!(command, vec!["--bootstrap="]);
    }

    #[test]
    fn test_render_dependency_probes_as_json() {
        let service = TemplateService::from_config("node", &config(&["{{dependency_probes}}"]));
        let mut deps = BTreeMap::new();
        deps.insert(
            Endpoint::new("10.0.0.1", 8545),
            LivenessProbe::new("eth_blockNumber", serde_json::json!([])),
        );

        let command = service.render_start_command(&identity(), &deps).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&command[0]).unwrap();
        assert_eq!(parsed[0]["endpoint"], "10.0.0.1:8545");
        assert_eq!(parsed[0]["probe"]["method"], "eth_blockNumber");
    }

    #[test]
    fn test_unknown_placeholder_is_rejected() {
        let service = TemplateService::from_config("node", &config(&["--x={{nope}}"]));
        let err = service
            .render_start_command(&identity(), &BTreeMap::new())
            .unwrap_err();
        assert!(matches!(
            err,
            Error::CommandRender { service, .. } if service == ServiceId::new(2)
        ));
        assert!(err.to_string().contains("nope"));
    }

    #[test]
    fn test_unclosed_placeholder_is_rejected() {
        let err = render_template("--host={{hostname", |_| Some(String::new())).unwrap_err();
        assert!(err.contains("unclosed"));
    }
}
