use super::load_config;
use crate::output::UserOutput;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use testnet::docker::{DockerClient, DockerRuntime};
use testnet::healthcheck::wait_until_ready;
use testnet::{Error, NamedGraph, NetworkOrchestrator, PortAllocator, RunningNetwork};

const DAEMON_CHECK_TIMEOUT: Duration = Duration::from_secs(10);

pub struct UpOptions {
    pub detach: bool,
    pub no_wait: bool,
    pub json: bool,
}

pub async fn run_up(
    config_path: Option<PathBuf>,
    options: UpOptions,
    out: &dyn UserOutput,
) -> anyhow::Result<()> {
    let (path, config) = load_config(config_path)?;
    let named = config.build_graph()?;
    let policy = config.network.readiness.policy()?;

    if !DockerClient::new().daemon_healthy(DAEMON_CHECK_TIMEOUT).await {
        return Err(anyhow::anyhow!(
            "Docker daemon is not reachable. Start Docker and check `docker info`"
        ));
    }

    let runtime = DockerRuntime::from_settings(&config.network);
    let run_id = runtime.run_id().to_string();
    let range = config.network.port_range;
    let orchestrator = NetworkOrchestrator::builder()
        .runtime(Arc::new(runtime))
        .port_allocator(Arc::new(PortAllocator::new(range.start, range.end)?))
        .hostname_prefix(config.network.hostname_prefix.clone())
        .build()?;

    out.status(&format!(
        "Starting {} service(s) from {}...",
        named.graph.len(),
        path.display()
    ));

    let network = match orchestrator.create_and_run(&named.graph).await {
        Ok(network) => network,
        Err(Error::ServiceStartFailed {
            service,
            network,
            cause,
        }) => {
            out.error(&format!(
                "Service '{}' failed to start; removing {} started service(s)",
                named.name_of(service).unwrap_or("?"),
                network.len()
            ));
            if let Err(e) = orchestrator.teardown((*network).clone()).await {
                out.warning(&format!("Cleanup incomplete: {}", e));
            }
            return Err(Error::ServiceStartFailed {
                service,
                network,
                cause,
            }
            .into());
        }
        Err(e) => return Err(e.into()),
    };

    if options.json {
        println!("{}", serde_json::to_string_pretty(&network_json(&named, &network))?);
    } else {
        print_table(&named, &network, out);
    }

    if !options.no_wait {
        out.status("Waiting for terminal services to pass their liveness probe...");
        if let Err(e) = wait_until_ready(&network, &policy).await {
            if options.detach {
                out.warning("Leaving the network running for inspection");
            } else if let Err(teardown) = orchestrator.teardown(network).await {
                out.warning(&format!("Cleanup incomplete: {}", teardown));
            }
            return Err(e.into());
        }
        out.success("Network is ready");
    }

    if options.detach {
        out.status(&format!(
            "Containers left running. Remove them with: docker rm -f $(docker ps -aq --filter label=io.testnet.run={})",
            run_id
        ));
        return Ok(());
    }

    out.status("Press Ctrl-C to stop the network");
    tokio::signal::ctrl_c().await?;
    out.blank();
    out.status("Stopping network...");
    orchestrator.teardown(network).await?;
    out.success("Network stopped");

    Ok(())
}

fn network_json(named: &NamedGraph, network: &RunningNetwork) -> serde_json::Value {
    let services: Vec<serde_json::Value> = network
        .iter()
        .map(|service| {
            serde_json::json!({
                "name": named.name_of(service.id),
                "id": service.id,
                "hostname": service.hostname,
                "endpoint": service.endpoint().to_string(),
                "ports": service.port_bindings,
                "container": service.handle,
                "terminal": network.terminal_service_ids().contains(&service.id),
            })
        })
        .collect();
    serde_json::json!({ "services": services })
}

fn print_table(named: &NamedGraph, network: &RunningNetwork, out: &dyn UserOutput) {
    out.blank();
    out.status(&format!(
        "{:<4} {:<20} {:<16} {:<22} HOST PORTS",
        "ID", "NAME", "HOSTNAME", "ENDPOINT"
    ));
    for service in network.iter() {
        let ports: Vec<String> = service
            .port_bindings
            .iter()
            .map(|(internal, host)| format!("{}->{}", host, internal))
            .collect();
        out.status(&format!(
            "{:<4} {:<20} {:<16} {:<22} {}",
            service.id.to_string(),
            named.name_of(service.id).unwrap_or("?"),
            service.hostname,
            service.endpoint().to_string(),
            ports.join(", ")
        ));
    }
    out.blank();
}
