use super::load_config;
use crate::output::UserOutput;
use std::path::PathBuf;

pub fn run_validate(config_path: Option<PathBuf>, out: &dyn UserOutput) -> anyhow::Result<()> {
    let (path, config) = load_config(config_path)?;
    let named = config.build_graph()?;
    let graph = &named.graph;
    let name = |id| named.name_of(id).unwrap_or("?").to_string();

    out.success(&format!("{} is valid", path.display()));
    out.blank();

    out.status(&format!("Start order ({} services):", graph.len()));
    for (position, &id) in graph.start_order().iter().enumerate() {
        let deps: Vec<String> = graph
            .dependencies(id)
            .into_iter()
            .flatten()
            .map(|&dep| name(dep))
            .collect();
        let image = config
            .services
            .get(&name(id))
            .map(|s| s.image.as_str())
            .unwrap_or("?");
        if deps.is_empty() {
            out.status(&format!("  {}. {} [{}] ({})", position + 1, name(id), id, image));
        } else {
            out.status(&format!(
                "  {}. {} [{}] ({}) after {}",
                position + 1,
                name(id),
                id,
                image,
                deps.join(", ")
            ));
        }
    }

    out.blank();
    out.status("Start waves:");
    for (level, wave) in graph.start_waves().iter().enumerate() {
        let names: Vec<String> = wave.iter().map(|&id| name(id)).collect();
        out.status(&format!("  {}: {}", level, names.join(", ")));
    }

    let terminal: Vec<String> = graph.terminal_service_ids().iter().map(|&id| name(id)).collect();
    out.blank();
    out.status(&format!("Readiness is checked on: {}", terminal.join(", ")));

    let range = config.network.port_range;
    let needed: usize = config.services.values().map(|s| s.port_count()).sum();
    out.status(&format!(
        "Host ports: {} needed from {}-{} ({} available)",
        needed,
        range.start,
        range.end,
        range.len()
    ));

    Ok(())
}
