use crate::error::{Error, Result};
use std::collections::{BTreeMap, BTreeSet};

/// Order named services so that every service follows all of its dependencies.
///
/// `depends_on[A] = [B, C]` means A depends on B and C. Uses Kahn's algorithm;
/// among services whose dependencies are all placed, the smallest name goes
/// first, so the result is deterministic.
///
/// # Errors
///
/// - [`Error::Validation`] if a dependency names an undeclared service
/// - [`Error::CyclicDependency`] with the cycle path if the relation has a cycle
pub fn declaration_order(depends_on: &BTreeMap<String, Vec<String>>) -> Result<Vec<String>> {
    let mut in_degree: BTreeMap<&str, usize> = BTreeMap::new();
    // `reverse[A] = [B, C]` means B and C depend on A
    let mut reverse: BTreeMap<&str, Vec<&str>> = BTreeMap::new();

    for (name, deps) in depends_on {
        let unique: BTreeSet<&str> = deps.iter().map(String::as_str).collect();
        for dep in &unique {
            if !depends_on.contains_key(*dep) {
                return Err(Error::Validation(format!(
                    "Service '{}' depends on undeclared service '{}'",
                    name, dep
                )));
            }
            reverse.entry(*dep).or_default().push(name.as_str());
        }
        in_degree.insert(name.as_str(), unique.len());
    }

    let mut ready: BTreeSet<&str> = in_degree
        .iter()
        .filter(|(_, &degree)| degree == 0)
        .map(|(&name, _)| name)
        .collect();

    let mut result = Vec::with_capacity(depends_on.len());
    while let Some(name) = ready.pop_first() {
        result.push(name.to_string());

        for dependent in reverse.get(name).into_iter().flatten() {
            if let Some(degree) = in_degree.get_mut(dependent) {
                *degree -= 1;
                if *degree == 0 {
                    ready.insert(*dependent);
                }
            }
        }
    }

    if result.len() != depends_on.len() {
        return Err(Error::CyclicDependency(find_cycle(depends_on)));
    }

    Ok(result)
}

/// Find a cycle and return it as a path that starts and ends on the same service.
fn find_cycle(depends_on: &BTreeMap<String, Vec<String>>) -> Vec<String> {
    let mut visited = BTreeSet::new();
    let mut path = Vec::new();

    for name in depends_on.keys() {
        if !visited.contains(name.as_str()) {
            if let Some(cycle) = find_cycle_dfs(depends_on, name, &mut visited, &mut path) {
                return cycle;
            }
        }
    }

    // Unreachable when Kahn's algorithm left nodes behind
    depends_on.keys().take(3).cloned().collect()
}

fn find_cycle_dfs<'a>(
    depends_on: &'a BTreeMap<String, Vec<String>>,
    node: &'a str,
    visited: &mut BTreeSet<&'a str>,
    path: &mut Vec<&'a str>,
) -> Option<Vec<String>> {
    visited.insert(node);
    path.push(node);

    for dep in depends_on.get(node).into_iter().flatten() {
        if let Some(start) = path.iter().position(|n| *n == dep.as_str()) {
            let mut cycle: Vec<String> = path[start..].iter().map(|s| s.to_string()).collect();
            cycle.push(dep.clone());
            return Some(cycle);
        }
        if !visited.contains(dep.as_str()) {
            if let Some(cycle) = find_cycle_dfs(depends_on, dep, visited, path) {
                return Some(cycle);
            }
        }
    }

    path.pop();
    None
}
