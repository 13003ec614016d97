/// Property-based tests for graph construction
///
/// Random DAGs are built through the public builder (each service may only
/// depend on services added before it) and checked for:
/// - start order lists every service after all of its dependencies
/// - the terminal set is exactly the services nothing depends on
/// - snapshots taken earlier never change
mod common;

use common::RecordingService;
use proptest::prelude::*;
use std::collections::BTreeSet;
use testnet::{ServiceGraphBuilder, ServiceId};

/// For each service, dependency picks as indices into the earlier services.
fn dag_strategy() -> impl Strategy<Value = Vec<Vec<usize>>> {
    prop::collection::vec(prop::collection::vec(0usize..64, 0..4), 1..24)
}

fn build(dag: &[Vec<usize>]) -> (ServiceGraphBuilder, Vec<ServiceId>) {
    let mut builder = ServiceGraphBuilder::new();
    let mut ids: Vec<ServiceId> = Vec::new();
    for picks in dag {
        let deps: Vec<ServiceId> = if ids.is_empty() {
            Vec::new()
        } else {
            picks.iter().map(|p| ids[p % ids.len()]).collect()
        };
        let id = builder
            .add_service(RecordingService::new("node", 9650), deps)
            .expect("dependencies are registered");
        ids.push(id);
    }
    (builder, ids)
}

proptest! {
    #[test]
    fn prop_start_order_respects_dependencies(dag in dag_strategy()) {
        let (builder, ids) = build(&dag);
        let graph = builder.build();

        prop_assert_eq!(graph.start_order().len(), ids.len());
        for (position, id) in graph.start_order().iter().enumerate() {
            for dep in graph.dependencies(*id).unwrap() {
                let dep_position = graph.start_order().iter().position(|x| x == dep).unwrap();
                prop_assert!(dep_position < position);
            }
        }
    }

    #[test]
    fn prop_terminal_set_is_services_without_dependents(dag in dag_strategy()) {
        let (builder, ids) = build(&dag);
        let graph = builder.build();

        let depended_on: BTreeSet<ServiceId> = ids
            .iter()
            .flat_map(|id| graph.dependencies(*id).unwrap().iter().copied())
            .collect();
        let expected: BTreeSet<ServiceId> = ids
            .iter()
            .copied()
            .filter(|id| !depended_on.contains(id))
            .collect();

        prop_assert_eq!(graph.terminal_service_ids(), &expected);
        prop_assert!(!expected.is_empty());
        for id in &expected {
            prop_assert!(graph.dependents(*id).is_empty());
        }
    }

    #[test]
    fn prop_snapshots_are_independent(dag in dag_strategy(), extra in 1usize..5) {
        let (mut builder, ids) = build(&dag);
        let before = builder.build();
        let terminal_before = before.terminal_service_ids().clone();

        for _ in 0..extra {
            builder
                .add_service(RecordingService::new("late", 8545), [ids[0]])
                .unwrap();
        }

        prop_assert_eq!(before.len(), ids.len());
        prop_assert_eq!(before.terminal_service_ids(), &terminal_before);
        prop_assert_eq!(builder.build().len(), ids.len() + extra);
    }

    #[test]
    fn prop_waves_cover_start_order(dag in dag_strategy()) {
        let (builder, _) = build(&dag);
        let graph = builder.build();

        let flattened: BTreeSet<ServiceId> = graph.start_waves().into_iter().flatten().collect();
        let all: BTreeSet<ServiceId> = graph.start_order().iter().copied().collect();
        prop_assert_eq!(flattened, all);
    }
}
