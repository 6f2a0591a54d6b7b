//! Ordering invariants over random inheritance graphs.

use std::collections::{HashMap, HashSet};

use proptest::prelude::*;
use rankc::build::plan;
use rankc::model::RankProfileRegistry;
use rankc::testing::make_child;
use rankc::DeriveError;

/// Parents for `n` profiles; profile `i` may only inherit from `j < i`.
fn dag_strategy() -> impl Strategy<Value = Vec<Vec<usize>>> {
    (1usize..30).prop_flat_map(|n| {
        (0..n)
            .map(|i| {
                if i == 0 {
                    Just(Vec::new()).boxed()
                } else {
                    prop::collection::vec(0..i, 0..3).boxed()
                }
            })
            .collect::<Vec<_>>()
    })
}

fn name(i: usize) -> String {
    format!("p{:02}", i)
}

fn registry_from(parents: &[Vec<usize>]) -> RankProfileRegistry {
    let mut registry = RankProfileRegistry::new();
    registry.add_schema("s", None);
    for (i, ps) in parents.iter().enumerate() {
        let names: Vec<String> = ps.iter().map(|p| name(*p)).collect();
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        registry.add(make_child(&name(i), Some("s"), &refs));
    }
    registry
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn prop_parents_come_in_earlier_batches(parents in dag_strategy()) {
        let registry = registry_from(&parents);
        let batches = plan(&registry, Some("s")).unwrap();

        prop_assert_eq!(&batches[0], &vec!["default".to_string()]);

        let mut batch_of: HashMap<String, usize> = HashMap::new();
        for (b, batch) in batches.iter().enumerate() {
            let mut sorted = batch.clone();
            sorted.sort();
            prop_assert_eq!(&sorted, batch);
            for profile in batch {
                prop_assert!(batch_of.insert(profile.clone(), b).is_none());
            }
        }
        prop_assert_eq!(batch_of.len(), parents.len() + 1);

        for (i, ps) in parents.iter().enumerate() {
            for p in ps {
                prop_assert!(batch_of[&name(*p)] < batch_of[&name(i)]);
            }
        }
    }

    #[test]
    fn prop_cycles_never_hang(parents in dag_strategy(), close_at in any::<prop::sample::Index>()) {
        // Profile 0 and some other profile (or itself) inherit from each other.
        let mut parents = parents;
        let other = close_at.index(parents.len());
        parents[0].push(other);
        parents[other].push(0);

        let registry = registry_from(&parents);
        match plan(&registry, Some("s")) {
            Err(DeriveError::UnresolvableInheritance { stuck }) => {
                let stuck: HashSet<&str> = stuck.iter().map(|s| s.profile.as_str()).collect();
                prop_assert!(stuck.contains(name(0).as_str()));
            }
            other => prop_assert!(false, "expected a cycle error, got {:?}", other),
        }
    }
}
