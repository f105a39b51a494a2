//! Property-based tests for operations module.
//!
//! These tests focus on the ordering invariants of planned work-lists.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use proptest::prelude::*;

use crate::catalog::{Catalog, Direction, MigrationFile};
use crate::error::StructuralIssue;
use crate::operations::Reconciler;

// Strategy for a set of distinct migrations, each with an applied flag
fn migrations_strategy() -> impl Strategy<Value = Vec<(String, String, bool)>> {
    prop::collection::btree_map(
        ("[0-9]{1,4}", "[a-z]{1,6}"),
        any::<bool>(),
        0..40,
    )
    .prop_map(|m| m.into_iter().map(|((k, n), a)| (k, n, a)).collect())
}

fn catalog_of(migrations: &[(String, String, bool)]) -> Catalog {
    let files = migrations
        .iter()
        .flat_map(|(key, name, _)| {
            [Direction::Down, Direction::Up].map(|direction| MigrationFile {
                sequence_key: key.clone(),
                name: name.clone(),
                direction,
                path: PathBuf::from(format!("{key}_{name}.{direction}.sql")),
            })
        })
        .collect();
    Catalog::from_files(Path::new("m"), files)
}

fn applied_of(migrations: &[(String, String, bool)]) -> BTreeSet<String> {
    migrations
        .iter()
        .filter(|(_, _, applied)| *applied)
        .map(|(key, name, _)| format!("{key}_{name}"))
        .collect()
}

fn sort_keys(list: &crate::operations::WorkList) -> Vec<(String, String)> {
    list.identifiers()
        .into_iter()
        .map(|id| {
            let (key, name) = id.split_once('_').unwrap();
            (key.to_string(), name.to_string())
        })
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 2000,
        .. ProptestConfig::default()
    })]

    // Up work-lists are strictly increasing by (sequence_key, name)
    #[test]
    fn up_plan_strictly_increasing(migrations in migrations_strategy()) {
        let catalog = catalog_of(&migrations);
        let plan = Reconciler::plan(Direction::Up, &catalog, &applied_of(&migrations)).unwrap();

        let keys = sort_keys(&plan);
        prop_assert!(keys.windows(2).all(|w| w[0] < w[1]));
    }

    // Down work-lists are strictly decreasing by (sequence_key, name)
    #[test]
    fn down_plan_strictly_decreasing(migrations in migrations_strategy()) {
        let catalog = catalog_of(&migrations);
        let plan = Reconciler::plan(Direction::Down, &catalog, &applied_of(&migrations)).unwrap();

        let keys = sort_keys(&plan);
        prop_assert!(keys.windows(2).all(|w| w[0] > w[1]));
    }

    // Up selects exactly the unapplied migrations, Down exactly the applied ones
    #[test]
    fn plans_partition_the_catalog(migrations in migrations_strategy()) {
        let catalog = catalog_of(&migrations);
        let applied = applied_of(&migrations);

        let up = Reconciler::plan(Direction::Up, &catalog, &applied).unwrap();
        let down = Reconciler::plan(Direction::Down, &catalog, &applied).unwrap();

        let up_ids: BTreeSet<&str> = up.identifiers().into_iter().collect();
        let down_ids: BTreeSet<&str> = down.identifiers().into_iter().collect();
        prop_assert!(up_ids.is_disjoint(&down_ids));
        prop_assert_eq!(up_ids.len() + down_ids.len(), migrations.len());
        prop_assert_eq!(down_ids.len(), applied.len());
    }

    // Applying the Up plan leaves nothing to do
    #[test]
    fn up_is_idempotent(migrations in migrations_strategy()) {
        let catalog = catalog_of(&migrations);
        let mut applied = applied_of(&migrations);

        let first = Reconciler::plan(Direction::Up, &catalog, &applied).unwrap();
        applied.extend(first.identifiers().into_iter().map(str::to_string));

        let second = Reconciler::plan(Direction::Up, &catalog, &applied).unwrap();
        prop_assert!(second.is_empty());
    }

    // Every applied identifier without a down file is reported exactly once
    #[test]
    fn missing_counterparts_all_reported(
        migrations in migrations_strategy(),
        orphans in prop::collection::btree_set("[0-9]{5}_[a-z]{1,6}", 1..5),
    ) {
        let catalog = catalog_of(&migrations);
        let mut applied = applied_of(&migrations);
        applied.extend(orphans.iter().cloned());

        let err = Reconciler::plan(Direction::Down, &catalog, &applied).unwrap_err();
        let reported: Vec<&str> = err
            .structural_issues()
            .iter()
            .filter_map(|issue| match issue {
                StructuralIssue::MissingCounterpart { identifier, .. } => Some(identifier.as_str()),
                _ => None,
            })
            .collect();

        prop_assert_eq!(reported, orphans.iter().map(String::as_str).collect::<Vec<_>>());
    }
}
