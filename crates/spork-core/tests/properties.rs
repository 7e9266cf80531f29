//! Property tests for the pure promotion building blocks.

use proptest::prelude::*;
use spork_core::{apply_constraint, diff_tables, is_valid_version, ConstraintTable, Environment, Version};

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

fn arb_constraint() -> impl Strategy<Value = String> {
    (0u32..50, 0u32..50, 0u32..50).prop_map(|(a, b, c)| format!("= {a}.{b}.{c}"))
}

fn arb_table() -> impl Strategy<Value = ConstraintTable> {
    prop::collection::btree_map("[a-z][a-z0-9_]{0,8}", arb_constraint(), 0..12)
}

fn arb_version() -> impl Strategy<Value = Version> {
    (0u64..1000, 0u64..1000, 0u64..1000).prop_map(|(a, b, c)| Version::new(a, b, c))
}

// ---------------------------------------------------------------------------
// Validator
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn three_numeric_components_are_valid(a in "[0-9]{1,6}", b in "[0-9]{1,6}", c in "[0-9]{1,6}") {
        let version = format!("{a}.{b}.{c}");
        prop_assert!(is_valid_version(&version));
    }

    #[test]
    fn wrong_component_count_is_invalid(parts in prop::collection::vec("[0-9]{1,4}", 0..8)) {
        prop_assume!(parts.len() != 3);
        prop_assert!(!is_valid_version(&parts.join(".")));
    }

    #[test]
    fn non_numeric_component_is_invalid(
        a in "[0-9]{1,4}",
        junk in "[0-9]{0,2}[a-zA-Z_ =~<>][a-z0-9]{0,3}",
        position in 0usize..3,
    ) {
        let mut parts = vec![a.clone(), a.clone(), a];
        parts[position] = junk;
        prop_assert!(!is_valid_version(&parts.join(".")));
    }

    #[test]
    fn valid_versions_round_trip_through_display(v in arb_version()) {
        let text = v.to_string();
        prop_assert!(is_valid_version(&text));
        prop_assert_eq!(text.parse::<Version>().unwrap(), v);
    }
}

// ---------------------------------------------------------------------------
// Diff
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn diff_of_table_with_itself_is_empty(table in arb_table()) {
        prop_assert!(diff_tables(&table, &table).is_empty());
    }

    #[test]
    fn diff_reports_exactly_changed_old_keys(old in arb_table(), new in arb_table()) {
        let changes = diff_tables(&old, &new);
        let reported: Vec<&str> = changes.iter().map(|c| c.cookbook.as_str()).collect();
        let expected: Vec<&str> = old
            .iter()
            .filter(|(k, v)| new.get(*k) != Some(*v))
            .map(|(k, _)| k.as_str())
            .collect();
        prop_assert_eq!(reported, expected);

        for change in &changes {
            prop_assert!(old.contains_key(&change.cookbook));
            prop_assert_eq!(&change.old, &old[&change.cookbook]);
            prop_assert_eq!(change.new.as_ref(), new.get(&change.cookbook));
        }
    }
}

// ---------------------------------------------------------------------------
// Constraint application
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn apply_changes_exactly_one_key(
        table in arb_table(),
        cookbook in "[a-z][a-z0-9_]{0,8}",
        version in arb_version(),
    ) {
        let mut env = Environment::new("production");
        env.cookbook_versions = table.clone();

        let next = apply_constraint(&env, &cookbook, version);

        prop_assert_eq!(&next.cookbook_versions[&cookbook], &format!("= {version}"));
        for (key, value) in &table {
            if key != &cookbook {
                prop_assert_eq!(next.cookbook_versions.get(key), Some(value));
            }
        }
        let expected_len = table.len() + usize::from(!table.contains_key(&cookbook));
        prop_assert_eq!(next.cookbook_versions.len(), expected_len);
        prop_assert_eq!(&next.name, &env.name);
    }
}
