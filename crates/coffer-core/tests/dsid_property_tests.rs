//! Property tests for datastream id generation

use proptest::prelude::*;

use coffer_core::collection::{AddOptions, DatastreamCollection};
use coffer_core::dsid::{matches_prefix, next_dsid};
use coffer_core::model::{Datastream, DatastreamKind};

proptest! {
    /// For any existing id set and prefix, the generated id matches
    /// `^prefix[0-9]+$` and its numeric suffix equals
    /// `count(matching ids) + 1`.
    #[test]
    fn generated_id_matches_pattern_and_count(
        prefix in "[A-Z]{1,8}",
        existing in proptest::collection::vec("[A-Z]{1,8}[0-9]{0,3}", 0..24),
    ) {
        let generated = next_dsid(existing.iter().map(String::as_str), &prefix);

        let suffix = generated.strip_prefix(&prefix).expect("prefix present");
        prop_assert!(!suffix.is_empty());
        prop_assert!(suffix.chars().all(|c| c.is_ascii_digit()));

        let count = existing
            .iter()
            .filter(|id| matches_prefix(id, &prefix))
            .count();
        prop_assert_eq!(suffix.parse::<usize>().unwrap(), count + 1);
    }
}

/// Repeatedly adding without explicit ids on a fresh collection yields
/// strictly increasing, pairwise-distinct ids for a fixed prefix.
#[test]
fn test_repeated_add_yields_distinct_increasing_ids() {
    let mut collection = DatastreamCollection::new();
    let mut seen = Vec::new();

    for expected in 1..=20usize {
        let id = collection
            .add(
                Datastream::new("", DatastreamKind::Content),
                AddOptions::default(),
            )
            .unwrap();
        let suffix: usize = id.strip_prefix("DS").unwrap().parse().unwrap();
        assert_eq!(suffix, expected);
        assert!(!seen.contains(&id));
        seen.push(id);
    }
}
