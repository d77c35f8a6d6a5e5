//! Property-Based Tests for the Timeline Store
//!
//! Uses proptest to verify the ordering, capacity and idempotence properties
//! of the bounded sorted sets.

use proptest::prelude::*;

use crate::timeline::{TimelineKey, TimelineStore};

// == Test Configuration ==
const TEST_CAP: usize = 50;

// == Strategies ==
fn id_strategy() -> impl Strategy<Value = u64> {
    1u64..500
}

fn score_strategy() -> impl Strategy<Value = i64> {
    0i64..1_000_000
}

/// Generates a sequence of timeline operations for testing
#[derive(Debug, Clone)]
enum TimelineOp {
    Upsert { id: u64, score: i64 },
    Remove { id: u64 },
    Trim,
}

fn timeline_op_strategy() -> impl Strategy<Value = TimelineOp> {
    prop_oneof![
        (id_strategy(), score_strategy())
            .prop_map(|(id, score)| TimelineOp::Upsert { id, score }),
        id_strategy().prop_map(|id| TimelineOp::Remove { id }),
        Just(TimelineOp::Trim),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // For any sequence of upserts and removes, a trim leaves at most TEST_CAP
    // members in the timeline.
    #[test]
    fn prop_capacity_after_trim(ops in prop::collection::vec(timeline_op_strategy(), 1..200)) {
        let mut store = TimelineStore::new(TEST_CAP);
        let key = TimelineKey::ForYou;

        for op in ops {
            match op {
                TimelineOp::Upsert { id, score } => store.upsert(&key, id, score),
                TimelineOp::Remove { id } => {
                    store.remove(&key, id);
                }
                TimelineOp::Trim => {
                    store.trim_to_capacity(&key);
                }
            }
        }

        store.trim_to_capacity(&key);
        prop_assert!(
            store.cardinality(&key) <= TEST_CAP,
            "cardinality {} exceeds cap {}",
            store.cardinality(&key),
            TEST_CAP
        );
    }

    // Trimming always removes the lowest-scored entries first: every survivor
    // scores at least as high as every dropped entry.
    #[test]
    fn prop_trim_drops_lowest_scores(
        entries in prop::collection::hash_map(id_strategy(), score_strategy(), 1..150)
    ) {
        let mut store = TimelineStore::new(TEST_CAP);
        let key = TimelineKey::User(1);

        for (&id, &score) in &entries {
            store.upsert(&key, id, score);
        }
        let before = store.range_desc(&key, i64::MAX, usize::MAX);

        store.trim_to_capacity(&key);
        let after = store.range_desc(&key, i64::MAX, usize::MAX);

        prop_assert!(after.len() <= TEST_CAP);

        let min_kept = after.iter().map(|e| e.score).min();
        let dropped: Vec<_> = before
            .iter()
            .filter(|e| !after.iter().any(|kept| kept.id == e.id))
            .collect();
        if let Some(min_kept) = min_kept {
            for entry in dropped {
                prop_assert!(
                    entry.score <= min_kept,
                    "dropped entry {:?} outscores kept minimum {}",
                    entry,
                    min_kept
                );
            }
        }
    }

    // Applying the same upsert twice converges to the same state as applying
    // it once (the fan-out consumer relies on this for redelivery).
    #[test]
    fn prop_upsert_idempotent(id in id_strategy(), score in score_strategy()) {
        let key = TimelineKey::Following(3);

        let mut once = TimelineStore::new(TEST_CAP);
        once.upsert(&key, id, score);

        let mut twice = TimelineStore::new(TEST_CAP);
        twice.upsert(&key, id, score);
        twice.upsert(&key, id, score);

        prop_assert_eq!(once.cardinality(&key), twice.cardinality(&key));
        prop_assert_eq!(
            once.range_desc(&key, i64::MAX, usize::MAX)
                .iter()
                .map(|e| (e.id, e.score))
                .collect::<Vec<_>>(),
            twice.range_desc(&key, i64::MAX, usize::MAX)
                .iter()
                .map(|e| (e.id, e.score))
                .collect::<Vec<_>>()
        );
    }

    // Descending range reads are always non-increasing in score and never hold
    // duplicate ids.
    #[test]
    fn prop_range_desc_ordering(
        entries in prop::collection::vec((id_strategy(), score_strategy()), 1..150),
        max_score in score_strategy(),
        limit in 1usize..60
    ) {
        let mut store = TimelineStore::new(1000);
        let key = TimelineKey::ForYou;

        for (id, score) in entries {
            store.upsert(&key, id, score);
        }

        let page = store.range_desc(&key, max_score, limit);
        prop_assert!(page.len() <= limit);

        let mut seen = std::collections::HashSet::new();
        for window in page.windows(2) {
            prop_assert!(
                window[0].score >= window[1].score,
                "scores increase: {:?}",
                window
            );
        }
        for entry in &page {
            prop_assert!(entry.score <= max_score, "entry beyond cursor: {:?}", entry);
            prop_assert!(seen.insert(entry.id), "duplicate id {}", entry.id);
        }
    }
}
