//! Timeline Store Module
//!
//! Per-key bounded sorted sets: member = post id, score = creation timestamp
//! in milliseconds. Provides the ordered-set operations the fan-out consumer
//! and feed service rely on (upsert, remove, descending range, trim).

use std::collections::{BTreeMap, HashMap};

use crate::timeline::TimelineKey;

// == Timeline Entry ==
/// One member of a timeline as returned by range reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimelineEntry {
    /// Post id
    pub id: u64,
    /// Creation timestamp in milliseconds, also the pagination cursor
    pub score: i64,
}

// == Timeline ==
/// One sorted set. Ranked ascending by (score, insertion sequence), so equal
/// scores order deterministically and the most recent insert ranks first on
/// descending reads.
#[derive(Debug, Default)]
struct Timeline {
    by_rank: BTreeMap<(i64, u64), u64>,
    by_id: HashMap<u64, (i64, u64)>,
    next_seq: u64,
}

impl Timeline {
    fn upsert(&mut self, id: u64, score: i64) {
        if let Some(rank) = self.by_id.remove(&id) {
            self.by_rank.remove(&rank);
        }
        let rank = (score, self.next_seq);
        self.next_seq += 1;
        self.by_rank.insert(rank, id);
        self.by_id.insert(id, rank);
    }

    fn remove(&mut self, id: u64) -> bool {
        match self.by_id.remove(&id) {
            Some(rank) => {
                self.by_rank.remove(&rank);
                true
            }
            None => false,
        }
    }

    fn len(&self) -> usize {
        self.by_id.len()
    }
}

// == Timeline Store ==
/// All timelines, keyed by [`TimelineKey`], each capped at `max_entries`.
///
/// Shared as `Arc<RwLock<TimelineStore>>`; batch operations exist so that one
/// lock acquisition covers a whole fan-out batch.
#[derive(Debug)]
pub struct TimelineStore {
    timelines: HashMap<TimelineKey, Timeline>,
    max_entries: usize,
}

impl TimelineStore {
    // == Constructor ==
    /// Creates an empty store where each timeline holds at most `max_entries`
    /// members after a trim.
    pub fn new(max_entries: usize) -> Self {
        Self {
            timelines: HashMap::new(),
            max_entries,
        }
    }

    // == Upsert ==
    /// Inserts `id` into `key`'s timeline with `score`, or moves it to the new
    /// score if already present. Re-upserting never duplicates the member.
    pub fn upsert(&mut self, key: &TimelineKey, id: u64, score: i64) {
        self.timelines
            .entry(key.clone())
            .or_default()
            .upsert(id, score);
    }

    // == Remove ==
    /// Removes `id` from `key`'s timeline; no-op when absent.
    pub fn remove(&mut self, key: &TimelineKey, id: u64) -> bool {
        match self.timelines.get_mut(key) {
            Some(timeline) => {
                let removed = timeline.remove(id);
                if timeline.len() == 0 {
                    self.timelines.remove(key);
                }
                removed
            }
            None => false,
        }
    }

    /// Removes `id` from each of the given timelines in one pass.
    pub fn remove_from_each(&mut self, keys: &[TimelineKey], id: u64) {
        for key in keys {
            self.remove(key, id);
        }
    }

    // == Range ==
    /// Returns up to `limit` entries with `score <= max_score`, strictly
    /// non-increasing by score (newest first).
    pub fn range_desc(
        &self,
        key: &TimelineKey,
        max_score: i64,
        limit: usize,
    ) -> Vec<TimelineEntry> {
        let Some(timeline) = self.timelines.get(key) else {
            return Vec::new();
        };
        timeline
            .by_rank
            .range(..=(max_score, u64::MAX))
            .rev()
            .take(limit)
            .map(|(&(score, _), &id)| TimelineEntry { id, score })
            .collect()
    }

    // == Cardinality ==
    /// Number of members in `key`'s timeline.
    pub fn cardinality(&self, key: &TimelineKey) -> usize {
        self.timelines.get(key).map_or(0, Timeline::len)
    }

    /// Number of distinct timelines currently materialized.
    pub fn key_count(&self) -> usize {
        self.timelines.len()
    }

    // == Trim ==
    /// Drops the lowest-scored excess so the timeline holds at most
    /// `max_entries` members. Returns how many entries were dropped.
    pub fn trim_to_capacity(&mut self, key: &TimelineKey) -> usize {
        let cap = self.max_entries;
        let Some(timeline) = self.timelines.get_mut(key) else {
            return 0;
        };
        let excess = timeline.len().saturating_sub(cap);
        for _ in 0..excess {
            if let Some((_, id)) = timeline.by_rank.pop_first() {
                timeline.by_id.remove(&id);
            }
        }
        excess
    }
}
