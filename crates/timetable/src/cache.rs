//! TTL-based caching of fetched timetable snapshots.
//!
//! A snapshot is the full entry list returned for one [`TimetableQuery`].
//! Any write through the view invalidates the affected query so the next
//! read goes back to the backend.

use crate::types::{TimetableEntry, TimetableQuery};
use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// A cached snapshot with metadata.
#[derive(Clone)]
struct CachedSnapshot {
    entries: Arc<Vec<TimetableEntry>>,
    cached_at: Instant,
    ttl: Duration,
}

impl CachedSnapshot {
    fn is_fresh(&self) -> bool {
        self.cached_at.elapsed() < self.ttl
    }
}

/// Thread-safe cache of timetable snapshots keyed by query.
pub struct SnapshotCache {
    entries: DashMap<TimetableQuery, CachedSnapshot>,
    default_ttl: Duration,
}

impl SnapshotCache {
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            default_ttl,
        }
    }

    /// Creates a cache with a 5-minute default TTL.
    pub fn with_default_ttl() -> Self {
        Self::new(Duration::from_secs(5 * 60))
    }

    /// Gets a snapshot if it exists and hasn't expired.
    pub fn get(&self, query: &TimetableQuery) -> Option<Arc<Vec<TimetableEntry>>> {
        self.entries.get(query).and_then(|snapshot| {
            if snapshot.is_fresh() {
                Some(Arc::clone(&snapshot.entries))
            } else {
                drop(snapshot);
                self.entries.remove(query);
                None
            }
        })
    }

    pub fn insert(&self, query: TimetableQuery, entries: Vec<TimetableEntry>) -> Arc<Vec<TimetableEntry>> {
        self.insert_with_ttl(query, entries, self.default_ttl)
    }

    /// Stores a snapshot with a custom TTL and returns the shared copy.
    pub fn insert_with_ttl(
        &self,
        query: TimetableQuery,
        entries: Vec<TimetableEntry>,
        ttl: Duration,
    ) -> Arc<Vec<TimetableEntry>> {
        let entries = Arc::new(entries);
        self.entries.insert(
            query,
            CachedSnapshot {
                entries: Arc::clone(&entries),
                cached_at: Instant::now(),
                ttl,
            },
        );
        entries
    }

    pub fn invalidate(&self, query: &TimetableQuery) {
        self.entries.remove(query);
    }

    /// Drops every lab snapshot. A class write may change what any venue
    /// shows, so lab views cannot be invalidated selectively.
    pub fn invalidate_labs(&self) {
        self.entries
            .retain(|query, _| !matches!(query, TimetableQuery::Lab(_)));
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Number of snapshots held, including expired ones.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Removes expired snapshots.
    pub fn cleanup_expired(&self) {
        self.entries.retain(|_, snapshot| snapshot.is_fresh());
    }

    pub fn stats(&self) -> CacheStats {
        let mut total = 0;
        let mut expired = 0;

        for snapshot in self.entries.iter() {
            total += 1;
            if !snapshot.is_fresh() {
                expired += 1;
            }
        }

        CacheStats {
            total_entries: total,
            expired_entries: expired,
            active_entries: total - expired,
        }
    }
}

impl Default for SnapshotCache {
    fn default() -> Self {
        Self::with_default_ttl()
    }
}

/// Cache statistics for monitoring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheStats {
    pub total_entries: usize,
    pub expired_entries: usize,
    pub active_entries: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Section, Semester, TimetableFilter};

    fn class(semester: Semester) -> TimetableQuery {
        TimetableQuery::Class(TimetableFilter::new(semester, Section::A))
    }

    #[test]
    fn test_get_returns_fresh_snapshot() {
        let cache = SnapshotCache::with_default_ttl();
        cache.insert(class(Semester::First), Vec::new());
        assert!(cache.get(&class(Semester::First)).is_some());
        assert!(cache.get(&class(Semester::Second)).is_none());
    }

    #[test]
    fn test_expired_snapshot_is_evicted_on_read() {
        let cache = SnapshotCache::new(Duration::ZERO);
        cache.insert(class(Semester::First), Vec::new());
        assert_eq!(cache.stats().expired_entries, 1);
        assert!(cache.get(&class(Semester::First)).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_invalidate_labs_keeps_class_snapshots() {
        let cache = SnapshotCache::with_default_ttl();
        cache.insert(class(Semester::Third), Vec::new());
        cache.insert(TimetableQuery::Lab("GEN AI LABORATORY".to_string()), Vec::new());
        cache.insert(TimetableQuery::Lab("IoT LABORATORY".to_string()), Vec::new());

        cache.invalidate_labs();
        assert_eq!(cache.len(), 1);
        assert!(cache.get(&class(Semester::Third)).is_some());
    }

    #[test]
    fn test_cleanup_and_stats() {
        let cache = SnapshotCache::with_default_ttl();
        cache.insert(class(Semester::First), Vec::new());
        cache.insert_with_ttl(class(Semester::Second), Vec::new(), Duration::ZERO);

        assert_eq!(
            cache.stats(),
            CacheStats {
                total_entries: 2,
                expired_entries: 1,
                active_entries: 1
            }
        );
        cache.cleanup_expired();
        assert_eq!(cache.len(), 1);
        cache.clear();
        assert!(cache.is_empty());
    }
}
