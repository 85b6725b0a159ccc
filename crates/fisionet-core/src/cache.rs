//! Per-screen list cache.
//!
//! Holds the last fetched snapshot of a table. Every refresh replaces the
//! whole sequence; nothing is merged. Refreshes take a monotonic ticket and a
//! result is applied only if no newer ticket has been applied before it, so a
//! slow earlier fetch never overwrites a newer one.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use fisionet_remote::Query;

use crate::error::ClinicResult;
use crate::models::Entity;
use crate::repository::Repository;

/// Load state of a cached list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    Empty,
    Loading,
    Loaded,
    /// Last refresh failed; items are cleared
    Failed(String),
}

/// Sequence number taken by one refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RefreshTicket(u64);

impl RefreshTicket {
    pub fn value(&self) -> u64 {
        self.0
    }
}

struct CacheState<E> {
    state: LoadState,
    items: Vec<E>,
    /// Highest ticket whose result was applied (0 = none)
    applied: u64,
}

/// In-memory, wholesale-replaced snapshot of one table.
pub struct ListCache<E> {
    issued: AtomicU64,
    inner: Mutex<CacheState<E>>,
}

impl<E: Clone> Default for ListCache<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Clone> ListCache<E> {
    pub fn new() -> Self {
        Self {
            issued: AtomicU64::new(0),
            inner: Mutex::new(CacheState {
                state: LoadState::Empty,
                items: Vec::new(),
                applied: 0,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, CacheState<E>> {
        // State is only ever replaced field-by-field under the lock and each
        // write leaves it valid.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Start a refresh. Items stay visible until the result lands.
    pub fn begin_refresh(&self) -> RefreshTicket {
        let ticket = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        self.lock().state = LoadState::Loading;
        RefreshTicket(ticket)
    }

    /// Apply the result of the refresh that took `ticket`.
    ///
    /// Returns `false` when the result is stale and was dropped.
    pub fn complete(&self, ticket: RefreshTicket, result: ClinicResult<Vec<E>>) -> bool {
        let mut inner = self.lock();
        if ticket.0 <= inner.applied {
            tracing::debug!(ticket = ticket.0, applied = inner.applied, "Dropping stale refresh");
            return false;
        }
        inner.applied = ticket.0;
        let newer_in_flight = self.issued.load(Ordering::SeqCst) > ticket.0;

        match result {
            Ok(items) => {
                inner.items = items;
                inner.state = if newer_in_flight {
                    LoadState::Loading
                } else {
                    LoadState::Loaded
                };
            }
            Err(e) => {
                tracing::warn!(error = %e, "Refresh failed");
                inner.items.clear();
                inner.state = if newer_in_flight {
                    LoadState::Loading
                } else {
                    LoadState::Failed(e.to_string())
                };
            }
        }
        true
    }

    pub fn state(&self) -> LoadState {
        self.lock().state.clone()
    }

    /// Copy of the current items.
    pub fn items(&self) -> Vec<E> {
        self.lock().items.clone()
    }

    pub fn len(&self) -> usize {
        self.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().items.is_empty()
    }

    /// Drop the snapshot (sign-out). In-flight refreshes become stale.
    pub fn clear(&self) {
        let mut inner = self.lock();
        inner.items.clear();
        inner.state = LoadState::Empty;
        inner.applied = self.issued.load(Ordering::SeqCst);
    }
}

impl<E: Entity> ListCache<E> {
    /// Fetch through `repo` and replace the snapshot.
    ///
    /// The fetch error, if any, is returned as well as recorded in the state.
    pub fn refresh(&self, repo: &Repository<E>, query: &Query) -> ClinicResult<Vec<E>> {
        let ticket = self.begin_refresh();
        let result = repo.list_all(query);
        let outcome = result.clone();
        self.complete(ticket, result);
        outcome
    }

    /// Refresh with the table's default ordering.
    pub fn refresh_default(&self, repo: &Repository<E>) -> ClinicResult<Vec<E>> {
        self.refresh(repo, &E::default_query())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClinicError;

    fn letters(items: &[&str]) -> ClinicResult<Vec<String>> {
        Ok(items.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn test_initial_state() {
        let cache: ListCache<String> = ListCache::new();
        assert_eq!(cache.state(), LoadState::Empty);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_refresh_replaces_never_merges() {
        let cache = ListCache::new();
        let t1 = cache.begin_refresh();
        cache.complete(t1, letters(&["A", "B", "C"]));
        assert_eq!(cache.items(), vec!["A", "B", "C"]);

        let t2 = cache.begin_refresh();
        assert_eq!(cache.state(), LoadState::Loading);
        cache.complete(t2, letters(&["D", "E"]));

        assert_eq!(cache.items(), vec!["D", "E"]);
        assert_eq!(cache.state(), LoadState::Loaded);
    }

    #[test]
    fn test_stale_result_dropped() {
        let cache = ListCache::new();
        let slow = cache.begin_refresh();
        let fast = cache.begin_refresh();

        assert!(cache.complete(fast, letters(&["new"])));
        assert!(!cache.complete(slow, letters(&["old"])));

        assert_eq!(cache.items(), vec!["new"]);
        assert_eq!(cache.state(), LoadState::Loaded);
    }

    #[test]
    fn test_older_result_applies_while_newer_in_flight() {
        let cache = ListCache::new();
        let first = cache.begin_refresh();
        let second = cache.begin_refresh();

        assert!(cache.complete(first, letters(&["A"])));
        assert_eq!(cache.items(), vec!["A"]);
        assert_eq!(cache.state(), LoadState::Loading);

        assert!(cache.complete(second, letters(&["B"])));
        assert_eq!(cache.state(), LoadState::Loaded);
    }

    #[test]
    fn test_failure_clears_items() {
        let cache = ListCache::new();
        let t1 = cache.begin_refresh();
        cache.complete(t1, letters(&["A"]));

        let t2 = cache.begin_refresh();
        cache.complete(t2, Err(ClinicError::Network("timeout".into())));

        assert!(cache.items().is_empty());
        assert_eq!(cache.state(), LoadState::Failed("Network error: timeout".into()));
    }

    #[test]
    fn test_clear_makes_in_flight_stale() {
        let cache = ListCache::new();
        let t1 = cache.begin_refresh();
        cache.clear();

        assert!(!cache.complete(t1, letters(&["A"])));
        assert_eq!(cache.state(), LoadState::Empty);
    }

    #[test]
    fn test_tickets_monotonic() {
        let cache: ListCache<String> = ListCache::new();
        let a = cache.begin_refresh();
        let b = cache.begin_refresh();
        assert!(b > a);
        assert_eq!(b.value(), a.value() + 1);
    }
}
