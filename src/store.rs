//! In-memory store for processed reports, keyed by an opaque token.

use crate::engine::CapitalGainsReport;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};
use uuid::Uuid;

/// A processed batch as served to downloads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredReport {
    pub report: CapitalGainsReport,
    /// Computed once when the batch is stored.
    pub fingerprint: String,
}

struct Entry {
    stored_at: Instant,
    stored: Arc<StoredReport>,
}

/// Holds reports for download until they are older than the TTL.
pub struct ResultStore {
    ttl: Duration,
    entries: Mutex<HashMap<String, Entry>>,
}

impl ResultStore {
    pub fn new(ttl: Duration) -> Self {
        ResultStore {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Store a report and return its token. Expired entries are purged.
    pub fn insert(&self, report: CapitalGainsReport, fingerprint: String) -> String {
        self.insert_at(
            StoredReport {
                report,
                fingerprint,
            },
            Instant::now(),
        )
    }

    pub fn get(&self, token: &str) -> Option<Arc<StoredReport>> {
        self.get_at(token, Instant::now())
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn insert_at(&self, stored: StoredReport, now: Instant) -> String {
        let token = Uuid::new_v4().to_string();
        let mut entries = self.lock();
        let ttl = self.ttl;
        let before = entries.len();
        entries.retain(|_, entry| now.saturating_duration_since(entry.stored_at) <= ttl);
        let purged = before - entries.len();
        if purged > 0 {
            tracing::debug!(purged, "purged expired reports");
        }

        entries.insert(
            token.clone(),
            Entry {
                stored_at: now,
                stored: Arc::new(stored),
            },
        );
        token
    }

    fn get_at(&self, token: &str, now: Instant) -> Option<Arc<StoredReport>> {
        self.lock()
            .get(token)
            .filter(|entry| now.saturating_duration_since(entry.stored_at) <= self.ttl)
            .map(|entry| entry.stored.clone())
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Entry>> {
        // A poisoned map is still structurally valid.
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stored(fingerprint: &str) -> StoredReport {
        StoredReport {
            report: CapitalGainsReport::default(),
            fingerprint: fingerprint.to_string(),
        }
    }

    #[test]
    fn test_insert_and_get() {
        let store = ResultStore::new(Duration::from_secs(60));
        let token = store.insert(CapitalGainsReport::default(), "sha256:abc".to_string());

        assert!(Uuid::parse_str(&token).is_ok());
        assert_eq!(store.get(&token).as_deref(), Some(&stored("sha256:abc")));
        assert!(store.get("missing").is_none());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_expired_entries_are_hidden_and_purged() {
        let store = ResultStore::new(Duration::from_secs(10));
        let start = Instant::now();

        let old = store.insert_at(stored("a"), start);
        assert!(store.get_at(&old, start + Duration::from_secs(10)).is_some());
        assert!(store.get_at(&old, start + Duration::from_secs(11)).is_none());

        let fresh = store.insert_at(stored("b"), start + Duration::from_secs(11));
        assert_eq!(store.len(), 1);
        assert!(store
            .get_at(&fresh, start + Duration::from_secs(11))
            .is_some());
    }

    #[test]
    fn test_tokens_are_unique() {
        let store = ResultStore::new(Duration::from_secs(60));
        let a = store.insert(CapitalGainsReport::default(), "x".to_string());
        let b = store.insert(CapitalGainsReport::default(), "x".to_string());
        assert_ne!(a, b);
        assert!(!store.is_empty());
    }
}
