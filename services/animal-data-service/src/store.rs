use chrono::{DateTime, SecondsFormat, Utc};
use std::collections::VecDeque;
use tokio::sync::Mutex;

use crate::models::{AnimalRecord, NewAnimalRecord};

const UNKNOWN_SOURCE: &str = "unknown";

#[derive(Clone, Copy, Debug)]
pub struct StoreConfig {
    pub retain_history: bool,
    pub max_history: usize,
}

impl StoreConfig {
    pub fn with_history(max_history: usize) -> Self {
        Self {
            retain_history: true,
            max_history,
        }
    }

    pub fn latest_only() -> Self {
        Self {
            retain_history: false,
            max_history: 0,
        }
    }
}

pub struct AnimalStore {
    config: StoreConfig,
    inner: Mutex<StoreInner>,
}

#[derive(Default)]
struct StoreInner {
    latest: Option<AnimalRecord>,
    history: VecDeque<AnimalRecord>,
    last_id: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HistoryLimit {
    First(usize),
    // Negative limits count back from the end, like `slice(0, -n)`.
    AllButLast(usize),
}

impl HistoryLimit {
    fn resolve(self, len: usize) -> usize {
        match self {
            HistoryLimit::First(count) => count,
            HistoryLimit::AllButLast(count) => len.saturating_sub(count),
        }
    }
}

pub struct Overview {
    pub latest: Option<AnimalRecord>,
    pub history: Vec<AnimalRecord>,
    pub total: usize,
}

impl AnimalStore {
    pub fn new(config: StoreConfig) -> Self {
        Self {
            config,
            inner: Mutex::new(StoreInner::default()),
        }
    }

    pub fn retains_history(&self) -> bool {
        self.config.retain_history
    }

    pub async fn put(&self, record: NewAnimalRecord) -> AnimalRecord {
        self.put_at(record, Utc::now()).await
    }

    pub async fn put_at(&self, record: NewAnimalRecord, received_at: DateTime<Utc>) -> AnimalRecord {
        let mut inner = self.inner.lock().await;
        let id = inner.next_id(received_at);
        let stored = AnimalRecord {
            job_id: record.job_id,
            generation: record.generation,
            display_name: record.display_name,
            timestamp: record
                .timestamp
                .unwrap_or_else(|| received_at.to_rfc3339_opts(SecondsFormat::Millis, true)),
            source: record.source.unwrap_or_else(|| UNKNOWN_SOURCE.to_string()),
            id,
        };

        inner.latest = Some(stored.clone());
        if self.config.retain_history {
            inner.history.push_front(stored.clone());
            inner.history.truncate(self.config.max_history);
        }
        stored
    }

    pub async fn latest(&self) -> Option<AnimalRecord> {
        self.inner.lock().await.latest.clone()
    }

    pub async fn history(&self, limit: HistoryLimit) -> (Vec<AnimalRecord>, usize) {
        let inner = self.inner.lock().await;
        let total = inner.history.len();
        (inner.recent(limit.resolve(total)), total)
    }

    pub async fn overview(&self, limit: usize) -> Overview {
        let inner = self.inner.lock().await;
        Overview {
            latest: inner.latest.clone(),
            history: inner.recent(limit),
            total: inner.history.len(),
        }
    }
}

impl StoreInner {
    // Millisecond wall clock, bumped past the previous id when the clock stalls.
    fn next_id(&mut self, received_at: DateTime<Utc>) -> u64 {
        let millis = u64::try_from(received_at.timestamp_millis()).unwrap_or(0);
        let id = millis.max(self.last_id + 1);
        self.last_id = id;
        id
    }

    fn recent(&self, limit: usize) -> Vec<AnimalRecord> {
        self.history.iter().take(limit).cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn candidate(job_id: &str) -> NewAnimalRecord {
        NewAnimalRecord {
            job_id: job_id.to_string(),
            generation: "gen".to_string(),
            display_name: "name".to_string(),
            timestamp: None,
            source: None,
        }
    }

    #[tokio::test]
    async fn applies_defaults_at_receipt() {
        let store = AnimalStore::new(StoreConfig::with_history(50));
        let received_at = Utc.with_ymd_and_hms(2025, 3, 4, 5, 6, 7).unwrap();
        let stored = store.put_at(candidate("j1"), received_at).await;

        assert_eq!(stored.source, "unknown");
        assert_eq!(stored.timestamp, "2025-03-04T05:06:07.000Z");
        assert_eq!(stored.id, received_at.timestamp_millis() as u64);
    }

    #[tokio::test]
    async fn history_is_bounded_and_newest_first() {
        let store = AnimalStore::new(StoreConfig::with_history(50));
        for index in 0..60 {
            store.put(candidate(&format!("job-{index}"))).await;
        }

        let (history, total) = store.history(HistoryLimit::First(100)).await;
        assert_eq!(total, 50);
        assert_eq!(history.len(), 50);
        assert_eq!(history[0].job_id, "job-59");
        assert_eq!(history[49].job_id, "job-10");
        assert_eq!(store.latest().await, Some(history[0].clone()));
    }

    #[tokio::test]
    async fn negative_limit_drops_oldest_entries() {
        let store = AnimalStore::new(StoreConfig::with_history(50));
        for index in 0..12 {
            store.put(candidate(&format!("job-{index}"))).await;
        }

        let (history, total) = store.history(HistoryLimit::AllButLast(3)).await;
        assert_eq!(total, 12);
        assert_eq!(history.len(), 9);
        assert_eq!(history[0].job_id, "job-11");
        assert_eq!(history[8].job_id, "job-3");

        let (history, _) = store.history(HistoryLimit::AllButLast(40)).await;
        assert!(history.is_empty());
    }

    #[tokio::test]
    async fn ids_stay_unique_within_one_millisecond() {
        let store = AnimalStore::new(StoreConfig::with_history(10));
        let received_at = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let first = store.put_at(candidate("a"), received_at).await;
        let second = store.put_at(candidate("b"), received_at).await;
        assert!(second.id > first.id);
    }

    #[tokio::test]
    async fn latest_only_store_keeps_no_history() {
        let store = AnimalStore::new(StoreConfig::latest_only());
        store.put(candidate("first")).await;
        let second = store.put(candidate("second")).await;

        assert_eq!(store.latest().await, Some(second));
        let overview = store.overview(5).await;
        assert!(overview.history.is_empty());
        assert_eq!(overview.total, 0);
    }

    #[tokio::test]
    async fn empty_store_overview() {
        let store = AnimalStore::new(StoreConfig::with_history(50));
        let overview = store.overview(5).await;
        assert!(overview.latest.is_none());
        assert!(overview.history.is_empty());
        assert_eq!(overview.total, 0);
    }
}
