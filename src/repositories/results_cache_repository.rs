use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde_json::Value;
use tokio::sync::broadcast;

use crate::{
    config::Config,
    errors::{AppError, AppResult},
    models::domain::{parse_timestamp_value, MeetingRecord, QuizAttemptRecord},
    repositories::KeyValueStore,
};

const EVENT_CHANNEL_CAPACITY: usize = 16;

/// Signals that tell readers of the cache to re-read it. No payload beyond
/// the kind of change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheEvent {
    StorageChanged,
    QuizSubmitted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PruneOutcome {
    pub before: usize,
    pub after: usize,
}

impl PruneOutcome {
    pub fn removed(&self) -> usize {
        self.before - self.after
    }

    pub fn changed(&self) -> bool {
        self.before != self.after
    }
}

/// Per-cache result of a prune pass. `None` means the cache was absent or
/// unreadable and was left alone.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PruneReport {
    pub results: Option<PruneOutcome>,
    pub meetings: Option<PruneOutcome>,
}

/// Owner of the quiz-results cache and the meeting cache stored beside it.
///
/// The backing store is shared with other writers (the quiz-taking flow,
/// other windows) and there is no lock across a read-modify-write sequence:
/// an append that lands between a prune's read and its write is lost. Last
/// writer wins.
#[derive(Clone)]
pub struct ResultsCacheRepository {
    store: Arc<dyn KeyValueStore>,
    results_key: String,
    meeting_key: String,
    events: broadcast::Sender<CacheEvent>,
}

impl ResultsCacheRepository {
    pub fn new(store: Arc<dyn KeyValueStore>, config: &Config) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            store,
            results_key: config.results_cache_key.clone(),
            meeting_key: config.meeting_cache_key.clone(),
            events,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CacheEvent> {
        self.events.subscribe()
    }

    /// Publishes an external "storage changed" signal to subscribers.
    pub fn notify_storage_changed(&self) {
        self.publish(CacheEvent::StorageChanged);
    }

    fn publish(&self, event: CacheEvent) {
        // Err only means nobody is listening.
        if self.events.send(event).is_err() {
            log::debug!("No subscribers for {:?}", event);
        }
    }

    /// Raw array under `key`. `Ok(None)` when absent, `CacheCorruption` when
    /// the stored text is not a JSON array.
    async fn read_array(&self, key: &str) -> AppResult<Option<Vec<Value>>> {
        let Some(raw) = self.store.get(key).await? else {
            return Ok(None);
        };

        serde_json::from_str::<Vec<Value>>(&raw)
            .map(Some)
            .map_err(|e| AppError::CacheCorruption(format!("'{}' is not a JSON array: {}", key, e)))
    }

    async fn write_array(&self, key: &str, entries: &[Value]) -> AppResult<()> {
        let serialized = serde_json::to_string(entries)
            .map_err(|e| AppError::InternalError(format!("Failed to encode '{}': {}", key, e)))?;
        self.store.set(key, serialized).await
    }

    /// Every well-formed record in the cache, in stored order. Entries missing
    /// a student name, student id or score are skipped with a warning.
    pub async fn read_results(&self) -> AppResult<Vec<QuizAttemptRecord>> {
        let entries = self.read_array(&self.results_key).await?.unwrap_or_default();

        let mut records = Vec::with_capacity(entries.len());
        for (index, entry) in entries.into_iter().enumerate() {
            match serde_json::from_value::<QuizAttemptRecord>(entry) {
                Ok(record) => records.push(record),
                Err(err) => log::warn!("Skipping malformed quiz result #{}: {}", index, err),
            }
        }
        Ok(records)
    }

    pub async fn read_meetings(&self) -> AppResult<Vec<MeetingRecord>> {
        let entries = self.read_array(&self.meeting_key).await?.unwrap_or_default();
        Ok(entries.into_iter().map(MeetingRecord).collect())
    }

    /// Appends a completed attempt and notifies subscribers. A corrupt cache
    /// is replaced rather than extended.
    pub async fn append_result(&self, record: &QuizAttemptRecord) -> AppResult<()> {
        let mut entries = match self.read_array(&self.results_key).await {
            Ok(entries) => entries.unwrap_or_default(),
            Err(err) => {
                log::warn!("Replacing unreadable results cache: {}", err);
                Vec::new()
            }
        };
        entries.push(serde_json::to_value(record).map_err(|e| {
            AppError::InternalError(format!("Failed to encode quiz result: {}", e))
        })?);

        self.write_array(&self.results_key, &entries).await?;
        self.publish(CacheEvent::QuizSubmitted);
        Ok(())
    }

    /// Drops quiz results and meeting records older than
    /// `now - retention_days`. Entries without a readable timestamp are kept.
    /// A cache is rewritten only when something was removed; a corrupt cache
    /// is logged and left untouched. A retention of less than one day, or one
    /// reaching past the representable range, prunes nothing.
    pub async fn prune_expired(&self, retention_days: i64, now: DateTime<Utc>) -> PruneReport {
        let cutoff = match Duration::try_days(retention_days)
            .filter(|_| retention_days >= 1)
            .and_then(|window| now.checked_sub_signed(window))
        {
            Some(cutoff) => cutoff,
            None => {
                log::warn!("Ignoring unusable retention of {} days", retention_days);
                return PruneReport::default();
            }
        };

        let results = self
            .prune_key(&self.results_key, cutoff, |entry| {
                entry.get("completed_at").and_then(parse_timestamp_value)
            })
            .await;

        let meetings = self
            .prune_key(&self.meeting_key, cutoff, |entry| {
                MeetingRecord(entry.clone()).timestamp()
            })
            .await;

        PruneReport { results, meetings }
    }

    async fn prune_key<F>(&self, key: &str, cutoff: DateTime<Utc>, timestamp: F) -> Option<PruneOutcome>
    where
        F: Fn(&Value) -> Option<DateTime<Utc>>,
    {
        let entries = match self.read_array(key).await {
            Ok(Some(entries)) => entries,
            Ok(None) => return None,
            Err(err) => {
                log::warn!("Skipping retention pass for '{}': {}", key, err);
                return None;
            }
        };

        let before = entries.len();
        let kept: Vec<Value> = entries
            .into_iter()
            .filter(|entry| timestamp(entry).map_or(true, |ts| ts >= cutoff))
            .collect();
        let outcome = PruneOutcome {
            before,
            after: kept.len(),
        };

        if outcome.changed() {
            if let Err(err) = self.write_array(key, &kept).await {
                log::warn!("Failed to write pruned '{}': {}", key, err);
                return None;
            }
            log::info!(
                "Pruned {} expired entries from '{}' ({} remain)",
                outcome.removed(),
                key,
                outcome.after
            );
        }

        Some(outcome)
    }
}
