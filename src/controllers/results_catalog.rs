use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::{
    sync::{broadcast::error::RecvError, RwLock},
    task::JoinHandle,
};

use crate::{
    config::Config,
    errors::AppResult,
    models::{
        domain::{BandFilter, FilterState, QuizAttemptRecord},
        dto::{PageRequest, PageResult, ResultStatistics},
    },
    repositories::{CacheEvent, PruneReport, ResultsCacheRepository},
    services::{
        certificate_service::{CertificateDocument, CertificateService},
        results_query::{apply_filters, compute_statistics, paginate},
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogState {
    Uninitialized,
    Loading,
    Ready,
}

/// Read side of the quiz-results cache: retention, loading, the current
/// filter and everything derived from it. There is no error state; an
/// unreadable cache shows as an empty catalog.
pub struct ResultsCatalogController {
    cache: ResultsCacheRepository,
    certificates: CertificateService,
    retention_days: i64,
    page_size: usize,
    state: RwLock<CatalogState>,
    results: RwLock<Vec<QuizAttemptRecord>>,
    filter: RwLock<FilterState>,
}

impl ResultsCatalogController {
    pub fn new(cache: ResultsCacheRepository, certificates: CertificateService, config: &Config) -> Self {
        Self {
            cache,
            certificates,
            retention_days: config.results_retention_days,
            page_size: config.results_page_size,
            state: RwLock::new(CatalogState::Uninitialized),
            results: RwLock::new(Vec::new()),
            filter: RwLock::new(FilterState::default()),
        }
    }

    pub async fn state(&self) -> CatalogState {
        *self.state.read().await
    }

    /// Prunes expired entries once, then loads what remains.
    pub async fn activate(&self, now: DateTime<Utc>) -> PruneReport {
        let report = self.cache.prune_expired(self.retention_days, now).await;
        self.load_results().await;
        report
    }

    /// Replaces the working set with the cached records. An absent or corrupt
    /// cache leaves the catalog empty but ready.
    pub async fn load_results(&self) -> Vec<QuizAttemptRecord> {
        *self.state.write().await = CatalogState::Loading;

        let results = match self.cache.read_results().await {
            Ok(results) => results,
            Err(err) => {
                log::warn!("Showing an empty catalog: {}", err);
                Vec::new()
            }
        };

        log::debug!("Loaded {} quiz results", results.len());
        *self.results.write().await = results.clone();
        *self.state.write().await = CatalogState::Ready;
        results
    }

    pub async fn results(&self) -> Vec<QuizAttemptRecord> {
        self.results.read().await.clone()
    }

    pub async fn filter(&self) -> FilterState {
        self.filter.read().await.clone()
    }

    pub async fn set_filter(&self, filter: FilterState) {
        log::debug!("Catalog filter: {}", filter);
        *self.filter.write().await = filter;
    }

    pub async fn set_search(&self, search: &str) {
        self.filter.write().await.search = search.to_string();
    }

    pub async fn set_band(&self, band: BandFilter) {
        self.filter.write().await.band = band;
    }

    /// Applies a combined option such as `score-desc`. The filter is left
    /// unchanged when the option is not recognised.
    pub async fn set_sort_option(&self, option: &str) -> AppResult<()> {
        let mut next = self.filter().await;
        next.set_sort_option(option)?;
        self.set_filter(next).await;
        Ok(())
    }

    /// The working set under the current filter.
    pub async fn filtered(&self) -> Vec<QuizAttemptRecord> {
        let filter = self.filter.read().await.clone();
        apply_filters(&self.results.read().await, &filter)
    }

    pub async fn statistics(&self) -> Option<ResultStatistics> {
        compute_statistics(&self.filtered().await)
    }

    /// Page `page` (1-based) of the filtered results.
    pub async fn page(&self, page: usize) -> AppResult<PageResult<QuizAttemptRecord>> {
        paginate(&self.filtered().await, PageRequest::new(page, self.page_size))
    }

    /// Any change to the cache invalidates the working set.
    pub async fn handle_event(&self, event: CacheEvent) {
        log::debug!("Reloading results after {:?}", event);
        self.load_results().await;
    }

    /// Reloads on every cache event. The task holds the controller weakly: it
    /// ends once the controller is dropped, either when the channel closes
    /// with it or at the next event after that.
    pub fn watch(self: Arc<Self>) -> JoinHandle<()> {
        let mut events = self.cache.subscribe();
        let controller = Arc::downgrade(&self);
        tokio::spawn(async move {
            loop {
                let received = events.recv().await;
                let Some(catalog) = controller.upgrade() else {
                    log::debug!("Catalog dropped, stopping cache watcher");
                    break;
                };
                match received {
                    Ok(event) => catalog.handle_event(event).await,
                    Err(RecvError::Lagged(missed)) => {
                        log::warn!("Missed {} cache events, reloading", missed);
                        catalog.load_results().await;
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        })
    }

    /// Stores a finished attempt. Subscribers, this controller's watcher
    /// included, are told to reload.
    pub async fn record_attempt(&self, record: &QuizAttemptRecord) -> AppResult<()> {
        self.cache.append_result(record).await
    }

    pub async fn print_certificate(&self, record: &QuizAttemptRecord) -> AppResult<CertificateDocument> {
        self.certificates.print(record).await
    }
}
