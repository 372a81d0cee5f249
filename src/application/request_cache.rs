// Request cache - Fetch lifecycles and memoized plot data
use crate::application::ozone_repository::OzoneRepository;
use crate::domain::cache::{CacheEntry, PlotCacheSection, RequestRecord};
use crate::domain::plot::{KeyScope, PlotRequest, PlotType};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tokio::task::JoinHandle;

#[derive(Debug, Default)]
struct CacheState {
    models: RequestRecord<Vec<String>>,
    plot_types: RequestRecord<Vec<String>>,
    zonal_mean: PlotCacheSection,
    return_recovery: PlotCacheSection,
}

impl CacheState {
    fn section(&self, plot_type: PlotType) -> &PlotCacheSection {
        match plot_type {
            PlotType::ZonalMean => &self.zonal_mean,
            PlotType::ReturnRecovery => &self.return_recovery,
        }
    }

    fn section_mut(&mut self, plot_type: PlotType) -> &mut PlotCacheSection {
        match plot_type {
            PlotType::ZonalMean => &mut self.zonal_mean,
            PlotType::ReturnRecovery => &mut self.return_recovery,
        }
    }
}

/// Tracks the three remote collections and memoizes plot data per request key.
///
/// The pending transition of every fetch is written before its task is spawned,
/// so readers see `Loading` (and, for plot data, the new active key) as soon as
/// the fetch call returns. A completing task only writes to the entry it was
/// started for. Entries are never evicted.
#[derive(Clone)]
pub struct RequestCache {
    repository: Arc<dyn OzoneRepository>,
    state: Arc<RwLock<CacheState>>,
    key_scope: KeyScope,
}

impl RequestCache {
    pub fn new(repository: Arc<dyn OzoneRepository>, key_scope: KeyScope) -> Self {
        Self {
            repository,
            state: Arc::new(RwLock::new(CacheState::default())),
            key_scope,
        }
    }

    pub fn key_scope(&self) -> KeyScope {
        self.key_scope
    }

    pub fn fetch_models(&self) -> JoinHandle<()> {
        self.write().models.begin();

        let repo = self.repository.clone();
        let state = self.state.clone();
        tokio::spawn(async move {
            let result = repo.get_models().await;
            let mut guard = state.write().unwrap_or_else(PoisonError::into_inner);
            match result {
                Ok(models) => {
                    tracing::debug!("Fetched {} models", models.len());
                    guard.models.succeed(models);
                }
                Err(e) => {
                    tracing::warn!("Fetching models failed: {:#}", e);
                    guard.models.fail(format!("{:#}", e));
                }
            }
        })
    }

    pub fn fetch_plot_types(&self) -> JoinHandle<()> {
        self.write().plot_types.begin();

        let repo = self.repository.clone();
        let state = self.state.clone();
        tokio::spawn(async move {
            let result = repo.get_plot_types().await;
            let mut guard = state.write().unwrap_or_else(PoisonError::into_inner);
            match result {
                Ok(plot_types) => {
                    tracing::debug!("Fetched {} plot types", plot_types.len());
                    guard.plot_types.succeed(plot_types);
                }
                Err(e) => {
                    tracing::warn!("Fetching plot types failed: {:#}", e);
                    guard.plot_types.fail(format!("{:#}", e));
                }
            }
        })
    }

    /// Starts a plot data fetch and returns its cache key with the task handle.
    pub fn fetch_plot_data(&self, request: PlotRequest) -> (String, JoinHandle<()>) {
        let plot_type = request.plot_type;
        let key = request.cache_key(self.key_scope);

        self.write().section_mut(plot_type).begin(&key);
        tracing::debug!("Fetching {} data for key {}", plot_type, key);

        let repo = self.repository.clone();
        let state = self.state.clone();
        let task_key = key.clone();
        let handle = tokio::spawn(async move {
            let result = repo.get_plot_data(&request).await;
            let mut guard = state.write().unwrap_or_else(PoisonError::into_inner);
            let Some(entry) = guard.section_mut(plot_type).entry_mut(&task_key) else {
                return;
            };
            match result {
                Ok(series) => {
                    tracing::debug!(
                        "Cached {} series for {} key {}",
                        series.len(),
                        plot_type,
                        task_key
                    );
                    entry.succeed(series);
                }
                Err(e) => {
                    tracing::warn!("Fetching {} data failed for key {}: {:#}", plot_type, task_key, e);
                    entry.fail(format!("{:#}", e));
                }
            }
        });

        (key, handle)
    }

    pub fn models(&self) -> RequestRecord<Vec<String>> {
        self.read().models.clone()
    }

    pub fn plot_types(&self) -> RequestRecord<Vec<String>> {
        self.read().plot_types.clone()
    }

    /// Entry selected for display, or a bare `Loading` record when nothing has
    /// been requested for this plot type yet.
    pub fn active_entry_for(&self, plot_type: PlotType) -> CacheEntry {
        self.read()
            .section(plot_type)
            .active_entry()
            .cloned()
            .unwrap_or_else(CacheEntry::loading)
    }

    pub fn active_key(&self, plot_type: PlotType) -> Option<String> {
        self.read().section(plot_type).active().map(str::to_string)
    }

    pub fn entry(&self, plot_type: PlotType, key: &str) -> Option<CacheEntry> {
        self.read().section(plot_type).entry(key).cloned()
    }

    pub fn cached_keys(&self, plot_type: PlotType) -> Vec<String> {
        self.read().section(plot_type).keys()
    }

    fn read(&self) -> RwLockReadGuard<'_, CacheState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, CacheState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}
