// Application state for HTTP handlers
use crate::application::model_group_store::ModelGroupStore;
use crate::application::request_cache::RequestCache;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Clone)]
pub struct AppState {
    pub request_cache: RequestCache,
    pub group_store: Arc<RwLock<ModelGroupStore>>,
}

impl AppState {
    pub fn new(request_cache: RequestCache, group_store: ModelGroupStore) -> Self {
        Self {
            request_cache,
            group_store: Arc::new(RwLock::new(group_store)),
        }
    }

    pub fn groups(&self) -> RwLockReadGuard<'_, ModelGroupStore> {
        self.group_store.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn groups_mut(&self) -> RwLockWriteGuard<'_, ModelGroupStore> {
        self.group_store.write().unwrap_or_else(PoisonError::into_inner)
    }
}
