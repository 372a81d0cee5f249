// Request lifecycle records and per-plot cache sections
use serde::Serialize;
use std::collections::HashMap;

use super::plot::RawModelSeries;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    #[default]
    Idle,
    Loading,
    Success,
    Error,
}

/// Lifecycle of one remote request: `Idle -> Loading -> (Success | Error)`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestRecord<T> {
    pub status: RequestStatus,
    pub error: Option<String>,
    pub data: T,
}

impl<T: Default> Default for RequestRecord<T> {
    fn default() -> Self {
        Self {
            status: RequestStatus::Idle,
            error: None,
            data: T::default(),
        }
    }
}

impl<T: Default> RequestRecord<T> {
    pub fn loading() -> Self {
        Self {
            status: RequestStatus::Loading,
            ..Self::default()
        }
    }
}

impl<T> RequestRecord<T> {
    pub fn begin(&mut self) {
        self.status = RequestStatus::Loading;
        self.error = None;
    }

    pub fn succeed(&mut self, data: T) {
        self.status = RequestStatus::Success;
        self.error = None;
        self.data = data;
    }

    /// Records the failure; previously fetched data stays in place.
    pub fn fail(&mut self, message: String) {
        self.status = RequestStatus::Error;
        self.error = Some(message);
    }

    pub fn is_success(&self) -> bool {
        self.status == RequestStatus::Success
    }
}

pub type CacheEntry = RequestRecord<Vec<RawModelSeries>>;

/// Memoized plot requests of one plot type.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlotCacheSection {
    active: Option<String>,
    cached_requests: HashMap<String, CacheEntry>,
}

impl PlotCacheSection {
    pub fn active(&self) -> Option<&str> {
        self.active.as_deref()
    }

    /// Marks `key` as loading and selects it. An existing entry keeps its data.
    pub fn begin(&mut self, key: &str) {
        self.cached_requests
            .entry(key.to_string())
            .or_default()
            .begin();
        self.active = Some(key.to_string());
    }

    pub fn entry(&self, key: &str) -> Option<&CacheEntry> {
        self.cached_requests.get(key)
    }

    pub fn entry_mut(&mut self, key: &str) -> Option<&mut CacheEntry> {
        self.cached_requests.get_mut(key)
    }

    pub fn active_entry(&self) -> Option<&CacheEntry> {
        self.active.as_deref().and_then(|key| self.cached_requests.get(key))
    }

    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.cached_requests.keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn len(&self) -> usize {
        self.cached_requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cached_requests.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_lifecycle() {
        let mut record: RequestRecord<Vec<String>> = RequestRecord::default();
        assert_eq!(record.status, RequestStatus::Idle);

        record.begin();
        assert_eq!(record.status, RequestStatus::Loading);

        record.succeed(vec!["modelA".to_string()]);
        assert!(record.is_success());

        record.begin();
        record.fail("Timeout of API".to_string());
        assert_eq!(record.status, RequestStatus::Error);
        assert_eq!(record.error.as_deref(), Some("Timeout of API"));
        assert_eq!(record.data, vec!["modelA".to_string()]);
    }

    #[test]
    fn test_section_begin_selects_key() {
        let mut section = PlotCacheSection::default();
        assert!(section.active().is_none());
        assert!(section.active_entry().is_none());

        section.begin("k1");
        section.begin("k2");

        assert_eq!(section.active(), Some("k2"));
        assert_eq!(section.len(), 2);
        assert_eq!(section.active_entry().unwrap().status, RequestStatus::Loading);
        assert_eq!(section.keys(), vec!["k1", "k2"]);
    }

    #[test]
    fn test_record_serializes_lowercase_status() {
        let json = serde_json::to_value(CacheEntry::loading()).unwrap();
        assert_eq!(json["status"], "loading");
        assert!(json["error"].is_null());
    }
}
