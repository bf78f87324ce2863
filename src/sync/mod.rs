/// Sync coordinator combining the remote gateway and the local cache
///
/// Every operation tries the backend first and always mirrors the outcome
/// into the cache. No operation ever fails: remote and cache errors are
/// logged and replaced by a cache-based (or caller-supplied) result.
///
/// Log collections returned here are always most-recent-first by `dateISO`,
/// keeping insertion order among logs of the same day. Logs created while
/// the backend was unreachable are cached as pending, survive later remote
/// refreshes, and are pushed by `flush_pending`.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::DEFAULT_RETENTION;
use crate::domain::{DailyUsageLog, LogId, VehicleProfile};
use crate::remote::RemoteGateway;
use crate::storage::{CacheKey, CacheStore, StorageError};

/// A log as kept in the local cache
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedLog {
    #[serde(flatten)]
    pub log: DailyUsageLog,
    /// Not yet accepted by the backend
    #[serde(default, skip_serializing_if = "is_false")]
    pub pending: bool,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl CachedLog {
    fn synced(log: DailyUsageLog) -> Self {
        Self { log, pending: false }
    }

    fn pending(log: DailyUsageLog) -> Self {
        Self { log, pending: true }
    }
}

/// Outcome of pushing pending logs to the backend
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlushReport {
    pub pushed: usize,
    pub still_pending: usize,
}

/// Most recent day first; stable, so same-day logs keep insertion order
fn sort_recent_first(logs: &mut [CachedLog]) {
    logs.sort_by(|a, b| b.log.date_iso.cmp(&a.log.date_iso));
}

/// Drop the oldest synced logs until at most `retention` remain
///
/// Pending logs and `keep` are never dropped, so the cap can be exceeded
/// while the backend is unreachable.
fn cap_entries(entries: &mut Vec<CachedLog>, retention: usize, keep: &LogId) {
    let mut excess = entries.len().saturating_sub(retention);
    let mut index = entries.len();
    while excess > 0 && index > 0 {
        index -= 1;
        let entry = &entries[index];
        if !entry.pending && &entry.log.id != keep {
            entries.remove(index);
            excess -= 1;
        }
    }
    if excess > 0 {
        warn!("Cache holds {} logs over retention, all pending", excess);
    }
}

pub struct SyncCoordinator<C, G> {
    cache: C,
    gateway: G,
    retention: usize,
}

impl<C: CacheStore, G: RemoteGateway> SyncCoordinator<C, G> {
    pub fn new(cache: C, gateway: G) -> Self {
        Self::with_retention(cache, gateway, DEFAULT_RETENTION)
    }

    /// Keep at most `retention` logs in the cache when adding
    pub fn with_retention(cache: C, gateway: G, retention: usize) -> Self {
        Self {
            cache,
            gateway,
            retention: retention.max(1),
        }
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Load the profile, falling back to the cache and then to defaults
    pub async fn load_profile(&self) -> VehicleProfile {
        match self.gateway.fetch_profile().await {
            Ok(remote) => {
                let profile = remote.normalized();
                self.store_profile(&profile);
                debug!("load_profile: synced from remote");
                profile
            }
            Err(e) => {
                warn!("load_profile: remote failed, serving cache: {}", e);
                self.cached_profile().unwrap_or_default()
            }
        }
    }

    /// Save the profile; the cache reflects it whatever the remote outcome
    ///
    /// Returns the server's echo on success, `next` unchanged otherwise.
    pub async fn save_profile(&self, next: VehicleProfile) -> VehicleProfile {
        match self.gateway.save_profile(&next).await {
            Ok(echo) => {
                let profile = echo.normalized();
                self.store_profile(&profile);
                debug!("save_profile: accepted by remote");
                profile
            }
            Err(e) => {
                warn!("save_profile: remote failed, kept locally: {}", e);
                self.store_profile(&next);
                next
            }
        }
    }

    /// List logs; a successful remote read replaces the cached collection
    ///
    /// Pending logs that the backend does not know about yet are kept.
    pub async fn list_logs(&self) -> Vec<DailyUsageLog> {
        match self.gateway.list_logs().await {
            Ok(remote) => {
                let mut merged: Vec<CachedLog> =
                    remote.into_iter().map(CachedLog::synced).collect();

                let unsent: Vec<CachedLog> = self
                    .cached_entries()
                    .into_iter()
                    .filter(|c| c.pending && !merged.iter().any(|r| r.log.id == c.log.id))
                    .collect();
                if !unsent.is_empty() {
                    debug!("list_logs: keeping {} pending logs", unsent.len());
                }
                merged.extend(unsent);

                sort_recent_first(&mut merged);
                self.store_entries(&merged);
                debug!("list_logs: synced {} logs from remote", merged.len());
                merged.into_iter().map(|c| c.log).collect()
            }
            Err(e) => {
                warn!("list_logs: remote failed, serving cache: {}", e);
                self.cached_logs()
            }
        }
    }

    /// Record a new log; always returns a log, remote or not
    pub async fn add_log(&self, log: DailyUsageLog) -> DailyUsageLog {
        let entry = match self.gateway.create_log(&log).await {
            Ok(saved) => {
                debug!("add_log: {} accepted by remote", saved.id);
                CachedLog::synced(saved)
            }
            Err(e) => {
                warn!("add_log: remote failed, {} kept as pending: {}", log.id, e);
                CachedLog::pending(log)
            }
        };

        let mut entries = vec![entry.clone()];
        entries.extend(
            self.cached_entries()
                .into_iter()
                .filter(|c| c.log.id != entry.log.id),
        );
        sort_recent_first(&mut entries);
        cap_entries(&mut entries, self.retention, &entry.log.id);
        self.store_entries(&entries);

        entry.log
    }

    /// Remove a log everywhere; removing an unknown id is not an error
    pub async fn remove_log(&self, id: &LogId) -> LogId {
        if let Err(e) = self.gateway.delete_log(id).await {
            warn!("remove_log: remote failed, removing {} locally: {}", id, e);
        }

        let mut entries = self.cached_entries();
        let before = entries.len();
        entries.retain(|c| &c.log.id != id);
        if entries.len() != before {
            self.store_entries(&entries);
        }

        id.clone()
    }

    /// Push pending logs one at a time, in the order they were recorded
    pub async fn flush_pending(&self) -> FlushReport {
        let mut entries = self.cached_entries();
        let mut report = FlushReport::default();

        // Oldest first, so the backend receives them in creation order
        for entry in entries.iter_mut().rev().filter(|c| c.pending) {
            match self.gateway.create_log(&entry.log).await {
                Ok(saved) => {
                    *entry = CachedLog::synced(saved);
                    report.pushed += 1;
                }
                Err(e) => {
                    warn!("flush_pending: {} still pending: {}", entry.log.id, e);
                    report.still_pending += 1;
                }
            }
        }

        if report.pushed > 0 {
            sort_recent_first(&mut entries);
            self.store_entries(&entries);
            info!("Pushed {} pending logs", report.pushed);
        }

        report
    }

    /// Cached logs, without contacting the backend
    pub fn cached_logs(&self) -> Vec<DailyUsageLog> {
        self.cached_entries().into_iter().map(|c| c.log).collect()
    }

    /// Number of cached logs the backend has not accepted yet
    pub fn pending_count(&self) -> usize {
        self.cached_entries().iter().filter(|c| c.pending).count()
    }

    fn cached_profile(&self) -> Option<VehicleProfile> {
        match self.cache.read(CacheKey::Profile) {
            Ok(Some(value)) => VehicleProfile::from_json(&value),
            Ok(None) => None,
            Err(e) => {
                warn!("Failed to read cached profile: {}", e);
                None
            }
        }
    }

    fn store_profile(&self, profile: &VehicleProfile) {
        self.write_value(CacheKey::Profile, serde_json::to_value(profile));
    }

    /// Cached collection, sorted; unreadable data counts as empty
    fn cached_entries(&self) -> Vec<CachedLog> {
        let value = match self.cache.read(CacheKey::Logs) {
            Ok(Some(value)) => value,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!("Failed to read cached logs: {}", e);
                return Vec::new();
            }
        };

        match serde_json::from_value::<Vec<CachedLog>>(value) {
            Ok(mut entries) => {
                sort_recent_first(&mut entries);
                entries
            }
            Err(e) => {
                warn!("Discarding malformed cached logs: {}", e);
                Vec::new()
            }
        }
    }

    fn store_entries(&self, entries: &[CachedLog]) {
        self.write_value(CacheKey::Logs, serde_json::to_value(entries));
    }

    fn write_value(&self, key: CacheKey, value: Result<Value, serde_json::Error>) {
        let result = value
            .map_err(StorageError::from)
            .and_then(|value| self.cache.write(key, &value));
        if let Err(e) = result {
            warn!("Failed to write cache key '{}': {}", key.as_str(), e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::{MemoryGateway, OfflineGateway};
    use crate::storage::MemoryCache;
    use chrono::NaiveDate;

    fn log(id: &str, date: &str) -> DailyUsageLog {
        DailyUsageLog {
            id: LogId::from(id),
            date_iso: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            odometer_start: 100.0,
            odometer_end: 150.0,
            fuel_start_liters: 3.0,
            fuel_end_liters: None,
            refuels: vec![],
            notes: None,
        }
    }

    fn ids(logs: &[DailyUsageLog]) -> Vec<&str> {
        logs.iter().map(|l| l.id.as_str()).collect()
    }

    #[tokio::test]
    async fn test_load_profile_defaults_when_offline_and_empty() {
        let sync = SyncCoordinator::new(MemoryCache::new(), OfflineGateway);
        assert_eq!(sync.load_profile().await, VehicleProfile::default());
    }

    #[tokio::test]
    async fn test_save_then_load_offline() {
        let sync = SyncCoordinator::new(MemoryCache::new(), OfflineGateway);
        let profile = VehicleProfile {
            fuel_economy_km_per_liter: 38.5,
            fuel_price_per_liter: Some(6.19),
            last_oil_change_odometer: Some(12000.0),
            ..VehicleProfile::default()
        };

        assert_eq!(sync.save_profile(profile.clone()).await, profile);
        assert_eq!(sync.load_profile().await, profile);
    }

    #[tokio::test]
    async fn test_load_profile_normalizes_remote() {
        let remote = MemoryGateway::new().with_profile(VehicleProfile {
            fuel_economy_km_per_liter: -1.0,
            ..VehicleProfile::default()
        });
        let sync = SyncCoordinator::new(MemoryCache::new(), remote);

        let profile = sync.load_profile().await;
        assert_eq!(profile.fuel_economy_km_per_liter, 30.0);

        sync.gateway().set_available(false);
        assert_eq!(sync.load_profile().await, profile);
    }

    #[tokio::test]
    async fn test_add_log_offline_is_pending_and_sorted() {
        let sync = SyncCoordinator::new(MemoryCache::new(), OfflineGateway);
        sync.add_log(log("b", "2024-05-02")).await;
        sync.add_log(log("a", "2024-05-01")).await;
        sync.add_log(log("c", "2024-05-03")).await;

        assert_eq!(ids(&sync.list_logs().await), vec!["c", "b", "a"]);
        assert_eq!(sync.pending_count(), 3);
    }

    #[tokio::test]
    async fn test_retention_caps_cache() {
        let sync = SyncCoordinator::with_retention(MemoryCache::new(), MemoryGateway::new(), 2);
        sync.add_log(log("a", "2024-05-01")).await;
        sync.add_log(log("b", "2024-05-02")).await;
        sync.add_log(log("c", "2024-05-03")).await;

        assert_eq!(ids(&sync.cached_logs()), vec!["c", "b"]);
    }

    #[tokio::test]
    async fn test_retention_never_drops_new_or_pending_logs() {
        let sync = SyncCoordinator::with_retention(MemoryCache::new(), MemoryGateway::new(), 2);
        sync.add_log(log("a", "2024-05-03")).await;
        sync.add_log(log("b", "2024-05-02")).await;

        sync.gateway().set_available(false);
        let late = sync.add_log(log("late", "2024-05-01")).await;

        assert_eq!(late.id, LogId::from("late"));
        assert_eq!(ids(&sync.cached_logs()), vec!["a", "late"]);
        assert_eq!(sync.pending_count(), 1);

        // only pending logs left over the cap: all of them stay
        let offline = SyncCoordinator::with_retention(MemoryCache::new(), OfflineGateway, 2);
        offline.add_log(log("x", "2024-05-03")).await;
        offline.add_log(log("y", "2024-05-02")).await;
        offline.add_log(log("z", "2024-05-01")).await;
        assert_eq!(ids(&offline.cached_logs()), vec!["x", "y", "z"]);
        assert_eq!(offline.pending_count(), 3);
    }

    #[tokio::test]
    async fn test_save_profile_caches_remote_echo() {
        let sync = SyncCoordinator::new(MemoryCache::new(), MemoryGateway::new());
        let submitted = VehicleProfile {
            fuel_price_per_liter: Some(-1.0),
            ..VehicleProfile::default()
        };

        let saved = sync.save_profile(submitted).await;
        assert_eq!(saved.fuel_price_per_liter, None);
        assert_eq!(sync.gateway().profile().unwrap().fuel_price_per_liter, None);

        sync.gateway().set_available(false);
        let cached = sync.load_profile().await;
        assert_eq!(cached, saved);
        assert_eq!(cached.fuel_price_per_liter, None);
    }

    #[tokio::test]
    async fn test_remote_refresh_keeps_pending_logs() {
        let remote = MemoryGateway::new().with_logs(vec![log("server", "2024-05-01")]);
        let sync = SyncCoordinator::new(MemoryCache::new(), remote);

        sync.gateway().set_available(false);
        sync.add_log(log("offline", "2024-05-02")).await;
        sync.gateway().set_available(true);

        assert_eq!(ids(&sync.list_logs().await), vec!["offline", "server"]);
        assert_eq!(sync.pending_count(), 1);

        let report = sync.flush_pending().await;
        assert_eq!(report, FlushReport { pushed: 1, still_pending: 0 });
        assert_eq!(sync.pending_count(), 0);
        assert_eq!(ids(&sync.gateway().logs()), vec!["offline", "server"]);
    }

    #[tokio::test]
    async fn test_remote_refresh_drops_synced_logs_missing_remotely() {
        let remote = MemoryGateway::new();
        let sync = SyncCoordinator::new(MemoryCache::new(), remote);
        sync.add_log(log("a", "2024-05-01")).await;

        // deleted by another client
        sync.gateway().delete_log(&LogId::from("a")).await.unwrap();

        assert!(sync.list_logs().await.is_empty());
        assert!(sync.cached_logs().is_empty());
    }

    #[tokio::test]
    async fn test_remove_unknown_id_is_noop() {
        let sync = SyncCoordinator::new(MemoryCache::new(), OfflineGateway);
        sync.add_log(log("a", "2024-05-01")).await;

        let removed = sync.remove_log(&LogId::from("missing")).await;
        assert_eq!(removed, LogId::from("missing"));
        assert_eq!(ids(&sync.cached_logs()), vec!["a"]);
    }

    #[tokio::test]
    async fn test_one_remote_call_per_operation() {
        let sync = SyncCoordinator::new(MemoryCache::new(), MemoryGateway::new());
        sync.load_profile().await;
        sync.list_logs().await;
        sync.add_log(log("a", "2024-05-01")).await;
        sync.remove_log(&LogId::from("a")).await;
        assert_eq!(sync.gateway().calls(), 4);
    }

    #[test]
    fn test_malformed_cache_reads_as_empty() {
        let cache = MemoryCache::new();
        cache.write(CacheKey::Logs, &serde_json::json!({"not": "a list"})).unwrap();
        let sync = SyncCoordinator::new(cache, OfflineGateway);

        let logs = tokio_test::block_on(sync.list_logs());
        assert!(logs.is_empty());
    }
}
