/// In-process backend implementing the gateway contract
///
/// Behaves like a well-formed server whose availability can be switched off
/// and on, which is how offline periods are simulated.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::domain::{DailyUsageLog, LogId, VehicleProfile};
use crate::remote::{RemoteError, RemoteGateway};

#[derive(Default)]
struct Backend {
    profile: Option<VehicleProfile>,
    logs: Vec<DailyUsageLog>,
}

pub struct MemoryGateway {
    backend: Mutex<Backend>,
    available: AtomicBool,
    calls: AtomicUsize,
}

impl Default for MemoryGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self {
            backend: Mutex::new(Backend::default()),
            available: AtomicBool::new(true),
            calls: AtomicUsize::new(0),
        }
    }

    /// Seed the server-side log collection (most recent first)
    pub fn with_logs(self, logs: Vec<DailyUsageLog>) -> Self {
        if let Ok(mut backend) = self.backend.lock() {
            backend.logs = logs;
        }
        self
    }

    pub fn with_profile(self, profile: VehicleProfile) -> Self {
        if let Ok(mut backend) = self.backend.lock() {
            backend.profile = Some(profile);
        }
        self
    }

    /// Simulate the backend going down or coming back
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Number of gateway calls received, failed ones included
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Snapshot of the server-side logs
    pub fn logs(&self) -> Vec<DailyUsageLog> {
        self.backend.lock().map(|b| b.logs.clone()).unwrap_or_default()
    }

    /// Snapshot of the server-side profile
    pub fn profile(&self) -> Option<VehicleProfile> {
        self.backend.lock().ok().and_then(|b| b.profile.clone())
    }

    fn enter(&self) -> Result<MutexGuard<'_, Backend>, RemoteError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.available.load(Ordering::SeqCst) {
            return Err(RemoteError::Transport("backend unavailable".to_string()));
        }
        self.backend
            .lock()
            .map_err(|_| RemoteError::Transport("backend lock poisoned".to_string()))
    }
}

#[async_trait]
impl RemoteGateway for MemoryGateway {
    async fn fetch_profile(&self) -> Result<VehicleProfile, RemoteError> {
        let backend = self.enter()?;
        Ok(backend.profile.clone().unwrap_or_default())
    }

    async fn save_profile(&self, profile: &VehicleProfile) -> Result<VehicleProfile, RemoteError> {
        let mut backend = self.enter()?;
        let stored = profile.clone().normalized();
        backend.profile = Some(stored.clone());
        Ok(stored)
    }

    async fn list_logs(&self) -> Result<Vec<DailyUsageLog>, RemoteError> {
        let backend = self.enter()?;
        Ok(backend.logs.clone())
    }

    async fn create_log(&self, log: &DailyUsageLog) -> Result<DailyUsageLog, RemoteError> {
        let mut backend = self.enter()?;
        backend.logs.retain(|existing| existing.id != log.id);
        backend.logs.insert(0, log.clone());
        Ok(log.clone())
    }

    async fn delete_log(&self, id: &LogId) -> Result<LogId, RemoteError> {
        let mut backend = self.enter()?;
        backend.logs.retain(|existing| &existing.id != id);
        Ok(id.clone())
    }
}
