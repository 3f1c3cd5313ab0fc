//! Host-side table of in-flight and finished requests.

use parking_lot::Mutex;
use serde_json::Value;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::AbortHandle;
use tokio::time::Instant;
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::TableConfig;
use crate::request::{PollResponse, RequestStatus};

/// Outcome of one planning job: raw action objects, or a message for the user.
pub type PlanOutcome = Result<Vec<Value>, String>;

struct Entry {
    provider: String,
    status: RequestStatus,
    actions: Option<Vec<Value>>,
    error: Option<String>,
    finished_at: Option<Instant>,
    task: Option<AbortHandle>,
}

impl Entry {
    fn pending(provider: &str) -> Self {
        Self {
            provider: provider.to_string(),
            status: RequestStatus::Pending,
            actions: None,
            error: None,
            finished_at: None,
            task: None,
        }
    }
}

type Entries = Arc<Mutex<HashMap<String, Entry>>>;

/// Runs planning jobs in the background and keeps their results pollable.
///
/// Each submit spawns a task; a semaphore bounds how many jobs plan at
/// once. Must be used from within a tokio runtime.
pub struct RequestTable {
    entries: Entries,
    permits: Arc<Semaphore>,
    config: TableConfig,
}

impl RequestTable {
    pub fn new(config: TableConfig) -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
            permits: Arc::new(Semaphore::new(config.max_concurrent.max(1))),
            config,
        }
    }

    /// Start `job` and return its request id immediately.
    ///
    /// Finished requests older than the retention window are pruned first.
    pub fn submit<F>(&self, provider: &str, job: F) -> String
    where
        F: Future<Output = PlanOutcome> + Send + 'static,
    {
        self.prune();

        let id = self.next_id();
        self.entries
            .lock()
            .insert(id.clone(), Entry::pending(provider));

        let entries = self.entries.clone();
        let permits = self.permits.clone();
        let request_id = id.clone();
        let handle = tokio::spawn(async move {
            let outcome = match permits.acquire_owned().await {
                Ok(_permit) => job.await,
                Err(_) => Err("request table is shut down".to_string()),
            };
            finish(&entries, &request_id, outcome);
        });

        if let Some(entry) = self.entries.lock().get_mut(&id) {
            if entry.status == RequestStatus::Pending {
                entry.task = Some(handle.abort_handle());
            }
        }

        info!("Submitted request {} for provider {}", id, provider);
        id
    }

    pub fn poll(&self, request_id: &str) -> PollResponse {
        let entries = self.entries.lock();
        let Some(entry) = entries.get(request_id) else {
            return PollResponse::not_found(request_id);
        };

        let mut response = PollResponse::new(request_id, entry.status);
        response.actions = entry.actions.clone();
        response.error = entry.error.clone();
        response
    }

    /// Cancel a pending request and return its status afterwards.
    ///
    /// A request that already finished keeps its terminal status.
    pub fn cancel(&self, request_id: &str) -> RequestStatus {
        let mut entries = self.entries.lock();
        let Some(entry) = entries.get_mut(request_id) else {
            return RequestStatus::NotFound;
        };

        if entry.status == RequestStatus::Pending {
            entry.status = RequestStatus::Cancelled;
            entry.finished_at = Some(Instant::now());
            if let Some(task) = entry.task.take() {
                task.abort();
            }
            info!("Cancelled request {} ({})", request_id, entry.provider);
        }
        entry.status
    }

    /// Forget a request. Cancels it first if it is still pending.
    pub fn discard(&self, request_id: &str) -> bool {
        let removed = self.entries.lock().remove(request_id);
        match removed {
            Some(entry) => {
                if let Some(task) = entry.task {
                    task.abort();
                }
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    pub fn pending(&self) -> usize {
        self.entries
            .lock()
            .values()
            .filter(|e| e.status == RequestStatus::Pending)
            .count()
    }

    fn prune(&self) {
        let retention = self.config.retention;
        let now = Instant::now();
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|_, entry| match entry.finished_at {
            Some(finished) if entry.status.is_terminal() => now.duration_since(finished) < retention,
            _ => true,
        });
        let pruned = before - entries.len();
        if pruned > 0 {
            debug!("Pruned {} stale requests", pruned);
        }
    }

    fn next_id(&self) -> String {
        let entries = self.entries.lock();
        loop {
            let id = Uuid::new_v4().simple().to_string()[..8].to_string();
            if !entries.contains_key(&id) {
                return id;
            }
        }
    }
}

impl Default for RequestTable {
    fn default() -> Self {
        Self::new(TableConfig::default())
    }
}

impl Drop for RequestTable {
    fn drop(&mut self) {
        for entry in self.entries.lock().values_mut() {
            if let Some(task) = entry.task.take() {
                task.abort();
            }
        }
    }
}

fn finish(entries: &Entries, request_id: &str, outcome: PlanOutcome) {
    let mut entries = entries.lock();
    let Some(entry) = entries.get_mut(request_id) else {
        debug!("Dropping result for discarded request {}", request_id);
        return;
    };
    if entry.status != RequestStatus::Pending {
        debug!("Dropping late result for request {}", request_id);
        return;
    }

    entry.finished_at = Some(Instant::now());
    entry.task = None;
    match outcome {
        Ok(actions) => {
            info!("Request {} complete with {} actions", request_id, actions.len());
            entry.status = RequestStatus::Complete;
            entry.actions = Some(actions);
        }
        Err(error) => {
            info!("Request {} failed: {}", request_id, error);
            entry.status = RequestStatus::Error;
            entry.error = Some(error);
        }
    }
}

#[cfg(test)]
#[path = "table_tests.rs"]
mod tests;
