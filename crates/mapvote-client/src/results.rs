//! Periodic polling of the aggregate results endpoint.
//!
//! Each successful poll replaces the held snapshot wholesale, persists it
//! as the warm-start cache and is published to subscribers. Failed polls
//! are logged and otherwise ignored; the last good snapshot stays.

use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};
use tokio::{
    sync::{broadcast, RwLock},
    task::JoinHandle,
    time::MissedTickBehavior,
};

use mapvote_common::StatsSnapshot;

use crate::gateway::ElectionApi;
use crate::storage::PreferenceStore;

struct PollerShared<A: ElectionApi> {
    api: Arc<A>,
    store: Option<PreferenceStore>,
    latest: RwLock<Option<StatsSnapshot>>,
    refreshing: AtomicBool,
    update_sender: broadcast::Sender<StatsSnapshot>,
}

impl<A: ElectionApi> PollerShared<A> {
    async fn poll(&self) -> Option<StatsSnapshot> {
        self.refreshing.store(true, Ordering::SeqCst);
        let result = self.api.overall_results().await;
        self.refreshing.store(false, Ordering::SeqCst);

        let snapshot = match result {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::warn!("Results poll failed: {}", e);
                return None;
            }
        };

        *self.latest.write().await = Some(snapshot.clone());

        if let Some(store) = &self.store {
            if let Err(e) = store.cache_stats(&snapshot) {
                tracing::debug!("Failed to cache results snapshot: {}", e);
            }
        }

        // No receivers is not an error
        let _ = self.update_sender.send(snapshot.clone());
        Some(snapshot)
    }
}

pub struct ResultsPoller<A: ElectionApi> {
    shared: Arc<PollerShared<A>>,
    interval: Duration,
    task: parking_lot::Mutex<Option<JoinHandle<()>>>,
}

impl<A: ElectionApi> ResultsPoller<A> {
    /// Create a poller. When a store is given, its cached snapshot is
    /// available from `latest` before the first poll completes.
    pub fn new(api: Arc<A>, store: Option<PreferenceStore>, interval: Duration) -> Self {
        let cached = store
            .as_ref()
            .and_then(|store| store.cached_stats())
            .map(|cached| cached.snapshot);
        if cached.is_some() {
            tracing::debug!("Warm start from cached results snapshot");
        }

        let (update_sender, _) = broadcast::channel(16);
        Self {
            shared: Arc::new(PollerShared {
                api,
                store,
                latest: RwLock::new(cached),
                refreshing: AtomicBool::new(false),
                update_sender,
            }),
            interval,
            task: parking_lot::Mutex::new(None),
        }
    }

    /// Begin polling: once immediately, then every interval. Calling it
    /// while already running does nothing.
    pub fn start(&self) {
        let mut task = self.task.lock();
        if task.as_ref().is_some_and(|handle| !handle.is_finished()) {
            return;
        }

        let shared = self.shared.clone();
        let period = self.interval;
        tracing::info!("Polling results every {:?}", period);

        *task = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                shared.poll().await;
            }
        }));
    }

    pub fn stop(&self) {
        if let Some(handle) = self.task.lock().take() {
            handle.abort();
            tracing::debug!("Results polling stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.task
            .lock()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Poll once outside the schedule.
    pub async fn refresh(&self) -> Option<StatsSnapshot> {
        self.shared.poll().await
    }

    pub async fn latest(&self) -> Option<StatsSnapshot> {
        self.shared.latest.read().await.clone()
    }

    pub fn is_refreshing(&self) -> bool {
        self.shared.refreshing.load(Ordering::SeqCst)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StatsSnapshot> {
        self.shared.update_sender.subscribe()
    }
}

impl<A: ElectionApi> Drop for ResultsPoller<A> {
    fn drop(&mut self) {
        self.stop();
    }
}
