use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::{Arc, Mutex as StdMutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{interval, Instant, MissedTickBehavior};
use utoipa::ToSchema;

use super::error::LiveError;
use super::selection::Selection;
use crate::feed::{FeedItem, FeedSource};
use crate::scene::SceneGraph;
use crate::tracking::{IngestReport, MotionIntegrator, Projector, TrackingTable};
use crate::web::Config;

#[derive(Debug, Clone, Default, Serialize, ToSchema)]
pub struct LiveStatus {
    pub running: bool,
    pub feed: Option<String>,
    pub polls: u64,
    pub frames: u64,
    pub last_poll: Option<DateTime<Utc>>,
    pub last_report: Option<IngestReport>,
    pub last_feed_error: Option<String>,
}

/// Everything the poll task and the frame task mutate. Both go through the
/// same lock, so a frame never sees a half-merged batch.
pub struct Shared {
    pub table: TrackingTable,
    pub scene: SceneGraph,
    pub selection: Selection,
    pub status: LiveStatus,
}

impl Shared {
    pub fn new(table: TrackingTable) -> Self {
        Self {
            table,
            scene: SceneGraph::new(),
            selection: Selection::default(),
            status: LiveStatus::default(),
        }
    }

    pub fn ingest(&mut self, batch: Vec<FeedItem>, now: DateTime<Utc>) -> IngestReport {
        let report = self.table.ingest(batch, now, &mut self.scene);
        self.selection.clear_evicted(&report.sweep.evicted);

        self.status.polls += 1;
        self.status.last_poll = Some(now);
        self.status.last_report = Some(report.clone());
        report
    }

    pub fn advance_frame(&mut self, integrator: &MotionIntegrator, elapsed_ms: f64) -> usize {
        self.status.frames += 1;
        integrator.advance_all(&mut self.table, elapsed_ms, &mut self.scene)
    }
}

#[derive(Clone)]
pub struct LiveHandle {
    shared: Arc<StdMutex<Shared>>,
}

impl LiveHandle {
    pub fn new(shared: Shared) -> Self {
        Self {
            shared: Arc::new(StdMutex::new(shared)),
        }
    }

    pub fn lock(&self) -> MutexGuard<'_, Shared> {
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[derive(Debug)]
struct WorkerHandle {
    name: &'static str,
    stop_tx: oneshot::Sender<()>,
    join: JoinHandle<()>,
}

pub struct LiveView {
    handle: LiveHandle,
    integrator: MotionIntegrator,
    poll_interval: Duration,
    frame_interval: Duration,
    workers: Vec<WorkerHandle>,
}

impl LiveView {
    pub fn new(
        table: TrackingTable,
        integrator: MotionIntegrator,
        poll_interval: Duration,
        frame_interval: Duration,
    ) -> Self {
        Self {
            handle: LiveHandle::new(Shared::new(table)),
            integrator,
            poll_interval,
            frame_interval,
            workers: Vec::new(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let table = TrackingTable::new(
            Projector::new(config.projection.clone()),
            config.trail.clone(),
            config.liveness.clone(),
        );
        let integrator = MotionIntegrator::new(&config.motion, table.projector().height_scaling());
        Self::new(
            table,
            integrator,
            config.feed.poll_interval,
            config.motion.frame_interval,
        )
    }

    pub fn handle(&self) -> LiveHandle {
        self.handle.clone()
    }

    pub fn status(&self) -> LiveStatus {
        self.handle.lock().status.clone()
    }

    pub fn is_running(&self) -> bool {
        !self.workers.is_empty()
    }

    pub fn start(&mut self, feed: Arc<dyn FeedSource>) -> Result<(), LiveError> {
        if self.is_running() {
            return Err(LiveError::AlreadyRunning);
        }

        {
            let mut locked = self.handle.lock();
            locked.status.running = true;
            locked.status.feed = Some(feed.describe());
        }
        log::info!(
            "polling {} every {}",
            feed.describe(),
            crate::utils::format_duration(self.poll_interval)
        );

        let (stop_tx, stop_rx) = oneshot::channel();
        let join = tokio::spawn(run_poll_loop(self.handle(), feed, self.poll_interval, stop_rx));
        self.workers.push(WorkerHandle {
            name: "poll",
            stop_tx,
            join,
        });

        let (stop_tx, stop_rx) = oneshot::channel();
        let join = tokio::spawn(run_frame_loop(
            self.handle(),
            self.integrator.clone(),
            self.frame_interval,
            stop_rx,
        ));
        self.workers.push(WorkerHandle {
            name: "frame",
            stop_tx,
            join,
        });

        Ok(())
    }

    pub async fn stop(&mut self) {
        for worker in self.workers.drain(..) {
            let _ = worker.stop_tx.send(());
            if let Err(e) = worker.join.await {
                log::error!("{} task failed: {}", worker.name, e);
            }
        }
        self.handle.lock().status.running = false;
    }
}

/// Fetch outside the lock, then merge and sweep under it. A failed fetch
/// still runs the sweep with an empty batch.
pub async fn poll_once(handle: &LiveHandle, feed: &dyn FeedSource) -> IngestReport {
    let fetched = feed.fetch().await;
    let now = Utc::now();

    let mut locked = handle.lock();
    let batch = match fetched {
        Ok(batch) => {
            locked.status.last_feed_error = None;
            batch
        }
        Err(e) => {
            log::warn!("feed {} failed, skipping this cycle: {}", feed.describe(), e);
            locked.status.last_feed_error = Some(e.to_string());
            Vec::new()
        }
    };

    let report = locked.ingest(batch, now);
    log::debug!(
        "ingested: {} new, {} updated, {} revived, {} rejected, {} hidden, {} erased, {} tracked",
        report.created,
        report.updated,
        report.revived,
        report.rejected,
        report.sweep.demoted.len(),
        report.sweep.evicted.len(),
        report.tracked
    );
    report
}

async fn run_poll_loop(
    handle: LiveHandle,
    feed: Arc<dyn FeedSource>,
    poll_interval: Duration,
    mut stop_rx: oneshot::Receiver<()>,
) {
    let mut ticker = interval(poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        let should_stop = tokio::select! {
            _ = ticker.tick() => false,
            _ = &mut stop_rx => true,
        };
        if should_stop {
            return;
        }
        // a stop can only land during the fetch, the merge never yields
        tokio::select! {
            _ = poll_once(&handle, feed.as_ref()) => {}
            _ = &mut stop_rx => return,
        }
    }
}

async fn run_frame_loop(
    handle: LiveHandle,
    integrator: MotionIntegrator,
    frame_interval: Duration,
    mut stop_rx: oneshot::Receiver<()>,
) {
    let mut ticker = interval(frame_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut last_frame = Instant::now();

    loop {
        let should_stop = tokio::select! {
            _ = ticker.tick() => false,
            _ = &mut stop_rx => true,
        };
        if should_stop {
            return;
        }

        let now = Instant::now();
        let elapsed_ms = (now - last_frame).as_secs_f64() * 1000.0;
        last_frame = now;
        handle.lock().advance_frame(&integrator, elapsed_ms);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::{parse_batch, FeedError};
    use crate::tracking::{AircraftId, Liveness, TelemetryRecord};
    use async_trait::async_trait;
    use chrono::Duration as ChronoDuration;

    struct StaticFeed(&'static str);

    #[async_trait]
    impl FeedSource for StaticFeed {
        async fn fetch(&self) -> Result<Vec<FeedItem>, FeedError> {
            parse_batch(self.0)
        }

        fn describe(&self) -> String {
            "static".into()
        }
    }

    struct DownFeed;

    #[async_trait]
    impl FeedSource for DownFeed {
        async fn fetch(&self) -> Result<Vec<FeedItem>, FeedError> {
            Err(FeedError::UnexpectedShape("feed is down"))
        }

        fn describe(&self) -> String {
            "down".into()
        }
    }

    struct HangingFeed;

    #[async_trait]
    impl FeedSource for HangingFeed {
        async fn fetch(&self) -> Result<Vec<FeedItem>, FeedError> {
            std::future::pending().await
        }

        fn describe(&self) -> String {
            "hanging".into()
        }
    }

    const ONE_AIRCRAFT: &str =
        r#"{"acList": [{"Id": "A1", "Call": "AMX1", "Long": -99.0, "Lat": 19.0, "Alt": 10000, "Trak": 0, "Spd": 500}]}"#;

    fn view() -> LiveView {
        LiveView::from_config(&Config::default())
    }

    #[tokio::test]
    async fn test_poll_once_merges_batch() {
        let view = view();
        let handle = view.handle();

        let report = poll_once(&handle, &StaticFeed(ONE_AIRCRAFT)).await;
        assert_eq!(report.created, 1);

        let locked = handle.lock();
        let entity = locked.table.get(&AircraftId::new("A1")).unwrap();
        assert_eq!(entity.liveness, Liveness::Alive);
        assert_eq!(entity.trail.len(), 1);
        assert_eq!(locked.scene.visible().count(), 2);
        assert_eq!(locked.status.polls, 1);
        assert!(locked.status.last_feed_error.is_none());
    }

    #[tokio::test]
    async fn test_feed_failure_keeps_entities_and_sweeps() {
        let view = view();
        let handle = view.handle();
        poll_once(&handle, &StaticFeed(ONE_AIRCRAFT)).await;

        let report = poll_once(&handle, &DownFeed).await;
        assert_eq!(report.tracked, 1);
        assert_eq!(handle.lock().status.last_feed_error.as_deref(), Some("unexpected feed document: feed is down"));

        // pretend the aircraft went quiet a while ago
        {
            let mut locked = handle.lock();
            let shared = &mut *locked;
            let stale = Utc::now() - ChronoDuration::minutes(10);
            let quiet: TelemetryRecord = serde_json::from_str(r#"{"Id": "A1"}"#).unwrap();
            shared.table.merge_record(quiet, stale, &mut shared.scene).unwrap();
            shared.selection.notify_selected(Some(AircraftId::new("A1")));
        }
        let report = poll_once(&handle, &DownFeed).await;
        assert_eq!(report.sweep.evicted, vec![AircraftId::new("A1")]);
        assert!(handle.lock().selection.selected().is_none());
    }

    #[test]
    fn test_advance_frame_moves_aircraft() {
        let view = view();
        let handle = view.handle();
        {
            let mut locked = handle.lock();
            let batch = parse_batch(ONE_AIRCRAFT).unwrap();
            locked.ingest(batch, Utc::now());
        }

        let before = handle.lock().table.get(&AircraftId::new("A1")).unwrap().scene_position;
        let moved = handle.lock().advance_frame(&view.integrator, 16.0);
        assert_eq!(moved, 1);
        let after = handle.lock().table.get(&AircraftId::new("A1")).unwrap().scene_position;
        assert_ne!(before, after);
        assert_eq!(handle.lock().status.frames, 1);
    }

    #[tokio::test]
    async fn test_start_twice_fails_and_stop_resets() {
        let mut view = view();
        view.start(Arc::new(StaticFeed(ONE_AIRCRAFT))).unwrap();
        assert!(view.is_running());
        assert!(matches!(
            view.start(Arc::new(StaticFeed(ONE_AIRCRAFT))),
            Err(LiveError::AlreadyRunning)
        ));
        assert!(view.status().running);

        view.stop().await;
        assert!(!view.is_running());
        assert!(!view.status().running);
    }

    #[tokio::test]
    async fn test_stop_interrupts_pending_fetch() {
        let mut view = view();
        view.start(Arc::new(HangingFeed)).unwrap();
        // let the first tick start the fetch
        tokio::time::sleep(Duration::from_millis(50)).await;

        let stopped = tokio::time::timeout(Duration::from_secs(1), view.stop()).await;
        assert!(stopped.is_ok());
        assert_eq!(view.status().polls, 0);
    }
}
