// THEORY:
// The `Monitor` is the asynchronous shell around the synchronous `Dashboard`.
// It owns the timers the view relies on and nothing else:
//
// 1.  **Refresh ticker**: every `refresh_interval` the dashboard is refreshed.
// 2.  **Delayed actions**: optimize and chat replies run their "complete" half
//     in a spawned task after a fixed sleep.
// 3.  **Animation loop**: steps and renders the `CameraFeed` once per
//     `frame_interval` and hands encoded frames to a `FrameSink`. A `watch`
//     channel carries play/pause; while paused the loop parks on the channel
//     instead of ticking.
//
// State sits behind one `std::sync::Mutex`. Every critical section is a short,
// synchronous mutation; the lock is never held across an `.await`. After each
// mutation a fresh `Snapshot` is broadcast so connected clients can redraw.
// `shutdown` aborts every spawned task, which is the only cancellation there is.

use crate::clock::Clock;
use crate::core_modules::camera_feed::{CameraFeed, FeedMeta};
use crate::core_modules::chat::ChatMessage;
use crate::core_modules::utils::frame_helper::frame_helper::{DEFAULT_JPEG_QUALITY, encode_jpeg};
use crate::dashboard::{Dashboard, RefreshOutcome, Snapshot};
use crate::error::Result;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at, sleep};
use tracing::{debug, info, warn};

const SNAPSHOT_CHANNEL_CAPACITY: usize = 64;

/// One JPEG-encoded camera frame.
#[derive(Debug, Clone)]
pub struct EncodedFrame {
    pub ts_millis: u64,
    pub width: u32,
    pub height: u32,
    pub jpeg: Arc<[u8]>,
}

/// Destination for the animation loop's output.
pub trait FrameSink: Send + Sync + 'static {
    fn publish_frame(&self, frame: EncodedFrame);
    fn publish_meta(&self, meta: FeedMeta);
}

fn now_millis() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_millis() as u64).unwrap_or(0)
}

/// Owns the dashboard and every timer that mutates it.
#[derive(Clone)]
pub struct Monitor {
    dashboard: Arc<Mutex<Dashboard>>,
    clock: Arc<dyn Clock>,
    snapshots: broadcast::Sender<Snapshot>,
    tasks: Arc<Mutex<Vec<JoinHandle<()>>>>,
}

impl Monitor {
    pub fn new(dashboard: Dashboard) -> Self {
        let clock = dashboard.clock();
        let (snapshots, _) = broadcast::channel(SNAPSHOT_CHANNEL_CAPACITY);
        Self {
            dashboard: Arc::new(Mutex::new(dashboard)),
            clock,
            snapshots,
            tasks: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Dashboard> {
        self.dashboard.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Runs `f` against the dashboard without mutating it.
    pub fn read<T>(&self, f: impl FnOnce(&Dashboard) -> T) -> T {
        f(&self.lock())
    }

    /// Runs `f` against the dashboard, then broadcasts a snapshot.
    pub fn update<T>(&self, f: impl FnOnce(&mut Dashboard) -> T) -> T {
        let (out, snapshot) = {
            let mut dashboard = self.lock();
            let out = f(&mut dashboard);
            (out, dashboard.snapshot())
        };
        self.publish(snapshot);
        out
    }

    fn publish(&self, snapshot: Snapshot) {
        // No subscribers is fine.
        let _ = self.snapshots.send(snapshot);
    }

    pub fn snapshot(&self) -> Snapshot {
        self.lock().snapshot()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Snapshot> {
        self.snapshots.subscribe()
    }

    fn track(&self, handle: JoinHandle<()>) {
        let mut tasks = self.tasks.lock().unwrap_or_else(PoisonError::into_inner);
        tasks.retain(|h| !h.is_finished());
        tasks.push(handle);
    }

    /// Number of spawned tasks that are still running.
    pub fn running_tasks(&self) -> usize {
        let tasks = self.tasks.lock().unwrap_or_else(PoisonError::into_inner);
        tasks.iter().filter(|h| !h.is_finished()).count()
    }

    /// Refreshes immediately, outside the ticker.
    pub fn refresh_now(&self) -> RefreshOutcome {
        self.update(Dashboard::refresh)
    }

    /// Starts the periodic refresh. The first tick lands one full period from now.
    pub fn spawn_refresh_ticker(&self) {
        let period = self.read(|d| d.config().refresh_interval);
        let this = self.clone();
        let handle = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let outcome = this.refresh_now();
                if let Some(v) = outcome.violation {
                    debug!(tick = outcome.tick, kind = v.kind.label(), location = %v.location, "violation recorded");
                }
            }
        });
        info!(period_secs = period.as_secs_f64(), "refresh ticker started");
        self.track(handle);
    }

    /// Begins signal optimization; it takes effect after the configured delay.
    pub fn optimize(&self) -> Result<()> {
        // A rejected request changes nothing, so nothing is broadcast.
        let (delay, snapshot) = {
            let mut dashboard = self.lock();
            dashboard.begin_optimization()?;
            (dashboard.config().optimize_delay, dashboard.snapshot())
        };
        self.publish(snapshot);
        let this = self.clone();
        self.track(tokio::spawn(async move {
            sleep(delay).await;
            this.update(Dashboard::complete_optimization);
        }));
        Ok(())
    }

    pub fn emergency_override(&self) {
        self.update(Dashboard::emergency_override);
    }

    /// Posts an operator message and schedules the reply. Blank input is ignored.
    pub fn send_chat(&self, text: &str) -> Option<ChatMessage> {
        let (message, delay, snapshot) = {
            let mut dashboard = self.lock();
            let message = dashboard.submit_chat(text)?;
            (message, dashboard.config().reply_delay, dashboard.snapshot())
        };
        self.publish(snapshot);
        let this = self.clone();
        let prompt = text.to_string();
        self.track(tokio::spawn(async move {
            sleep(delay).await;
            this.update(|d| d.generate_reply(&prompt));
        }));
        Some(message)
    }

    /// Starts the camera feed animation, publishing into `sink`.
    pub fn spawn_feed(&self, feed: CameraFeed, sink: Arc<dyn FrameSink>, play: watch::Receiver<bool>) {
        let period = self.read(|d| d.config().frame_interval);
        let clock = Arc::clone(&self.clock);
        let handle = tokio::spawn(run_feed(feed, sink, play, clock, period));
        self.track(handle);
    }

    /// Aborts every spawned task and waits for them to wind down.
    pub async fn shutdown(&self) {
        let handles: Vec<JoinHandle<()>> = {
            let mut tasks = self.tasks.lock().unwrap_or_else(PoisonError::into_inner);
            tasks.drain(..).collect()
        };
        for handle in &handles {
            handle.abort();
        }
        let count = handles.len();
        futures::future::join_all(handles).await;
        info!(tasks = count, "monitor stopped");
    }
}

async fn run_feed(
    mut feed: CameraFeed,
    sink: Arc<dyn FrameSink>,
    mut play: watch::Receiver<bool>,
    clock: Arc<dyn Clock>,
    period: Duration,
) {
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        if !*play.borrow_and_update() {
            feed.set_playing(false);
            sink.publish_meta(feed.meta());
            debug!(frame = feed.frame_index(), "camera feed paused");
            // Park until resumed; a dropped sender ends the feed.
            loop {
                if play.changed().await.is_err() {
                    return;
                }
                if *play.borrow_and_update() {
                    break;
                }
            }
            feed.set_playing(true);
            ticker.reset();
            debug!(frame = feed.frame_index(), "camera feed resumed");
        }

        ticker.tick().await;
        if !*play.borrow() {
            continue;
        }

        feed.step();
        let frame = feed.render(&clock.time_label());
        match encode_jpeg(&frame, DEFAULT_JPEG_QUALITY) {
            Ok(bytes) => {
                sink.publish_frame(EncodedFrame {
                    ts_millis: now_millis(),
                    width: frame.width(),
                    height: frame.height(),
                    jpeg: Arc::from(bytes),
                });
                sink.publish_meta(feed.meta());
            }
            Err(err) => warn!(error = %err, "dropping camera frame"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::config::DashboardConfig;
    use crate::core_modules::chat::Origin;
    use crate::core_modules::junction::Signal;
    use crate::error::JunctionWatchError;

    fn monitor(probability: f64) -> Monitor {
        let config = DashboardConfig {
            violation_probability: probability,
            frame_interval: Duration::from_millis(40),
            seed: Some(1),
            ..Default::default()
        };
        Monitor::new(Dashboard::with_clock(config, Arc::new(FixedClock::new(8, 0, 0))))
    }

    #[derive(Default)]
    struct RecordingSink {
        frames: Mutex<Vec<EncodedFrame>>,
        metas: Mutex<Vec<FeedMeta>>,
    }

    impl RecordingSink {
        fn frame_count(&self) -> usize {
            self.frames.lock().map(|f| f.len()).unwrap_or(0)
        }

        fn last_meta(&self) -> Option<FeedMeta> {
            self.metas.lock().ok().and_then(|m| m.last().cloned())
        }
    }

    impl FrameSink for RecordingSink {
        fn publish_frame(&self, frame: EncodedFrame) {
            if let Ok(mut frames) = self.frames.lock() {
                frames.push(frame);
            }
        }

        fn publish_meta(&self, meta: FeedMeta) {
            if let Ok(mut metas) = self.metas.lock() {
                metas.push(meta);
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn optimize_applies_after_delay() {
        let m = monitor(0.6);
        m.optimize().expect("first request");
        assert!(matches!(m.optimize(), Err(JunctionWatchError::OptimizationInProgress)));

        sleep(Duration::from_millis(1900)).await;
        assert!(m.read(|d| d.is_optimizing()));
        assert!(!m.read(|d| d.junctions().iter().all(|j| j.signal == Signal::Green)));

        sleep(Duration::from_millis(200)).await;
        assert!(!m.read(|d| d.is_optimizing()));
        assert!(m.read(|d| d.junctions().iter().all(|j| j.signal == Signal::Green)));
    }

    #[tokio::test(start_paused = true)]
    async fn rejected_optimize_is_not_broadcast() {
        let m = monitor(0.6);
        let mut rx = m.subscribe();
        m.optimize().expect("first request");
        assert!(m.optimize().is_err());

        let started = rx.try_recv().expect("start snapshot");
        assert!(started.optimizing);
        assert!(matches!(rx.try_recv(), Err(broadcast::error::TryRecvError::Empty)));

        sleep(Duration::from_millis(2100)).await;
        let done = rx.try_recv().expect("completion snapshot");
        assert!(!done.optimizing);
        assert!(done.revision > started.revision);
    }

    #[tokio::test(start_paused = true)]
    async fn chat_reply_follows_after_one_second() {
        let m = monitor(0.6);
        let mut rx = m.subscribe();
        assert!(m.send_chat("   ").is_none());
        assert_eq!(m.read(|d| d.chat().len()), 1);
        assert!(matches!(rx.try_recv(), Err(broadcast::error::TryRecvError::Empty)));

        let sent = m.send_chat("hello").expect("accepted");
        assert_eq!(sent.origin, Origin::Authored);
        assert_eq!(m.read(|d| d.chat().len()), 2);

        sleep(Duration::from_millis(900)).await;
        assert_eq!(m.read(|d| d.chat().len()), 2);

        sleep(Duration::from_millis(200)).await;
        let messages = m.read(|d| d.chat().messages().to_vec());
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[1].text, "hello");
        assert_eq!(messages[2].origin, Origin::Generated);
    }

    #[tokio::test(start_paused = true)]
    async fn ticker_refreshes_every_period() {
        let m = monitor(1.0);
        m.spawn_refresh_ticker();

        sleep(Duration::from_millis(4900)).await;
        assert_eq!(m.read(|d| d.stats().refresh_ticks), 0);

        sleep(Duration::from_millis(10_200)).await;
        assert_eq!(m.read(|d| d.stats().refresh_ticks), 3);
        assert_eq!(m.read(|d| d.violations().len()), 3);

        m.shutdown().await;
        sleep(Duration::from_secs(30)).await;
        assert_eq!(m.read(|d| d.stats().refresh_ticks), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn snapshots_are_broadcast_on_mutation() {
        let m = monitor(0.6);
        let mut rx = m.subscribe();
        m.emergency_override();
        let snap = rx.recv().await.expect("snapshot");
        assert_eq!(snap.junctions[0].signal, Signal::Green);
        assert_eq!(snap.stats.red_signals, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn feed_publishes_until_paused() {
        let m = monitor(0.6);
        let sink = Arc::new(RecordingSink::default());
        let (play_tx, play_rx) = watch::channel(true);
        m.spawn_feed(CameraFeed::new(), sink.clone(), play_rx);

        sleep(Duration::from_millis(410)).await;
        let played = sink.frame_count();
        assert!(played >= 9, "expected ~10 frames, got {played}");

        play_tx.send(false).expect("feed alive");
        sleep(Duration::from_millis(50)).await;
        let paused_at = sink.frame_count();
        assert!(!sink.last_meta().expect("meta").playing);

        sleep(Duration::from_millis(500)).await;
        assert_eq!(sink.frame_count(), paused_at);

        play_tx.send(true).expect("feed alive");
        sleep(Duration::from_millis(200)).await;
        assert!(sink.frame_count() > paused_at);

        m.shutdown().await;
        assert_eq!(m.running_tasks(), 0);
    }
}
