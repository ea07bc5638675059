// ── Polling scheduler ──
//
// One independent task per device, all parameterized by the same tick
// interval and one shared cancellation token. Each task owns its own
// interval timer, so a slow or unreachable device never skews anyone
// else's ticks. Update notifications are advisory and fire-and-forget;
// the display coalesces them however it likes.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::device::{Device, DeviceView, InterfaceSource};

/// Notifications the polling tasks push toward the display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollEvent {
    /// A device finished a refresh; a redraw would show fresher data.
    Updated { device: String },
    /// The configured lifespan elapsed; treat as a user-issued quit.
    LifespanExpired,
}

/// Read side of one device's published snapshots.
#[derive(Debug, Clone)]
pub struct DeviceHandle {
    name: String,
    rx: watch::Receiver<Arc<DeviceView>>,
}

impl DeviceHandle {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The most recently published snapshot (cheap `Arc` clone).
    pub fn latest(&self) -> Arc<DeviceView> {
        self.rx.borrow().clone()
    }
}

/// Launches and supervises the per-device refresh tasks and the lifespan
/// guard; owns lifecycle cancellation.
pub struct Scheduler {
    interval: Duration,
    events: mpsc::UnboundedSender<PollEvent>,
    cancel: CancellationToken,
    tasks: Vec<JoinHandle<()>>,
}

impl Scheduler {
    pub fn new(interval: Duration, events: mpsc::UnboundedSender<PollEvent>) -> Self {
        Self {
            interval,
            events,
            cancel: CancellationToken::new(),
            tasks: Vec::new(),
        }
    }

    /// Spawn the refresh loop for one device and hand back the read side
    /// of its snapshots. The handle starts out with the post-discovery
    /// view (all interfaces, zero rates), so the table has rows to show
    /// before the first refresh lands.
    pub fn watch_device<S>(&mut self, device: Device<S>) -> DeviceHandle
    where
        S: InterfaceSource + 'static,
    {
        let (tx, rx) = watch::channel(Arc::new(device.view()));
        let handle = DeviceHandle {
            name: device.name().to_owned(),
            rx,
        };
        self.tasks.push(tokio::spawn(poll_device(
            device,
            tx,
            self.events.clone(),
            self.interval,
            self.cancel.clone(),
        )));
        handle
    }

    /// Arm the process lifespan guard. One per process.
    pub fn arm_lifespan(&mut self, lifespan: Duration) {
        self.tasks.push(tokio::spawn(lifespan_guard(
            lifespan,
            self.events.clone(),
            self.cancel.clone(),
        )));
    }

    /// Cancel every task and wait for all of them to exit. Each task
    /// observes the token on its next timer tick at the latest, so no
    /// task leaks across shutdown.
    pub async fn shutdown(self) {
        self.cancel.cancel();
        for task in self.tasks {
            let _ = task.await;
        }
        debug!("scheduler stopped");
    }
}

/// Refresh loop for one device. The first tick fires immediately so the
/// display is non-empty as soon as possible; refresh failures are logged
/// and absorbed here — they never reach another device or the caller.
async fn poll_device<S: InterfaceSource>(
    mut device: Device<S>,
    tx: watch::Sender<Arc<DeviceView>>,
    events: mpsc::UnboundedSender<PollEvent>,
    interval: Duration,
    cancel: CancellationToken,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = ticker.tick() => {
                if let Err(e) = device.refresh().await {
                    warn!(device = device.name(), error = %e, "refresh failed");
                }
                let _ = tx.send(Arc::new(device.view()));
                let _ = events.send(PollEvent::Updated {
                    device: device.name().to_owned(),
                });
            }
        }
    }
    debug!(device = device.name(), "polling task stopped");
}

/// Terminates the whole dashboard after the configured duration, unless
/// normal shutdown cancels it first.
async fn lifespan_guard(
    lifespan: Duration,
    events: mpsc::UnboundedSender<PollEvent>,
    cancel: CancellationToken,
) {
    tokio::select! {
        biased;
        () = cancel.cancelled() => {}
        () = tokio::time::sleep(lifespan) => {
            info!(
                seconds = lifespan.as_secs(),
                "configured lifespan reached, requesting shutdown"
            );
            let _ = events.send(PollEvent::LifespanExpired);
        }
    }
}

#[cfg(test)]
mod tests {
    use ifwatch_snmp::InterfaceField;
    use pretty_assertions::assert_eq;

    use crate::device::testing::{StubSource, int_sample};

    use super::*;

    const TICK: Duration = Duration::from_secs(5);

    fn scheduler() -> (Scheduler, mpsc::UnboundedReceiver<PollEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Scheduler::new(TICK, tx), rx)
    }

    async fn discovered(name: &str, source: StubSource) -> Device<StubSource> {
        Device::discover(name, source).await.expect("stub discovers")
    }

    fn drain(rx: &mut mpsc::UnboundedReceiver<PollEvent>) -> Vec<PollEvent> {
        let mut events = Vec::new();
        while let Ok(ev) = rx.try_recv() {
            events.push(ev);
        }
        events
    }

    #[tokio::test(start_paused = true)]
    async fn first_refresh_happens_immediately() {
        let (mut sched, mut rx) = scheduler();
        let source = StubSource::with_indices(&[1]);
        let probe = source.clone();
        sched.watch_device(discovered("r1", source).await);

        tokio::time::sleep(Duration::from_millis(1)).await;
        assert_eq!(probe.calls(), 1);
        assert_eq!(
            drain(&mut rx),
            vec![PollEvent::Updated {
                device: "r1".into()
            }]
        );
        sched.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn refreshes_follow_the_shared_interval() {
        let (mut sched, _rx) = scheduler();
        let source = StubSource::with_indices(&[1]);
        let probe = source.clone();
        sched.watch_device(discovered("r1", source).await);

        // Immediate tick plus three interval ticks.
        tokio::time::sleep(TICK * 3 + Duration::from_millis(10)).await;
        assert_eq!(probe.calls(), 4);
        sched.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn published_snapshots_reflect_applied_samples() {
        let (mut sched, _rx) = scheduler();
        let mut source = StubSource::with_indices(&[1]);
        source.samples = vec![int_sample(InterfaceField::InOctets, 1, 12_345)];
        let handle = sched.watch_device(discovered("r1", source).await);

        // Before the task runs, the handle serves the discovery view.
        assert_eq!(handle.latest().ports.len(), 1);

        tokio::time::sleep(Duration::from_millis(1)).await;
        let view = handle.latest();
        assert_eq!(view.name, "r1");
        assert_eq!(view.ports.len(), 1);
        sched.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn a_slow_device_does_not_stall_the_others() {
        let (mut sched, _rx) = scheduler();
        let slow = StubSource {
            indices: vec![1],
            delay: Duration::from_secs(12),
            ..StubSource::default()
        };
        let fast = StubSource::with_indices(&[1]);
        let slow_probe = slow.clone();
        let fast_probe = fast.clone();
        sched.watch_device(discovered("slow", slow).await);
        sched.watch_device(discovered("fast", fast).await);

        tokio::time::sleep(TICK * 3 + Duration::from_millis(10)).await;
        // The fast device ticked at 0, 5, 10, 15; the slow one is still
        // stuck in its second twelve-second sample.
        assert_eq!(fast_probe.calls(), 4);
        assert_eq!(slow_probe.calls(), 1);
        sched.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn an_unreachable_device_keeps_polling_quietly() {
        let (mut sched, mut rx) = scheduler();
        let dark = StubSource {
            indices: vec![1],
            fail_sampling: true,
            ..StubSource::default()
        };
        let probe = dark.clone();
        let handle = sched.watch_device(discovered("dark", dark).await);

        tokio::time::sleep(TICK + Duration::from_millis(10)).await;
        assert_eq!(probe.calls(), 2);
        // Snapshots still publish (stale zeros) and updates still fire.
        assert_eq!(handle.latest().ports.len(), 1);
        assert_eq!(drain(&mut rx).len(), 2);
        sched.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_stops_every_task_and_all_refreshing() {
        let (mut sched, _rx) = scheduler();
        let probes: Vec<StubSource> = (0..3)
            .map(|_| StubSource::with_indices(&[1]))
            .collect();
        for (i, source) in probes.iter().enumerate() {
            sched.watch_device(discovered(&format!("r{i}"), source.clone()).await);
        }

        tokio::time::sleep(TICK + Duration::from_millis(10)).await;
        let counts: Vec<usize> = probes.iter().map(StubSource::calls).collect();
        assert_eq!(counts, vec![2, 2, 2]);

        // shutdown() joins every task, so returning at all proves the
        // tasks observed the token.
        sched.shutdown().await;

        tokio::time::sleep(TICK * 5).await;
        let after: Vec<usize> = probes.iter().map(StubSource::calls).collect();
        assert_eq!(after, counts);
    }

    #[tokio::test(start_paused = true)]
    async fn lifespan_guard_fires_once_at_expiry() {
        let (mut sched, mut rx) = scheduler();
        sched.arm_lifespan(Duration::from_secs(30));

        tokio::time::sleep(Duration::from_secs(29)).await;
        assert_eq!(drain(&mut rx), Vec::new());

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(drain(&mut rx), vec![PollEvent::LifespanExpired]);
        sched.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_lifespan_guard_never_fires() {
        let (mut sched, mut rx) = scheduler();
        sched.arm_lifespan(Duration::from_secs(30));

        tokio::time::sleep(Duration::from_secs(5)).await;
        sched.shutdown().await;

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(drain(&mut rx), Vec::new());
    }
}
