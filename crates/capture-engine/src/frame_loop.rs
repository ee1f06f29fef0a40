//! Display-synchronized frame loop.
//!
//! The loop invokes a [`FrameHandler`] once per display refresh until it is
//! cancelled. Cancellation is cooperative: the signal is checked before each
//! frame and wakes a pending wait for the next one, and
//! [`FrameLoop::finish`] waits for a frame already in flight to complete
//! before handing back the handler's output.

use std::time::{Duration, Instant};

use boardcast_common::error::{BoardcastError, BoardcastResult};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Interval, MissedTickBehavior};

/// Source of frame deadlines.
#[async_trait::async_trait]
pub trait FrameScheduler: Send {
    /// Wait for the next frame and return its nominal time.
    async fn next_frame(&mut self) -> Instant;
}

/// Fires at a fixed refresh rate. Late frames are skipped, never bunched.
pub struct RefreshScheduler {
    interval: Interval,
}

impl RefreshScheduler {
    pub fn new(refresh_hz: u32) -> Self {
        let period = Duration::from_nanos(1_000_000_000 / refresh_hz.max(1) as u64);
        let mut interval =
            tokio::time::interval_at(tokio::time::Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        Self { interval }
    }
}

#[async_trait::async_trait]
impl FrameScheduler for RefreshScheduler {
    async fn next_frame(&mut self) -> Instant {
        self.interval.tick().await.into_std()
    }
}

/// Per-frame work.
pub trait FrameHandler: Send + 'static {
    type Output: Send + 'static;

    /// Draw one frame scheduled for `at`.
    fn on_frame(&mut self, at: Instant);

    /// Consume the handler once the loop has ended.
    fn finish(self) -> Self::Output;
}

/// Handle to a running loop. Dropping it cancels the loop.
pub struct FrameLoop<H: FrameHandler> {
    cancel: watch::Sender<bool>,
    task: JoinHandle<(H::Output, u64)>,
}

impl<H: FrameHandler> FrameLoop<H> {
    /// Spawn the loop. The first frame is drawn immediately.
    pub fn spawn(handler: H, scheduler: Box<dyn FrameScheduler>) -> Self {
        let (cancel, cancelled) = watch::channel(false);
        let task = tokio::spawn(run(handler, scheduler, cancelled));
        Self { cancel, task }
    }

    /// Cancel the next scheduled frame. Safe to call repeatedly.
    pub fn cancel(&self) {
        self.cancel.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.cancel.borrow()
    }

    /// Cancel, wait for the loop to exit, and return the handler output
    /// with the number of frames drawn.
    pub async fn finish(self) -> BoardcastResult<(H::Output, u64)> {
        self.cancel();
        self.task
            .await
            .map_err(|e| BoardcastError::capture(format!("Frame loop task failed: {e}")))
    }
}

async fn run<H: FrameHandler>(
    mut handler: H,
    mut scheduler: Box<dyn FrameScheduler>,
    mut cancelled: watch::Receiver<bool>,
) -> (H::Output, u64) {
    let mut frames = 0u64;
    let mut at = Instant::now();

    loop {
        if *cancelled.borrow() {
            break;
        }
        handler.on_frame(at);
        frames += 1;

        tokio::select! {
            next = scheduler.next_frame() => at = next,
            _ = cancel_requested(&mut cancelled) => break,
        }
    }

    tracing::debug!(frames, "Frame loop stopped");
    (handler.finish(), frames)
}

/// Resolves on cancel, or once the handle is gone.
async fn cancel_requested(cancelled: &mut watch::Receiver<bool>) {
    let _ = cancelled.wait_for(|cancelled| *cancelled).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    struct Counter {
        stamps: Arc<Mutex<Vec<Instant>>>,
    }

    impl FrameHandler for Counter {
        type Output = usize;

        fn on_frame(&mut self, at: Instant) {
            self.stamps.lock().unwrap().push(at);
        }

        fn finish(self) -> usize {
            self.stamps.lock().unwrap().len()
        }
    }

    #[tokio::test]
    async fn draws_until_cancelled() {
        let stamps = Arc::new(Mutex::new(Vec::new()));
        let frame_loop = FrameLoop::spawn(
            Counter {
                stamps: stamps.clone(),
            },
            Box::new(RefreshScheduler::new(200)),
        );

        tokio::time::sleep(Duration::from_millis(60)).await;
        let (drawn, frames) = frame_loop.finish().await.unwrap();

        assert_eq!(drawn as u64, frames);
        assert!(frames >= 2, "only {frames} frames");
        let after = stamps.lock().unwrap().len();
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(stamps.lock().unwrap().len(), after);
    }

    #[tokio::test]
    async fn frame_times_are_monotonic() {
        let stamps = Arc::new(Mutex::new(Vec::new()));
        let frame_loop = FrameLoop::spawn(
            Counter {
                stamps: stamps.clone(),
            },
            Box::new(RefreshScheduler::new(120)),
        );
        tokio::time::sleep(Duration::from_millis(50)).await;
        frame_loop.finish().await.unwrap();

        let stamps = stamps.lock().unwrap();
        assert!(stamps.windows(2).all(|w| w[0] <= w[1]));
    }

    #[tokio::test]
    async fn cancel_is_idempotent() {
        let frame_loop = FrameLoop::spawn(
            Counter {
                stamps: Arc::new(Mutex::new(Vec::new())),
            },
            Box::new(RefreshScheduler::new(60)),
        );
        frame_loop.cancel();
        frame_loop.cancel();
        assert!(frame_loop.is_cancelled());
        let (_, frames) = frame_loop.finish().await.unwrap();
        assert!(frames <= 1);
    }

    #[tokio::test]
    async fn cancel_wakes_a_slow_scheduler() {
        // One frame per ten seconds: only the cancel signal can end the wait.
        let slow = FrameLoop::spawn(
            Counter {
                stamps: Arc::new(Mutex::new(Vec::new())),
            },
            Box::new(SlowScheduler),
        );
        tokio::time::sleep(Duration::from_millis(10)).await;

        let started = Instant::now();
        let (_, frames) = slow.finish().await.unwrap();
        assert_eq!(frames, 1);
        assert!(started.elapsed() < Duration::from_millis(500));
    }

    #[tokio::test]
    async fn dropping_the_handle_ends_the_loop() {
        let stamps = Arc::new(Mutex::new(Vec::new()));
        drop(FrameLoop::spawn(
            Counter {
                stamps: stamps.clone(),
            },
            Box::new(RefreshScheduler::new(200)),
        ));
        tokio::time::sleep(Duration::from_millis(30)).await;
        let after = stamps.lock().unwrap().len();
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(stamps.lock().unwrap().len(), after);
    }

    struct SlowScheduler;

    #[async_trait::async_trait]
    impl FrameScheduler for SlowScheduler {
        async fn next_frame(&mut self) -> Instant {
            tokio::time::sleep(Duration::from_secs(10)).await;
            Instant::now()
        }
    }
}
