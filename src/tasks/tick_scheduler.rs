//! Cancellable one-second heartbeat

use std::{future::Future, ops::ControlFlow, time::Duration};

use tokio::{
    task::JoinHandle,
    time::{self, Instant, MissedTickBehavior},
};
use tracing::debug;

/// Interval between workout ticks
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Owns at most one periodic tick task.
///
/// Every run gets a fresh generation number which is handed to the tick
/// callback. Stopping or restarting bumps the generation, so a callback that
/// was already waiting on the session lock can tell it belongs to a dead run.
/// The callback is awaited before the next tick is scheduled, so callbacks of
/// one run never overlap.
#[derive(Debug)]
pub struct TickScheduler {
    period: Duration,
    generation: u64,
    handle: Option<JoinHandle<()>>,
}

impl TickScheduler {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            generation: 0,
            handle: None,
        }
    }

    pub fn is_current(&self, generation: u64) -> bool {
        self.handle.is_some() && self.generation == generation
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|handle| !handle.is_finished())
    }

    /// Stop any existing run and start a new one.
    ///
    /// The first tick fires one period from now. The loop ends when
    /// `on_tick` returns `ControlFlow::Break`.
    pub fn start<F, Fut>(&mut self, mut on_tick: F) -> u64
    where
        F: FnMut(u64) -> Fut + Send + 'static,
        Fut: Future<Output = ControlFlow<()>> + Send + 'static,
    {
        self.stop();
        self.generation += 1;
        let generation = self.generation;
        let period = self.period;

        let handle = tokio::spawn(async move {
            let mut interval = time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                interval.tick().await;
                if on_tick(generation).await.is_break() {
                    break;
                }
            }
            debug!(generation, "tick loop ended");
        });

        self.handle = Some(handle);
        debug!(generation, ?period, "tick loop started");
        generation
    }

    /// Abort the current run. Safe to call when nothing is running.
    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            self.generation += 1;
            debug!(generation = self.generation, "tick loop stopped");
        }
    }

    /// Forget the handle of run `generation` without aborting it. Called from
    /// inside the tick callback when the run is about to end on its own.
    pub fn release(&mut self, generation: u64) {
        if self.generation == generation {
            self.handle = None;
        }
    }
}

impl Default for TickScheduler {
    fn default() -> Self {
        Self::new(TICK_PERIOD)
    }
}

impl Drop for TickScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{
        atomic::{AtomicU32, Ordering},
        Arc,
    };

    fn counting(
        counter: &Arc<AtomicU32>,
        limit: u32,
    ) -> impl FnMut(u64) -> std::future::Ready<ControlFlow<()>> + Send + 'static {
        let counter = Arc::clone(counter);
        move |_| {
            let seen = counter.fetch_add(1, Ordering::SeqCst) + 1;
            std::future::ready(if seen >= limit {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            })
        }
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_once_per_period_until_break() {
        let counter = Arc::new(AtomicU32::new(0));
        let mut scheduler = TickScheduler::default();
        scheduler.start(counting(&counter, 3));

        time::sleep(Duration::from_millis(500)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 0);

        time::sleep(Duration::from_secs(2)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 2);

        time::sleep(Duration::from_secs(10)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 3);
        assert!(!scheduler.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn stop_prevents_further_ticks() {
        let counter = Arc::new(AtomicU32::new(0));
        let mut scheduler = TickScheduler::default();
        let generation = scheduler.start(counting(&counter, u32::MAX));

        time::sleep(Duration::from_millis(2500)).await;
        scheduler.stop();
        assert!(!scheduler.is_current(generation));
        let seen = counter.load(Ordering::SeqCst);
        assert_eq!(seen, 2);

        time::sleep(Duration::from_secs(10)).await;
        assert_eq!(counter.load(Ordering::SeqCst), seen);
    }

    #[tokio::test(start_paused = true)]
    async fn restart_replaces_previous_run() {
        let first = Arc::new(AtomicU32::new(0));
        let second = Arc::new(AtomicU32::new(0));
        let mut scheduler = TickScheduler::default();

        let old = scheduler.start(counting(&first, u32::MAX));
        time::sleep(Duration::from_millis(1500)).await;
        let new = scheduler.start(counting(&second, u32::MAX));
        assert_ne!(old, new);
        assert!(scheduler.is_current(new));

        time::sleep(Duration::from_millis(5200)).await;
        assert_eq!(first.load(Ordering::SeqCst), 1);
        assert_eq!(second.load(Ordering::SeqCst), 5);
    }
}
