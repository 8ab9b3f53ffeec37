//! Workout session: one owned context per timer instance

use std::{ops::ControlFlow, sync::Arc, time::Duration};

use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, error, info, warn};

use crate::{
    config::WorkoutConfig,
    error::WorkoutError,
    history::{HistoryLog, HistoryRecord},
    services::{NotificationSink, WakeLock},
    tasks::{TickScheduler, TICK_PERIOD},
};

use super::{DisplayUpdate, PhaseMachine, WorkoutEvent, WorkoutState};

/// Snapshot of everything observable about a session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStatus {
    pub state: WorkoutState,
    pub config: Option<WorkoutConfig>,
    pub display: Option<DisplayUpdate>,
    /// Whether the heartbeat is live
    pub ticking: bool,
    /// Set when a tick fault halted the heartbeat
    pub fault: Option<String>,
}

#[derive(Debug)]
struct SessionInner {
    machine: PhaseMachine,
    scheduler: TickScheduler,
    fault: Option<String>,
}

/// Runs workouts: owns the phase machine, drives it from the tick scheduler,
/// forwards its events to the notification sink and writes history on finish.
///
/// Cloning is cheap and yields a handle to the same session. All state
/// mutation happens under one async lock, so ticks, starts, pauses and
/// cancels are serialized.
#[derive(Clone)]
pub struct WorkoutSession {
    inner: Arc<Mutex<SessionInner>>,
    notifier: Arc<dyn NotificationSink>,
    history: Arc<HistoryLog>,
    wake_lock: Arc<WakeLock>,
    events_tx: broadcast::Sender<WorkoutEvent>,
}

impl WorkoutSession {
    pub fn new(
        notifier: Arc<dyn NotificationSink>,
        history: Arc<HistoryLog>,
        wake_lock: Arc<WakeLock>,
    ) -> Self {
        Self::with_tick_period(notifier, history, wake_lock, TICK_PERIOD)
    }

    pub fn with_tick_period(
        notifier: Arc<dyn NotificationSink>,
        history: Arc<HistoryLog>,
        wake_lock: Arc<WakeLock>,
        tick_period: Duration,
    ) -> Self {
        let (events_tx, _) = broadcast::channel(256);

        Self {
            inner: Arc::new(Mutex::new(SessionInner {
                machine: PhaseMachine::new(),
                scheduler: TickScheduler::new(tick_period),
                fault: None,
            })),
            notifier,
            history,
            wake_lock,
            events_tx,
        }
    }

    /// Receive every event the state machine emits from now on
    pub fn subscribe(&self) -> broadcast::Receiver<WorkoutEvent> {
        self.events_tx.subscribe()
    }

    /// Begin a workout and its heartbeat. Returns the initial state.
    pub async fn start(&self, config: WorkoutConfig) -> Result<WorkoutState, WorkoutError> {
        let mut inner = self.inner.lock().await;
        let events = inner.machine.start(config)?;
        inner.fault = None;

        let session = self.clone();
        let generation = inner.scheduler.start(move |generation| {
            let session = session.clone();
            async move { session.on_tick(generation).await }
        });

        self.dispatch(&events);
        if let Err(e) = self.wake_lock.acquire() {
            warn!("Failed to acquire wake lock: {}", e);
        }

        info!(
            generation,
            exercises = config.exercises_per_round,
            work = config.work_seconds,
            rest = config.rest_seconds,
            rounds = config.rounds,
            round_rest = config.round_rest_seconds,
            "Workout started"
        );
        Ok(inner.machine.state().clone())
    }

    /// Abort the active workout without writing history
    pub async fn cancel(&self) -> Result<(), WorkoutError> {
        let mut inner = self.inner.lock().await;
        inner.machine.cancel()?;
        inner.scheduler.stop();
        inner.fault = None;
        self.release_wake_lock();
        drop(inner);

        info!("Workout cancelled");
        Ok(())
    }

    pub async fn set_paused(&self, paused: bool) -> Result<WorkoutState, WorkoutError> {
        let mut inner = self.inner.lock().await;
        self.apply_pause(&mut inner, paused)
    }

    /// Flip the pause state; the returned state's `control_label` names the
    /// next action
    pub async fn toggle_pause(&self) -> Result<WorkoutState, WorkoutError> {
        let mut inner = self.inner.lock().await;
        let paused = !inner.machine.state().paused;
        self.apply_pause(&mut inner, paused)
    }

    fn apply_pause(
        &self,
        inner: &mut SessionInner,
        paused: bool,
    ) -> Result<WorkoutState, WorkoutError> {
        let events = inner.machine.set_paused(paused)?;
        self.dispatch(&events);

        if !events.is_empty() {
            info!("Workout {}", if paused { "paused" } else { "resumed" });
        }
        Ok(inner.machine.state().clone())
    }

    pub async fn state(&self) -> WorkoutState {
        self.inner.lock().await.machine.state().clone()
    }

    pub async fn status(&self) -> SessionStatus {
        let inner = self.inner.lock().await;
        SessionStatus {
            state: inner.machine.state().clone(),
            config: inner.machine.config().copied(),
            display: inner.machine.display(),
            ticking: inner.scheduler.is_running(),
            fault: inner.fault.clone(),
        }
    }

    /// Cancel whatever is running; used on shutdown
    pub async fn shutdown(&self) {
        match self.cancel().await {
            Ok(()) | Err(WorkoutError::NotRunning) => {}
            Err(e) => warn!("Failed to cancel workout on shutdown: {}", e),
        }
    }

    async fn on_tick(&self, generation: u64) -> ControlFlow<()> {
        let mut inner = self.inner.lock().await;
        if !inner.scheduler.is_current(generation) {
            debug!(generation, "stale tick ignored");
            return ControlFlow::Break(());
        }

        let events = match inner.machine.tick() {
            Ok(events) => events,
            Err(e) => {
                error!("Workout tick failed, halting heartbeat: {}", e);
                inner.fault = Some(e.to_string());
                inner.scheduler.release(generation);
                return ControlFlow::Break(());
            }
        };
        self.dispatch(&events);

        if !inner.machine.state().is_finished() {
            return ControlFlow::Continue(());
        }

        inner.scheduler.release(generation);
        self.release_wake_lock();
        drop(inner);

        let completed = events.iter().find_map(|event| match *event {
            WorkoutEvent::WorkoutCompleted {
                elapsed_seconds,
                rounds,
                exercises_per_round,
            } => Some((elapsed_seconds, rounds, exercises_per_round)),
            _ => None,
        });
        if let Some((elapsed_seconds, rounds, exercises_per_round)) = completed {
            info!(elapsed_seconds, rounds, exercises_per_round, "Workout complete");
            let record = HistoryRecord::now(elapsed_seconds, rounds, exercises_per_round);
            self.save_history(record).await;
        }
        ControlFlow::Break(())
    }

    async fn save_history(&self, record: HistoryRecord) {
        let history = Arc::clone(&self.history);
        match tokio::task::spawn_blocking(move || history.record(record)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => error!("Failed to save workout history: {:#}", e),
            Err(e) => error!("History writer task failed: {}", e),
        }
    }

    fn dispatch(&self, events: &[WorkoutEvent]) {
        for event in events {
            if let Some(text) = event.announcement() {
                if let Err(e) = self.notifier.announce(text) {
                    warn!("Announcement {:?} failed: {:#}", text, e);
                }
            }
            if let Some(display) = event.display() {
                if let Err(e) = self.notifier.display_update(display) {
                    warn!("Display update failed: {:#}", e);
                }
            }
            // No subscribers is fine
            let _ = self.events_tx.send(event.clone());
        }
    }

    fn release_wake_lock(&self) {
        if let Err(e) = self.wake_lock.release() {
            warn!("Failed to release wake lock: {}", e);
        }
    }
}
