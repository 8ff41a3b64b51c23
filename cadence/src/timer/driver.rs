//! Async owner of the [`TimerMachine`] and its one-second ticker.
//!
//! All operations and every tick go through one mutex, so a tick's decrement,
//! completion check and transition run as one step. The ticker registration
//! is only ever touched by [`sync_ticker`]: it cancels whatever is armed and
//! re-arms when the machine is running, keyed by session id and a generation
//! counter so a stale tick can never land after a pause.

use super::durations::{Durations, SkipPolicy};
use super::machine::{Action, Outcome, TimerMachine};
use super::notification::Notification;
use super::session::Session;
use cadence_ipc::{SessionKind, TimerState, TimerStatus};
use chrono::Local;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::{broadcast, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info};
use uuid::Uuid;

pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Point-in-time copy of the timer for rendering and status replies.
#[derive(Debug, Clone)]
pub struct TimerSnapshot {
    pub session: Session,
    pub state: TimerState,
    pub remaining_secs: u32,
    pub completed_work_cycles: u32,
    pub next: SessionKind,
    pub next_label: String,
    pub durations: Durations,
    pub skip_policy: SkipPolicy,
    pub progress: f64,
}

impl From<&TimerMachine> for TimerSnapshot {
    fn from(machine: &TimerMachine) -> Self {
        Self {
            session: machine.session().clone(),
            state: machine.state(),
            remaining_secs: machine.remaining_secs(),
            completed_work_cycles: machine.completed_work_cycles(),
            next: machine.upcoming(),
            next_label: machine.next_label(),
            durations: *machine.durations(),
            skip_policy: machine.skip_policy(),
            progress: machine.progress(),
        }
    }
}

impl TimerSnapshot {
    pub fn is_running(&self) -> bool {
        self.state == TimerState::Running
    }

    pub fn to_status(&self, preset: &str) -> TimerStatus {
        TimerStatus {
            session_id: self.session.id().to_string(),
            kind: self.session.kind(),
            state: self.state,
            remaining: u64::from(self.remaining_secs),
            total: u64::from(self.session.duration_secs()),
            completed_work_cycles: self.completed_work_cycles,
            next: self.next,
            preset: preset.to_string(),
        }
    }
}

struct Ticker {
    generation: u64,
    session_id: Uuid,
    handle: JoinHandle<()>,
}

struct Inner {
    machine: TimerMachine,
    ticker: Option<Ticker>,
    generation: u64,
}

impl Drop for Inner {
    fn drop(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.handle.abort();
        }
    }
}

#[derive(Clone)]
pub struct SessionTimer {
    inner: Arc<Mutex<Inner>>,
    events: broadcast::Sender<Notification>,
    tick_interval: Duration,
}

impl SessionTimer {
    pub fn new(machine: TimerMachine) -> Self {
        Self::with_tick_interval(machine, TICK_INTERVAL)
    }

    pub fn with_tick_interval(machine: TimerMachine, tick_interval: Duration) -> Self {
        let (events, _rx) = broadcast::channel(16);
        Self {
            inner: Arc::new(Mutex::new(Inner {
                machine,
                ticker: None,
                generation: 0,
            })),
            events,
            tick_interval,
        }
    }

    /// Notifications fired by natural session completions.
    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.events.subscribe()
    }

    pub async fn snapshot(&self) -> TimerSnapshot {
        TimerSnapshot::from(&self.inner.lock().await.machine)
    }

    pub async fn start(&self) -> TimerSnapshot {
        self.dispatch(Action::Start).await
    }

    pub async fn pause(&self) -> TimerSnapshot {
        self.dispatch(Action::Pause).await
    }

    pub async fn toggle(&self) -> TimerSnapshot {
        let mut inner = self.inner.lock().await;
        let action = if inner.machine.is_running() {
            Action::Pause
        } else {
            Action::Start
        };
        self.apply_locked(&mut inner, action)
    }

    pub async fn stop(&self) -> TimerSnapshot {
        self.dispatch(Action::Stop).await
    }

    pub async fn reset_current(&self) -> TimerSnapshot {
        self.dispatch(Action::ResetCurrent).await
    }

    pub async fn skip(&self) -> TimerSnapshot {
        self.dispatch(Action::Skip).await
    }

    pub async fn reconfigure(&self, durations: Durations) -> TimerSnapshot {
        self.dispatch(Action::Reconfigure(durations)).await
    }

    pub async fn apply_preset(&self, durations: Durations) -> TimerSnapshot {
        self.dispatch(Action::ApplyPreset(durations)).await
    }

    pub async fn set_skip_policy(&self, policy: SkipPolicy) {
        self.inner.lock().await.machine.set_skip_policy(policy);
    }

    /// Pauses and releases the ticker. Used when the owning screen goes away.
    pub async fn shutdown(&self) {
        let mut inner = self.inner.lock().await;
        self.apply_locked(&mut inner, Action::Pause);
        if let Some(ticker) = inner.ticker.take() {
            ticker.handle.abort();
        }
        debug!("session timer shut down");
    }

    async fn dispatch(&self, action: Action) -> TimerSnapshot {
        let mut inner = self.inner.lock().await;
        self.apply_locked(&mut inner, action)
    }

    fn apply_locked(&self, inner: &mut Inner, action: Action) -> TimerSnapshot {
        let outcome = inner.machine.apply(action, Local::now());
        sync_ticker(
            inner,
            Arc::downgrade(&self.inner),
            &self.events,
            self.tick_interval,
        );
        publish(&self.events, outcome);
        TimerSnapshot::from(&inner.machine)
    }
}

/// Cancel-then-maybe-rearm. The ticker stays untouched only when it is
/// already armed for the running session.
fn sync_ticker(
    inner: &mut Inner,
    shared: Weak<Mutex<Inner>>,
    events: &broadcast::Sender<Notification>,
    period: Duration,
) {
    let wanted = inner
        .machine
        .is_running()
        .then(|| inner.machine.session().id());

    if let (Some(ticker), Some(session_id)) = (&inner.ticker, wanted) {
        if ticker.session_id == session_id {
            return;
        }
    }

    if let Some(ticker) = inner.ticker.take() {
        ticker.handle.abort();
        debug!(generation = ticker.generation, "ticker cancelled");
    }

    if let Some(session_id) = wanted {
        inner.generation += 1;
        let generation = inner.generation;
        let handle = tokio::spawn(run_ticker(shared, events.clone(), generation, period));
        inner.ticker = Some(Ticker {
            generation,
            session_id,
            handle,
        });
        debug!(generation, session = %session_id, "ticker armed");
    }
}

async fn run_ticker(
    shared: Weak<Mutex<Inner>>,
    events: broadcast::Sender<Notification>,
    generation: u64,
    period: Duration,
) {
    let mut interval = time::interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        interval.tick().await;

        let Some(inner) = shared.upgrade() else {
            break;
        };
        let mut guard = inner.lock().await;
        if guard.ticker.as_ref().map(|t| t.generation) != Some(generation) {
            break;
        }

        let outcome = guard.machine.apply(Action::Tick, Local::now());
        if outcome.completion.is_some() {
            // New session identity: hand over to a freshly armed ticker.
            sync_ticker(&mut guard, shared.clone(), &events, period);
        }
        drop(guard);
        publish(&events, outcome);
    }
}

fn publish(events: &broadcast::Sender<Notification>, outcome: Outcome) {
    if let Some(completion) = &outcome.completion {
        info!(
            finished = ?completion.finished.kind(),
            next = ?completion.next,
            skipped = completion.skipped,
            "session finished"
        );
    }
    if let Some(notification) = outcome.notification {
        // Nobody listening is fine; the UI may not have subscribed yet.
        let _ = events.send(notification);
    }
}
