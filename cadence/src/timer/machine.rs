//! The focus cycle as a pure state machine.
//!
//! [`TimerMachine::apply`] is the only way state changes. Each action builds the
//! next session/clock/cycle triple and commits it in one assignment, so no
//! observer ever sees a duration from one phase paired with the remaining time
//! of another. Timekeeping lives in [`super::driver`]; this module only counts
//! ticks.

use super::durations::{Durations, SkipPolicy};
use super::notification::Notification;
use super::session::Session;
use cadence_ipc::{SessionKind, TimerState};
use chrono::{DateTime, Local};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Clock {
    Paused { remaining: u32 },
    Running { remaining: u32 },
}

impl Clock {
    pub fn remaining(&self) -> u32 {
        match *self {
            Clock::Paused { remaining } | Clock::Running { remaining } => remaining,
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self, Clock::Running { .. })
    }

    fn with_remaining(self, remaining: u32) -> Self {
        match self {
            Clock::Paused { .. } => Clock::Paused { remaining },
            Clock::Running { .. } => Clock::Running { remaining },
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Start,
    Pause,
    Tick,
    Stop,
    ResetCurrent,
    Skip,
    Reconfigure(Durations),
    /// Switch to a preset's durations and start over from a fresh work session.
    ApplyPreset(Durations),
}

/// A phase that ended, naturally or by skip.
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub finished: Session,
    pub next: SessionKind,
    pub skipped: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Outcome {
    pub completion: Option<Completion>,
    /// Only natural completions notify.
    pub notification: Option<Notification>,
}

#[derive(Debug, Clone)]
pub struct TimerMachine {
    durations: Durations,
    skip_policy: SkipPolicy,
    session: Session,
    clock: Clock,
    completed_work_cycles: u32,
}

impl TimerMachine {
    pub fn new(durations: Durations, skip_policy: SkipPolicy) -> Self {
        let durations = durations.clamped();
        let session = Session::new(SessionKind::Work, durations.seconds_for(SessionKind::Work), None);
        Self {
            durations,
            skip_policy,
            clock: Clock::Paused {
                remaining: session.duration_secs(),
            },
            session,
            completed_work_cycles: 0,
        }
    }

    pub fn apply(&mut self, action: Action, now: DateTime<Local>) -> Outcome {
        match action {
            Action::Start => {
                if let Clock::Paused { remaining } = self.clock {
                    self.session.mark_started(now);
                    self.clock = Clock::Running { remaining };
                    debug!(session = %self.session.id(), remaining, "timer started");
                }
                Outcome::default()
            }
            Action::Pause => {
                if let Clock::Running { remaining } = self.clock {
                    self.clock = Clock::Paused { remaining };
                    debug!(session = %self.session.id(), remaining, "timer paused");
                }
                Outcome::default()
            }
            Action::Tick => self.tick(now),
            Action::Stop => {
                self.stop();
                Outcome::default()
            }
            Action::ResetCurrent => {
                let duration = self.durations.seconds_for(self.session.kind());
                self.session.rewind(duration);
                self.clock = Clock::Paused {
                    remaining: duration,
                };
                debug!(session = %self.session.id(), "session reset");
                Outcome::default()
            }
            Action::Skip => self.complete(now, true),
            Action::Reconfigure(durations) => {
                self.reconfigure(durations);
                Outcome::default()
            }
            Action::ApplyPreset(durations) => {
                self.durations = durations.clamped();
                self.stop();
                Outcome::default()
            }
        }
    }

    fn tick(&mut self, now: DateTime<Local>) -> Outcome {
        let Clock::Running { remaining } = self.clock else {
            return Outcome::default();
        };
        let remaining = remaining.saturating_sub(1);
        self.clock = Clock::Running { remaining };
        if remaining == 0 {
            self.complete(now, false)
        } else {
            Outcome::default()
        }
    }

    fn stop(&mut self) {
        let session = Session::new(
            SessionKind::Work,
            self.durations.seconds_for(SessionKind::Work),
            None,
        );
        self.clock = Clock::Paused {
            remaining: session.duration_secs(),
        };
        self.session = session;
        self.completed_work_cycles = 0;
        debug!(session = %self.session.id(), "timer stopped");
    }

    fn reconfigure(&mut self, durations: Durations) {
        self.durations = durations.clamped();
        let duration = self.durations.seconds_for(self.session.kind());
        self.session.resize(duration);
        self.clock = match self.clock {
            Clock::Running { remaining } => Clock::Running {
                remaining: remaining.min(duration),
            },
            Clock::Paused { .. } => Clock::Paused {
                remaining: duration,
            },
        };
        debug!(
            session = %self.session.id(),
            duration,
            remaining = self.clock.remaining(),
            "durations reconfigured"
        );
    }

    fn complete(&mut self, now: DateTime<Local>, skipped: bool) -> Outcome {
        let finished_kind = self.session.kind();
        let credited = !skipped || self.skip_policy == SkipPolicy::AdvanceCycle;

        let (next, cycles) = match finished_kind {
            SessionKind::Work => {
                let prospective = self.completed_work_cycles + 1;
                let cycles = if credited {
                    prospective
                } else {
                    self.completed_work_cycles
                };
                (self.durations.break_after(prospective), cycles)
            }
            SessionKind::ShortBreak => (SessionKind::Work, self.completed_work_cycles),
            SessionKind::LongBreak => (SessionKind::Work, 0),
        };

        let running = self.clock.is_running();
        let session = Session::new(
            next,
            self.durations.seconds_for(next),
            running.then_some(now),
        );
        let clock = self.clock.with_remaining(session.duration_secs());

        let mut finished = std::mem::replace(&mut self.session, session);
        finished.mark_completed();
        self.clock = clock;
        self.completed_work_cycles = cycles;

        debug!(
            finished = ?finished_kind,
            next = ?next,
            skipped,
            cycles,
            "session transition"
        );

        let notification = if skipped {
            None
        } else if finished_kind == SessionKind::Work {
            Some(Notification::work_finished(next))
        } else {
            Some(Notification::break_finished(finished_kind))
        };

        Outcome {
            completion: Some(Completion {
                finished,
                next,
                skipped,
            }),
            notification,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn clock(&self) -> Clock {
        self.clock
    }

    pub fn is_running(&self) -> bool {
        self.clock.is_running()
    }

    pub fn remaining_secs(&self) -> u32 {
        self.clock.remaining()
    }

    pub fn completed_work_cycles(&self) -> u32 {
        self.completed_work_cycles
    }

    pub fn durations(&self) -> &Durations {
        &self.durations
    }

    pub fn skip_policy(&self) -> SkipPolicy {
        self.skip_policy
    }

    pub fn set_skip_policy(&mut self, policy: SkipPolicy) {
        self.skip_policy = policy;
    }

    pub fn state(&self) -> TimerState {
        match self.clock {
            Clock::Running { .. } => TimerState::Running,
            Clock::Paused { .. } if self.session.started_at().is_none() => TimerState::Idle,
            Clock::Paused { .. } => TimerState::Paused,
        }
    }

    /// Kind of the session that would follow the current one. Never mutates
    /// the cycle count.
    pub fn upcoming(&self) -> SessionKind {
        match self.session.kind() {
            SessionKind::Work => self.durations.break_after(self.completed_work_cycles + 1),
            SessionKind::ShortBreak | SessionKind::LongBreak => SessionKind::Work,
        }
    }

    pub fn next_label(&self) -> String {
        let next = self.upcoming();
        format!("{} • {} min", next.label(), self.durations.minutes_for(next))
    }

    /// Fraction of the current session already elapsed, in `0.0..=1.0`.
    pub fn progress(&self) -> f64 {
        let total = self.session.duration_secs() as f64;
        if total > 0.0 {
            ((total - self.clock.remaining() as f64) / total).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::notification::Severity;

    fn classic() -> TimerMachine {
        TimerMachine::new(
            Durations::new(25, 5).with_long_break(15, 4),
            SkipPolicy::NoCredit,
        )
    }

    fn ticks(machine: &mut TimerMachine, n: u32) -> Vec<Outcome> {
        (0..n)
            .map(|_| machine.apply(Action::Tick, Local::now()))
            .filter(|o| o.completion.is_some())
            .collect()
    }

    /// Runs the current session to its natural end.
    fn finish(machine: &mut TimerMachine) -> Outcome {
        let remaining = machine.remaining_secs();
        let mut outcomes = ticks(machine, remaining);
        assert_eq!(outcomes.len(), 1);
        outcomes.remove(0)
    }

    #[test]
    fn test_initial_state_is_idle_work() {
        let machine = classic();
        assert_eq!(machine.session().kind(), SessionKind::Work);
        assert_eq!(machine.remaining_secs(), 1500);
        assert_eq!(machine.state(), TimerState::Idle);
        assert_eq!(machine.completed_work_cycles(), 0);
    }

    #[test]
    fn test_countdown_is_monotonic() {
        let mut machine = classic();
        machine.apply(Action::Start, Local::now());
        for expected in (1490..1500).rev() {
            machine.apply(Action::Tick, Local::now());
            assert_eq!(machine.remaining_secs(), expected);
        }
    }

    #[test]
    fn test_ticks_ignored_while_paused() {
        let mut machine = classic();
        ticks(&mut machine, 10);
        assert_eq!(machine.remaining_secs(), 1500);
    }

    #[test]
    fn test_work_completion_moves_to_short_break() {
        let mut machine = classic();
        machine.apply(Action::Start, Local::now());
        let outcome = finish(&mut machine);

        let completion = outcome.completion.unwrap();
        assert_eq!(completion.finished.kind(), SessionKind::Work);
        assert!(completion.finished.is_completed());
        assert!(!completion.skipped);
        assert_eq!(machine.session().kind(), SessionKind::ShortBreak);
        assert_eq!(machine.session().duration_secs(), 300);
        assert_eq!(machine.remaining_secs(), 300);
        assert_eq!(machine.completed_work_cycles(), 1);
        assert!(machine.is_running());
        assert!(machine.session().started_at().is_some());

        let notification = outcome.notification.unwrap();
        assert_eq!(notification.severity, Severity::Success);
    }

    #[test]
    fn test_long_break_cadence() {
        let mut machine = TimerMachine::new(
            Durations::new(25, 5).with_long_break(15, 2),
            SkipPolicy::NoCredit,
        );
        machine.apply(Action::Start, Local::now());

        let mut breaks = Vec::new();
        for _ in 0..4 {
            let outcome = finish(&mut machine);
            breaks.push(outcome.completion.unwrap().next);
            finish(&mut machine);
        }
        assert_eq!(
            breaks,
            vec![
                SessionKind::ShortBreak,
                SessionKind::LongBreak,
                SessionKind::ShortBreak,
                SessionKind::LongBreak,
            ]
        );
    }

    #[test]
    fn test_fourth_work_session_earns_long_break_then_resets() {
        let mut machine = classic();
        machine.apply(Action::Start, Local::now());
        for _ in 0..3 {
            finish(&mut machine);
            assert_eq!(machine.session().kind(), SessionKind::ShortBreak);
            finish(&mut machine);
        }
        assert_eq!(machine.completed_work_cycles(), 3);

        let outcome = finish(&mut machine);
        assert_eq!(machine.session().kind(), SessionKind::LongBreak);
        assert_eq!(machine.remaining_secs(), 900);
        assert_eq!(machine.completed_work_cycles(), 4);
        assert_eq!(
            outcome.notification.unwrap().message,
            "Focus cycle complete! Enjoy a long break."
        );

        let outcome = finish(&mut machine);
        assert_eq!(machine.session().kind(), SessionKind::Work);
        assert_eq!(machine.completed_work_cycles(), 0);
        assert_eq!(outcome.notification.unwrap().severity, Severity::Warning);
    }

    #[test]
    fn test_double_start_is_noop() {
        let mut machine = classic();
        machine.apply(Action::Start, Local::now());
        let started = machine.session().started_at();
        machine.apply(Action::Start, Local::now());
        assert_eq!(machine.session().started_at(), started);
        ticks(&mut machine, 5);
        assert_eq!(machine.remaining_secs(), 1495);
    }

    #[test]
    fn test_pause_keeps_remaining_and_is_idempotent() {
        let mut machine = classic();
        machine.apply(Action::Start, Local::now());
        ticks(&mut machine, 30);
        machine.apply(Action::Pause, Local::now());
        machine.apply(Action::Pause, Local::now());
        assert_eq!(machine.remaining_secs(), 1470);
        assert_eq!(machine.state(), TimerState::Paused);
    }

    #[test]
    fn test_reconfigure_while_running_clamps() {
        let mut machine = classic();
        machine.apply(Action::Start, Local::now());
        ticks(&mut machine, 500);
        assert_eq!(machine.remaining_secs(), 1000);

        let lowered = Durations::new(10, 5).with_long_break(15, 4);
        machine.apply(Action::Reconfigure(lowered), Local::now());
        assert_eq!(machine.remaining_secs(), 600);
        assert_eq!(machine.session().duration_secs(), 600);
        assert!(machine.is_running());

        let raised = Durations::new(50, 5).with_long_break(15, 4);
        machine.apply(Action::Reconfigure(raised), Local::now());
        assert_eq!(machine.remaining_secs(), 600);
        assert_eq!(machine.session().duration_secs(), 3000);
    }

    #[test]
    fn test_reconfigure_while_paused_sets_full_duration() {
        let mut machine = classic();
        machine.apply(Action::Start, Local::now());
        ticks(&mut machine, 100);
        machine.apply(Action::Pause, Local::now());

        let id = machine.session().id();
        machine.apply(
            Action::Reconfigure(Durations::new(40, 5).with_long_break(15, 4)),
            Local::now(),
        );
        assert_eq!(machine.remaining_secs(), 2400);
        assert_eq!(machine.session().id(), id);
    }

    #[test]
    fn test_reconfigure_clamps_below_floor() {
        let mut machine = classic();
        machine.apply(
            Action::Reconfigure(Durations {
                focus_minutes: 1,
                short_break_minutes: 0,
                long_break: None,
            }),
            Local::now(),
        );
        assert_eq!(machine.durations().focus_minutes, 5);
        assert_eq!(machine.durations().short_break_minutes, 1);
        assert_eq!(machine.remaining_secs(), 300);
    }

    #[test]
    fn test_stop_resets_everything() {
        let mut machine = classic();
        machine.apply(Action::Start, Local::now());
        finish(&mut machine);
        finish(&mut machine);
        ticks(&mut machine, 42);
        let before = machine.session().id();

        machine.apply(Action::Stop, Local::now());
        assert_ne!(machine.session().id(), before);
        assert_eq!(machine.session().kind(), SessionKind::Work);
        assert_eq!(machine.remaining_secs(), 1500);
        assert_eq!(machine.completed_work_cycles(), 0);
        assert_eq!(machine.state(), TimerState::Idle);
    }

    #[test]
    fn test_reset_current_keeps_kind() {
        let mut machine = classic();
        machine.apply(Action::Start, Local::now());
        finish(&mut machine);
        ticks(&mut machine, 100);
        let id = machine.session().id();

        machine.apply(Action::ResetCurrent, Local::now());
        assert_eq!(machine.session().kind(), SessionKind::ShortBreak);
        assert_eq!(machine.session().id(), id);
        assert_eq!(machine.remaining_secs(), 300);
        assert_eq!(machine.session().started_at(), None);
        assert_eq!(machine.state(), TimerState::Idle);
        assert_eq!(machine.completed_work_cycles(), 1);
    }

    #[test]
    fn test_skip_moves_on_without_notification_or_credit() {
        let mut machine = classic();
        machine.apply(Action::Start, Local::now());
        ticks(&mut machine, 1300);
        assert_eq!(machine.remaining_secs(), 200);

        let outcome = machine.apply(Action::Skip, Local::now());
        assert!(outcome.notification.is_none());
        assert!(outcome.completion.unwrap().skipped);
        assert_eq!(machine.session().kind(), SessionKind::ShortBreak);
        assert_eq!(machine.remaining_secs(), 300);
        assert_eq!(machine.completed_work_cycles(), 0);
        assert!(machine.is_running());
    }

    #[test]
    fn test_skip_with_advance_cycle_policy_counts() {
        let mut machine = TimerMachine::new(
            Durations::new(25, 5).with_long_break(15, 2),
            SkipPolicy::AdvanceCycle,
        );
        machine.apply(Action::Skip, Local::now());
        machine.apply(Action::Skip, Local::now());
        assert_eq!(machine.completed_work_cycles(), 1);

        machine.apply(Action::Skip, Local::now());
        assert_eq!(machine.session().kind(), SessionKind::LongBreak);
        assert_eq!(machine.completed_work_cycles(), 2);
    }

    #[test]
    fn test_skip_without_credit_uses_prospective_break() {
        let mut machine = TimerMachine::new(
            Durations::new(25, 5).with_long_break(15, 1),
            SkipPolicy::NoCredit,
        );
        machine.apply(Action::Skip, Local::now());
        assert_eq!(machine.session().kind(), SessionKind::LongBreak);
        assert_eq!(machine.completed_work_cycles(), 0);
    }

    #[test]
    fn test_skip_while_paused_stays_paused() {
        let mut machine = classic();
        machine.apply(Action::Skip, Local::now());
        assert!(!machine.is_running());
        assert_eq!(machine.state(), TimerState::Idle);
        assert_eq!(machine.session().started_at(), None);
    }

    #[test]
    fn test_two_phase_profile_never_takes_long_breaks() {
        let mut machine = TimerMachine::new(Durations::new(5, 1), SkipPolicy::NoCredit);
        machine.apply(Action::Start, Local::now());
        for _ in 0..8 {
            finish(&mut machine);
            assert_eq!(machine.session().kind(), SessionKind::ShortBreak);
            finish(&mut machine);
        }
        assert_eq!(machine.completed_work_cycles(), 8);
    }

    #[test]
    fn test_apply_preset_stops() {
        let mut machine = classic();
        machine.apply(Action::Start, Local::now());
        finish(&mut machine);

        machine.apply(
            Action::ApplyPreset(Durations::new(90, 20).with_long_break(30, 2)),
            Local::now(),
        );
        assert_eq!(machine.session().kind(), SessionKind::Work);
        assert_eq!(machine.remaining_secs(), 5400);
        assert_eq!(machine.completed_work_cycles(), 0);
        assert!(!machine.is_running());
    }

    #[test]
    fn test_upcoming_label_does_not_mutate() {
        let mut machine = classic();
        machine.apply(Action::Start, Local::now());
        for _ in 0..3 {
            finish(&mut machine);
            finish(&mut machine);
        }
        assert_eq!(machine.upcoming(), SessionKind::LongBreak);
        assert_eq!(machine.next_label(), "Long break • 15 min");
        assert_eq!(machine.completed_work_cycles(), 3);

        finish(&mut machine);
        assert_eq!(machine.next_label(), "Focus • 25 min");
    }

    #[test]
    fn test_progress_ratio() {
        let mut machine = classic();
        assert_eq!(machine.progress(), 0.0);
        machine.apply(Action::Start, Local::now());
        ticks(&mut machine, 750);
        assert!((machine.progress() - 0.5).abs() < f64::EPSILON);
    }
}
