//! Duration configuration for the focus cycle.
//!
//! Every constructor and mutator clamps into the ranges the duration controls
//! allow, so a `Durations` value is always usable as-is.

use cadence_ipc::{DurationsPatch, SessionKind};
use serde::{Deserialize, Serialize};

pub const MIN_FOCUS_MINUTES: u32 = 5;
/// Profiles with long breaks use longer focus blocks.
pub const MIN_FOCUS_MINUTES_WITH_LONG_BREAKS: u32 = 10;
pub const MAX_FOCUS_MINUTES: u32 = 180;
pub const MIN_SHORT_BREAK_MINUTES: u32 = 1;
pub const MAX_SHORT_BREAK_MINUTES: u32 = 45;
pub const MIN_LONG_BREAK_MINUTES: u32 = 5;
pub const MAX_LONG_BREAK_MINUTES: u32 = 60;
pub const MIN_CYCLES: u32 = 1;
pub const MAX_CYCLES: u32 = 6;

pub const DEFAULT_LONG_BREAK_MINUTES: u32 = 15;
pub const DEFAULT_CYCLES: u32 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LongBreak {
    pub minutes: u32,
    /// Completed work sessions between two long breaks
    pub every: u32,
}

impl Default for LongBreak {
    fn default() -> Self {
        Self {
            minutes: DEFAULT_LONG_BREAK_MINUTES,
            every: DEFAULT_CYCLES,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Durations {
    pub focus_minutes: u32,
    pub short_break_minutes: u32,
    pub long_break: Option<LongBreak>,
}

impl Default for Durations {
    fn default() -> Self {
        let long_break = LongBreak::default();
        Self::new(25, 5).with_long_break(long_break.minutes, long_break.every)
    }
}

impl Durations {
    /// Two-phase profile: focus and short break only.
    pub fn new(focus_minutes: u32, short_break_minutes: u32) -> Self {
        Self {
            focus_minutes,
            short_break_minutes,
            long_break: None,
        }
        .clamped()
    }

    pub fn with_long_break(self, minutes: u32, every: u32) -> Self {
        Self {
            long_break: Some(LongBreak { minutes, every }),
            ..self
        }
        .clamped()
    }

    pub fn without_long_break(self) -> Self {
        Self {
            long_break: None,
            ..self
        }
        .clamped()
    }

    pub fn clamped(self) -> Self {
        let min_focus = if self.long_break.is_some() {
            MIN_FOCUS_MINUTES_WITH_LONG_BREAKS
        } else {
            MIN_FOCUS_MINUTES
        };
        Self {
            focus_minutes: self.focus_minutes.clamp(min_focus, MAX_FOCUS_MINUTES),
            short_break_minutes: self
                .short_break_minutes
                .clamp(MIN_SHORT_BREAK_MINUTES, MAX_SHORT_BREAK_MINUTES),
            long_break: self.long_break.map(|lb| LongBreak {
                minutes: lb.minutes.clamp(MIN_LONG_BREAK_MINUTES, MAX_LONG_BREAK_MINUTES),
                every: lb.every.clamp(MIN_CYCLES, MAX_CYCLES),
            }),
        }
    }

    pub fn minutes_for(&self, kind: SessionKind) -> u32 {
        match (kind, self.long_break) {
            (SessionKind::Work, _) => self.focus_minutes,
            (SessionKind::LongBreak, Some(lb)) => lb.minutes,
            // Long breaks switched off mid-break fall back to the short break length.
            (SessionKind::ShortBreak, _) | (SessionKind::LongBreak, None) => {
                self.short_break_minutes
            }
        }
    }

    pub fn seconds_for(&self, kind: SessionKind) -> u32 {
        self.minutes_for(kind) * 60
    }

    /// Break that follows the `work_cycles`-th completed work session.
    pub fn break_after(&self, work_cycles: u32) -> SessionKind {
        match self.long_break {
            Some(lb) if lb.every > 0 && work_cycles > 0 && work_cycles % lb.every == 0 => {
                SessionKind::LongBreak
            }
            _ => SessionKind::ShortBreak,
        }
    }

    /// Applies the fields present in `patch`. Setting either long-break field
    /// on a profile without long breaks switches them on.
    pub fn patched(&self, patch: &DurationsPatch) -> Self {
        let long_break = match (
            self.long_break,
            patch.long_break_minutes,
            patch.cycles_before_long_break,
        ) {
            (current, None, None) => current,
            (current, minutes, every) => {
                let base = current.unwrap_or_default();
                Some(LongBreak {
                    minutes: minutes.unwrap_or(base.minutes),
                    every: every.unwrap_or(base.every),
                })
            }
        };
        Self {
            focus_minutes: patch.focus_minutes.unwrap_or(self.focus_minutes),
            short_break_minutes: patch.short_break_minutes.unwrap_or(self.short_break_minutes),
            long_break,
        }
        .clamped()
    }
}

/// Whether skipping a work session counts toward the long-break cadence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SkipPolicy {
    /// Skipped work sessions earn no cycle credit
    #[default]
    NoCredit,
    /// Skipped work sessions count like finished ones
    AdvanceCycle,
}
