use cadence_ipc::SessionKind;
use chrono::{DateTime, Local};
use uuid::Uuid;

/// One timed phase of the cycle.
///
/// A fresh `Session` (with a fresh id) is created on every transition. Only the
/// start timestamp and the completed flag change afterwards, plus the length
/// when durations are reconfigured mid-session.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    id: Uuid,
    kind: SessionKind,
    duration_secs: u32,
    started_at: Option<DateTime<Local>>,
    completed: bool,
}

impl Session {
    pub fn new(kind: SessionKind, duration_secs: u32, started_at: Option<DateTime<Local>>) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            duration_secs,
            started_at,
            completed: false,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn kind(&self) -> SessionKind {
        self.kind
    }

    pub fn duration_secs(&self) -> u32 {
        self.duration_secs
    }

    pub fn started_at(&self) -> Option<DateTime<Local>> {
        self.started_at
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    /// Records the first transition to running; later calls keep the original time.
    pub(crate) fn mark_started(&mut self, now: DateTime<Local>) {
        self.started_at.get_or_insert(now);
    }

    pub(crate) fn mark_completed(&mut self) {
        self.completed = true;
    }

    pub(crate) fn resize(&mut self, duration_secs: u32) {
        self.duration_secs = duration_secs;
    }

    pub(crate) fn rewind(&mut self, duration_secs: u32) {
        self.duration_secs = duration_secs;
        self.started_at = None;
        self.completed = false;
    }
}
