use cadence_ipc::SessionKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Success,
    Warning,
}

/// Message surfaced to the user, as a toast and optionally on the desktop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub message: String,
    pub severity: Severity,
}

impl Notification {
    pub fn info(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            severity: Severity::Info,
        }
    }

    /// A work session ran out; `next` is the break that follows.
    pub fn work_finished(next: SessionKind) -> Self {
        let message = match next {
            SessionKind::LongBreak => "Focus cycle complete! Enjoy a long break.",
            _ => "Focus session complete! Time for a short break.",
        };
        Self {
            title: "Focus complete".to_string(),
            message: message.to_string(),
            severity: Severity::Success,
        }
    }

    pub fn break_finished(finished: SessionKind) -> Self {
        let message = match finished {
            SessionKind::LongBreak => "Long break is over. Ready for a new cycle!",
            _ => "Short break is over. Back to focus!",
        };
        Self {
            title: "Break over".to_string(),
            message: message.to_string(),
            severity: Severity::Warning,
        }
    }
}
