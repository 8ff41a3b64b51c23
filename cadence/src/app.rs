use crate::config::Config;
use crate::controller::Controller;
use crate::tasks::UPCOMING_TASKS;
use crate::timer::{Notification, TimerSnapshot};
use cadence_ipc::{DurationsPatch, PresetInfo, TaskInfo};
use std::time::{Duration, Instant};
use tokio::sync::broadcast::{self, error::TryRecvError};

const TOAST_TTL: Duration = Duration::from_secs(4);

#[derive(Default, Clone, Copy, PartialEq, Eq, Debug)]
pub enum AppMode {
    #[default]
    Normal,
    SelectingPreset,
    ShowHelp,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum DurationField {
    Focus,
    ShortBreak,
    LongBreak,
    Cycles,
}

impl DurationField {
    /// Slider step for this field.
    fn step(&self) -> i64 {
        match self {
            DurationField::Focus | DurationField::LongBreak => 5,
            DurationField::ShortBreak | DurationField::Cycles => 1,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Toast {
    pub notification: Notification,
    pub shown_at: Instant,
}

pub struct App {
    pub controller: Controller,
    pub snapshot: TimerSnapshot,
    pub presets: Vec<PresetInfo>,
    pub tasks: Vec<TaskInfo>,
    pub mode: AppMode,
    pub toast: Option<Toast>,
    pub config: Config,
    pub should_quit: bool,
    events: broadcast::Receiver<Notification>,
}

impl App {
    pub async fn new(config: Config, controller: Controller) -> Self {
        let events = controller.timer().subscribe();
        Self {
            snapshot: controller.snapshot().await,
            presets: controller.presets().await,
            tasks: controller.tasks().await,
            controller,
            mode: AppMode::Normal,
            toast: None,
            config,
            should_quit: false,
            events,
        }
    }

    /// Pulls fresh timer state and pending notifications. Called once per frame.
    pub async fn refresh(&mut self) {
        self.snapshot = self.controller.snapshot().await;
        self.presets = self.controller.presets().await;
        self.tasks = self.controller.tasks().await;
        loop {
            match self.events.try_recv() {
                Ok(notification) => self.show_toast(notification),
                Err(TryRecvError::Lagged(_)) => continue,
                Err(TryRecvError::Empty | TryRecvError::Closed) => break,
            }
        }
        if self
            .toast
            .as_ref()
            .is_some_and(|t| t.shown_at.elapsed() >= TOAST_TTL)
        {
            self.toast = None;
        }
    }

    pub fn show_toast(&mut self, notification: Notification) {
        self.toast = Some(Toast {
            notification,
            shown_at: Instant::now(),
        });
    }

    pub async fn toggle_timer(&mut self) {
        self.snapshot = self.controller.timer().toggle().await;
    }

    pub async fn stop_timer(&mut self) {
        self.snapshot = self.controller.timer().stop().await;
    }

    pub async fn reset_timer(&mut self) {
        self.snapshot = self.controller.timer().reset_current().await;
    }

    pub async fn skip_session(&mut self) {
        self.snapshot = self.controller.timer().skip().await;
    }

    /// `number` is the 1-based position shown in the preset overlay.
    pub async fn select_preset_by_number(&mut self, number: usize) -> bool {
        let Some(preset) = number.checked_sub(1).and_then(|i| self.presets.get(i)) else {
            return false;
        };
        let (id, title) = (preset.id.clone(), preset.title.clone());
        match self.controller.select_preset(&id).await {
            Ok(snapshot) => {
                self.snapshot = snapshot;
                self.presets = self.controller.presets().await;
                self.show_toast(Notification::info("Preset", format!("{title} selected")));
                true
            }
            Err(_) => false,
        }
    }

    pub async fn adjust(&mut self, field: DurationField, steps: i64) {
        let durations = self.snapshot.durations;
        if matches!(field, DurationField::LongBreak | DurationField::Cycles)
            && !self.config.timer.long_breaks
        {
            self.show_toast(Notification::info(
                "Long breaks",
                "Long breaks are disabled in the config",
            ));
            return;
        }

        let shifted = |value: u32| {
            let next = i64::from(value) + steps * field.step();
            Some(u32::try_from(next.max(0)).unwrap_or(0))
        };
        let long_break = durations.long_break.unwrap_or_default();
        let patch = match field {
            DurationField::Focus => DurationsPatch {
                focus_minutes: shifted(durations.focus_minutes),
                ..Default::default()
            },
            DurationField::ShortBreak => DurationsPatch {
                short_break_minutes: shifted(durations.short_break_minutes),
                ..Default::default()
            },
            DurationField::LongBreak => DurationsPatch {
                long_break_minutes: shifted(long_break.minutes),
                ..Default::default()
            },
            DurationField::Cycles => DurationsPatch {
                cycles_before_long_break: shifted(long_break.every),
                ..Default::default()
            },
        };
        match self.controller.configure(&patch).await {
            Ok(snapshot) => {
                self.snapshot = snapshot;
                self.presets = self.controller.presets().await;
            }
            Err(e) => self.show_toast(Notification::info("Durations", e.to_string())),
        }
    }

    pub async fn advance_task(&mut self) {
        if self.controller.next_task().await.is_none() {
            self.show_toast(Notification::info(
                "Tasks",
                "No tasks queued. Add one with cadencectl task --add",
            ));
        }
        self.tasks = self.controller.tasks().await;
    }

    pub fn active_task(&self) -> Option<&TaskInfo> {
        self.tasks.iter().find(|t| t.active)
    }

    /// Tasks after the active one, as many as the task panel shows.
    pub fn upcoming_tasks(&self) -> impl Iterator<Item = &TaskInfo> {
        self.tasks
            .iter()
            .skip_while(|t| !t.active)
            .skip(1)
            .take(UPCOMING_TASKS)
    }

    pub fn selected_preset(&self) -> Option<&PresetInfo> {
        self.presets.iter().find(|p| p.selected)
    }

    pub fn time_display(&self) -> String {
        let remaining = self.snapshot.remaining_secs;
        format!("{:02}:{:02}", remaining / 60, remaining % 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TimerConfig;
    use crate::timer::{Durations, Severity};

    async fn app(timer: TimerConfig) -> App {
        let controller = Controller::new(&timer);
        App::new(
            Config {
                timer,
                ..Default::default()
            },
            controller,
        )
        .await
    }

    #[tokio::test]
    async fn test_adjust_focus_uses_slider_step() {
        let mut app = app(TimerConfig::default()).await;
        app.adjust(DurationField::Focus, 1).await;
        assert_eq!(app.snapshot.durations.focus_minutes, 30);
        assert_eq!(app.time_display(), "30:00");
        assert_eq!(app.selected_preset().unwrap().id, "custom");

        app.adjust(DurationField::Focus, -10).await;
        assert_eq!(app.snapshot.durations.focus_minutes, 10);
    }

    #[tokio::test]
    async fn test_long_break_controls_disabled_in_two_phase_profile() {
        let mut app = app(TimerConfig {
            long_breaks: false,
            ..Default::default()
        })
        .await;
        app.adjust(DurationField::Cycles, 1).await;
        assert!(app.snapshot.durations.long_break.is_none());
        assert_eq!(
            app.toast.as_ref().unwrap().notification.severity,
            Severity::Info
        );
    }

    #[tokio::test]
    async fn test_select_preset_by_number() {
        let mut app = app(TimerConfig::default()).await;
        assert!(app.select_preset_by_number(2).await);
        assert_eq!(app.snapshot.remaining_secs, 5400);
        assert_eq!(app.selected_preset().unwrap().id, "deep-focus");
        assert!(!app.select_preset_by_number(0).await);
        assert!(!app.select_preset_by_number(9).await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_picks_up_completion_toast() {
        let mut app = app(TimerConfig {
            long_breaks: false,
            custom: Durations::new(5, 1),
            preset: "custom".to_string(),
            ..Default::default()
        })
        .await;
        app.toggle_timer().await;
        tokio::time::sleep(Duration::from_millis(300_500)).await;

        app.refresh().await;
        let toast = app.toast.as_ref().unwrap();
        assert_eq!(toast.notification.severity, Severity::Success);
        assert_eq!(app.time_display(), "01:00");
    }

    #[tokio::test]
    async fn test_advance_task_moves_panel_along() {
        let mut app = app(TimerConfig::default()).await;
        app.advance_task().await;
        assert!(app.active_task().is_none());
        assert_eq!(
            app.toast.as_ref().unwrap().notification.severity,
            Severity::Info
        );

        for title in ["Outline", "Draft", "Review", "Publish"] {
            app.controller.add_task(title, None).await.unwrap();
        }
        app.refresh().await;
        assert_eq!(app.active_task().unwrap().title, "Outline");
        let upcoming: Vec<_> = app.upcoming_tasks().map(|t| t.title.as_str()).collect();
        assert_eq!(upcoming, vec!["Draft", "Review"]);

        app.advance_task().await;
        assert_eq!(app.active_task().unwrap().title, "Draft");
        let upcoming: Vec<_> = app.upcoming_tasks().map(|t| t.title.as_str()).collect();
        assert_eq!(upcoming, vec!["Review", "Publish"]);
    }
}
