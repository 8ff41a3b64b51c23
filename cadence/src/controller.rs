//! Inbound operations shared by the terminal UI and the IPC server.

use crate::config::TimerConfig;
use crate::tasks::{TaskEntry, TaskQueue};
use crate::timer::{PresetCatalog, SessionTimer, TimerMachine, TimerSnapshot};
use anyhow::{anyhow, bail, Result};
use cadence_ipc::{DurationsPatch, PresetInfo, TaskInfo, TimerStatus};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

#[derive(Clone)]
pub struct Controller {
    timer: SessionTimer,
    presets: Arc<Mutex<PresetCatalog>>,
    tasks: Arc<Mutex<TaskQueue>>,
    long_breaks: bool,
}

impl Controller {
    pub fn new(config: &TimerConfig) -> Self {
        let mut presets = PresetCatalog::builtin(config.long_breaks, config.custom);
        let durations = match presets.select(&config.preset) {
            Some(durations) => durations,
            None => {
                warn!(preset = %config.preset, "unknown preset in config, using default");
                presets.selected().durations
            }
        };
        let machine = TimerMachine::new(durations, config.skip_policy);
        Self {
            timer: SessionTimer::new(machine),
            presets: Arc::new(Mutex::new(presets)),
            tasks: Arc::new(Mutex::new(TaskQueue::default())),
            long_breaks: config.long_breaks,
        }
    }

    /// Seeds the focus queue.
    pub fn with_tasks(self, entries: &[TaskEntry]) -> Self {
        Self {
            tasks: Arc::new(Mutex::new(TaskQueue::new(entries))),
            ..self
        }
    }

    pub fn timer(&self) -> &SessionTimer {
        &self.timer
    }

    pub async fn snapshot(&self) -> TimerSnapshot {
        self.timer.snapshot().await
    }

    pub async fn status(&self) -> TimerStatus {
        let preset = self.presets.lock().await.selected().id.clone();
        self.timer.snapshot().await.to_status(&preset)
    }

    pub async fn presets(&self) -> Vec<PresetInfo> {
        self.presets.lock().await.to_info()
    }

    /// Applies a preset and resets to a fresh work session.
    pub async fn select_preset(&self, id: &str) -> Result<TimerSnapshot> {
        let mut presets = self.presets.lock().await;
        let durations = presets
            .select(id)
            .ok_or_else(|| anyhow!("unknown preset: {id}"))?;
        info!(preset = id, "preset selected");
        Ok(self.timer.apply_preset(durations).await)
    }

    /// Duration change from the controls: lands in the custom preset and
    /// reconfigures the running session in place. Long-break fields are
    /// refused when the profile runs without long breaks.
    pub async fn configure(&self, patch: &DurationsPatch) -> Result<TimerSnapshot> {
        if !self.long_breaks
            && (patch.long_break_minutes.is_some() || patch.cycles_before_long_break.is_some())
        {
            bail!("long breaks are disabled in the config");
        }
        let mut presets = self.presets.lock().await;
        let current = self.timer.snapshot().await.durations;
        let durations = presets.customize(&current, patch);
        Ok(self.timer.reconfigure(durations).await)
    }

    pub async fn tasks(&self) -> Vec<TaskInfo> {
        self.tasks.lock().await.to_info()
    }

    pub async fn add_task(&self, title: &str, project: Option<String>) -> Result<TaskInfo> {
        let title = title.trim();
        if title.is_empty() {
            bail!("task title is empty");
        }
        let mut tasks = self.tasks.lock().await;
        let was_empty = tasks.is_empty();
        let task = tasks.add(title.to_string(), project);
        info!(id = task.id, title = %task.title, "task added");
        Ok(TaskInfo {
            id: task.id,
            title: task.title.clone(),
            project: task.project.clone(),
            active: was_empty,
        })
    }

    /// Advances the focus queue; `None` when it is empty.
    pub async fn next_task(&self) -> Option<TaskInfo> {
        let mut tasks = self.tasks.lock().await;
        let task = tasks.advance()?;
        info!(id = task.id, title = %task.title, "active task changed");
        Some(TaskInfo {
            id: task.id,
            title: task.title.clone(),
            project: task.project.clone(),
            active: true,
        })
    }
}
