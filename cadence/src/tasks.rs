//! Focus task queue shown next to the timer.
//!
//! One task is active at a time; advancing wraps back to the first task once
//! the end of the queue is reached.

use cadence_ipc::TaskInfo;
use serde::Deserialize;

/// How many tasks after the active one the task panel lists.
pub const UPCOMING_TASKS: usize = 2;

/// Task entry as written in the config file.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct TaskEntry {
    pub title: String,
    #[serde(default)]
    pub project: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub id: u32,
    pub title: String,
    pub project: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct TaskQueue {
    tasks: Vec<Task>,
    active: usize,
    next_id: u32,
}

impl TaskQueue {
    pub fn new(entries: &[TaskEntry]) -> Self {
        let mut queue = Self::default();
        for entry in entries {
            queue.add(entry.title.clone(), entry.project.clone());
        }
        queue
    }

    pub fn add(&mut self, title: String, project: Option<String>) -> &Task {
        self.next_id += 1;
        self.tasks.push(Task {
            id: self.next_id,
            title,
            project,
        });
        &self.tasks[self.tasks.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn active(&self) -> Option<&Task> {
        self.tasks.get(self.active)
    }

    /// Up to [`UPCOMING_TASKS`] tasks after the active one, without wrapping.
    pub fn upcoming(&self) -> &[Task] {
        let start = (self.active + 1).min(self.tasks.len());
        let end = (start + UPCOMING_TASKS).min(self.tasks.len());
        &self.tasks[start..end]
    }

    /// Moves to the next task, wrapping at the end. An empty queue stays empty.
    pub fn advance(&mut self) -> Option<&Task> {
        if self.tasks.is_empty() {
            return None;
        }
        self.active = (self.active + 1) % self.tasks.len();
        self.active()
    }

    pub fn to_info(&self) -> Vec<TaskInfo> {
        self.tasks
            .iter()
            .enumerate()
            .map(|(i, task)| TaskInfo {
                id: task.id,
                title: task.title.clone(),
                project: task.project.clone(),
                active: i == self.active,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn queue(titles: &[&str]) -> TaskQueue {
        let entries: Vec<TaskEntry> = titles
            .iter()
            .map(|title| TaskEntry {
                title: title.to_string(),
                project: None,
            })
            .collect();
        TaskQueue::new(&entries)
    }

    #[test]
    fn test_empty_queue_has_no_active_task() {
        let mut queue = TaskQueue::default();
        assert!(queue.active().is_none());
        assert!(queue.upcoming().is_empty());
        assert!(queue.advance().is_none());
        assert!(queue.to_info().is_empty());
    }

    #[test]
    fn test_upcoming_shows_next_two() {
        let queue = queue(&["Outline", "Draft", "Review", "Publish"]);
        assert_eq!(queue.active().unwrap().title, "Outline");
        let upcoming: Vec<_> = queue.upcoming().iter().map(|t| t.title.as_str()).collect();
        assert_eq!(upcoming, vec!["Draft", "Review"]);
    }

    #[test]
    fn test_advance_wraps_and_upcoming_does_not() {
        let mut queue = queue(&["Outline", "Draft", "Review"]);
        queue.advance();
        assert_eq!(queue.advance().unwrap().title, "Review");
        assert!(queue.upcoming().is_empty());
        assert_eq!(queue.advance().unwrap().title, "Outline");
    }

    #[test]
    fn test_add_assigns_increasing_ids_and_marks_active() {
        let mut queue = TaskQueue::default();
        let first = queue.add("Outline".to_string(), Some("Thesis".to_string())).id;
        let second = queue.add("Draft".to_string(), None).id;
        assert!(second > first);
        assert_eq!(queue.len(), 2);

        let info = queue.to_info();
        assert!(info[0].active);
        assert!(!info[1].active);
        assert_eq!(info[0].project.as_deref(), Some("Thesis"));
    }
}
