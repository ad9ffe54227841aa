//! Backlog progress overview

use crate::models::StoryStore;
use crate::sprint::{module_progress, ModuleProgress};
use crate::storage::JsonStore;

/// Width of the per-module progress bar
pub const PROGRESS_BAR_WIDTH: usize = 20;

/// Open/total counts of the sprint file currently on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentSprint {
    pub remaining: usize,
    pub total: usize,
    pub size_kb: u64,
}

/// Everything `sprint --status` shows
#[derive(Debug, Clone, PartialEq)]
pub struct StatusReport {
    pub done: usize,
    pub total: usize,
    pub modules: Vec<ModuleProgress>,
    pub current_sprint: Option<CurrentSprint>,
}

impl StatusReport {
    /// Share of completed stories in percent; 0 for an empty backlog
    pub fn percent_complete(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.done as f64 / self.total as f64 * 100.0
        }
    }
}

/// Collects progress for the backlog and the sprint file, if readable
pub fn status_report(backlog: &StoryStore, sprint_file: &JsonStore) -> StatusReport {
    let modules = module_progress(backlog);
    let done = modules.iter().map(|m| m.done).sum();
    let total = modules.iter().map(|m| m.total).sum();

    StatusReport {
        done,
        total,
        modules,
        current_sprint: current_sprint(sprint_file),
    }
}

fn current_sprint(sprint_file: &JsonStore) -> Option<CurrentSprint> {
    let value = sprint_file.read_value()?;
    let stories = value.get("userStories")?.as_array()?;
    let remaining = stories
        .iter()
        .filter(|s| !s.get("passes").and_then(|p| p.as_bool()).unwrap_or(false))
        .count();

    Some(CurrentSprint {
        remaining,
        total: stories.len(),
        size_kb: sprint_file.size_kb().unwrap_or(0),
    })
}

/// `####........` style bar for a module
pub fn progress_bar(progress: &ModuleProgress) -> String {
    let filled = progress.done * PROGRESS_BAR_WIDTH / progress.total.max(1);
    let filled = filled.min(PROGRESS_BAR_WIDTH);
    format!(
        "{}{}",
        "#".repeat(filled),
        ".".repeat(PROGRESS_BAR_WIDTH - filled)
    )
}

/// `DONE` for finished modules, otherwise `done/total`
pub fn progress_label(progress: &ModuleProgress) -> String {
    if progress.done == progress.total {
        "DONE".to_string()
    } else {
        format!("{}/{}", progress.done, progress.total)
    }
}
