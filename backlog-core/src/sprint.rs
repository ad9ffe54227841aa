//! Sprint selection: module grouping, module choice, compaction and ordering

use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::config::{CompactionLimits, SprintConfig, ELLIPSIS};
use crate::error::Result;
use crate::models::{module_key, Story, StoryStore};
use crate::storage::JsonStore;

/// Prefix every module key starts with
pub const MODULE_PREFIX: &str = "US-";

/// Completion counts for one module
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleProgress {
    pub module: String,
    pub total: usize,
    pub done: usize,
}

impl ModuleProgress {
    pub fn is_complete(&self) -> bool {
        self.done >= self.total
    }
}

/// Groups the backlog by module, in ascending module order.
///
/// Duplicate ids are counted once per occurrence.
pub fn module_progress(backlog: &StoryStore) -> Vec<ModuleProgress> {
    let mut modules: BTreeMap<String, (usize, usize)> = BTreeMap::new();
    for story in &backlog.user_stories {
        let entry = modules.entry(story.module()).or_default();
        entry.0 += 1;
        if story.passes {
            entry.1 += 1;
        }
    }

    modules
        .into_iter()
        .map(|(module, (total, done))| ModuleProgress {
            module,
            total,
            done,
        })
        .collect()
}

/// Uppercases requested module keys and drops anything not starting with `US-`
pub fn normalize_module_keys<S: AsRef<str>>(requested: &[S]) -> Vec<String> {
    let mut keys: Vec<String> = Vec::new();
    for arg in requested {
        let key = arg.as_ref().trim().to_uppercase();
        if !key.starts_with(MODULE_PREFIX) {
            log::warn!("Ignoring argument that is not a module key: {}", arg.as_ref());
            continue;
        }
        if !keys.contains(&key) {
            keys.push(key);
        }
    }
    keys
}

/// First module, in ascending key order, with open stories
pub fn next_incomplete_module(progress: &[ModuleProgress]) -> Option<String> {
    progress
        .iter()
        .find(|m| !m.is_complete())
        .map(|m| m.module.clone())
}

/// Modules for the next sprint: the requested ones if any, otherwise the
/// first incomplete module. Empty when every story is complete.
pub fn select_modules<S: AsRef<str>>(backlog: &StoryStore, requested: &[S]) -> Vec<String> {
    let explicit = normalize_module_keys(requested);
    if !explicit.is_empty() {
        return explicit;
    }
    next_incomplete_module(&module_progress(backlog))
        .into_iter()
        .collect()
}

/// Shortens `text` to at most `max_chars` characters, ending in `...` when cut
pub fn truncate_text(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let keep = max_chars.saturating_sub(ELLIPSIS.len());
    let mut truncated: String = text.chars().take(keep).collect();
    truncated.push_str(ELLIPSIS);
    truncated
}

/// Copy of `story` with long fields cut down to the sprint limits
pub fn compact_story(story: &Story, limits: &CompactionLimits) -> Story {
    Story {
        id: story.id.clone(),
        title: story.title.clone(),
        description: truncate_text(&story.description, limits.max_text_chars),
        acceptance_criteria: story
            .acceptance_criteria
            .iter()
            .take(limits.max_criteria)
            .map(|c| truncate_text(c, limits.max_criterion_chars))
            .collect(),
        priority: story.priority,
        passes: story.passes,
        notes: truncate_text(&story.notes, limits.max_text_chars),
    }
}

/// Builds the sprint store for `modules`, sorted by priority then id
pub fn build_sprint(backlog: &StoryStore, modules: &[String], limits: &CompactionLimits) -> StoryStore {
    let mut stories: Vec<Story> = backlog
        .user_stories
        .iter()
        .filter(|s| modules.contains(&module_key(&s.id)))
        .map(|s| compact_story(s, limits))
        .collect();
    stories.sort_by(|a, b| a.priority.cmp(&b.priority).then_with(|| a.id.cmp(&b.id)));

    let total = stories.len();
    let remaining = stories.iter().filter(|s| !s.passes).count();

    StoryStore {
        project: backlog.project.clone(),
        branch_name: backlog.branch_name.clone(),
        description: format!(
            "Sprint: {} - {} of {} stories remaining. Full backlog: {}/{} complete.",
            modules.join(", "),
            remaining,
            total,
            backlog.done_count(),
            backlog.user_stories.len()
        ),
        user_stories: stories,
    }
}

/// Diagnostics for a written sprint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SprintReport {
    pub modules: Vec<String>,
    pub path: PathBuf,
    pub total: usize,
    pub done: usize,
    pub remaining: usize,
    /// Most urgent priority among open stories
    pub highest_priority: Option<u8>,
    pub size_kb: u64,
    pub budget_kb: u64,
}

impl SprintReport {
    fn new(sprint: &StoryStore, modules: &[String], config: &SprintConfig, bytes: u64) -> Self {
        let total = sprint.user_stories.len();
        let done = sprint.done_count();
        Self {
            modules: modules.to_vec(),
            path: config.sprint_path.clone(),
            total,
            done,
            remaining: total - done,
            highest_priority: sprint
                .user_stories
                .iter()
                .filter(|s| !s.passes)
                .map(|s| s.priority)
                .min(),
            size_kb: bytes / 1024,
            budget_kb: config.max_sprint_kb,
        }
    }

    /// True when the sprint file is larger than the configured budget
    pub fn over_budget(&self) -> bool {
        self.size_kb > self.budget_kb
    }
}

/// Builds and writes the sprint file for `modules`
pub fn write_sprint(config: &SprintConfig, backlog: &StoryStore, modules: &[String]) -> Result<SprintReport> {
    let sprint = build_sprint(backlog, modules, &config.limits);
    let bytes = JsonStore::new(&config.sprint_path).save(&sprint)?;

    let report = SprintReport::new(&sprint, modules, config, bytes);
    if report.over_budget() {
        log::info!(
            "Sprint is {} KB, above the {} KB budget",
            report.size_kb,
            report.budget_kb
        );
    }
    Ok(report)
}
