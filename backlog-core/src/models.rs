use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::config::{DEFAULT_BRANCH, DEFAULT_PRIORITY, DEFAULT_PROJECT};

/// Number of leading id characters that name a story's module (`US-001`)
pub const MODULE_KEY_LEN: usize = 6;

/// A single user story extracted from a markdown document
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Story {
    /// Story identifier such as `US-001-01`
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub acceptance_criteria: Vec<String>,
    /// 1 (most urgent) to 4
    #[serde(default = "default_priority")]
    pub priority: u8,
    /// Completion flag, never reset once set
    #[serde(default)]
    pub passes: bool,
    #[serde(default)]
    pub notes: String,
}

fn default_priority() -> u8 {
    DEFAULT_PRIORITY
}

impl Story {
    /// Creates an open story with default priority and no content
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            acceptance_criteria: Vec::new(),
            priority: DEFAULT_PRIORITY,
            passes: false,
            notes: String::new(),
        }
    }

    /// Module key of this story
    pub fn module(&self) -> String {
        module_key(&self.id)
    }
}

/// Returns the module key for a story id: its first six characters
pub fn module_key(id: &str) -> String {
    id.chars().take(MODULE_KEY_LEN).collect()
}

fn default_project() -> String {
    DEFAULT_PROJECT.to_string()
}

fn default_branch() -> String {
    DEFAULT_BRANCH.to_string()
}

/// On-disk shape shared by the backlog and the sprint file
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StoryStore {
    #[serde(default = "default_project")]
    pub project: String,
    #[serde(default = "default_branch")]
    pub branch_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub user_stories: Vec<Story>,
}

impl Default for StoryStore {
    fn default() -> Self {
        Self {
            project: default_project(),
            branch_name: default_branch(),
            description: String::new(),
            user_stories: Vec::new(),
        }
    }
}

impl StoryStore {
    /// Builds a full backlog from freshly extracted stories
    pub fn backlog(project: &str, branch_name: &str, stories: Vec<Story>) -> Self {
        Self {
            project: project.to_string(),
            branch_name: branch_name.to_string(),
            description: format!("Full backlog: {} stories.", stories.len()),
            user_stories: stories,
        }
    }

    /// Number of stories marked complete
    pub fn done_count(&self) -> usize {
        self.user_stories.iter().filter(|s| s.passes).count()
    }

    /// Ids of every story marked complete
    pub fn completed_ids(&self) -> HashSet<String> {
        self.user_stories
            .iter()
            .filter(|s| s.passes)
            .map(|s| s.id.clone())
            .collect()
    }

    /// Marks every story whose id is in `ids` as complete.
    /// Returns how many stories flipped from open to complete.
    pub fn mark_completed(&mut self, ids: &HashSet<String>) -> usize {
        let mut changed = 0;
        for story in &mut self.user_stories {
            if !story.passes && ids.contains(&story.id) {
                story.passes = true;
                changed += 1;
            }
        }
        changed
    }
}
