//! Named defaults, the optional `sprint.yaml` file and project-root resolution

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{BacklogError, Result};

pub const DEFAULT_PROJECT: &str = "MyProject";
pub const DEFAULT_BRANCH: &str = "ralph/sprint";
pub const DEFAULT_STORIES_DIR: &str = "docs/userstories";
pub const BACKLOG_FILE: &str = "backlog.json";
pub const SPRINT_FILE: &str = "prd.json";
pub const CONFIG_FILE: &str = "sprint.yaml";

/// Environment variable naming the project root
pub const PROJECT_ROOT_ENV: &str = "SPRINT_PROJECT_ROOT";

/// Story documents are `US-*.md`
pub const STORY_FILE_PREFIX: &str = "US-";
pub const STORY_FILE_EXTENSION: &str = "md";

pub const DEFAULT_PRIORITY: u8 = 2;
pub const PLACEHOLDER_CRITERION: &str = "Story must be implemented and tested";
pub const NOTES_SEPARATOR: &str = " | ";

/// Sprint files above this size (in KB) trigger a warning
pub const MAX_SPRINT_KB: u64 = 80;
pub const MAX_TEXT_CHARS: usize = 300;
pub const MAX_CRITERIA: usize = 8;
pub const MAX_CRITERION_CHARS: usize = 200;
pub const ELLIPSIS: &str = "...";

/// Truncation limits applied to stories copied into a sprint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompactionLimits {
    /// Cap for `description` and `notes`, ellipsis included
    pub max_text_chars: usize,
    pub max_criteria: usize,
    /// Cap for each acceptance criterion, ellipsis included
    pub max_criterion_chars: usize,
}

impl Default for CompactionLimits {
    fn default() -> Self {
        Self {
            max_text_chars: MAX_TEXT_CHARS,
            max_criteria: MAX_CRITERIA,
            max_criterion_chars: MAX_CRITERION_CHARS,
        }
    }
}

impl CompactionLimits {
    /// Raises character caps that could not hold the ellipsis plus one character
    pub fn normalized(self) -> Self {
        let floor = ELLIPSIS.len() + 1;
        Self {
            max_text_chars: self.max_text_chars.max(floor),
            max_criteria: self.max_criteria,
            max_criterion_chars: self.max_criterion_chars.max(floor),
        }
    }
}

/// Contents of `sprint.yaml`; every field is optional
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    pub project: Option<String>,
    pub branch_name: Option<String>,
    pub stories_dir: Option<PathBuf>,
    pub backlog_file: Option<PathBuf>,
    pub sprint_file: Option<PathBuf>,
    pub max_sprint_kb: Option<u64>,
    pub compaction: Option<CompactionLimits>,
}

impl ConfigFile {
    /// Loads `path`, returning defaults when the file does not exist
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| BacklogError::io(path, e))?;
        serde_yaml::from_str(&content).map_err(|source| BacklogError::Config {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Resolved settings for one run of either tool
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SprintConfig {
    pub root: PathBuf,
    pub project: String,
    pub branch_name: String,
    pub stories_dir: PathBuf,
    pub backlog_path: PathBuf,
    pub sprint_path: PathBuf,
    pub max_sprint_kb: u64,
    pub limits: CompactionLimits,
}

impl SprintConfig {
    /// Defaults for a project rooted at `root`
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        let root = root.as_ref().to_path_buf();
        Self {
            project: DEFAULT_PROJECT.to_string(),
            branch_name: DEFAULT_BRANCH.to_string(),
            stories_dir: root.join(DEFAULT_STORIES_DIR),
            backlog_path: root.join(BACKLOG_FILE),
            sprint_path: root.join(SPRINT_FILE),
            max_sprint_kb: MAX_SPRINT_KB,
            limits: CompactionLimits::default(),
            root,
        }
    }

    /// Defaults for `root` overlaid with `root/sprint.yaml` if present.
    /// Relative paths in the file are resolved against `root`.
    pub fn load<P: AsRef<Path>>(root: P) -> Result<Self> {
        let mut config = Self::new(root);
        let file = ConfigFile::load_or_default(config.root.join(CONFIG_FILE))?;
        config.apply(file);
        Ok(config)
    }

    fn apply(&mut self, file: ConfigFile) {
        if let Some(project) = file.project {
            self.project = project;
        }
        if let Some(branch) = file.branch_name {
            self.branch_name = branch;
        }
        if let Some(dir) = file.stories_dir {
            self.stories_dir = self.root.join(dir);
        }
        if let Some(backlog) = file.backlog_file {
            self.backlog_path = self.root.join(backlog);
        }
        if let Some(sprint) = file.sprint_file {
            self.sprint_path = self.root.join(sprint);
        }
        if let Some(kb) = file.max_sprint_kb {
            self.max_sprint_kb = kb;
        }
        if let Some(limits) = file.compaction {
            self.limits = limits.normalized();
        }
    }
}

/// Determines the project root: explicit option, then `SPRINT_PROJECT_ROOT`,
/// then the current directory
pub fn determine_project_root(root_option: Option<&Path>) -> Result<PathBuf> {
    if let Some(root) = root_option {
        return Ok(root.to_path_buf());
    }

    if let Ok(root) = env::var(PROJECT_ROOT_ENV) {
        if !root.is_empty() {
            return Ok(PathBuf::from(root));
        }
    }

    env::current_dir().map_err(|e| BacklogError::io(".", e))
}
