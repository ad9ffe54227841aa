//! Builds the canonical backlog from the story documents

use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::{SprintConfig, STORY_FILE_EXTENSION, STORY_FILE_PREFIX};
use crate::error::{BacklogError, Result};
use crate::markdown::parse_document;
use crate::models::{Story, StoryStore};
use crate::storage::JsonStore;
use crate::sync::completed_ids;

/// One story document, already read into memory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDocument {
    /// File name, used for ordering and reporting
    pub name: String,
    pub text: String,
}

/// Number of stories extracted from one document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentCount {
    pub name: String,
    pub stories: usize,
}

/// Outcome of merging freshly extracted stories with the previous backlog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    pub stories: Vec<Story>,
    pub documents: Vec<DocumentCount>,
    /// Stories whose completion flag was carried over from the prior backlog
    pub preserved: usize,
}

/// Summary of a backlog build, for display
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BacklogReport {
    pub documents: Vec<DocumentCount>,
    pub total: usize,
    pub preserved: usize,
    pub path: PathBuf,
    pub size_kb: u64,
}

fn is_story_document(path: &Path) -> bool {
    let has_prefix = path
        .file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with(STORY_FILE_PREFIX));
    let has_extension = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e == STORY_FILE_EXTENSION);
    has_prefix && has_extension && path.is_file()
}

/// Lists the `US-*.md` files in `dir`, sorted by file name
pub fn discover_documents(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(BacklogError::StoriesDirNotFound(dir.to_path_buf()));
    }

    let entries = fs::read_dir(dir).map_err(|e| BacklogError::io(dir, e))?;
    let mut paths = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| BacklogError::io(dir, e))?.path();
        if is_story_document(&path) {
            paths.push(path);
        }
    }

    if paths.is_empty() {
        return Err(BacklogError::NoStoryDocuments(dir.to_path_buf()));
    }

    paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(paths)
}

/// Reads each document into memory, keeping the given order
pub fn read_documents(paths: &[PathBuf]) -> Result<Vec<SourceDocument>> {
    paths
        .iter()
        .map(|path| -> Result<SourceDocument> {
            let text = fs::read_to_string(path).map_err(|e| BacklogError::io(path, e))?;
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());
            Ok(SourceDocument { name, text })
        })
        .collect()
}

/// Extracts every document and carries completion over from `prior`.
///
/// `prior` is the previous backlog as raw JSON; anything that does not look
/// like a backlog simply contributes no completed ids.
pub fn materialize(documents: &[SourceDocument], prior: Option<&Value>) -> Extraction {
    let mut stories = Vec::new();
    let mut counts = Vec::with_capacity(documents.len());

    for document in documents {
        let extracted = parse_document(&document.text);
        log::info!("{}: {} stories", document.name, extracted.len());
        counts.push(DocumentCount {
            name: document.name.clone(),
            stories: extracted.len(),
        });
        stories.extend(extracted);
    }

    let mut preserved = 0;
    if let Some(prior) = prior {
        let done = completed_ids(prior);
        for story in stories.iter_mut().filter(|s| done.contains(&s.id)) {
            story.passes = true;
            preserved += 1;
        }
    }

    Extraction {
        stories,
        documents: counts,
        preserved,
    }
}

/// Regenerates the backlog file from the configured stories directory
pub fn build_backlog(config: &SprintConfig) -> Result<BacklogReport> {
    let paths = discover_documents(&config.stories_dir)?;
    let documents = read_documents(&paths)?;

    let backlog_file = JsonStore::new(&config.backlog_path);
    let prior = backlog_file.read_value();
    let extraction = materialize(&documents, prior.as_ref());

    let total = extraction.stories.len();
    let backlog = StoryStore::backlog(&config.project, &config.branch_name, extraction.stories);
    let bytes = backlog_file.save(&backlog)?;

    Ok(BacklogReport {
        documents: extraction.documents,
        total,
        preserved: extraction.preserved,
        path: config.backlog_path.clone(),
        size_kb: bytes / 1024,
    })
}
