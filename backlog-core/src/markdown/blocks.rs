//! Splits a story document into one block per story header

use once_cell::sync::Lazy;
use regex::Regex;

use super::markers::{starts_with_any, END_SENTINELS, SECTION_HEADER};
use super::story::parse_story;
use crate::models::Story;

static STORY_HEADER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#{3,}\s+US-[0-9]{3}-[0-9]{2,3}").expect("valid story header pattern"));

/// How a line affects block boundaries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Boundary {
    /// Starts a new story block
    StoryHeader,
    /// Ends the current block without starting another
    SectionEnd,
    Content,
}

fn classify(line: &str) -> Boundary {
    let line = line.trim_start();
    if STORY_HEADER_RE.is_match(line) {
        Boundary::StoryHeader
    } else if is_section_header(line) || starts_with_any(line, END_SENTINELS) {
        Boundary::SectionEnd
    } else {
        Boundary::Content
    }
}

/// `## Heading` with an uppercase first letter, in any script
fn is_section_header(line: &str) -> bool {
    line.strip_prefix(SECTION_HEADER)
        .and_then(|rest| rest.chars().next())
        .is_some_and(char::is_uppercase)
}

/// Returns the text of every story block in document order.
///
/// A story header is a `###` or deeper heading carrying a `US-NNN-NN` id.
/// A block runs from its header line up to the next story header, the next
/// `## ` section heading, an end-of-document sentinel or the end of text.
/// Text outside any block is dropped.
pub fn split_blocks(text: &str) -> Vec<String> {
    let mut blocks = Vec::new();
    let mut current: Option<Vec<&str>> = None;

    for line in text.lines() {
        match classify(line) {
            Boundary::StoryHeader => {
                if let Some(lines) = current.replace(vec![line]) {
                    blocks.push(lines.join("\n"));
                }
            }
            Boundary::SectionEnd => {
                if let Some(lines) = current.take() {
                    blocks.push(lines.join("\n"));
                }
            }
            Boundary::Content => {
                if let Some(lines) = current.as_mut() {
                    lines.push(line);
                }
            }
        }
    }

    if let Some(lines) = current {
        blocks.push(lines.join("\n"));
    }
    blocks
}

/// Extracts every story in a document, skipping blocks whose header does not parse
pub fn parse_document(text: &str) -> Vec<Story> {
    let blocks = split_blocks(text);
    let total = blocks.len();
    let stories: Vec<Story> = blocks.iter().filter_map(|b| parse_story(b)).collect();

    if stories.len() < total {
        log::debug!("Skipped {} blocks without a valid story header", total - stories.len());
    }
    stories
}
