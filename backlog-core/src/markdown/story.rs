//! Field extraction for a single story block.
//!
//! Each field is recovered by its own scan over the block's lines. The
//! description, acceptance-criteria and notes scans are small state machines:
//! every line is classified first, then `(state, line kind)` selects the
//! action and the next state.

use once_cell::sync::Lazy;
use regex::Regex;

use super::markers::{
    contains_any, starts_with_any, strip_emphasis, BENEFIT_MARKERS, BLOCK_SEPARATOR, BULLET,
    CRITERIA_END_MARKERS, CRITERIA_MARKERS, EMPHASIS, NOTES_MARKERS, PRIORITY_KEYWORD,
    ROLE_MARKERS, STORY_HEADER,
};
use crate::config::{DEFAULT_PRIORITY, NOTES_SEPARATOR, PLACEHOLDER_CRITERION};
use crate::models::Story;

static HEADER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(US-[0-9]{3}-[0-9]{2,3})\s*[:.]?\s*(.*)$").expect("valid header pattern")
});
static PRIORITY_CODE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"P([0-9])").expect("valid priority code pattern"));
static PRIORITY_DIGIT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"Priorit(?:ät|at|y)[:\s*]*([0-9])").expect("valid priority digit pattern")
});
static NUMBERED_ITEM_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]+\.\s+").expect("valid numbered item pattern"));
static CHECKBOX_ITEM_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^-\s*\[[ x]\]\s*").expect("valid checkbox pattern"));

/// Parses one story block into a [`Story`].
///
/// Returns `None` when the first line is not a story header; such blocks are
/// skipped rather than treated as errors.
pub fn parse_story(block: &str) -> Option<Story> {
    let lines: Vec<&str> = block.trim().lines().map(str::trim).collect();
    let (id, title) = parse_header(lines.first()?)?;

    let mut story = Story::new(id, title);
    story.priority = extract_priority(&lines);
    story.description = DescriptionScan::run(&lines);
    story.acceptance_criteria = CriteriaScan::run(&lines);
    story.notes = NotesScan::run(&lines);
    Some(story)
}

/// Splits a header line such as `### US-012-03: Title` into id and title
pub fn parse_header(line: &str) -> Option<(String, String)> {
    let header = line.trim().trim_start_matches('#').trim();
    let caps = HEADER_RE.captures(header)?;
    let id = caps.get(1)?.as_str().to_string();
    let title = caps.get(2).map_or("", |m| m.as_str()).trim().to_string();
    Some((id, title))
}

/// Priority from the first line mentioning the priority keyword.
///
/// `P1`..`P4` is tried before a bare digit after the keyword; anything
/// outside 1..=4 counts as unparseable.
pub fn extract_priority(lines: &[&str]) -> u8 {
    let Some(line) = lines.iter().find(|l| l.contains(PRIORITY_KEYWORD)) else {
        return DEFAULT_PRIORITY;
    };

    [&*PRIORITY_CODE_RE, &*PRIORITY_DIGIT_RE]
        .iter()
        .filter_map(|re| re.captures(line))
        .filter_map(|caps| caps.get(1)?.as_str().parse::<u8>().ok())
        .find(|p| (1..=4).contains(p))
        .unwrap_or(DEFAULT_PRIORITY)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DescriptionState {
    SeekingRole,
    InDescription,
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DescriptionLine {
    RoleMarker,
    CriteriaMarker,
    Other,
}

impl DescriptionLine {
    fn classify(line: &str) -> Self {
        if starts_with_any(line, ROLE_MARKERS) {
            DescriptionLine::RoleMarker
        } else if starts_with_any(line, CRITERIA_MARKERS) {
            DescriptionLine::CriteriaMarker
        } else {
            DescriptionLine::Other
        }
    }
}

/// Collects the "As a ... I want ... so that ..." narrative
struct DescriptionScan {
    state: DescriptionState,
    parts: Vec<String>,
}

impl DescriptionScan {
    fn run(lines: &[&str]) -> String {
        let mut scan = Self {
            state: DescriptionState::SeekingRole,
            parts: Vec::new(),
        };
        for line in lines {
            scan.step(line);
            if scan.state == DescriptionState::Done {
                break;
            }
        }
        scan.parts.join(" ")
    }

    fn step(&mut self, line: &str) {
        use DescriptionLine::*;
        use DescriptionState::*;

        self.state = match (self.state, DescriptionLine::classify(line)) {
            (SeekingRole, RoleMarker) => self.accept(line),
            (SeekingRole, _) => SeekingRole,
            (InDescription, CriteriaMarker) => Done,
            (InDescription, RoleMarker | Other) => self.accept(line),
            (Done, _) => Done,
        };
    }

    /// Appends the line and decides whether the benefit clause closed it
    fn accept(&mut self, line: &str) -> DescriptionState {
        let clean = strip_emphasis(line);
        if !clean.is_empty() {
            self.parts.push(clean);
        }

        let lower = line.to_lowercase();
        if contains_any(&lower, BENEFIT_MARKERS) && line.ends_with('.') {
            DescriptionState::Done
        } else {
            DescriptionState::InDescription
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CriteriaState {
    BeforeSection,
    InSection,
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CriteriaLine<'a> {
    SectionMarker,
    SectionEnd,
    /// Numbered or checkbox item, with its list prefix removed
    NewItem(&'a str),
    /// Plain dash bullet continuing the current item
    Bullet(&'a str),
    Text(&'a str),
    Blank,
}

impl<'a> CriteriaLine<'a> {
    fn classify(line: &'a str) -> Self {
        if contains_any(line, CRITERIA_MARKERS) {
            return CriteriaLine::SectionMarker;
        }
        if starts_with_any(line, CRITERIA_END_MARKERS) {
            return CriteriaLine::SectionEnd;
        }
        if let Some(m) = NUMBERED_ITEM_RE
            .find(line)
            .or_else(|| CHECKBOX_ITEM_RE.find(line))
        {
            return CriteriaLine::NewItem(&line[m.end()..]);
        }
        if let Some(rest) = line.strip_prefix(BULLET) {
            if !rest.starts_with('[') {
                return CriteriaLine::Bullet(rest);
            }
        }
        if strip_emphasis(line).is_empty() {
            CriteriaLine::Blank
        } else {
            CriteriaLine::Text(line)
        }
    }
}

/// Collects the acceptance-criteria list
struct CriteriaScan {
    state: CriteriaState,
    current: String,
    items: Vec<String>,
}

impl CriteriaScan {
    fn run(lines: &[&str]) -> Vec<String> {
        let mut scan = Self {
            state: CriteriaState::BeforeSection,
            current: String::new(),
            items: Vec::new(),
        };
        for line in lines {
            scan.step(line);
            if scan.state == CriteriaState::Done {
                break;
            }
        }
        scan.flush();

        let criteria: Vec<String> = scan
            .items
            .iter()
            .map(|c| strip_emphasis(c))
            .filter(|c| !c.is_empty())
            .collect();

        if criteria.is_empty() {
            vec![PLACEHOLDER_CRITERION.to_string()]
        } else {
            criteria
        }
    }

    fn step(&mut self, line: &str) {
        use CriteriaLine::*;
        use CriteriaState::*;

        self.state = match (self.state, CriteriaLine::classify(line)) {
            (BeforeSection, SectionMarker) => InSection,
            (BeforeSection, _) => BeforeSection,
            (InSection, SectionEnd) => {
                self.flush();
                Done
            }
            (InSection, NewItem(text)) => {
                self.flush();
                self.current.push_str(text);
                InSection
            }
            (InSection, Bullet(text)) => {
                self.continue_with(text);
                InSection
            }
            (InSection, Text(text)) => {
                if !self.current.is_empty() {
                    self.continue_with(text);
                }
                InSection
            }
            (InSection, SectionMarker | Blank) => InSection,
            (Done, _) => Done,
        };
    }

    fn continue_with(&mut self, text: &str) {
        self.current.push(' ');
        self.current.push_str(text);
    }

    fn flush(&mut self) {
        let item = std::mem::take(&mut self.current);
        let item = item.trim();
        if !item.is_empty() {
            self.items.push(item.to_string());
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NotesState {
    Idle,
    Collecting,
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NotesLine<'a> {
    SectionMarker,
    BlockEnd,
    Bullet(&'a str),
    Markup,
    Text(&'a str),
    Blank,
}

impl<'a> NotesLine<'a> {
    fn classify(line: &'a str) -> Self {
        if contains_any(line, NOTES_MARKERS) {
            NotesLine::SectionMarker
        } else if line.starts_with(BLOCK_SEPARATOR) || line.starts_with(STORY_HEADER) {
            NotesLine::BlockEnd
        } else if let Some(rest) = line.strip_prefix(BULLET) {
            NotesLine::Bullet(rest.trim())
        } else if line.is_empty() {
            NotesLine::Blank
        } else if line.starts_with(EMPHASIS) {
            NotesLine::Markup
        } else {
            NotesLine::Text(line)
        }
    }
}

/// Collects technical notes and dependencies into one string
struct NotesScan {
    state: NotesState,
    parts: Vec<String>,
}

impl NotesScan {
    fn run(lines: &[&str]) -> String {
        let mut scan = Self {
            state: NotesState::Idle,
            parts: Vec::new(),
        };
        for line in lines {
            scan.step(line);
            if scan.state == NotesState::Done {
                break;
            }
        }
        scan.parts.join(NOTES_SEPARATOR)
    }

    fn step(&mut self, line: &str) {
        use NotesLine::*;
        use NotesState::*;

        self.state = match (self.state, NotesLine::classify(line)) {
            (Idle | Collecting, SectionMarker) => Collecting,
            (Idle, _) => Idle,
            (Collecting, BlockEnd) => Done,
            (Collecting, Bullet(text) | Text(text)) => {
                if !text.is_empty() {
                    self.parts.push(text.to_string());
                }
                Collecting
            }
            (Collecting, Markup | Blank) => Collecting,
            (Done, _) => Done,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GERMAN_STORY: &str = "\
### US-012-03 Title
**Priorität:** P1
**Als** Administrator **möchte ich** Benutzer anlegen,
**damit** neue Mitarbeiter arbeiten können.
**Akzeptanzkriterien:**
1. Formular mit **Pflichtfeldern**
2. Validierung der E-Mail
   - inklusive Domain-Prüfung
3. Speichern erzeugt Eintrag
**Technische Hinweise:**
- REST-Endpunkt /users
- Passwort-Hash mit Argon2
**Abhängigkeiten:**
- US-012-01
---
";

    const ENGLISH_STORY: &str = "\
### US-002-10: Export report
**Priority:** 3
**As a** manager **I want** to export reports **so that** I can share them.
**Acceptance Criteria:**
- [ ] Export as CSV
- [x] Export as PDF
**Technical Notes:**
Uses the reporting service
**Dependencies:**
- US-002-01
";

    #[test]
    fn test_header_and_priority_code() {
        let story = parse_story(GERMAN_STORY).unwrap();
        assert_eq!(story.id, "US-012-03");
        assert_eq!(story.title, "Title");
        assert_eq!(story.priority, 1);
        assert!(!story.passes);
    }

    #[test]
    fn test_german_description_stops_at_benefit() {
        let story = parse_story(GERMAN_STORY).unwrap();
        assert_eq!(
            story.description,
            "Als Administrator möchte ich Benutzer anlegen, damit neue Mitarbeiter arbeiten können."
        );
    }

    #[test]
    fn test_numbered_criteria_with_continuation() {
        let story = parse_story(GERMAN_STORY).unwrap();
        assert_eq!(
            story.acceptance_criteria,
            vec![
                "Formular mit Pflichtfeldern",
                "Validierung der E-Mail inklusive Domain-Prüfung",
                "Speichern erzeugt Eintrag",
            ]
        );
    }

    #[test]
    fn test_notes_join_both_sections() {
        let story = parse_story(GERMAN_STORY).unwrap();
        assert_eq!(
            story.notes,
            "REST-Endpunkt /users | Passwort-Hash mit Argon2 | US-012-01"
        );
    }

    #[test]
    fn test_english_story() {
        let story = parse_story(ENGLISH_STORY).unwrap();
        assert_eq!(story.id, "US-002-10");
        assert_eq!(story.title, "Export report");
        assert_eq!(story.priority, 3);
        assert_eq!(
            story.description,
            "As a manager I want to export reports so that I can share them."
        );
        assert_eq!(
            story.acceptance_criteria,
            vec!["Export as CSV", "Export as PDF"]
        );
        assert_eq!(story.notes, "Uses the reporting service | US-002-01");
    }

    #[test]
    fn test_missing_criteria_uses_placeholder() {
        let story = parse_story("### US-001-01 Bare story\nSome text.\n").unwrap();
        assert_eq!(
            story.acceptance_criteria,
            vec!["Story must be implemented and tested"]
        );
        assert_eq!(story.description, "");
        assert_eq!(story.notes, "");
        assert_eq!(story.priority, 2);
    }

    #[test]
    fn test_non_story_header_is_skipped() {
        assert!(parse_story("### Overview\nText").is_none());
        assert!(parse_story("### US-01-01 Too short module").is_none());
        assert!(parse_story("").is_none());
    }

    #[test]
    fn test_header_variants() {
        assert_eq!(
            parse_header("### US-001-01. Dotted"),
            Some(("US-001-01".to_string(), "Dotted".to_string()))
        );
        assert_eq!(
            parse_header("##US-001-123"),
            Some(("US-001-123".to_string(), String::new()))
        );
    }

    #[test]
    fn test_priority_fallbacks() {
        assert_eq!(extract_priority(&["**Priorität:** 4"]), 4);
        assert_eq!(extract_priority(&["**Priority:** P3"]), 3);
        assert_eq!(extract_priority(&["**Priorität:** hoch"]), 2);
        assert_eq!(extract_priority(&["**Priorität:** P9"]), 2);
        assert_eq!(extract_priority(&["no keyword P1"]), 2);
        // Only the first keyword line counts
        assert_eq!(extract_priority(&["**Priorität:** -", "**Priority:** 1"]), 2);
    }

    #[test]
    fn test_description_stops_at_criteria_marker() {
        let block = "\
### US-001-01 Story
**Als** Nutzer **möchte ich** etwas
ohne Nutzen-Satz
**Akzeptanzkriterien:**
1. Eins
";
        let story = parse_story(block).unwrap();
        assert_eq!(story.description, "Als Nutzer möchte ich etwas ohne Nutzen-Satz");
        assert_eq!(story.acceptance_criteria, vec!["Eins"]);
    }

    #[test]
    fn test_numbered_and_checkbox_lists_are_equivalent() {
        let numbered = "\
### US-001-01 Story
**Acceptance Criteria:**
1. First
2. Second
   continued
3. Third
";
        let checkbox = "\
### US-001-01 Story
**Acceptance Criteria:**
- [ ] First
- [ ] Second
  continued
- [x] Third
";
        let a = parse_story(numbered).unwrap();
        let b = parse_story(checkbox).unwrap();
        assert_eq!(a.acceptance_criteria.len(), 3);
        assert_eq!(a.acceptance_criteria, b.acceptance_criteria);
        assert_eq!(a.acceptance_criteria[1], "Second continued");
    }

    #[test]
    fn test_criteria_end_at_separator() {
        let block = "\
### US-001-01 Story
**Akzeptanzkriterien:**
1. Only one
---
2. Not a criterion
";
        let story = parse_story(block).unwrap();
        assert_eq!(story.acceptance_criteria, vec!["Only one"]);
    }

    #[test]
    fn test_notes_skip_markup_lines_and_stop_at_separator() {
        let block = "\
### US-001-01 Story
**Technical Notes:**
- first
**Hinweis**
plain line
---
- after separator
";
        let story = parse_story(block).unwrap();
        assert_eq!(story.notes, "first | plain line");
    }
}
