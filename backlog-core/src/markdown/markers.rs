//! Section markers recognised in story documents.
//!
//! Documents are written in German or English; every marker lists both
//! spellings. Markers are matched against trimmed lines.

/// Lines starting with one of these open the description
pub const ROLE_MARKERS: &[&str] = &["**Als**", "**Als ", "**As a"];

/// Lowercase phrases that introduce the benefit clause ending a description
pub const BENEFIT_MARKERS: &[&str] = &["damit", "so that"];

/// Acceptance-criteria section heading
pub const CRITERIA_MARKERS: &[&str] = &["**Akzeptanzkriterien", "**Acceptance"];

/// Lines starting with one of these close the acceptance-criteria section
pub const CRITERIA_END_MARKERS: &[&str] = &[
    "**Priorit",
    "**Technische",
    "**Technical",
    "**Abhängig",
    "**Depend",
    BLOCK_SEPARATOR,
];

/// Technical-notes and dependencies headings; both feed the notes field
pub const NOTES_MARKERS: &[&str] = &[
    "**Technische Hinweise",
    "**Technical",
    "**Abhängigkeiten",
    "**Depend",
];

/// Substring identifying the priority line (`Priorität`, `Priority`)
pub const PRIORITY_KEYWORD: &str = "Priorit";

pub const BLOCK_SEPARATOR: &str = "---";
pub const STORY_HEADER: &str = "###";
pub const EMPHASIS: &str = "**";
pub const BULLET: &str = "- ";

/// Secondary-level heading prefix that ends the current story block
pub const SECTION_HEADER: &str = "## ";

/// End-of-document sentinels (`*Ende der User Stories*`, `*End of stories*`)
pub const END_SENTINELS: &[&str] = &["*Ende", "*End of"];

pub fn starts_with_any(line: &str, markers: &[&str]) -> bool {
    markers.iter().any(|m| line.starts_with(m))
}

pub fn contains_any(line: &str, markers: &[&str]) -> bool {
    markers.iter().any(|m| line.contains(m))
}

/// Removes all emphasis markers and surrounding whitespace
pub fn strip_emphasis(text: &str) -> String {
    text.replace(EMPHASIS, "").trim().to_string()
}
