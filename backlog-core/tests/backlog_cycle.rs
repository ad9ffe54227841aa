use std::fs;
use std::path::Path;

use backlog_core::{
    build_backlog, select_modules, status_report, synchronize, write_sprint, JsonStore,
    SprintConfig,
};
use tempfile::TempDir;

const MODULE_ONE: &str = "\
# Modul 1: Konten

### US-001-01 Registrieren
**Priorität:** P2
**Als** Gast **möchte ich** ein Konto anlegen, **damit** ich einkaufen kann.
**Akzeptanzkriterien:**
1. Formular vorhanden
2. Bestätigungsmail wird versendet
**Technische Hinweise:**
- Mailversand über Queue
---

### US-001-02 Anmelden
**Priorität:** P1
**Akzeptanzkriterien:**
- [ ] Login mit E-Mail
- [ ] Fehlermeldung bei falschem Passwort

*Ende Modul 1*
";

const MODULE_TWO: &str = "\
### US-002-01 Warenkorb
**Priority:** 3
**As a** customer **I want** a cart **so that** I can buy several items.
**Acceptance Criteria:**
1. Add item
2. Remove item

### US-002-02 Checkout
**Priority:** P1
";

fn write_stories(config: &SprintConfig) {
    fs::create_dir_all(&config.stories_dir).unwrap();
    fs::write(config.stories_dir.join("US-002-shop.md"), MODULE_TWO).unwrap();
    fs::write(config.stories_dir.join("US-001-accounts.md"), MODULE_ONE).unwrap();
}

fn mark_sprint_story_done(path: &Path, id: &str) {
    let sprint_file = JsonStore::new(path);
    let mut sprint = sprint_file.load().unwrap();
    for story in sprint.user_stories.iter_mut().filter(|s| s.id == id) {
        story.passes = true;
    }
    sprint_file.save(&sprint).unwrap();
}

#[test]
fn test_full_cycle_keeps_completion_monotonic() {
    let temp_dir = TempDir::new().unwrap();
    let config = SprintConfig::new(temp_dir.path());
    write_stories(&config);

    // Extraction: documents in file-name order
    let report = build_backlog(&config).unwrap();
    let names: Vec<_> = report.documents.iter().map(|d| d.name.as_str()).collect();
    assert_eq!(names, vec!["US-001-accounts.md", "US-002-shop.md"]);
    assert_eq!(report.total, 4);

    let backlog_file = JsonStore::new(&config.backlog_path);
    let sprint_file = JsonStore::new(&config.sprint_path);
    let backlog = backlog_file.load().unwrap();
    let ids: Vec<_> = backlog.user_stories.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids, vec!["US-001-01", "US-001-02", "US-002-01", "US-002-02"]);
    assert_eq!(backlog.user_stories[0].notes, "Mailversand über Queue");
    assert_eq!(backlog.user_stories[1].acceptance_criteria.len(), 2);

    // First sprint picks module US-001, most urgent first
    let none: [&str; 0] = [];
    let modules = select_modules(&backlog, &none);
    assert_eq!(modules, vec!["US-001"]);
    let sprint_report = write_sprint(&config, &backlog, &modules).unwrap();
    assert_eq!(sprint_report.total, 2);
    assert_eq!(sprint_report.highest_priority, Some(1));
    let sprint = sprint_file.load().unwrap();
    assert_eq!(sprint.user_stories[0].id, "US-001-02");

    // The agent completes a story; sync carries it back exactly once
    mark_sprint_story_done(&config.sprint_path, "US-001-02");
    let outcome = synchronize(&backlog_file, &sprint_file).unwrap();
    assert_eq!(outcome.synced, 1);
    assert_eq!(synchronize(&backlog_file, &sprint_file).unwrap().synced, 0);

    // Re-extraction keeps the completed flag
    let report = build_backlog(&config).unwrap();
    assert_eq!(report.preserved, 1);
    let backlog = backlog_file.load().unwrap();
    let done: Vec<_> = backlog
        .user_stories
        .iter()
        .filter(|s| s.passes)
        .map(|s| s.id.as_str())
        .collect();
    assert_eq!(done, vec!["US-001-02"]);

    let status = status_report(&backlog, &sprint_file);
    assert_eq!(status.done, 1);
    assert_eq!(status.total, 4);
    assert_eq!(status.current_sprint.unwrap().remaining, 1);
}

#[test]
fn test_auto_selection_moves_on_after_module_completes() {
    let temp_dir = TempDir::new().unwrap();
    let config = SprintConfig::new(temp_dir.path());
    write_stories(&config);
    build_backlog(&config).unwrap();

    let backlog_file = JsonStore::new(&config.backlog_path);
    let sprint_file = JsonStore::new(&config.sprint_path);
    let backlog = backlog_file.load().unwrap();
    write_sprint(&config, &backlog, &["US-001".to_string()]).unwrap();

    mark_sprint_story_done(&config.sprint_path, "US-001-01");
    mark_sprint_story_done(&config.sprint_path, "US-001-02");
    let backlog = synchronize(&backlog_file, &sprint_file).unwrap().backlog;

    let none: [&str; 0] = [];
    assert_eq!(select_modules(&backlog, &none), vec!["US-002"]);
}

#[test]
fn test_duplicate_ids_across_documents_coexist() {
    let temp_dir = TempDir::new().unwrap();
    let config = SprintConfig::new(temp_dir.path());
    fs::create_dir_all(&config.stories_dir).unwrap();
    fs::write(config.stories_dir.join("US-a.md"), "### US-001-01 First copy\n").unwrap();
    fs::write(config.stories_dir.join("US-b.md"), "### US-001-01 Second copy\n").unwrap();

    let report = build_backlog(&config).unwrap();
    assert_eq!(report.total, 2);

    let backlog = JsonStore::new(&config.backlog_path).load().unwrap();
    let titles: Vec<_> = backlog.user_stories.iter().map(|s| s.title.as_str()).collect();
    assert_eq!(titles, vec!["First copy", "Second copy"]);
}
