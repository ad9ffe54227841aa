//! Carries completion flags from the sprint file back into the backlog

use serde_json::Value;
use std::collections::HashSet;

use crate::error::Result;
use crate::models::StoryStore;
use crate::storage::JsonStore;

/// Ids of stories marked `"passes": true` in a raw store document.
///
/// Entries that are not objects or lack a string id are ignored, as is a
/// document without a `userStories` array.
pub fn completed_ids(store: &Value) -> HashSet<String> {
    store
        .get("userStories")
        .and_then(Value::as_array)
        .map(|stories| {
            stories
                .iter()
                .filter(|s| s.get("passes").and_then(Value::as_bool) == Some(true))
                .filter_map(|s| s.get("id").and_then(Value::as_str))
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Marks backlog stories complete when the sprint file says they pass.
/// Returns the number of stories that changed.
pub fn sync_from_sprint(backlog: &mut StoryStore, sprint_file: &JsonStore) -> usize {
    let Some(sprint) = sprint_file.read_value() else {
        return 0;
    };
    backlog.mark_completed(&completed_ids(&sprint))
}

/// Result of a synchronization run
#[derive(Debug, Clone)]
pub struct SyncOutcome {
    /// The backlog after synchronization
    pub backlog: StoryStore,
    /// Stories newly marked complete
    pub synced: usize,
}

/// Loads the backlog, applies completion from the sprint file and saves the
/// backlog if anything changed
pub fn synchronize(backlog_file: &JsonStore, sprint_file: &JsonStore) -> Result<SyncOutcome> {
    let mut backlog = backlog_file.load()?;
    let synced = sync_from_sprint(&mut backlog, sprint_file);

    if synced > 0 {
        backlog_file.save(&backlog)?;
        log::info!("Synced {} newly completed stories to backlog", synced);
    }

    Ok(SyncOutcome { backlog, synced })
}
