pub mod backlog;
pub mod config;
pub mod error;
pub mod markdown;
pub mod models;
pub mod sprint;
pub mod status;
pub mod storage;
pub mod sync;

// Re-export commonly used types
pub use backlog::{
    build_backlog, discover_documents, materialize, read_documents, BacklogReport, DocumentCount,
    Extraction, SourceDocument,
};
pub use config::{determine_project_root, CompactionLimits, ConfigFile, SprintConfig};
pub use error::{BacklogError, Result};
pub use markdown::{parse_document, parse_story};
pub use models::{module_key, Story, StoryStore};
pub use sprint::{
    build_sprint, compact_story, module_progress, select_modules, truncate_text, write_sprint,
    ModuleProgress, SprintReport,
};
pub use status::{progress_bar, progress_label, status_report, CurrentSprint, StatusReport};
pub use storage::JsonStore;
pub use sync::{completed_ids, synchronize, SyncOutcome};
