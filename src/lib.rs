// track - personal productivity tracker backed by per-project JSON files

pub mod commands;
pub mod config;
pub mod export;
pub mod fields;
pub mod repository;
pub mod store;
pub mod table;
pub mod task;

// Re-export main types for convenience
pub use commands::Tracker;
pub use config::Config;
pub use export::{ExportFormat, ExportOutcome};
pub use fields::ExtraFields;
pub use repository::{EvalOutcome, Listing, TaskRepository};
pub use store::{ProjectStore, TaskFile};
pub use task::Task;
