// Per-project directories and their task files

use crate::config::{Config, write_json};
use crate::task::Task;
use eyre::{Context, Result, eyre};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Task list filename inside each project directory
pub const TASKS_FILE: &str = "tasks.json";

const MAX_PROJECT_NAME_LEN: usize = 255;

/// Result of reading a project's task file
#[derive(Debug, Clone, PartialEq)]
pub enum TaskFile {
    /// No task file has been written yet
    Missing,
    Loaded(Vec<Task>),
}

impl TaskFile {
    /// Tasks, treating a missing file as empty
    pub fn into_tasks(self) -> Vec<Task> {
        match self {
            TaskFile::Missing => Vec::new(),
            TaskFile::Loaded(tasks) => tasks,
        }
    }
}

/// Filesystem layout for all projects under one storage root.
///
/// Every read or write touches the whole task file. There is no locking;
/// concurrent writers race and the last one wins.
#[derive(Debug, Clone)]
pub struct ProjectStore {
    base_path: PathBuf,
}

impl ProjectStore {
    pub fn new<P: AsRef<Path>>(base_path: P) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.storage_dir())
    }

    pub fn project_dir(&self, project: &str) -> Result<PathBuf> {
        Self::validate_project_name(project)?;
        Ok(self.base_path.join(project))
    }

    /// Create the project directory if needed
    pub fn ensure_project_dir(&self, project: &str) -> Result<PathBuf> {
        let dir = self.project_dir(project)?;
        fs::create_dir_all(&dir).with_context(|| format!("Failed to create project directory: {}", dir.display()))?;
        Ok(dir)
    }

    pub fn task_file_path(&self, project: &str) -> Result<PathBuf> {
        Ok(self.project_dir(project)?.join(TASKS_FILE))
    }

    pub fn load_tasks(&self, project: &str) -> Result<TaskFile> {
        let path = self.task_file_path(project)?;

        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(project, path = ?path, "No task file");
                return Ok(TaskFile::Missing);
            }
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read task file: {}", path.display()));
            }
        };

        if contents.trim().is_empty() {
            return Ok(TaskFile::Loaded(Vec::new()));
        }

        let tasks: Vec<Task> = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse task file: {}", path.display()))?;

        debug!(project, count = tasks.len(), "Loaded tasks");
        Ok(TaskFile::Loaded(tasks))
    }

    /// Rewrite the whole task file
    pub fn save_tasks(&self, project: &str, tasks: &[Task]) -> Result<()> {
        let dir = self.ensure_project_dir(project)?;
        let path = dir.join(TASKS_FILE);
        write_json(&path, tasks)?;

        debug!(project, count = tasks.len(), "Saved tasks");
        Ok(())
    }

    fn validate_project_name(name: &str) -> Result<()> {
        if name.trim().is_empty() {
            return Err(eyre!("Project name cannot be empty"));
        }
        if name.len() > MAX_PROJECT_NAME_LEN {
            return Err(eyre!(
                "Project name too long: {} bytes (max {})",
                name.len(),
                MAX_PROJECT_NAME_LEN
            ));
        }
        if name == "." || name == ".." {
            return Err(eyre!("Invalid project name: {}", name));
        }
        if name.chars().any(|c| c == '/' || c == '\\' || c == '\0') {
            return Err(eyre!("Invalid project name: {} (must not contain path separators)", name));
        }
        Ok(())
    }
}
