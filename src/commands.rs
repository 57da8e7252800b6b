// Command handlers behind the `track` CLI

use crate::config::Config;
use crate::export::{self, ExportOutcome};
use crate::fields::ExtraFields;
use crate::repository::{EvalOutcome, Listing, TaskRepository};
use crate::store::ProjectStore;
use crate::table::task_table;
use colored::Colorize;
use eyre::{Result, eyre};
use std::io::Write;
use std::path::Path;
use tracing::warn;

/// Owns the loaded config and the task repository it points at.
///
/// Handlers write user-facing text to `out`. Conditions like a missing task
/// file or an unknown id are reported there and return `Ok`; only I/O and
/// parse failures come back as errors.
pub struct Tracker {
    config: Config,
    repo: TaskRepository,
}

impl Tracker {
    pub fn new(config: Config) -> Self {
        let repo = TaskRepository::new(ProjectStore::from_config(&config));
        Self { config, repo }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn repository(&self) -> &TaskRepository {
        &self.repo
    }

    pub fn resolve_project(&self, explicit: Option<String>) -> Result<String> {
        self.config.resolve_project(explicit)
    }

    pub fn init<W: Write>(&mut self, out: &mut W, project: &str) -> Result<()> {
        self.repo.store().ensure_project_dir(project)?;
        self.config.set_current_project(project)?;

        writeln!(out, "{}", format!("Project '{}' initialized.", project).green())?;
        Ok(())
    }

    pub fn add<W: Write>(&self, out: &mut W, project: &str, description: &str, fields: ExtraFields) -> Result<()> {
        let task = self.repo.add(project, description, fields)?;

        let json = serde_json::to_string(&task)?;
        writeln!(out, "{}", format!("Task added to project '{}': {}", project, json).green())?;
        Ok(())
    }

    /// Evaluate `task_id`, or the most recently added task if none is given
    pub fn eval<W: Write>(
        &self,
        out: &mut W,
        project: &str,
        task_id: Option<u64>,
        fields: ExtraFields,
    ) -> Result<()> {
        if fields.is_empty() {
            warn!(project, "No evaluation fields given");
        }

        let task_id = match task_id {
            Some(id) => id,
            None => match self.repo.latest_task_id(project)? {
                Some(id) => id,
                None => return no_tasks(out, project),
            },
        };

        match self.repo.evaluate(project, task_id, fields)? {
            EvalOutcome::Updated(task) => {
                let json = serde_json::to_string(&task)?;
                writeln!(out, "{}", format!("Updated task in project '{}': {}", project, json).green())?;
            }
            EvalOutcome::NoTasks => return no_tasks(out, project),
            EvalOutcome::NotFound => {
                let msg = format!("Task with ID {} not found in project '{}'.", task_id, project);
                writeln!(out, "{}", msg.yellow())?;
            }
        }
        Ok(())
    }

    pub fn list<W: Write>(&self, out: &mut W, project: &str) -> Result<()> {
        match self.repo.list(project)? {
            Listing::NoTasks => no_tasks(out, project),
            Listing::Empty => {
                writeln!(out, "{}", format!("No tasks available in project '{}'.", project).yellow())?;
                Ok(())
            }
            Listing::Tasks(tasks) => {
                writeln!(out, "{}", task_table(&tasks).render())?;
                Ok(())
            }
        }
    }

    /// Make `project` current without creating its storage
    pub fn switch<W: Write>(&mut self, out: &mut W, project: &str) -> Result<()> {
        self.repo.store().project_dir(project)?;
        self.config.set_current_project(project)?;

        writeln!(out, "{}", format!("Switched to project '{}'.", project).green())?;
        Ok(())
    }

    pub fn export<W: Write>(&self, out: &mut W, project: &str, format: &str, file: &Path) -> Result<()> {
        match export::export(self.repo.store(), project, format, file)? {
            ExportOutcome::Written { path, .. } => {
                writeln!(out, "{}", format!("Data exported to {}", path.display()).green())?;
            }
            ExportOutcome::NoTasks => return no_tasks(out, project),
            ExportOutcome::UnrecognizedFormat(name) => {
                writeln!(out, "{}", format!("File format {} not recognized.", name).yellow())?;
            }
        }
        Ok(())
    }

    pub fn plot<W: Write>(&self, out: &mut W) -> Result<()> {
        writeln!(out, "{}", "Not yet implemented :(".yellow())?;
        Ok(())
    }
}

fn no_tasks<W: Write>(out: &mut W, project: &str) -> Result<()> {
    writeln!(out, "{}", format!("No tasks found for project '{}'.", project).yellow())?;
    Ok(())
}

/// Remove `--project` from free-form fields
pub fn take_project(fields: &mut ExtraFields) -> Option<String> {
    fields.take("project")
}

/// Remove `--task_id` from free-form fields and parse it
pub fn take_task_id(fields: &mut ExtraFields) -> Result<Option<u64>> {
    fields
        .take("task_id")
        .map(|raw| {
            raw.trim()
                .parse::<u64>()
                .map_err(|_| eyre!("Invalid --task_id '{}': expected a positive integer", raw))
        })
        .transpose()
}
