// Task operations on top of the project store

use crate::fields::ExtraFields;
use crate::store::{ProjectStore, TaskFile};
use crate::task::{Task, is_reserved, now_time_add};
use eyre::{Result, eyre};
use serde_json::Value;
use tracing::{debug, info, warn};

/// Outcome of `evaluate`
#[derive(Debug, Clone, PartialEq)]
pub enum EvalOutcome {
    Updated(Task),
    /// The project has no task file
    NoTasks,
    /// No task carries the requested id
    NotFound,
}

/// Outcome of `list`
#[derive(Debug, Clone, PartialEq)]
pub enum Listing {
    /// The project has no task file
    NoTasks,
    /// The task file exists but holds no tasks
    Empty,
    Tasks(Vec<Task>),
}

pub struct TaskRepository {
    store: ProjectStore,
}

impl TaskRepository {
    pub fn new(store: ProjectStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &ProjectStore {
        &self.store
    }

    /// Append a new task and return it
    pub fn add(&self, project: &str, description: &str, fields: ExtraFields) -> Result<Task> {
        self.add_at(project, description, fields, now_time_add())
    }

    /// `add` with an explicit `time_add` value
    pub fn add_at(&self, project: &str, description: &str, fields: ExtraFields, time_add: String) -> Result<Task> {
        let mut tasks = self.store.load_tasks(project)?.into_tasks();

        let next_id = next_task_id(project, &tasks)?;
        let mut task = Task::new(next_id, description, time_add);
        for (name, value) in fields {
            if is_reserved(&name) {
                warn!(project, field = %name, "Ignoring reserved field");
                continue;
            }
            task.fields.insert(name, Value::String(value));
        }

        tasks.push(task.clone());
        self.store.save_tasks(project, &tasks)?;

        info!(project, task_id = task.task_id, "Task added");
        Ok(task)
    }

    /// Merge `fields` into a task, suffixing every key with `_eval`
    pub fn evaluate(&self, project: &str, task_id: u64, fields: ExtraFields) -> Result<EvalOutcome> {
        let mut tasks = match self.store.load_tasks(project)? {
            TaskFile::Missing => return Ok(EvalOutcome::NoTasks),
            TaskFile::Loaded(tasks) => tasks,
        };

        let Some(task) = tasks.iter_mut().find(|task| task.task_id == task_id) else {
            debug!(project, task_id, "Task not found");
            return Ok(EvalOutcome::NotFound);
        };

        for (name, value) in fields.into_eval() {
            task.fields.insert(name, Value::String(value));
        }
        let updated = task.clone();

        self.store.save_tasks(project, &tasks)?;

        info!(project, task_id, "Task evaluated");
        Ok(EvalOutcome::Updated(updated))
    }

    /// All tasks in stored order
    pub fn list(&self, project: &str) -> Result<Listing> {
        Ok(match self.store.load_tasks(project)? {
            TaskFile::Missing => Listing::NoTasks,
            TaskFile::Loaded(tasks) if tasks.is_empty() => Listing::Empty,
            TaskFile::Loaded(tasks) => Listing::Tasks(tasks),
        })
    }

    /// Id of the most recently appended task
    pub fn latest_task_id(&self, project: &str) -> Result<Option<u64>> {
        let tasks = self.store.load_tasks(project)?.into_tasks();
        Ok(tasks.last().map(|task| task.task_id))
    }
}

fn next_task_id(project: &str, tasks: &[Task]) -> Result<u64> {
    match tasks.iter().map(|task| task.task_id).max() {
        None => Ok(1),
        Some(max) => max
            .checked_add(1)
            .ok_or_else(|| eyre!("No task ids left in project '{}': highest id is {}", project, max)),
    }
}
