// Export a project's tasks as CSV, JSON or Arrow IPC (Feather v2)

use crate::store::{ProjectStore, TaskFile};
use crate::task::Task;
use arrow_array::{Array, ArrayRef, BooleanArray, Float64Array, Int64Array, RecordBatch, StringArray};
use arrow_ipc::writer::FileWriter;
use arrow_schema::{DataType, Field, Schema};
use eyre::{Context, Result};
use serde_json::{Map, Value};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
    /// Arrow IPC file format
    Feather,
}

impl ExportFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
            ExportFormat::Feather => "feather",
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A format name that is not csv, json or feather
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownFormat(pub String);

impl std::fmt::Display for UnknownFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "File format {} not recognized.", self.0)
    }
}

impl std::error::Error for UnknownFormat {}

impl FromStr for ExportFormat {
    type Err = UnknownFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            "feather" => Ok(ExportFormat::Feather),
            _ => Err(UnknownFormat(s.to_string())),
        }
    }
}

/// Outcome of `export`
#[derive(Debug, Clone, PartialEq)]
pub enum ExportOutcome {
    Written { path: PathBuf, rows: usize },
    /// The project has no task file
    NoTasks,
    UnrecognizedFormat(String),
}

/// Tasks viewed as a table: the union of all keys, in first-seen order
#[derive(Debug, Clone)]
pub struct TaskTable {
    columns: Vec<String>,
    rows: Vec<Map<String, Value>>,
}

impl TaskTable {
    pub fn from_tasks(tasks: &[Task]) -> Self {
        let rows: Vec<Map<String, Value>> = tasks.iter().map(Task::to_record).collect();

        let mut columns: Vec<String> = Vec::new();
        for row in &rows {
            for key in row.keys() {
                if !columns.contains(key) {
                    columns.push(key.clone());
                }
            }
        }

        Self { columns, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Map<String, Value>] {
        &self.rows
    }

    /// Cells of one column, `None` where a task lacks the key
    pub fn column(&self, name: &str) -> Vec<Option<&Value>> {
        self.rows.iter().map(|row| row.get(name)).collect()
    }
}

/// Write a project's tasks to `dest` in the named format
pub fn export(store: &ProjectStore, project: &str, format: &str, dest: &Path) -> Result<ExportOutcome> {
    let format = match format.parse::<ExportFormat>() {
        Ok(format) => format,
        Err(UnknownFormat(name)) => return Ok(ExportOutcome::UnrecognizedFormat(name)),
    };

    let tasks = match store.load_tasks(project)? {
        TaskFile::Missing => return Ok(ExportOutcome::NoTasks),
        TaskFile::Loaded(tasks) => tasks,
    };

    let table = TaskTable::from_tasks(&tasks);
    debug!(
        project,
        %format,
        columns = table.columns().len(),
        rows = table.rows().len(),
        "Exporting tasks"
    );

    match format {
        ExportFormat::Csv => write_csv(&table, dest)?,
        ExportFormat::Json => write_json(&table, dest)?,
        ExportFormat::Feather => write_feather(&table, dest)?,
    }

    info!(project, %format, path = ?dest, "Export complete");
    Ok(ExportOutcome::Written {
        path: dest.to_path_buf(),
        rows: tasks.len(),
    })
}

/// Text form of a cell: raw strings, JSON text for everything else
fn cell_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

pub fn write_csv(table: &TaskTable, dest: &Path) -> Result<()> {
    let mut writer =
        csv::Writer::from_path(dest).with_context(|| format!("Failed to create CSV file: {}", dest.display()))?;

    if !table.columns().is_empty() {
        writer.write_record(table.columns())?;
    }
    for row in table.rows() {
        writer.write_record(table.columns().iter().map(|column| cell_text(row.get(column))))?;
    }

    writer
        .flush()
        .with_context(|| format!("Failed to write CSV file: {}", dest.display()))?;
    Ok(())
}

/// Records with absent cells omitted, so the output reads back as tasks
pub fn write_json(table: &TaskTable, dest: &Path) -> Result<()> {
    let file = File::create(dest).with_context(|| format!("Failed to create JSON file: {}", dest.display()))?;
    let mut writer = BufWriter::new(file);

    serde_json::to_writer(&mut writer, table.rows()).context("Failed to serialize tasks")?;
    writer
        .flush()
        .with_context(|| format!("Failed to write JSON file: {}", dest.display()))?;
    Ok(())
}

pub fn write_feather(table: &TaskTable, dest: &Path) -> Result<()> {
    let (fields, arrays): (Vec<Field>, Vec<ArrayRef>) = table
        .columns()
        .iter()
        .map(|name| {
            let cells = table.column(name);
            let array = column_array(&cells);
            (Field::new(name.as_str(), array.data_type().clone(), true), array)
        })
        .unzip();
    let schema = Arc::new(Schema::new(fields));

    let file = File::create(dest).with_context(|| format!("Failed to create Feather file: {}", dest.display()))?;
    let mut writer = FileWriter::try_new(BufWriter::new(file), &schema).context("Failed to start Arrow IPC file")?;

    if !table.rows().is_empty() {
        let batch = RecordBatch::try_new(schema.clone(), arrays).context("Failed to build record batch")?;
        writer.write(&batch).context("Failed to write record batch")?;
    }

    writer
        .finish()
        .with_context(|| format!("Failed to write Feather file: {}", dest.display()))?;
    Ok(())
}

/// Narrowest Arrow type covering every non-null cell
fn column_type(cells: &[Option<&Value>]) -> DataType {
    let values: Vec<&Value> = cells.iter().flatten().copied().filter(|v| !v.is_null()).collect();

    if values.is_empty() {
        DataType::Utf8
    } else if values.iter().all(|v| v.is_i64()) {
        DataType::Int64
    } else if values.iter().all(|v| v.is_number()) {
        DataType::Float64
    } else if values.iter().all(|v| v.is_boolean()) {
        DataType::Boolean
    } else {
        DataType::Utf8
    }
}

fn column_array(cells: &[Option<&Value>]) -> ArrayRef {
    match column_type(cells) {
        DataType::Int64 => Arc::new(Int64Array::from(
            cells.iter().map(|c| c.and_then(Value::as_i64)).collect::<Vec<_>>(),
        )),
        DataType::Float64 => Arc::new(Float64Array::from(
            cells.iter().map(|c| c.and_then(Value::as_f64)).collect::<Vec<_>>(),
        )),
        DataType::Boolean => Arc::new(BooleanArray::from(
            cells.iter().map(|c| c.and_then(Value::as_bool)).collect::<Vec<_>>(),
        )),
        _ => Arc::new(StringArray::from(
            cells
                .iter()
                .map(|c| c.filter(|v| !v.is_null()).map(|v| cell_text(Some(v))))
                .collect::<Vec<_>>(),
        )),
    }
}
