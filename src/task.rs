// Task record and value helpers

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Suffix appended to every key merged by `eval`
pub const EVAL_SUFFIX: &str = "_eval";

/// Keys owned by the tracker itself; extra fields may not overwrite them
pub const RESERVED_KEYS: [&str; 3] = ["description", "task_id", "time_add"];

/// Format used for `time_add`, e.g. `2024-03-01--14:05`
pub const TIME_ADD_FORMAT: &str = "%Y-%m-%d--%H:%M";

/// One tracked unit of work within a project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub description: String,
    pub task_id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_add: Option<String>,
    /// Everything else, in insertion order
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Task {
    pub fn new(task_id: u64, description: impl Into<String>, time_add: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            task_id,
            time_add: Some(time_add.into()),
            fields: Map::new(),
        }
    }

    /// Whether any evaluation field holds a truthy value
    pub fn is_resolved(&self) -> bool {
        self.fields
            .iter()
            .any(|(key, value)| key.ends_with(EVAL_SUFFIX) && is_truthy(value))
    }

    /// The task as a single ordered JSON object, reserved keys first
    pub fn to_record(&self) -> Map<String, Value> {
        let mut record = Map::new();
        record.insert("description".to_string(), Value::String(self.description.clone()));
        record.insert("task_id".to_string(), Value::from(self.task_id));
        if let Some(time_add) = &self.time_add {
            record.insert("time_add".to_string(), Value::String(time_add.clone()));
        }
        for (key, value) in &self.fields {
            record.insert(key.clone(), value.clone());
        }
        record
    }
}

/// Whether `key` is one of the tracker-owned keys
pub fn is_reserved(key: &str) -> bool {
    RESERVED_KEYS.contains(&key)
}

/// Truthiness of a stored value.
///
/// `null`, `false`, zero, `""`, `[]` and `{}` are falsy; everything else is
/// truthy. Strings are never interpreted, so `"0"` is truthy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

/// Format a creation timestamp for `time_add`
pub fn format_time_add(at: NaiveDateTime) -> String {
    at.format(TIME_ADD_FORMAT).to_string()
}

/// Current local time formatted for `time_add`
pub fn now_time_add() -> String {
    format_time_add(chrono::Local::now().naive_local())
}
