// Free-form `--name value` fields passed to `add` and `eval`

use crate::task::EVAL_SUFFIX;
use eyre::{Result, eyre};

/// Ordered set of user-supplied fields.
///
/// A repeated name keeps its first position and takes the last value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtraFields {
    entries: Vec<(String, String)>,
}

impl ExtraFields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse trailing command-line arguments.
    ///
    /// Accepts `--name value` and `--name=value`. Leading dashes are stripped
    /// from the name.
    pub fn parse<S: AsRef<str>>(args: &[S]) -> Result<Self> {
        let mut fields = Self::new();
        let args: Vec<&str> = args.iter().map(|arg| arg.as_ref()).collect();
        let mut iter = args.into_iter();

        while let Some(arg) = iter.next() {
            if !arg.starts_with('-') {
                return Err(eyre!("Expected a --flag, found '{}'", arg));
            }

            let flag = arg.trim_start_matches('-');
            let (name, value) = match flag.split_once('=') {
                Some((name, value)) => (name, value.to_string()),
                None => {
                    let value = iter
                        .next()
                        .ok_or_else(|| eyre!("Flag '{}' is missing a value", arg))?;
                    (flag, value.to_string())
                }
            };

            if name.is_empty() {
                return Err(eyre!("Flag '{}' has no name", arg));
            }

            fields.insert(name, value);
        }

        Ok(fields)
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    /// Remove a field and return its value
    pub fn take(&mut self, name: &str) -> Option<String> {
        let pos = self.entries.iter().position(|(existing, _)| existing == name)?;
        Some(self.entries.remove(pos).1)
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, value)| value.as_str())
    }

    /// Same fields with `_eval` appended to every name
    pub fn into_eval(self) -> Self {
        Self {
            entries: self
                .entries
                .into_iter()
                .map(|(name, value)| (format!("{}{}", name, EVAL_SUFFIX), value))
                .collect(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl IntoIterator for ExtraFields {
    type Item = (String, String);
    type IntoIter = std::vec::IntoIter<(String, String)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
