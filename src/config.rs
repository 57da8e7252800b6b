// Bootstrap config and current-project state

use eyre::{Context, Result, eyre};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Environment variable overriding the bootstrap directory
pub const HOME_ENV: &str = "TRACK_CLI_HOME";

/// Bootstrap config filename, always inside the bootstrap directory
pub const BOOTSTRAP_FILE: &str = "track-cli-config.json";

/// Current-project filename, inside the storage root
pub const STATE_FILE: &str = "config.json";

const DEFAULT_DIR_NAME: &str = ".track-cli";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Root directory holding every project
    pub track_cli_dir: PathBuf,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ProjectState {
    current_project: Option<String>,
}

/// Loaded configuration, passed explicitly to everything that needs it
#[derive(Debug, Clone)]
pub struct Config {
    bootstrap_path: PathBuf,
    settings: Settings,
    current_project: Option<String>,
}

impl Config {
    /// `$TRACK_CLI_HOME`, or `~/.track-cli`
    pub fn bootstrap_dir() -> Result<PathBuf> {
        if let Some(dir) = std::env::var_os(HOME_ENV).filter(|v| !v.is_empty()) {
            return Ok(PathBuf::from(dir));
        }

        dirs::home_dir()
            .map(|home| home.join(DEFAULT_DIR_NAME))
            .ok_or_else(|| eyre!("Could not determine home directory; set {}", HOME_ENV))
    }

    /// Load from the default bootstrap directory
    pub fn load() -> Result<Self> {
        Self::load_from(Self::bootstrap_dir()?)
    }

    /// Load from `dir`, writing a default bootstrap file on first run
    pub fn load_from<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir).with_context(|| format!("Failed to create config directory: {}", dir.display()))?;

        let bootstrap_path = dir.join(BOOTSTRAP_FILE);
        if !bootstrap_path.exists() {
            let defaults = Settings {
                track_cli_dir: dir.to_path_buf(),
            };
            write_json(&bootstrap_path, &defaults)?;
            info!(path = ?bootstrap_path, "Created default config");
        }

        let contents = fs::read_to_string(&bootstrap_path)
            .with_context(|| format!("Failed to read config file: {}", bootstrap_path.display()))?;
        let settings: Settings = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", bootstrap_path.display()))?;

        let state_path = settings.track_cli_dir.join(STATE_FILE);
        let current_project = if state_path.exists() {
            let contents = fs::read_to_string(&state_path)
                .with_context(|| format!("Failed to read project state: {}", state_path.display()))?;
            let state: ProjectState = serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse project state: {}", state_path.display()))?;
            state.current_project
        } else {
            None
        };

        debug!(
            root = ?settings.track_cli_dir,
            current_project = ?current_project,
            "Loaded config"
        );

        Ok(Self {
            bootstrap_path,
            settings,
            current_project,
        })
    }

    /// Create the storage root if missing; returns true if it was created
    pub fn ensure_storage(&self) -> Result<bool> {
        let root = self.storage_dir();
        if root.exists() {
            return Ok(false);
        }

        fs::create_dir_all(root).with_context(|| format!("Failed to create storage directory: {}", root.display()))?;
        info!(root = ?root, "Initialized storage");
        Ok(true)
    }

    pub fn bootstrap_path(&self) -> &Path {
        &self.bootstrap_path
    }

    pub fn storage_dir(&self) -> &Path {
        &self.settings.track_cli_dir
    }

    pub fn state_path(&self) -> PathBuf {
        self.storage_dir().join(STATE_FILE)
    }

    pub fn current_project(&self) -> Option<&str> {
        self.current_project.as_deref()
    }

    /// Persist `name` as the current project
    pub fn set_current_project(&mut self, name: &str) -> Result<()> {
        let root = self.storage_dir();
        fs::create_dir_all(root).with_context(|| format!("Failed to create storage directory: {}", root.display()))?;

        let state = ProjectState {
            current_project: Some(name.to_string()),
        };
        write_json(&self.state_path(), &state)?;

        info!(project = name, "Current project set");
        self.current_project = Some(name.to_string());
        Ok(())
    }

    /// The explicit project if given, otherwise the current project
    pub fn resolve_project(&self, explicit: Option<String>) -> Result<String> {
        explicit
            .or_else(|| self.current_project.clone())
            .ok_or_else(|| eyre!("No current project; run `track init <project>` or pass --project"))
    }
}

/// Write a value as 4-space indented JSON
pub(crate) fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut ser).context("Failed to serialize JSON")?;

    fs::write(path, buf).with_context(|| format!("Failed to write file: {}", path.display()))?;
    Ok(())
}
