use clap::{Parser, Subcommand};
use eyre::Result;
use std::io::Write;
use std::path::PathBuf;
use tracing::Level;
use track::commands::{take_project, take_task_id};
use track::{Config, ExtraFields, Tracker};

#[derive(Parser)]
#[command(name = "track")]
#[command(about = "Track and calibrate your productivity.")]
#[command(version = env!("GIT_DESCRIBE"))]
struct Cli {
    /// Log debug output to stderr (give before the subcommand)
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new project and make it current
    Init {
        /// Name of the project to initialize
        project: String,
    },

    /// Add a new task
    Add {
        /// Description of the task
        task_description: String,

        /// Project to add the task to (default: current project)
        #[arg(long)]
        project: Option<String>,

        /// Extra fields as `--name value` pairs
        #[arg(trailing_var_arg = true, allow_hyphen_values = true, value_name = "--FIELD VALUE")]
        fields: Vec<String>,
    },

    /// Evaluate a task, recording `<field>_eval` values
    Eval {
        /// ID of the task to update (default: most recently added)
        #[arg(long = "task_id")]
        task_id: Option<u64>,

        /// Project holding the task (default: current project)
        #[arg(long)]
        project: Option<String>,

        /// Evaluation fields as `--name value` pairs
        #[arg(trailing_var_arg = true, allow_hyphen_values = true, value_name = "--FIELD VALUE")]
        fields: Vec<String>,
    },

    /// List tasks in a project
    List {
        /// Project to list (default: current project)
        #[arg(long)]
        project: Option<String>,
    },

    /// Switch the current project
    Switch {
        /// Name of the project to switch to
        project: String,
    },

    /// Visualize data
    Plot,

    /// Export a project's tasks to a file
    Export {
        /// File to write
        file: PathBuf,

        /// Project to export (default: current project)
        #[arg(long)]
        project: Option<String>,

        /// Output format: csv, json or feather
        #[arg(long, default_value = "csv")]
        format: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup tracing; stdout is reserved for command output
    let level = if cli.verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .init();

    let config = Config::load()?;
    tracing::debug!(path = ?config.bootstrap_path(), "Using config");

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    if config.ensure_storage()? {
        writeln!(out, "Initialized track-cli storage at {}", config.storage_dir().display())?;
    }

    let mut tracker = Tracker::new(config);

    match cli.command {
        Commands::Init { project } => {
            tracker.init(&mut out, &project)?;
        }
        Commands::Add {
            task_description,
            project,
            fields,
        } => {
            // Extras follow the parsed flags, so a repeat among them wins
            let mut fields = ExtraFields::parse(&fields)?;
            let project = tracker.resolve_project(take_project(&mut fields).or(project))?;
            tracker.add(&mut out, &project, &task_description, fields)?;
        }
        Commands::Eval {
            task_id,
            project,
            fields,
        } => {
            let mut fields = ExtraFields::parse(&fields)?;
            let project = tracker.resolve_project(take_project(&mut fields).or(project))?;
            let task_id = take_task_id(&mut fields)?.or(task_id);
            tracker.eval(&mut out, &project, task_id, fields)?;
        }
        Commands::List { project } => {
            let project = tracker.resolve_project(project)?;
            tracker.list(&mut out, &project)?;
        }
        Commands::Switch { project } => {
            tracker.switch(&mut out, &project)?;
        }
        Commands::Plot => {
            tracker.plot(&mut out)?;
        }
        Commands::Export { file, project, format } => {
            let project = tracker.resolve_project(project)?;
            tracker.export(&mut out, &project, &format, &file)?;
        }
    }

    Ok(())
}
