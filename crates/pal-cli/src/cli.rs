use clap::{Args as ClapArgs, Parser, Subcommand};
use pal_core::{TaskFilter, TaskStatus};
use pal_palette::{Operation, Params, TASK_ID_PARAM, TASK_TYPE_PARAM};
use std::path::PathBuf;

pub const DEFAULT_CONFIG_PATH: &str = ".taskpal/config.toml";

#[derive(Parser, Debug)]
#[command(name = "taskpal", version, about = "Command palette for the background task queue")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Palette config file; defaults apply when it does not exist.
    #[arg(long, default_value = DEFAULT_CONFIG_PATH, global = true)]
    pub config: PathBuf,

    /// Print results as JSON.
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the top-level palette entries.
    Menu,
    /// Open the sub-list behind a listing entry.
    Expand(ExpandArgs),
    /// Run a palette operation.
    Run(RunArgs),
    /// Delete every live task matching all given filters.
    Purge(PurgeArgs),
}

#[derive(ClapArgs, Debug)]
pub struct ExpandArgs {
    /// `list_tasks` or `list_task_types`.
    pub operation: Operation,
}

#[derive(ClapArgs, Debug)]
pub struct RunArgs {
    pub operation: Operation,

    #[arg(long)]
    pub task_id: Option<String>,

    #[arg(long)]
    pub task_type: Option<String>,

    /// Confirm operations that ask for confirmation.
    #[arg(long)]
    pub yes: bool,
}

impl RunArgs {
    pub fn variables(&self) -> Params {
        let mut variables = Params::new();
        if let Some(task_id) = &self.task_id {
            variables.insert(TASK_ID_PARAM.to_string(), task_id.clone());
        }
        if let Some(task_type) = &self.task_type {
            variables.insert(TASK_TYPE_PARAM.to_string(), task_type.clone());
        }
        variables
    }
}

#[derive(ClapArgs, Debug)]
pub struct PurgeArgs {
    #[arg(long = "type")]
    pub task_type: Option<String>,

    #[arg(long)]
    pub status: Option<TaskStatus>,

    #[arg(long)]
    pub level: Option<u32>,
}

impl PurgeArgs {
    pub fn filter(&self) -> TaskFilter {
        TaskFilter {
            task_type: self.task_type.clone(),
            status: self.status,
            level: self.level,
        }
    }
}
