mod cli;

use clap::Parser;
use pal_core::{
    has_errors, load_palette_config_or_default, ConfigError, MessageCatalog, PaletteConfig, Validate,
    ValidationIssue, ValidationLevel,
};
use pal_palette::{
    CommandDescriptor, DispatchResult, Expansion, Operation, Palette, PaletteError,
};
use pal_queue::{QueueError, SqliteTaskQueue, TaskQueueAdapter};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command, ExpandArgs, PurgeArgs, RunArgs};

#[derive(Debug, thiserror::Error)]
enum MainError {
    #[error("{0}")]
    Args(String),
    #[error("failed to create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to load palette config at {path}: {source}")]
    LoadConfig {
        path: PathBuf,
        #[source]
        source: ConfigError,
    },
    #[error("{0}")]
    InvalidConfig(String),
    #[error("failed to install log subscriber: {0}")]
    Logging(String),
    #[error("failed to open task store at {path}: {source}")]
    OpenStore {
        path: PathBuf,
        #[source]
        source: QueueError,
    },
    #[error("failed to serialize output as json: {source}")]
    SerializeOutput {
        #[source]
        source: serde_json::Error,
    },
    #[error("{message}")]
    CommandFailed { message: String },
    #[error("operation failed; see json output")]
    CommandReported,
    #[error(transparent)]
    Palette(#[from] PaletteError),
    #[error(transparent)]
    Queue(#[from] QueueError),
}

fn main() {
    if let Err(err) = run() {
        eprintln!("taskpal: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), MainError> {
    let cli = Cli::parse();

    let config =
        load_palette_config_or_default(&cli.config).map_err(|source| MainError::LoadConfig {
            path: cli.config.clone(),
            source,
        })?;
    init_logging(&config)?;
    validate_palette_config(&config.validate())?;

    let queue = Arc::new(open_store(&config.store.sqlite_path)?);
    let catalog: Arc<dyn MessageCatalog> = Arc::new(config.catalog());
    let palette = Palette::new(queue.clone(), catalog);

    match cli.command {
        Command::Menu => run_menu(&palette, cli.json),
        Command::Expand(args) => run_expand(&palette, args, cli.json),
        Command::Run(args) => run_operation(&palette, args, cli.json),
        Command::Purge(args) => run_purge(queue.as_ref(), args, cli.json),
    }
}

fn init_logging(config: &PaletteConfig) -> Result<(), MainError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log.filter.as_str()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| MainError::Logging(err.to_string()))
}

fn open_store(path: &Path) -> Result<SqliteTaskQueue, MainError> {
    ensure_parent_dir(path)?;
    let queue = SqliteTaskQueue::open(path).map_err(|source| MainError::OpenStore {
        path: path.to_path_buf(),
        source,
    })?;
    queue.migrate()?;
    Ok(queue)
}

fn run_menu(palette: &Palette, json: bool) -> Result<(), MainError> {
    let menu = palette.top_level();
    if json {
        return print_json(&menu);
    }
    println!("{}", render_descriptors(&menu));
    Ok(())
}

fn run_expand(palette: &Palette, args: ExpandArgs, json: bool) -> Result<(), MainError> {
    let descriptor = find_descriptor(palette, args.operation);
    let expansion = palette.expand(&descriptor)?;
    if json {
        return print_json(&expansion);
    }
    println!("{}", render_expansion(&expansion));
    Ok(())
}

fn run_operation(palette: &Palette, args: RunArgs, json: bool) -> Result<(), MainError> {
    let descriptor = find_descriptor(palette, args.operation);
    ensure_confirmed(&descriptor, args.yes)?;

    let result = palette.dispatch(&descriptor, &args.variables());
    report_dispatch(&result, json)
}

#[derive(Debug, Serialize)]
struct PurgeReport {
    deleted: usize,
}

fn run_purge(queue: &dyn TaskQueueAdapter, args: PurgeArgs, json: bool) -> Result<(), MainError> {
    let filter = args.filter();
    if filter.is_empty() {
        return Err(MainError::Args(
            "purge needs at least one of --type, --status or --level; use `run delete_all_tasks` to clear the queue"
                .to_string(),
        ));
    }

    let deleted = queue.delete_where(&filter)?;
    info!(
        task_type = filter.task_type.as_deref().unwrap_or("*"),
        deleted, "purge finished"
    );
    if json {
        return print_json(&PurgeReport { deleted });
    }
    println!("{deleted} task(s) deleted.");
    Ok(())
}

/// The top-level entry for `operation`, or a bare confirmed descriptor for
/// operations that only appear inside sub-lists.
fn find_descriptor(palette: &Palette, operation: Operation) -> CommandDescriptor {
    palette
        .top_level()
        .into_iter()
        .find(|descriptor| descriptor.operation == operation)
        .unwrap_or_else(|| CommandDescriptor::confirmed(operation.as_str(), operation))
}

fn ensure_confirmed(descriptor: &CommandDescriptor, yes: bool) -> Result<(), MainError> {
    if descriptor.confirm && !yes {
        return Err(MainError::Args(format!(
            "'{}' asks for confirmation; re-run with --yes",
            descriptor.name
        )));
    }
    Ok(())
}

fn report_dispatch(result: &DispatchResult, json: bool) -> Result<(), MainError> {
    if json {
        print_json(result)?;
    } else if result.ok {
        println!("{}", result.message);
    }

    if result.ok {
        return Ok(());
    }
    warn!(failure = ?result.failure, "operation failed");
    if json {
        return Err(MainError::CommandReported);
    }
    Err(MainError::CommandFailed {
        message: result.message.clone(),
    })
}

fn render_descriptors(descriptors: &[CommandDescriptor]) -> String {
    descriptors
        .iter()
        .enumerate()
        .map(|(index, descriptor)| {
            let flag = if descriptor.expandable {
                "[list]   "
            } else if descriptor.confirm {
                "[confirm]"
            } else {
                "         "
            };
            format!(
                "{:>2}. {flag} {} ({})",
                index + 1,
                descriptor.name,
                descriptor.operation
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_expansion(expansion: &Expansion) -> String {
    match &expansion.notice {
        Some(notice) => notice.clone(),
        None => render_descriptors(&expansion.items),
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), MainError> {
    let rendered = serde_json::to_string_pretty(value)
        .map_err(|source| MainError::SerializeOutput { source })?;
    println!("{rendered}");
    Ok(())
}

fn ensure_parent_dir(path: &Path) -> Result<(), MainError> {
    let parent = path.parent().filter(|p| !p.as_os_str().is_empty());
    if let Some(parent) = parent {
        fs::create_dir_all(parent).map_err(|source| MainError::CreateDir {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    Ok(())
}

fn validate_palette_config(issues: &[ValidationIssue]) -> Result<(), MainError> {
    for issue in issues
        .iter()
        .filter(|issue| issue.level == ValidationLevel::Warning)
    {
        warn!(code = issue.code, "{}", issue.message);
    }

    if !has_errors(issues) {
        return Ok(());
    }

    let rendered = issues
        .iter()
        .filter(|issue| issue.level == ValidationLevel::Error)
        .map(|issue| format!("{}: {}", issue.code, issue.message))
        .collect::<Vec<_>>()
        .join("; ");
    Err(MainError::InvalidConfig(format!(
        "palette config validation failed ({rendered})"
    )))
}
