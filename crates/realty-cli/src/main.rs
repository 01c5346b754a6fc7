//! `realty` - inspect and drive the realty workflow wizards from a terminal
//!
//! State is kept in a directory of JSON files (`--state-dir`, or
//! `state_dir` from the engine configuration). Set `RUST_LOG` for
//! diagnostics; the default level is `warn`.

mod console;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use console::{describe, ConsoleNavigator, ConsoleNotifier};
use realty_catalog::{Catalog, WorkflowCategory};
use realty_workflow::{
    EngineConfig, FileStore, Localizer, StaticLocalizer, WorkflowEngine, WorkflowError,
};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "realty", author, version, long_about = None)]
#[command(about = "Track progress through the realty investor workflows")]
struct Cli {
    /// Engine configuration file (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Workflow catalog file (TOML); the built-in catalog is used otherwise
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    /// Directory holding the persisted workflow state
    #[arg(long, global = true)]
    state_dir: Option<PathBuf>,

    /// Display language
    #[arg(long, global = true)]
    lang: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List the workflow categories
    Categories,
    /// Show every step of a workflow with its status
    Status {
        /// Workflow category
        category: WorkflowCategory,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
    /// Show the steps following the active step
    Next {
        /// Workflow category
        category: WorkflowCategory,

        /// Start after this step instead of the active one
        #[arg(long)]
        from: Option<String>,

        /// Maximum number of steps
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Make a step active and open it
    Go {
        /// Workflow category
        category: WorkflowCategory,
        /// Step id
        step: String,
    },
    /// Mark a step as completed
    Complete {
        /// Workflow category
        category: WorkflowCategory,
        /// Step id
        step: String,

        /// Open the next available step afterwards
        #[arg(long)]
        advance: bool,
    },
    /// Mark a step as not completed
    Uncomplete {
        /// Workflow category
        category: WorkflowCategory,
        /// Step id
        step: String,
    },
    /// Clear all progress of a workflow
    Reset {
        /// Workflow category
        category: WorkflowCategory,
    },
    /// Store a value; text that is not valid JSON is stored as a string
    SetData {
        /// Workflow category
        category: WorkflowCategory,
        /// Data key
        key: String,
        /// JSON value
        value: String,
    },
    /// Print a stored value
    GetData {
        /// Workflow category
        category: WorkflowCategory,
        /// Data key
        key: String,
    },
    /// Write an export file
    Export {
        /// Category to export; repeatable, all categories if omitted
        #[arg(long = "category")]
        categories: Vec<WorkflowCategory>,

        /// Target directory
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },
    /// Merge an export file into the persisted state
    Import {
        /// Export file
        file: PathBuf,
    },
    /// Progress summary of every workflow
    Overview {
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;
    let language = config.default_language.clone();
    let catalog = load_catalog(cli.catalog.as_deref())?;
    let store = FileStore::open(&config.state_dir)
        .with_context(|| format!("cannot open state directory {}", config.state_dir.display()))?;
    debug!("State directory {}", store.dir().display());

    let mut engine = WorkflowEngine::new(catalog, store, config);
    run(&mut engine, cli.command, &language)
}

fn load_config(cli: &Cli) -> Result<EngineConfig> {
    let mut config = match &cli.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    if let Some(dir) = &cli.state_dir {
        config = config.with_state_dir(dir);
    }
    if let Some(lang) = &cli.lang {
        config = config.with_default_language(lang);
    }
    Ok(config)
}

fn load_catalog(path: Option<&Path>) -> Result<Catalog> {
    let catalog = match path {
        Some(path) => {
            let source = std::fs::read_to_string(path)
                .with_context(|| format!("cannot read catalog {}", path.display()))?;
            Catalog::from_toml_str(&source, false)
                .with_context(|| format!("invalid catalog {}", path.display()))?
        }
        None => Catalog::builtin()?,
    };
    Ok(catalog)
}

fn run(engine: &mut WorkflowEngine<FileStore>, command: Commands, lang: &str) -> Result<ExitCode> {
    let localizer = StaticLocalizer::builtin(lang);
    let notifier = ConsoleNotifier;

    match command {
        Commands::Categories => {
            for definition in engine.catalog().categories() {
                let category = definition.category;
                println!(
                    "{:<10} {} ({} steps)",
                    category,
                    engine.category_title(category, lang),
                    definition.len()
                );
            }
        }
        Commands::Status { category, json } => print_status(engine, category, lang, json)?,
        Commands::Next { category, from, limit } => {
            let state = engine.state(category);
            let limit = limit.unwrap_or(engine.config().next_steps_limit);
            let Some(from) = from.or_else(|| state.active_step().map(str::to_string)) else {
                match engine.next_available_step(category, &state) {
                    Some(step) => {
                        println!("{} {}", step.id, engine.step_label(&step.id, category, lang));
                    }
                    None => println!("no open step left"),
                }
                return Ok(ExitCode::SUCCESS);
            };
            for view in engine.next_steps(&from, category, &state, limit) {
                println!(
                    "{} {} {}",
                    view.status.marker(),
                    view.id(),
                    engine.step_label(view.id(), category, lang)
                );
            }
        }
        Commands::Go { category, step } => {
            let outcome = engine.open_step(&step, category, &mut ConsoleNavigator::default());
            if let Some(WorkflowError::Blocked { missing, .. }) = outcome.error() {
                println!(
                    "{} ({})",
                    localizer.translate("workflow.step.blocked"),
                    missing.join(", ")
                );
            }
            println!("{}", describe(&outcome, &format!("active step {step}")));
        }
        Commands::Complete { category, step, advance } => {
            let outcome = if advance {
                let mut navigator = ConsoleNavigator::default();
                let outcome = engine.complete_and_advance(&step, category, &mut navigator);
                if !outcome.is_skipped() && navigator.opened() == 0 {
                    println!("no open step left");
                }
                outcome
            } else {
                engine.mark_step_complete(&step, category)
            };
            println!("{}", describe(&outcome, &format!("completed {step}")));
            let state = engine.state(category);
            if engine.is_workflow_complete(category, state.completed_steps()) {
                println!("{}", localizer.translate("workflow.complete"));
            }
        }
        Commands::Uncomplete { category, step } => {
            let outcome = engine.mark_step_incomplete(&step, category);
            println!("{}", describe(&outcome, &format!("reopened {step}")));
        }
        Commands::Reset { category } => {
            let outcome = engine.reset_workflow(category);
            println!("{}", describe(&outcome, &format!("reset {category}")));
        }
        Commands::SetData { category, key, value } => {
            let value = serde_json::from_str(&value).unwrap_or(Value::String(value));
            let outcome = engine.save_data(category, &key, value);
            println!("{}", describe(&outcome, &format!("saved {key}")));
        }
        Commands::GetData { category, key } => match engine.get_data(category, &key) {
            Some(value) => println!("{}", serde_json::to_string_pretty(&value)?),
            None => bail!("no value stored under {key} in workflow {category}"),
        },
        Commands::Export { categories, out } => {
            let categories = if categories.is_empty() {
                engine.catalog().categories().map(|d| d.category).collect()
            } else {
                categories
            };
            let today = chrono::Local::now().date_naive();
            if engine
                .export_to_dir(&categories, &out, today, &localizer, &notifier)
                .is_err()
            {
                return Ok(ExitCode::FAILURE);
            }
        }
        Commands::Import { file } => {
            let Ok(report) = engine.import_file(&file, &localizer, &notifier) else {
                return Ok(ExitCode::FAILURE);
            };
            for key in &report.ignored_keys {
                println!("ignored unknown key {key}");
            }
            for (category, step) in &report.dropped_steps {
                println!("dropped unknown step {step} in workflow {category}");
            }
        }
        Commands::Overview { json } => {
            let overview = engine.overview(lang);
            if json {
                println!("{}", serde_json::to_string_pretty(&overview)?);
            } else {
                for entry in overview {
                    let active = entry.active_step.as_deref().unwrap_or("-");
                    println!(
                        "{:<10} {:>3}%  {}/{} steps  ~{} min left  active: {}  {}",
                        entry.category,
                        entry.progress,
                        entry.completed,
                        entry.total,
                        entry.remaining_minutes,
                        active,
                        entry.title
                    );
                }
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn print_status(
    engine: &WorkflowEngine<FileStore>,
    category: WorkflowCategory,
    lang: &str,
    json: bool,
) -> Result<()> {
    let state = engine.state(category);
    let views = engine.steps_with_status(category, &state);
    if json {
        println!("{}", serde_json::to_string_pretty(&views)?);
        return Ok(());
    }

    let completed = state.completed_steps();
    println!(
        "{} - {}% ({} min left)",
        engine.category_title(category, lang),
        engine.workflow_progress(category, completed, state.active_step()),
        engine.remaining_minutes(category, completed)
    );
    for view in &views {
        let cursor = if view.is_active { ">" } else { " " };
        let needs = if view.is_blocked {
            let missing = engine.missing_dependencies(view.id(), category, completed);
            format!("  (needs {})", missing.join(", "))
        } else {
            String::new()
        };
        println!(
            "{cursor} {} {:<16} {}{needs}",
            view.status.marker(),
            view.id(),
            engine.step_label(view.id(), category, lang)
        );
    }
    Ok(())
}
