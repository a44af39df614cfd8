mod api;
mod config;
mod consts;
mod cookies;
mod environment;
mod events;
mod task;
mod validate;
mod watcher;

use crate::api::{ApiClient, TasksApi};
use crate::config::{get_config_path, Config};
use crate::consts::watcher::EVENT_QUEUE_SIZE;
use crate::environment::Environment;
use crate::events::{Event, EventType};
use crate::watcher::{FlowState, TaskKind};
use clap::{Parser, Subcommand};
use std::error::Error;
use std::path::{Path, PathBuf};
use tokio::sync::{broadcast, mpsc};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
/// Command-line arguments
struct Args {
    /// Command to execute
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start data preparation for a project and watch it to completion.
    Prep {
        /// Name of the project to prepare.
        #[arg(long, value_name = "PROJECT_NAME")]
        project_name: String,
    },
    /// Start training and evaluation for a project and watch it to completion.
    TrainEval {
        /// Name of the project to train and evaluate.
        #[arg(long, value_name = "PROJECT_NAME")]
        project_name: String,
    },
    /// Fetch the current status of a task once, without watching.
    Status {
        /// ID of the task to look up.
        #[arg(long, value_name = "TASK_ID")]
        task_id: String,
    },
    /// Validate project inputs locally. Issues no network requests.
    Check {
        /// Project name to validate.
        #[arg(long, value_name = "PROJECT_NAME")]
        project_name: Option<String>,

        /// Input dataframe file; must be a CSV.
        #[arg(long, value_name = "FILE")]
        input_dataframe: Option<PathBuf>,

        /// Parameter file; must be JSON.
        #[arg(long, value_name = "FILE")]
        param_file: Option<PathBuf>,
    },
    /// Store a session cookie string for authenticated requests.
    Login {
        /// Cookie header captured from an authenticated browser session,
        /// e.g. "sessionid=...; csrftoken=...".
        #[arg(long, value_name = "COOKIE")]
        cookie: String,
    },
    /// Clear the stored session and configuration.
    Logout,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let environment_str = std::env::var("GIZMO_ENVIRONMENT").unwrap_or_default();
    let environment = if environment_str.is_empty() {
        Environment::default()
    } else {
        match environment_str.parse::<Environment>() {
            Ok(env) => env,
            Err(_) => {
                eprintln!("Invalid environment: {}", environment_str);
                return Err("Invalid environment".into());
            }
        }
    };

    let config_path = get_config_path()?;

    let args = Args::parse();
    match args.command {
        Command::Prep { project_name } => {
            watch_task(TaskKind::Prep, project_name, environment, &config_path).await
        }
        Command::TrainEval { project_name } => {
            watch_task(TaskKind::TrainEval, project_name, environment, &config_path).await
        }
        Command::Status { task_id } => {
            let api = load_client(environment, &config_path);
            let status = api.task_status(&task_id).await?;
            println!("Task {}: {}", task_id, status);
            if !status.is_terminal() {
                println!("The task has not reached a terminal state; poll again later.");
            }
            Ok(())
        }
        Command::Check {
            project_name,
            input_dataframe,
            param_file,
        } => check(project_name, input_dataframe, param_file),
        Command::Login { cookie } => {
            let mut config = Config::load_from_file(&config_path)
                .unwrap_or_else(|_| Config::new(String::new(), environment));
            config.cookie = cookie;
            config.save(&config_path)?;
            println!("Session cookie saved to {}", config_path.display());
            Ok(())
        }
        Command::Logout => {
            println!("Logging out and clearing session configuration...");
            Config::clear_session(&config_path).map_err(Into::into)
        }
    }
}

fn load_client(environment: Environment, config_path: &Path) -> ApiClient {
    let config = Config::load_from_file(config_path)
        .unwrap_or_else(|_| Config::new(String::new(), environment));
    ApiClient::new(config.resolve_base_url(environment), config.cookie)
}

/// Submits a task and prints watcher events until a terminal state or Ctrl-C.
async fn watch_task(
    kind: TaskKind,
    project_name: String,
    environment: Environment,
    config_path: &Path,
) -> Result<(), Box<dyn Error>> {
    // Validation failures stop here; no request is issued.
    validate::validate_project_name(&project_name)?;

    let api = load_client(environment, config_path);
    let (event_sender, mut event_receiver) = mpsc::channel::<Event>(EVENT_QUEUE_SIZE);
    let (shutdown_sender, _) = broadcast::channel(1);

    // Trigger shutdown on Ctrl+C
    let shutdown_sender_clone = shutdown_sender.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = shutdown_sender_clone.send(());
        }
    });

    let shutdown_receiver = shutdown_sender.subscribe();
    let watcher_handle = tokio::spawn(async move {
        watcher::run_task(kind, &project_name, &api, event_sender, shutdown_receiver).await
    });

    // The event channel closes when the watcher reaches a terminal state.
    while let Some(event) = event_receiver.recv().await {
        match event.event_type {
            EventType::Error => eprintln!("{}", event),
            _ => println!("{}", event),
        }
    }

    match watcher_handle.await? {
        FlowState::Done => Ok(()),
        FlowState::Failed | FlowState::Error => Err("Task did not complete".into()),
        _ => {
            println!("\nExiting...");
            Ok(())
        }
    }
}

/// Runs the local validators and reports every failure.
fn check(
    project_name: Option<String>,
    input_dataframe: Option<PathBuf>,
    param_file: Option<PathBuf>,
) -> Result<(), Box<dyn Error>> {
    let mut failures = 0;

    if let Some(name) = project_name {
        if let Err(e) = validate::validate_project_name(&name) {
            eprintln!("{}", e);
            failures += 1;
        }
    }
    if let Some(path) = input_dataframe {
        if let Err(e) = validate::validate_input_dataframe(&path) {
            eprintln!("{}", e);
            failures += 1;
        }
    }
    if let Some(path) = param_file {
        if let Err(e) = validate::validate_param_file(&path) {
            eprintln!("{}", e);
            failures += 1;
        }
    }

    if failures > 0 {
        return Err(format!("{} validation error(s)", failures).into());
    }
    println!("All inputs are valid.");
    Ok(())
}
