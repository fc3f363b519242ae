#![warn(missing_docs)]
//! # face-compare binary
//!
//! Terminal entry point: one-shot comparison with `--before`/`--after`, or an
//! interactive shell driven by one event loop.

use std::io::{BufRead, Write};
use std::process::ExitCode;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

use clap::Parser;
use face_compare_acquire::FsFileSource;
use face_compare_app::{
    AppConfig, AppError, EventOutcome, HELP_TEXT, ShellCommand, SubmitStatus, Workflow,
    WorkflowEvent, app_version,
};
use face_compare_client::UreqTransport;
use face_compare_core::{Role, SubmissionPhase};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "face-compare",
    version = face_compare_app::APP_VERSION,
    about = "Compare a before and an after face image with a remote scoring service"
)]
struct Args {
    /// Comparison endpoint (falls back to FACE_COMPARE_ENDPOINT).
    #[arg(long)]
    endpoint: Option<String>,
    /// Health endpoint (falls back to FACE_COMPARE_HEALTH_ENDPOINT).
    #[arg(long)]
    health_endpoint: Option<String>,
    /// Before image for a one-shot comparison.
    #[arg(long, requires = "after")]
    before: Option<String>,
    /// After image for a one-shot comparison.
    #[arg(long, requires = "before")]
    after: Option<String>,
    /// Log filter used when RUST_LOG is unset.
    #[arg(long, default_value = "info")]
    log_level: String,
}

/// CLI entry point.
fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(&args.log_level);

    match run(args) {
        Ok(code) => code,
        Err(error) => {
            error!(stage = "app", action = "fatal", %error);
            eprintln!("face-compare: {error}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(args: Args) -> Result<ExitCode, AppError> {
    let config = AppConfig::resolve(args.endpoint, args.health_endpoint);
    let (events_tx, events_rx) = mpsc::channel();
    let mut workflow = Workflow::new(
        &config,
        Arc::new(UreqTransport::new()),
        Arc::new(FsFileSource::new()),
        events_tx.clone(),
    )?;
    info!(stage = "app", action = "started", version = app_version());

    match (args.before, args.after) {
        (Some(before), Some(after)) => run_once(&mut workflow, &events_rx, &before, &after),
        _ => run_shell(&mut workflow, events_tx, &events_rx),
    }
}

fn run_once(
    workflow: &mut Workflow,
    events: &Receiver<WorkflowEvent>,
    before: &str,
    after: &str,
) -> Result<ExitCode, AppError> {
    workflow.select(Role::Before, before)?;
    workflow.select(Role::After, after)?;
    workflow.wait_for_settled(events)?;

    if let SubmitStatus::Started { submission_id } = workflow.submit() {
        info!(stage = "app", action = "submitted", submission_id);
    }
    workflow.wait_for_settled(events)?;
    print_display(workflow);

    if workflow.controller().phase() == SubmissionPhase::Succeeded {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}

fn run_shell(
    workflow: &mut Workflow,
    events_tx: Sender<WorkflowEvent>,
    events: &Receiver<WorkflowEvent>,
) -> Result<ExitCode, AppError> {
    spawn_stdin_reader(events_tx);
    println!("face-compare {} (type `help` for commands)", app_version());
    print_display(workflow);
    prompt();

    loop {
        let event = events.recv().map_err(|_| AppError::ChannelClosed)?;
        match workflow.handle_event(event) {
            EventOutcome::Applied => {
                print_display(workflow);
                prompt();
            }
            EventOutcome::Stale => {}
            EventOutcome::Input(line) => {
                if !execute_line(workflow, &line) {
                    break;
                }
                prompt();
            }
            EventOutcome::InputClosed => {
                workflow.wait_for_settled(events)?;
                print_display(workflow);
                break;
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn spawn_stdin_reader(events: Sender<WorkflowEvent>) {
    let spawned = thread::Builder::new()
        .name("stdin-reader".to_string())
        .spawn(move || {
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                let Ok(line) = line else { break };
                if events.send(WorkflowEvent::Input(line)).is_err() {
                    return;
                }
            }
            let _ = events.send(WorkflowEvent::InputClosed);
        });

    if let Err(error) = spawned {
        warn!(stage = "app", action = "stdin_reader_failed", %error);
    }
}

/// Executes one shell line; returns `false` when the shell should exit.
fn execute_line(workflow: &mut Workflow, line: &str) -> bool {
    let command = match ShellCommand::parse(line) {
        Ok(command) => command,
        Err(error) => {
            println!("{error}");
            return true;
        }
    };

    match command {
        ShellCommand::Empty => {}
        ShellCommand::Select { role, path } => match workflow.select(role, &path) {
            Ok(()) => print_display(workflow),
            Err(error) => println!("{error}"),
        },
        ShellCommand::Clear(role) => match workflow.clear(role) {
            Ok(()) => print_display(workflow),
            Err(error) => println!("{error}"),
        },
        ShellCommand::Submit => match workflow.submit() {
            SubmitStatus::Started { .. } | SubmitStatus::Rejected(_) => print_display(workflow),
            SubmitStatus::AlreadyInFlight => println!("A comparison is already in progress."),
            SubmitStatus::ResultShown => println!("Type `reset` to compare another pair."),
        },
        ShellCommand::Reset => match workflow.reset() {
            Ok(()) => print_display(workflow),
            Err(error) => println!("{error}"),
        },
        ShellCommand::Status => print_display(workflow),
        ShellCommand::Health => match workflow.health() {
            Ok(health) => println!(
                "service {} (model loaded: {}, model: {}, scaler: {})",
                health.status,
                health.model_loaded,
                health.model_type.as_deref().unwrap_or("-"),
                health.scaler_type.as_deref().unwrap_or("-"),
            ),
            Err(error) => println!("health check failed: {error}"),
        },
        ShellCommand::Help => println!("{HELP_TEXT}"),
        ShellCommand::Quit => return false,
    }
    true
}

fn print_display(workflow: &Workflow) {
    for line in workflow.display().render_lines() {
        println!("{line}");
    }
}

fn prompt() {
    print!("> ");
    let _ = std::io::stdout().flush();
}
