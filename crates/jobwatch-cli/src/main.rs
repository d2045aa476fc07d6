//! jobwatch - terminal control panel for processing jobs.

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use jobwatch_cli::api::JobApi;
use jobwatch_cli::config::Config;
use jobwatch_cli::logging::{self, LogConfig, LogFormat};
use jobwatch_cli::stream::watch_log;
use jobwatch_cli::surface::{ConsoleSurface, status_text};
use jobwatch_core::{ActionButton, PollPhase, Terminal, TokioScheduler};
use jobwatch_types::{JobAction, JobRef};
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// jobwatch - start, stop and follow processing jobs.
#[derive(Parser, Debug)]
#[command(name = "jobwatch")]
#[command(about = "Start, stop and follow the live log of processing jobs")]
#[command(version)]
struct Cli {
    /// Path to config file
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Override the job server base URL from config
    #[arg(long, value_name = "URL", global = true)]
    base_url: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    /// Enable trace logging (every classified line)
    #[arg(long, global = true)]
    trace: bool,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Set log level for specific targets (e.g., "poll=debug").
    /// Targets are prefixed with "jobwatch::" automatically.
    #[arg(long = "log", value_name = "TARGET=LEVEL", global = true)]
    log_overrides: Vec<String>,

    /// Log output format
    #[arg(long = "log-format", value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start a job
    Start(JobArgs),
    /// Stop a running job
    Stop(JobArgs),
    /// Print the current job status
    Status(JobArgs),
    /// Follow the live job log and poll its status
    Watch {
        #[command(flatten)]
        job: JobArgs,

        /// Stop streaming once the job reaches a terminal status
        #[arg(long)]
        exit_on_terminal: bool,

        /// Do not poll the job status
        #[arg(long)]
        no_poll: bool,
    },
}

#[derive(Args, Debug)]
struct JobArgs {
    /// Processing environment id
    #[arg(long = "env", value_name = "ID")]
    env_id: u64,

    /// Job uuid
    #[arg(long = "job", value_name = "UUID")]
    job_id: Uuid,
}

impl JobArgs {
    fn job_ref(&self) -> JobRef {
        JobRef::new(self.env_id, self.job_id)
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_config = LogConfig::from_cli(
        cli.verbose,
        cli.debug,
        cli.trace,
        cli.quiet,
        cli.log_overrides,
        cli.log_format,
    );
    logging::init(&log_config);

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    if let Some(base_url) = cli.base_url {
        config.base_url = base_url;
    }
    tracing::info!(target: "jobwatch::startup", "Using job server {}", config.base_url);

    let api = JobApi::new(&config.base_url, config.cookie.as_deref())?;

    match cli.command {
        Command::Start(args) => control(&api, &args.job_ref(), ActionButton::start()).await,
        Command::Stop(args) => {
            control(&api, &args.job_ref(), ActionButton::new(JobAction::StopJob, "stop job")).await
        }
        Command::Status(args) => {
            let response = api.status(&args.job_ref()).await?;
            println!("{}", status_text(&response));
            Ok(())
        }
        Command::Watch {
            job,
            exit_on_terminal,
            no_poll,
        } => watch(&config, &api, job.job_ref(), exit_on_terminal, no_poll).await,
    }
}

/// Press the job control once and show what it offers next.
async fn control(api: &JobApi, job: &JobRef, mut button: ActionButton) -> Result<()> {
    let response = api.send(job, button.action()).await?;
    println!("{}", status_text(&response));

    if button.apply_response(&response) && button.is_control_action() {
        println!("Next action: {} ({})", button.label(), button.action());
    }
    Ok(())
}

/// Stream the job log while polling its status on the same thread.
async fn watch(
    config: &Config,
    api: &JobApi,
    job: JobRef,
    exit_on_terminal: bool,
    no_poll: bool,
) -> Result<()> {
    let cancel = CancellationToken::new();
    let ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!(target: "jobwatch::startup", "Interrupted, closing stream");
            ctrl_c.cancel();
        }
    });

    let surface = ConsoleSurface::new(config.show_progress_lines);
    let printer = surface.status_printer();
    let mut terminal = Terminal::new(surface);
    let url = config.ws_url(&job);
    let poller = config.poller();

    let stream = watch_log(&url, &mut terminal, &cancel);
    let poll = async {
        if no_poll {
            return;
        }
        let run = poller.run(job, api, &TokioScheduler, |response| printer.print_status(response));
        let state = tokio::select! {
            _ = cancel.cancelled() => return,
            state = run => state,
        };
        if state.phase == PollPhase::Terminal && exit_on_terminal {
            cancel.cancel();
        }
    };

    tokio::join!(stream, poll);
    terminal.surface().finish();
    Ok(())
}
