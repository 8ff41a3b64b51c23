use anyhow::{Context, Result};
use cadence_ipc::{Command, DurationsPatch, Response, TimerState, TimerStatus, SOCKET_PATH};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "cadencectl")]
#[command(about = "Control a running Cadence timer", long_about = None)]
struct Cli {
    /// Socket the cadence app listens on
    #[arg(long, global = true, default_value = SOCKET_PATH)]
    socket: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the timer
    Start,
    /// Pause the timer
    Pause,
    /// Start if paused, pause if running
    Toggle,
    /// Stop and start over from a fresh focus session
    Stop,
    /// Reset the current session to its full length
    Reset,
    /// Skip to the next session
    Skip,
    /// Get timer status
    Status,
    /// List presets, or select one with --select
    Presets {
        #[arg(short, long)]
        select: Option<String>,
    },
    /// Change durations (minutes) and the long-break cadence
    Config {
        #[arg(long)]
        focus: Option<u32>,
        #[arg(long)]
        short_break: Option<u32>,
        #[arg(long)]
        long_break: Option<u32>,
        #[arg(long)]
        cycles: Option<u32>,
    },
    /// Show the focus task queue, add a task or move on to the next one
    Task {
        #[arg(short, long)]
        add: Option<String>,
        /// Project the added task belongs to
        #[arg(long, requires = "add")]
        project: Option<String>,
        #[arg(short, long, conflicts_with = "add")]
        next: bool,
    },
    /// List the focus task queue
    Tasks,
}

impl From<Commands> for Command {
    fn from(command: Commands) -> Self {
        match command {
            Commands::Start => Command::Start,
            Commands::Pause => Command::Pause,
            Commands::Toggle => Command::Toggle,
            Commands::Stop => Command::Stop,
            Commands::Reset => Command::Reset,
            Commands::Skip => Command::Skip,
            Commands::Status => Command::Status,
            Commands::Presets { select: Some(id) } => Command::SelectPreset { id },
            Commands::Presets { select: None } => Command::ListPresets,
            Commands::Config {
                focus,
                short_break,
                long_break,
                cycles,
            } => Command::Configure(DurationsPatch {
                focus_minutes: focus,
                short_break_minutes: short_break,
                long_break_minutes: long_break,
                cycles_before_long_break: cycles,
            }),
            Commands::Task {
                add: Some(title),
                project,
                ..
            } => Command::AddTask { title, project },
            Commands::Task {
                add: None,
                next: true,
                ..
            } => Command::NextTask,
            Commands::Task { .. } | Commands::Tasks => Command::ListTasks,
        }
    }
}

fn format_clock(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

fn print_status(status: &TimerStatus) {
    let state = match status.state {
        TimerState::Idle => "idle",
        TimerState::Running => "running",
        TimerState::Paused => "paused",
    };
    println!("Session:   {} ({})", status.kind.label(), state);
    println!(
        "Remaining: {} / {}",
        format_clock(status.remaining),
        format_clock(status.total)
    );
    println!("Cycles:    {}", status.completed_work_cycles);
    println!("Next:      {}", status.next.label());
    println!("Preset:    {}", status.preset);
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_env("CADENCE_LOG"))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let command = Command::from(cli.command);
    debug!(?command, socket = %cli.socket.display(), "sending command");

    let response = cadence_ipc::request(&cli.socket, &command)
        .await
        .with_context(|| format!("Failed to talk to cadence at {}", cli.socket.display()))?;

    match response {
        Response::Ok => println!("OK"),
        Response::Status(status) => print_status(&status),
        Response::Presets(presets) => {
            for preset in presets {
                let mark = if preset.selected { "▸" } else { " " };
                let long = match (preset.long_break_minutes, preset.cycles_before_long_break) {
                    (Some(minutes), Some(cycles)) => format!(", long {}m every {}", minutes, cycles),
                    _ => String::new(),
                };
                println!(
                    "{} {:<12} {}m focus, {}m break{}",
                    mark, preset.id, preset.focus_minutes, preset.short_break_minutes, long
                );
            }
        }
        Response::Tasks(tasks) => {
            if tasks.is_empty() {
                println!("No tasks queued");
            }
            for task in tasks {
                let mark = if task.active { "▸" } else { " " };
                match task.project {
                    Some(project) => println!("{} {}: {} ({})", mark, task.id, task.title, project),
                    None => println!("{} {}: {}", mark, task.id, task.title),
                }
            }
        }
        Response::Error(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }

    Ok(())
}
