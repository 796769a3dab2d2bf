use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use planner_core::observability::init_tracing;
use planner_core::{AppBuilder, PlannerConfig, Task};

/// Daily planner: tasks per day with minute-level reminders.
#[derive(Debug, Parser)]
#[command(name = "planner-cli", version, about)]
struct Cli {
    /// Path to TOML configuration file.
    #[arg(short, long, global = true, default_value = "planner.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

/// Available commands. Dates are `MM/DD/YY`, times are `HH:MM`.
#[derive(Debug, PartialEq, Eq, Subcommand)]
enum Command {
    /// Create the task table if it does not exist.
    Init,

    /// Add a task.
    Add {
        name: String,
        date: String,
        time: String,
        description: Option<String>,
    },

    /// List the tasks of one day in time order.
    List { date: String },

    /// Mark a task as completed.
    Done { name: String, date: String },

    /// Mark a task as not completed.
    Undone { name: String, date: String },

    /// Delete a task.
    Delete { name: String, date: String },

    /// Print a task's description (any date unless one is given).
    Describe { name: String, date: Option<String> },

    /// Print today's tasks.
    Today,

    /// Run the reminder loop until Ctrl-C.
    Watch,
}

fn print_tasks(tasks: &[Task]) {
    if tasks.is_empty() {
        println!("(no tasks)");
        return;
    }
    for task in tasks {
        let mark = if task.completed { "✔" } else { "✘" };
        println!("{}  {}  {}", task.time, mark, task.name);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // (A) 設定を読み、ログを初期化
    let config = PlannerConfig::load(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;
    let _log_guard = init_tracing(&config.logging);
    tracing::info!(config = %cli.config.display(), "planner starting");

    // (B) store / clock / notifier を組み立て、スキーマを用意（失敗してもログだけ）
    let app = AppBuilder::new(config).build()?;
    app.planner.initialize().await;

    // (C) コマンド実行
    match cli.command {
        Command::Init => {}
        Command::Add {
            name,
            date,
            time,
            description,
        } => {
            app.planner
                .add(&name, &date, &time, description.as_deref())
                .await
                .with_context(|| format!("could not add {name:?}"))?;
        }
        Command::List { date } => print_tasks(&app.planner.list(&date).await),
        Command::Done { name, date } => app.planner.set_completion(&name, &date, true).await,
        Command::Undone { name, date } => app.planner.set_completion(&name, &date, false).await,
        Command::Delete { name, date } => app.planner.delete(&name, &date).await,
        Command::Describe { name, date } => {
            let description = match date {
                Some(date) => app.planner.describe_on(&name, &date).await,
                None => app.planner.describe(&name).await,
            };
            println!("{}", description.unwrap_or_else(|| "No description.".to_string()));
        }
        Command::Today => println!("{}", app.planner.today_summary(app.clock.as_ref()).await),
        Command::Watch => {
            // (D) Ctrl-C まで通知ループを回し、止めてから join する
            let reminders = app.scanner.spawn();
            tokio::signal::ctrl_c()
                .await
                .context("waiting for ctrl-c")?;
            tracing::info!("shutting down");
            reminders.shutdown_and_join().await;
        }
    }

    Ok(())
}
