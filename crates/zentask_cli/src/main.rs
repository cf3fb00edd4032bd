//! Terminal front end for the ZenTask core.
//!
//! # Responsibility
//! - Wire configuration, store, advisor and engine together at startup.
//! - Enforce the loading gate: every mutation runs after `hydrate`.
//! - Deliver engine alerts to the terminal through the `AlertSink` seam.

use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use std::process::ExitCode;
use std::sync::Arc;
use uuid::Uuid;
use zentask_core::{
    default_log_level, init_logging, AlertSink, AppConfig, Category, DashboardStats, Priority,
    Task, TaskDraft, TaskService,
};

#[derive(Parser)]
#[command(name = "zentask", version, about = "Personal task tracking with optional AI planning")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List every task, newest first.
    List,
    /// Incomplete tasks due today.
    Today,
    /// Incomplete tasks due after today, soonest first.
    Upcoming,
    /// Completed tasks, newest first.
    Completed,
    /// Dashboard statistics.
    Stats,
    /// Add one task.
    Add {
        title: String,
        #[arg(long)]
        description: Option<String>,
        /// Due date as YYYY-MM-DD; defaults to today.
        #[arg(long)]
        due: Option<NaiveDate>,
        #[arg(long, default_value = "medium")]
        priority: Priority,
        #[arg(long, default_value = "personal")]
        category: Category,
    },
    /// Ask the advisor to split a title into subtasks and add them as a batch.
    Plan {
        title: String,
        /// Due date applied to every subtask; defaults to today.
        #[arg(long)]
        due: Option<NaiveDate>,
        #[arg(long, default_value = "medium")]
        priority: Priority,
        #[arg(long, default_value = "personal")]
        category: Category,
    },
    /// Toggle completion for one task.
    Done { id: Uuid },
    /// Delete one task.
    Rm { id: Uuid },
    /// Print a short motivational message for the pending count.
    Motivate,
}

/// Terminal alert sink; rollback notifications go to stderr.
struct StderrAlerts;

impl AlertSink for StderrAlerts {
    fn alert(&self, message: &str) {
        eprintln!("warning: {message}");
    }
}

fn print_tasks(tasks: &[Task]) {
    if tasks.is_empty() {
        println!("(no tasks)");
        return;
    }
    for task in tasks {
        let state = if task.completed { "x" } else { " " };
        println!(
            "[{state}] {}  {}  {}/{}  due {}",
            task.id, task.title, task.priority, task.category, task.due_date
        );
    }
}

fn print_stats(stats: &DashboardStats) {
    println!("total:           {}", stats.total);
    println!("completed:       {}", stats.completed);
    println!("pending:         {}", stats.pending);
    println!("pending high:    {}", stats.pending_high);
    println!("pending medium:  {}", stats.pending_medium);
    println!("pending low:     {}", stats.pending_low);
    println!("completion rate: {}%", stats.completion_rate_percent);
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::FAILURE;
        }
    };

    let log_dir = config
        .log_dir
        .clone()
        .unwrap_or_else(|| config.data_dir.join("logs"));
    let log_level = config
        .log_level
        .clone()
        .unwrap_or_else(|| default_log_level().to_string());
    if let Err(err) = init_logging(&log_level, &log_dir.to_string_lossy()) {
        // Logging is best-effort for the CLI; the command still runs.
        eprintln!("warning: logging disabled: {err}");
    }

    let service = TaskService::new(config.build_store(), Arc::new(StderrAlerts));
    let advisor = config.build_advisor();
    service.hydrate().await;

    let today = Local::now().date_naive();

    match cli.command {
        Command::List => print_tasks(&service.snapshot()),
        Command::Today => print_tasks(&zentask_core::today_tasks(&service.snapshot(), today)),
        Command::Upcoming => {
            print_tasks(&zentask_core::upcoming_tasks(&service.snapshot(), today))
        }
        Command::Completed => print_tasks(&zentask_core::completed_tasks(&service.snapshot())),
        Command::Stats => print_stats(&DashboardStats::compute(&service.snapshot())),
        Command::Add {
            title,
            description,
            due,
            priority,
            category,
        } => {
            let draft = TaskDraft {
                title,
                description,
                due_date: due.unwrap_or(today),
                priority,
                category,
            };
            match service.add_task(draft).await {
                Ok(id) => println!("added {id}"),
                Err(err) => {
                    eprintln!("error: {err}");
                    return ExitCode::FAILURE;
                }
            }
        }
        Command::Plan {
            title,
            due,
            priority,
            category,
        } => {
            let subtasks = advisor.suggest_subtasks(&title).await;
            if subtasks.is_empty() {
                eprintln!("error: no AI backend configured; set GEMINI_API_KEY to use plan");
                return ExitCode::FAILURE;
            }
            let drafts: Vec<TaskDraft> = subtasks
                .into_iter()
                .map(|subtask| TaskDraft {
                    title: subtask,
                    description: Some(format!("part of: {title}")),
                    due_date: due.unwrap_or(today),
                    priority,
                    category,
                })
                .collect();
            match service.add_many(drafts).await {
                Ok(ids) => {
                    for id in ids {
                        println!("added {id}");
                    }
                }
                Err(err) => {
                    eprintln!("error: {err}");
                    return ExitCode::FAILURE;
                }
            }
        }
        Command::Done { id } => service.toggle_completion(id).await,
        Command::Rm { id } => service.delete_task(id).await,
        Command::Motivate => {
            let pending = DashboardStats::compute(&service.snapshot()).pending;
            println!("{}", advisor.motivational_message(pending).await);
        }
    }

    ExitCode::SUCCESS
}
