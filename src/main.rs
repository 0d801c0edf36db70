//! Tutor - interactive lesson service
//!
//! CLI entry point.

use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use tutor::descriptor::load_lessons_file;
use tutor::events::NullBoundary;
use tutor::process::ShellRunner;
use tutor::service::LessonService;
use tutor::storage::FileSettingsStore;
use tutor::{Config, DescriptorSet};

/// Tutor - interactive lesson service
#[derive(Parser)]
#[command(name = "tutor")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Lessons file to load (overrides config and default locations)
    #[arg(long, global = true)]
    lessons_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List lessons available to a client
    Lessons {
        /// Client identifier (e.g. "console", "shell")
        client: String,
        /// List completed lessons instead of unlocked ones
        #[arg(long)]
        known: bool,
        /// Output as JSON
        #[arg(long, short)]
        json: bool,
        /// Suppress output
        #[arg(long, short)]
        quiet: bool,
    },

    /// Show a task's prompt and input spec
    Describe {
        /// Lesson name
        lesson: String,
        /// Task id
        task: String,
        /// Output as JSON
        #[arg(long, short)]
        json: bool,
        /// Suppress output
        #[arg(long, short)]
        quiet: bool,
    },

    /// Attempt a task with the given input
    Attempt {
        /// Lesson name
        lesson: String,
        /// Task id
        task: String,
        /// Input text; read from stdin when omitted
        #[arg(long, short)]
        input: Option<String>,
        /// Output as JSON
        #[arg(long, short)]
        json: bool,
        /// Suppress output
        #[arg(long, short)]
        quiet: bool,
    },

    /// Deliver a named external event
    Notify {
        /// Event name
        event: String,
        /// Output as JSON
        #[arg(long, short)]
        json: bool,
        /// Suppress output
        #[arg(long, short)]
        quiet: bool,
    },

    /// List registered clues
    Clues {
        /// Output as JSON
        #[arg(long, short)]
        json: bool,
        /// Suppress output
        #[arg(long, short)]
        quiet: bool,
    },

    /// Register a clue
    RegisterClue {
        /// Clue kind ("text" or "image-path")
        kind: String,
        /// Clue content
        content: String,
        /// Output as JSON
        #[arg(long, short)]
        json: bool,
        /// Suppress output
        #[arg(long, short)]
        quiet: bool,
    },
}

type Service = LessonService<FileSettingsStore, ShellRunner, NullBoundary>;

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("tutor error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Run the CLI and return the exit code.
fn run() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let service = build_service(cli.lessons_file)?;

    match cli.command {
        Commands::Lessons {
            client,
            known,
            json,
            quiet,
        } => run_lessons(service, &client, known, json, quiet),
        Commands::Describe {
            lesson,
            task,
            json,
            quiet,
        } => run_describe(service, &lesson, &task, json, quiet),
        Commands::Attempt {
            lesson,
            task,
            input,
            json,
            quiet,
        } => run_attempt(service, &lesson, &task, input, json, quiet),
        Commands::Notify { event, json, quiet } => run_notify(service, &event, json, quiet),
        Commands::Clues { json, quiet } => run_clues(service, json, quiet),
        Commands::RegisterClue {
            kind,
            content,
            json,
            quiet,
        } => run_register_clue(service, &kind, &content, json, quiet),
    }
}

/// Build the service from the config and the first readable lessons file.
fn build_service(cmdline: Option<PathBuf>) -> Result<Service, Box<dyn std::error::Error>> {
    let config = Config::load()?;

    let mut lessons = Vec::new();
    for candidate in config.lessons_file_candidates(cmdline) {
        if candidate.exists() {
            lessons = load_lessons_file(&candidate)?;
            break;
        }
    }
    if lessons.is_empty() {
        tracing::warn!("no lessons file found; starting with an empty catalog");
    }

    let store = FileSettingsStore::new()?;
    Ok(LessonService::new(
        config,
        DescriptorSet::new(lessons),
        store,
        ShellRunner::new(),
        NullBoundary,
    ))
}

/// Convert a success boolean to an exit code.
fn success_to_exit_code(success: bool) -> ExitCode {
    if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn run_lessons(
    service: Service,
    client: &str,
    known: bool,
    json: bool,
    quiet: bool,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    use tutor::cli::lessons::{LessonsCommand, LessonsOptions};

    let cmd = LessonsCommand::new(service);
    let options = LessonsOptions { json, quiet, known };

    let output = cmd.run(client, &options);
    let formatted = cmd.format_output(&output, &options);

    if !formatted.is_empty() {
        println!("{}", formatted);
    }

    Ok(success_to_exit_code(output.success))
}

fn run_describe(
    service: Service,
    lesson: &str,
    task: &str,
    json: bool,
    quiet: bool,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    use tutor::cli::describe::{DescribeCommand, DescribeOptions};

    let cmd = DescribeCommand::new(service);
    let options = DescribeOptions { json, quiet };

    let output = cmd.run(lesson, task, &options);
    let formatted = cmd.format_output(&output, &options);

    if !formatted.is_empty() {
        println!("{}", formatted);
    }

    Ok(success_to_exit_code(output.success))
}

fn run_attempt(
    service: Service,
    lesson: &str,
    task: &str,
    input: Option<String>,
    json: bool,
    quiet: bool,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    use tutor::cli::attempt::{AttemptCommand, AttemptOptions};

    let input = match input {
        Some(text) => text,
        None => {
            let mut buffer = String::new();
            std::io::stdin().read_to_string(&mut buffer)?;
            buffer.trim_end_matches('\n').to_string()
        }
    };

    let cmd = AttemptCommand::new(service);
    let options = AttemptOptions { json, quiet };

    let output = cmd.run(lesson, task, &input, &options);
    let formatted = cmd.format_output(&output, &options);

    if !formatted.is_empty() {
        println!("{}", formatted);
    }

    Ok(success_to_exit_code(output.success))
}

fn run_notify(
    service: Service,
    event: &str,
    json: bool,
    quiet: bool,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    use tutor::cli::notify::{NotifyCommand, NotifyOptions};

    let cmd = NotifyCommand::new(service);
    let options = NotifyOptions { json, quiet };

    let output = cmd.run(event, &options);
    let formatted = cmd.format_output(&output, &options);

    if !formatted.is_empty() {
        println!("{}", formatted);
    }

    Ok(success_to_exit_code(output.success))
}

fn run_clues(
    service: Service,
    json: bool,
    quiet: bool,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    use tutor::cli::clues::{CluesCommand, CluesOptions};

    let cmd = CluesCommand::new(service);
    let options = CluesOptions { json, quiet };

    let output = cmd.run_list(&options);
    let formatted = cmd.format_output(&output, &options);

    if !formatted.is_empty() {
        println!("{}", formatted);
    }

    Ok(success_to_exit_code(output.success))
}

fn run_register_clue(
    service: Service,
    kind: &str,
    content: &str,
    json: bool,
    quiet: bool,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    use tutor::cli::clues::{CluesCommand, CluesOptions};

    let cmd = CluesCommand::new(service);
    let options = CluesOptions { json, quiet };

    let output = cmd.run_register(kind, content, &options);
    let formatted = cmd.format_output(&output, &options);

    if !formatted.is_empty() {
        println!("{}", formatted);
    }

    Ok(success_to_exit_code(output.success))
}
