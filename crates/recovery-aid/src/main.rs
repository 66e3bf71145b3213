mod api;
mod app;
mod config;
mod interview;
mod output;
mod serve;
mod submit;

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};

use recovery_aid_advice::PromptVariant;
use recovery_aid_intake::QuestionnaireVariant;
use recovery_aid_logging::{init_tracing, LogFormat, Logger};

use crate::app::AppContext;
use crate::config::{Overrides, Settings};
use crate::interview::AskOptions;

#[derive(Parser, Debug)]
#[command(
    name = "recovery-aid",
    about = "Questionnaire-driven recovery advice for fitness injuries",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Working directory (default: current directory)
    #[arg(short = 'd', long, global = true)]
    working_dir: Option<PathBuf>,

    /// Question set to use
    #[arg(long, value_enum, global = true)]
    questionnaire: Option<VariantChoice>,

    /// Prompt variant to use
    #[arg(long, value_enum, global = true)]
    prompt: Option<VariantChoice>,

    /// Log output format
    #[arg(long, value_enum, default_value = "pretty", global = true)]
    log_format: LogFormatChoice,

    /// Also append session events to this file as JSON lines
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// Write diagnostics to a daily log file in this directory instead of stderr
    #[arg(long, global = true)]
    trace_dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Fill in the questionnaire interactively (default)
    Ask {
        /// Print the request instead of sending it
        #[arg(long)]
        dry_run: bool,

        /// Save the answers as JSON before submitting
        #[arg(long)]
        answers_out: Option<PathBuf>,
    },

    /// Submit a JSON answers file without prompting
    Submit {
        /// Path to the answers file
        #[arg(short, long)]
        answers: PathBuf,

        /// Print the request instead of sending it
        #[arg(long)]
        dry_run: bool,

        /// Output the outcome as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the questions that apply
    Questions {
        /// Evaluate against a (partial) answers file
        #[arg(short, long)]
        answers: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Serve the questionnaire as a JSON API
    Serve {
        /// Port for the API server
        #[arg(long, default_value = "3100")]
        port: u16,

        /// Seconds a session may sit untouched before it is dropped
        #[arg(long, default_value = "3600")]
        session_ttl: u64,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum VariantChoice {
    Baseline,
    MovementScreen,
}

impl From<VariantChoice> for QuestionnaireVariant {
    fn from(choice: VariantChoice) -> Self {
        match choice {
            VariantChoice::Baseline => QuestionnaireVariant::Baseline,
            VariantChoice::MovementScreen => QuestionnaireVariant::MovementScreen,
        }
    }
}

impl From<VariantChoice> for PromptVariant {
    fn from(choice: VariantChoice) -> Self {
        match choice {
            VariantChoice::Baseline => PromptVariant::Baseline,
            VariantChoice::MovementScreen => PromptVariant::MovementScreen,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogFormatChoice {
    Pretty,
    Json,
    Compact,
}

impl From<LogFormatChoice> for LogFormat {
    fn from(choice: LogFormatChoice) -> Self {
        match choice {
            LogFormatChoice::Pretty => LogFormat::Pretty,
            LogFormatChoice::Json => LogFormat::Json,
            LogFormatChoice::Compact => LogFormat::Compact,
        }
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let log_format: LogFormat = cli.log_format.into();
    let _guard = init_tracing("warn", log_format, cli.trace_dir.as_deref());

    let working_dir = match cli.working_dir {
        Some(ref dir) => dir.clone(),
        None => std::env::current_dir().context("Failed to get current directory")?,
    };

    let overrides = Overrides {
        questionnaire: cli.questionnaire.map(Into::into),
        prompt: cli.prompt.map(Into::into),
    };
    let settings = Settings::load(&working_dir, overrides)?;

    let logger = match cli.log_file {
        Some(ref path) => Logger::with_file(log_format, path)
            .with_context(|| format!("Failed to open log file {}", path.display()))?,
        None => Logger::new(log_format),
    };

    let command = cli.command.unwrap_or(Commands::Ask {
        dry_run: false,
        answers_out: None,
    });

    let app = AppContext::new(settings, Arc::new(logger));

    match command {
        Commands::Ask {
            dry_run,
            answers_out,
        } => {
            let options = AskOptions {
                dry_run,
                answers_out,
            };
            interview::run_interview(app.new_session(None, None), options).await?;
        }
        Commands::Submit {
            answers,
            dry_run,
            json,
        } => {
            let code =
                submit::handle_submit_command(app.new_session(None, None), &answers, dry_run, json)
                    .await?;
            return Ok(ExitCode::from(code));
        }
        Commands::Questions { answers, json } => {
            submit::handle_questions_command(app.new_session(None, None), answers.as_deref(), json)?;
        }
        Commands::Serve { port, session_ttl } => {
            serve::handle_serve_command(app, port, Duration::from_secs(session_ttl)).await?;
        }
    }

    Ok(ExitCode::SUCCESS)
}
