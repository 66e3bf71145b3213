use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

/// Structured log events for an intake session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LogEvent {
    SessionStarted {
        session_id: String,
        questionnaire: String,
        prompt: String,
    },
    AnswerRecorded {
        session_id: String,
        question: String,
        remaining: usize,
    },
    SubmissionRejected {
        session_id: String,
        missing: Vec<String>,
    },
    AdviceRequested {
        session_id: String,
        prompt: String,
        user_message_chars: usize,
    },
    AdviceReceived {
        session_id: String,
        response_chars: usize,
        duration_secs: f64,
    },
    AdviceFailed {
        session_id: String,
        error: String,
        duration_secs: f64,
    },
    ConfigurationMissing {
        message: String,
    },
}

impl LogEvent {
    /// Add a timestamp to serialize with the event
    fn with_timestamp(&self) -> serde_json::Value {
        let mut value = serde_json::to_value(self).unwrap_or_default();
        if let Some(obj) = value.as_object_mut() {
            obj.insert(
                "timestamp".to_string(),
                serde_json::Value::String(chrono::Utc::now().to_rfc3339()),
            );
        }
        value
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable format with colors
    #[default]
    Pretty,
    /// JSON lines format for machine consumption
    Json,
    /// Compact single-line format
    Compact,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            "compact" => Ok(LogFormat::Compact),
            _ => Err(format!("Unknown log format: {}", s)),
        }
    }
}

/// Logger for session events - handles both console output and file logging
pub struct Logger {
    format: LogFormat,
    file_writer: Option<Mutex<File>>,
    quiet: bool,
}

impl Logger {
    pub fn new(format: LogFormat) -> Self {
        Self {
            format,
            file_writer: None,
            quiet: false,
        }
    }

    /// A logger that writes nothing to the console
    pub fn quiet() -> Self {
        Self {
            format: LogFormat::Compact,
            file_writer: None,
            quiet: true,
        }
    }

    /// Create a logger with file output in addition to console
    pub fn with_file(format: LogFormat, log_path: &Path) -> std::io::Result<Self> {
        if let Some(parent) = log_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_path)?;

        Ok(Self {
            format,
            file_writer: Some(Mutex::new(file)),
            quiet: false,
        })
    }

    pub fn log(&self, event: &LogEvent) {
        // File output is always JSON
        if let Some(ref writer) = self.file_writer {
            if let Ok(mut file) = writer.lock() {
                let json = event.with_timestamp();
                let _ = writeln!(file, "{}", json);
            }
        }

        if self.quiet {
            return;
        }

        match self.format {
            LogFormat::Json => self.log_json(event),
            LogFormat::Pretty => self.log_pretty(event),
            LogFormat::Compact => self.log_compact(event),
        }
    }

    fn log_json(&self, event: &LogEvent) {
        if let Ok(json) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{}", json);
        }
    }

    fn log_pretty(&self, event: &LogEvent) {
        let mut stderr = std::io::stderr();
        match event {
            LogEvent::SessionStarted {
                questionnaire,
                prompt,
                ..
            } => {
                let _ = writeln!(
                    stderr,
                    "{} {} {}",
                    "->".dimmed(),
                    "Recovery Aid Finder".bold().bright_white(),
                    format!("({} questions, {} prompt)", questionnaire, prompt).dimmed()
                );
            }
            LogEvent::AnswerRecorded { .. } => {
                // The form itself shows progress
            }
            LogEvent::SubmissionRejected { missing, .. } => {
                let _ = writeln!(
                    stderr,
                    "{} {} unanswered: {}",
                    "⚠".bright_yellow(),
                    missing.len(),
                    missing.join(", ").bright_yellow()
                );
            }
            LogEvent::AdviceRequested { .. } => {
                let _ = writeln!(
                    stderr,
                    "{} {}",
                    "▶".bright_cyan(),
                    "Processing your input...".bright_cyan()
                );
            }
            LogEvent::AdviceReceived { duration_secs, .. } => {
                let _ = writeln!(
                    stderr,
                    "  {} Advice received ({:.1}s)",
                    "✓".bright_green(),
                    duration_secs
                );
            }
            LogEvent::AdviceFailed { error, .. } => {
                let _ = writeln!(
                    stderr,
                    "  {} {}",
                    "✗".bright_red(),
                    error.bright_red()
                );
            }
            LogEvent::ConfigurationMissing { message } => {
                let _ = writeln!(stderr, "{} {}", "✗".bright_red(), message.bright_red());
            }
        }
    }

    fn log_compact(&self, event: &LogEvent) {
        let mut stderr = std::io::stderr();
        let timestamp = chrono::Utc::now().format("%H:%M:%S");
        let msg = match event {
            LogEvent::SessionStarted {
                session_id,
                questionnaire,
                prompt,
            } => format!(
                "[{}] session:start:{} {}/{}",
                timestamp, session_id, questionnaire, prompt
            ),
            LogEvent::AnswerRecorded {
                session_id,
                question,
                remaining,
            } => format!(
                "[{}] answer:{}:{} remaining={}",
                timestamp, session_id, question, remaining
            ),
            LogEvent::SubmissionRejected {
                session_id,
                missing,
            } => format!(
                "[{}] submit:rejected:{} missing={}",
                timestamp,
                session_id,
                missing.join(",")
            ),
            LogEvent::AdviceRequested {
                session_id,
                user_message_chars,
                ..
            } => format!(
                "[{}] advice:request:{} chars={}",
                timestamp, session_id, user_message_chars
            ),
            LogEvent::AdviceReceived {
                session_id,
                response_chars,
                duration_secs,
            } => format!(
                "[{}] advice:done:{} chars={} {:.1}s",
                timestamp, session_id, response_chars, duration_secs
            ),
            LogEvent::AdviceFailed {
                session_id, error, ..
            } => format!("[{}] advice:error:{} {}", timestamp, session_id, error),
            LogEvent::ConfigurationMissing { message } => {
                format!("[{}] config:error {}", timestamp, message)
            }
        };
        let _ = writeln!(stderr, "{}", msg);
    }
}
