use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;
use serde::Serialize;

use recovery_aid_core::{IntakeSession, SessionError};
use recovery_aid_intake::AnswerSet;

use crate::output::{print_advice, print_request, print_questions};

/// Result of a non-interactive submission, for `--json`
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SubmitOutcome {
    Advice { advice: String },
    Incomplete { missing: Vec<String> },
    Failed { error: String },
}

impl SubmitOutcome {
    pub fn exit_code(&self) -> u8 {
        match self {
            SubmitOutcome::Advice { .. } => 0,
            SubmitOutcome::Incomplete { .. } => 2,
            SubmitOutcome::Failed { .. } => 1,
        }
    }
}

pub fn read_answers(path: &Path) -> Result<AnswerSet> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

pub async fn handle_submit_command(
    mut session: IntakeSession,
    answers_path: &Path,
    dry_run: bool,
    json: bool,
) -> Result<u8> {
    let answers = read_answers(answers_path)?;
    session.load_answers(&answers)?;

    if dry_run {
        match session.preview() {
            Ok(request) if json => println!("{}", serde_json::to_string_pretty(&request)?),
            Ok(request) => print_request(&request),
            Err(e) => return report(outcome_for(e), json),
        }
        return Ok(0);
    }

    let outcome = match session.submit().await {
        Ok(response) => {
            if !json {
                print_advice(response);
                return Ok(0);
            }
            SubmitOutcome::Advice {
                advice: response.text.clone(),
            }
        }
        Err(e) => outcome_for(e),
    };
    report(outcome, json)
}

/// Print the applicable questions, optionally for a partial answers file
pub fn handle_questions_command(
    mut session: IntakeSession,
    answers_path: Option<&Path>,
    json: bool,
) -> Result<()> {
    if let Some(path) = answers_path {
        session.load_answers(&read_answers(path)?)?;
    }

    let snapshot = session.snapshot();
    if json {
        println!("{}", serde_json::to_string_pretty(&snapshot.applicable)?);
    } else {
        print_questions(&snapshot.applicable);
        if !snapshot.missing.is_empty() {
            eprintln!();
            eprintln!(
                "{} {} still to answer",
                "->".dimmed(),
                snapshot.missing.len()
            );
        }
    }
    Ok(())
}

fn outcome_for(error: SessionError) -> SubmitOutcome {
    match error.missing_questions() {
        Some(missing) => SubmitOutcome::Incomplete {
            missing: missing.to_vec(),
        },
        None => SubmitOutcome::Failed {
            error: error.to_string(),
        },
    }
}

fn report(outcome: SubmitOutcome, json: bool) -> Result<u8> {
    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        match &outcome {
            SubmitOutcome::Advice { advice } => println!("{}", advice),
            SubmitOutcome::Incomplete { missing } => eprintln!(
                "{} Please answer the remaining questions: {}",
                "✗".bright_red(),
                missing.join(", ")
            ),
            SubmitOutcome::Failed { error } => {
                eprintln!("{} {}", "✗".bright_red(), error.bright_red())
            }
        }
    }
    Ok(outcome.exit_code())
}
