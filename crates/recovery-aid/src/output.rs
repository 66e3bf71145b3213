use colored::Colorize;

use recovery_aid_advice::{AdviceRequest, AdviceResponse};
use recovery_aid_core::QuestionView;
use recovery_aid_intake::AnswerKind;

pub fn print_advice(response: &AdviceResponse) {
    eprintln!();
    eprintln!("{}", "Here is your recovery advice:".bright_green().bold());
    eprintln!();
    println!("{}", response.text);
}

/// Print what would be sent, without sending it
pub fn print_request(request: &AdviceRequest) {
    eprintln!("{} {}", "=== Dry Run ===".bold(), format!("({} prompt)", request.prompt).dimmed());
    println!("--- system ---");
    println!("{}", request.system);
    println!("--- user ---");
    println!("{}", request.user);
}

pub fn print_questions(questions: &[QuestionView]) {
    let mut section = "";
    for question in questions {
        if question.section != section {
            section = question.section;
            println!();
            println!("{}", section.bold());
        }

        let marker = if question.required { "*" } else { " " };
        println!(
            "  {} {} {}",
            marker.bright_red(),
            question.id.bright_cyan(),
            describe_kind(&question.kind).dimmed()
        );
        println!("      {}", question.text);
        if !question.options.is_empty() {
            println!("      {}", question.options.join(" | ").dimmed());
        }
        if let Some(ref answer) = question.answer {
            println!("      {} {}", "=".bright_green(), answer.to_prompt_string());
        }
    }
}

fn describe_kind(kind: &AnswerKind) -> String {
    match kind {
        AnswerKind::SingleChoice => "(choose one)".to_string(),
        AnswerKind::MultiChoice => "(choose any)".to_string(),
        AnswerKind::FreeText { .. } => "(text)".to_string(),
        AnswerKind::Scale { min, max, .. } => format!("({}-{})", min, max),
    }
}
