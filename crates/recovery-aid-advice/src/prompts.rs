use std::fmt;
use std::str::FromStr;

use recovery_aid_intake::fields::*;
use recovery_aid_intake::values::DOMS_BETTER;
use recovery_aid_intake::IntakeRecord;
use serde::{Deserialize, Serialize};

/// System instruction for the baseline prompt
pub const BASELINE_INSTRUCTIONS: &str = concat!(
    "You are a highly trained virtual physiotherapist specializing in fitness and sports-related injuries. ",
    "Your role is to provide scientifically sound, user-centric recovery recommendations based on evidence-based practices. ",
    "Adhere to physiotherapy principles and prioritize user safety. Follow the SOAP methodology: Gather subjective inputs, analyze objectively, assess probable issues, and provide a plan. ",
    "Your advice should align with modern recovery frameworks, rather than outdated methods like RICE. ",
    "Educate users on why the injury occurred, how to recover, and how to prevent future issues. Avoid medical diagnoses but indicate red-flag symptoms that require professional attention. ",
    "Prioritize movement-based solutions (mobility and strength/stability exercises) as the primary intervention. Modify exercise intensity or volume if needed. Use rest only as a last resort and recommend it alongside professional consultation. ",
    "For all recommendations, include specific exercises, sets, reps, and video links where applicable. Dynamically adapt to the user's inputs, ensuring personalized and actionable advice for recovery and prevention. ",
    "Responses should follow this format:\n",
    "Recovery Recommendation\n",
    "Immediate Recovery Steps:\n",
    "1. Provide the best mobility or stability exercise for immediate relief: name and explain it with clear instructions (e.g., 'Hip flexor stretch'). Include sets, reps, and a video link if applicable.\n",
    "2. Provide the best mobility or stability exercise for immediate relief: name and explain it with clear instructions (e.g., 'Hip flexor stretch'). Include sets, reps, and a video link if applicable.\n",
    "Preventive Strategies:\n",
    "1. Suggest an additional actionable step (e.g., regression, activation, or deloading strategies) tailored to the user's input.\n",
    "2. Suggest a strength or stability exercise addressing the root cause: name and explain it with sets, reps, and an explanation of how it prevents future injuries. Include a video link if applicable.\n",
    "3. Provide guidance on improving movement mechanics or technique for long-term prevention, with examples or regressions as necessary.\n",
);

/// System instruction for the movement-screen prompt
pub const MOVEMENT_SCREEN_INSTRUCTIONS: &str = concat!(
    "You are a sports physiotherapist running a first-contact movement screen for an athlete who filled in an injury intake form. ",
    "Before giving any exercise advice, review the reported warning symptoms. ",
    "If any of them suggest fracture, nerve involvement, infection or a recent traumatic injury, say so in your opening sentence and advise an in-person assessment before training continues. ",
    "Otherwise relate the reported movement triggers to the likely tissue under load, without naming a diagnosis. ",
    "Keep the plan short: the athlete should be able to follow it in the next session. ",
    "Favour graded exposure to the painful movement over complete rest, and state a clear stop rule based on the pain score.\n",
    "Answer using these headings:\n",
    "Screening Summary\n",
    "When To See A Clinician:\n",
    "Load Management For The Next 7 Days:\n",
    "- One regression of each painful movement, with sets, reps and a target effort.\n",
    "- One exercise that rebuilds capacity around the affected joint.\n",
    "Return To Full Training:\n",
    "- The criteria that show the athlete is ready, in plain language.\n",
);

/// Versioned prompt text: one instruction constant plus its user template
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PromptVariant {
    #[default]
    Baseline,
    MovementScreen,
}

impl PromptVariant {
    pub const ALL: [PromptVariant; 2] = [PromptVariant::Baseline, PromptVariant::MovementScreen];

    pub fn as_str(&self) -> &'static str {
        match self {
            PromptVariant::Baseline => "baseline",
            PromptVariant::MovementScreen => "movement-screen",
        }
    }

    pub fn instructions(&self) -> &'static str {
        match self {
            PromptVariant::Baseline => BASELINE_INSTRUCTIONS,
            PromptVariant::MovementScreen => MOVEMENT_SCREEN_INSTRUCTIONS,
        }
    }

    /// Render the user message for a submitted record.
    ///
    /// Fields that are not in the record render as empty strings and
    /// keep their line.
    pub fn render_user_message(&self, record: &IntakeRecord) -> String {
        match self {
            PromptVariant::Baseline => render_baseline(record),
            PromptVariant::MovementScreen => render_movement_screen(record),
        }
    }
}

impl fmt::Display for PromptVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PromptVariant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "baseline" | "a" | "v1" => Ok(PromptVariant::Baseline),
            "movement-screen" | "movement_screen" | "movement" | "b" | "v2" => {
                Ok(PromptVariant::MovementScreen)
            }
            _ => Err(format!("Unknown prompt: {}", s)),
        }
    }
}

fn improved_with_movement(record: &IntakeRecord) -> &'static str {
    if record.field(DOMS_IMPROVEMENT) == DOMS_BETTER {
        "Yes"
    } else {
        "No"
    }
}

/// `value (detail)`, or just `value` when there is no detail
fn with_detail(value: String, detail: String) -> String {
    if detail.is_empty() {
        value
    } else {
        format!("{} ({})", value, detail)
    }
}

fn render_baseline(record: &IntakeRecord) -> String {
    format!(
        "Hello {name},\n\
         Based on your input, you are experiencing {pain_type} in your {body_part}.\n\
         - Specific area: {specific_part}\n\
         - Pain severity on a scale of 1 to 10: {severity}\n\
         - Onset of pain: {duration}\n\
         - Activity context: {activity}\n\
         - Movement description: {movement}\n\
         - Relief factors: {relief} (Effectiveness: {effectiveness})\n\
         - DOMS differentiation: {localization} (Improved with movement: {improved})\n\
         - Red flags: {red_flags}\n\
         - Additional context: {notes}",
        name = record.field(USER_NAME),
        pain_type = record.field(PAIN_TYPE),
        body_part = record.field(BODY_PART),
        specific_part = record.field(SPECIFIC_PART),
        severity = record.field(PAIN_SEVERITY),
        duration = record.field(PAIN_DURATION),
        activity = record.field(ACTIVITY_CONTEXT),
        movement = record.field(ACTIVITY_DESCRIPTION),
        relief = record.field(RELIEF_METHODS),
        effectiveness = record.field(RELIEF_EFFECTIVENESS),
        localization = record.field(PAIN_LOCALIZATION),
        improved = improved_with_movement(record),
        red_flags = record.field(RED_FLAGS),
        notes = record.field(ADDITIONAL_NOTES),
    )
}

fn render_movement_screen(record: &IntakeRecord) -> String {
    format!(
        "Athlete: {name}\n\
         Reported warning symptoms: {red_flags}\n\
         Painful region: {body_part}\n\
         - Area: {area}\n\
         - Movement triggers: {triggers}\n\
         - Pain quality: {pain_type}\n\
         - Pain score (1-10): {severity}\n\
         - Pain occurs: {occurrence}\n\
         - Started: {duration}\n\
         - Sport or activity: {activity}\n\
         - Aggravating movement: {movement}\n\
         - What helps: {relief} (Effectiveness: {effectiveness})\n\
         - Spread: {localization} (Improved with movement: {improved})\n\
         - Training impact: {impact}\n\
         - Injury history: {history}\n\
         - Notes: {notes}",
        name = record.field(USER_NAME),
        red_flags = with_detail(record.field(RED_FLAGS), record.field(OTHER_RED_FLAGS)),
        body_part = record.field(BODY_PART),
        area = with_detail(record.field(SPECIFIC_PART), record.field(OTHER_PART)),
        triggers = record.field(MOVEMENT_TRIGGERS),
        pain_type = record.field(PAIN_TYPE),
        severity = record.field(PAIN_SEVERITY),
        occurrence = with_detail(
            record.field(PAIN_OCCURRENCE),
            record.field(OTHER_PAIN_OCCURRENCE)
        ),
        duration = record.field(PAIN_DURATION),
        activity = record.field(ACTIVITY_CONTEXT),
        movement = record.field(ACTIVITY_DESCRIPTION),
        relief = record.field(RELIEF_METHODS),
        effectiveness = record.field(RELIEF_EFFECTIVENESS),
        localization = record.field(PAIN_LOCALIZATION),
        improved = improved_with_movement(record),
        impact = record.field(FUNCTIONAL_IMPACT),
        history = with_detail(record.field(PREVIOUS_INJURIES), record.field(INJURY_DETAILS)),
        notes = record.field(ADDITIONAL_NOTES),
    )
}
