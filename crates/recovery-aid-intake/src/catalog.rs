//! The two built-in injury questionnaires.

use std::fmt;
use std::str::FromStr;

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};

use crate::engine::Questionnaire;
use crate::question::{OptionGroup, Question};

/// Question ids, shared with the prompt templates
pub mod fields {
    pub const USER_NAME: &str = "user_name";
    pub const BODY_PART: &str = "body_part";
    pub const SPECIFIC_PART: &str = "specific_part";
    pub const OTHER_PART: &str = "other_part";
    pub const MOVEMENT_TRIGGERS: &str = "movement_triggers";
    pub const PAIN_TYPE: &str = "pain_type";
    pub const CLICKING_WITH_PAIN: &str = "clicking_with_pain";
    pub const PAIN_SEVERITY: &str = "pain_severity";
    pub const PAIN_OCCURRENCE: &str = "pain_occurrence";
    pub const OTHER_PAIN_OCCURRENCE: &str = "other_pain_occurrence";
    pub const PAIN_DURATION: &str = "pain_duration";
    pub const ACTIVITY_CONTEXT: &str = "activity_context";
    pub const ACTIVITY_DESCRIPTION: &str = "activity_description";
    pub const RELIEF_METHODS: &str = "relief_methods";
    pub const RELIEF_EFFECTIVENESS: &str = "relief_effectiveness";
    pub const PAIN_LOCALIZATION: &str = "pain_localization";
    pub const DOMS_IMPROVEMENT: &str = "doms_improvement";
    pub const FUNCTIONAL_IMPACT: &str = "functional_impact";
    pub const RED_FLAGS: &str = "red_flags";
    pub const OTHER_RED_FLAGS: &str = "other_red_flags";
    pub const PREVIOUS_INJURIES: &str = "previous_injuries";
    pub const INJURY_DETAILS: &str = "injury_details";
    pub const ADDITIONAL_NOTES: &str = "additional_notes";
}

use fields::*;

/// Option values the prompt templates and tests refer to
pub mod values {
    pub const UPPER_BACK: &str = "Upper Back (Traps, Scapulae, Lats)";
    pub const LOWER_BACK: &str = "Lower Back (Center, Left, Right, All Low Back)";
    pub const ARM: &str = "Arm (Biceps, Triceps, Forearm)";
    pub const THIGH: &str = "Thigh (Quadriceps, Hamstrings, IT Band, Adductors, Abductors)";
    pub const LOWER_LEG: &str = "Lower Leg (Calf, Shin)";
    pub const FOOT_ANKLE: &str = "Foot & Ankle (Achilles, Heel, Arch)";

    pub const CLICKING: &str = "Clicking/popping sound (with or without pain)";
    pub const OTHER_OCCURRENCE: &str = "Other (specify)";
    pub const OTHER_RED_FLAG: &str = "Other unusual symptoms";
    pub const LOCALIZED: &str = "Localized to a specific joint or spot";
    pub const GENERALIZED: &str = "Generalized across a muscle group";
    pub const DOMS_BETTER: &str = "Yes, it feels better.";
    pub const NOT_APPLICABLE: &str = "Not applicable";
}

use values::*;

const BODY_PARTS: &[&str] = &[
    "Head & Neck",
    "Shoulder",
    UPPER_BACK,
    LOWER_BACK,
    ARM,
    "Hand & Wrist",
    "Elbow",
    "Hip & Groin",
    THIGH,
    "Glutes",
    "Knee",
    LOWER_LEG,
    FOOT_ANKLE,
];

const SPECIFIC_AREAS: &[OptionGroup] = &[
    OptionGroup {
        members: &[UPPER_BACK],
        options: &["Traps", "Scapulae", "Lats", "Other"],
    },
    OptionGroup {
        members: &[LOWER_BACK],
        options: &["Center", "Left", "Right", "All Low Back"],
    },
    OptionGroup {
        members: &[ARM],
        options: &["Biceps", "Triceps", "Forearm"],
    },
    OptionGroup {
        members: &[THIGH],
        options: &["Quadriceps", "Hamstrings", "IT Band", "Adductors", "Abductors"],
    },
    OptionGroup {
        members: &[LOWER_LEG],
        options: &["Calf", "Shin"],
    },
    OptionGroup {
        members: &[FOOT_ANKLE],
        options: &["Achilles", "Heel", "Arch"],
    },
];

const MOVEMENT_TRIGGER_GROUPS: &[OptionGroup] = &[
    // Lower-body joints
    OptionGroup {
        members: &["Hip & Groin", "Knee", FOOT_ANKLE],
        options: &[
            "Squatting",
            "Lunging",
            "Running",
            "Jumping/landing",
            "Climbing stairs",
            "Single-leg balance",
        ],
    },
    // Upper-body and throwing joints
    OptionGroup {
        members: &["Shoulder", "Elbow", "Hand & Wrist"],
        options: &[
            "Overhead pressing",
            "Throwing",
            "Pushing",
            "Pulling",
            "Gripping",
            "Racket swing",
        ],
    },
];

const PAIN_TYPES: &[&str] = &[
    "Sharp pain",
    "Dull ache",
    "Stiffness",
    "Swelling",
    "Tightness",
    "Tingling/numbness",
    "Burning sensation",
    "Throbbing",
    "Shooting pain",
    "Cramping",
    "Weakness",
    CLICKING,
];

const YES_NO: &[&str] = &["Yes", "No"];

/// The two question sets the form ships with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuestionnaireVariant {
    /// The standard recovery form
    #[default]
    Baseline,
    /// Adds movement triggers keyed on the body part, drops the clicking follow-up
    MovementScreen,
}

impl QuestionnaireVariant {
    pub const ALL: [QuestionnaireVariant; 2] = [
        QuestionnaireVariant::Baseline,
        QuestionnaireVariant::MovementScreen,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionnaireVariant::Baseline => "baseline",
            QuestionnaireVariant::MovementScreen => "movement-screen",
        }
    }

    /// The shared, validated questionnaire for this variant
    pub fn questionnaire(&self) -> &'static Questionnaire {
        match self {
            QuestionnaireVariant::Baseline => &*BASELINE,
            QuestionnaireVariant::MovementScreen => &*MOVEMENT_SCREEN,
        }
    }
}

impl fmt::Display for QuestionnaireVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QuestionnaireVariant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "baseline" | "a" | "v1" => Ok(QuestionnaireVariant::Baseline),
            "movement-screen" | "movement_screen" | "movement" | "b" | "v2" => {
                Ok(QuestionnaireVariant::MovementScreen)
            }
            _ => Err(format!("Unknown questionnaire: {}", s)),
        }
    }
}

lazy_static! {
    static ref BASELINE: Questionnaire = Questionnaire::new("baseline", build(false))
        .expect("baseline questions only reference earlier questions");
    static ref MOVEMENT_SCREEN: Questionnaire =
        Questionnaire::new("movement-screen", build(true))
            .expect("movement-screen questions only reference earlier questions");
}

const STEP_WELCOME: &str = "Welcome";
const STEP_1: &str = "Step 1: Where do you feel discomfort or pain?";
const STEP_2: &str = "Step 2: How would you describe the pain or discomfort?";
const STEP_3: &str = "Step 3: Rate the severity of your pain (1-10)";
const STEP_4: &str = "Step 4: When does the pain occur?";
const STEP_5: &str = "Step 5: Describe the activity or movement that caused or worsens your discomfort.";
const STEP_6: &str = "Step 6: Have you found anything that reduces the pain or discomfort?";
const STEP_7: &str = "Step 7: Is this general soreness or localized pain?";
const STEP_8: &str = "Step 8: How is the pain affecting your ability to perform daily tasks or workouts?";
const STEP_9: &str = "Step 9: Have you experienced any of the following symptoms?";
const STEP_10: &str = "Step 10: Have you had any similar injuries in the past?";
const STEP_11: &str = "Step 11: Anything else you'd like us to know?";

fn build(movement_screen: bool) -> Vec<Question> {
    let mut questions = vec![
        Question::text(USER_NAME, STEP_WELCOME, "Please enter your name:"),
        Question::single_choice(BODY_PART, STEP_1, "Choose a body part:", BODY_PARTS),
        Question::single_choice(SPECIFIC_PART, STEP_1, "Specify the area:", &[])
            .keyed_on(BODY_PART, SPECIFIC_AREAS),
        Question::text(OTHER_PART, STEP_1, "Please specify the body part:")
            .when_answer_is(SPECIFIC_PART, "Other"),
    ];

    if movement_screen {
        questions.push(
            Question::multi_choice(
                MOVEMENT_TRIGGERS,
                STEP_1,
                "Which movements bring on the pain? Select all that apply:",
                &[],
            )
            .keyed_on(BODY_PART, MOVEMENT_TRIGGER_GROUPS),
        );
    }

    questions.push(Question::multi_choice(
        PAIN_TYPE,
        STEP_2,
        "Select all that apply:",
        PAIN_TYPES,
    ));

    if !movement_screen {
        questions.push(
            Question::single_choice(
                CLICKING_WITH_PAIN,
                STEP_2,
                "Is the clicking/popping sound accompanied by pain?",
                YES_NO,
            )
            .when_answer_includes(PAIN_TYPE, CLICKING),
        );
    }

    questions.extend([
        Question::scale(PAIN_SEVERITY, STEP_3, "Pain severity:", 1, 10, 5).with_help(
            "1 = Barely noticeable, 5 = Interferes with daily activities, \
             10 = Unbearable, requiring immediate attention.",
        ),
        Question::multi_choice(
            PAIN_OCCURRENCE,
            STEP_4,
            "Select all that apply:",
            &[
                "During exercise",
                "After exercise",
                "All the time",
                "When waking up",
                "At night",
                OTHER_OCCURRENCE,
            ],
        ),
        Question::text(OTHER_PAIN_OCCURRENCE, STEP_4, "Please specify:")
            .when_answer_includes(PAIN_OCCURRENCE, OTHER_OCCURRENCE),
        Question::single_choice(
            PAIN_DURATION,
            STEP_4,
            "When did the pain start?",
            &[
                "<24 hours ago",
                "1–3 days ago",
                "1 week ago",
                "More than 1 week ago",
            ],
        ),
        Question::single_choice(
            ACTIVITY_CONTEXT,
            STEP_5,
            "What activity caused the discomfort?",
            &[
                "Running",
                "Cycling",
                "Lifting weights",
                "Tennis/Pádel",
                "General sports",
                "Office work",
                "Other",
            ],
        ),
        Question::text_area(
            ACTIVITY_DESCRIPTION,
            STEP_5,
            "Describe the specific movement (e.g., 'Squatting with 80kg').",
        )
        .optional(),
        Question::multi_choice(
            RELIEF_METHODS,
            STEP_6,
            "Select all that apply:",
            &[
                "Rest",
                "Ice/Heat",
                "Stretching",
                "Massage",
                "Anti-inflammatories",
                "Nothing tried yet",
            ],
        ),
        Question::single_choice(
            RELIEF_EFFECTIVENESS,
            STEP_6,
            "How effective are these methods?",
            &["Not effective at all", "Somewhat effective", "Very effective"],
        ),
        Question::single_choice(
            PAIN_LOCALIZATION,
            STEP_7,
            "Is the pain localized to a specific area or generalized across a muscle group?",
            &[LOCALIZED, GENERALIZED],
        ),
        Question::single_choice(
            DOMS_IMPROVEMENT,
            STEP_7,
            "Has the discomfort improved with light movement or rest?",
            &[DOMS_BETTER, "No, it feels the same or worse."],
        )
        .when_answer_is(PAIN_LOCALIZATION, GENERALIZED)
        .default_when_skipped(NOT_APPLICABLE),
        Question::single_choice(
            FUNCTIONAL_IMPACT,
            STEP_8,
            "Select one:",
            &[
                "Minimal impact",
                "I’ve had to modify my workouts",
                "I’ve stopped exercising altogether",
            ],
        ),
        Question::multi_choice(
            RED_FLAGS,
            STEP_9,
            "Select all that apply:",
            &[
                "No",
                "Sudden, severe swelling",
                "Inability to bear weight",
                "Persistent numbness or tingling",
                "Pain not improving after a week",
                "Fever or chills associated with the pain",
                "Recent trauma or injury to the area",
                OTHER_RED_FLAG,
            ],
        ),
        Question::text(OTHER_RED_FLAGS, STEP_9, "Please specify:")
            .when_answer_includes(RED_FLAGS, OTHER_RED_FLAG),
        Question::single_choice(
            PREVIOUS_INJURIES,
            STEP_10,
            "Have you had any similar injuries in the past?",
            YES_NO,
        ),
        Question::text_area(
            INJURY_DETAILS,
            STEP_10,
            "Please describe your previous injuries.",
        )
        .when_answer_is(PREVIOUS_INJURIES, "Yes"),
        Question::text_area(
            ADDITIONAL_NOTES,
            STEP_11,
            "Provide any additional context about your pain or discomfort.",
        )
        .optional(),
    ]);

    questions
}
