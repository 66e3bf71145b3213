use recovery_aid_advice::{
    AdviceFormatter, ChatRole, PromptVariant, BASELINE_INSTRUCTIONS, MOVEMENT_SCREEN_INSTRUCTIONS,
};
use recovery_aid_intake::fields::*;
use recovery_aid_intake::values::*;
use recovery_aid_intake::{Answer, AnswerSet, IntakeRecord, QuestionnaireVariant};

fn submit(variant: QuestionnaireVariant, steps: &[(&str, Answer)]) -> IntakeRecord {
    let questionnaire = variant.questionnaire();
    let mut answers = AnswerSet::new();
    for (question, answer) in steps {
        questionnaire
            .record_answer(&mut answers, question, answer.clone())
            .unwrap_or_else(|e| panic!("failed to record {}: {}", question, e));
    }
    questionnaire.submit(&answers).unwrap()
}

fn alex_knee() -> Vec<(&'static str, Answer)> {
    vec![
        (USER_NAME, Answer::text("Alex")),
        (BODY_PART, Answer::text("Knee")),
        (PAIN_TYPE, Answer::selections(["Stiffness", "Sharp pain"])),
        (PAIN_SEVERITY, Answer::scale(7)),
        (PAIN_OCCURRENCE, Answer::selections(["During exercise"])),
        (PAIN_DURATION, Answer::text("1–3 days ago")),
        (ACTIVITY_CONTEXT, Answer::text("Running")),
        (ACTIVITY_DESCRIPTION, Answer::text("Downhill intervals")),
        (RELIEF_METHODS, Answer::selections(["Rest", "Ice/Heat"])),
        (RELIEF_EFFECTIVENESS, Answer::text("Somewhat effective")),
        (PAIN_LOCALIZATION, Answer::text(LOCALIZED)),
        (FUNCTIONAL_IMPACT, Answer::text("Minimal impact")),
        (RED_FLAGS, Answer::selections(["No"])),
        (PREVIOUS_INJURIES, Answer::text("No")),
    ]
}

#[test]
fn test_baseline_renders_alex_knee() {
    let record = submit(QuestionnaireVariant::Baseline, &alex_knee());
    let request = AdviceFormatter::new(PromptVariant::Baseline).format(&record);

    let expected = "Hello Alex,\n\
        Based on your input, you are experiencing Sharp pain, Stiffness in your Knee.\n\
        - Specific area: \n\
        - Pain severity on a scale of 1 to 10: 7\n\
        - Onset of pain: 1–3 days ago\n\
        - Activity context: Running\n\
        - Movement description: Downhill intervals\n\
        - Relief factors: Rest, Ice/Heat (Effectiveness: Somewhat effective)\n\
        - DOMS differentiation: Localized to a specific joint or spot (Improved with movement: No)\n\
        - Red flags: No\n\
        - Additional context: ";
    assert_eq!(request.user, expected);
    assert_eq!(request.system, BASELINE_INSTRUCTIONS);
}

#[test]
fn test_formatting_is_deterministic() {
    for prompt in PromptVariant::ALL {
        let record = submit(QuestionnaireVariant::MovementScreen, &alex_knee());
        let formatter = AdviceFormatter::new(prompt);

        let first = formatter.format(&record);
        let second = formatter.format(&record);
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_vec(&first.messages()).unwrap(),
            serde_json::to_vec(&second.messages()).unwrap()
        );
    }
}

#[test]
fn test_variants_never_mix_instructions() {
    let record = submit(QuestionnaireVariant::Baseline, &alex_knee());

    let baseline = AdviceFormatter::new(PromptVariant::Baseline).format(&record);
    assert!(!baseline.system.contains(MOVEMENT_SCREEN_INSTRUCTIONS));
    assert!(!baseline.user.contains("Movement triggers"));

    let movement = AdviceFormatter::new(PromptVariant::MovementScreen).format(&record);
    assert_eq!(movement.system, MOVEMENT_SCREEN_INSTRUCTIONS);
    assert!(!movement.system.contains("SOAP methodology"));
}

#[test]
fn test_messages_are_system_then_user() {
    let record = submit(QuestionnaireVariant::Baseline, &alex_knee());
    let request = AdviceFormatter::new(PromptVariant::Baseline).format(&record);
    let [system, user] = request.messages();

    assert_eq!(system.role, ChatRole::System);
    assert_eq!(user.role, ChatRole::User);
    assert_eq!(user.content, request.user);

    let json = serde_json::to_value(&system).unwrap();
    assert_eq!(json["role"], "system");
}

#[test]
fn test_generalized_pain_that_improved_renders_yes() {
    let mut steps = alex_knee();
    steps.retain(|(q, _)| *q != PAIN_LOCALIZATION);
    steps.push((PAIN_LOCALIZATION, Answer::text(GENERALIZED)));
    steps.push((DOMS_IMPROVEMENT, Answer::text(DOMS_BETTER)));
    let record = submit(QuestionnaireVariant::Baseline, &steps);

    let request = AdviceFormatter::new(PromptVariant::Baseline).format(&record);
    assert!(request.user.contains(&format!(
        "- DOMS differentiation: {} (Improved with movement: Yes)",
        GENERALIZED
    )));
}

#[test]
fn test_movement_screen_renders_triggers_and_details() {
    let mut steps = alex_knee();
    steps.insert(2, (MOVEMENT_TRIGGERS, Answer::selections(["Running", "Squatting"])));
    steps.retain(|(q, _)| *q != PREVIOUS_INJURIES);
    steps.push((PREVIOUS_INJURIES, Answer::text("Yes")));
    steps.push((INJURY_DETAILS, Answer::text("ACL sprain in 2021")));
    let record = submit(QuestionnaireVariant::MovementScreen, &steps);

    let request = AdviceFormatter::new(PromptVariant::MovementScreen).format(&record);
    assert!(request.user.starts_with("Athlete: Alex\n"));
    // Stored in option order
    assert!(request.user.contains("- Movement triggers: Squatting, Running\n"));
    assert!(request.user.contains("- Injury history: Yes (ACL sprain in 2021)\n"));
    assert!(request.user.contains("- Area: \n"));
    assert!(request.user.ends_with("- Notes: "));
}

#[test]
fn test_baseline_prompt_ignores_other_area_text() {
    let mut steps = alex_knee();
    steps.retain(|(q, _)| *q != BODY_PART);
    steps.insert(1, (BODY_PART, Answer::text(UPPER_BACK)));
    steps.insert(2, (SPECIFIC_PART, Answer::text("Other")));
    steps.insert(3, (OTHER_PART, Answer::text("Rhomboids")));
    let record = submit(QuestionnaireVariant::Baseline, &steps);

    let baseline = AdviceFormatter::new(PromptVariant::Baseline).format(&record);
    assert!(baseline.user.contains("- Specific area: Other\n"));
    assert!(!baseline.user.contains("Rhomboids"));

    let movement = AdviceFormatter::new(PromptVariant::MovementScreen).format(&record);
    assert!(movement.user.contains("- Area: Other (Rhomboids)\n"));
}
