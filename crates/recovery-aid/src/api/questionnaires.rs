use axum::extract::Path;
use axum::response::Json;
use serde::Serialize;

use recovery_aid_core::QuestionView;
use recovery_aid_intake::QuestionnaireVariant;

use super::ApiError;

#[derive(Debug, Serialize)]
pub struct QuestionnaireResponse {
    pub name: &'static str,
    pub questions: Vec<QuestionView>,
}

/// The full static question list. Keyed options are left empty because
/// they depend on earlier answers.
pub async fn get_questionnaire(
    Path(variant): Path<String>,
) -> Result<Json<QuestionnaireResponse>, ApiError> {
    let variant: QuestionnaireVariant = variant
        .parse()
        .map_err(|_| ApiError::not_found("questionnaire", &variant))?;
    let questionnaire = variant.questionnaire();

    Ok(Json(QuestionnaireResponse {
        name: questionnaire.name(),
        questions: questionnaire
            .questions()
            .iter()
            .map(QuestionView::from_question)
            .collect(),
    }))
}
