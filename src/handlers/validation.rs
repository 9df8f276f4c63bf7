use axum::{http::StatusCode, response::IntoResponse, response::Response, Json};
use serde::{Deserialize, Serialize};

use crate::form::{FieldUpdate, FormEvent, RecordForm};
use crate::validation::Field;

#[derive(Debug, Deserialize)]
pub struct FieldCheck {
    pub field: String,
    #[serde(default)]
    pub value: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct FieldCheckResult {
    pub field: String,
    pub error: Option<String>,
}

/// Field-level validation for inline errors while the user types.
pub async fn validate_field_post(Json(check): Json<FieldCheck>) -> Response {
    let Some(field) = Field::from_path(&check.field) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "error": format!("Unknown field: {}", check.field) })),
        )
            .into_response();
    };
    let mut form = RecordForm::create();
    form.dispatch(FormEvent::Update(FieldUpdate::from_input(field, check.value)));
    Json(FieldCheckResult {
        field: field.path().to_string(),
        error: form.errors().message(field),
    })
    .into_response()
}
