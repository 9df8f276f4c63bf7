use axum::{
    extract::{Form, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;

use crate::form::{FormDriver, FormEvent, FormMode, Notice, Outcome, RecordForm};
use crate::models::{AppState, PermissionSet, UserRecord, UserRow, UserType};
use crate::templates::{UserFormTemplate, UsersPageTemplate};
use crate::utils::checkbox_checked;

use super::helpers::{build_template_globals, random_token, redirect_with_notices, render_template};

pub const LIST_LOAD_ERROR: &str = "Failed to load the user list. Please try again.";
pub const DUPLICATE_SUBMISSION: &str = "This form is already being saved. Please wait.";

/// Fields posted by the user form. Unticked checkboxes are absent.
#[derive(Debug, Default, Deserialize)]
pub struct UserFormInput {
    #[serde(default)]
    pub form_token: String,
    #[serde(default)]
    pub action: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub organization: String,
    #[serde(default, rename = "userType")]
    pub user_type: String,
    pub permission1: Option<String>,
    pub permission2: Option<String>,
    pub permission3: Option<String>,
}

impl UserFormInput {
    pub fn is_cancel(&self) -> bool {
        self.action == "cancel"
    }

    pub fn to_record(&self) -> UserRecord {
        UserRecord {
            id: None,
            name: self.name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            organization: self.organization.clone(),
            user_type: UserType::from_str(&self.user_type),
            permissions: PermissionSet {
                permission1: checkbox_checked(self.permission1.as_deref()),
                permission2: checkbox_checked(self.permission2.as_deref()),
                permission3: checkbox_checked(self.permission3.as_deref()),
            },
        }
    }
}

pub async fn users_list(State(state): State<AppState>, jar: CookieJar) -> Response {
    let (rows, load_error) = match state.api.list_users().await {
        Ok(users) => (users.iter().map(UserRow::from).collect(), None),
        Err(e) => {
            tracing::error!(%e, "Failed to load users");
            (vec![], Some(LIST_LOAD_ERROR.to_string()))
        }
    };
    let globals = build_template_globals(&state, &jar, vec![]);
    render_template(UsersPageTemplate::build(globals, rows, load_error))
}

pub async fn user_new_get(State(state): State<AppState>, jar: CookieJar) -> Response {
    let form = RecordForm::create();
    render_form(&state, &jar, &form, random_token(), vec![], StatusCode::OK)
}

pub async fn user_edit_get(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(id): Path<String>,
) -> Response {
    let (mut form, fetch) = RecordForm::edit(id);
    let outcome = FormDriver::new(state.api.as_ref()).run(&mut form, vec![fetch]).await;
    finish(&state, jar, &form, outcome, random_token())
}

pub async fn user_new_post(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(input): Form<UserFormInput>,
) -> Response {
    submit(&state, jar, FormMode::Create, input).await
}

pub async fn user_edit_post(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(id): Path<String>,
    Form(input): Form<UserFormInput>,
) -> Response {
    submit(&state, jar, FormMode::Edit { id }, input).await
}

async fn submit(state: &AppState, jar: CookieJar, mode: FormMode, input: UserFormInput) -> Response {
    let mut form = RecordForm::resume(mode, input.to_record());
    let driver = FormDriver::new(state.api.as_ref());
    let token = if input.form_token.trim().is_empty() {
        random_token()
    } else {
        input.form_token.trim().to_string()
    };

    if input.is_cancel() {
        let outcome = driver.send(&mut form, FormEvent::Cancel).await;
        return finish(state, jar, &form, outcome, token);
    }

    let Some(claim) = state.claim_submission(&token) else {
        tracing::warn!(%token, "Refusing a second submission while the first is outstanding");
        return render_form(
            state,
            &jar,
            &form,
            token,
            vec![Notice::error(DUPLICATE_SUBMISSION)],
            StatusCode::CONFLICT,
        );
    };
    let outcome = driver.send(&mut form, FormEvent::Submit).await;
    drop(claim);
    finish(state, jar, &form, outcome, token)
}

/// Redirect when the form asked to navigate, otherwise show it again.
fn finish(state: &AppState, jar: CookieJar, form: &RecordForm, outcome: Outcome, token: String) -> Response {
    if let Some(route) = outcome.navigate {
        return redirect_with_notices(state, jar, outcome.notices, &route);
    }
    let status = if outcome.notices.iter().any(Notice::is_error) {
        StatusCode::BAD_GATEWAY
    } else if !form.errors().is_empty() {
        StatusCode::UNPROCESSABLE_ENTITY
    } else {
        StatusCode::OK
    };
    render_form(state, &jar, form, token, outcome.notices, status)
}

fn render_form(
    state: &AppState,
    jar: &CookieJar,
    form: &RecordForm,
    token: String,
    notices: Vec<Notice>,
    status: StatusCode,
) -> Response {
    let globals = build_template_globals(state, jar, notices);
    let mut response = render_template(UserFormTemplate::build(globals, form, token));
    if response.status() == StatusCode::OK {
        *response.status_mut() = status;
    }
    response.into_response()
}
