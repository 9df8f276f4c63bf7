use askama::Template;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use rand::RngCore;

use crate::form::{Notice, Route};
use crate::models::AppState;
use crate::templates::{BaseTemplate, FlashMessage, TemplateGlobals};

pub const FLASH_COOKIE: &str = "flash_id";

/// Random 128-bit hex token, used for flash ids and form tokens.
pub fn random_token() -> String {
    let mut b = [0u8; 16];
    rand::rngs::OsRng.fill_bytes(&mut b);
    hex::encode(b)
}

pub fn flash_id_from_jar(jar: &CookieJar) -> Option<String> {
    jar.get(FLASH_COOKIE).map(|c| c.value().to_string())
}

/// Return the jar's flash id, adding a fresh cookie when there is none.
pub fn ensure_flash_id(jar: CookieJar) -> (CookieJar, String) {
    if let Some(id) = flash_id_from_jar(&jar) {
        return (jar, id);
    }
    let id = random_token();
    let mut cookie = Cookie::new(FLASH_COOKIE, id.clone());
    cookie.set_path("/");
    cookie.set_http_only(true);
    (jar.add(cookie), id)
}

pub fn take_flash_messages(state: &AppState, jar: &CookieJar) -> Vec<FlashMessage> {
    match flash_id_from_jar(jar) {
        Some(id) => state.take_notices(&id).into_iter().map(FlashMessage::from).collect(),
        None => vec![],
    }
}

/// Globals for a page: stored flash messages first, then `current` notices
/// produced while handling this request.
pub fn build_template_globals(state: &AppState, jar: &CookieJar, current: Vec<Notice>) -> TemplateGlobals {
    let mut flash_messages = take_flash_messages(state, jar);
    flash_messages.extend(current.into_iter().map(FlashMessage::from));
    let has_flash_messages = !flash_messages.is_empty();
    TemplateGlobals {
        api_hostname: crate::utils::hostname_from_url(&state.api_base_url),
        flash_messages,
        has_flash_messages,
    }
}

pub fn render_template<T: Template + BaseTemplate>(t: T) -> Response {
    match t.render() {
        Ok(body) => {
            tracing::debug!(flashes = t.flash_messages().len(), "Rendered page");
            Html(body).into_response()
        }
        Err(e) => {
            tracing::error!(%e, "Template render error");
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
        }
    }
}

/// Store `notices` for the next page and redirect to `route`.
pub fn redirect_with_notices(state: &AppState, jar: CookieJar, notices: Vec<Notice>, route: &Route) -> Response {
    let target = route.path();
    if notices.is_empty() {
        return Redirect::to(&target).into_response();
    }
    let (jar, flash_id) = ensure_flash_id(jar);
    state.push_notices(&flash_id, notices);
    (jar, Redirect::to(&target)).into_response()
}
