use askama::Template;

use super::{FlashMessage, TemplateGlobals};
use crate::models::UserRow;

#[derive(Template)]
#[template(path = "users.html")]
pub struct UsersPageTemplate {
    pub api_hostname: String,
    pub flash_messages: Vec<FlashMessage>,
    pub has_flash_messages: bool,
    pub rows: Vec<UserRow>,
    pub new_user_url: String,
    /// Set when the listing could not be fetched.
    pub load_error: String,
}

crate::impl_base_template!(UsersPageTemplate);

impl UsersPageTemplate {
    pub fn build(globals: TemplateGlobals, rows: Vec<UserRow>, load_error: Option<String>) -> Self {
        UsersPageTemplate {
            api_hostname: globals.api_hostname,
            flash_messages: globals.flash_messages,
            has_flash_messages: globals.has_flash_messages,
            rows,
            new_user_url: crate::form::Route::New.path(),
            load_error: load_error.unwrap_or_default(),
        }
    }
}
