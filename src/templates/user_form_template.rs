use askama::Template;

use super::{FlashMessage, TemplateGlobals};
use crate::form::{Route, RecordForm};
use crate::models::{PermissionCategory, UserType};
use crate::validation::Field;

/// A text input with its current value and inline error.
pub struct FieldView {
    pub name: &'static str,
    pub label: &'static str,
    pub value: String,
    pub error: String,
    pub has_error: bool,
}

pub struct SelectOption {
    pub value: &'static str,
    pub label: &'static str,
    pub selected: bool,
}

pub struct PermissionView {
    pub key: &'static str,
    pub label: &'static str,
    pub checked: bool,
}

pub struct PermissionGroupView {
    pub label: &'static str,
    pub items: Vec<PermissionView>,
}

#[derive(Template)]
#[template(path = "user_form.html")]
pub struct UserFormTemplate {
    pub api_hostname: String,
    pub flash_messages: Vec<FlashMessage>,
    pub has_flash_messages: bool,

    pub title: String,
    pub action_url: String,
    pub list_url: String,
    pub form_token: String,
    pub text_fields: Vec<FieldView>,
    pub user_type_options: Vec<SelectOption>,
    pub user_type_error: String,
    pub has_user_type_error: bool,
    pub permission_groups: Vec<PermissionGroupView>,
    pub can_submit: bool,
}

crate::impl_base_template!(UserFormTemplate);

impl UserFormTemplate {
    pub fn build(globals: TemplateGlobals, form: &RecordForm, form_token: String) -> Self {
        let record = form.record();
        let errors = form.errors();
        let text_field = |field: Field, value: &str| {
            let error = errors.message(field).unwrap_or_default();
            FieldView {
                name: field.path(),
                label: field.label(),
                value: value.to_string(),
                has_error: !error.is_empty(),
                error,
            }
        };
        let text_fields = vec![
            text_field(Field::Name, &record.name),
            text_field(Field::Email, &record.email),
            text_field(Field::Phone, &record.phone),
            text_field(Field::Organization, &record.organization),
        ];
        let user_type_options = UserType::all()
            .iter()
            .map(|t| SelectOption {
                value: t.as_str(),
                label: t.label(),
                selected: record.user_type == Some(*t),
            })
            .collect();
        let permission_groups = PermissionCategory::all()
            .iter()
            .map(|c| PermissionGroupView {
                label: c.label(),
                items: c
                    .keys()
                    .iter()
                    .map(|k| PermissionView {
                        key: k.as_str(),
                        label: k.label(),
                        checked: record.permissions.get(*k),
                    })
                    .collect(),
            })
            .collect();
        let user_type_error = errors.message(Field::UserType).unwrap_or_default();

        UserFormTemplate {
            api_hostname: globals.api_hostname,
            flash_messages: globals.flash_messages,
            has_flash_messages: globals.has_flash_messages,
            title: form.mode().title().to_string(),
            action_url: form.mode().route().path(),
            list_url: Route::List.path(),
            form_token,
            text_fields,
            user_type_options,
            has_user_type_error: !user_type_error.is_empty(),
            user_type_error,
            permission_groups,
            can_submit: form.can_submit(),
        }
    }
}
