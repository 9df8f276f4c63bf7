use crate::models::{PermissionKey, UserRecord, UserType};
use crate::validation::{validate, validate_field, Field, FieldErrors};

use super::error::{FetchError, SubmitError};
use super::route::Route;

/// Whether a form creates a new record or edits an existing one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit { id: String },
}

impl FormMode {
    pub fn is_editing(&self) -> bool {
        matches!(self, FormMode::Edit { .. })
    }

    pub fn route(&self) -> Route {
        match self {
            FormMode::Create => Route::New,
            FormMode::Edit { id } => Route::Edit(id.clone()),
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            FormMode::Create => "Create new user",
            FormMode::Edit { .. } => "Edit user",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormState {
    /// Waiting for the existing record (edit mode only).
    Loading,
    Ready,
    /// A create/update request is outstanding.
    Submitting,
    Saved,
    /// The existing record could not be loaded.
    Aborted,
    /// The user left the form without saving.
    Discarded,
}

impl FormState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, FormState::Saved | FormState::Aborted | FormState::Discarded)
    }
}

/// A single edit to the in-progress record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FieldUpdate {
    Name(String),
    Email(String),
    Phone(String),
    Organization(String),
    UserType(Option<UserType>),
    Permission(PermissionKey, bool),
}

impl FieldUpdate {
    /// Update for `field` from a raw text value, as typed or selected.
    /// An unknown user type value counts as unset.
    pub fn from_input(field: Field, value: String) -> FieldUpdate {
        match field {
            Field::Name => FieldUpdate::Name(value),
            Field::Email => FieldUpdate::Email(value),
            Field::Phone => FieldUpdate::Phone(value),
            Field::Organization => FieldUpdate::Organization(value),
            Field::UserType => FieldUpdate::UserType(UserType::from_str(&value)),
        }
    }

    /// Validated field touched by this update, if any.
    pub fn field(&self) -> Option<Field> {
        match self {
            FieldUpdate::Name(_) => Some(Field::Name),
            FieldUpdate::Email(_) => Some(Field::Email),
            FieldUpdate::Phone(_) => Some(Field::Phone),
            FieldUpdate::Organization(_) => Some(Field::Organization),
            FieldUpdate::UserType(_) => Some(Field::UserType),
            FieldUpdate::Permission(..) => None,
        }
    }

    fn apply(self, record: &mut UserRecord) {
        match self {
            FieldUpdate::Name(v) => record.name = v,
            FieldUpdate::Email(v) => record.email = v,
            FieldUpdate::Phone(v) => record.phone = v,
            FieldUpdate::Organization(v) => record.organization = v,
            FieldUpdate::UserType(v) => record.user_type = v,
            FieldUpdate::Permission(key, granted) => record.permissions.set(key, granted),
        }
    }
}

#[derive(Debug)]
pub enum FormEvent {
    Loaded(Result<UserRecord, FetchError>),
    Update(FieldUpdate),
    Submit,
    Submitted(Result<(), SubmitError>),
    Cancel,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
}

/// Dialog-level message for the user.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Notice {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Notice {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.level == NoticeLevel::Error
    }
}

/// Work requested by a transition, carried out by the caller.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Effect {
    Fetch { id: String },
    Create { record: UserRecord },
    Update { id: String, record: UserRecord },
    Notify(Notice),
    Navigate(Route),
}

/// In-progress user record plus the workflow around it.
///
/// All changes go through [`RecordForm::dispatch`], which returns the
/// effects the transition asks for. Events that make no sense in the
/// current state are ignored and yield no effects.
#[derive(Debug)]
pub struct RecordForm {
    mode: FormMode,
    state: FormState,
    record: UserRecord,
    errors: FieldErrors,
    last_error: Option<String>,
}

impl RecordForm {
    /// A blank form in create mode, ready for input.
    pub fn create() -> Self {
        RecordForm {
            mode: FormMode::Create,
            state: FormState::Ready,
            record: UserRecord::default(),
            errors: FieldErrors::default(),
            last_error: None,
        }
    }

    /// An edit form for `id`, waiting on the returned fetch.
    pub fn edit(id: impl Into<String>) -> (Self, Effect) {
        let id = id.into();
        let form = RecordForm {
            mode: FormMode::Edit { id: id.clone() },
            state: FormState::Loading,
            record: UserRecord::default(),
            errors: FieldErrors::default(),
            last_error: None,
        };
        (form, Effect::Fetch { id })
    }

    /// A `Ready` form holding values the user already entered, as when a
    /// browser posts the form back. Field-level validation is applied.
    pub fn resume(mode: FormMode, mut record: UserRecord) -> Self {
        record.id = match &mode {
            FormMode::Create => None,
            FormMode::Edit { id } => Some(id.clone()),
        };
        let errors = validate(&record);
        RecordForm {
            mode,
            state: FormState::Ready,
            record,
            errors,
            last_error: None,
        }
    }

    pub fn mode(&self) -> &FormMode {
        &self.mode
    }

    pub fn state(&self) -> FormState {
        self.state
    }

    pub fn record(&self) -> &UserRecord {
        &self.record
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    /// Dialog-level error of the last failed submission.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn can_submit(&self) -> bool {
        self.state == FormState::Ready
    }

    pub fn dispatch(&mut self, event: FormEvent) -> Vec<Effect> {
        match (self.state, event) {
            (FormState::Loading, FormEvent::Loaded(Ok(mut record))) => {
                if let FormMode::Edit { id } = &self.mode {
                    record.id = Some(id.clone());
                }
                tracing::debug!(id = ?record.id, "User record loaded into form");
                self.record = record;
                self.errors = FieldErrors::default();
                self.state = FormState::Ready;
                vec![]
            }
            (FormState::Loading, FormEvent::Loaded(Err(e))) => {
                tracing::error!(error = %e.source, "Failed to load user record");
                self.state = FormState::Aborted;
                self.record = UserRecord::default();
                vec![
                    Effect::Notify(Notice::error(e.to_string())),
                    Effect::Navigate(Route::List),
                ]
            }
            (FormState::Ready, FormEvent::Update(update)) => {
                let field = update.field();
                update.apply(&mut self.record);
                if let Some(field) = field {
                    self.errors.set(field, validate_field(&self.record, field));
                }
                vec![]
            }
            (FormState::Ready, FormEvent::Submit) => {
                self.errors = validate(&self.record);
                if !self.errors.is_empty() {
                    tracing::debug!(errors = self.errors.len(), "Submission blocked by validation");
                    return vec![];
                }
                self.last_error = None;
                self.state = FormState::Submitting;
                let effect = match &self.mode {
                    FormMode::Create => Effect::Create {
                        record: self.record.without_id(),
                    },
                    FormMode::Edit { id } => Effect::Update {
                        id: id.clone(),
                        record: self.record.clone(),
                    },
                };
                vec![effect]
            }
            (FormState::Submitting, FormEvent::Submitted(Ok(()))) => {
                self.state = FormState::Saved;
                self.record = UserRecord::default();
                let message = match self.mode {
                    FormMode::Create => "User created successfully!",
                    FormMode::Edit { .. } => "User updated successfully!",
                };
                vec![
                    Effect::Notify(Notice::success(message)),
                    Effect::Navigate(Route::List),
                ]
            }
            (FormState::Submitting, FormEvent::Submitted(Err(e))) => {
                tracing::error!(error = %e.source, "Failed to save user record");
                let message = e.to_string();
                self.state = FormState::Ready;
                self.last_error = Some(message.clone());
                vec![Effect::Notify(Notice::error(message))]
            }
            (state, FormEvent::Cancel) if state != FormState::Submitting && !state.is_terminal() => {
                self.state = FormState::Discarded;
                self.record = UserRecord::default();
                self.errors = FieldErrors::default();
                vec![Effect::Navigate(Route::List)]
            }
            (state, event) => {
                tracing::debug!(?state, ?event, "Ignoring form event");
                vec![]
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiError;
    use crate::models::PermissionSet;

    fn fill(form: &mut RecordForm) {
        for update in [
            FieldUpdate::Name("Ana".into()),
            FieldUpdate::Email("ana@x.com".into()),
            FieldUpdate::Phone("111".into()),
            FieldUpdate::Organization("Saude".into()),
            FieldUpdate::UserType(Some(UserType::Administrator)),
            FieldUpdate::Permission(PermissionKey::Permission1, true),
        ] {
            assert!(form.dispatch(FormEvent::Update(update)).is_empty());
        }
    }

    fn network_error() -> ApiError {
        ApiError::Network("connection refused".into())
    }

    #[test]
    fn create_starts_ready_and_empty() {
        let form = RecordForm::create();
        assert_eq!(form.state(), FormState::Ready);
        assert_eq!(form.record(), &UserRecord::default());
        assert_eq!(form.record().permissions, PermissionSet::default());
        assert!(form.errors().is_empty());
    }

    #[test]
    fn edit_starts_loading_with_one_fetch() {
        let (form, effect) = RecordForm::edit("42");
        assert_eq!(form.state(), FormState::Loading);
        assert_eq!(effect, Effect::Fetch { id: "42".into() });
    }

    #[test]
    fn field_update_revalidates_only_that_field() {
        let mut form = RecordForm::create();
        form.dispatch(FormEvent::Update(FieldUpdate::Email("nope".into())));
        assert_eq!(form.errors().len(), 1);
        assert_eq!(form.errors().message(Field::Email).as_deref(), Some("Invalid email"));
        form.dispatch(FormEvent::Update(FieldUpdate::Email("ana@x.com".into())));
        assert!(form.errors().is_empty());
    }

    #[test]
    fn toggling_a_permission_touches_only_that_flag() {
        let mut form = RecordForm::create();
        form.dispatch(FormEvent::Update(FieldUpdate::Permission(PermissionKey::Permission2, true)));
        let perms = form.record().permissions;
        assert!(!perms.permission1);
        assert!(perms.permission2);
        assert!(!perms.permission3);
    }

    #[test]
    fn invalid_submit_issues_nothing_and_lists_errors() {
        let mut form = RecordForm::create();
        form.dispatch(FormEvent::Update(FieldUpdate::Name("Ana".into())));
        let effects = form.dispatch(FormEvent::Submit);
        assert!(effects.is_empty());
        assert_eq!(form.state(), FormState::Ready);
        assert_eq!(form.errors().len(), 4);
        assert!(form.errors().get(Field::Name).is_none());
    }

    #[test]
    fn create_submit_posts_record_without_id() {
        let mut form = RecordForm::create();
        fill(&mut form);
        let effects = form.dispatch(FormEvent::Submit);
        assert_eq!(form.state(), FormState::Submitting);
        assert_eq!(effects.len(), 1);
        match &effects[0] {
            Effect::Create { record } => {
                assert_eq!(record.id, None);
                assert_eq!(record.name, "Ana");
                assert!(record.permissions.permission1);
            }
            other => panic!("unexpected effect {:?}", other),
        }
    }

    #[test]
    fn second_submit_while_submitting_is_ignored() {
        let mut form = RecordForm::create();
        fill(&mut form);
        assert_eq!(form.dispatch(FormEvent::Submit).len(), 1);
        assert!(form.dispatch(FormEvent::Submit).is_empty());
        assert!(form
            .dispatch(FormEvent::Update(FieldUpdate::Name("Bia".into())))
            .is_empty());
        assert_eq!(form.record().name, "Ana");
        assert!(form.dispatch(FormEvent::Cancel).is_empty());
        assert_eq!(form.state(), FormState::Submitting);
    }

    #[test]
    fn successful_submit_navigates_to_list() {
        let mut form = RecordForm::create();
        fill(&mut form);
        form.dispatch(FormEvent::Submit);
        let effects = form.dispatch(FormEvent::Submitted(Ok(())));
        assert_eq!(form.state(), FormState::Saved);
        assert_eq!(
            effects,
            vec![
                Effect::Notify(Notice::success("User created successfully!")),
                Effect::Navigate(Route::List),
            ]
        );
    }

    #[test]
    fn failed_submit_keeps_values_and_allows_retry() {
        let mut form = RecordForm::create();
        fill(&mut form);
        let before = form.record().clone();
        form.dispatch(FormEvent::Submit);
        let effects = form.dispatch(FormEvent::Submitted(Err(network_error().into())));
        assert_eq!(form.state(), FormState::Ready);
        assert_eq!(form.record(), &before);
        assert!(form.last_error().is_some());
        assert!(matches!(&effects[..], [Effect::Notify(n)] if n.is_error()));
        assert!(!effects.iter().any(|e| matches!(e, Effect::Notify(n) if n.message.contains("refused"))));
        assert_eq!(form.dispatch(FormEvent::Submit).len(), 1);
    }

    #[test]
    fn edit_load_then_update_submit() {
        let (mut form, _) = RecordForm::edit("42");
        let fetched = UserRecord {
            id: None,
            name: "Ana".into(),
            email: "ana@x.com".into(),
            phone: "111".into(),
            organization: "Saude".into(),
            user_type: Some(UserType::Other),
            permissions: PermissionSet::default(),
        };
        assert!(form.dispatch(FormEvent::Loaded(Ok(fetched))).is_empty());
        assert_eq!(form.state(), FormState::Ready);
        assert_eq!(form.record().id.as_deref(), Some("42"));
        form.dispatch(FormEvent::Update(FieldUpdate::Phone("222".into())));
        let effects = form.dispatch(FormEvent::Submit);
        match &effects[..] {
            [Effect::Update { id, record }] => {
                assert_eq!(id, "42");
                assert_eq!(record.phone, "222");
                assert_eq!(record.id.as_deref(), Some("42"));
            }
            other => panic!("unexpected effects {:?}", other),
        }
        let effects = form.dispatch(FormEvent::Submitted(Ok(())));
        assert!(effects.contains(&Effect::Notify(Notice::success("User updated successfully!"))));
    }

    #[test]
    fn failed_load_aborts_to_list() {
        let (mut form, _) = RecordForm::edit("42");
        let effects = form.dispatch(FormEvent::Loaded(Err(network_error().into())));
        assert_eq!(form.state(), FormState::Aborted);
        assert_eq!(effects.len(), 2);
        assert!(matches!(&effects[0], Effect::Notify(n) if n.is_error()));
        assert_eq!(effects[1], Effect::Navigate(Route::List));
    }

    #[test]
    fn updates_while_loading_are_ignored() {
        let (mut form, _) = RecordForm::edit("1");
        form.dispatch(FormEvent::Update(FieldUpdate::Name("x".into())));
        assert_eq!(form.record().name, "");
        assert!(form.dispatch(FormEvent::Submit).is_empty());
    }

    #[test]
    fn cancel_discards_without_request() {
        let mut form = RecordForm::create();
        fill(&mut form);
        let effects = form.dispatch(FormEvent::Cancel);
        assert_eq!(effects, vec![Effect::Navigate(Route::List)]);
        assert_eq!(form.state(), FormState::Discarded);
        assert_eq!(form.record(), &UserRecord::default());
    }

    #[test]
    fn late_load_after_cancel_is_ignored() {
        let (mut form, _) = RecordForm::edit("1");
        form.dispatch(FormEvent::Cancel);
        let effects = form.dispatch(FormEvent::Loaded(Ok(UserRecord::default())));
        assert!(effects.is_empty());
        assert_eq!(form.state(), FormState::Discarded);
    }

    #[test]
    fn resume_forces_mode_id_and_validates() {
        let record = UserRecord {
            id: Some("other".into()),
            name: "Ana".into(),
            ..Default::default()
        };
        let form = RecordForm::resume(FormMode::Edit { id: "5".into() }, record.clone());
        assert_eq!(form.record().id.as_deref(), Some("5"));
        assert_eq!(form.state(), FormState::Ready);
        assert_eq!(form.errors().len(), 4);
        let form = RecordForm::resume(FormMode::Create, record);
        assert_eq!(form.record().id, None);
    }
}
