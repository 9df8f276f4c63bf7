use std::collections::VecDeque;

use crate::api::UserApi;

use super::error::{FetchError, SubmitError};
use super::machine::{Effect, FormEvent, Notice, RecordForm};
use super::route::Route;

/// What a caller has to surface after running a form's effects.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Outcome {
    pub notices: Vec<Notice>,
    /// Where the form asked to go, if anywhere.
    pub navigate: Option<Route>,
}

/// Carries out the effects a [`RecordForm`] asks for against a [`UserApi`],
/// feeding each completion back into the form.
pub struct FormDriver<'a> {
    api: &'a dyn UserApi,
}

impl<'a> FormDriver<'a> {
    pub fn new(api: &'a dyn UserApi) -> Self {
        FormDriver { api }
    }

    /// Dispatch `event` and run whatever follows from it.
    pub async fn send(&self, form: &mut RecordForm, event: FormEvent) -> Outcome {
        let effects = form.dispatch(event);
        self.run(form, effects).await
    }

    pub async fn run(&self, form: &mut RecordForm, effects: Vec<Effect>) -> Outcome {
        let mut queue: VecDeque<Effect> = effects.into();
        let mut outcome = Outcome::default();
        while let Some(effect) = queue.pop_front() {
            let next = match effect {
                Effect::Fetch { id } => {
                    let result = self.api.fetch_user(&id).await.map_err(FetchError::from);
                    form.dispatch(FormEvent::Loaded(result))
                }
                Effect::Create { record } => {
                    let result = self
                        .api
                        .create_user(&record)
                        .await
                        .map(|ack| tracing::info!(?ack, "User created"))
                        .map_err(SubmitError::from);
                    form.dispatch(FormEvent::Submitted(result))
                }
                Effect::Update { id, record } => {
                    let result = self
                        .api
                        .update_user(&id, &record)
                        .await
                        .map(|ack| tracing::info!(%id, ?ack, "User updated"))
                        .map_err(SubmitError::from);
                    form.dispatch(FormEvent::Submitted(result))
                }
                Effect::Notify(notice) => {
                    outcome.notices.push(notice);
                    vec![]
                }
                Effect::Navigate(route) => {
                    outcome.navigate = Some(route);
                    vec![]
                }
            };
            queue.extend(next);
        }
        outcome
    }
}
