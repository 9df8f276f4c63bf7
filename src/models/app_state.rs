use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use crate::api::UserApi;
use crate::form::Notice;

/// Flash entries whose cookie never came back are dropped after this long.
pub const FLASH_TTL: Duration = Duration::from_secs(10 * 60);
/// Upper bound on stored flash entries; the oldest are evicted first.
pub const MAX_FLASH_ENTRIES: usize = 1024;

#[derive(Debug)]
pub struct FlashEntry {
    pub created: Instant,
    pub notices: Vec<Notice>,
}

#[derive(Clone)]
pub struct AppState {
    /// Backend the forms talk to.
    pub api: Arc<dyn UserApi>,
    pub api_base_url: String,
    /// Pending notices per `flash_id` cookie, shown on the next page.
    pub flash_store: Arc<Mutex<HashMap<String, FlashEntry>>>,
    /// Form tokens whose create/update request is still outstanding.
    pub pending_submissions: Arc<Mutex<HashSet<String>>>,
    pub custom_css: Option<String>,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Drop expired entries, then the oldest ones until there is room for one more.
fn sweep_flashes(store: &mut HashMap<String, FlashEntry>, now: Instant) {
    store.retain(|_, e| now.saturating_duration_since(e.created) < FLASH_TTL);
    while store.len() >= MAX_FLASH_ENTRIES {
        let oldest = store
            .iter()
            .min_by_key(|(_, e)| e.created)
            .map(|(id, _)| id.clone());
        match oldest {
            Some(id) => {
                store.remove(&id);
            }
            None => break,
        }
    }
}

/// Outstanding submission for a form token. Dropping it releases the token,
/// including when the request future is cancelled mid-flight.
pub struct SubmissionClaim {
    state: AppState,
    token: String,
}

impl Drop for SubmissionClaim {
    fn drop(&mut self) {
        self.state.finish_submission(&self.token);
    }
}

impl AppState {
    pub fn new(api: Arc<dyn UserApi>, api_base_url: impl Into<String>) -> Self {
        AppState {
            api,
            api_base_url: api_base_url.into(),
            flash_store: Arc::new(Mutex::new(HashMap::new())),
            pending_submissions: Arc::new(Mutex::new(HashSet::new())),
            custom_css: None,
        }
    }

    pub fn push_notices(&self, flash_id: &str, notices: impl IntoIterator<Item = Notice>) {
        let now = Instant::now();
        let mut store = lock(&self.flash_store);
        if !store.contains_key(flash_id) {
            sweep_flashes(&mut store, now);
        }
        store
            .entry(flash_id.to_string())
            .or_insert_with(|| FlashEntry {
                created: now,
                notices: vec![],
            })
            .notices
            .extend(notices);
    }

    pub fn take_notices(&self, flash_id: &str) -> Vec<Notice> {
        lock(&self.flash_store)
            .remove(flash_id)
            .map(|e| e.notices)
            .unwrap_or_default()
    }

    pub fn flash_entries(&self) -> usize {
        lock(&self.flash_store).len()
    }

    /// Claim `token` for a submission. `false` if one is already in flight.
    pub fn begin_submission(&self, token: &str) -> bool {
        lock(&self.pending_submissions).insert(token.to_string())
    }

    pub fn finish_submission(&self, token: &str) {
        lock(&self.pending_submissions).remove(token);
    }

    /// Like [`AppState::begin_submission`], but the claim is released on drop.
    pub fn claim_submission(&self, token: &str) -> Option<SubmissionClaim> {
        self.begin_submission(token).then(|| SubmissionClaim {
            state: self.clone(),
            token: token.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiError;
    use crate::models::UserRecord;
    use async_trait::async_trait;
    use serde_json::Value;

    struct NoBackend;

    #[async_trait]
    impl UserApi for NoBackend {
        async fn list_users(&self) -> Result<Vec<UserRecord>, ApiError> {
            Ok(vec![])
        }
        async fn fetch_user(&self, _id: &str) -> Result<UserRecord, ApiError> {
            Err(ApiError::Network("offline".into()))
        }
        async fn create_user(&self, _record: &UserRecord) -> Result<Value, ApiError> {
            Ok(Value::Null)
        }
        async fn update_user(&self, _id: &str, _record: &UserRecord) -> Result<Value, ApiError> {
            Ok(Value::Null)
        }
    }

    fn state() -> AppState {
        AppState::new(Arc::new(NoBackend), "http://localhost:3000")
    }

    #[test]
    fn claim_is_released_on_drop() {
        let state = state();
        let claim = state.claim_submission("t1");
        assert!(claim.is_some());
        assert!(state.claim_submission("t1").is_none());
        drop(claim);
        assert!(state.begin_submission("t1"));
    }

    #[test]
    fn notices_are_taken_once() {
        let state = state();
        state.push_notices("f1", [Notice::success("saved")]);
        state.push_notices("f1", [Notice::error("later")]);
        assert_eq!(state.take_notices("f1").len(), 2);
        assert!(state.take_notices("f1").is_empty());
    }

    #[test]
    fn flash_store_is_bounded() {
        let state = state();
        for i in 0..MAX_FLASH_ENTRIES + 10 {
            state.push_notices(&format!("f{i}"), [Notice::success("ok")]);
        }
        assert!(state.flash_entries() <= MAX_FLASH_ENTRIES);
        // Newest survives eviction
        let last = format!("f{}", MAX_FLASH_ENTRIES + 9);
        assert_eq!(state.take_notices(&last).len(), 1);
    }

    #[test]
    fn expired_flashes_are_swept() {
        let created = Instant::now();
        let mut store = HashMap::new();
        store.insert(
            "old".to_string(),
            FlashEntry {
                created,
                notices: vec![Notice::success("ok")],
            },
        );
        sweep_flashes(&mut store, created + FLASH_TTL / 2);
        assert_eq!(store.len(), 1);
        sweep_flashes(&mut store, created + FLASH_TTL + Duration::from_secs(1));
        assert!(store.is_empty());
    }
}
