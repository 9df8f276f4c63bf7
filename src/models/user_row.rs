use serde::{Deserialize, Serialize};

use super::UserRecord;
use crate::form::Route;

/// One line of the user listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRow {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub organization: String,
    pub user_type: String,
    pub permissions: String,
    /// Empty when the record has no id to edit by.
    pub edit_url: String,
}

impl From<&UserRecord> for UserRow {
    fn from(rec: &UserRecord) -> Self {
        let id = rec.id.clone().unwrap_or_default();
        let edit_url = if id.is_empty() {
            String::new()
        } else {
            Route::Edit(id.clone()).path()
        };
        UserRow {
            id,
            name: rec.name.clone(),
            email: rec.email.clone(),
            phone: rec.phone.clone(),
            organization: rec.organization.clone(),
            user_type: rec.user_type_label().to_string(),
            permissions: rec
                .permissions
                .granted()
                .iter()
                .map(|k| k.label())
                .collect::<Vec<_>>()
                .join(", "),
            edit_url,
        }
    }
}
