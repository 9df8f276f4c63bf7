use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::permission::PermissionSet;

/// Kind of account a user record describes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UserType {
    /// Full administrative access.
    Administrator,
    /// Staff of a municipality.
    MunicipalUser,
    /// Anything else.
    Other,
}

impl UserType {
    /// Human-readable label shown in the UI.
    pub fn label(&self) -> &'static str {
        match self {
            UserType::Administrator => "Administrator",
            UserType::MunicipalUser => "Municipal user",
            UserType::Other => "Other",
        }
    }

    /// Parse from the value exchanged with the backend.
    pub fn from_str(s: &str) -> Option<UserType> {
        match s.trim() {
            "administrador" => Some(UserType::Administrator),
            "usuario" => Some(UserType::MunicipalUser),
            "outros" => Some(UserType::Other),
            _ => None,
        }
    }

    /// Value exchanged with the backend.
    pub fn as_str(&self) -> &'static str {
        match self {
            UserType::Administrator => "administrador",
            UserType::MunicipalUser => "usuario",
            UserType::Other => "outros",
        }
    }

    /// All user types, in display order.
    pub fn all() -> &'static [UserType] {
        &[UserType::Administrator, UserType::MunicipalUser, UserType::Other]
    }
}

impl Serialize for UserType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// A user record as exchanged with the backend.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "UserRecordWire")]
pub struct UserRecord {
    /// Server-assigned identifier; absent for records that were never saved.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub organization: String,
    /// `None` while the user has not picked a type.
    pub user_type: Option<UserType>,
    pub permissions: PermissionSet,
}

/// Incoming shape of a record. Document stores may send `_id` next to, or
/// instead of, `id`.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserRecordWire {
    #[serde(default, deserialize_with = "id_from_string_or_number")]
    id: Option<String>,
    #[serde(default, rename = "_id", deserialize_with = "id_from_string_or_number")]
    mongo_id: Option<String>,
    #[serde(default)]
    name: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    phone: String,
    #[serde(default)]
    organization: String,
    #[serde(default, deserialize_with = "user_type_or_unset")]
    user_type: Option<UserType>,
    #[serde(default)]
    permissions: PermissionSet,
}

impl From<UserRecordWire> for UserRecord {
    fn from(w: UserRecordWire) -> Self {
        UserRecord {
            id: w.id.or(w.mongo_id),
            name: w.name,
            email: w.email,
            phone: w.phone,
            organization: w.organization,
            user_type: w.user_type,
            permissions: w.permissions,
        }
    }
}

impl UserRecord {
    /// Copy of this record without its identifier, as sent on creation.
    pub fn without_id(&self) -> UserRecord {
        UserRecord {
            id: None,
            ..self.clone()
        }
    }

    pub fn user_type_label(&self) -> &'static str {
        self.user_type.map(|t| t.label()).unwrap_or("")
    }
}

fn id_from_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

fn user_type_or_unset<'de, D>(deserializer: D) -> Result<Option<UserType>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    let parsed = match &raw {
        Some(serde_json::Value::String(s)) => UserType::from_str(s),
        _ => None,
    };
    if parsed.is_none() {
        match &raw {
            None | Some(serde_json::Value::Null) => {}
            Some(serde_json::Value::String(s)) if s.trim().is_empty() => {}
            Some(other) => {
                tracing::warn!(user_type = %other, "Unrecognised user type from backend, treating as unset");
            }
        }
    }
    Ok(parsed)
}
