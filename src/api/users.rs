use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;
use std::time::Duration;

use super::client::api_call;
use super::error::ApiError;
use crate::models::UserRecord;

/// Backend operations the interface relies on.
#[async_trait]
pub trait UserApi: Send + Sync {
    /// GET `/usuarios`
    async fn list_users(&self) -> Result<Vec<UserRecord>, ApiError>;
    /// GET `/usuarios/{id}`
    async fn fetch_user(&self, id: &str) -> Result<UserRecord, ApiError>;
    /// POST `/cadastrar-usuario`
    async fn create_user(&self, record: &UserRecord) -> Result<Value, ApiError>;
    /// PUT `/editar-user/{id}`
    async fn update_user(&self, id: &str, record: &UserRecord) -> Result<Value, ApiError>;
}

/// [`UserApi`] over HTTP with reqwest.
#[derive(Clone, Debug)]
pub struct HttpUserApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpUserApi {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .user_agent(format!("Cadastro/{}", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        HttpUserApi {
            client,
            base_url: base_url.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

pub fn fetch_user_endpoint(id: &str) -> String {
    format!("/usuarios/{}", urlencoding::encode(id))
}

pub fn update_user_endpoint(id: &str) -> String {
    format!("/editar-user/{}", urlencoding::encode(id))
}

pub const LIST_USERS_ENDPOINT: &str = "/usuarios";
pub const CREATE_USER_ENDPOINT: &str = "/cadastrar-usuario";

/// Pull the user array out of a list payload: a bare array, or an object
/// wrapping it under one of the usual keys.
pub fn parse_user_list(payload: Value) -> Result<Vec<UserRecord>, ApiError> {
    let items = match payload {
        Value::Array(arr) => arr,
        Value::Object(mut obj) => {
            let found = ["data", "usuarios", "users", "items"]
                .iter()
                .find_map(|k| match obj.remove(*k) {
                    Some(Value::Array(arr)) => Some(arr),
                    _ => None,
                });
            match found {
                Some(arr) => arr,
                None => return Err(ApiError::Decode("expected a list of users".into())),
            }
        }
        Value::Null => vec![],
        _ => return Err(ApiError::Decode("expected a list of users".into())),
    };
    items
        .into_iter()
        .map(|item| serde_json::from_value(item).map_err(ApiError::from))
        .collect()
}

/// A single user payload, bare or wrapped in `data`.
pub fn parse_user(payload: Value) -> Result<UserRecord, ApiError> {
    let inner = match payload {
        Value::Object(mut obj) if matches!(obj.get("data"), Some(Value::Object(_))) => {
            obj.remove("data").unwrap_or(Value::Null)
        }
        Value::Object(obj) => Value::Object(obj),
        _ => return Err(ApiError::Decode("expected a user object".into())),
    };
    Ok(serde_json::from_value(inner)?)
}

#[async_trait]
impl UserApi for HttpUserApi {
    async fn list_users(&self) -> Result<Vec<UserRecord>, ApiError> {
        let payload = api_call(&self.client, &self.base_url, Method::GET, LIST_USERS_ENDPOINT, None).await?;
        parse_user_list(payload)
    }

    async fn fetch_user(&self, id: &str) -> Result<UserRecord, ApiError> {
        let endpoint = fetch_user_endpoint(id);
        let payload = api_call(&self.client, &self.base_url, Method::GET, &endpoint, None).await?;
        parse_user(payload)
    }

    async fn create_user(&self, record: &UserRecord) -> Result<Value, ApiError> {
        let body = serde_json::to_value(record.without_id())?;
        api_call(&self.client, &self.base_url, Method::POST, CREATE_USER_ENDPOINT, Some(&body)).await
    }

    async fn update_user(&self, id: &str, record: &UserRecord) -> Result<Value, ApiError> {
        let endpoint = update_user_endpoint(id);
        let body = serde_json::to_value(record)?;
        api_call(&self.client, &self.base_url, Method::PUT, &endpoint, Some(&body)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn endpoints_encode_ids() {
        assert_eq!(fetch_user_endpoint("42"), "/usuarios/42");
        assert_eq!(update_user_endpoint("a/b"), "/editar-user/a%2Fb");
    }

    #[test]
    fn list_accepts_bare_and_wrapped_arrays() {
        let bare = parse_user_list(json!([{"id": 1, "name": "Ana"}])).unwrap();
        assert_eq!(bare.len(), 1);
        assert_eq!(bare[0].id.as_deref(), Some("1"));
        let wrapped = parse_user_list(json!({"data": [{"name": "Ana"}, {"name": "Bia"}]})).unwrap();
        assert_eq!(wrapped.len(), 2);
        assert!(parse_user_list(Value::Null).unwrap().is_empty());
        assert!(parse_user_list(json!({"message": "ok"})).is_err());
        assert!(parse_user_list(json!("nope")).is_err());
    }

    #[test]
    fn single_user_may_be_wrapped() {
        let rec = parse_user(json!({"data": {"id": "7", "name": "Ana"}})).unwrap();
        assert_eq!(rec.name, "Ana");
        let rec = parse_user(json!({"id": "7", "name": "Bia"})).unwrap();
        assert_eq!(rec.name, "Bia");
        assert!(parse_user(json!([1, 2])).is_err());
    }

    #[test]
    fn document_store_payload_with_both_ids_decodes() {
        let rec = parse_user(json!({
            "_id": "a",
            "id": "a",
            "name": "Ana",
            "userType": 3
        }))
        .unwrap();
        assert_eq!(rec.id.as_deref(), Some("a"));
        assert_eq!(rec.user_type, None);
    }
}
