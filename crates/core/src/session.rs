use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Signed-in user record persisted between runs.
///
/// Fields the console does not know about are kept in `extra` so a
/// save/load cycle never drops what the server sent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionUser {
    pub token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SessionUser {
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            user_id: None,
            username: None,
            name: None,
            email: None,
            role: None,
            extra: Map::new(),
        }
    }

    /// Value for the `Authorization` header, if a token is present.
    #[must_use]
    pub fn bearer(&self) -> Option<String> {
        let token = self.token.trim();
        (!token.is_empty()).then(|| format!("Bearer {token}"))
    }

    /// Name shown in prompts: display name, then username, then email.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .or(self.username.as_deref())
            .or(self.email.as_deref())
            .unwrap_or("unknown user")
    }
}

/// Credentials for the sign-in call.
#[derive(Debug, Clone, Serialize)]
pub struct SignInRequest {
    pub username: String,
    pub password: String,
}
