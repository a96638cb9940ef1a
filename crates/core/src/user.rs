use serde::{Deserialize, Serialize};

/// Console user as listed by the users endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: u64,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub mobile: Option<String>,
    pub role: String,
    pub username: String,
    #[serde(default)]
    pub created_at: Option<String>,
}
