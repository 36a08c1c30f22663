//! ApiStatus - Lifecycle status of a Definition

use serde::{Deserialize, Serialize};

/// Status of a Definition.
///
/// `active` and `inactive` are the well-known values; any other string is
/// kept verbatim. Only `active` definitions may be executed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ApiStatus {
    #[default]
    Active,
    Inactive,
    Other(String),
}

impl ApiStatus {
    pub fn is_active(&self) -> bool {
        matches!(self, ApiStatus::Active)
    }

    pub fn as_str(&self) -> &str {
        match self {
            ApiStatus::Active => "active",
            ApiStatus::Inactive => "inactive",
            ApiStatus::Other(s) => s,
        }
    }
}

impl From<String> for ApiStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "active" => ApiStatus::Active,
            "inactive" => ApiStatus::Inactive,
            _ => ApiStatus::Other(s),
        }
    }
}

impl From<&str> for ApiStatus {
    fn from(s: &str) -> Self {
        ApiStatus::from(s.to_string())
    }
}

impl From<ApiStatus> for String {
    fn from(status: ApiStatus) -> Self {
        match status {
            ApiStatus::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for ApiStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
