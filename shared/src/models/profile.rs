use serde::{Deserialize, Serialize};

/// Account profile consulted by the admin gate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub email: String,
    #[serde(default)]
    pub is_admin: Option<bool>,
}

impl Profile {
    pub fn is_admin(&self) -> bool {
        self.is_admin.unwrap_or(false)
    }
}
