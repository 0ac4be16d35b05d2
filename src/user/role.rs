use serde::{Deserialize, Serialize};

/// Closed set of capabilities an account is registered with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Creator,
    #[default]
    Viewer,
    Admin,
}

/// Allow-lists used by the access control layer. An empty list admits any
/// authenticated identity.
pub const ANY_ROLE: &[Role] = &[];
pub const CREATOR_ONLY: &[Role] = &[Role::Creator];
pub const VIEWER_ONLY: &[Role] = &[Role::Viewer];
pub const CREATOR_OR_ADMIN: &[Role] = &[Role::Creator, Role::Admin];

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Creator => "creator",
            Role::Viewer => "viewer",
            Role::Admin => "admin",
        }
    }

    /// Accepts only the exact lowercase names, as serde does.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "creator" => Some(Role::Creator),
            "viewer" => Some(Role::Viewer),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
