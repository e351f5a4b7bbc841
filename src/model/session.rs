use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user: User,
    pub token: String,
}

impl Session {
    pub(crate) const GUEST_TOKEN: &'static str = "guest-token";

    /// Local-only session; nothing is sent to or stored for the backend.
    pub fn guest() -> Self {
        Self {
            user: User {
                id: format!("guest-{}", super::ids::random_hex()),
                username: "Guest".to_string(),
                email: "guest@local".to_string(),
            },
            token: Self::GUEST_TOKEN.to_string(),
        }
    }

    pub fn is_guest(&self) -> bool {
        self.token == Self::GUEST_TOKEN
    }
}

/// Availability of the two upstream services the backend depends on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    /// Dream text analysis (keyword extraction).
    pub analysis_ok: bool,
    /// 3D model generation.
    pub modeling_ok: bool,
}

impl HealthStatus {
    pub fn all_ok() -> Self {
        Self {
            analysis_ok: true,
            modeling_ok: true,
        }
    }
}
