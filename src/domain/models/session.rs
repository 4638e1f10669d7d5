use serde::{Deserialize, Serialize};
use super::user::{Role, User};

/// Identity carried in the `auth_session` cookie. Never persisted server-side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub user_id: String,
    pub management_id: String,
    pub email: String,
    pub role: Role,
}

impl Session {
    pub fn for_user(user: &User, role: Role) -> Self {
        Self {
            user_id: user.id.clone(),
            management_id: user.management_id.clone(),
            email: user.email.clone(),
            role,
        }
    }
}
