//! Who is taking the quiz.

use std::fmt::Debug;

use crate::config::{non_empty_var, ENV_DISPLAY_NAME, ENV_USER_ID};
use crate::model::UserId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    pub id: UserId,
    pub display_name: String,
}

pub trait IdentityProvider: Send + Sync + Debug {
    fn current_user(&self) -> Option<UserProfile>;
}

/// Always reports the same user (or nobody).
#[derive(Debug, Clone, Default)]
pub struct StaticIdentity {
    user: Option<UserProfile>,
}

impl StaticIdentity {
    pub fn signed_in(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            user: Some(UserProfile { id: UserId::new(id), display_name: display_name.into() }),
        }
    }

    pub fn signed_out() -> Self {
        Self { user: None }
    }
}

impl IdentityProvider for StaticIdentity {
    fn current_user(&self) -> Option<UserProfile> {
        self.user.clone()
    }
}

/// Reads `KIDSQUIZ_USER_ID` / `KIDSQUIZ_DISPLAY_NAME` on every call.
#[derive(Debug, Clone, Default)]
pub struct EnvIdentity;

impl IdentityProvider for EnvIdentity {
    fn current_user(&self) -> Option<UserProfile> {
        let _ = dotenvy::dotenv();
        let id = non_empty_var(ENV_USER_ID)?;
        let display_name = non_empty_var(ENV_DISPLAY_NAME).unwrap_or_else(|| id.clone());
        Some(UserProfile { id: UserId::new(id), display_name })
    }
}
