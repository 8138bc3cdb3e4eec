//! Caller identity passed into services.

use survey_common::{AppError, AppResult};

/// The authenticated caller on whose behalf an operation runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub user_id: i32,
    pub is_admin: bool,
}

impl Actor {
    #[must_use]
    pub const fn new(user_id: i32, is_admin: bool) -> Self {
        Self { user_id, is_admin }
    }

    /// Whether the actor may modify a resource owned by `owner_id`.
    #[must_use]
    pub const fn can_manage(&self, owner_id: i32) -> bool {
        self.is_admin || self.user_id == owner_id
    }

    /// Fail with `Forbidden` unless the actor may modify the resource.
    pub fn ensure_can_manage(&self, owner_id: i32, what: &str) -> AppResult<()> {
        if self.can_manage(owner_id) {
            Ok(())
        } else {
            Err(AppError::Forbidden(format!("Not the owner of this {what}")))
        }
    }
}
