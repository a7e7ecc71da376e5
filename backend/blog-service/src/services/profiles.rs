/// Profile service - a user edits their own profile
use crate::db::{BlogStore, UserRepository};
use crate::error::{AppError, Result};
use crate::models::{Identity, ProfileForm, User};
use std::sync::Arc;
use validator::Validate;

/// Letters, digits and `@ . + - _`.
pub fn is_valid_username(username: &str) -> bool {
    !username.is_empty()
        && username
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'))
}

pub struct ProfileService {
    store: Arc<dyn BlogStore>,
}

impl ProfileService {
    pub fn new(store: Arc<dyn BlogStore>) -> Self {
        Self { store }
    }

    pub async fn update(&self, user: &Identity, form: ProfileForm) -> Result<User> {
        form.validate()?;
        if !is_valid_username(&form.username) {
            return Err(AppError::ValidationError(
                "username: only letters, digits and @/./+/-/_ are allowed".to_string(),
            ));
        }

        let updated = self
            .store
            .update_user(user.id, &form)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", user.id)))?;

        tracing::info!(user_id = %user.id, "profile updated");
        Ok(updated)
    }
}
