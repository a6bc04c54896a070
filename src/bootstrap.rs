use sqlx::SqlitePool;

use crate::auth::hash_password;
use crate::error::AppError;
use crate::models::{CreateUserError, User};

/// Make sure the login account exists. Does nothing if the email is already taken.
pub async fn ensure_seed_user(pool: &SqlitePool, email: &str, password: &str) -> Result<(), AppError> {
    let password_hash = hash_password(password)?;

    match User::create(pool, email, &password_hash).await {
        Ok(user) => {
            tracing::info!(id = %user.id, email, "created seed user");
            Ok(())
        }
        Err(CreateUserError::AlreadyExists) => {
            tracing::debug!(email, "seed user already exists");
            Ok(())
        }
        Err(CreateUserError::Database(e)) => Err(e.into()),
    }
}
