// src/auth.rs

use std::sync::LazyLock;

use sqlx::SqliteConnection;

use crate::{
    error::AppError,
    models::user::User,
    store,
    utils::hash::{hash_password, verify_password},
};

/// Hash verified against when the email is unknown, so both failure paths
/// cost one Argon2 computation.
static DUMMY_HASH: LazyLock<Option<String>> =
    LazyLock::new(|| hash_password("not-a-real-password").ok());

/// Checks an email/password pair against the identity store.
///
/// Unknown email and wrong password fail with the same `invalid_credentials`
/// error. On success the user is returned with the credential cleared. No
/// session or token is issued.
pub async fn authenticate(
    conn: &mut SqliteConnection,
    email: &str,
    password: &str,
) -> Result<User, AppError> {
    let Some(mut user) = store::users::find_by_email(conn, email).await? else {
        if let Some(dummy) = DUMMY_HASH.as_deref() {
            let _ = verify_password(password, dummy);
        }
        return Err(AppError::invalid_credentials());
    };

    if !verify_password(password, &user.password)? {
        return Err(AppError::invalid_credentials());
    }

    user.password.clear();
    Ok(user)
}
