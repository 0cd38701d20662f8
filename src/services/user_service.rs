use serde_json::Value;
use sqlx::PgPool;
use tracing::debug;
use validator::ValidateEmail;

use crate::auth::{PasswordError, PasswordHasher};
use crate::database::executor;
use crate::database::models::user::{UserCredentials, USER_COLUMNS, USER_UPDATE};
use crate::database::models::{NewUser, User, UserDetail};
use crate::database::{sql_for_partial_update, DatabaseError, UpdateSpec};
use crate::filter::SqlResult;

const RETURNING: &str = "RETURNING username, first_name, last_name, email, is_admin";

/// Argon2 is deliberately slow; keep it off the async workers.
async fn hash_password(hasher: &PasswordHasher, password: &str) -> Result<String, DatabaseError> {
    let hasher = hasher.clone();
    let password = password.to_string();
    let digest = tokio::task::spawn_blocking(move || hasher.hash(&password))
        .await
        .map_err(|e| PasswordError::Hashing(e.to_string()))??;
    Ok(digest)
}

async fn verify_password(hasher: &PasswordHasher, password: &str, digest: String) -> Result<bool, DatabaseError> {
    let hasher = hasher.clone();
    let password = password.to_string();
    tokio::task::spawn_blocking(move || hasher.verify(&password, &digest))
        .await
        .map_err(|e| PasswordError::Hashing(e.to_string()).into())
}

/// Unknown usernames and wrong passwords fail identically.
pub async fn authenticate(
    pool: &PgPool,
    hasher: &PasswordHasher,
    username: &str,
    password: &str,
) -> Result<User, DatabaseError> {
    let row = sqlx::query_as::<_, UserCredentials>(
        "SELECT username, password, first_name, last_name, email, is_admin
         FROM users
         WHERE username = $1",
    )
    .bind(username)
    .fetch_optional(pool)
    .await?;

    let Some(row) = row else {
        debug!("Login attempt for unknown user");
        return Err(DatabaseError::InvalidCredentials);
    };

    let digest = row.password.clone();
    if verify_password(hasher, password, digest).await? {
        Ok(User::from(row))
    } else {
        Err(DatabaseError::InvalidCredentials)
    }
}

pub async fn register(pool: &PgPool, hasher: &PasswordHasher, user: &NewUser) -> Result<User, DatabaseError> {
    let digest = hash_password(hasher, &user.password).await?;

    sqlx::query_as::<_, User>(&format!(
        "INSERT INTO users (username, password, first_name, last_name, email, is_admin)
         VALUES ($1, $2, $3, $4, $5, $6)
         {}",
        RETURNING
    ))
    .bind(&user.username)
    .bind(&digest)
    .bind(&user.first_name)
    .bind(&user.last_name)
    .bind(&user.email)
    .bind(user.is_admin)
    .fetch_one(pool)
    .await
    .map_err(|e| {
        DatabaseError::from_constraint(
            e,
            || DatabaseError::Duplicate(format!("Duplicate username: {}", user.username)),
            |_| DatabaseError::InvalidData("Invalid user reference".to_string()),
        )
    })
}

pub async fn find_all(pool: &PgPool) -> Result<Vec<User>, DatabaseError> {
    let users = sqlx::query_as::<_, User>(&format!(
        "SELECT {} FROM users ORDER BY username",
        USER_COLUMNS.join(", ")
    ))
    .fetch_all(pool)
    .await?;
    Ok(users)
}

pub async fn get(pool: &PgPool, username: &str) -> Result<UserDetail, DatabaseError> {
    let user = sqlx::query_as::<_, User>(&format!("SELECT {} FROM users WHERE username = $1", USER_COLUMNS.join(", ")))
        .bind(username)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| DatabaseError::NotFound(format!("No user: {}", username)))?;

    let applications: Vec<i32> = sqlx::query_scalar(
        "SELECT job_id FROM applications WHERE username = $1 ORDER BY job_id",
    )
    .bind(username)
    .fetch_all(pool)
    .await?;

    Ok(UserDetail { user, applications })
}

/// Checks field values the column types cannot; `password` must already be hashed.
fn check_changes(changes: &UpdateSpec) -> Result<(), DatabaseError> {
    if let Some(email) = changes.get("email") {
        if !email.as_str().is_some_and(|e| e.validate_email()) {
            return Err(DatabaseError::InvalidData("email must be an email address".to_string()));
        }
    }
    for name in ["firstName", "lastName"] {
        if let Some(value) = changes.get(name) {
            if !value.as_str().is_some_and(|s| !s.trim().is_empty()) {
                return Err(DatabaseError::InvalidData(format!("{} must not be empty", name)));
            }
        }
    }
    Ok(())
}

pub fn update_sql(username: &str, changes: &UpdateSpec) -> Result<SqlResult, DatabaseError> {
    check_changes(changes)?;

    let update = sql_for_partial_update(changes, &USER_UPDATE)?;
    let query = format!(
        "UPDATE users SET {} WHERE username = {} {}",
        update.set_clause,
        update.next_placeholder(),
        RETURNING
    );
    let mut params = update.params;
    params.push(Value::String(username.to_string()));
    Ok(SqlResult { query, params })
}

/// A new password is hashed before it reaches the update.
pub async fn update(
    pool: &PgPool,
    hasher: &PasswordHasher,
    username: &str,
    changes: &UpdateSpec,
) -> Result<User, DatabaseError> {
    let mut changes = changes.clone();
    if let Some(password) = changes.get("password") {
        let password = password
            .as_str()
            .filter(|p| (5..=20).contains(&p.chars().count()))
            .ok_or_else(|| DatabaseError::InvalidData("password must be 5-20 characters".to_string()))?
            .to_string();
        let digest = hash_password(hasher, &password).await?;
        changes.replace("password", Value::String(digest));
    }

    let sql = update_sql(username, &changes)?;
    executor::fetch_optional_as::<User>(pool, &sql)
        .await?
        .ok_or_else(|| DatabaseError::NotFound(format!("No user: {}", username)))
}

pub async fn remove(pool: &PgPool, username: &str) -> Result<(), DatabaseError> {
    let deleted = sqlx::query("DELETE FROM users WHERE username = $1")
        .bind(username)
        .execute(pool)
        .await?
        .rows_affected();

    if deleted == 0 {
        return Err(DatabaseError::NotFound(format!("No user: {}", username)));
    }
    Ok(())
}

/// One insert: the primary key rejects repeats, the foreign keys reject
/// unknown users and jobs.
pub async fn apply_to_job(pool: &PgPool, username: &str, job_id: i32) -> Result<(), DatabaseError> {
    sqlx::query("INSERT INTO applications (username, job_id) VALUES ($1, $2)")
        .bind(username)
        .bind(job_id)
        .execute(pool)
        .await
        .map_err(|e| {
            DatabaseError::from_constraint(
                e,
                || DatabaseError::Duplicate(format!("Already applied to job: {}", job_id)),
                |constraint| match constraint {
                    Some(name) if name.contains("job_id") => {
                        DatabaseError::NotFound(format!("No job: {}", job_id))
                    }
                    _ => DatabaseError::NotFound(format!("No user: {}", username)),
                },
            )
        })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn update_remaps_names() {
        let changes = UpdateSpec::new().with("firstName", "Aliya").with("email", "a@b.com");
        let sql = update_sql("u1", &changes).unwrap();
        assert_eq!(
            sql.query,
            "UPDATE users SET first_name = $1, email = $2 WHERE username = $3 RETURNING username, first_name, last_name, email, is_admin"
        );
        assert_eq!(sql.params, vec![json!("Aliya"), json!("a@b.com"), json!("u1")]);
    }

    #[test]
    fn admin_flag_is_not_updatable() {
        let changes = UpdateSpec::new().with("isAdmin", true);
        assert_eq!(update_sql("u1", &changes).unwrap_err().to_string(), "unrecognized field: isAdmin");
    }

    #[test]
    fn username_is_not_updatable() {
        let changes = UpdateSpec::new().with("username", "u9");
        assert_eq!(update_sql("u1", &changes).unwrap_err().to_string(), "unrecognized field: username");
    }

    #[test]
    fn bad_email_rejected() {
        let changes = UpdateSpec::new().with("email", "not-an-email");
        assert_eq!(
            update_sql("u1", &changes).unwrap_err().to_string(),
            "email must be an email address"
        );
    }

    #[test]
    fn blank_last_name_rejected() {
        let changes = UpdateSpec::new().with("lastName", "  ");
        assert!(matches!(update_sql("u1", &changes), Err(DatabaseError::InvalidData(_))));
    }

    #[tokio::test]
    async fn hashing_runs_off_the_runtime() {
        let hasher = PasswordHasher::new(1).unwrap();
        let digest = hash_password(&hasher, "password1").await.unwrap();
        assert!(verify_password(&hasher, "password1", digest.clone()).await.unwrap());
        assert!(!verify_password(&hasher, "password2", digest).await.unwrap());
    }
}
