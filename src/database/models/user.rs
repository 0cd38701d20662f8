use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::database::partial_update::UpdateColumns;

pub const USER_COLUMNS: &[&str] = &["username", "first_name", "last_name", "email", "is_admin"];

/// Username is the key; admin status only changes through admin-created accounts.
pub const USER_UPDATE: UpdateColumns = UpdateColumns {
    columns: &["email", "password"],
    remap: &[("firstName", "first_name"), ("lastName", "last_name")],
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub is_admin: bool,
}

/// Stored credentials, never serialized.
#[derive(Debug, Clone, FromRow)]
pub struct UserCredentials {
    pub username: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub is_admin: bool,
}

impl From<UserCredentials> for User {
    fn from(row: UserCredentials) -> Self {
        Self {
            username: row.username,
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            is_admin: row.is_admin,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct UserDetail {
    #[serde(flatten)]
    pub user: User,
    /// Ids of jobs applied to
    #[serde(rename = "jobs")]
    pub applications: Vec<i32>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewUser {
    #[validate(length(min = 1, max = 25, message = "must be 1-25 characters"))]
    pub username: String,
    #[validate(length(min = 5, max = 20, message = "must be 5-20 characters"))]
    pub password: String,
    #[validate(length(min = 1, message = "must not be empty"))]
    pub first_name: String,
    #[validate(length(min = 1, message = "must not be empty"))]
    pub last_name: String,
    #[validate(email(message = "must be an email address"))]
    pub email: String,
    #[serde(default)]
    pub is_admin: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user() -> NewUser {
        NewUser {
            username: "new".into(),
            password: "password".into(),
            first_name: "Test".into(),
            last_name: "Tester".into(),
            email: "test@test.com".into(),
            is_admin: false,
        }
    }

    #[test]
    fn valid_user() {
        assert!(new_user().validate().is_ok());
    }

    #[test]
    fn short_password_and_bad_email() {
        let user = NewUser { password: "pw".into(), email: "nope".into(), ..new_user() };
        let errors = user.validate().unwrap_err();
        let fields = errors.field_errors();
        let password = fields.get("password").and_then(|errs| errs.first()).and_then(|e| e.message.clone());
        assert_eq!(password.as_deref(), Some("must be 5-20 characters"));
        assert!(fields.contains_key("email"));
    }

    #[test]
    fn is_admin_defaults_false() {
        let user: NewUser = serde_json::from_value(serde_json::json!({
            "username": "new", "password": "password", "firstName": "T",
            "lastName": "T", "email": "t@t.com"
        }))
        .unwrap();
        assert!(!user.is_admin);
    }

    #[test]
    fn detail_lists_applied_jobs() {
        let detail = UserDetail {
            user: User {
                username: "u1".into(),
                first_name: "U1F".into(),
                last_name: "U1L".into(),
                email: "u1@email.com".into(),
                is_admin: false,
            },
            applications: vec![2, 5],
        };
        let value = serde_json::to_value(&detail).unwrap();
        assert_eq!(value["jobs"], serde_json::json!([2, 5]));
        assert!(value.get("applications").is_none());
    }

    #[test]
    fn user_json_never_has_password() {
        let user = User::from(UserCredentials {
            username: "u1".into(),
            password: "$argon2id$...".into(),
            first_name: "U1F".into(),
            last_name: "U1L".into(),
            email: "u1@email.com".into(),
            is_admin: false,
        });
        let value = serde_json::to_value(&user).unwrap();
        assert!(value.get("password").is_none());
        assert_eq!(value["firstName"], "U1F");
        assert_eq!(value["isAdmin"], false);
    }
}
