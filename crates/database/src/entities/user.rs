//! User entity definitions

use serde::{Deserialize, Serialize};

/// A persisted user row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fullname: Option<String>,
}

/// Fields for inserting a new user; the store assigns `id`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub fullname: Option<String>,
}

impl NewUser {
    pub fn new(username: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            email: email.into(),
            fullname: None,
        }
    }

    pub fn with_fullname(mut self, fullname: impl Into<String>) -> Self {
        self.fullname = Some(fullname.into());
        self
    }

    /// Both `username` and `email` carry something other than whitespace.
    pub fn has_required_fields(&self) -> bool {
        !self.username.trim().is_empty() && !self.email.trim().is_empty()
    }

    /// `fullname` as stored: blank values are kept as NULL.
    pub fn stored_fullname(&self) -> Option<&str> {
        non_blank(self.fullname.as_deref())
    }
}

/// Partial update; absent or blank fields are left untouched
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPatch {
    pub username: Option<String>,
    pub email: Option<String>,
    pub fullname: Option<String>,
}

impl UserPatch {
    /// Column/value pairs that the update will write, in a fixed column order.
    pub fn assignments(&self) -> Vec<(&'static str, &str)> {
        [
            ("username", self.username.as_deref()),
            ("email", self.email.as_deref()),
            ("fullname", self.fullname.as_deref()),
        ]
        .into_iter()
        .filter_map(|(column, value)| non_blank(value).map(|value| (column, value)))
        .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.assignments().is_empty()
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|value| !value.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_user_requires_username_and_email() {
        assert!(NewUser::new("alice", "a@x.com").has_required_fields());
        assert!(!NewUser::new("", "a@x.com").has_required_fields());
        assert!(!NewUser::new("alice", "   ").has_required_fields());
    }

    #[test]
    fn blank_fullname_is_stored_as_null() {
        let user = NewUser::new("alice", "a@x.com").with_fullname("");
        assert_eq!(user.stored_fullname(), None);

        let user = NewUser::new("alice", "a@x.com").with_fullname("Alice A.");
        assert_eq!(user.stored_fullname(), Some("Alice A."));
    }

    #[test]
    fn patch_skips_absent_and_blank_fields() {
        let patch = UserPatch {
            username: Some(String::new()),
            email: Some("new@x.com".to_string()),
            fullname: None,
        };

        assert_eq!(patch.assignments(), vec![("email", "new@x.com")]);
        assert!(!patch.is_empty());
        assert!(UserPatch::default().is_empty());
    }

    #[test]
    fn user_omits_missing_fullname_when_serialized() {
        let user = User {
            id: 7,
            username: "bob".to_string(),
            email: "b@x.com".to_string(),
            fullname: None,
        };

        let value = serde_json::to_value(&user).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"id": 7, "username": "bob", "email": "b@x.com"})
        );
    }
}
