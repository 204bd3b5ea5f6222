//! User model
//!
//! The record type kept by the user directory.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::records::Record;

/// A user record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl User {
    pub fn new(id: impl Into<String>, name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            email: email.into(),
            age: None,
            active: true,
        }
    }
}

impl Record for User {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Reads a JSON array of users from `path`.
pub fn load_users(path: impl AsRef<Path>) -> Result<Vec<User>> {
    let raw = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CacheError;
    use tempfile::TempDir;

    #[test]
    fn test_user_deserialize_defaults() {
        let json = r#"{"id": "u1", "name": "Ada", "email": "ada@example.com"}"#;
        let user: User = serde_json::from_str(json).unwrap();
        assert_eq!(user, User::new("u1", "Ada", "ada@example.com"));
        assert!(user.active);
        assert!(user.age.is_none());
    }

    #[test]
    fn test_load_users() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("users.json");
        fs::write(
            &path,
            r#"[{"id":"1","name":"A","email":"a@x","age":30},{"id":"2","name":"B","email":"b@x","active":false}]"#,
        )
        .unwrap();

        let users = load_users(&path).unwrap();
        assert_eq!(users.len(), 2);
        assert_eq!(users[0].age, Some(30));
        assert!(!users[1].active);
    }

    #[test]
    fn test_load_users_errors() {
        let temp_dir = TempDir::new().unwrap();
        assert!(matches!(
            load_users(temp_dir.path().join("missing.json")),
            Err(CacheError::Io(_))
        ));

        let path = temp_dir.path().join("bad.json");
        fs::write(&path, "{}").unwrap();
        assert!(matches!(load_users(&path), Err(CacheError::Serialization(_))));
    }
}
