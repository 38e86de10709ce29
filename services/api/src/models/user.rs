//! User account model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// User account that can list cars
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn draft(&self) -> UserDraft {
        UserDraft {
            username: self.username.clone(),
            email: self.email.clone(),
        }
    }
}

/// Writable user fields
#[derive(Debug, Clone, PartialEq)]
pub struct UserDraft {
    pub username: String,
    pub email: String,
}

impl UserDraft {
    pub fn into_user(self, id: i64, created_at: DateTime<Utc>, updated_at: DateTime<Utc>) -> User {
        User {
            id,
            username: self.username,
            email: self.email,
            created_at,
            updated_at,
        }
    }
}
