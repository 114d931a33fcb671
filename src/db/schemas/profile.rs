//! User profile document schema
//!
//! Denormalized projection of an inspector plus its linked identity
//! account, keyed by the account id and used for role-based lookups.

use serde::{Deserialize, Serialize};

/// Collection name for user profiles
pub const USER_COLLECTION: &str = "users";

/// Role written for every profile provisioned by this tool
pub const INSPECTOR_ROLE: &str = "inspector";

/// User profile document stored in MongoDB, keyed by account id
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct UserProfileDoc {
    /// Identity account id (also the document key)
    #[serde(rename = "_id")]
    pub id: String,

    pub email: String,

    /// Duplicate of the account id, kept for client-side queries
    pub authid: String,

    pub role: String,

    pub display_name: String,

    /// Set once, when the upsert first inserts the profile
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<bson::DateTime>,

    /// Set when the profile already existed and was merged into
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<bson::DateTime>,
}

impl UserProfileDoc {
    /// Build a profile for an inspector account
    pub fn new(uid: &str, email: &str, display_name: &str) -> Self {
        Self {
            id: uid.to_string(),
            email: email.to_string(),
            authid: uid.to_string(),
            role: INSPECTOR_ROLE.to_string(),
            display_name: display_name.to_string(),
            created_at: None,
            updated_at: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_profile_shape() {
        let profile = UserProfileDoc::new("uid-1", "a@b.c", "Ana Cruz");
        assert_eq!(profile.id, "uid-1");
        assert_eq!(profile.authid, "uid-1");
        assert_eq!(profile.role, INSPECTOR_ROLE);
        assert!(profile.created_at.is_none());
        assert!(profile.updated_at.is_none());
    }
}
