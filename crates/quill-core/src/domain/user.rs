use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// User entity - a profile keyed by the identity provider's stable id.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub firebase_uid: String,
    pub email: String,
    pub username: String,
    pub display_name: String,
    pub bio: String,
    pub social_links: BTreeMap<String, String>,
    pub preferences: BTreeMap<String, serde_json::Value>,
    pub profile_photo: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new profile with empty optional fields.
    pub fn new(firebase_uid: String, email: String, username: String, display_name: String) -> Self {
        let now = Utc::now();
        Self {
            firebase_uid,
            email,
            username,
            display_name,
            bio: String::new(),
            social_links: BTreeMap::new(),
            preferences: BTreeMap::new(),
            profile_photo: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Per-user activity totals, aggregated on demand.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    pub posts_count: u64,
    pub comments_count: u64,
    pub likes_received: u64,
}
