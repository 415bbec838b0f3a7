use std::collections::BTreeMap;
use std::sync::Arc;

use crate::domain::{User, UserStats};
use crate::error::{DomainError, RepoError};
use crate::ports::{CommentRepository, PostRepository, UserRepository};
use crate::validation::ValidationErrors;

/// Profile fields accepted by the upsert.
#[derive(Debug, Clone, Default)]
pub struct ProfileInput {
    pub firebase_uid: Option<String>,
    pub email: Option<String>,
    pub username: Option<String>,
    pub display_name: Option<String>,
    pub bio: Option<String>,
    pub social_links: Option<BTreeMap<String, String>>,
    pub preferences: Option<BTreeMap<String, serde_json::Value>>,
}

pub struct UserService {
    users: Arc<dyn UserRepository>,
    posts: Arc<dyn PostRepository>,
    comments: Arc<dyn CommentRepository>,
}

impl UserService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        posts: Arc<dyn PostRepository>,
        comments: Arc<dyn CommentRepository>,
    ) -> Self {
        Self {
            users,
            posts,
            comments,
        }
    }

    pub async fn get(&self, firebase_uid: &str) -> Result<User, DomainError> {
        tracing::debug!(firebase_uid, "Finding user by uid");
        self.users
            .find_by_id(firebase_uid.to_string())
            .await?
            .ok_or_else(|| DomainError::not_found("User", firebase_uid))
    }

    pub async fn get_by_username(&self, username: &str) -> Result<User, DomainError> {
        tracing::debug!(username, "Finding user by username");
        self.users
            .find_by_username(username)
            .await?
            .ok_or_else(|| DomainError::not_found("User", username))
    }

    /// Create or replace the profile keyed by `firebase_uid`.
    ///
    /// The username availability check and the write are separate store calls.
    pub async fn upsert(&self, input: ProfileInput) -> Result<User, DomainError> {
        let user = validate_profile(input)?;

        if let Some(holder) = self.users.find_by_username(&user.username).await? {
            if holder.firebase_uid != user.firebase_uid {
                tracing::warn!(username = %user.username, "Username already taken");
                return Err(DomainError::Duplicate(USERNAME_TAKEN.to_string()));
            }
        }

        let saved = self.users.upsert(user).await.map_err(upsert_err)?;
        tracing::info!(firebase_uid = %saved.firebase_uid, "User profile saved");
        Ok(saved)
    }

    /// Point the profile photo at an already stored image. Returns the new reference.
    pub async fn update_profile_photo(
        &self,
        firebase_uid: Option<String>,
        profile_photo: Option<String>,
    ) -> Result<String, DomainError> {
        let mut errors = ValidationErrors::new();
        let profile_photo = errors.required("profilePhoto", profile_photo);
        let firebase_uid = errors.required("firebaseUid", firebase_uid);
        let (firebase_uid, profile_photo) = match (firebase_uid, profile_photo) {
            (Some(uid), Some(photo)) => (uid, photo),
            _ => return Err(errors.into()),
        };

        let user = self
            .users
            .set_profile_photo(&firebase_uid, &profile_photo)
            .await?
            .ok_or_else(|| DomainError::not_found("User", &firebase_uid))?;

        tracing::info!(firebase_uid = %user.firebase_uid, "Profile photo updated");
        Ok(profile_photo)
    }

    /// Activity totals computed on every call; nothing is cached.
    pub async fn stats(&self, firebase_uid: &str) -> Result<UserStats, DomainError> {
        let posts = self.posts.find_by_author(firebase_uid).await?;
        let comments_count = self.comments.count_by_author(firebase_uid).await?;

        Ok(UserStats {
            posts_count: posts.len() as u64,
            comments_count,
            likes_received: posts.iter().map(|p| u64::from(p.likes_count)).sum(),
        })
    }
}

fn validate_profile(input: ProfileInput) -> Result<User, ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let firebase_uid = errors.required("firebaseUid", input.firebase_uid);
    let email = errors
        .required("email", input.email)
        .map(|e| e.trim().to_string());
    if let Some(email) = &email {
        if !email.contains('@') {
            errors.add("email", "is not a valid email address");
        }
    }
    let username = errors
        .required("username", input.username)
        .map(|u| u.trim().to_string());
    let display_name = errors
        .required("displayName", input.display_name)
        .map(|d| d.trim().to_string());

    match (firebase_uid, email, username, display_name) {
        (Some(uid), Some(email), Some(username), Some(display_name)) if errors.is_empty() => {
            let mut user = User::new(uid, email, username, display_name);
            user.bio = input.bio.unwrap_or_default();
            user.social_links = input.social_links.unwrap_or_default();
            user.preferences = input.preferences.unwrap_or_default();
            Ok(user)
        }
        _ => Err(errors),
    }
}

const USERNAME_TAKEN: &str = "Username is already taken";

/// A unique violation during the write means another profile claimed the
/// username after the availability check.
fn upsert_err(err: RepoError) -> DomainError {
    match err {
        RepoError::Constraint(detail) if detail.contains("username") => {
            tracing::warn!(%detail, "Username claimed concurrently");
            DomainError::Duplicate(USERNAME_TAKEN.to_string())
        }
        RepoError::Constraint(detail) => {
            tracing::warn!(%detail, "Profile conflicts with an existing user");
            DomainError::Duplicate("Profile conflicts with an existing user".to_string())
        }
        other => DomainError::Repository(other),
    }
}
