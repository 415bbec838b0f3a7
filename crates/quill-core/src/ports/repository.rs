use std::collections::HashMap;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Comment, Post, User};
use crate::error::RepoError;

/// Generic repository trait defining standard CRUD operations.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Store a new entity.
    async fn insert(&self, entity: T) -> Result<T, RepoError>;

    /// Overwrite an existing entity. Returns `RepoError::NotFound` when no
    /// record with its id exists; a deleted record is never recreated.
    async fn update(&self, entity: T) -> Result<T, RepoError>;

    /// Delete an entity by its ID.
    async fn delete(&self, id: ID) -> Result<(), RepoError>;
}

/// Post repository.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, Uuid> {
    /// Every post, newest `created_at` first.
    async fn list_newest_first(&self) -> Result<Vec<Post>, RepoError>;

    /// Posts written by `author_id`, newest first.
    async fn find_by_author(&self, author_id: &str) -> Result<Vec<Post>, RepoError>;

    /// Delete a post together with every comment referencing it, as one unit.
    ///
    /// Returns the number of comments removed, or `RepoError::NotFound` when
    /// the post no longer exists (nothing is removed in that case).
    async fn delete_cascade(&self, id: Uuid) -> Result<u64, RepoError>;
}

/// Comment repository.
#[async_trait]
pub trait CommentRepository: BaseRepository<Comment, Uuid> {
    /// Comments on `post_id`, oldest first.
    async fn find_by_post(&self, post_id: Uuid) -> Result<Vec<Comment>, RepoError>;

    /// Comments written by `author_id`, newest first.
    async fn find_by_author(&self, author_id: &str) -> Result<Vec<Comment>, RepoError>;

    async fn count_by_author(&self, author_id: &str) -> Result<u64, RepoError>;

    /// Comment totals per post. Posts without comments are absent from the map.
    async fn count_by_posts(&self, post_ids: &[Uuid]) -> Result<HashMap<Uuid, u64>, RepoError>;
}

/// User repository, keyed by the identity provider uid.
#[async_trait]
pub trait UserRepository: BaseRepository<User, String> {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError>;

    /// Insert or replace the profile keyed by `firebase_uid` in one store call.
    ///
    /// An existing record keeps its `created_at` and `profile_photo`.
    async fn upsert(&self, user: User) -> Result<User, RepoError>;

    /// Set the profile photo. Returns `None` when no such user exists.
    async fn set_profile_photo(
        &self,
        firebase_uid: &str,
        profile_photo: &str,
    ) -> Result<Option<User>, RepoError>;
}
