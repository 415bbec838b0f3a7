//! In-memory store - used when no database is configured, and by tests.
//!
//! All three collections sit behind one async `RwLock`, so every repository
//! call (including the post/comment cascade) is atomic with respect to the others.
//! Data is lost on process restart.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use quill_core::domain::{Comment, Post, User};
use quill_core::error::RepoError;
use quill_core::ports::{BaseRepository, CommentRepository, PostRepository, UserRepository};

#[derive(Default)]
struct Collections {
    posts: HashMap<Uuid, Post>,
    comments: HashMap<Uuid, Comment>,
    users: HashMap<String, User>,
}

/// In-memory implementation of every repository port.
pub struct InMemoryStore {
    data: RwLock<Collections>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            data: RwLock::new(Collections::default()),
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn newest_first<T>(items: &mut [T], created_at: impl Fn(&T) -> chrono::DateTime<Utc>) {
    items.sort_by(|a, b| created_at(b).cmp(&created_at(a)));
}

#[async_trait]
impl BaseRepository<Post, Uuid> for InMemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        Ok(self.data.read().await.posts.get(&id).cloned())
    }

    async fn insert(&self, post: Post) -> Result<Post, RepoError> {
        let mut data = self.data.write().await;
        match data.posts.entry(post.id) {
            Entry::Occupied(_) => Err(RepoError::Constraint("posts_pkey".to_string())),
            Entry::Vacant(slot) => Ok(slot.insert(post).clone()),
        }
    }

    async fn update(&self, post: Post) -> Result<Post, RepoError> {
        let mut data = self.data.write().await;
        let slot = data.posts.get_mut(&post.id).ok_or(RepoError::NotFound)?;
        *slot = post.clone();
        Ok(post)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut data = self.data.write().await;
        data.posts.remove(&id).map(|_| ()).ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl PostRepository for InMemoryStore {
    async fn list_newest_first(&self) -> Result<Vec<Post>, RepoError> {
        let mut posts: Vec<Post> = self.data.read().await.posts.values().cloned().collect();
        newest_first(&mut posts, |p| p.created_at);
        Ok(posts)
    }

    async fn find_by_author(&self, author_id: &str) -> Result<Vec<Post>, RepoError> {
        let mut posts: Vec<Post> = self
            .data
            .read()
            .await
            .posts
            .values()
            .filter(|p| p.author_id == author_id)
            .cloned()
            .collect();
        newest_first(&mut posts, |p| p.created_at);
        Ok(posts)
    }

    async fn delete_cascade(&self, id: Uuid) -> Result<u64, RepoError> {
        let mut data = self.data.write().await;
        if data.posts.remove(&id).is_none() {
            return Err(RepoError::NotFound);
        }
        let before = data.comments.len();
        data.comments.retain(|_, c| c.post_id != id);
        Ok((before - data.comments.len()) as u64)
    }
}

#[async_trait]
impl BaseRepository<Comment, Uuid> for InMemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Comment>, RepoError> {
        Ok(self.data.read().await.comments.get(&id).cloned())
    }

    async fn insert(&self, comment: Comment) -> Result<Comment, RepoError> {
        let mut data = self.data.write().await;
        match data.comments.entry(comment.id) {
            Entry::Occupied(_) => Err(RepoError::Constraint("comments_pkey".to_string())),
            Entry::Vacant(slot) => Ok(slot.insert(comment).clone()),
        }
    }

    async fn update(&self, comment: Comment) -> Result<Comment, RepoError> {
        let mut data = self.data.write().await;
        let slot = data.comments.get_mut(&comment.id).ok_or(RepoError::NotFound)?;
        *slot = comment.clone();
        Ok(comment)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut data = self.data.write().await;
        data.comments.remove(&id).map(|_| ()).ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl CommentRepository for InMemoryStore {
    async fn find_by_post(&self, post_id: Uuid) -> Result<Vec<Comment>, RepoError> {
        let mut comments: Vec<Comment> = self
            .data
            .read()
            .await
            .comments
            .values()
            .filter(|c| c.post_id == post_id)
            .cloned()
            .collect();
        comments.sort_by_key(|c| c.created_at);
        Ok(comments)
    }

    async fn find_by_author(&self, author_id: &str) -> Result<Vec<Comment>, RepoError> {
        let mut comments: Vec<Comment> = self
            .data
            .read()
            .await
            .comments
            .values()
            .filter(|c| c.author_id == author_id)
            .cloned()
            .collect();
        newest_first(&mut comments, |c| c.created_at);
        Ok(comments)
    }

    async fn count_by_author(&self, author_id: &str) -> Result<u64, RepoError> {
        let data = self.data.read().await;
        Ok(data
            .comments
            .values()
            .filter(|c| c.author_id == author_id)
            .count() as u64)
    }

    async fn count_by_posts(&self, post_ids: &[Uuid]) -> Result<HashMap<Uuid, u64>, RepoError> {
        let data = self.data.read().await;
        let mut counts = HashMap::new();
        for comment in data.comments.values() {
            if post_ids.contains(&comment.post_id) {
                *counts.entry(comment.post_id).or_insert(0) += 1;
            }
        }
        Ok(counts)
    }
}

#[async_trait]
impl BaseRepository<User, String> for InMemoryStore {
    async fn find_by_id(&self, firebase_uid: String) -> Result<Option<User>, RepoError> {
        Ok(self.data.read().await.users.get(&firebase_uid).cloned())
    }

    async fn insert(&self, user: User) -> Result<User, RepoError> {
        let mut data = self.data.write().await;
        match data.users.entry(user.firebase_uid.clone()) {
            Entry::Occupied(_) => Err(RepoError::Constraint("users_pkey".to_string())),
            Entry::Vacant(slot) => Ok(slot.insert(user).clone()),
        }
    }

    async fn update(&self, user: User) -> Result<User, RepoError> {
        let mut data = self.data.write().await;
        let slot = data.users.get_mut(&user.firebase_uid).ok_or(RepoError::NotFound)?;
        *slot = user.clone();
        Ok(user)
    }

    async fn delete(&self, firebase_uid: String) -> Result<(), RepoError> {
        let mut data = self.data.write().await;
        data.users
            .remove(&firebase_uid)
            .map(|_| ())
            .ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        let data = self.data.read().await;
        Ok(data.users.values().find(|u| u.username == username).cloned())
    }

    async fn upsert(&self, mut user: User) -> Result<User, RepoError> {
        let mut data = self.data.write().await;

        // Mirrors the unique index on users.username.
        if data
            .users
            .values()
            .any(|u| u.username == user.username && u.firebase_uid != user.firebase_uid)
        {
            return Err(RepoError::Constraint("username already exists".to_string()));
        }

        if let Some(existing) = data.users.get(&user.firebase_uid) {
            user.created_at = existing.created_at;
            user.profile_photo = existing.profile_photo.clone();
        }
        user.updated_at = Utc::now();
        data.users.insert(user.firebase_uid.clone(), user.clone());
        Ok(user)
    }

    async fn set_profile_photo(
        &self,
        firebase_uid: &str,
        profile_photo: &str,
    ) -> Result<Option<User>, RepoError> {
        let mut data = self.data.write().await;
        Ok(data.users.get_mut(firebase_uid).map(|user| {
            user.profile_photo = Some(profile_photo.to_string());
            user.updated_at = Utc::now();
            user.clone()
        }))
    }
}
