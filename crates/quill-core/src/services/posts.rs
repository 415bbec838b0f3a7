use std::sync::Arc;

use uuid::Uuid;

use crate::domain::{Category, EXCERPT_MAX_CHARS, Post, TITLE_MAX_CHARS};
use crate::error::{DomainError, RepoError};
use crate::ports::{CommentRepository, PostRepository};
use crate::validation::ValidationErrors;

use super::ensure_owner;

/// Input for creating a post. Fields are optional so that missing ones can be
/// reported together.
#[derive(Debug, Clone, Default)]
pub struct NewPost {
    pub title: Option<String>,
    pub content: Option<String>,
    pub author_id: Option<String>,
    pub excerpt: Option<String>,
    pub category: Option<String>,
    pub tags: Option<Vec<String>>,
    pub featured_image: Option<String>,
}

/// Partial update of a post; `None` leaves the field unchanged.
#[derive(Debug, Clone, Default)]
pub struct PostChanges {
    pub title: Option<String>,
    pub content: Option<String>,
    pub excerpt: Option<String>,
    pub category: Option<String>,
    pub tags: Option<Vec<String>>,
    pub featured_image: Option<String>,
}

pub struct PostService {
    posts: Arc<dyn PostRepository>,
    comments: Arc<dyn CommentRepository>,
}

impl PostService {
    pub fn new(posts: Arc<dyn PostRepository>, comments: Arc<dyn CommentRepository>) -> Self {
        Self { posts, comments }
    }

    /// All posts, newest first.
    pub async fn list(&self) -> Result<Vec<Post>, DomainError> {
        let posts = self.posts.list_newest_first().await?;
        self.with_comment_counts(posts).await
    }

    pub async fn get(&self, id: Uuid) -> Result<Post, DomainError> {
        let post = self.load(id).await?;
        self.with_comment_count(post).await
    }

    /// Posts by one author, newest first.
    pub async fn list_by_author(&self, author_id: &str) -> Result<Vec<Post>, DomainError> {
        let posts = self.posts.find_by_author(author_id).await?;
        self.with_comment_counts(posts).await
    }

    pub async fn create(&self, input: NewPost) -> Result<Post, DomainError> {
        let post = validate_new_post(input)?;
        let saved = self.posts.insert(post).await?;

        tracing::info!(post_id = %saved.id, author_id = %saved.author_id, "Post created");
        Ok(saved)
    }

    /// Apply `changes` if `actor` owns the post. Checks run in the order
    /// not-found, forbidden, validation.
    pub async fn update(
        &self,
        id: Uuid,
        actor: Option<&str>,
        changes: PostChanges,
    ) -> Result<Post, DomainError> {
        let mut post = self.load(id).await?;
        ensure_owner("Post", id, &post.author_id, actor)?;

        apply_changes(&mut post, changes)?;
        post.touch();
        let saved = self.store_update(post).await?;

        tracing::info!(post_id = %id, "Post updated");
        self.with_comment_count(saved).await
    }

    /// Delete the post and every comment on it. Returns the number of comments removed.
    pub async fn delete(&self, id: Uuid, actor: Option<&str>) -> Result<u64, DomainError> {
        let post = self.load(id).await?;
        ensure_owner("Post", id, &post.author_id, actor)?;

        let removed = self.posts.delete_cascade(id).await.map_err(|e| match e {
            RepoError::NotFound => DomainError::not_found("Post", id),
            other => DomainError::Repository(other),
        })?;

        tracing::info!(post_id = %id, comments_deleted = removed, "Post deleted");
        Ok(removed)
    }

    /// Like the post for `user_id`, or remove that like if it is already there.
    pub async fn toggle_like(&self, id: Uuid, user_id: Option<String>) -> Result<Post, DomainError> {
        let mut errors = ValidationErrors::new();
        let user_id = errors.required("userId", user_id);
        let user_id = match user_id {
            Some(user_id) => user_id,
            None => return Err(errors.into()),
        };

        let mut post = self.load(id).await?;
        let liked = post.toggle_like(&user_id);
        post.touch();
        let saved = self.store_update(post).await?;

        tracing::debug!(post_id = %id, user_id = %user_id, liked, "Post like toggled");
        self.with_comment_count(saved).await
    }

    async fn load(&self, id: Uuid) -> Result<Post, DomainError> {
        self.posts
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Post", id))
    }

    /// Write back a loaded post. A post deleted since it was loaded stays deleted.
    async fn store_update(&self, post: Post) -> Result<Post, DomainError> {
        let id = post.id;
        self.posts.update(post).await.map_err(|e| match e {
            RepoError::NotFound => DomainError::not_found("Post", id),
            other => DomainError::Repository(other),
        })
    }

    async fn with_comment_count(&self, post: Post) -> Result<Post, DomainError> {
        let mut posts = self.with_comment_counts(vec![post]).await?;
        Ok(posts.remove(0))
    }

    async fn with_comment_counts(&self, mut posts: Vec<Post>) -> Result<Vec<Post>, DomainError> {
        if posts.is_empty() {
            return Ok(posts);
        }
        let ids: Vec<Uuid> = posts.iter().map(|p| p.id).collect();
        let counts = self.comments.count_by_posts(&ids).await?;
        for post in &mut posts {
            post.comments_count = counts.get(&post.id).copied().unwrap_or(0);
        }
        Ok(posts)
    }
}

fn validate_new_post(input: NewPost) -> Result<Post, ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let title = errors
        .required("title", input.title)
        .map(|t| t.trim().to_string());
    if let Some(title) = &title {
        errors.max_chars("title", title, TITLE_MAX_CHARS);
    }
    let content = errors.required("content", input.content);
    let author_id = errors.required("authorId", input.author_id);
    let category = parse_category(&mut errors, input.category.as_deref());
    if let Some(excerpt) = &input.excerpt {
        errors.max_chars("excerpt", excerpt.trim(), EXCERPT_MAX_CHARS);
    }

    match (title, content, author_id, category) {
        (Some(title), Some(content), Some(author_id), Some(category)) if errors.is_empty() => {
            let mut post = Post::new(author_id, title, content.clone());
            post.set_content(content, input.excerpt);
            post.category = category;
            post.tags = normalize_tags(input.tags.unwrap_or_default());
            post.featured_image = input.featured_image.unwrap_or_default();
            Ok(post)
        }
        _ => Err(errors),
    }
}

fn apply_changes(post: &mut Post, changes: PostChanges) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();

    errors.not_blank("title", changes.title.as_deref());
    if let Some(title) = &changes.title {
        errors.max_chars("title", title.trim(), TITLE_MAX_CHARS);
    }
    errors.not_blank("content", changes.content.as_deref());
    let category = match &changes.category {
        Some(_) => parse_category(&mut errors, changes.category.as_deref()),
        None => Some(post.category),
    };
    if let Some(excerpt) = &changes.excerpt {
        errors.max_chars("excerpt", excerpt.trim(), EXCERPT_MAX_CHARS);
    }
    errors.finish()?;

    if let Some(title) = changes.title {
        post.title = title.trim().to_string();
    }
    match changes.content {
        Some(content) => post.set_content(content, changes.excerpt),
        None => {
            if let Some(excerpt) = changes.excerpt {
                let content = std::mem::take(&mut post.content);
                post.set_content(content, Some(excerpt));
            }
        }
    }
    if let Some(category) = category {
        post.category = category;
    }
    if let Some(tags) = changes.tags {
        post.tags = normalize_tags(tags);
    }
    if let Some(featured_image) = changes.featured_image {
        post.featured_image = featured_image;
    }
    Ok(())
}

/// Blank or absent means the default category.
fn parse_category(errors: &mut ValidationErrors, value: Option<&str>) -> Option<Category> {
    match value.map(str::trim) {
        None | Some("") => Some(Category::default()),
        Some(name) => match name.parse() {
            Ok(category) => Some(category),
            Err(e) => {
                errors.add("category", e.to_string());
                None
            }
        },
    }
}

fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    tags.into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}
