use std::sync::Arc;

use uuid::Uuid;

use crate::domain::Comment;
use crate::error::{DomainError, RepoError};
use crate::ports::{CommentRepository, PostRepository};
use crate::validation::ValidationErrors;

use super::ensure_owner;

/// Input for creating a comment.
#[derive(Debug, Clone, Default)]
pub struct NewComment {
    pub post_id: Option<String>,
    pub content: Option<String>,
    pub author_id: Option<String>,
}

pub struct CommentService {
    comments: Arc<dyn CommentRepository>,
    posts: Arc<dyn PostRepository>,
}

impl CommentService {
    pub fn new(comments: Arc<dyn CommentRepository>, posts: Arc<dyn PostRepository>) -> Self {
        Self { comments, posts }
    }

    /// Thread for a post in reading order (oldest first).
    pub async fn list_by_post(&self, post_id: Uuid) -> Result<Vec<Comment>, DomainError> {
        Ok(self.comments.find_by_post(post_id).await?)
    }

    /// Comments by one author, newest first.
    pub async fn list_by_author(&self, author_id: &str) -> Result<Vec<Comment>, DomainError> {
        Ok(self.comments.find_by_author(author_id).await?)
    }

    pub async fn get(&self, id: Uuid) -> Result<Comment, DomainError> {
        self.load(id).await
    }

    /// Create a comment. The referenced post must exist; when it does not the
    /// error names the post, not the comment.
    pub async fn create(&self, input: NewComment) -> Result<Comment, DomainError> {
        let (post_id, content, author_id) = validate_new_comment(input)?;

        if self.posts.find_by_id(post_id).await?.is_none() {
            return Err(DomainError::not_found("Post", post_id));
        }

        let saved = self
            .comments
            .insert(Comment::new(post_id, author_id, content))
            .await?;

        tracing::info!(comment_id = %saved.id, post_id = %post_id, "Comment created");
        Ok(saved)
    }

    pub async fn update(
        &self,
        id: Uuid,
        actor: Option<&str>,
        content: Option<String>,
    ) -> Result<Comment, DomainError> {
        let mut comment = self.load(id).await?;
        ensure_owner("Comment", id, &comment.author_id, actor)?;

        let mut errors = ValidationErrors::new();
        let content = match errors.required("content", content) {
            Some(content) => content,
            None => return Err(errors.into()),
        };

        comment.edit(content);
        // Fails with Not-Found if the comment went away with its post meanwhile.
        let saved = self.comments.update(comment).await.map_err(|e| match e {
            RepoError::NotFound => DomainError::not_found("Comment", id),
            other => DomainError::Repository(other),
        })?;

        tracing::info!(comment_id = %id, "Comment updated");
        Ok(saved)
    }

    pub async fn delete(&self, id: Uuid, actor: Option<&str>) -> Result<(), DomainError> {
        let comment = self.load(id).await?;
        ensure_owner("Comment", id, &comment.author_id, actor)?;

        self.comments.delete(id).await?;

        tracing::info!(comment_id = %id, "Comment deleted");
        Ok(())
    }

    async fn load(&self, id: Uuid) -> Result<Comment, DomainError> {
        self.comments
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Comment", id))
    }
}

fn validate_new_comment(input: NewComment) -> Result<(Uuid, String, String), ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let post_id = errors
        .required("postId", input.post_id)
        .and_then(|raw| match Uuid::parse_str(raw.trim()) {
            Ok(id) => Some(id),
            Err(_) => {
                errors.add("postId", "is not a valid id");
                None
            }
        });
    let content = errors.required("content", input.content);
    let author_id = errors.required("authorId", input.author_id);

    match (post_id, content, author_id) {
        (Some(post_id), Some(content), Some(author_id)) if errors.is_empty() => {
            Ok((post_id, content, author_id))
        }
        _ => Err(errors),
    }
}
