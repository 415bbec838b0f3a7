//! Comment handlers.

use actix_web::{HttpResponse, web};

use quill_core::services::NewComment;
use quill_shared::dto::{
    AuthorRequest, CreateCommentRequest, MessageResponse, UpdateCommentRequest,
};

use super::parse_id;
use crate::middleware::auth::Actor;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// GET /api/comments/post/{post_id} - oldest first
pub async fn list_by_post(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    // No post can have this id, so its thread is empty.
    let Ok(post_id) = parse_id("Post", &path) else {
        return Ok(HttpResponse::Ok().json(Vec::<quill_core::domain::Comment>::new()));
    };
    let comments = state.comments.list_by_post(post_id).await?;
    Ok(HttpResponse::Ok().json(comments))
}

/// GET /api/comments/author/{author_id} - newest first
pub async fn list_by_author(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let comments = state.comments.list_by_author(&path).await?;
    Ok(HttpResponse::Ok().json(comments))
}

/// GET /api/comments/{id}
pub async fn get_comment(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let id = parse_id("Comment", &path)?;
    let comment = state.comments.get(id).await?;
    Ok(HttpResponse::Ok().json(comment))
}

/// POST /api/comments
pub async fn create_comment(
    state: web::Data<AppState>,
    actor: Actor,
    body: web::Json<CreateCommentRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    let comment = state
        .comments
        .create(NewComment {
            post_id: req.post_id,
            content: req.content,
            author_id: actor.resolve(req.author_id),
        })
        .await?;

    Ok(HttpResponse::Created().json(comment))
}

/// PUT /api/comments/{id}
pub async fn update_comment(
    state: web::Data<AppState>,
    actor: Actor,
    path: web::Path<String>,
    body: web::Json<UpdateCommentRequest>,
) -> AppResult<HttpResponse> {
    let id = parse_id("Comment", &path)?;
    let req = body.into_inner();
    let author_id = actor.resolve(req.author_id);

    let comment = state
        .comments
        .update(id, author_id.as_deref(), req.content)
        .await?;

    Ok(HttpResponse::Ok().json(comment))
}

/// DELETE /api/comments/{id}
pub async fn delete_comment(
    state: web::Data<AppState>,
    actor: Actor,
    path: web::Path<String>,
    body: Option<web::Json<AuthorRequest>>,
) -> AppResult<HttpResponse> {
    let id = parse_id("Comment", &path)?;
    let author_id = actor.resolve(body.and_then(|b| b.into_inner().author_id));

    state.comments.delete(id, author_id.as_deref()).await?;

    Ok(HttpResponse::Ok().json(MessageResponse::new("Comment deleted successfully")))
}
