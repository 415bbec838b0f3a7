//! Post handlers.

use actix_web::{HttpResponse, web};

use quill_core::services::{NewPost, PostChanges};
use quill_shared::dto::{
    AuthorRequest, CreatePostRequest, LikeRequest, MessageResponse, UpdatePostRequest,
};

use super::parse_id;
use crate::middleware::auth::Actor;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// GET /api/posts - newest first
pub async fn list_posts(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let posts = state.posts.list().await?;
    Ok(HttpResponse::Ok().json(posts))
}

/// GET /api/posts/{id}
pub async fn get_post(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let id = parse_id("Post", &path)?;
    let post = state.posts.get(id).await?;
    Ok(HttpResponse::Ok().json(post))
}

/// GET /api/posts/author/{author_id}
pub async fn list_by_author(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let posts = state.posts.list_by_author(&path).await?;
    Ok(HttpResponse::Ok().json(posts))
}

/// POST /api/posts
pub async fn create_post(
    state: web::Data<AppState>,
    actor: Actor,
    body: web::Json<CreatePostRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    let post = state
        .posts
        .create(NewPost {
            title: req.title,
            content: req.content,
            author_id: actor.resolve(req.author_id),
            excerpt: req.excerpt,
            category: req.category,
            tags: req.tags,
            featured_image: req.featured_image,
        })
        .await?;

    Ok(HttpResponse::Created().json(post))
}

/// PUT /api/posts/{id}
pub async fn update_post(
    state: web::Data<AppState>,
    actor: Actor,
    path: web::Path<String>,
    body: web::Json<UpdatePostRequest>,
) -> AppResult<HttpResponse> {
    let id = parse_id("Post", &path)?;
    let req = body.into_inner();
    let author_id = actor.resolve(req.author_id);

    let post = state
        .posts
        .update(
            id,
            author_id.as_deref(),
            PostChanges {
                title: req.title,
                content: req.content,
                excerpt: req.excerpt,
                category: req.category,
                tags: req.tags,
                featured_image: req.featured_image,
            },
        )
        .await?;

    Ok(HttpResponse::Ok().json(post))
}

/// DELETE /api/posts/{id} - removes the post and its comments
pub async fn delete_post(
    state: web::Data<AppState>,
    actor: Actor,
    path: web::Path<String>,
    body: Option<web::Json<AuthorRequest>>,
) -> AppResult<HttpResponse> {
    let id = parse_id("Post", &path)?;
    let author_id = actor.resolve(body.and_then(|b| b.into_inner().author_id));

    let removed = state.posts.delete(id, author_id.as_deref()).await?;

    Ok(HttpResponse::Ok().json(MessageResponse {
        message: "Post and associated comments deleted successfully".to_string(),
        comments_deleted: Some(removed),
    }))
}

/// POST /api/posts/{id}/like - toggles the caller's like
pub async fn toggle_like(
    state: web::Data<AppState>,
    actor: Actor,
    path: web::Path<String>,
    body: Option<web::Json<LikeRequest>>,
) -> AppResult<HttpResponse> {
    let id = parse_id("Post", &path)?;
    let user_id = actor.resolve(body.and_then(|b| b.into_inner().user_id));

    let post = state.posts.toggle_like(id, user_id).await?;
    Ok(HttpResponse::Ok().json(post))
}
