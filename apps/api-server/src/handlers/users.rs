//! User profile handlers.

use actix_web::{HttpResponse, web};

use quill_core::services::ProfileInput;
use quill_shared::dto::{ProfilePhotoRequest, ProfilePhotoResponse, UpsertUserRequest};

use crate::middleware::auth::Actor;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// GET /api/users/{id} - lookup by identity-provider uid
pub async fn get_user(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let user = state.users.get(&path).await?;
    Ok(HttpResponse::Ok().json(user))
}

/// GET /api/users/username/{username}
pub async fn get_by_username(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let user = state.users.get_by_username(&path).await?;
    Ok(HttpResponse::Ok().json(user))
}

/// POST|PUT /api/users - create or replace the caller's profile
pub async fn upsert_user(
    state: web::Data<AppState>,
    actor: Actor,
    body: web::Json<UpsertUserRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    let user = state
        .users
        .upsert(ProfileInput {
            firebase_uid: actor.resolve(req.firebase_uid),
            email: req.email,
            username: req.username,
            display_name: req.display_name,
            bio: req.bio,
            social_links: req.social_links,
            preferences: req.preferences,
        })
        .await?;

    Ok(HttpResponse::Ok().json(user))
}

/// PUT /api/users/profile-photo
pub async fn update_profile_photo(
    state: web::Data<AppState>,
    actor: Actor,
    body: web::Json<ProfilePhotoRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    let profile_photo = state
        .users
        .update_profile_photo(actor.resolve(req.firebase_uid), req.profile_photo)
        .await?;

    Ok(HttpResponse::Ok().json(ProfilePhotoResponse { profile_photo }))
}

/// GET /api/users/{id}/stats
pub async fn get_stats(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let stats = state.users.stats(&path).await?;
    Ok(HttpResponse::Ok().json(stats))
}
