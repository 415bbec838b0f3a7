//! HTTP handlers and route configuration.

mod comments;
mod health;
mod posts;
mod users;

#[cfg(test)]
mod tests;

use actix_web::{error::JsonPayloadError, web};
use uuid::Uuid;

use crate::middleware::error::AppError;

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config()).service(
        web::scope("/api")
            .route("/health", web::get().to(health::health_check))
            .service(
                web::scope("/posts")
                    .service(
                        web::resource("")
                            .route(web::get().to(posts::list_posts))
                            .route(web::post().to(posts::create_post)),
                    )
                    .route("/author/{author_id}", web::get().to(posts::list_by_author))
                    .route("/{id}/like", web::post().to(posts::toggle_like))
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(posts::get_post))
                            .route(web::put().to(posts::update_post))
                            .route(web::delete().to(posts::delete_post)),
                    ),
            )
            .service(
                web::scope("/comments")
                    .route("", web::post().to(comments::create_comment))
                    .route("/post/{post_id}", web::get().to(comments::list_by_post))
                    .route("/author/{author_id}", web::get().to(comments::list_by_author))
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(comments::get_comment))
                            .route(web::put().to(comments::update_comment))
                            .route(web::delete().to(comments::delete_comment)),
                    ),
            )
            .service(
                web::scope("/users")
                    .service(
                        web::resource("")
                            .route(web::post().to(users::upsert_user))
                            .route(web::put().to(users::upsert_user)),
                    )
                    .route("/profile-photo", web::put().to(users::update_profile_photo))
                    .route("/username/{username}", web::get().to(users::get_by_username))
                    .route("/{id}/stats", web::get().to(users::get_stats))
                    .route("/{id}", web::get().to(users::get_user)),
            ),
    );
}

/// Malformed JSON bodies get the same problem shape as every other 400.
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        let detail = match &err {
            JsonPayloadError::ContentType => "Expected an application/json body".to_string(),
            other => other.to_string(),
        };
        AppError::BadRequest(detail).into()
    })
}

/// Parse a path identifier. A malformed id cannot name an existing record.
fn parse_id(entity_type: &str, raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::NotFound(format!("{} not found", entity_type)))
}
