use actix_web::{App, http::StatusCode, test, web};
use serde_json::{Value, json};

use super::configure_routes;
use crate::config::AuthMode;
use crate::state::AppState;

macro_rules! init_app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($state))
                .configure(configure_routes),
        )
        .await
    };
}

fn client_state() -> AppState {
    AppState::in_memory(AuthMode::Client, None)
}

fn post_body(author: &str) -> Value {
    json!({
        "title": "Hi",
        "content": "word ".repeat(250),
        "authorId": author,
        "tags": [" rust ", ""]
    })
}

#[actix_rt::test]
async fn test_create_post_returns_created_with_derived_fields() {
    let app = init_app!(client_state());

    let req = test::TestRequest::post()
        .uri("/api/posts")
        .set_json(post_body("u1"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let post: Value = test::read_body_json(resp).await;
    assert_eq!(post["readingTime"], 2);
    assert_eq!(post["category"], "Other");
    assert_eq!(post["tags"], json!(["rust"]));
    assert_eq!(post["commentsCount"], 0);
    assert!(post["excerpt"].as_str().unwrap().ends_with("..."));
}

#[actix_rt::test]
async fn test_create_post_missing_fields_is_bad_request() {
    let app = init_app!(client_state());

    let req = test::TestRequest::post()
        .uri("/api/posts")
        .set_json(json!({ "title": "Only a title" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    let fields: Vec<&str> = body["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["field"].as_str().unwrap())
        .collect();
    assert_eq!(fields, vec!["content", "authorId"]);
}

#[actix_rt::test]
async fn test_malformed_json_is_bad_request() {
    let app = init_app!(client_state());

    let req = test::TestRequest::post()
        .uri("/api/posts")
        .insert_header(("content-type", "application/json"))
        .set_payload("{not json")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_rt::test]
async fn test_delete_by_other_author_is_forbidden() {
    let app = init_app!(client_state());

    let req = test::TestRequest::post()
        .uri("/api/posts")
        .set_json(post_body("u1"))
        .to_request();
    let post: Value = test::call_and_read_body_json(&app, req).await;
    let uri = format!("/api/posts/{}", post["id"].as_str().unwrap());

    let req = test::TestRequest::delete()
        .uri(&uri)
        .set_json(json!({ "authorId": "u2" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let req = test::TestRequest::delete().uri(&uri).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let req = test::TestRequest::get().uri(&uri).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_rt::test]
async fn test_unknown_and_malformed_ids_are_not_found() {
    let app = init_app!(client_state());

    for uri in [
        "/api/posts/not-a-uuid",
        "/api/posts/6f1c5c3e-8a7b-4d5e-9f00-000000000000",
        "/api/comments/also-bad",
        "/api/users/nobody",
        "/api/users/username/nobody",
    ] {
        let req = test::TestRequest::get().uri(uri).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND, "{uri}");
    }
}

#[actix_rt::test]
async fn test_comment_on_missing_post_is_not_found() {
    let app = init_app!(client_state());

    let req = test::TestRequest::post()
        .uri("/api/comments")
        .set_json(json!({
            "postId": "6f1c5c3e-8a7b-4d5e-9f00-000000000000",
            "content": "Hello",
            "authorId": "u1"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["detail"], "Post not found");
}

#[actix_rt::test]
async fn test_comment_delete_by_other_user_keeps_comment() {
    let app = init_app!(client_state());

    let req = test::TestRequest::post()
        .uri("/api/posts")
        .set_json(post_body("u1"))
        .to_request();
    let post: Value = test::call_and_read_body_json(&app, req).await;

    let req = test::TestRequest::post()
        .uri("/api/comments")
        .set_json(json!({ "postId": post["id"], "content": "First", "authorId": "u1" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let comment: Value = test::read_body_json(resp).await;
    let uri = format!("/api/comments/{}", comment["id"].as_str().unwrap());

    let req = test::TestRequest::delete()
        .uri(&uri)
        .set_json(json!({ "authorId": "u2" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let req = test::TestRequest::get().uri(&uri).to_request();
    let still_there: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(still_there["content"], "First");
}

#[actix_rt::test]
async fn test_post_delete_cascades_over_http() {
    let app = init_app!(client_state());

    let req = test::TestRequest::post()
        .uri("/api/posts")
        .set_json(post_body("u1"))
        .to_request();
    let post: Value = test::call_and_read_body_json(&app, req).await;
    let post_id = post["id"].as_str().unwrap().to_string();

    for author in ["u2", "u3"] {
        let req = test::TestRequest::post()
            .uri("/api/comments")
            .set_json(json!({ "postId": post_id, "content": "Nice", "authorId": author }))
            .to_request();
        test::call_service(&app, req).await;
    }

    let req = test::TestRequest::delete()
        .uri(&format!("/api/posts/{post_id}"))
        .set_json(json!({ "authorId": "u1" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["commentsDeleted"], 2);

    let req = test::TestRequest::get()
        .uri(&format!("/api/comments/post/{post_id}"))
        .to_request();
    let thread: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(thread, json!([]));
}

#[actix_rt::test]
async fn test_username_taken_is_bad_request() {
    let app = init_app!(client_state());

    for (uid, code) in [("fb-1", StatusCode::OK), ("fb-2", StatusCode::BAD_REQUEST)] {
        let req = test::TestRequest::put()
            .uri("/api/users")
            .set_json(json!({
                "firebaseUid": uid,
                "email": format!("{uid}@example.com"),
                "username": "ada",
                "displayName": "Ada"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), code, "{uid}");
    }

    let req = test::TestRequest::get()
        .uri("/api/users/username/ada")
        .to_request();
    let user: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(user["firebaseUid"], "fb-1");
}

#[actix_rt::test]
async fn test_profile_photo_and_stats() {
    let app = init_app!(client_state());

    let req = test::TestRequest::post()
        .uri("/api/users")
        .set_json(json!({
            "firebaseUid": "u1",
            "email": "u1@example.com",
            "username": "ada",
            "displayName": "Ada"
        }))
        .to_request();
    test::call_service(&app, req).await;

    let req = test::TestRequest::put()
        .uri("/api/users/profile-photo")
        .set_json(json!({ "firebaseUid": "u1", "profilePhoto": "/uploads/ada.png" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({ "profilePhoto": "/uploads/ada.png" }));

    let req = test::TestRequest::post()
        .uri("/api/posts")
        .set_json(post_body("u1"))
        .to_request();
    let post: Value = test::call_and_read_body_json(&app, req).await;

    let req = test::TestRequest::post()
        .uri(&format!("/api/posts/{}/like", post["id"].as_str().unwrap()))
        .set_json(json!({ "userId": "u2" }))
        .to_request();
    let liked: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(liked["likesCount"], 1);

    let req = test::TestRequest::get().uri("/api/users/u1/stats").to_request();
    let stats: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(
        stats,
        json!({ "postsCount": 1, "commentsCount": 0, "likesReceived": 1 })
    );
}

#[actix_rt::test]
async fn test_health_reports_store() {
    let app = init_app!(client_state());

    let req = test::TestRequest::get().uri("/api/health").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["status"], "ok");
    assert_eq!(body["store"], "memory");
}

#[cfg(feature = "auth")]
mod session {
    use std::sync::Arc;

    use quill_core::ports::TokenService;
    use quill_infra::{JwtConfig, JwtTokenService};

    use super::*;

    fn session_state() -> (AppState, Arc<dyn TokenService>) {
        let tokens: Arc<dyn TokenService> = Arc::new(JwtTokenService::new(JwtConfig {
            secret: "test-secret".to_string(),
            expiration_hours: 1,
            issuer: "quill-api".to_string(),
        }));
        (
            AppState::in_memory(AuthMode::Session, Some(tokens.clone())),
            tokens,
        )
    }

    #[actix_rt::test]
    async fn test_missing_token_is_unauthorized() {
        let (state, _) = session_state();
        let app = init_app!(state);

        let req = test::TestRequest::post()
            .uri("/api/posts")
            .set_json(post_body("u1"))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_rt::test]
    async fn test_token_subject_replaces_body_author() {
        let (state, tokens) = session_state();
        let app = init_app!(state);
        let token = tokens.issue("u1", "u1@example.com").unwrap();

        let req = test::TestRequest::post()
            .uri("/api/posts")
            .insert_header(("Authorization", format!("Bearer {token}")))
            .set_json(post_body("someone-else"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let post: Value = test::read_body_json(resp).await;
        assert_eq!(post["authorId"], "u1");

        // Claiming the owner's id in the body does not help an intruder.
        let intruder = tokens.issue("u2", "u2@example.com").unwrap();
        let req = test::TestRequest::delete()
            .uri(&format!("/api/posts/{}", post["id"].as_str().unwrap()))
            .insert_header(("Authorization", format!("Bearer {intruder}")))
            .set_json(json!({ "authorId": "u1" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }

    #[actix_rt::test]
    async fn test_reads_need_no_token() {
        let (state, _) = session_state();
        let app = init_app!(state);

        let req = test::TestRequest::get().uri("/api/posts").to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
    }
}
