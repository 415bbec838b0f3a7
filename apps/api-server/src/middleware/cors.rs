//! Cross-origin access for browser clients served from another origin.

use actix_cors::Cors;
use actix_web::http::{Method, header};

use crate::observability::REQUEST_ID_HEADER;

/// Build the CORS middleware. An empty list allows every origin.
pub fn cors_layer(allowed_origins: &[String]) -> Cors {
    if allowed_origins.is_empty() {
        return Cors::permissive();
    }

    allowed_origins
        .iter()
        .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
        .allowed_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allowed_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT])
        .expose_headers([REQUEST_ID_HEADER])
        .max_age(3600)
}
