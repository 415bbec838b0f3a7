//! SeaORM entities. Each table stands in for one document collection; nested
//! fields are stored as `jsonb`.

pub mod comment;
pub mod post;
pub mod user;
