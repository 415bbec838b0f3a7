//! Domain entities - the core business objects.

mod comment;
mod post;
mod user;

pub use comment::Comment;
pub use post::{
    Category, EXCERPT_CHARS, EXCERPT_MAX_CHARS, Like, Post, TITLE_MAX_CHARS, UnknownCategory,
    WORDS_PER_MINUTE, estimate_reading_time, make_excerpt,
};
pub use user::{User, UserStats};
