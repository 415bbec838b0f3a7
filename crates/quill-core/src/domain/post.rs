use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Number of content characters kept in a derived excerpt.
pub const EXCERPT_CHARS: usize = 150;
/// Upper bound for an explicitly supplied excerpt.
pub const EXCERPT_MAX_CHARS: usize = 200;
/// Upper bound for a post title, counted after trimming.
pub const TITLE_MAX_CHARS: usize = 100;
/// Average reading speed used for the reading time estimate.
pub const WORDS_PER_MINUTE: usize = 200;

/// Fixed set of post categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Category {
    Technology,
    Lifestyle,
    Travel,
    Food,
    Health,
    Business,
    #[default]
    Other,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::Technology,
        Category::Lifestyle,
        Category::Travel,
        Category::Food,
        Category::Health,
        Category::Business,
        Category::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Technology => "Technology",
            Category::Lifestyle => "Lifestyle",
            Category::Travel => "Travel",
            Category::Food => "Food",
            Category::Health => "Health",
            Category::Business => "Business",
            Category::Other => "Other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown category: {0}")]
pub struct UnknownCategory(pub String);

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

/// A single like left on a post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Like {
    pub user_id: String,
    pub created_at: DateTime<Utc>,
}

/// Post entity - a blog article owned by the principal in `author_id`.
///
/// `excerpt` and `reading_time` are derived from `content` and are refreshed
/// through [`Post::set_content`], which is the only way content changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub excerpt: String,
    pub author_id: String,
    pub category: Category,
    pub tags: Vec<String>,
    pub featured_image: String,
    pub likes: Vec<Like>,
    pub likes_count: u32,
    /// Filled in at read time from the comments collection, never stored.
    #[serde(default)]
    pub comments_count: u64,
    pub reading_time: u32,
    pub is_published: bool,
    pub views_count: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    /// Create a new post with derived fields computed from `content`.
    pub fn new(author_id: String, title: String, content: String) -> Self {
        let now = Utc::now();
        let mut post = Self {
            id: Uuid::new_v4(),
            title,
            content: String::new(),
            excerpt: String::new(),
            author_id,
            category: Category::default(),
            tags: Vec::new(),
            featured_image: String::new(),
            likes: Vec::new(),
            likes_count: 0,
            comments_count: 0,
            reading_time: 0,
            is_published: true,
            views_count: 0,
            created_at: now,
            updated_at: now,
        };
        post.set_content(content, None);
        post
    }

    /// Replace the content and recompute the excerpt and reading time.
    ///
    /// An explicit excerpt wins over the derived one.
    pub fn set_content(&mut self, content: String, excerpt: Option<String>) {
        self.reading_time = estimate_reading_time(&content);
        self.excerpt = match excerpt {
            Some(explicit) if !explicit.trim().is_empty() => explicit.trim().to_string(),
            _ => make_excerpt(&content),
        };
        self.content = content;
    }

    pub fn is_owned_by(&self, principal: &str) -> bool {
        self.author_id == principal
    }

    /// Add or remove `user_id`'s like. Returns `true` when the post is now liked.
    pub fn toggle_like(&mut self, user_id: &str) -> bool {
        let before = self.likes.len();
        self.likes.retain(|like| like.user_id != user_id);
        let liked = self.likes.len() == before;
        if liked {
            self.likes.push(Like {
                user_id: user_id.to_string(),
                created_at: Utc::now(),
            });
        }
        self.likes_count = self.likes.len() as u32;
        liked
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// First [`EXCERPT_CHARS`] characters of `content` followed by an ellipsis.
pub fn make_excerpt(content: &str) -> String {
    let mut excerpt: String = content.chars().take(EXCERPT_CHARS).collect();
    excerpt.push_str("...");
    excerpt
}

/// Minutes needed to read `content`, rounded up.
pub fn estimate_reading_time(content: &str) -> u32 {
    let words = content.split_whitespace().count();
    words.div_ceil(WORDS_PER_MINUTE) as u32
}
