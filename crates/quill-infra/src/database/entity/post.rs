//! Post entity for SeaORM.

use sea_orm::Set;
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "posts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub content: String,
    pub excerpt: String,
    pub author_id: String,
    pub category: String,
    #[sea_orm(column_type = "JsonBinary")]
    pub tags: Json,
    pub featured_image: String,
    #[sea_orm(column_type = "JsonBinary")]
    pub likes: Json,
    pub likes_count: i32,
    pub reading_time: i32,
    pub is_published: bool,
    pub views_count: i64,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::comment::Entity")]
    Comment,
}

impl Related<super::comment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Comment.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Conversion from SeaORM Model to Domain Post.
impl From<Model> for quill_core::domain::Post {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            title: model.title,
            content: model.content,
            excerpt: model.excerpt,
            author_id: model.author_id,
            category: model.category.parse().unwrap_or_default(),
            tags: serde_json::from_value(model.tags).unwrap_or_default(),
            featured_image: model.featured_image,
            likes: serde_json::from_value(model.likes).unwrap_or_default(),
            likes_count: model.likes_count.max(0) as u32,
            comments_count: 0,
            reading_time: model.reading_time.max(0) as u32,
            is_published: model.is_published,
            views_count: model.views_count.max(0) as u64,
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        }
    }
}

/// Conversion from Domain Post to SeaORM ActiveModel.
impl From<quill_core::domain::Post> for ActiveModel {
    fn from(post: quill_core::domain::Post) -> Self {
        Self {
            id: Set(post.id),
            title: Set(post.title),
            content: Set(post.content),
            excerpt: Set(post.excerpt),
            author_id: Set(post.author_id),
            category: Set(post.category.to_string()),
            tags: Set(serde_json::json!(post.tags)),
            featured_image: Set(post.featured_image),
            likes: Set(serde_json::json!(post.likes)),
            likes_count: Set(post.likes_count as i32),
            reading_time: Set(post.reading_time as i32),
            is_published: Set(post.is_published),
            views_count: Set(post.views_count as i64),
            created_at: Set(post.created_at.into()),
            updated_at: Set(post.updated_at.into()),
        }
    }
}
