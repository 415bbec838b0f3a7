//! User entity for SeaORM.

use sea_orm::Set;
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub firebase_uid: String,
    pub email: String,
    #[sea_orm(unique)]
    pub username: String,
    pub display_name: String,
    #[sea_orm(column_type = "Text")]
    pub bio: String,
    #[sea_orm(column_type = "JsonBinary")]
    pub social_links: Json,
    #[sea_orm(column_type = "JsonBinary")]
    pub preferences: Json,
    pub profile_photo: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Conversion from SeaORM Model to Domain User.
impl From<Model> for quill_core::domain::User {
    fn from(model: Model) -> Self {
        Self {
            firebase_uid: model.firebase_uid,
            email: model.email,
            username: model.username,
            display_name: model.display_name,
            bio: model.bio,
            social_links: serde_json::from_value(model.social_links).unwrap_or_default(),
            preferences: serde_json::from_value(model.preferences).unwrap_or_default(),
            profile_photo: model.profile_photo,
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        }
    }
}

/// Conversion from Domain User to SeaORM ActiveModel.
impl From<quill_core::domain::User> for ActiveModel {
    fn from(user: quill_core::domain::User) -> Self {
        Self {
            firebase_uid: Set(user.firebase_uid),
            email: Set(user.email),
            username: Set(user.username),
            display_name: Set(user.display_name),
            bio: Set(user.bio),
            social_links: Set(serde_json::json!(user.social_links)),
            preferences: Set(serde_json::json!(user.preferences)),
            profile_photo: Set(user.profile_photo),
            created_at: Set(user.created_at.into()),
            updated_at: Set(user.updated_at.into()),
        }
    }
}
