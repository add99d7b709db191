//! Post entity for SeaORM.

use sea_orm::Set;
use sea_orm::entity::prelude::*;

use blog_core::domain::Post;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "posts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub shop_id: Uuid,
    pub title: String,
    pub page_title: Option<String>,
    pub keywords: Option<String>,
    pub meta_description: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub annotation: Option<String>,
    #[sea_orm(column_type = "Text")]
    pub body: String,
    #[sea_orm(unique)]
    pub handle: String,
    pub is_visible: bool,
    pub is_recommended: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
    pub published_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::post_hashtag::Entity")]
    Hashtags,
}

impl Related<super::post_hashtag::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Hashtags.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Build the domain post; hashtags live in their own table.
    pub fn into_domain(self, hashtags: Vec<Uuid>) -> Post {
        Post {
            id: self.id,
            shop_id: self.shop_id,
            title: self.title,
            page_title: self.page_title,
            keywords: self.keywords,
            meta_description: self.meta_description,
            annotation: self.annotation,
            body: self.body,
            handle: self.handle,
            hashtags,
            is_visible: self.is_visible,
            is_recommended: self.is_recommended,
            created_at: self.created_at.into(),
            updated_at: self.updated_at.into(),
            published_at: self.published_at.map(Into::into),
        }
    }
}

impl From<&Post> for ActiveModel {
    fn from(post: &Post) -> Self {
        Self {
            id: Set(post.id),
            shop_id: Set(post.shop_id),
            title: Set(post.title.clone()),
            page_title: Set(post.page_title.clone()),
            keywords: Set(post.keywords.clone()),
            meta_description: Set(post.meta_description.clone()),
            annotation: Set(post.annotation.clone()),
            body: Set(post.body.clone()),
            handle: Set(post.handle.clone()),
            is_visible: Set(post.is_visible),
            is_recommended: Set(post.is_recommended),
            created_at: Set(post.created_at.into()),
            updated_at: Set(post.updated_at.into()),
            published_at: Set(post.published_at.map(Into::into)),
        }
    }
}
