//! Per-shop blog settings.

use sea_orm::Set;
use sea_orm::entity::prelude::*;

use blog_core::domain::BlogSettings;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "blog_settings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub shop_id: Uuid,
    pub default_tag: String,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for BlogSettings {
    fn from(model: Model) -> Self {
        Self {
            shop_id: model.shop_id,
            default_tag: model.default_tag,
            updated_at: model.updated_at.into(),
        }
    }
}

impl From<BlogSettings> for ActiveModel {
    fn from(settings: BlogSettings) -> Self {
        Self {
            shop_id: Set(settings.shop_id),
            default_tag: Set(settings.default_tag),
            updated_at: Set(settings.updated_at.into()),
        }
    }
}
