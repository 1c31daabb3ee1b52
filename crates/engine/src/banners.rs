//! Homepage banners. At most one is the hero banner; a partial unique index
//! on `is_hero` backs that up at the database level.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq)]
pub struct Banner {
    pub id: i32,
    pub title: String,
    pub image: Option<String>,
    pub keywords: Vec<String>,
    pub is_hero: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Banner {
    pub(crate) fn from_model(model: Model, image: Option<String>) -> Self {
        let keywords = serde_json::from_value(model.keywords).unwrap_or_default();
        Self {
            id: model.id,
            title: model.title,
            image,
            keywords,
            is_hero: model.is_hero,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NewBanner {
    pub title: String,
    pub image: Option<String>,
    pub keywords: Vec<String>,
    pub is_hero: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BannerPatch {
    pub title: Option<String>,
    pub image: Option<String>,
    pub keywords: Option<Vec<String>>,
    pub is_hero: Option<bool>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "banner")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub title: String,
    pub keywords: Json,
    pub is_hero: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
