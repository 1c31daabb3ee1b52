//! Image bytes for any owning row, keyed by `(owner_kind, owner_id)`.

use sea_orm::entity::prelude::*;

/// Kind of row an image belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum OwnerKind {
    #[sea_orm(string_value = "user")]
    User,
    #[sea_orm(string_value = "recipe")]
    Recipe,
    #[sea_orm(string_value = "banner")]
    Banner,
    #[sea_orm(string_value = "category")]
    Category,
}

/// The row an image is attached to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FileOwner {
    pub kind: OwnerKind,
    pub id: i32,
}

impl FileOwner {
    pub fn user(id: i32) -> Self {
        Self {
            kind: OwnerKind::User,
            id,
        }
    }

    pub fn recipe(id: i32) -> Self {
        Self {
            kind: OwnerKind::Recipe,
            id,
        }
    }

    pub fn banner(id: i32) -> Self {
        Self {
            kind: OwnerKind::Banner,
            id,
        }
    }

    pub fn category(id: i32) -> Self {
        Self {
            kind: OwnerKind::Category,
            id,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "file_storage")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub owner_kind: OwnerKind,
    pub owner_id: i32,
    pub filename: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
