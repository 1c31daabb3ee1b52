//! The module contains the `Recipe` views and the `recipe` table.
//!
//! A recipe owns its instructions, keywords and ingredient lines (separate
//! tables). `instruction_ids` keeps the ordered list of instruction ids so the
//! recipe row alone tells the order in which steps are shown.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

/// Moderation state set by an admin.
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum ApprovalStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "approved")]
    Approved,
    #[sea_orm(string_value = "rejected")]
    Rejected,
}

/// Who submitted a recipe. Decides its initial moderation state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecipeSource {
    /// Created through the admin flow: approved and public right away.
    Admin,
    /// Submitted by a member: pending until an admin reviews it.
    Member,
}

impl RecipeSource {
    pub(crate) fn initial_state(self) -> (ApprovalStatus, bool) {
        match self {
            Self::Admin => (ApprovalStatus::Approved, true),
            Self::Member => (ApprovalStatus::Pending, false),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewRecipeIngredient {
    pub ingredient_id: i32,
    pub quantity: Option<String>,
    pub unit: Option<String>,
}

/// Input of recipe creation. Optional fields are validated by the engine so
/// that every missing one is reported.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NewRecipe {
    pub category_id: Option<i32>,
    pub sub_category_id: Option<i32>,
    pub title: String,
    pub description: String,
    pub prep_time: Option<i32>,
    pub cook_time: Option<i32>,
    pub servings: Option<i32>,
    pub ingredients: Vec<NewRecipeIngredient>,
    pub instructions: Vec<String>,
    pub keywords: Vec<String>,
    pub image: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NamedRef {
    pub id: i32,
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Author {
    pub id: i32,
    pub name: String,
    pub avatar: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Instruction {
    pub id: i32,
    pub position: i32,
    pub body: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecipeIngredient {
    pub ingredient_id: i32,
    pub name: String,
    pub quantity: Option<String>,
    pub unit: Option<String>,
}

/// A recipe joined with everything needed to display it.
#[derive(Clone, Debug, PartialEq)]
pub struct Recipe {
    pub id: i32,
    pub author: Author,
    pub category: NamedRef,
    pub sub_category: NamedRef,
    pub title: String,
    pub description: String,
    pub prep_time: i32,
    pub cook_time: i32,
    pub servings: i32,
    pub ingredients: Vec<RecipeIngredient>,
    pub instructions: Vec<Instruction>,
    pub keywords: Vec<String>,
    pub status: ApprovalStatus,
    pub public_approved: bool,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Listing/search row.
#[derive(Clone, Debug, PartialEq)]
pub struct RecipeSummary {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub prep_time: i32,
    pub cook_time: i32,
    pub servings: i32,
    pub category: NamedRef,
    pub sub_category: NamedRef,
    pub keywords: Vec<String>,
    pub author: Author,
    pub status: ApprovalStatus,
    pub public_approved: bool,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "recipe")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub user_id: i32,
    pub category_id: i32,
    pub sub_category_id: i32,
    pub title: String,
    #[sea_orm(unique)]
    pub title_norm: String,
    pub description: String,
    pub prep_time: i32,
    pub cook_time: i32,
    pub servings: i32,
    pub instruction_ids: Json,
    pub admin_approved_status: ApprovalStatus,
    pub public_approved: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl Model {
    /// Ordered instruction ids; malformed JSON reads as empty.
    pub(crate) fn instruction_order(&self) -> Vec<i32> {
        serde_json::from_value(self.instruction_ids.clone()).unwrap_or_default()
    }

    /// Visible on the public site.
    pub(crate) fn is_published(&self) -> bool {
        self.admin_approved_status == ApprovalStatus::Approved && self.public_approved
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    User,
    #[sea_orm(
        belongs_to = "super::categories::Entity",
        from = "Column::CategoryId",
        to = "super::categories::Column::Id",
        on_update = "NoAction",
        on_delete = "Restrict"
    )]
    Category,
    #[sea_orm(
        belongs_to = "super::sub_categories::Entity",
        from = "Column::SubCategoryId",
        to = "super::sub_categories::Column::Id",
        on_update = "NoAction",
        on_delete = "Restrict"
    )]
    SubCategory,
    #[sea_orm(has_many = "super::recipe_instructions::Entity")]
    Instructions,
    #[sea_orm(has_many = "super::recipe_keywords::Entity")]
    Keywords,
    #[sea_orm(has_many = "super::recipe_ingredients::Entity")]
    Ingredients,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::categories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl Related<super::sub_categories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SubCategory.def()
    }
}

impl Related<super::recipe_instructions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Instructions.def()
    }
}

impl Related<super::recipe_keywords::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Keywords.def()
    }
}

impl Related<super::recipe_ingredients::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Ingredients.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;

    fn model(status: ApprovalStatus, public_approved: bool) -> Model {
        let now = Utc::now();
        Model {
            id: 1,
            user_id: 1,
            category_id: 1,
            sub_category_id: 1,
            title: "Cake".to_string(),
            title_norm: "cake".to_string(),
            description: "Soft".to_string(),
            prep_time: 10,
            cook_time: 30,
            servings: 4,
            instruction_ids: serde_json::json!([7, 3, 5]),
            admin_approved_status: status,
            public_approved,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn instruction_order_reads_json_array() {
        let recipe = model(ApprovalStatus::Approved, true);
        assert_eq!(recipe.instruction_order(), vec![7, 3, 5]);
    }

    #[test]
    fn published_requires_both_flags() {
        assert!(model(ApprovalStatus::Approved, true).is_published());
        assert!(!model(ApprovalStatus::Approved, false).is_published());
        assert!(!model(ApprovalStatus::Pending, true).is_published());
    }

    #[test]
    fn source_sets_initial_moderation_state() {
        assert_eq!(
            RecipeSource::Admin.initial_state(),
            (ApprovalStatus::Approved, true)
        );
        assert_eq!(
            RecipeSource::Member.initial_state(),
            (ApprovalStatus::Pending, false)
        );
    }
}
