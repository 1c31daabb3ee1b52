//! Initial schema - creates every table from scratch.
//!
//! - `users`: accounts, roles and password-reset codes
//! - `recipe_category` / `recipe_sub_category`: two-level recipe taxonomy
//! - `ingredient`: shared ingredient catalogue
//! - `recipe` with `recipe_instruction`, `recipe_keyword`, `recipe_ingredient`
//! - `banner`: homepage banners, at most one hero
//! - `file_storage`: one image per owning row

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// ─────────────────────────────────────────────────────────────────────────────
// Table identifiers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Iden)]
enum Users {
    Table,
    Id,
    Name,
    Email,
    PasswordHash,
    Role,
    IsVerified,
    OtpCode,
    OtpExpiresAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum RecipeCategory {
    Table,
    Id,
    Name,
    NameNorm,
    Description,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum RecipeSubCategory {
    Table,
    Id,
    CategoryId,
    Name,
    NameNorm,
    Description,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Ingredient {
    Table,
    Id,
    Name,
    NameNorm,
    CreatedAt,
}

#[derive(Iden)]
enum Recipe {
    Table,
    Id,
    UserId,
    CategoryId,
    SubCategoryId,
    Title,
    TitleNorm,
    Description,
    PrepTime,
    CookTime,
    Servings,
    InstructionIds,
    AdminApprovedStatus,
    PublicApproved,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum RecipeInstruction {
    Table,
    Id,
    RecipeId,
    Position,
    Body,
}

#[derive(Iden)]
enum RecipeKeyword {
    Table,
    Id,
    RecipeId,
    Keyword,
}

#[derive(Iden)]
enum RecipeIngredient {
    Table,
    RecipeId,
    IngredientId,
    Quantity,
    Unit,
}

#[derive(Iden)]
enum Banner {
    Table,
    Id,
    Title,
    Keywords,
    IsHero,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum FileStorage {
    Table,
    Id,
    OwnerKind,
    OwnerId,
    Filename,
    MimeType,
    Bytes,
    CreatedAt,
}

fn id_col<T: IntoIden>(name: T) -> ColumnDef {
    ColumnDef::new(name)
        .integer()
        .not_null()
        .auto_increment()
        .primary_key()
        .to_owned()
}

fn timestamp_col<T: IntoIden>(name: T) -> ColumnDef {
    ColumnDef::new(name)
        .timestamp_with_time_zone()
        .not_null()
        .to_owned()
}

// ─────────────────────────────────────────────────────────────────────────────
// Migration implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ───────────────────────────────────────────────────────────────────
        // 1. Users
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(id_col(Users::Id))
                    .col(ColumnDef::new(Users::Name).string().not_null())
                    .col(ColumnDef::new(Users::Email).string().not_null().unique_key())
                    .col(ColumnDef::new(Users::PasswordHash).string().not_null())
                    .col(
                        ColumnDef::new(Users::Role)
                            .string_len(16)
                            .not_null()
                            .default("user"),
                    )
                    .col(
                        ColumnDef::new(Users::IsVerified)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Users::OtpCode).string_len(16))
                    .col(ColumnDef::new(Users::OtpExpiresAt).timestamp_with_time_zone())
                    .col(timestamp_col(Users::CreatedAt))
                    .col(timestamp_col(Users::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 2. Taxonomy
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(RecipeCategory::Table)
                    .if_not_exists()
                    .col(id_col(RecipeCategory::Id))
                    .col(ColumnDef::new(RecipeCategory::Name).string().not_null())
                    .col(
                        ColumnDef::new(RecipeCategory::NameNorm)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(RecipeCategory::Description).text().not_null())
                    .col(timestamp_col(RecipeCategory::CreatedAt))
                    .col(timestamp_col(RecipeCategory::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(RecipeSubCategory::Table)
                    .if_not_exists()
                    .col(id_col(RecipeSubCategory::Id))
                    .col(
                        ColumnDef::new(RecipeSubCategory::CategoryId)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(RecipeSubCategory::Name).string().not_null())
                    .col(
                        ColumnDef::new(RecipeSubCategory::NameNorm)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(RecipeSubCategory::Description)
                            .text()
                            .not_null(),
                    )
                    .col(timestamp_col(RecipeSubCategory::CreatedAt))
                    .col(timestamp_col(RecipeSubCategory::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-recipe_sub_category-category_id")
                            .from(RecipeSubCategory::Table, RecipeSubCategory::CategoryId)
                            .to(RecipeCategory::Table, RecipeCategory::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-recipe_sub_category-category_id")
                    .table(RecipeSubCategory::Table)
                    .col(RecipeSubCategory::CategoryId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 3. Ingredients
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Ingredient::Table)
                    .if_not_exists()
                    .col(id_col(Ingredient::Id))
                    .col(ColumnDef::new(Ingredient::Name).string().not_null())
                    .col(
                        ColumnDef::new(Ingredient::NameNorm)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(timestamp_col(Ingredient::CreatedAt))
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 4. Recipes and their child rows
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Recipe::Table)
                    .if_not_exists()
                    .col(id_col(Recipe::Id))
                    .col(ColumnDef::new(Recipe::UserId).integer().not_null())
                    .col(ColumnDef::new(Recipe::CategoryId).integer().not_null())
                    .col(ColumnDef::new(Recipe::SubCategoryId).integer().not_null())
                    .col(ColumnDef::new(Recipe::Title).string().not_null())
                    .col(
                        ColumnDef::new(Recipe::TitleNorm)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Recipe::Description).text().not_null())
                    .col(ColumnDef::new(Recipe::PrepTime).integer().not_null())
                    .col(ColumnDef::new(Recipe::CookTime).integer().not_null())
                    .col(ColumnDef::new(Recipe::Servings).integer().not_null())
                    .col(ColumnDef::new(Recipe::InstructionIds).json().not_null())
                    .col(
                        ColumnDef::new(Recipe::AdminApprovedStatus)
                            .string_len(16)
                            .not_null()
                            .default("pending"),
                    )
                    .col(
                        ColumnDef::new(Recipe::PublicApproved)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(timestamp_col(Recipe::CreatedAt))
                    .col(timestamp_col(Recipe::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-recipe-user_id")
                            .from(Recipe::Table, Recipe::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-recipe-category_id")
                            .from(Recipe::Table, Recipe::CategoryId)
                            .to(RecipeCategory::Table, RecipeCategory::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-recipe-sub_category_id")
                            .from(Recipe::Table, Recipe::SubCategoryId)
                            .to(RecipeSubCategory::Table, RecipeSubCategory::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        for (name, column) in [
            ("idx-recipe-user_id", Recipe::UserId),
            ("idx-recipe-category_id", Recipe::CategoryId),
            ("idx-recipe-sub_category_id", Recipe::SubCategoryId),
            ("idx-recipe-admin_approved_status", Recipe::AdminApprovedStatus),
        ] {
            manager
                .create_index(
                    Index::create()
                        .name(name)
                        .table(Recipe::Table)
                        .col(column)
                        .to_owned(),
                )
                .await?;
        }

        manager
            .create_table(
                Table::create()
                    .table(RecipeInstruction::Table)
                    .if_not_exists()
                    .col(id_col(RecipeInstruction::Id))
                    .col(
                        ColumnDef::new(RecipeInstruction::RecipeId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RecipeInstruction::Position)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(RecipeInstruction::Body).text().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-recipe_instruction-recipe_id")
                            .from(RecipeInstruction::Table, RecipeInstruction::RecipeId)
                            .to(Recipe::Table, Recipe::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-recipe_instruction-recipe_id")
                    .table(RecipeInstruction::Table)
                    .col(RecipeInstruction::RecipeId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(RecipeKeyword::Table)
                    .if_not_exists()
                    .col(id_col(RecipeKeyword::Id))
                    .col(ColumnDef::new(RecipeKeyword::RecipeId).integer().not_null())
                    .col(ColumnDef::new(RecipeKeyword::Keyword).string().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-recipe_keyword-recipe_id")
                            .from(RecipeKeyword::Table, RecipeKeyword::RecipeId)
                            .to(Recipe::Table, Recipe::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-recipe_keyword-recipe_id")
                    .table(RecipeKeyword::Table)
                    .col(RecipeKeyword::RecipeId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(RecipeIngredient::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(RecipeIngredient::RecipeId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RecipeIngredient::IngredientId)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(RecipeIngredient::Quantity).string())
                    .col(ColumnDef::new(RecipeIngredient::Unit).string())
                    .primary_key(
                        Index::create()
                            .col(RecipeIngredient::RecipeId)
                            .col(RecipeIngredient::IngredientId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-recipe_ingredient-recipe_id")
                            .from(RecipeIngredient::Table, RecipeIngredient::RecipeId)
                            .to(Recipe::Table, Recipe::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-recipe_ingredient-ingredient_id")
                            .from(RecipeIngredient::Table, RecipeIngredient::IngredientId)
                            .to(Ingredient::Table, Ingredient::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 5. Banners
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Banner::Table)
                    .if_not_exists()
                    .col(id_col(Banner::Id))
                    .col(ColumnDef::new(Banner::Title).string().not_null())
                    .col(ColumnDef::new(Banner::Keywords).json().not_null())
                    .col(
                        ColumnDef::new(Banner::IsHero)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(timestamp_col(Banner::CreatedAt))
                    .col(timestamp_col(Banner::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        // sea-query has no partial index builder; this statement is valid on
        // both PostgreSQL and SQLite.
        manager
            .get_connection()
            .execute_unprepared(
                "CREATE UNIQUE INDEX IF NOT EXISTS idx_banner_single_hero \
                 ON banner (is_hero) WHERE is_hero",
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 6. File storage
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(FileStorage::Table)
                    .if_not_exists()
                    .col(id_col(FileStorage::Id))
                    .col(ColumnDef::new(FileStorage::OwnerKind).string_len(16).not_null())
                    .col(ColumnDef::new(FileStorage::OwnerId).integer().not_null())
                    .col(ColumnDef::new(FileStorage::Filename).string().not_null())
                    .col(ColumnDef::new(FileStorage::MimeType).string().not_null())
                    .col(ColumnDef::new(FileStorage::Bytes).blob().not_null())
                    .col(timestamp_col(FileStorage::CreatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-file_storage-owner-unique")
                    .table(FileStorage::Table)
                    .col(FileStorage::OwnerKind)
                    .col(FileStorage::OwnerId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(FileStorage::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Banner::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(RecipeIngredient::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(RecipeKeyword::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(RecipeInstruction::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Recipe::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Ingredient::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(RecipeSubCategory::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(RecipeCategory::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await
    }
}
