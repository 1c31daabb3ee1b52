//! Business operations of the recipe-sharing backend.
//!
//! [`Engine`] owns the database connection (a pool) and exposes one method
//! per use case. Every multi-statement write runs inside a single database
//! transaction.

pub use banners::{Banner, BannerPatch, NewBanner};
pub use categories::Category;
pub use error::{EngineError, FieldError};
pub use file_storage::{FileOwner, OwnerKind};
pub use images::{ImageData, MAX_IMAGE_BYTES, to_data_uri};
pub use ingredients::Ingredient;
pub use notifier::{LogNotifier, OtpNotifier};
pub use ops::{
    CategoryPatch, Engine, EngineBuilder, SearchQuery, SortField, SortOrder,
    SubCategoryPatch, Suggestions,
};
pub use page::{Page, PageRequest};
pub use recipes::{
    ApprovalStatus, Author, Instruction, NamedRef, NewRecipe, NewRecipeIngredient, Recipe,
    RecipeIngredient, RecipeSource, RecipeSummary,
};
pub use sub_categories::SubCategory;
pub use users::{Actor, Role, User};

pub mod banners;
pub mod categories;
mod error;
pub mod file_storage;
mod images;
pub mod ingredients;
mod notifier;
mod ops;
mod page;
mod passwords;
pub mod recipe_ingredients;
pub mod recipe_instructions;
pub mod recipe_keywords;
pub mod recipes;
pub mod sub_categories;
pub mod users;
mod util;

type ResultEngine<T> = Result<T, EngineError>;
