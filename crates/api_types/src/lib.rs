use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Envelope wrapping every JSON response of the API.
///
/// Successful responses carry `data`, failed ones a `message` and, for
/// validation failures, the per-field `errors`.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FieldError>,
}

impl<T> Envelope<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
            pagination: None,
            errors: Vec::new(),
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_pagination(mut self, pagination: Pagination) -> Self {
        self.pagination = Some(pagination);
        self
    }
}

impl Envelope<()> {
    /// Success without a payload (logout, deletes).
    pub fn done(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data: None,
            pagination: None,
            errors: Vec::new(),
        }
    }

    pub fn failure(message: impl Into<String>, errors: Vec<FieldError>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            data: None,
            pagination: None,
            errors,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u64,
    pub limit: u64,
    pub total_count: u64,
    pub total_pages: u64,
}

/// `?page=&limit=` query parameters.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct PageQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

pub mod auth {
    use super::*;

    // Missing fields read as empty and fail validation field by field.
    #[derive(Debug, Default, Serialize, Deserialize)]
    #[serde(default)]
    pub struct Register {
        pub name: String,
        pub email: String,
        pub password: String,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    #[serde(default)]
    pub struct Login {
        pub email: String,
        pub password: String,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    #[serde(default)]
    pub struct ForgotPassword {
        pub email: String,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    #[serde(default)]
    pub struct VerifyOtp {
        pub email: String,
        pub otp: String,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    #[serde(default, rename_all = "camelCase")]
    pub struct ResetPassword {
        pub email: String,
        pub otp: String,
        pub new_password: String,
    }
}

pub mod user {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum Role {
        User,
        Admin,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct UserView {
        pub id: i32,
        pub name: String,
        pub email: String,
        pub role: Role,
        pub is_verified: bool,
        /// `data:` URI of the avatar, if any.
        pub avatar: Option<String>,
        pub created_at: DateTime<Utc>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct ProfileUpdate {
        pub name: Option<String>,
        pub avatar: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RoleUpdate {
        pub role: Role,
    }
}

pub mod category {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct CategoryView {
        pub id: i32,
        pub name: String,
        pub description: String,
        pub image: Option<String>,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryNew {
        #[serde(default)]
        pub name: String,
        #[serde(default)]
        pub description: String,
        pub image: Option<String>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct CategoryUpdate {
        pub name: Option<String>,
        pub description: Option<String>,
        pub image: Option<String>,
    }
}

pub mod sub_category {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct SubCategoryView {
        pub id: i32,
        pub category_id: i32,
        pub category_name: String,
        pub name: String,
        pub description: String,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct SubCategoryNew {
        pub category_id: Option<i32>,
        #[serde(default)]
        pub name: String,
        #[serde(default)]
        pub description: String,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct SubCategoryUpdate {
        pub category_id: Option<i32>,
        pub name: Option<String>,
        pub description: Option<String>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct SubCategoryFilter {
        pub category_id: Option<i32>,
    }
}

pub mod ingredient {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct IngredientView {
        pub id: i32,
        pub name: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct IngredientNew {
        #[serde(default)]
        pub name: String,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct IngredientQuery {
        pub q: Option<String>,
        pub page: Option<u64>,
        pub limit: Option<u64>,
    }
}

pub mod recipe {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum ApprovalStatus {
        Pending,
        Approved,
        Rejected,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct RecipeIngredientNew {
        pub ingredient_id: i32,
        pub quantity: Option<String>,
        pub unit: Option<String>,
    }

    /// Body of both the admin and the member recipe creation endpoints.
    #[derive(Debug, Default, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct RecipeNew {
        pub category_id: Option<i32>,
        pub sub_category_id: Option<i32>,
        #[serde(default)]
        pub title: String,
        #[serde(default)]
        pub description: String,
        pub prep_time: Option<i32>,
        pub cook_time: Option<i32>,
        pub servings: Option<i32>,
        #[serde(default)]
        pub ingredients: Vec<RecipeIngredientNew>,
        #[serde(default)]
        pub instructions: Vec<String>,
        #[serde(default)]
        pub keywords: Vec<String>,
        pub image: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct NamedRef {
        pub id: i32,
        pub name: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AuthorView {
        pub id: i32,
        pub name: String,
        pub avatar: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct InstructionView {
        pub id: i32,
        pub position: i32,
        pub body: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct RecipeIngredientView {
        pub ingredient_id: i32,
        pub name: String,
        pub quantity: Option<String>,
        pub unit: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct RecipeView {
        pub id: i32,
        pub author: AuthorView,
        pub category: NamedRef,
        pub sub_category: NamedRef,
        pub title: String,
        pub description: String,
        pub prep_time: i32,
        pub cook_time: i32,
        pub servings: i32,
        pub ingredients: Vec<RecipeIngredientView>,
        pub instructions: Vec<InstructionView>,
        pub keywords: Vec<String>,
        pub admin_approved_status: ApprovalStatus,
        pub public_approved: bool,
        pub image: Option<String>,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
    }

    /// Row shape used by listings and search results.
    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct RecipeSummaryView {
        pub id: i32,
        pub title: String,
        pub description: String,
        pub prep_time: i32,
        pub cook_time: i32,
        pub servings: i32,
        pub category: NamedRef,
        pub sub_category: NamedRef,
        pub keywords: Vec<String>,
        pub author: AuthorView,
        pub admin_approved_status: ApprovalStatus,
        pub public_approved: bool,
        pub image: Option<String>,
        pub created_at: DateTime<Utc>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct AdminRecipeQuery {
        pub status: Option<ApprovalStatus>,
        pub page: Option<u64>,
        pub limit: Option<u64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct StatusUpdate {
        pub status: ApprovalStatus,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct PublicUpdate {
        pub public_approved: bool,
    }
}

pub mod search {
    use super::*;
    use crate::recipe::RecipeSummaryView;

    #[derive(Debug, Default, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct RecipeSearch {
        pub q: Option<String>,
        pub prep_time: Option<i32>,
        pub cook_time: Option<i32>,
        pub servings: Option<i32>,
        pub category_id: Option<i32>,
        pub sub_category_id: Option<i32>,
        pub page: Option<u64>,
        pub limit: Option<u64>,
        pub sort_by: Option<String>,
        pub order: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RecipeSearchResponse {
        pub recipes: Vec<RecipeSummaryView>,
        pub pagination: Pagination,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct SuggestionQuery {
        pub q: Option<String>,
        pub limit: Option<u64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RecipeSuggestion {
        pub id: i32,
        pub title: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct NameSuggestion {
        pub id: i32,
        pub name: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Suggestions {
        pub recipes: Vec<RecipeSuggestion>,
        pub categories: Vec<NameSuggestion>,
        pub ingredients: Vec<NameSuggestion>,
    }
}

pub mod banner {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct BannerView {
        pub id: i32,
        pub title: String,
        pub image: Option<String>,
        pub keywords: Vec<String>,
        pub is_hero: bool,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct BannerNew {
        #[serde(default)]
        pub title: String,
        pub image: Option<String>,
        #[serde(default)]
        pub keywords: Vec<String>,
        #[serde(default)]
        pub is_hero: bool,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct BannerUpdate {
        pub title: Option<String>,
        pub image: Option<String>,
        pub keywords: Option<Vec<String>>,
        pub is_hero: Option<bool>,
    }
}
