//! Conversions from engine values to API bodies.

use api_types::{
    Pagination,
    banner::BannerView,
    category::CategoryView,
    ingredient::IngredientView,
    recipe::{
        self as api_recipe, AuthorView, InstructionView, RecipeIngredientView, RecipeSummaryView,
        RecipeView,
    },
    sub_category::SubCategoryView,
    user::{self as api_user, UserView},
};
use engine::{ApprovalStatus, Author, NamedRef, Page, Role};

pub fn pagination<T>(page: &Page<T>) -> Pagination {
    Pagination {
        page: page.page,
        limit: page.limit,
        total_count: page.total_count,
        total_pages: page.total_pages,
    }
}

pub fn role_view(role: Role) -> api_user::Role {
    match role {
        Role::User => api_user::Role::User,
        Role::Admin => api_user::Role::Admin,
    }
}

pub fn role_from_view(role: api_user::Role) -> Role {
    match role {
        api_user::Role::User => Role::User,
        api_user::Role::Admin => Role::Admin,
    }
}

pub fn status_view(status: ApprovalStatus) -> api_recipe::ApprovalStatus {
    match status {
        ApprovalStatus::Pending => api_recipe::ApprovalStatus::Pending,
        ApprovalStatus::Approved => api_recipe::ApprovalStatus::Approved,
        ApprovalStatus::Rejected => api_recipe::ApprovalStatus::Rejected,
    }
}

pub fn status_from_view(status: api_recipe::ApprovalStatus) -> ApprovalStatus {
    match status {
        api_recipe::ApprovalStatus::Pending => ApprovalStatus::Pending,
        api_recipe::ApprovalStatus::Approved => ApprovalStatus::Approved,
        api_recipe::ApprovalStatus::Rejected => ApprovalStatus::Rejected,
    }
}

pub fn user_view(user: engine::User) -> UserView {
    UserView {
        id: user.id,
        name: user.name,
        email: user.email,
        role: role_view(user.role),
        is_verified: user.is_verified,
        avatar: user.avatar,
        created_at: user.created_at,
    }
}

pub fn category_view(category: engine::Category) -> CategoryView {
    CategoryView {
        id: category.id,
        name: category.name,
        description: category.description,
        image: category.image,
        created_at: category.created_at,
        updated_at: category.updated_at,
    }
}

pub fn sub_category_view(sub_category: engine::SubCategory) -> SubCategoryView {
    SubCategoryView {
        id: sub_category.id,
        category_id: sub_category.category_id,
        category_name: sub_category.category_name,
        name: sub_category.name,
        description: sub_category.description,
        created_at: sub_category.created_at,
        updated_at: sub_category.updated_at,
    }
}

pub fn ingredient_view(ingredient: engine::Ingredient) -> IngredientView {
    IngredientView {
        id: ingredient.id,
        name: ingredient.name,
    }
}

fn named(named: NamedRef) -> api_recipe::NamedRef {
    api_recipe::NamedRef {
        id: named.id,
        name: named.name,
    }
}

fn author_view(author: Author) -> AuthorView {
    AuthorView {
        id: author.id,
        name: author.name,
        avatar: author.avatar,
    }
}

pub fn recipe_view(recipe: engine::Recipe) -> RecipeView {
    RecipeView {
        id: recipe.id,
        author: author_view(recipe.author),
        category: named(recipe.category),
        sub_category: named(recipe.sub_category),
        title: recipe.title,
        description: recipe.description,
        prep_time: recipe.prep_time,
        cook_time: recipe.cook_time,
        servings: recipe.servings,
        ingredients: recipe
            .ingredients
            .into_iter()
            .map(|line| RecipeIngredientView {
                ingredient_id: line.ingredient_id,
                name: line.name,
                quantity: line.quantity,
                unit: line.unit,
            })
            .collect(),
        instructions: recipe
            .instructions
            .into_iter()
            .map(|step| InstructionView {
                id: step.id,
                position: step.position,
                body: step.body,
            })
            .collect(),
        keywords: recipe.keywords,
        admin_approved_status: status_view(recipe.status),
        public_approved: recipe.public_approved,
        image: recipe.image,
        created_at: recipe.created_at,
        updated_at: recipe.updated_at,
    }
}

pub fn summary_view(recipe: engine::RecipeSummary) -> RecipeSummaryView {
    RecipeSummaryView {
        id: recipe.id,
        title: recipe.title,
        description: recipe.description,
        prep_time: recipe.prep_time,
        cook_time: recipe.cook_time,
        servings: recipe.servings,
        category: named(recipe.category),
        sub_category: named(recipe.sub_category),
        keywords: recipe.keywords,
        author: author_view(recipe.author),
        admin_approved_status: status_view(recipe.status),
        public_approved: recipe.public_approved,
        image: recipe.image,
        created_at: recipe.created_at,
    }
}

pub fn banner_view(banner: engine::Banner) -> BannerView {
    BannerView {
        id: banner.id,
        title: banner.title,
        image: banner.image,
        keywords: banner.keywords,
        is_hero: banner.is_hero,
        created_at: banner.created_at,
        updated_at: banner.updated_at,
    }
}
