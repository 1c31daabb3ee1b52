use sea_orm::{
    Condition, Order, QueryFilter, QueryOrder, QuerySelect, prelude::*,
    sea_query::{Expr, Func, LikeExpr, Query, SimpleExpr},
};

use crate::{
    ApprovalStatus, NamedRef, Page, PageRequest, RecipeSummary, ResultEngine, categories,
    ingredients, recipe_keywords, recipes, util::like_pattern,
};

use super::Engine;

pub const DEFAULT_SUGGESTIONS: u64 = 5;
pub const MAX_SUGGESTIONS: u64 = 20;

/// Column a search result list is sorted by.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortField {
    #[default]
    CreatedAt,
    Title,
    PrepTime,
    CookTime,
    Servings,
}

impl SortField {
    /// Parse the `sortBy` query value; anything unknown sorts by creation.
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("title") => Self::Title,
            Some("prepTime") => Self::PrepTime,
            Some("cookTime") => Self::CookTime,
            Some("servings") => Self::Servings,
            _ => Self::CreatedAt,
        }
    }

    fn column(self) -> recipes::Column {
        match self {
            Self::CreatedAt => recipes::Column::CreatedAt,
            Self::Title => recipes::Column::TitleNorm,
            Self::PrepTime => recipes::Column::PrepTime,
            Self::CookTime => recipes::Column::CookTime,
            Self::Servings => recipes::Column::Servings,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
            Some("asc") => Self::Asc,
            _ => Self::Desc,
        }
    }

    fn order(self) -> Order {
        match self {
            Self::Asc => Order::Asc,
            Self::Desc => Order::Desc,
        }
    }
}

/// Filters of the public recipe search. Every `None` filter is ignored.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SearchQuery {
    pub text: Option<String>,
    pub max_prep_time: Option<i32>,
    pub max_cook_time: Option<i32>,
    pub min_servings: Option<i32>,
    pub category_id: Option<i32>,
    pub sub_category_id: Option<i32>,
    pub sort: SortField,
    pub order: SortOrder,
    pub page: PageRequest,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Suggestions {
    pub recipes: Vec<NamedRef>,
    pub categories: Vec<NamedRef>,
    pub ingredients: Vec<NamedRef>,
}

fn lower_like<C: ColumnTrait>(column: C, pattern: &str) -> SimpleExpr {
    Expr::expr(Func::lower(Expr::col(column)))
        .like(LikeExpr::new(pattern.to_string()).escape('\\'))
}

fn published() -> Condition {
    Condition::all()
        .add(recipes::Column::AdminApprovedStatus.eq(ApprovalStatus::Approved))
        .add(recipes::Column::PublicApproved.eq(true))
}

fn search_condition(search: &SearchQuery) -> Condition {
    let mut condition = published();

    if let Some(text) = search.text.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
        let pattern = like_pattern(text);
        let keyword_hits = Query::select()
            .column(recipe_keywords::Column::RecipeId)
            .from(recipe_keywords::Entity)
            .and_where(lower_like(recipe_keywords::Column::Keyword, &pattern))
            .to_owned();
        condition = condition.add(
            Condition::any()
                .add(lower_like(recipes::Column::Title, &pattern))
                .add(lower_like(recipes::Column::Description, &pattern))
                .add(recipes::Column::Id.in_subquery(keyword_hits)),
        );
    }
    if let Some(max) = search.max_prep_time {
        condition = condition.add(recipes::Column::PrepTime.lte(max));
    }
    if let Some(max) = search.max_cook_time {
        condition = condition.add(recipes::Column::CookTime.lte(max));
    }
    if let Some(min) = search.min_servings {
        condition = condition.add(recipes::Column::Servings.gte(min));
    }
    if let Some(category_id) = search.category_id {
        condition = condition.add(recipes::Column::CategoryId.eq(category_id));
    }
    if let Some(sub_category_id) = search.sub_category_id {
        condition = condition.add(recipes::Column::SubCategoryId.eq(sub_category_id));
    }
    condition
}

impl Engine {
    /// Published recipes matching every given filter, one page at a time.
    pub async fn search_recipes(&self, search: SearchQuery) -> ResultEngine<Page<RecipeSummary>> {
        let order = search.order.order();
        let query = recipes::Entity::find()
            .filter(search_condition(&search))
            .order_by(search.sort.column(), order.clone())
            .order_by(recipes::Column::Id, order);
        self.summary_page(query, search.page).await
    }

    /// Quick completions for a search box: published recipe titles,
    /// categories and ingredients containing `text`, `limit` of each.
    pub async fn suggestions(&self, text: &str, limit: Option<u64>) -> ResultEngine<Suggestions> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(Suggestions::default());
        }
        let limit = limit.unwrap_or(DEFAULT_SUGGESTIONS).clamp(1, MAX_SUGGESTIONS);
        let pattern = like_pattern(text);

        let recipes = recipes::Entity::find()
            .filter(published())
            .filter(lower_like(recipes::Column::Title, &pattern))
            .order_by_asc(recipes::Column::TitleNorm)
            .limit(limit)
            .all(&self.database)
            .await?
            .into_iter()
            .map(|r| NamedRef {
                id: r.id,
                name: r.title,
            })
            .collect();
        let categories = categories::Entity::find()
            .filter(lower_like(categories::Column::Name, &pattern))
            .order_by_asc(categories::Column::NameNorm)
            .limit(limit)
            .all(&self.database)
            .await?
            .into_iter()
            .map(|c| NamedRef {
                id: c.id,
                name: c.name,
            })
            .collect();
        let ingredients = ingredients::Entity::find()
            .filter(lower_like(ingredients::Column::Name, &pattern))
            .order_by_asc(ingredients::Column::NameNorm)
            .limit(limit)
            .all(&self.database)
            .await?
            .into_iter()
            .map(|i| NamedRef {
                id: i.id,
                name: i.name,
            })
            .collect();

        Ok(Suggestions {
            recipes,
            categories,
            ingredients,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_sort_values_fall_back() {
        assert_eq!(SortField::parse(Some("prepTime")), SortField::PrepTime);
        assert_eq!(SortField::parse(Some("password")), SortField::CreatedAt);
        assert_eq!(SortField::parse(None), SortField::CreatedAt);
        assert_eq!(SortOrder::parse(Some("ASC")), SortOrder::Asc);
        assert_eq!(SortOrder::parse(Some("sideways")), SortOrder::Desc);
    }
}
