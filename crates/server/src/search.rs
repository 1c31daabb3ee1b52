use api_types::{
    Envelope,
    search::{
        NameSuggestion, RecipeSearch, RecipeSearchResponse, RecipeSuggestion, SuggestionQuery,
        Suggestions,
    },
};
use axum::{Json, extract::State};
use engine::{NamedRef, PageRequest, SearchQuery, SortField, SortOrder};

use crate::{
    ServerError,
    extract::Params,
    server::ServerState,
    views::{pagination, summary_view},
};

fn search_query(params: RecipeSearch) -> SearchQuery {
    SearchQuery {
        text: params.q,
        max_prep_time: params.prep_time,
        max_cook_time: params.cook_time,
        min_servings: params.servings,
        category_id: params.category_id,
        sub_category_id: params.sub_category_id,
        sort: SortField::parse(params.sort_by.as_deref()),
        order: SortOrder::parse(params.order.as_deref()),
        page: PageRequest::new(params.page, params.limit),
    }
}

fn name_suggestions(refs: Vec<NamedRef>) -> Vec<NameSuggestion> {
    refs.into_iter()
        .map(|r| NameSuggestion {
            id: r.id,
            name: r.name,
        })
        .collect()
}

pub async fn recipes(
    State(state): State<ServerState>,
    Params(params): Params<RecipeSearch>,
) -> Result<Json<Envelope<RecipeSearchResponse>>, ServerError> {
    let page = state.engine.search_recipes(search_query(params)).await?;
    let pagination = pagination(&page);
    let recipes = page.items.into_iter().map(summary_view).collect();
    Ok(Json(Envelope::ok(RecipeSearchResponse {
        recipes,
        pagination,
    })))
}

pub async fn suggestions(
    State(state): State<ServerState>,
    Params(query): Params<SuggestionQuery>,
) -> Result<Json<Envelope<Suggestions>>, ServerError> {
    let found = state
        .engine
        .suggestions(query.q.as_deref().unwrap_or_default(), query.limit)
        .await?;
    Ok(Json(Envelope::ok(Suggestions {
        recipes: found
            .recipes
            .into_iter()
            .map(|r| RecipeSuggestion {
                id: r.id,
                title: r.name,
            })
            .collect(),
        categories: name_suggestions(found.categories),
        ingredients: name_suggestions(found.ingredients),
    })))
}
