//! Recipe authoring, viewing and moderation endpoints.

use api_types::{
    Envelope, PageQuery,
    recipe::{AdminRecipeQuery, PublicUpdate, RecipeNew, RecipeSummaryView, RecipeView, StatusUpdate},
};
use axum::{Extension, Json, extract::State, http::HeaderMap, http::StatusCode};
use axum_extra::extract::cookie::CookieJar;
use engine::{Actor, NewRecipe, NewRecipeIngredient, PageRequest, RecipeSource};

use crate::{
    ServerError,
    auth::viewer,
    extract::{Id, Params, Payload},
    server::ServerState,
    views::{pagination, recipe_view, status_from_view, summary_view},
};

type Created = (StatusCode, Json<Envelope<RecipeView>>);
type SummaryList = Json<Envelope<Vec<RecipeSummaryView>>>;

fn new_recipe(payload: RecipeNew) -> NewRecipe {
    NewRecipe {
        category_id: payload.category_id,
        sub_category_id: payload.sub_category_id,
        title: payload.title,
        description: payload.description,
        prep_time: payload.prep_time,
        cook_time: payload.cook_time,
        servings: payload.servings,
        ingredients: payload
            .ingredients
            .into_iter()
            .map(|line| NewRecipeIngredient {
                ingredient_id: line.ingredient_id,
                quantity: line.quantity,
                unit: line.unit,
            })
            .collect(),
        instructions: payload.instructions,
        keywords: payload.keywords,
        image: payload.image,
    }
}

async fn create(
    state: &ServerState,
    actor: Actor,
    source: RecipeSource,
    payload: RecipeNew,
) -> Result<Created, ServerError> {
    let recipe = state
        .engine
        .create_recipe(actor.user_id, source, new_recipe(payload))
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(Envelope::ok(recipe_view(recipe)).with_message("Recipe created")),
    ))
}

/// Admin flow: the recipe is approved and public right away.
pub async fn create_by_admin(
    State(state): State<ServerState>,
    Extension(actor): Extension<Actor>,
    Payload(payload): Payload<RecipeNew>,
) -> Result<Created, ServerError> {
    create(&state, actor, RecipeSource::Admin, payload).await
}

/// Member submission: waits for moderation.
pub async fn create_by_member(
    State(state): State<ServerState>,
    Extension(actor): Extension<Actor>,
    Payload(payload): Payload<RecipeNew>,
) -> Result<Created, ServerError> {
    create(&state, actor, RecipeSource::Member, payload).await
}

pub async fn get(
    State(state): State<ServerState>,
    jar: CookieJar,
    headers: HeaderMap,
    Id(recipe_id): Id<i32>,
) -> Result<Json<Envelope<RecipeView>>, ServerError> {
    let viewer = viewer(&state, &jar, &headers).await?;
    let recipe = state.engine.recipe(recipe_id, viewer.as_ref()).await?;
    Ok(Json(Envelope::ok(recipe_view(recipe))))
}

pub async fn mine(
    State(state): State<ServerState>,
    Extension(actor): Extension<Actor>,
    Params(query): Params<PageQuery>,
) -> Result<SummaryList, ServerError> {
    let page = state
        .engine
        .list_user_recipes(actor.user_id, PageRequest::new(query.page, query.limit))
        .await?;
    let pagination = pagination(&page);
    let recipes = page.items.into_iter().map(summary_view).collect();
    Ok(Json(Envelope::ok(recipes).with_pagination(pagination)))
}

pub async fn delete(
    State(state): State<ServerState>,
    Extension(actor): Extension<Actor>,
    Id(recipe_id): Id<i32>,
) -> Result<Json<Envelope<()>>, ServerError> {
    state.engine.delete_recipe(&actor, recipe_id).await?;
    tracing::info!(recipe_id, user_id = actor.user_id, "recipe deleted");
    Ok(Json(Envelope::done("Recipe deleted")))
}

pub async fn admin_list(
    State(state): State<ServerState>,
    Params(query): Params<AdminRecipeQuery>,
) -> Result<SummaryList, ServerError> {
    let page = state
        .engine
        .list_recipes_for_admin(
            query.status.map(status_from_view),
            PageRequest::new(query.page, query.limit),
        )
        .await?;
    let pagination = pagination(&page);
    let recipes = page.items.into_iter().map(summary_view).collect();
    Ok(Json(Envelope::ok(recipes).with_pagination(pagination)))
}

pub async fn set_status(
    State(state): State<ServerState>,
    Id(recipe_id): Id<i32>,
    Payload(payload): Payload<StatusUpdate>,
) -> Result<Json<Envelope<RecipeView>>, ServerError> {
    let recipe = state
        .engine
        .set_recipe_status(recipe_id, status_from_view(payload.status))
        .await?;
    Ok(Json(
        Envelope::ok(recipe_view(recipe)).with_message("Recipe status updated"),
    ))
}

pub async fn set_public(
    State(state): State<ServerState>,
    Id(recipe_id): Id<i32>,
    Payload(payload): Payload<PublicUpdate>,
) -> Result<Json<Envelope<RecipeView>>, ServerError> {
    let recipe = state
        .engine
        .set_recipe_public(recipe_id, payload.public_approved)
        .await?;
    Ok(Json(
        Envelope::ok(recipe_view(recipe)).with_message("Recipe visibility updated"),
    ))
}
