use api_types::{
    Envelope,
    ingredient::{IngredientNew, IngredientQuery, IngredientView},
};
use axum::{Json, extract::State, http::StatusCode};
use engine::PageRequest;

use crate::{
    ServerError,
    extract::{Id, Params, Payload},
    server::ServerState,
    views::{ingredient_view, pagination},
};

pub async fn list(
    State(state): State<ServerState>,
    Params(query): Params<IngredientQuery>,
) -> Result<Json<Envelope<Vec<IngredientView>>>, ServerError> {
    let page = state
        .engine
        .list_ingredients(query.q.as_deref(), PageRequest::new(query.page, query.limit))
        .await?;
    let pagination = pagination(&page);
    let ingredients = page.items.into_iter().map(ingredient_view).collect();
    Ok(Json(Envelope::ok(ingredients).with_pagination(pagination)))
}

pub async fn create(
    State(state): State<ServerState>,
    Payload(payload): Payload<IngredientNew>,
) -> Result<(StatusCode, Json<Envelope<IngredientView>>), ServerError> {
    let ingredient = state.engine.create_ingredient(&payload.name).await?;
    Ok((
        StatusCode::CREATED,
        Json(Envelope::ok(ingredient_view(ingredient)).with_message("Ingredient created")),
    ))
}

pub async fn update(
    State(state): State<ServerState>,
    Id(ingredient_id): Id<i32>,
    Payload(payload): Payload<IngredientNew>,
) -> Result<Json<Envelope<IngredientView>>, ServerError> {
    let ingredient = state
        .engine
        .update_ingredient(ingredient_id, &payload.name)
        .await?;
    Ok(Json(
        Envelope::ok(ingredient_view(ingredient)).with_message("Ingredient updated"),
    ))
}

pub async fn delete(
    State(state): State<ServerState>,
    Id(ingredient_id): Id<i32>,
) -> Result<Json<Envelope<()>>, ServerError> {
    state.engine.delete_ingredient(ingredient_id).await?;
    Ok(Json(Envelope::done("Ingredient deleted")))
}
