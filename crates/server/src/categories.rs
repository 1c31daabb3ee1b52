//! Categories API endpoints.

use api_types::{
    Envelope,
    category::{CategoryNew, CategoryUpdate, CategoryView},
};
use axum::{Json, extract::State, http::StatusCode};
use engine::CategoryPatch;

use crate::{
    ServerError,
    extract::{Id, Payload},
    server::ServerState,
    views::category_view,
};

pub async fn list(
    State(state): State<ServerState>,
) -> Result<Json<Envelope<Vec<CategoryView>>>, ServerError> {
    let categories = state
        .engine
        .list_categories()
        .await?
        .into_iter()
        .map(category_view)
        .collect();
    Ok(Json(Envelope::ok(categories)))
}

pub async fn get(
    State(state): State<ServerState>,
    Id(category_id): Id<i32>,
) -> Result<Json<Envelope<CategoryView>>, ServerError> {
    let category = state.engine.category(category_id).await?;
    Ok(Json(Envelope::ok(category_view(category))))
}

pub async fn create(
    State(state): State<ServerState>,
    Payload(payload): Payload<CategoryNew>,
) -> Result<(StatusCode, Json<Envelope<CategoryView>>), ServerError> {
    let category = state
        .engine
        .create_category(
            &payload.name,
            &payload.description,
            payload.image.as_deref(),
        )
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(Envelope::ok(category_view(category)).with_message("Category created")),
    ))
}

pub async fn update(
    State(state): State<ServerState>,
    Id(category_id): Id<i32>,
    Payload(payload): Payload<CategoryUpdate>,
) -> Result<Json<Envelope<CategoryView>>, ServerError> {
    let patch = CategoryPatch {
        name: payload.name,
        description: payload.description,
        image: payload.image,
    };
    let category = state.engine.update_category(category_id, patch).await?;
    Ok(Json(
        Envelope::ok(category_view(category)).with_message("Category updated"),
    ))
}

pub async fn delete(
    State(state): State<ServerState>,
    Id(category_id): Id<i32>,
) -> Result<Json<Envelope<()>>, ServerError> {
    state.engine.delete_category(category_id).await?;
    Ok(Json(Envelope::done("Category deleted")))
}
