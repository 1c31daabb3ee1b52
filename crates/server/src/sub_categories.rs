use api_types::{
    Envelope,
    sub_category::{SubCategoryFilter, SubCategoryNew, SubCategoryUpdate, SubCategoryView},
};
use axum::{Json, extract::State, http::StatusCode};
use engine::SubCategoryPatch;

use crate::{
    ServerError,
    extract::{Id, Params, Payload},
    server::ServerState,
    views::sub_category_view,
};

pub async fn list(
    State(state): State<ServerState>,
    Params(filter): Params<SubCategoryFilter>,
) -> Result<Json<Envelope<Vec<SubCategoryView>>>, ServerError> {
    let sub_categories = state
        .engine
        .list_sub_categories(filter.category_id)
        .await?
        .into_iter()
        .map(sub_category_view)
        .collect();
    Ok(Json(Envelope::ok(sub_categories)))
}

pub async fn get(
    State(state): State<ServerState>,
    Id(sub_category_id): Id<i32>,
) -> Result<Json<Envelope<SubCategoryView>>, ServerError> {
    let sub_category = state.engine.sub_category(sub_category_id).await?;
    Ok(Json(Envelope::ok(sub_category_view(sub_category))))
}

pub async fn create(
    State(state): State<ServerState>,
    Payload(payload): Payload<SubCategoryNew>,
) -> Result<(StatusCode, Json<Envelope<SubCategoryView>>), ServerError> {
    let sub_category = state
        .engine
        .create_sub_category(payload.category_id, &payload.name, &payload.description)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(Envelope::ok(sub_category_view(sub_category)).with_message("Sub-category created")),
    ))
}

pub async fn update(
    State(state): State<ServerState>,
    Id(sub_category_id): Id<i32>,
    Payload(payload): Payload<SubCategoryUpdate>,
) -> Result<Json<Envelope<SubCategoryView>>, ServerError> {
    let patch = SubCategoryPatch {
        category_id: payload.category_id,
        name: payload.name,
        description: payload.description,
    };
    let sub_category = state
        .engine
        .update_sub_category(sub_category_id, patch)
        .await?;
    Ok(Json(
        Envelope::ok(sub_category_view(sub_category)).with_message("Sub-category updated"),
    ))
}

pub async fn delete(
    State(state): State<ServerState>,
    Id(sub_category_id): Id<i32>,
) -> Result<Json<Envelope<()>>, ServerError> {
    state.engine.delete_sub_category(sub_category_id).await?;
    Ok(Json(Envelope::done("Sub-category deleted")))
}
