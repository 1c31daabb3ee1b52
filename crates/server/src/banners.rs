use api_types::{
    Envelope,
    banner::{BannerNew, BannerUpdate, BannerView},
};
use axum::{Json, extract::State, http::StatusCode};
use engine::{BannerPatch, NewBanner};

use crate::{
    ServerError,
    extract::{Id, Payload},
    server::ServerState,
    views::banner_view,
};

pub async fn list(
    State(state): State<ServerState>,
) -> Result<Json<Envelope<Vec<BannerView>>>, ServerError> {
    let banners = state
        .engine
        .list_banners()
        .await?
        .into_iter()
        .map(banner_view)
        .collect();
    Ok(Json(Envelope::ok(banners)))
}

pub async fn hero(
    State(state): State<ServerState>,
) -> Result<Json<Envelope<BannerView>>, ServerError> {
    let banner = state.engine.hero_banner().await?;
    Ok(Json(Envelope::ok(banner_view(banner))))
}

pub async fn create(
    State(state): State<ServerState>,
    Payload(payload): Payload<BannerNew>,
) -> Result<(StatusCode, Json<Envelope<BannerView>>), ServerError> {
    let banner = state
        .engine
        .create_banner(NewBanner {
            title: payload.title,
            image: payload.image,
            keywords: payload.keywords,
            is_hero: payload.is_hero,
        })
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(Envelope::ok(banner_view(banner)).with_message("Banner created")),
    ))
}

pub async fn update(
    State(state): State<ServerState>,
    Id(banner_id): Id<i32>,
    Payload(payload): Payload<BannerUpdate>,
) -> Result<Json<Envelope<BannerView>>, ServerError> {
    let patch = BannerPatch {
        title: payload.title,
        image: payload.image,
        keywords: payload.keywords,
        is_hero: payload.is_hero,
    };
    let banner = state.engine.update_banner(banner_id, patch).await?;
    Ok(Json(
        Envelope::ok(banner_view(banner)).with_message("Banner updated"),
    ))
}

pub async fn set_hero(
    State(state): State<ServerState>,
    Id(banner_id): Id<i32>,
) -> Result<Json<Envelope<BannerView>>, ServerError> {
    let banner = state.engine.set_hero_banner(banner_id).await?;
    Ok(Json(
        Envelope::ok(banner_view(banner)).with_message("Hero banner updated"),
    ))
}

pub async fn delete(
    State(state): State<ServerState>,
    Id(banner_id): Id<i32>,
) -> Result<Json<Envelope<()>>, ServerError> {
    state.engine.delete_banner(banner_id).await?;
    Ok(Json(Envelope::done("Banner deleted")))
}
