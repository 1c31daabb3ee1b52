//! Account endpoints: own profile and admin user management.

use api_types::{
    Envelope, PageQuery,
    user::{ProfileUpdate, RoleUpdate, UserView},
};
use axum::{Extension, Json, extract::State};
use engine::{Actor, PageRequest};

use crate::{
    ServerError,
    extract::{Id, Params, Payload},
    server::ServerState,
    views::{pagination, role_from_view, user_view},
};

pub async fn update_me(
    State(state): State<ServerState>,
    Extension(actor): Extension<Actor>,
    Payload(payload): Payload<ProfileUpdate>,
) -> Result<Json<Envelope<UserView>>, ServerError> {
    let user = state
        .engine
        .update_profile(
            actor.user_id,
            payload.name.as_deref(),
            payload.avatar.as_deref(),
        )
        .await?;
    Ok(Json(
        Envelope::ok(user_view(user)).with_message("Profile updated"),
    ))
}

pub async fn list(
    State(state): State<ServerState>,
    Params(query): Params<PageQuery>,
) -> Result<Json<Envelope<Vec<UserView>>>, ServerError> {
    let page = state
        .engine
        .list_users(PageRequest::new(query.page, query.limit))
        .await?;
    let pagination = pagination(&page);
    let users = page.items.into_iter().map(user_view).collect();
    Ok(Json(Envelope::ok(users).with_pagination(pagination)))
}

pub async fn set_role(
    State(state): State<ServerState>,
    Extension(actor): Extension<Actor>,
    Id(user_id): Id<i32>,
    Payload(payload): Payload<RoleUpdate>,
) -> Result<Json<Envelope<UserView>>, ServerError> {
    let user = state
        .engine
        .set_role(&actor, user_id, role_from_view(payload.role))
        .await?;
    tracing::info!(user_id, role = user.role.as_str(), "role changed");
    Ok(Json(Envelope::ok(user_view(user)).with_message("Role updated")))
}

pub async fn delete(
    State(state): State<ServerState>,
    Extension(actor): Extension<Actor>,
    Id(user_id): Id<i32>,
) -> Result<Json<Envelope<()>>, ServerError> {
    state.engine.delete_user(&actor, user_id).await?;
    tracing::info!(user_id, "user deleted");
    Ok(Json(Envelope::done("User deleted")))
}
