use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method, header},
    middleware,
    routing::{get, post, put},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use std::{net::SocketAddr, sync::Arc};

use crate::{
    auth::{self, AuthKeys},
    banners, categories, ingredients, recipes, search, sub_categories, users,
};
use engine::Engine;

/// Room for a 5 MiB image once base64 encoded, plus the rest of the body.
const BODY_LIMIT: usize = 8 * 1024 * 1024;

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
    pub auth: Arc<AuthKeys>,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
    /// Set the `Secure` attribute on the session cookie.
    pub cookie_secure: bool,
    /// Single origin allowed to call the API with credentials.
    pub frontend_url: Option<String>,
}

fn cors(frontend_url: Option<&str>) -> CorsLayer {
    let Some(origin) = frontend_url else {
        return CorsLayer::new();
    };
    match HeaderValue::from_str(origin) {
        Ok(origin) => CorsLayer::new()
            .allow_origin(origin)
            .allow_credentials(true)
            .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]),
        Err(err) => {
            tracing::error!("invalid frontend url {origin:?}: {err}");
            CorsLayer::new()
        }
    }
}

fn public_routes() -> Router<ServerState> {
    Router::new()
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/auth/forgot-password", post(auth::forgot_password))
        .route("/api/auth/verify-otp", post(auth::verify_otp))
        .route("/api/auth/reset-password", post(auth::reset_password))
        .route("/api/categories", get(categories::list))
        .route("/api/categories/{id}", get(categories::get))
        .route("/api/sub-categories", get(sub_categories::list))
        .route("/api/sub-categories/{id}", get(sub_categories::get))
        .route("/api/ingredients", get(ingredients::list))
        .route("/api/recipes/{id}", get(recipes::get))
        .route("/api/search/recipes", get(search::recipes))
        .route("/api/search/suggestions", get(search::suggestions))
        .route("/api/banners", get(banners::list))
        .route("/api/banners/hero", get(banners::hero))
}

fn member_routes(state: &ServerState) -> Router<ServerState> {
    Router::new()
        .route("/api/auth/me", get(auth::me))
        .route("/api/users/me", put(users::update_me))
        .route("/api/ingredients", post(ingredients::create))
        .route("/api/recipes", post(recipes::create_by_member))
        .route("/api/recipes/mine", get(recipes::mine))
        .route("/api/recipes/{id}", axum::routing::delete(recipes::delete))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::authenticate,
        ))
}

fn admin_routes(state: &ServerState) -> Router<ServerState> {
    Router::new()
        .route("/api/users", get(users::list))
        .route("/api/users/{id}/role", put(users::set_role))
        .route("/api/users/{id}", axum::routing::delete(users::delete))
        .route("/api/categories", post(categories::create))
        .route(
            "/api/categories/{id}",
            put(categories::update).delete(categories::delete),
        )
        .route("/api/sub-categories", post(sub_categories::create))
        .route(
            "/api/sub-categories/{id}",
            put(sub_categories::update).delete(sub_categories::delete),
        )
        .route(
            "/api/ingredients/{id}",
            put(ingredients::update).delete(ingredients::delete),
        )
        .route(
            "/api/manage-recipe-by-admin/create-recipe-by-admin",
            post(recipes::create_by_admin),
        )
        .route(
            "/api/manage-recipe-by-admin/recipes",
            get(recipes::admin_list),
        )
        .route(
            "/api/manage-recipe-by-admin/recipes/{id}/status",
            put(recipes::set_status),
        )
        .route(
            "/api/manage-recipe-by-admin/recipes/{id}/public",
            put(recipes::set_public),
        )
        .route(
            "/api/manage-recipe-by-admin/recipes/{id}",
            axum::routing::delete(recipes::delete),
        )
        .route("/api/banners", post(banners::create))
        .route(
            "/api/banners/{id}",
            put(banners::update).delete(banners::delete),
        )
        .route("/api/banners/{id}/set-hero", put(banners::set_hero))
        .route_layer(middleware::from_fn(auth::require_admin))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::authenticate,
        ))
}

/// The whole HTTP surface over `engine`.
pub fn router(engine: Arc<Engine>, config: &ServerConfig) -> Router {
    let state = ServerState {
        engine,
        auth: Arc::new(AuthKeys::new(
            &config.jwt_secret,
            config.token_ttl_hours,
            config.cookie_secure,
        )),
    };

    public_routes()
        .merge(member_routes(&state))
        .merge(admin_routes(&state))
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
        .layer(cors(config.frontend_url.as_deref()))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run(engine: Engine, config: ServerConfig, addr: SocketAddr) {
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind server listener on {addr}: {err}");
            return;
        }
    };
    if let Err(err) = run_with_listener(engine, config, listener).await {
        tracing::error!("server failed: {err}");
    }
}

pub async fn run_with_listener(
    engine: Engine,
    config: ServerConfig,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, router(Arc::new(engine), &config)).await
}

pub fn spawn_with_listener(
    engine: Engine,
    config: ServerConfig,
    listener: tokio::net::TcpListener,
) -> Result<SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(engine, config, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}
