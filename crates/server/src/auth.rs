//! JWT session cookie, the authentication middlewares and the `/api/auth`
//! handlers.

use api_types::{
    Envelope,
    auth::{ForgotPassword, Login, Register, ResetPassword, VerifyOtp},
    user::UserView,
};
use axum::{
    Extension, Json,
    extract::{Request, State},
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::Utc;
use engine::{Actor, EngineError, Role, User};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::{ServerError, extract::Payload, server::ServerState, views::user_view};

pub const TOKEN_COOKIE: &str = "token";

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Claims {
    user_id: i32,
    email: String,
    role: String,
    iat: i64,
    exp: i64,
}

/// Signing material and cookie policy, shared by every request.
pub struct AuthKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl_seconds: i64,
    cookie_secure: bool,
}

impl AuthKeys {
    pub fn new(secret: &str, ttl_hours: i64, cookie_secure: bool) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl_seconds: ttl_hours.max(1) * 3600,
            cookie_secure,
        }
    }

    fn issue(&self, user: &User) -> Result<String, ServerError> {
        let iat = Utc::now().timestamp();
        let claims = Claims {
            user_id: user.id,
            email: user.email.clone(),
            role: user.role.as_str().to_string(),
            iat,
            exp: iat + self.ttl_seconds,
        };
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|err| ServerError::Internal(format!("token signing failed: {err}")))
    }

    /// The actor a token speaks for; `None` when it is forged, expired or
    /// malformed.
    fn verify(&self, token: &str) -> Option<Actor> {
        let data = jsonwebtoken::decode::<Claims>(
            token,
            &self.decoding,
            &Validation::new(Algorithm::HS256),
        )
        .ok()?;
        let role = Role::try_from(data.claims.role.as_str()).ok()?;
        Some(Actor {
            user_id: data.claims.user_id,
            role,
        })
    }

    fn session_cookie(&self, token: String) -> Cookie<'static> {
        Cookie::build((TOKEN_COOKIE, token))
            .http_only(true)
            .same_site(SameSite::Lax)
            .path("/")
            .secure(self.cookie_secure)
            .max_age(time::Duration::seconds(self.ttl_seconds))
            .build()
    }
}

/// Token from the `token` cookie, falling back to `Authorization: Bearer`.
fn request_token(jar: &CookieJar, headers: &HeaderMap) -> Option<String> {
    if let Some(cookie) = jar.get(TOKEN_COOKIE) {
        return Some(cookie.value().to_string());
    }
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string())
}

/// The account behind a verified token, with its role as stored now. `None`
/// once the account is gone; a token outlives role changes otherwise.
async fn current_actor(state: &ServerState, token: &str) -> Result<Option<Actor>, ServerError> {
    let Some(claimed) = state.auth.verify(token) else {
        return Ok(None);
    };
    match state.engine.user(claimed.user_id).await {
        Ok(user) => Ok(Some(Actor {
            user_id: user.id,
            role: user.role,
        })),
        Err(EngineError::KeyNotFound(_)) => Ok(None),
        Err(err) => Err(err.into()),
    }
}

/// Best-effort identification for public routes that show more to owners.
pub(crate) async fn viewer(
    state: &ServerState,
    jar: &CookieJar,
    headers: &HeaderMap,
) -> Result<Option<Actor>, ServerError> {
    match request_token(jar, headers) {
        Some(token) => current_actor(state, &token).await,
        None => Ok(None),
    }
}

/// Reject requests without a valid token; otherwise expose the [`Actor`] as
/// a request extension.
pub(crate) async fn authenticate(
    State(state): State<ServerState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, ServerError> {
    let Some(token) = request_token(&jar, request.headers()) else {
        return Err(ServerError::Unauthorized(
            "Authentication required".to_string(),
        ));
    };
    let Some(actor) = current_actor(&state, &token).await? else {
        tracing::warn!(path = %request.uri().path(), "rejected invalid or expired token");
        return Err(ServerError::Unauthorized(
            "Invalid or expired token".to_string(),
        ));
    };

    request.extensions_mut().insert(actor);
    Ok(next.run(request).await)
}

/// Must run inside [`authenticate`].
pub(crate) async fn require_admin(
    Extension(actor): Extension<Actor>,
    request: Request,
    next: Next,
) -> Result<Response, ServerError> {
    if !actor.is_admin() {
        tracing::warn!(user_id = actor.user_id, path = %request.uri().path(), "admin route denied");
        return Err(ServerError::Forbidden("Admin access required".to_string()));
    }
    Ok(next.run(request).await)
}

pub async fn register(
    State(state): State<ServerState>,
    jar: CookieJar,
    Payload(payload): Payload<Register>,
) -> Result<(StatusCode, CookieJar, Json<Envelope<UserView>>), ServerError> {
    let user = state
        .engine
        .register(&payload.name, &payload.email, &payload.password)
        .await?;
    tracing::info!(user_id = user.id, "account registered");

    let token = state.auth.issue(&user)?;
    let jar = jar.add(state.auth.session_cookie(token));
    Ok((
        StatusCode::CREATED,
        jar,
        Json(Envelope::ok(user_view(user)).with_message("Registration successful")),
    ))
}

pub async fn login(
    State(state): State<ServerState>,
    jar: CookieJar,
    Payload(payload): Payload<Login>,
) -> Result<(CookieJar, Json<Envelope<UserView>>), ServerError> {
    let user = state
        .engine
        .authenticate(&payload.email, &payload.password)
        .await?;

    let token = state.auth.issue(&user)?;
    let jar = jar.add(state.auth.session_cookie(token));
    Ok((
        jar,
        Json(Envelope::ok(user_view(user)).with_message("Login successful")),
    ))
}

pub async fn logout(jar: CookieJar) -> (CookieJar, Json<Envelope<()>>) {
    let jar = jar.remove(Cookie::build(TOKEN_COOKIE).path("/"));
    (jar, Json(Envelope::done("Logged out")))
}

pub async fn me(
    State(state): State<ServerState>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<Envelope<UserView>>, ServerError> {
    let user = state.engine.user(actor.user_id).await?;
    Ok(Json(Envelope::ok(user_view(user))))
}

pub async fn forgot_password(
    State(state): State<ServerState>,
    Payload(payload): Payload<ForgotPassword>,
) -> Result<Json<Envelope<()>>, ServerError> {
    state.engine.request_password_reset(&payload.email).await?;
    Ok(Json(Envelope::done(
        "If the account exists, a reset code has been sent",
    )))
}

pub async fn verify_otp(
    State(state): State<ServerState>,
    Payload(payload): Payload<VerifyOtp>,
) -> Result<Json<Envelope<()>>, ServerError> {
    state.engine.verify_otp(&payload.email, &payload.otp).await?;
    Ok(Json(Envelope::done("OTP verified")))
}

pub async fn reset_password(
    State(state): State<ServerState>,
    Payload(payload): Payload<ResetPassword>,
) -> Result<Json<Envelope<()>>, ServerError> {
    state
        .engine
        .reset_password(&payload.email, &payload.otp, &payload.new_password)
        .await?;
    Ok(Json(Envelope::done("Password has been reset")))
}
