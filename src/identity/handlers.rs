use axum::{
    extract::State,
    http::{
        header::{AUTHORIZATION, SET_COOKIE},
        HeaderMap, StatusCode,
    },
    response::{AppendHeaders, IntoResponse, Response},
    routing::{post, put},
    Json, Router,
};
use lazy_static::lazy_static;
use regex::Regex;
use time::OffsetDateTime;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    error::ApiError,
    identity::{
        cookies::{build_cookie, get_cookie, ACCESS_COOKIE, REFRESH_COOKIE, REFRESH_COOKIE_PATH},
        dto::{
            InviteRequest, InviteResponse, LoginRequest, MessageResponse, RegisterRequest,
            TokenPairResponse,
        },
        repo::User,
    },
    state::AppState,
};

pub fn identity_routes() -> Router<AppState> {
    Router::new()
        .route("/invite", post(invite))
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/refresh", post(refresh))
        .route("/request-password-reset", post(request_password_reset))
        .route("/edited", put(edited))
}

fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

#[instrument(skip(state, payload))]
pub async fn invite(
    State(state): State<AppState>,
    Json(payload): Json<InviteRequest>,
) -> Result<Json<InviteResponse>, ApiError> {
    if payload.email.is_empty() {
        return Err(ApiError::Validation("Missing email"));
    }
    if !is_valid_email(&payload.email) {
        return Err(ApiError::Validation("Invalid email"));
    }

    let invite_token = state.keys.sign_invite(&payload.email)?;
    let body = format!(
        "Click this link to register: {}/register?invite_token={} (the link is valid for {} minutes)",
        state.config.frontend_url, invite_token, state.config.tokens.invite_ttl_minutes
    );

    // The response is gated on delivery; a failed send is the authoritative
    // failure even though the token is already minted.
    state
        .mailer
        .send(&payload.email, "Invitation to newsfeed", &body)
        .await
        .map_err(ApiError::Notification)?;

    info!(email = %payload.email, "invite sent");
    Ok(Json(InviteResponse {
        message: "Email sent".into(),
        invite_token,
    }))
}

#[instrument(skip(state, headers, payload))]
pub async fn register(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    let token = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or(ApiError::Unauthorized("Missing invite token"))?;

    let claims = state.keys.verify_invite(token).map_err(|e| {
        warn!(error = %e, "invite token rejected");
        ApiError::Unauthorized("Invalid invite token")
    })?;

    if payload.username.is_empty() || payload.email.is_empty() || payload.password.is_empty() {
        return Err(ApiError::Validation("Missing data"));
    }

    // The invite is bound to exactly one address; comparison is exact,
    // case included.
    if claims.sub != payload.email {
        warn!(invited = %claims.sub, submitted = %payload.email, "invite email mismatch");
        return Err(ApiError::Unauthorized("Wrong email"));
    }

    let user = User {
        user_id: Uuid::new_v4(),
        username: payload.username,
        password_hash: state.hasher.hash(&payload.password)?,
        email: payload.email,
        created_at: OffsetDateTime::now_utc(),
        edited_at: None,
    };
    User::insert(&state.db, &user).await?;

    info!(user_id = %user.user_id, email = %user.email, "user registered");
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: "User created".into(),
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Response, ApiError> {
    if payload.email.is_empty() || payload.password.is_empty() {
        return Err(ApiError::Validation("Missing email or password"));
    }

    // Both failure modes answer with the same message so responses do not
    // reveal which addresses have accounts; the logs stay distinct.
    let user = match User::find_by_email(&state.db, &payload.email).await? {
        Some(user) => user,
        None => {
            warn!(email = %payload.email, "login unknown email");
            return Err(ApiError::Unauthorized("Invalid email or password"));
        }
    };

    if !state.hasher.verify(&payload.password, &user.password_hash)? {
        warn!(user_id = %user.user_id, "login invalid password");
        return Err(ApiError::Unauthorized("Invalid email or password"));
    }

    let access_token = state.keys.sign_access(user.user_id)?;
    let refresh_token = state.keys.sign_refresh(user.user_id)?;

    let access_cookie = build_cookie(
        ACCESS_COOKIE,
        &access_token,
        state.config.tokens.access_ttl(),
        "/",
    )?;
    let refresh_cookie = build_cookie(
        REFRESH_COOKIE,
        &refresh_token,
        state.config.tokens.refresh_cookie_ttl(),
        REFRESH_COOKIE_PATH,
    )?;

    info!(user_id = %user.user_id, "user logged in");
    Ok((
        AppendHeaders([(SET_COOKIE, access_cookie), (SET_COOKIE, refresh_cookie)]),
        Json(TokenPairResponse {
            access_token,
            refresh_token,
        }),
    )
        .into_response())
}

#[instrument(skip(state, headers))]
pub async fn refresh(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    // The refresh token only ever travels in its cookie, never a header.
    let token = get_cookie(&headers, REFRESH_COOKIE)
        .ok_or(ApiError::Unauthorized("Refresh token not found"))?;

    let claims = state.keys.verify_refresh(&token).map_err(|e| {
        warn!(error = %e, "refresh token rejected");
        ApiError::Unauthorized("Refresh token not valid")
    })?;

    // The refresh token itself is not reissued; only a fresh access token
    // goes out.
    let access_token = state.keys.sign_access(claims.sub)?;
    let access_cookie = build_cookie(
        ACCESS_COOKIE,
        &access_token,
        state.config.tokens.access_ttl(),
        "/",
    )?;

    info!(user_id = %claims.sub, "access token refreshed");
    Ok((
        AppendHeaders([(SET_COOKIE, access_cookie)]),
        Json(MessageResponse {
            message: "Access token refreshed".into(),
        }),
    )
        .into_response())
}

// Stubs kept from the public surface; neither flow is implemented.
pub async fn request_password_reset() -> &'static str {
    "Request password reset"
}

pub async fn edited() -> &'static str {
    "Edited"
}
