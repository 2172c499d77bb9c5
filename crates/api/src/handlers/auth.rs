//! Handlers for the `/auth` resource (login, logout, forgot-password, renew).

use axum::extract::State;
use axum::http::header::SET_COOKIE;
use axum::http::StatusCode;
use axum::response::{AppendHeaders, IntoResponse};
use axum::Json;
use catering_auth::model::{
    ForgotPasswordRequest, LoginRequest, LoginResponse, LogoutRequest, RenewResponse,
};

use crate::cookies::{self, SESSION_COOKIE};
use crate::error::AppResult;
use crate::extract::AppJson;
use crate::middleware::auth::SessionAuth;
use crate::response::{AuthEnvelope, MessageResponse};
use crate::state::AppState;

/// POST /api/v1/auth/login
///
/// Authenticate with email + password. Sets the `sid` cookie and returns the
/// access and refresh tokens; when the owner already has a live session the
/// tokens are omitted.
pub async fn login(
    State(state): State<AppState>,
    AppJson(input): AppJson<LoginRequest>,
) -> AppResult<impl IntoResponse> {
    let resp: LoginResponse = state.auth.login(input).await?;
    let cookie = cookies::session_cookie(&resp.sid, &state.config);

    Ok((
        AppendHeaders([(SET_COOKIE, cookie)]),
        Json(AuthEnvelope { auth: resp }),
    ))
}

/// DELETE /api/v1/auth/logout
///
/// Requires the `sid` cookie, a bearer token and the owner's password.
/// Returns 204 No Content and clears the `sid` cookie.
pub async fn logout(
    State(state): State<AppState>,
    SessionAuth(auth): SessionAuth,
    AppJson(input): AppJson<LogoutRequest>,
) -> AppResult<impl IntoResponse> {
    state.auth.logout(&auth, input).await?;

    Ok((
        StatusCode::NO_CONTENT,
        AppendHeaders([(SET_COOKIE, cookies::clear_cookie(SESSION_COOKIE, &state.config))]),
    ))
}

/// PUT /api/v1/auth/forgot-password
///
/// Mails a reset link and sets the `rpt` cookie with the reset token.
pub async fn forgot_password(
    State(state): State<AppState>,
    AppJson(input): AppJson<ForgotPasswordRequest>,
) -> AppResult<impl IntoResponse> {
    let token = state.auth.forgot_password(input).await?;

    Ok((
        AppendHeaders([(SET_COOKIE, cookies::reset_cookie(&token, &state.config))]),
        Json(MessageResponse {
            message: "password reset link sent",
        }),
    ))
}

/// GET /api/v1/auth/renew-access-token
///
/// Exchange the refresh token (as bearer) of the `sid` session for a new
/// access token.
pub async fn renew_access_token(
    State(state): State<AppState>,
    SessionAuth(auth): SessionAuth,
) -> AppResult<Json<AuthEnvelope<RenewResponse>>> {
    let renewed = state.auth.renew_access_token(&auth).await?;
    Ok(Json(AuthEnvelope { auth: renewed }))
}
