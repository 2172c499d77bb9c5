//! Handlers for the `/owner` resource.

use axum::extract::{Path, State};
use axum::http::header::SET_COOKIE;
use axum::response::{AppendHeaders, IntoResponse};
use axum::Json;
use catering_auth::model::ResetPasswordRequest;

use crate::cookies::{self, RESET_COOKIE};
use crate::error::AppResult;
use crate::extract::AppJson;
use crate::middleware::auth::ResetAuth;
use crate::response::MessageResponse;
use crate::state::AppState;

/// PUT /api/v1/owner/reset-password/{id}
///
/// `id` is the reset-request id from the mailed link; the reset token comes
/// from the bearer header or the `rpt` cookie. Clears `rpt` on success.
pub async fn reset_password(
    State(state): State<AppState>,
    Path(reset_id): Path<String>,
    ResetAuth(auth): ResetAuth,
    AppJson(input): AppJson<ResetPasswordRequest>,
) -> AppResult<impl IntoResponse> {
    state.auth.reset_password(&auth, &reset_id, input).await?;

    Ok((
        AppendHeaders([(SET_COOKIE, cookies::clear_cookie(RESET_COOKIE, &state.config))]),
        Json(MessageResponse {
            message: "password updated",
        }),
    ))
}
