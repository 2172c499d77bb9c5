//! Login, logout, session lookup, access-token renewal and password reset.
//!
//! A session moves from non-existent to active on login and to deleted on
//! logout; renewal and lookups never change it. Failures are returned as
//! [`AuthError`] without retries.

use std::sync::Arc;

use catering_core::session::NewSession;
use catering_core::store::{CacheStore, OwnerStore, SessionRecordStore, StoreError};
use catering_core::validation;
use chrono::Utc;
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::mailer::Mailer;
use crate::model::{
    ForgotPasswordRequest, LoginRequest, LoginResponse, LogoutRequest, RenewResponse,
    RequestAuth, ResetPasswordRequest, SessionSnapshot,
};
use crate::password::{Argon2Hasher, PasswordError, PasswordHasher};
use crate::session_store::{SessionStore, SessionStoreAdapter};
use crate::token::{JwtCodec, TokenCodec};

/// Path of the reset endpoint, appended to the configured link base.
pub const RESET_PASSWORD_PATH: &str = "/api/v1/owner/reset-password";

pub struct AuthService {
    owners: Arc<dyn OwnerStore>,
    sessions: Arc<dyn SessionStore>,
    tokens: Arc<dyn TokenCodec>,
    hasher: Arc<dyn PasswordHasher>,
    mailer: Arc<dyn Mailer>,
    reset_link_base: String,
}

impl AuthService {
    pub fn new(
        owners: Arc<dyn OwnerStore>,
        sessions: Arc<dyn SessionStore>,
        tokens: Arc<dyn TokenCodec>,
        hasher: Arc<dyn PasswordHasher>,
        mailer: Arc<dyn Mailer>,
        reset_link_base: impl Into<String>,
    ) -> Self {
        Self {
            owners,
            sessions,
            tokens,
            hasher,
            mailer,
            reset_link_base: reset_link_base.into(),
        }
    }

    /// Wire the JWT codec, Argon2 hasher and session adapter from `config`.
    pub fn from_config(
        config: &AuthConfig,
        owners: Arc<dyn OwnerStore>,
        records: Arc<dyn SessionRecordStore>,
        cache: Arc<dyn CacheStore>,
        mailer: Arc<dyn Mailer>,
    ) -> Result<Self, AuthError> {
        let hasher = Argon2Hasher::new(config.password_cost).map_err(AuthError::Password)?;
        let sessions = SessionStoreAdapter::new(
            records,
            cache,
            config.access_token_ttl,
            config.refresh_token_ttl,
        );
        let tokens = JwtCodec::new(
            config.access_secret.as_bytes(),
            config.refresh_secret.as_bytes(),
        );
        Ok(Self::new(
            owners,
            Arc::new(sessions),
            Arc::new(tokens),
            Arc::new(hasher),
            mailer,
            config.reset_link_base.clone(),
        ))
    }

    // -----------------------------------------------------------------------
    // Operations
    // -----------------------------------------------------------------------

    /// Authenticate an owner and open a session.
    ///
    /// An owner with a live session gets that session's `sid` back with no
    /// tokens, and no new session is created.
    pub async fn login(&self, req: LoginRequest) -> Result<LoginResponse, AuthError> {
        validation::require("email", &req.email)?;
        validation::require("password", &req.password)?;
        validation::validate_email(&req.email)?;
        validation::validate_password("password", &req.password)?;

        let owner = self
            .owners
            .find_by_email(&req.email)
            .await?
            .ok_or(AuthError::NotFound { entity: "owner" })?;

        self.verify_password(&req.password, &owner.password_hash)
            .await?;

        if let Some(sid) = self.sessions.session_id_by_email(&owner.email).await? {
            tracing::info!(owner_id = owner.id, sid = %sid, "Login reused live session");
            return Ok(LoginResponse {
                sid,
                access_token: None,
                refresh_token: None,
            });
        }

        let sid = Uuid::new_v4().to_string();
        let jti = Uuid::new_v4().to_string();
        let access_token = self
            .tokens
            .generate(self.sessions.access_token_ttl(), "", "")
            .map_err(AuthError::Token)?;
        let refresh_token = self
            .tokens
            .generate(self.sessions.refresh_token_ttl(), &jti, "")
            .map_err(AuthError::Token)?;

        self.sessions
            .create_session(NewSession {
                sid: sid.clone(),
                owner_id: owner.id,
                email: owner.email,
                jti,
                refresh_token: refresh_token.clone(),
            })
            .await?;

        Ok(LoginResponse {
            sid,
            access_token: Some(access_token),
            refresh_token: Some(refresh_token),
        })
    }

    /// Look up a session by `sid`.
    pub async fn session(&self, sid: &str) -> Result<Option<SessionSnapshot>, AuthError> {
        Ok(self
            .sessions
            .get_session(sid)
            .await?
            .map(SessionSnapshot::from))
    }

    /// Close the caller's session after re-checking their password.
    pub async fn logout(&self, auth: &RequestAuth, req: LogoutRequest) -> Result<(), AuthError> {
        let (Some(sid), Some(token)) = (auth.sid.as_deref(), auth.bearer_token.as_deref()) else {
            return Err(AuthError::unauthorized("missing session id or bearer token"));
        };
        self.tokens
            .validate(token)
            .map_err(|e| AuthError::unauthorized(format!("bearer token rejected: {e}")))?;

        validation::require("password", &req.password)?;
        validation::validate_password("password", &req.password)?;

        let session = self
            .sessions
            .get_session(sid)
            .await?
            .ok_or(AuthError::NotFound { entity: "session" })?;
        if !session.valid {
            return Err(AuthError::unauthorized(format!("session {sid} is not valid")));
        }

        let owner = self
            .owners
            .find_by_id(session.owner_id)
            .await?
            .ok_or(AuthError::NotFound { entity: "owner" })?;
        self.verify_password(&req.password, &owner.password_hash)
            .await?;

        self.sessions.delete_session(sid).await?;
        Ok(())
    }

    /// Issue a new access token against the session's refresh token.
    ///
    /// The refresh token and session `jti` are left as they are.
    pub async fn renew_access_token(&self, auth: &RequestAuth) -> Result<RenewResponse, AuthError> {
        let (Some(session), Some(token)) = (auth.session.as_ref(), auth.bearer_token.as_deref())
        else {
            return Err(AuthError::unauthorized("missing session or bearer token"));
        };
        let claims = self
            .tokens
            .validate(token)
            .map_err(|e| AuthError::unauthorized(format!("refresh token rejected: {e}")))?;

        if !session.valid || claims.jti != session.jti || !claims.is_for_refresh_token() {
            return Err(AuthError::unauthorized("invalid session or claims"));
        }

        let ttl = self.sessions.access_token_ttl();
        let access_token = self.tokens.generate(ttl, "", "").map_err(AuthError::Token)?;
        let window = chrono::Duration::from_std(ttl)
            .map_err(|e| AuthError::Internal(format!("access token ttl out of range: {e}")))?;

        Ok(RenewResponse {
            access_token,
            expired_at: (Utc::now() + window).to_rfc3339(),
        })
    }

    /// Mail a password-reset link to the owner and return the reset token.
    pub async fn forgot_password(&self, req: ForgotPasswordRequest) -> Result<String, AuthError> {
        validation::require("email", &req.email)?;
        validation::validate_email(&req.email)?;

        let owner = self
            .owners
            .find_by_email(&req.email)
            .await?
            .ok_or(AuthError::NotFound { entity: "owner" })?;

        let reset_id = Uuid::new_v4().to_string();
        let token = self
            .tokens
            .generate(self.sessions.access_token_ttl(), &reset_id, &owner.email)
            .map_err(AuthError::Token)?;

        let link = format!("{}{RESET_PASSWORD_PATH}/{reset_id}", self.reset_link_base);
        self.mailer
            .send_password_reset(&owner.email, &link, &owner.name)
            .await?;

        tracing::info!(owner_id = owner.id, "Password reset requested");
        Ok(token)
    }

    /// Set a new password using a reset token issued by [`forgot_password`](Self::forgot_password).
    pub async fn reset_password(
        &self,
        auth: &RequestAuth,
        reset_id: &str,
        req: ResetPasswordRequest,
    ) -> Result<(), AuthError> {
        let token = auth
            .bearer_token
            .as_deref()
            .ok_or_else(|| AuthError::unauthorized("missing reset token"))?;
        let claims = self
            .tokens
            .validate(token)
            .map_err(|e| AuthError::unauthorized(format!("reset token rejected: {e}")))?;
        if !claims.is_for_reset_password() || claims.jti != reset_id {
            return Err(AuthError::unauthorized(format!(
                "token is not valid for reset request {reset_id}"
            )));
        }

        validation::require("password", &req.password)?;
        validation::require("password_confirm", &req.password_confirm)?;
        validation::validate_password("password", &req.password)?;
        if req.password != req.password_confirm {
            return Err(AuthError::unauthorized("password confirmation does not match"));
        }

        let hash = self.hash_password(req.password).await?;
        if !self
            .owners
            .update_password_by_email(&claims.email, &hash)
            .await?
        {
            return Err(AuthError::NotFound { entity: "owner" });
        }

        tracing::info!(reset_id, "Owner password reset");
        Ok(())
    }

    /// Delete durable sessions whose refresh window has closed.
    pub async fn sweep_expired_sessions(&self) -> Result<u64, StoreError> {
        self.sessions.sweep_expired().await
    }

    // -----------------------------------------------------------------------
    // Password hashing off the async workers
    // -----------------------------------------------------------------------

    async fn verify_password(&self, candidate: &str, stored: &str) -> Result<(), AuthError> {
        let hasher = Arc::clone(&self.hasher);
        let (candidate, stored) = (candidate.to_owned(), stored.to_owned());
        let result = tokio::task::spawn_blocking(move || hasher.verify(&candidate, &stored))
            .await
            .map_err(|e| AuthError::Internal(format!("password verification task failed: {e}")))?;

        match result {
            Ok(()) => Ok(()),
            Err(PasswordError::Mismatch) => Err(AuthError::unauthorized("password mismatch")),
            Err(e) => Err(AuthError::Password(e)),
        }
    }

    async fn hash_password(&self, password: String) -> Result<String, AuthError> {
        let hasher = Arc::clone(&self.hasher);
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| AuthError::Internal(format!("password hashing task failed: {e}")))?
            .map_err(AuthError::Password)
    }
}
